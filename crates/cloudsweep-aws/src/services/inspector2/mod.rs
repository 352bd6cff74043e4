//! Inspector2 resource collection
//!
//! Every enabled region contributes one scanner-state record; the region's
//! findings are attached to it in a second pass once the primary round has
//! completed everywhere.

mod api;
#[cfg(test)]
mod tests;
pub mod types;

pub use api::{FindingData, Inspector2Api, Inspector2Client};

use crate::context::AwsClientFactory;
use crate::dispatch::{RegionalClientSet, fan_out};
use crate::error::{ApiError, require};
use crate::scope::AuditScope;
use cloudsweep_common::arn;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use types::{Inspector, InspectorFinding};

const SERVICE: &str = "inspector2";

/// Identifier for the per-region scanner-state record.
const INSPECTOR_ID: &str = "inspector2";

/// Inspector2 inventory for one audit run.
pub struct Inspector2Service<C = Inspector2Client> {
    scope: Arc<AuditScope>,
    clients: RegionalClientSet<C>,
    inspectors: Vec<Inspector>,
}

impl Inspector2Service<Inspector2Client> {
    /// Collect the inventory using SDK clients for every enabled region.
    pub async fn from_factory(factory: &AwsClientFactory, scope: Arc<AuditScope>) -> Self {
        let clients = factory.inspector2_clients(scope.regions());
        Self::collect(scope, clients).await
    }
}

impl<C> Inspector2Service<C>
where
    C: Inspector2Api + Clone + Send + Sync + 'static,
{
    /// Read the scanner state per region, then attach each region's
    /// findings.
    pub async fn collect(scope: Arc<AuditScope>, clients: RegionalClientSet<C>) -> Self {
        info!(regions = clients.len(), "collecting inspector2 inventory");
        let mut service = Self {
            scope: scope.clone(),
            clients,
            inspectors: Vec::new(),
        };
        let s = scope.clone();
        service.inspectors = fan_out(&service.clients, "scanner state", move |region, client| {
            fetch_inspector(s.clone(), region, client)
        })
        .await;
        service.enrich_findings().await;
        info!(inspectors = service.inspectors.len(), "inspector2 inventory collected");
        service
    }

    pub fn scope(&self) -> &AuditScope {
        &self.scope
    }

    pub fn inspectors(&self) -> &[Inspector] {
        &self.inspectors
    }

    async fn enrich_findings(&mut self) {
        debug!("listing scanner findings");
        for inspector in &mut self.inspectors {
            let Some(client) = self.clients.get(&inspector.region) else {
                continue;
            };
            match region_findings(client, &inspector.region).await {
                Ok(findings) => inspector.findings = findings,
                Err(err) if err.is_not_found() => {
                    warn!(
                        region = %inspector.region,
                        error = %err,
                        "scanner vanished before finding lookup"
                    );
                }
                Err(err) => {
                    error!(
                        region = %inspector.region,
                        error = %err,
                        "failed to list scanner findings"
                    );
                }
            }
        }
    }
}

async fn region_findings<C: Inspector2Api>(
    client: &C,
    region: &str,
) -> Result<Vec<InspectorFinding>, ApiError> {
    let mut findings = Vec::new();
    let mut token = None;
    loop {
        let page = client.list_findings(token).await?;
        for data in page.items {
            findings.push(InspectorFinding {
                arn: require(data.arn, "finding", "FindingArn")?,
                region: region.to_string(),
                severity: data.severity,
                status: data.status,
                title: data.title,
            });
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    Ok(findings)
}

async fn fetch_inspector<C: Inspector2Api>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<Inspector>, ApiError> {
    // Regions where the service never answered for the account contribute
    // no record.
    let Some(status) = client.account_status().await? else {
        debug!(%region, "no scanner state reported");
        return Ok(Vec::new());
    };
    let arn = arn::build(
        scope.partition(),
        SERVICE,
        &region,
        scope.account_id(),
        "inspector",
        INSPECTOR_ID,
    );
    if !scope.includes(&arn) {
        return Ok(Vec::new());
    }
    debug!(%region, %status, "described scanner state");
    Ok(vec![Inspector {
        id: INSPECTOR_ID.to_string(),
        arn,
        region,
        status,
        findings: Vec::new(),
    }])
}
