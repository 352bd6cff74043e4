//! ACM resource collection
//!
//! Certificates are listed per region, then each one is described to
//! resolve its type, expiry horizon, and transparency-logging preference.

mod api;
#[cfg(test)]
mod tests;
pub mod types;

pub use api::{AcmApi, AcmClient, CertificateDetailData, CertificateSummaryData};

use crate::context::AwsClientFactory;
use crate::dispatch::{RegionalClientSet, fan_out};
use crate::error::{ApiError, require};
use crate::scope::AuditScope;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use types::Certificate;

/// ACM inventory for one audit run.
pub struct AcmService<C = AcmClient> {
    scope: Arc<AuditScope>,
    clients: RegionalClientSet<C>,
    certificates: Vec<Certificate>,
}

impl AcmService<AcmClient> {
    /// Collect the inventory using SDK clients for every enabled region.
    pub async fn from_factory(factory: &AwsClientFactory, scope: Arc<AuditScope>) -> Self {
        let clients = factory.acm_clients(scope.regions());
        Self::collect(scope, clients).await
    }
}

impl<C> AcmService<C>
where
    C: AcmApi + Clone + Send + Sync + 'static,
{
    /// Enumerate certificates across the given regions.
    pub async fn collect(scope: Arc<AuditScope>, clients: RegionalClientSet<C>) -> Self {
        info!(regions = clients.len(), "collecting acm inventory");
        let mut service = Self {
            scope: scope.clone(),
            clients,
            certificates: Vec::new(),
        };
        let s = scope.clone();
        service.certificates = fan_out(&service.clients, "certificates", move |region, client| {
            fetch_certificates(s.clone(), region, client)
        })
        .await;
        service.enrich_certificate_details().await;
        info!(certificates = service.certificates.len(), "acm inventory collected");
        service
    }

    pub fn scope(&self) -> &AuditScope {
        &self.scope
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    async fn enrich_certificate_details(&mut self) {
        debug!("describing certificates");
        for certificate in &mut self.certificates {
            let Some(client) = self.clients.get(&certificate.region) else {
                continue;
            };
            match client.describe_certificate(&certificate.arn).await {
                Ok(detail) => {
                    certificate.certificate_type = detail.certificate_type;
                    certificate.transparency_logging = detail.transparency_logging;
                    certificate.expiration_days = detail
                        .not_after
                        .map(|not_after| (not_after - Utc::now()).num_days());
                }
                Err(err) if err.is_not_found() => {
                    warn!(
                        region = %certificate.region,
                        certificate = %certificate.name,
                        error = %err,
                        "certificate vanished before detail lookup"
                    );
                }
                Err(err) => {
                    error!(
                        region = %certificate.region,
                        certificate = %certificate.name,
                        error = %err,
                        "failed to describe certificate"
                    );
                }
            }
        }
    }
}

async fn fetch_certificates<C: AcmApi>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<Certificate>, ApiError> {
    let mut records = Vec::new();
    let mut token = None;
    loop {
        let page = client.list_certificates(token).await?;
        for data in page.items {
            // ACM reports its own ARNs; they are not rebuilt locally.
            let arn = require(data.arn, "certificate", "CertificateArn")?;
            if !scope.includes(&arn) {
                continue;
            }
            records.push(Certificate {
                arn,
                region: region.clone(),
                name: require(data.domain_name, "certificate", "DomainName")?,
                certificate_type: None,
                expiration_days: None,
                transparency_logging: None,
            });
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    debug!(%region, count = records.len(), "listed certificates");
    Ok(records)
}
