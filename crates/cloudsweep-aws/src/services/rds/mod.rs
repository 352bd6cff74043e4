//! RDS resource collection

mod api;
pub mod types;

pub use api::{DbInstanceData, RdsApi, RdsClient};

use crate::context::AwsClientFactory;
use crate::dispatch::{RegionalClientSet, fan_out};
use crate::error::{ApiError, require};
use crate::scope::AuditScope;
use std::sync::Arc;
use tracing::{debug, info};
use types::DbInstance;

/// RDS inventory for one audit run.
pub struct RdsService {
    scope: Arc<AuditScope>,
    db_instances: Vec<DbInstance>,
}

impl RdsService {
    /// Collect the inventory using SDK clients for every enabled region.
    pub async fn from_factory(factory: &AwsClientFactory, scope: Arc<AuditScope>) -> Self {
        let clients = factory.rds_clients(scope.regions());
        Self::collect(scope, clients).await
    }

    /// Enumerate database instances across the given regions.
    pub async fn collect<C>(scope: Arc<AuditScope>, clients: RegionalClientSet<C>) -> Self
    where
        C: RdsApi + Clone + Send + Sync + 'static,
    {
        info!(regions = clients.len(), "collecting rds inventory");
        let s = scope.clone();
        let db_instances = fan_out(&clients, "db instances", move |region, client| {
            fetch_db_instances(s.clone(), region, client)
        })
        .await;
        info!(db_instances = db_instances.len(), "rds inventory collected");
        Self {
            scope,
            db_instances,
        }
    }

    pub fn scope(&self) -> &AuditScope {
        &self.scope
    }

    pub fn db_instances(&self) -> &[DbInstance] {
        &self.db_instances
    }
}

async fn fetch_db_instances<C: RdsApi>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<DbInstance>, ApiError> {
    let mut records = Vec::new();
    let mut marker = None;
    loop {
        let page = client.describe_db_instances(marker).await?;
        for data in page.items {
            // RDS reports its own ARNs; they are not rebuilt locally.
            let arn = require(data.arn, "db instance", "DBInstanceArn")?;
            if !scope.includes(&arn) {
                continue;
            }
            records.push(DbInstance {
                id: require(data.identifier, "db instance", "DBInstanceIdentifier")?,
                arn,
                region: region.clone(),
                engine: require(data.engine, "db instance", "Engine")?,
                status: require(data.status, "db instance", "DBInstanceStatus")?,
                engine_version: data.engine_version,
                public: data.publicly_accessible,
                encrypted: data.storage_encrypted,
                deletion_protection: data.deletion_protection,
                auto_minor_version_upgrade: data.auto_minor_version_upgrade,
                multi_az: data.multi_az,
                backup_retention_period: data.backup_retention_period,
                endpoint_address: data.endpoint_address,
                tags: data.tags,
            });
        }
        marker = page.next_token;
        if marker.is_none() {
            break;
        }
    }
    debug!(%region, count = records.len(), "described db instances");
    Ok(records)
}
