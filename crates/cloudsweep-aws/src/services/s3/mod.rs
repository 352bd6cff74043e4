//! S3 resource collection
//!
//! The bucket listing is a global call served by the home-region client;
//! each bucket's region is resolved from its location constraint, and the
//! per-bucket enrichment reads are routed to that region's client when it
//! is enabled for the audit.

mod api;
#[cfg(test)]
mod tests;
pub mod types;

pub use api::{BucketData, S3Api, S3Client, VersioningData};

use crate::context::AwsClientFactory;
use crate::dispatch::RegionalClientSet;
use crate::error::ApiError;
use crate::scope::AuditScope;
use cloudsweep_common::{arn, defaults::DEFAULT_HOME_REGION};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use types::Bucket;

/// S3 inventory for one audit run.
pub struct S3Service<C = S3Client> {
    scope: Arc<AuditScope>,
    home: C,
    clients: RegionalClientSet<C>,
    buckets: Vec<Bucket>,
}

impl S3Service<S3Client> {
    /// Collect the inventory using SDK clients for every enabled region.
    pub async fn from_factory(factory: &AwsClientFactory, scope: Arc<AuditScope>) -> Self {
        let home = factory.s3_home_client(DEFAULT_HOME_REGION);
        let clients = factory.s3_clients(scope.regions());
        Self::collect(scope, home, clients).await
    }
}

impl<C> S3Service<C>
where
    C: S3Api + Clone + Send + Sync + 'static,
{
    /// Enumerate every bucket and resolve its configuration.
    pub async fn collect(scope: Arc<AuditScope>, home: C, clients: RegionalClientSet<C>) -> Self {
        info!("collecting s3 inventory");
        let mut service = Self {
            scope,
            home,
            clients,
            buckets: Vec::new(),
        };
        service.buckets = match service.list_buckets().await {
            Ok(buckets) => buckets,
            Err(err) => {
                error!(error = %err, "failed to list buckets");
                Vec::new()
            }
        };
        service.enrich_versioning().await;
        service.enrich_object_lock().await;
        service.enrich_tags().await;
        info!(buckets = service.buckets.len(), "s3 inventory collected");
        service
    }

    pub fn scope(&self) -> &AuditScope {
        &self.scope
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    async fn list_buckets(&self) -> Result<Vec<Bucket>, ApiError> {
        let mut records = Vec::new();
        for data in self.home.list_buckets().await? {
            let Some(name) = data.name else {
                continue;
            };
            let arn = arn::bucket(self.scope.partition(), &name);
            if !self.scope.includes(&arn) {
                continue;
            }
            let region = match self.home.bucket_location(&name).await {
                Ok(constraint) => constraint_region(constraint),
                Err(err) if err.is_not_found() => {
                    warn!(bucket = %name, error = %err, "bucket vanished before location lookup");
                    continue;
                }
                Err(err) => {
                    error!(bucket = %name, error = %err, "failed to resolve bucket region");
                    continue;
                }
            };
            records.push(Bucket {
                name,
                arn,
                region,
                creation_date: data.creation_date,
                versioning: false,
                mfa_delete: false,
                object_lock: false,
                tags: None,
            });
        }
        debug!(count = records.len(), "listed buckets");
        Ok(records)
    }

    async fn enrich_versioning(&mut self) {
        debug!("reading bucket versioning");
        for bucket in &mut self.buckets {
            let client = self.clients.get(&bucket.region).unwrap_or(&self.home);
            match client.bucket_versioning(&bucket.name).await {
                Ok(versioning) => {
                    bucket.versioning = versioning.status.as_deref() == Some("Enabled");
                    bucket.mfa_delete = versioning.mfa_delete.as_deref() == Some("Enabled");
                }
                Err(err) if err.is_not_found() => {
                    warn!(bucket = %bucket.name, error = %err, "bucket vanished before versioning lookup");
                }
                Err(err) => {
                    error!(bucket = %bucket.name, error = %err, "failed to read bucket versioning");
                }
            }
        }
    }

    async fn enrich_object_lock(&mut self) {
        debug!("reading bucket object lock configuration");
        for bucket in &mut self.buckets {
            let client = self.clients.get(&bucket.region).unwrap_or(&self.home);
            match client.object_lock_enabled(&bucket.name).await {
                Ok(enabled) => bucket.object_lock = enabled,
                // Buckets without object lock answer with a dedicated code.
                Err(err) if err.code() == Some("ObjectLockConfigurationNotFoundError") => {
                    debug!(bucket = %bucket.name, "no object lock configuration");
                }
                Err(err) if err.is_not_found() => {
                    warn!(bucket = %bucket.name, error = %err, "bucket vanished before object lock lookup");
                }
                Err(err) => {
                    error!(bucket = %bucket.name, error = %err, "failed to read object lock configuration");
                }
            }
        }
    }

    async fn enrich_tags(&mut self) {
        debug!("reading bucket tags");
        for bucket in &mut self.buckets {
            let client = self.clients.get(&bucket.region).unwrap_or(&self.home);
            match client.bucket_tags(&bucket.name).await {
                Ok(tags) if tags.is_empty() => {}
                Ok(tags) => bucket.tags = Some(tags),
                // Untagged buckets answer with a dedicated code.
                Err(err) if matches!(err.code(), Some("NoSuchTagSet" | "NoSuchTagSetError")) => {
                    debug!(bucket = %bucket.name, "bucket has no tag set");
                }
                Err(err) if err.is_not_found() => {
                    warn!(bucket = %bucket.name, error = %err, "bucket vanished before tag lookup");
                }
                Err(err) => {
                    error!(bucket = %bucket.name, error = %err, "failed to read bucket tags");
                }
            }
        }
    }
}

/// Map a location constraint to a region name. Buckets in the default
/// region report no constraint.
fn constraint_region(constraint: Option<String>) -> String {
    match constraint.as_deref() {
        None | Some("") => DEFAULT_HOME_REGION.to_string(),
        Some(region) => region.to_string(),
    }
}
