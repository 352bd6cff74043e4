//! RDS describe operations

use crate::error::ApiError;
use crate::page::Page;
use aws_config::{Region, SdkConfig};
use cloudsweep_common::{ResourceTag, tags};
use std::future::Future;

/// Raw upstream view of one database instance
#[derive(Debug, Clone, Default)]
pub struct DbInstanceData {
    pub identifier: Option<String>,
    pub arn: Option<String>,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    pub status: Option<String>,
    pub publicly_accessible: Option<bool>,
    pub storage_encrypted: Option<bool>,
    pub deletion_protection: Option<bool>,
    pub auto_minor_version_upgrade: Option<bool>,
    pub multi_az: Option<bool>,
    pub backup_retention_period: Option<i32>,
    pub endpoint_address: Option<String>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// RDS operations used by the collector.
pub trait RdsApi: Send + Sync {
    fn describe_db_instances(
        &self,
        marker: Option<String>,
    ) -> impl Future<Output = Result<Page<DbInstanceData>, ApiError>> + Send;
}

/// AWS SDK implementation of [`RdsApi`] scoped to one region.
#[derive(Clone)]
pub struct RdsClient {
    client: aws_sdk_rds::Client,
}

impl RdsClient {
    /// Build a client for `region` from an already-loaded SDK config.
    pub fn new(config: &SdkConfig, region: &str) -> Self {
        let conf = aws_sdk_rds::config::Builder::from(config)
            .region(Region::new(region.to_string()))
            .build();
        Self {
            client: aws_sdk_rds::Client::from_conf(conf),
        }
    }
}

impl RdsApi for RdsClient {
    async fn describe_db_instances(
        &self,
        marker: Option<String>,
    ) -> Result<Page<DbInstanceData>, ApiError> {
        let resp = self
            .client
            .describe_db_instances()
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp.db_instances().iter().map(map_db_instance).collect(),
            next_token: resp.marker().map(str::to_string),
        })
    }
}

fn map_db_instance(db: &aws_sdk_rds::types::DbInstance) -> DbInstanceData {
    let tag_list = db.tag_list();
    DbInstanceData {
        identifier: db.db_instance_identifier().map(str::to_string),
        arn: db.db_instance_arn().map(str::to_string),
        engine: db.engine().map(str::to_string),
        engine_version: db.engine_version().map(str::to_string),
        status: db.db_instance_status().map(str::to_string),
        publicly_accessible: db.publicly_accessible(),
        storage_encrypted: db.storage_encrypted(),
        deletion_protection: db.deletion_protection(),
        auto_minor_version_upgrade: db.auto_minor_version_upgrade(),
        multi_az: db.multi_az(),
        backup_retention_period: db.backup_retention_period(),
        endpoint_address: db.endpoint().and_then(|e| e.address()).map(str::to_string),
        tags: if tag_list.is_empty() {
            None
        } else {
            Some(tags::from_pairs(tag_list, |t| t.key(), |t| t.value()))
        },
    }
}
