//! S3 bucket operations
//!
//! Bucket listing is global; the per-bucket reads are routed to the
//! bucket's home region by the collector.

use crate::error::ApiError;
use crate::services::convert::to_utc;
use aws_config::{Region, SdkConfig};
use aws_sdk_s3::types::ObjectLockEnabled;
use chrono::{DateTime, Utc};
use cloudsweep_common::{ResourceTag, tags};
use std::future::Future;

/// Raw upstream view of one bucket listing entry
#[derive(Debug, Clone, Default)]
pub struct BucketData {
    pub name: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
}

/// Raw upstream view of a bucket's versioning configuration
#[derive(Debug, Clone, Default)]
pub struct VersioningData {
    pub status: Option<String>,
    pub mfa_delete: Option<String>,
}

/// S3 operations used by the collector.
pub trait S3Api: Send + Sync {
    fn list_buckets(&self) -> impl Future<Output = Result<Vec<BucketData>, ApiError>> + Send;

    /// The bucket's location constraint; `None` or empty means the default
    /// region.
    fn bucket_location(
        &self,
        bucket: &str,
    ) -> impl Future<Output = Result<Option<String>, ApiError>> + Send;

    fn bucket_versioning(
        &self,
        bucket: &str,
    ) -> impl Future<Output = Result<VersioningData, ApiError>> + Send;

    fn object_lock_enabled(
        &self,
        bucket: &str,
    ) -> impl Future<Output = Result<bool, ApiError>> + Send;

    fn bucket_tags(
        &self,
        bucket: &str,
    ) -> impl Future<Output = Result<Vec<ResourceTag>, ApiError>> + Send;
}

/// AWS SDK implementation of [`S3Api`] scoped to one region.
#[derive(Clone)]
pub struct S3Client {
    client: aws_sdk_s3::Client,
}

impl S3Client {
    /// Build a client for `region` from an already-loaded SDK config.
    pub fn new(config: &SdkConfig, region: &str) -> Self {
        let conf = aws_sdk_s3::config::Builder::from(config)
            .region(Region::new(region.to_string()))
            .build();
        Self {
            client: aws_sdk_s3::Client::from_conf(conf),
        }
    }
}

impl S3Api for S3Client {
    async fn list_buckets(&self) -> Result<Vec<BucketData>, ApiError> {
        let resp = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(resp
            .buckets()
            .iter()
            .map(|b| BucketData {
                name: b.name().map(str::to_string),
                creation_date: b.creation_date().and_then(to_utc),
            })
            .collect())
    }

    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>, ApiError> {
        let resp = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(resp
            .location_constraint()
            .map(|c| c.as_str().to_string()))
    }

    async fn bucket_versioning(&self, bucket: &str) -> Result<VersioningData, ApiError> {
        let resp = self
            .client
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(VersioningData {
            status: resp.status().map(|s| s.as_str().to_string()),
            mfa_delete: resp.mfa_delete().map(|m| m.as_str().to_string()),
        })
    }

    async fn object_lock_enabled(&self, bucket: &str) -> Result<bool, ApiError> {
        let resp = self
            .client
            .get_object_lock_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(resp
            .object_lock_configuration()
            .and_then(|c| c.object_lock_enabled())
            .map(|e| *e == ObjectLockEnabled::Enabled)
            .unwrap_or(false))
    }

    async fn bucket_tags(&self, bucket: &str) -> Result<Vec<ResourceTag>, ApiError> {
        let resp = self
            .client
            .get_bucket_tagging()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(tags::from_pairs(
            resp.tag_set(),
            |t| Some(t.key()),
            |t| Some(t.value()),
        ))
    }
}
