//! ECR describe operations

use super::types::SeverityCounts;
use crate::error::ApiError;
use crate::page::Page;
use crate::services::convert::to_utc;
use aws_config::{Region, SdkConfig};
use aws_sdk_ecr::types::{FindingSeverity, ImageIdentifier};
use chrono::{DateTime, Utc};
use cloudsweep_common::{ResourceTag, tags};
use std::future::Future;

/// Raw upstream view of one repository
#[derive(Debug, Clone, Default)]
pub struct RepositoryData {
    pub name: Option<String>,
    pub arn: Option<String>,
    pub scan_on_push: Option<bool>,
    pub tag_immutability: Option<String>,
}

/// Raw upstream view of one image detail entry
#[derive(Debug, Clone, Default)]
pub struct ImageDetailData {
    pub digest: Option<String>,
    pub image_tags: Vec<String>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Raw upstream view of an image's scan outcome
#[derive(Debug, Clone, Default)]
pub struct ScanFindingsData {
    pub status: Option<String>,
    pub severity_counts: Option<SeverityCounts>,
}

/// ECR operations used by the collector.
pub trait EcrApi: Send + Sync {
    fn describe_repositories(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<RepositoryData>, ApiError>> + Send;

    fn describe_images(
        &self,
        repository: &str,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<ImageDetailData>, ApiError>> + Send;

    fn image_scan_findings(
        &self,
        repository: &str,
        image_digest: &str,
    ) -> impl Future<Output = Result<ScanFindingsData, ApiError>> + Send;

    fn repository_tags(
        &self,
        repository_arn: &str,
    ) -> impl Future<Output = Result<Vec<ResourceTag>, ApiError>> + Send;
}

/// AWS SDK implementation of [`EcrApi`] scoped to one region.
#[derive(Clone)]
pub struct EcrClient {
    client: aws_sdk_ecr::Client,
}

impl EcrClient {
    /// Build a client for `region` from an already-loaded SDK config.
    pub fn new(config: &SdkConfig, region: &str) -> Self {
        let conf = aws_sdk_ecr::config::Builder::from(config)
            .region(Region::new(region.to_string()))
            .build();
        Self {
            client: aws_sdk_ecr::Client::from_conf(conf),
        }
    }
}

impl EcrApi for EcrClient {
    async fn describe_repositories(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<RepositoryData>, ApiError> {
        let resp = self
            .client
            .describe_repositories()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp
                .repositories()
                .iter()
                .map(|r| RepositoryData {
                    name: r.repository_name().map(str::to_string),
                    arn: r.repository_arn().map(str::to_string),
                    scan_on_push: r.image_scanning_configuration().map(|c| c.scan_on_push()),
                    tag_immutability: r
                        .image_tag_mutability()
                        .map(|m| m.as_str().to_string()),
                })
                .collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn describe_images(
        &self,
        repository: &str,
        next_token: Option<String>,
    ) -> Result<Page<ImageDetailData>, ApiError> {
        let resp = self
            .client
            .describe_images()
            .repository_name(repository)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp
                .image_details()
                .iter()
                .map(|i| ImageDetailData {
                    digest: i.image_digest().map(str::to_string),
                    image_tags: i.image_tags().to_vec(),
                    pushed_at: i.image_pushed_at().and_then(to_utc),
                })
                .collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn image_scan_findings(
        &self,
        repository: &str,
        image_digest: &str,
    ) -> Result<ScanFindingsData, ApiError> {
        let resp = self
            .client
            .describe_image_scan_findings()
            .repository_name(repository)
            .image_id(ImageIdentifier::builder().image_digest(image_digest).build())
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        let counts = resp
            .image_scan_findings()
            .and_then(|f| f.finding_severity_counts())
            .map(|map| SeverityCounts {
                critical: map.get(&FindingSeverity::Critical).copied().unwrap_or(0),
                high: map.get(&FindingSeverity::High).copied().unwrap_or(0),
                medium: map.get(&FindingSeverity::Medium).copied().unwrap_or(0),
            });
        Ok(ScanFindingsData {
            status: resp
                .image_scan_status()
                .and_then(|s| s.status())
                .map(|s| s.as_str().to_string()),
            severity_counts: counts,
        })
    }

    async fn repository_tags(&self, repository_arn: &str) -> Result<Vec<ResourceTag>, ApiError> {
        let resp = self
            .client
            .list_tags_for_resource()
            .resource_arn(repository_arn)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(tags::from_pairs(
            resp.tags(),
            |t| Some(t.key()),
            |t| Some(t.value()),
        ))
    }
}
