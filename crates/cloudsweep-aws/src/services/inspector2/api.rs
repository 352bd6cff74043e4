//! Inspector2 operations

use crate::error::ApiError;
use crate::page::Page;
use aws_config::{Region, SdkConfig};
use std::future::Future;

/// Raw upstream view of one finding
#[derive(Debug, Clone, Default)]
pub struct FindingData {
    pub arn: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
}

/// Inspector2 operations used by the collector.
pub trait Inspector2Api: Send + Sync {
    /// Enablement status of the audited account in this region, when the
    /// service answered for it.
    fn account_status(&self) -> impl Future<Output = Result<Option<String>, ApiError>> + Send;

    fn list_findings(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<FindingData>, ApiError>> + Send;
}

/// AWS SDK implementation of [`Inspector2Api`] scoped to one region.
#[derive(Clone)]
pub struct Inspector2Client {
    client: aws_sdk_inspector2::Client,
}

impl Inspector2Client {
    /// Build a client for `region` from an already-loaded SDK config.
    pub fn new(config: &SdkConfig, region: &str) -> Self {
        let conf = aws_sdk_inspector2::config::Builder::from(config)
            .region(Region::new(region.to_string()))
            .build();
        Self {
            client: aws_sdk_inspector2::Client::from_conf(conf),
        }
    }
}

impl Inspector2Api for Inspector2Client {
    async fn account_status(&self) -> Result<Option<String>, ApiError> {
        let resp = self
            .client
            .batch_get_account_status()
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(resp
            .accounts()
            .first()
            .and_then(|a| a.state())
            .and_then(|s| s.status())
            .map(|s| s.as_str().to_string()))
    }

    async fn list_findings(&self, next_token: Option<String>) -> Result<Page<FindingData>, ApiError> {
        let resp = self
            .client
            .list_findings()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp
                .findings()
                .iter()
                .map(|f| FindingData {
                    arn: f.finding_arn().map(str::to_string),
                    severity: f.severity().map(|s| s.as_str().to_string()),
                    status: f.status().map(|s| s.as_str().to_string()),
                    title: f.title().map(str::to_string),
                })
                .collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }
}
