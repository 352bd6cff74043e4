//! Per-region SDK client construction
//!
//! Loads AWS SDK configuration once and derives one service client per
//! enabled region from it, so every collection round shares a single
//! credential resolution.

use crate::dispatch::RegionalClientSet;
use crate::services::acm::AcmClient;
use crate::services::backup::BackupClient;
use crate::services::ec2::Ec2Client;
use crate::services::ecr::EcrClient;
use crate::services::inspector2::Inspector2Client;
use crate::services::rds::RdsClient;
use crate::services::s3::S3Client;
use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, SdkConfig};
use std::sync::Arc;

/// Shared AWS configuration for creating regional service clients.
#[derive(Clone)]
pub struct AwsClientFactory {
    config: Arc<SdkConfig>,
}

impl AwsClientFactory {
    /// Load AWS configuration with the default credential chain.
    pub async fn load() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::from_config(config)
    }

    /// Wrap an already-loaded SDK config.
    pub fn from_config(config: SdkConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Resolve the audited account id via STS.
    pub async fn account_id(&self) -> Result<String> {
        let sts = aws_sdk_sts::Client::new(self.sdk_config());
        let identity = sts
            .get_caller_identity()
            .send()
            .await
            .context("Failed to resolve caller identity")?;
        identity
            .account()
            .map(str::to_string)
            .context("Caller identity has no account id")
    }

    /// One EC2 client per enabled region.
    pub fn ec2_clients(&self, regions: &[String]) -> RegionalClientSet<Ec2Client> {
        self.regional(regions, Ec2Client::new)
    }

    /// One S3 client per enabled region.
    pub fn s3_clients(&self, regions: &[String]) -> RegionalClientSet<S3Client> {
        self.regional(regions, S3Client::new)
    }

    /// S3 client for the home region, used for the global bucket listing.
    pub fn s3_home_client(&self, region: &str) -> S3Client {
        S3Client::new(self.sdk_config(), region)
    }

    /// One RDS client per enabled region.
    pub fn rds_clients(&self, regions: &[String]) -> RegionalClientSet<RdsClient> {
        self.regional(regions, RdsClient::new)
    }

    /// One ECR client per enabled region.
    pub fn ecr_clients(&self, regions: &[String]) -> RegionalClientSet<EcrClient> {
        self.regional(regions, EcrClient::new)
    }

    /// One Inspector2 client per enabled region.
    pub fn inspector2_clients(&self, regions: &[String]) -> RegionalClientSet<Inspector2Client> {
        self.regional(regions, Inspector2Client::new)
    }

    /// One Backup client per enabled region.
    pub fn backup_clients(&self, regions: &[String]) -> RegionalClientSet<BackupClient> {
        self.regional(regions, BackupClient::new)
    }

    /// One ACM client per enabled region.
    pub fn acm_clients(&self, regions: &[String]) -> RegionalClientSet<AcmClient> {
        self.regional(regions, AcmClient::new)
    }

    fn regional<C>(
        &self,
        regions: &[String],
        build: impl Fn(&SdkConfig, &str) -> C,
    ) -> RegionalClientSet<C> {
        regions
            .iter()
            .map(|region| (region.clone(), build(self.sdk_config(), region)))
            .collect()
    }
}

impl std::fmt::Debug for AwsClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsClientFactory").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn resolves_account_identity() {
        let factory = AwsClientFactory::load().await;
        let account = factory.account_id().await.unwrap();
        assert_eq!(account.len(), 12);
    }

    #[tokio::test]
    async fn builds_one_client_per_region() {
        let config = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();
        let factory = AwsClientFactory::from_config(config);
        let regions = vec!["eu-west-1".to_string(), "us-east-1".to_string()];
        let clients = factory.ec2_clients(&regions);
        assert_eq!(clients.len(), 2);
        assert!(clients.contains_key("eu-west-1"));
        assert!(clients.contains_key("us-east-1"));
    }
}
