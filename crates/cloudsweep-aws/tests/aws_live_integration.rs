//! Live AWS integration tests
//!
//! These tests hit real AWS APIs and require credentials; they are ignored
//! in regular test runs. Run with:
//! `cargo test -p cloudsweep-aws -- --ignored`

use cloudsweep_aws::services::ec2::Ec2Service;
use cloudsweep_aws::services::s3::S3Service;
use cloudsweep_aws::{AuditScope, AwsClientFactory};
use std::sync::Arc;

fn test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-1".to_string())
}

async fn test_scope(factory: &AwsClientFactory) -> Arc<AuditScope> {
    let account = factory.account_id().await.expect("caller identity");
    Arc::new(AuditScope::new("aws", account, vec![test_region()]))
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn collects_ec2_inventory_in_one_region() {
    let factory = AwsClientFactory::load().await;
    let scope = test_scope(&factory).await;
    let service = Ec2Service::from_factory(&factory, scope.clone()).await;

    // Every record carries a region-scoped identifier in the audited
    // partition and account.
    for instance in service.instances() {
        assert!(instance.arn.starts_with("arn:aws:ec2:"));
        assert!(instance.arn.contains(scope.account_id()));
        assert_eq!(instance.region, test_region());
    }
    // The encryption-default round always answers once per region.
    assert_eq!(service.encryption_defaults().len(), 1);
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn collects_s3_inventory() {
    let factory = AwsClientFactory::load().await;
    let scope = test_scope(&factory).await;
    let service = S3Service::from_factory(&factory, scope).await;

    for bucket in service.buckets() {
        assert_eq!(bucket.arn, format!("arn:aws:s3:::{}", bucket.name));
        assert!(!bucket.region.is_empty());
    }
}
