use super::api::{BucketData, S3Api, VersioningData};
use super::S3Service;
use crate::dispatch::RegionalClientSet;
use crate::error::ApiError;
use crate::scope::AuditScope;
use cloudsweep_common::{ResourceFilter, ResourceTag};
use std::collections::HashMap;
use std::sync::Arc;

/// Configurable in-memory S3 API.
#[derive(Clone, Default)]
struct FakeS3 {
    buckets: Vec<BucketData>,
    locations: HashMap<String, Option<String>>,
    versioning: HashMap<String, Result<VersioningData, ApiError>>,
    object_lock: HashMap<String, Result<bool, ApiError>>,
    tag_sets: HashMap<String, Result<Vec<ResourceTag>, ApiError>>,
    fail_listing: bool,
}

impl S3Api for FakeS3 {
    async fn list_buckets(&self) -> Result<Vec<BucketData>, ApiError> {
        if self.fail_listing {
            return Err(ApiError::new(Some("AccessDenied".into()), "listing denied"));
        }
        Ok(self.buckets.clone())
    }

    async fn bucket_location(&self, bucket: &str) -> Result<Option<String>, ApiError> {
        Ok(self.locations.get(bucket).cloned().unwrap_or(None))
    }

    async fn bucket_versioning(&self, bucket: &str) -> Result<VersioningData, ApiError> {
        self.versioning
            .get(bucket)
            .cloned()
            .unwrap_or_else(|| Ok(VersioningData::default()))
    }

    async fn object_lock_enabled(&self, bucket: &str) -> Result<bool, ApiError> {
        self.object_lock.get(bucket).cloned().unwrap_or(Ok(false))
    }

    async fn bucket_tags(&self, bucket: &str) -> Result<Vec<ResourceTag>, ApiError> {
        self.tag_sets.get(bucket).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn scope() -> Arc<AuditScope> {
    Arc::new(AuditScope::new("aws", "123456789012", Vec::new()))
}

fn bucket(name: &str) -> BucketData {
    BucketData {
        name: Some(name.to_string()),
        creation_date: None,
    }
}

#[tokio::test]
async fn bucket_regions_come_from_location_constraints() {
    let home = FakeS3 {
        buckets: vec![bucket("eu-logs"), bucket("default-logs")],
        locations: HashMap::from([
            ("eu-logs".to_string(), Some("eu-west-1".to_string())),
            ("default-logs".to_string(), None),
        ]),
        ..Default::default()
    };
    let service = S3Service::collect(scope(), home, RegionalClientSet::new()).await;

    assert_eq!(service.buckets().len(), 2);
    assert_eq!(service.buckets()[0].region, "eu-west-1");
    assert_eq!(service.buckets()[0].arn, "arn:aws:s3:::eu-logs");
    assert_eq!(service.buckets()[1].region, "us-east-1");
}

#[tokio::test]
async fn listing_failure_yields_empty_inventory() {
    let home = FakeS3 {
        fail_listing: true,
        ..Default::default()
    };
    let service = S3Service::collect(scope(), home, RegionalClientSet::new()).await;
    assert!(service.buckets().is_empty());
}

#[tokio::test]
async fn allow_list_gates_buckets() {
    let home = FakeS3 {
        buckets: vec![bucket("audited-logs"), bucket("other")],
        ..Default::default()
    };
    let scope = Arc::new(
        AuditScope::new("aws", "123456789012", Vec::new())
            .with_filter(ResourceFilter::new(vec!["arn:aws:s3:::audited-*".to_string()])),
    );
    let service = S3Service::collect(scope, home, RegionalClientSet::new()).await;

    assert_eq!(service.buckets().len(), 1);
    assert_eq!(service.buckets()[0].name, "audited-logs");
}

#[tokio::test]
async fn enrichment_maps_bucket_configuration() {
    let home = FakeS3 {
        buckets: vec![bucket("locked")],
        versioning: HashMap::from([(
            "locked".to_string(),
            Ok(VersioningData {
                status: Some("Enabled".to_string()),
                mfa_delete: Some("Disabled".to_string()),
            }),
        )]),
        object_lock: HashMap::from([("locked".to_string(), Ok(true))]),
        tag_sets: HashMap::from([(
            "locked".to_string(),
            Ok(vec![ResourceTag::new("env", "prod")]),
        )]),
        ..Default::default()
    };
    let service = S3Service::collect(scope(), home, RegionalClientSet::new()).await;

    let bucket = &service.buckets()[0];
    assert!(bucket.versioning);
    assert!(!bucket.mfa_delete);
    assert!(bucket.object_lock);
    assert_eq!(bucket.tags.as_deref(), Some(&[ResourceTag::new("env", "prod")][..]));
}

#[tokio::test]
async fn absent_configuration_keeps_defaults() {
    let home = FakeS3 {
        buckets: vec![bucket("plain")],
        versioning: HashMap::from([(
            "plain".to_string(),
            Err(ApiError::new(Some("NoSuchBucket".to_string()), "vanished")),
        )]),
        object_lock: HashMap::from([(
            "plain".to_string(),
            Err(ApiError::new(
                Some("ObjectLockConfigurationNotFoundError".to_string()),
                "no configuration",
            )),
        )]),
        tag_sets: HashMap::from([(
            "plain".to_string(),
            Err(ApiError::new(Some("NoSuchTagSet".to_string()), "no tags")),
        )]),
        ..Default::default()
    };
    let service = S3Service::collect(scope(), home, RegionalClientSet::new()).await;

    let bucket = &service.buckets()[0];
    assert!(!bucket.versioning);
    assert!(!bucket.object_lock);
    assert_eq!(bucket.tags, None);
}

#[tokio::test]
async fn enrichment_routes_to_the_bucket_region() {
    // The home client knows nothing about versioning; only the regional
    // client answers Enabled. A bucket in a region without an enabled
    // client falls back to the home client.
    let home = FakeS3 {
        buckets: vec![bucket("eu-logs"), bucket("ap-logs")],
        locations: HashMap::from([
            ("eu-logs".to_string(), Some("eu-west-1".to_string())),
            ("ap-logs".to_string(), Some("ap-south-1".to_string())),
        ]),
        versioning: HashMap::from([(
            "ap-logs".to_string(),
            Ok(VersioningData {
                status: Some("Enabled".to_string()),
                mfa_delete: None,
            }),
        )]),
        ..Default::default()
    };
    let eu = FakeS3 {
        versioning: HashMap::from([(
            "eu-logs".to_string(),
            Ok(VersioningData {
                status: Some("Enabled".to_string()),
                mfa_delete: None,
            }),
        )]),
        ..Default::default()
    };
    let clients: RegionalClientSet<FakeS3> =
        RegionalClientSet::from([("eu-west-1".to_string(), eu)]);
    let service = S3Service::collect(scope(), home, clients).await;

    assert!(service.buckets()[0].versioning, "regional client served eu-logs");
    assert!(service.buckets()[1].versioning, "home client served ap-logs");
}
