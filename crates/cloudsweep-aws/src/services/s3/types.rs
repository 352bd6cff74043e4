//! Normalized S3 inventory records

use chrono::{DateTime, Utc};
use cloudsweep_common::ResourceTag;
use serde::{Deserialize, Serialize};

/// S3 bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub arn: String,
    pub region: String,
    pub creation_date: Option<DateTime<Utc>>,
    /// Versioning enabled, filled by an enrichment pass.
    pub versioning: bool,
    pub mfa_delete: bool,
    pub object_lock: bool,
    pub tags: Option<Vec<ResourceTag>>,
}
