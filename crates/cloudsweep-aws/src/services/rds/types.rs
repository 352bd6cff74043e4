//! Normalized RDS inventory records

use cloudsweep_common::ResourceTag;
use serde::{Deserialize, Serialize};

/// RDS database instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbInstance {
    pub id: String,
    pub arn: String,
    pub region: String,
    pub engine: String,
    pub status: String,
    pub engine_version: Option<String>,
    pub public: Option<bool>,
    pub encrypted: Option<bool>,
    pub deletion_protection: Option<bool>,
    pub auto_minor_version_upgrade: Option<bool>,
    pub multi_az: Option<bool>,
    pub backup_retention_period: Option<i32>,
    pub endpoint_address: Option<String>,
    pub tags: Option<Vec<ResourceTag>>,
}
