//! Normalized ECR inventory records

use chrono::{DateTime, Utc};
use cloudsweep_common::ResourceTag;
use serde::{Deserialize, Serialize};

/// Scan finding counts by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: i32,
    pub high: i32,
    pub medium: i32,
}

/// One image of a repository, newest last
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDetail {
    pub tag: Option<String>,
    pub digest: Option<String>,
    pub pushed_at: Option<DateTime<Utc>>,
    /// Scan outcome for the newest image, filled by an enrichment pass.
    pub scan_status: Option<String>,
    pub severity_counts: Option<SeverityCounts>,
}

/// ECR container repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub arn: String,
    pub region: String,
    pub scan_on_push: Option<bool>,
    pub tag_immutability: Option<String>,
    /// Images ordered by push time, filled by an enrichment pass.
    pub images: Vec<ImageDetail>,
    pub tags: Option<Vec<ResourceTag>>,
}

impl Repository {
    /// The most recently pushed image, when any image exists.
    pub fn newest_image(&self) -> Option<&ImageDetail> {
        self.images.last()
    }
}
