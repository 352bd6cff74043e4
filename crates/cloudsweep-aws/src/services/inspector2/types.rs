//! Normalized Inspector2 inventory records

use serde::{Deserialize, Serialize};

/// One vulnerability finding reported by the scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorFinding {
    pub arn: String,
    pub region: String,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
}

/// Per-region scanner state with its reported findings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspector {
    pub id: String,
    pub arn: String,
    pub region: String,
    pub status: String,
    /// Findings reported in this region, filled by an enrichment pass.
    pub findings: Vec<InspectorFinding>,
}
