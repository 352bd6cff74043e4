//! Normalized ACM inventory records

use serde::{Deserialize, Serialize};

/// ACM certificate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub arn: String,
    pub region: String,
    /// Primary domain name the certificate covers.
    pub name: String,
    pub certificate_type: Option<String>,
    /// Days until expiry at collection time; negative once expired.
    /// Filled by an enrichment pass.
    pub expiration_days: Option<i64>,
    pub transparency_logging: Option<bool>,
}
