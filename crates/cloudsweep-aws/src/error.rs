//! Provider error classification
//!
//! Uses the provider error code via `ProvideErrorMetadata` instead of
//! string matching on the Debug format. The only classification the
//! collectors need is "did the referenced resource vanish between the
//! primary pass and this call" - everything else is an ordinary failure.

use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use thiserror::Error;

/// Failure of a provider API call or of response normalization.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    code: Option<String>,
    message: String,
}

/// Known provider error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "InvalidInstanceID.NotFound",
    "InvalidSnapshot.NotFound",
    "InvalidGroup.NotFound",
    "InvalidNetworkInterfaceID.NotFound",
    "InvalidAllocationID.NotFound",
    "NoSuchBucket",
    "NoSuchTagSet",
    "NoSuchTagSetError",
    "ObjectLockConfigurationNotFoundError",
    "DBInstanceNotFound",
    "RepositoryNotFoundException",
    "ImageNotFoundException",
    "ScanNotFoundException",
    "ResourceNotFoundException",
];

impl ApiError {
    /// Create an error with an optional provider code.
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build from any AWS SDK error that exposes error metadata.
    pub fn from_sdk<E>(err: &E) -> Self
    where
        E: ProvideErrorMetadata,
    {
        Self {
            code: err.code().map(str::to_string),
            message: err.message().unwrap_or("unknown provider error").to_string(),
        }
    }

    /// Normalization failure: a field the data model requires was absent
    /// from the provider response.
    pub fn missing_field(kind: &str, field: &str) -> Self {
        Self {
            code: None,
            message: format!("{kind} entry is missing required field {field}"),
        }
    }

    /// Provider error code, when one was returned.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Expected-absence condition: the referenced resource no longer
    /// exists. Enrichment passes log this at warn level and move on.
    pub fn is_not_found(&self) -> bool {
        matches!(self.code.as_deref(), Some(code) if NOT_FOUND_CODES.contains(&code))
    }
}

/// Require a field the record model cannot do without.
pub fn require<T>(field: Option<T>, kind: &str, name: &str) -> Result<T, ApiError> {
    field.ok_or_else(|| ApiError::missing_field(kind, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes_classify() {
        for code in NOT_FOUND_CODES {
            let err = ApiError::new(Some((*code).to_string()), "gone");
            assert!(err.is_not_found(), "expected not-found for code {code}");
        }
    }

    #[test]
    fn other_codes_are_not_not_found() {
        let err = ApiError::new(Some("Throttling".to_string()), "slow down");
        assert!(!err.is_not_found());
        let err = ApiError::new(None, "connection reset");
        assert!(!err.is_not_found());
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = ApiError::missing_field("snapshot", "SnapshotId");
        assert!(err.to_string().contains("SnapshotId"));
        assert!(err.code().is_none());
        assert!(!err.is_not_found());
    }

    #[test]
    fn require_passes_through_present_values() {
        assert_eq!(require(Some(7), "volume", "Size").unwrap(), 7);
        assert!(require::<i32>(None, "volume", "Size").is_err());
    }
}
