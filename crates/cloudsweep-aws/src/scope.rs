//! Audit identity and resource filtering
//!
//! `AuditScope` carries the identity and filter context of one audit run.
//! It is constructed once and injected into every service collector;
//! collectors never reach for process-wide shared state.

use cloudsweep_common::ResourceFilter;

/// Identity and filter context shared by every collector in a run.
#[derive(Debug, Clone)]
pub struct AuditScope {
    partition: String,
    account_id: String,
    regions: Vec<String>,
    filter: ResourceFilter,
}

impl AuditScope {
    /// Create a scope with no resource filter.
    pub fn new(
        partition: impl Into<String>,
        account_id: impl Into<String>,
        regions: Vec<String>,
    ) -> Self {
        Self {
            partition: partition.into(),
            account_id: account_id.into(),
            regions,
            filter: ResourceFilter::default(),
        }
    }

    /// Restrict the audit to an allow-list of resource identifiers.
    pub fn with_filter(mut self, filter: ResourceFilter) -> Self {
        self.filter = filter;
        self
    }

    /// ARN partition of the audited account (e.g. `aws`, `aws-cn`).
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Account id of the audited account.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Regions enabled for this audit.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Whether a candidate identifier passes the configured allow-list.
    pub fn includes(&self, identifier: &str) -> bool {
        self.filter.is_included(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_scope_includes_everything() {
        let scope = AuditScope::new("aws", "123456789012", vec!["eu-west-1".to_string()]);
        assert!(scope.includes("arn:aws:ec2:eu-west-1:123456789012:instance/i-0abc"));
    }

    #[test]
    fn filtered_scope_gates_by_identifier() {
        let scope = AuditScope::new("aws", "123456789012", vec![])
            .with_filter(ResourceFilter::new(vec!["arn:aws:s3:::audited-*".to_string()]));
        assert!(scope.includes("arn:aws:s3:::audited-logs"));
        assert!(!scope.includes("arn:aws:s3:::other-bucket"));
    }
}
