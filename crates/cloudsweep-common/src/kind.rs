//! Collected resource kinds
//!
//! Labels every kind of record an inventory can hold, and maps each kind
//! to the service that collects it. Used for inventory summaries and log
//! context.

use serde::{Deserialize, Serialize};

/// Kinds of cloud resources recorded by the collectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// EC2 compute instance
    Instance,
    /// Machine image owned by the audited account
    Image,
    /// EBS volume
    Volume,
    /// VPC security group
    SecurityGroup,
    /// VPC network ACL
    NetworkAcl,
    /// EBS snapshot owned by the audited account
    Snapshot,
    /// Network interface with a public address
    NetworkInterface,
    /// Elastic IP allocation
    ElasticIp,
    /// Per-region EBS encryption-by-default setting
    EbsEncryptionDefault,
    /// S3 bucket
    Bucket,
    /// RDS database instance
    DbInstance,
    /// ECR container repository
    Repository,
    /// Inspector2 per-region scanner state
    Inspector,
    /// Backup plan
    BackupPlan,
    /// Backup report plan
    BackupReportPlan,
    /// ACM certificate
    Certificate,
}

impl ResourceKind {
    /// Short kebab-case label used in logs and summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Instance => "instance",
            ResourceKind::Image => "image",
            ResourceKind::Volume => "volume",
            ResourceKind::SecurityGroup => "security-group",
            ResourceKind::NetworkAcl => "network-acl",
            ResourceKind::Snapshot => "snapshot",
            ResourceKind::NetworkInterface => "network-interface",
            ResourceKind::ElasticIp => "elastic-ip",
            ResourceKind::EbsEncryptionDefault => "ebs-encryption-default",
            ResourceKind::Bucket => "bucket",
            ResourceKind::DbInstance => "db-instance",
            ResourceKind::Repository => "repository",
            ResourceKind::Inspector => "inspector",
            ResourceKind::BackupPlan => "backup-plan",
            ResourceKind::BackupReportPlan => "backup-report-plan",
            ResourceKind::Certificate => "certificate",
        }
    }

    /// Name of the provider service that collects this kind.
    pub fn service(self) -> &'static str {
        match self {
            ResourceKind::Instance
            | ResourceKind::Image
            | ResourceKind::Volume
            | ResourceKind::SecurityGroup
            | ResourceKind::NetworkAcl
            | ResourceKind::Snapshot
            | ResourceKind::NetworkInterface
            | ResourceKind::ElasticIp
            | ResourceKind::EbsEncryptionDefault => "ec2",
            ResourceKind::Bucket => "s3",
            ResourceKind::DbInstance => "rds",
            ResourceKind::Repository => "ecr",
            ResourceKind::Inspector => "inspector2",
            ResourceKind::BackupPlan | ResourceKind::BackupReportPlan => "backup",
            ResourceKind::Certificate => "acm",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ec2_kinds_belong_to_ec2() {
        for kind in [
            ResourceKind::Instance,
            ResourceKind::Snapshot,
            ResourceKind::SecurityGroup,
            ResourceKind::EbsEncryptionDefault,
        ] {
            assert_eq!(kind.service(), "ec2");
        }
    }

    #[test]
    fn labels_are_kebab_case() {
        assert_eq!(ResourceKind::DbInstance.as_str(), "db-instance");
        assert_eq!(ResourceKind::BackupReportPlan.to_string(), "backup-report-plan");
    }

    #[test]
    fn backup_kinds_share_a_service() {
        assert_eq!(ResourceKind::BackupPlan.service(), "backup");
        assert_eq!(ResourceKind::BackupReportPlan.service(), "backup");
    }
}
