//! Normalized EC2 inventory records
//!
//! Required upstream fields are plain values; a provider entry missing one
//! aborts that region's round. Optional upstream fields stay `None` when
//! the provider omitted them.

use chrono::{DateTime, Utc};
use cloudsweep_common::ResourceTag;
use serde::{Deserialize, Serialize};

/// EC2 compute instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub arn: String,
    pub region: String,
    pub state: String,
    pub instance_type: String,
    pub image_id: String,
    pub launch_time: DateTime<Utc>,
    pub private_dns: String,
    pub private_ip: Option<String>,
    pub public_dns: Option<String>,
    pub public_ip: Option<String>,
    /// Base64 user-data payload, filled by an enrichment pass.
    pub user_data: Option<String>,
    pub http_tokens: Option<String>,
    pub http_endpoint: Option<String>,
    pub instance_profile_arn: Option<String>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// One ingress or egress rule of a security group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroupRule {
    pub protocol: Option<String>,
    pub from_port: Option<i32>,
    pub to_port: Option<i32>,
    pub ipv4_ranges: Vec<String>,
    pub ipv6_ranges: Vec<String>,
}

/// VPC security group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    pub arn: String,
    pub region: String,
    pub name: String,
    /// Ids of network interfaces attached to this group, filled by an
    /// enrichment pass.
    pub network_interface_ids: Vec<String>,
    pub ingress_rules: Vec<SecurityGroupRule>,
    pub egress_rules: Vec<SecurityGroupRule>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// One entry of a network ACL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkAclEntry {
    pub rule_number: Option<i32>,
    pub protocol: Option<String>,
    pub rule_action: Option<String>,
    pub egress: Option<bool>,
    pub cidr_block: Option<String>,
}

/// VPC network ACL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkAcl {
    pub id: String,
    pub arn: String,
    pub region: String,
    pub entries: Vec<NetworkAclEntry>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// EBS snapshot owned by the audited account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub arn: String,
    pub region: String,
    pub encrypted: bool,
    /// Observed shared with the `all` group at least once. Monotonic:
    /// enrichment only ever raises this flag.
    pub public: bool,
    pub tags: Option<Vec<ResourceTag>>,
}

/// Network interface carrying a public address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub id: String,
    pub arn: String,
    pub region: String,
    pub public_ip: String,
    pub private_ip: String,
    pub interface_type: String,
    pub subnet_id: String,
    pub vpc_id: String,
    pub tags: Option<Vec<ResourceTag>>,
}

/// Machine image owned by the audited account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub arn: String,
    pub region: String,
    pub name: String,
    pub public: bool,
    pub tags: Option<Vec<ResourceTag>>,
}

/// EBS volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub arn: String,
    pub region: String,
    pub encrypted: bool,
    pub tags: Option<Vec<ResourceTag>>,
}

/// Elastic IP allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticIp {
    pub arn: String,
    pub region: String,
    pub public_ip: Option<String>,
    pub association_id: Option<String>,
    pub allocation_id: Option<String>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// Per-region EBS encryption-by-default setting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EbsEncryptionDefault {
    pub arn: String,
    pub region: String,
    pub enabled: bool,
}
