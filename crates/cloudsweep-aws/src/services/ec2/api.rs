//! EC2 describe operations
//!
//! The trait abstracts the paginated describe calls so collection logic
//! can be exercised against fakes; [`Ec2Client`] is the AWS SDK
//! implementation. Data structs are the raw upstream view: every field the
//! provider may omit is optional, and absence is preserved.

use super::types::{NetworkAclEntry, SecurityGroupRule};
use crate::services::convert::to_utc;
use crate::error::ApiError;
use crate::page::Page;
use aws_config::{Region, SdkConfig};
use aws_sdk_ec2::types::{Filter, InstanceAttributeName, SnapshotAttributeName};
use chrono::{DateTime, Utc};
use cloudsweep_common::{ResourceTag, tags};
use std::future::Future;

/// Raw upstream view of one instance
#[derive(Debug, Clone, Default)]
pub struct InstanceData {
    pub instance_id: Option<String>,
    pub state: Option<String>,
    pub instance_type: Option<String>,
    pub image_id: Option<String>,
    pub launch_time: Option<DateTime<Utc>>,
    pub private_dns_name: Option<String>,
    pub private_ip_address: Option<String>,
    pub public_dns_name: Option<String>,
    pub public_ip_address: Option<String>,
    pub http_tokens: Option<String>,
    pub http_endpoint: Option<String>,
    pub instance_profile_arn: Option<String>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// Raw upstream view of one security group
#[derive(Debug, Clone, Default)]
pub struct SecurityGroupData {
    pub group_id: Option<String>,
    pub group_name: Option<String>,
    pub ingress_rules: Vec<SecurityGroupRule>,
    pub egress_rules: Vec<SecurityGroupRule>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// Raw upstream view of one network ACL
#[derive(Debug, Clone, Default)]
pub struct NetworkAclData {
    pub network_acl_id: Option<String>,
    pub entries: Vec<NetworkAclEntry>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// Raw upstream view of one snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotData {
    pub snapshot_id: Option<String>,
    pub encrypted: Option<bool>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// One create-volume permission of a snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotPermissionData {
    pub group: Option<String>,
    pub user_id: Option<String>,
}

/// Raw upstream view of one network interface
#[derive(Debug, Clone, Default)]
pub struct NetworkInterfaceData {
    pub network_interface_id: Option<String>,
    /// Public IP of the interface's association, when one exists.
    pub association_public_ip: Option<String>,
    pub interface_type: Option<String>,
    pub private_ip_address: Option<String>,
    pub subnet_id: Option<String>,
    pub vpc_id: Option<String>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// Raw upstream view of one image
#[derive(Debug, Clone, Default)]
pub struct ImageData {
    pub image_id: Option<String>,
    pub name: Option<String>,
    pub public: Option<bool>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// Raw upstream view of one volume
#[derive(Debug, Clone, Default)]
pub struct VolumeData {
    pub volume_id: Option<String>,
    pub encrypted: Option<bool>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// Raw upstream view of one elastic IP address
#[derive(Debug, Clone, Default)]
pub struct AddressData {
    pub public_ip: Option<String>,
    pub association_id: Option<String>,
    pub allocation_id: Option<String>,
    pub tags: Option<Vec<ResourceTag>>,
}

/// EC2 operations used by the collector.
pub trait Ec2Api: Send + Sync {
    /// One page of instances, reservations flattened.
    fn describe_instances(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<InstanceData>, ApiError>> + Send;

    fn describe_security_groups(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<SecurityGroupData>, ApiError>> + Send;

    fn describe_network_acls(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<NetworkAclData>, ApiError>> + Send;

    /// One page of snapshots owned by the audited account.
    fn describe_own_snapshots(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<SnapshotData>, ApiError>> + Send;

    fn describe_network_interfaces(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<NetworkInterfaceData>, ApiError>> + Send;

    /// Images owned by the audited account (single call, no pagination).
    fn describe_own_images(&self)
    -> impl Future<Output = Result<Vec<ImageData>, ApiError>> + Send;

    fn describe_volumes(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<VolumeData>, ApiError>> + Send;

    fn describe_addresses(&self)
    -> impl Future<Output = Result<Vec<AddressData>, ApiError>> + Send;

    /// The region's EBS encryption-by-default setting.
    fn ebs_encryption_by_default(&self) -> impl Future<Output = Result<bool, ApiError>> + Send;

    /// The instance's base64 user-data payload, when one is set.
    fn instance_user_data(
        &self,
        instance_id: &str,
    ) -> impl Future<Output = Result<Option<String>, ApiError>> + Send;

    fn snapshot_create_volume_permissions(
        &self,
        snapshot_id: &str,
    ) -> impl Future<Output = Result<Vec<SnapshotPermissionData>, ApiError>> + Send;

    /// One page of ids of network interfaces attached to a security group.
    fn group_network_interfaces(
        &self,
        group_id: &str,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<String>, ApiError>> + Send;
}

/// AWS SDK implementation of [`Ec2Api`] scoped to one region.
#[derive(Clone)]
pub struct Ec2Client {
    client: aws_sdk_ec2::Client,
}

impl Ec2Client {
    /// Build a client for `region` from an already-loaded SDK config.
    pub fn new(config: &SdkConfig, region: &str) -> Self {
        let conf = aws_sdk_ec2::config::Builder::from(config)
            .region(Region::new(region.to_string()))
            .build();
        Self {
            client: aws_sdk_ec2::Client::from_conf(conf),
        }
    }
}

impl Ec2Api for Ec2Client {
    async fn describe_instances(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<InstanceData>, ApiError> {
        let resp = self
            .client
            .describe_instances()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        let items = resp
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .map(map_instance)
            .collect();
        Ok(Page {
            items,
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn describe_security_groups(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<SecurityGroupData>, ApiError> {
        let resp = self
            .client
            .describe_security_groups()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp.security_groups().iter().map(map_security_group).collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn describe_network_acls(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<NetworkAclData>, ApiError> {
        let resp = self
            .client
            .describe_network_acls()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp.network_acls().iter().map(map_network_acl).collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn describe_own_snapshots(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<SnapshotData>, ApiError> {
        let resp = self
            .client
            .describe_snapshots()
            .owner_ids("self")
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp.snapshots().iter().map(map_snapshot).collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn describe_network_interfaces(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<NetworkInterfaceData>, ApiError> {
        let resp = self
            .client
            .describe_network_interfaces()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp
                .network_interfaces()
                .iter()
                .map(map_network_interface)
                .collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn describe_own_images(&self) -> Result<Vec<ImageData>, ApiError> {
        let resp = self
            .client
            .describe_images()
            .owners("self")
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(resp.images().iter().map(map_image).collect())
    }

    async fn describe_volumes(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<VolumeData>, ApiError> {
        let resp = self
            .client
            .describe_volumes()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp.volumes().iter().map(map_volume).collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn describe_addresses(&self) -> Result<Vec<AddressData>, ApiError> {
        let resp = self
            .client
            .describe_addresses()
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(resp.addresses().iter().map(map_address).collect())
    }

    async fn ebs_encryption_by_default(&self) -> Result<bool, ApiError> {
        let resp = self
            .client
            .get_ebs_encryption_by_default()
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(resp.ebs_encryption_by_default().unwrap_or(false))
    }

    async fn instance_user_data(&self, instance_id: &str) -> Result<Option<String>, ApiError> {
        let resp = self
            .client
            .describe_instance_attribute()
            .attribute(InstanceAttributeName::UserData)
            .instance_id(instance_id)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(resp
            .user_data()
            .and_then(|d| d.value())
            .map(str::to_string))
    }

    async fn snapshot_create_volume_permissions(
        &self,
        snapshot_id: &str,
    ) -> Result<Vec<SnapshotPermissionData>, ApiError> {
        let resp = self
            .client
            .describe_snapshot_attribute()
            .attribute(SnapshotAttributeName::CreateVolumePermission)
            .snapshot_id(snapshot_id)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(resp
            .create_volume_permissions()
            .iter()
            .map(|p| SnapshotPermissionData {
                group: p.group().map(|g| g.as_str().to_string()),
                user_id: p.user_id().map(str::to_string),
            })
            .collect())
    }

    async fn group_network_interfaces(
        &self,
        group_id: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>, ApiError> {
        let resp = self
            .client
            .describe_network_interfaces()
            .filters(Filter::builder().name("group-id").values(group_id).build())
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp
                .network_interfaces()
                .iter()
                .filter_map(|ni| ni.network_interface_id().map(str::to_string))
                .collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }
}

fn tag_pairs(raw: &[aws_sdk_ec2::types::Tag]) -> Option<Vec<ResourceTag>> {
    if raw.is_empty() {
        return None;
    }
    Some(tags::from_pairs(raw, |t| t.key(), |t| t.value()))
}

fn map_instance(instance: &aws_sdk_ec2::types::Instance) -> InstanceData {
    let metadata = instance.metadata_options();
    InstanceData {
        instance_id: instance.instance_id().map(str::to_string),
        state: instance
            .state()
            .and_then(|s| s.name())
            .map(|n| n.as_str().to_string()),
        instance_type: instance.instance_type().map(|t| t.as_str().to_string()),
        image_id: instance.image_id().map(str::to_string),
        launch_time: instance.launch_time().and_then(to_utc),
        private_dns_name: instance.private_dns_name().map(str::to_string),
        private_ip_address: instance.private_ip_address().map(str::to_string),
        public_dns_name: instance.public_dns_name().map(str::to_string),
        public_ip_address: instance.public_ip_address().map(str::to_string),
        http_tokens: metadata
            .and_then(|m| m.http_tokens())
            .map(|t| t.as_str().to_string()),
        http_endpoint: metadata
            .and_then(|m| m.http_endpoint())
            .map(|e| e.as_str().to_string()),
        instance_profile_arn: instance
            .iam_instance_profile()
            .and_then(|p| p.arn())
            .map(str::to_string),
        tags: tag_pairs(instance.tags()),
    }
}

fn map_rule(perm: &aws_sdk_ec2::types::IpPermission) -> SecurityGroupRule {
    SecurityGroupRule {
        protocol: perm.ip_protocol().map(str::to_string),
        from_port: perm.from_port(),
        to_port: perm.to_port(),
        ipv4_ranges: perm
            .ip_ranges()
            .iter()
            .filter_map(|r| r.cidr_ip().map(str::to_string))
            .collect(),
        ipv6_ranges: perm
            .ipv6_ranges()
            .iter()
            .filter_map(|r| r.cidr_ipv6().map(str::to_string))
            .collect(),
    }
}

fn map_security_group(sg: &aws_sdk_ec2::types::SecurityGroup) -> SecurityGroupData {
    SecurityGroupData {
        group_id: sg.group_id().map(str::to_string),
        group_name: sg.group_name().map(str::to_string),
        ingress_rules: sg.ip_permissions().iter().map(map_rule).collect(),
        egress_rules: sg.ip_permissions_egress().iter().map(map_rule).collect(),
        tags: tag_pairs(sg.tags()),
    }
}

fn map_network_acl(nacl: &aws_sdk_ec2::types::NetworkAcl) -> NetworkAclData {
    NetworkAclData {
        network_acl_id: nacl.network_acl_id().map(str::to_string),
        entries: nacl
            .entries()
            .iter()
            .map(|e| NetworkAclEntry {
                rule_number: e.rule_number(),
                protocol: e.protocol().map(str::to_string),
                rule_action: e.rule_action().map(|a| a.as_str().to_string()),
                egress: e.egress(),
                cidr_block: e.cidr_block().map(str::to_string),
            })
            .collect(),
        tags: tag_pairs(nacl.tags()),
    }
}

fn map_snapshot(snapshot: &aws_sdk_ec2::types::Snapshot) -> SnapshotData {
    SnapshotData {
        snapshot_id: snapshot.snapshot_id().map(str::to_string),
        encrypted: snapshot.encrypted(),
        tags: tag_pairs(snapshot.tags()),
    }
}

fn map_network_interface(ni: &aws_sdk_ec2::types::NetworkInterface) -> NetworkInterfaceData {
    NetworkInterfaceData {
        network_interface_id: ni.network_interface_id().map(str::to_string),
        association_public_ip: ni
            .association()
            .and_then(|a| a.public_ip())
            .map(str::to_string),
        interface_type: ni.interface_type().map(|t| t.as_str().to_string()),
        private_ip_address: ni.private_ip_address().map(str::to_string),
        subnet_id: ni.subnet_id().map(str::to_string),
        vpc_id: ni.vpc_id().map(str::to_string),
        tags: tag_pairs(ni.tag_set()),
    }
}

fn map_image(image: &aws_sdk_ec2::types::Image) -> ImageData {
    ImageData {
        image_id: image.image_id().map(str::to_string),
        name: image.name().map(str::to_string),
        public: image.public(),
        tags: tag_pairs(image.tags()),
    }
}

fn map_volume(volume: &aws_sdk_ec2::types::Volume) -> VolumeData {
    VolumeData {
        volume_id: volume.volume_id().map(str::to_string),
        encrypted: volume.encrypted(),
        tags: tag_pairs(volume.tags()),
    }
}

fn map_address(address: &aws_sdk_ec2::types::Address) -> AddressData {
    AddressData {
        public_ip: address.public_ip().map(str::to_string),
        association_id: address.association_id().map(str::to_string),
        allocation_id: address.allocation_id().map(str::to_string),
        tags: tag_pairs(address.tags()),
    }
}
