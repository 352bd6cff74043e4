//! EC2 resource collection
//!
//! Construction fans each describe call out across every enabled region,
//! then runs the dependent enrichment passes sequentially over the merged
//! inventory. Once `collect` returns, the inventory is read-only: records
//! are exposed as slices and never mutated again.

mod api;
pub mod types;

pub use api::{
    AddressData, Ec2Api, Ec2Client, ImageData, InstanceData, NetworkAclData,
    NetworkInterfaceData, SecurityGroupData, SnapshotData, SnapshotPermissionData, VolumeData,
};

use crate::context::AwsClientFactory;
use crate::dispatch::{RegionalClientSet, fan_out};
use crate::error::{ApiError, require};
use crate::scope::AuditScope;
use cloudsweep_common::{ResourceKind, arn};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use types::{
    EbsEncryptionDefault, ElasticIp, Image, Instance, NetworkAcl, NetworkInterface, SecurityGroup,
    Snapshot, Volume,
};

const SERVICE: &str = "ec2";

/// EC2 inventory for one audit run.
pub struct Ec2Service<C = Ec2Client> {
    scope: Arc<AuditScope>,
    clients: RegionalClientSet<C>,
    instances: Vec<Instance>,
    security_groups: Vec<SecurityGroup>,
    network_acls: Vec<NetworkAcl>,
    snapshots: Vec<Snapshot>,
    network_interfaces: Vec<NetworkInterface>,
    images: Vec<Image>,
    volumes: Vec<Volume>,
    encryption_defaults: Vec<EbsEncryptionDefault>,
    elastic_ips: Vec<ElasticIp>,
}

impl Ec2Service<Ec2Client> {
    /// Collect the inventory using SDK clients for every enabled region.
    pub async fn from_factory(factory: &AwsClientFactory, scope: Arc<AuditScope>) -> Self {
        let clients = factory.ec2_clients(scope.regions());
        Self::collect(scope, clients).await
    }
}

impl<C> Ec2Service<C>
where
    C: Ec2Api + Clone + Send + Sync + 'static,
{
    /// Enumerate every EC2 resource kind across the given regions.
    pub async fn collect(scope: Arc<AuditScope>, clients: RegionalClientSet<C>) -> Self {
        info!(regions = clients.len(), "collecting ec2 inventory");
        let mut service = Self {
            scope: scope.clone(),
            clients,
            instances: Vec::new(),
            security_groups: Vec::new(),
            network_acls: Vec::new(),
            snapshots: Vec::new(),
            network_interfaces: Vec::new(),
            images: Vec::new(),
            volumes: Vec::new(),
            encryption_defaults: Vec::new(),
            elastic_ips: Vec::new(),
        };

        let s = scope.clone();
        service.instances = fan_out(&service.clients, "ec2 instances", move |region, client| {
            fetch_instances(s.clone(), region, client)
        })
        .await;
        service.enrich_instance_user_data().await;

        let s = scope.clone();
        service.security_groups =
            fan_out(&service.clients, "security groups", move |region, client| {
                fetch_security_groups(s.clone(), region, client)
            })
            .await;

        let s = scope.clone();
        service.network_acls = fan_out(&service.clients, "network acls", move |region, client| {
            fetch_network_acls(s.clone(), region, client)
        })
        .await;

        let s = scope.clone();
        service.snapshots = fan_out(&service.clients, "snapshots", move |region, client| {
            fetch_snapshots(s.clone(), region, client)
        })
        .await;
        service.enrich_snapshot_visibility().await;

        let s = scope.clone();
        service.network_interfaces =
            fan_out(&service.clients, "network interfaces", move |region, client| {
                fetch_network_interfaces(s.clone(), region, client)
            })
            .await;
        service.enrich_group_network_interfaces().await;

        let s = scope.clone();
        service.images = fan_out(&service.clients, "images", move |region, client| {
            fetch_images(s.clone(), region, client)
        })
        .await;

        let s = scope.clone();
        service.volumes = fan_out(&service.clients, "volumes", move |region, client| {
            fetch_volumes(s.clone(), region, client)
        })
        .await;

        let s = scope.clone();
        service.encryption_defaults =
            fan_out(&service.clients, "ebs encryption defaults", move |region, client| {
                fetch_encryption_default(s.clone(), region, client)
            })
            .await;

        let s = scope.clone();
        service.elastic_ips = fan_out(&service.clients, "elastic ips", move |region, client| {
            fetch_elastic_ips(s.clone(), region, client)
        })
        .await;

        info!(
            instances = service.instances.len(),
            security_groups = service.security_groups.len(),
            snapshots = service.snapshots.len(),
            volumes = service.volumes.len(),
            "ec2 inventory collected"
        );
        service
    }

    pub fn scope(&self) -> &AuditScope {
        &self.scope
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn security_groups(&self) -> &[SecurityGroup] {
        &self.security_groups
    }

    pub fn network_acls(&self) -> &[NetworkAcl] {
        &self.network_acls
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn network_interfaces(&self) -> &[NetworkInterface] {
        &self.network_interfaces
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    pub fn encryption_defaults(&self) -> &[EbsEncryptionDefault] {
        &self.encryption_defaults
    }

    pub fn elastic_ips(&self) -> &[ElasticIp] {
        &self.elastic_ips
    }

    /// Record counts per kind, for run summaries.
    pub fn summary(&self) -> BTreeMap<ResourceKind, usize> {
        BTreeMap::from([
            (ResourceKind::Instance, self.instances.len()),
            (ResourceKind::SecurityGroup, self.security_groups.len()),
            (ResourceKind::NetworkAcl, self.network_acls.len()),
            (ResourceKind::Snapshot, self.snapshots.len()),
            (ResourceKind::NetworkInterface, self.network_interfaces.len()),
            (ResourceKind::Image, self.images.len()),
            (ResourceKind::Volume, self.volumes.len()),
            (ResourceKind::EbsEncryptionDefault, self.encryption_defaults.len()),
            (ResourceKind::ElasticIp, self.elastic_ips.len()),
        ])
    }

    /// Read each instance's user-data payload from its home region.
    ///
    /// An instance that vanished since the primary pass is skipped; its
    /// `user_data` stays unset.
    async fn enrich_instance_user_data(&mut self) {
        debug!("reading instance user data");
        for instance in &mut self.instances {
            let Some(client) = self.clients.get(&instance.region) else {
                continue;
            };
            match client.instance_user_data(&instance.id).await {
                Ok(Some(payload)) => instance.user_data = Some(payload),
                Ok(None) => {}
                Err(err) if err.is_not_found() => {
                    warn!(
                        region = %instance.region,
                        instance = %instance.id,
                        error = %err,
                        "instance vanished before user data lookup"
                    );
                }
                Err(err) => {
                    error!(
                        region = %instance.region,
                        instance = %instance.id,
                        error = %err,
                        "failed to read instance user data"
                    );
                }
            }
        }
    }

    /// Mark snapshots whose create-volume permission is shared with the
    /// `all` group. The flag only ever rises.
    async fn enrich_snapshot_visibility(&mut self) {
        debug!("resolving snapshot visibility");
        for snapshot in &mut self.snapshots {
            let Some(client) = self.clients.get(&snapshot.region) else {
                continue;
            };
            match client.snapshot_create_volume_permissions(&snapshot.id).await {
                Ok(permissions) => {
                    if permissions.iter().any(|p| p.group.as_deref() == Some("all")) {
                        snapshot.public = true;
                    }
                }
                Err(err) if err.is_not_found() => {
                    warn!(
                        region = %snapshot.region,
                        snapshot = %snapshot.id,
                        error = %err,
                        "snapshot vanished before visibility lookup"
                    );
                }
                Err(err) => {
                    error!(
                        region = %snapshot.region,
                        snapshot = %snapshot.id,
                        error = %err,
                        "failed to read snapshot visibility"
                    );
                }
            }
        }
    }

    /// Resolve which network interfaces attach to each security group.
    async fn enrich_group_network_interfaces(&mut self) {
        debug!("resolving security group attachments");
        for group in &mut self.security_groups {
            let Some(client) = self.clients.get(&group.region) else {
                continue;
            };
            match attached_interfaces(client, &group.id).await {
                Ok(ids) => group.network_interface_ids = ids,
                Err(err) if err.is_not_found() => {
                    warn!(
                        region = %group.region,
                        group = %group.id,
                        error = %err,
                        "security group vanished before attachment lookup"
                    );
                }
                Err(err) => {
                    error!(
                        region = %group.region,
                        group = %group.id,
                        error = %err,
                        "failed to list security group attachments"
                    );
                }
            }
        }
    }
}

async fn attached_interfaces<C: Ec2Api>(client: &C, group_id: &str) -> Result<Vec<String>, ApiError> {
    let mut ids = Vec::new();
    let mut token = None;
    loop {
        let page = client.group_network_interfaces(group_id, token).await?;
        ids.extend(page.items);
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    Ok(ids)
}

async fn fetch_instances<C: Ec2Api>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<Instance>, ApiError> {
    let mut records = Vec::new();
    let mut token = None;
    loop {
        let page = client.describe_instances(token).await?;
        for data in page.items {
            let id = require(data.instance_id, "instance", "InstanceId")?;
            let arn = arn::build(
                scope.partition(),
                SERVICE,
                &region,
                scope.account_id(),
                "instance",
                &id,
            );
            if !scope.includes(&arn) {
                continue;
            }
            // Public DNS and IP are only meaningful as a pair.
            let (public_dns, public_ip) = match (data.public_dns_name, data.public_ip_address) {
                (Some(dns), Some(ip)) => (Some(dns), Some(ip)),
                _ => (None, None),
            };
            records.push(Instance {
                arn,
                region: region.clone(),
                state: require(data.state, "instance", "State")?,
                instance_type: require(data.instance_type, "instance", "InstanceType")?,
                image_id: require(data.image_id, "instance", "ImageId")?,
                launch_time: require(data.launch_time, "instance", "LaunchTime")?,
                private_dns: require(data.private_dns_name, "instance", "PrivateDnsName")?,
                private_ip: data.private_ip_address,
                public_dns,
                public_ip,
                user_data: None,
                http_tokens: data.http_tokens,
                http_endpoint: data.http_endpoint,
                instance_profile_arn: data.instance_profile_arn,
                tags: data.tags,
                id,
            });
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    debug!(%region, count = records.len(), "described instances");
    Ok(records)
}

async fn fetch_security_groups<C: Ec2Api>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<SecurityGroup>, ApiError> {
    let mut records = Vec::new();
    let mut token = None;
    loop {
        let page = client.describe_security_groups(token).await?;
        for data in page.items {
            let id = require(data.group_id, "security group", "GroupId")?;
            let arn = arn::build(
                scope.partition(),
                SERVICE,
                &region,
                scope.account_id(),
                "security-group",
                &id,
            );
            if !scope.includes(&arn) {
                continue;
            }
            records.push(SecurityGroup {
                arn,
                region: region.clone(),
                name: require(data.group_name, "security group", "GroupName")?,
                network_interface_ids: Vec::new(),
                ingress_rules: data.ingress_rules,
                egress_rules: data.egress_rules,
                tags: data.tags,
                id,
            });
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    debug!(%region, count = records.len(), "described security groups");
    Ok(records)
}

async fn fetch_network_acls<C: Ec2Api>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<NetworkAcl>, ApiError> {
    let mut records = Vec::new();
    let mut token = None;
    loop {
        let page = client.describe_network_acls(token).await?;
        for data in page.items {
            let id = require(data.network_acl_id, "network acl", "NetworkAclId")?;
            let arn = arn::build(
                scope.partition(),
                SERVICE,
                &region,
                scope.account_id(),
                "network-acl",
                &id,
            );
            if !scope.includes(&arn) {
                continue;
            }
            records.push(NetworkAcl {
                arn,
                region: region.clone(),
                entries: data.entries,
                tags: data.tags,
                id,
            });
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    debug!(%region, count = records.len(), "described network acls");
    Ok(records)
}

async fn fetch_snapshots<C: Ec2Api>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<Snapshot>, ApiError> {
    let mut records = Vec::new();
    let mut token = None;
    loop {
        let page = client.describe_own_snapshots(token).await?;
        for data in page.items {
            let id = require(data.snapshot_id, "snapshot", "SnapshotId")?;
            let arn = arn::build(
                scope.partition(),
                SERVICE,
                &region,
                scope.account_id(),
                "snapshot",
                &id,
            );
            if !scope.includes(&arn) {
                continue;
            }
            records.push(Snapshot {
                arn,
                region: region.clone(),
                encrypted: require(data.encrypted, "snapshot", "Encrypted")?,
                public: false,
                tags: data.tags,
                id,
            });
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    debug!(%region, count = records.len(), "described snapshots");
    Ok(records)
}

async fn fetch_network_interfaces<C: Ec2Api>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<NetworkInterface>, ApiError> {
    let mut records = Vec::new();
    let mut token = None;
    loop {
        let page = client.describe_network_interfaces(token).await?;
        for data in page.items {
            // Only interfaces reachable from the internet are recorded.
            let Some(public_ip) = data.association_public_ip else {
                continue;
            };
            let id = require(data.network_interface_id, "network interface", "NetworkInterfaceId")?;
            let arn = arn::build(
                scope.partition(),
                SERVICE,
                &region,
                scope.account_id(),
                "network-interface",
                &id,
            );
            if !scope.includes(&arn) {
                continue;
            }
            records.push(NetworkInterface {
                arn,
                region: region.clone(),
                public_ip,
                private_ip: require(data.private_ip_address, "network interface", "PrivateIpAddress")?,
                interface_type: require(data.interface_type, "network interface", "InterfaceType")?,
                subnet_id: require(data.subnet_id, "network interface", "SubnetId")?,
                vpc_id: require(data.vpc_id, "network interface", "VpcId")?,
                tags: data.tags,
                id,
            });
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    debug!(%region, count = records.len(), "described network interfaces");
    Ok(records)
}

async fn fetch_images<C: Ec2Api>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<Image>, ApiError> {
    let mut records = Vec::new();
    for data in client.describe_own_images().await? {
        let id = require(data.image_id, "image", "ImageId")?;
        let arn = arn::build(
            scope.partition(),
            SERVICE,
            &region,
            scope.account_id(),
            "image",
            &id,
        );
        if !scope.includes(&arn) {
            continue;
        }
        records.push(Image {
            arn,
            region: region.clone(),
            name: require(data.name, "image", "Name")?,
            public: require(data.public, "image", "Public")?,
            tags: data.tags,
            id,
        });
    }
    debug!(%region, count = records.len(), "described images");
    Ok(records)
}

async fn fetch_volumes<C: Ec2Api>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<Volume>, ApiError> {
    let mut records = Vec::new();
    let mut token = None;
    loop {
        let page = client.describe_volumes(token).await?;
        for data in page.items {
            let id = require(data.volume_id, "volume", "VolumeId")?;
            let arn = arn::build(
                scope.partition(),
                SERVICE,
                &region,
                scope.account_id(),
                "volume",
                &id,
            );
            if !scope.includes(&arn) {
                continue;
            }
            records.push(Volume {
                arn,
                region: region.clone(),
                encrypted: require(data.encrypted, "volume", "Encrypted")?,
                tags: data.tags,
                id,
            });
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    debug!(%region, count = records.len(), "described volumes");
    Ok(records)
}

async fn fetch_encryption_default<C: Ec2Api>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<EbsEncryptionDefault>, ApiError> {
    let enabled = client.ebs_encryption_by_default().await?;
    let arn = arn::build(
        scope.partition(),
        SERVICE,
        &region,
        scope.account_id(),
        "ebs-encryption-default",
        &region,
    );
    if !scope.includes(&arn) {
        return Ok(Vec::new());
    }
    Ok(vec![EbsEncryptionDefault { arn, region, enabled }])
}

async fn fetch_elastic_ips<C: Ec2Api>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<ElasticIp>, ApiError> {
    let mut records = Vec::new();
    for data in client.describe_addresses().await? {
        // Classic addresses have no allocation id; fall back to the public
        // IP rather than record an identifier-less entry.
        let local_id = match data.allocation_id.as_deref().or(data.public_ip.as_deref()) {
            Some(local_id) => local_id,
            None => {
                debug!(%region, "skipping address with neither allocation id nor public ip");
                continue;
            }
        };
        let arn = arn::build(
            scope.partition(),
            SERVICE,
            &region,
            scope.account_id(),
            "eip-allocation",
            local_id,
        );
        if !scope.includes(&arn) {
            continue;
        }
        records.push(ElasticIp {
            arn,
            region: region.clone(),
            public_ip: data.public_ip,
            association_id: data.association_id,
            allocation_id: data.allocation_id,
            tags: data.tags,
        });
    }
    debug!(%region, count = records.len(), "described elastic ips");
    Ok(records)
}
