//! Wire models for the HDInsight `2021-06-01` management API

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Configuration sections keyed by section name (e.g. "gateway", "hive-site")
pub type Configurations = BTreeMap<String, BTreeMap<String, String>>;

pub const OS_TYPE_LINUX: &str = "Linux";

/// Request body for creating a cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCreateParametersExtended {
    pub location: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    pub properties: ClusterCreateProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<ClusterIdentity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IdentityType {
    SystemAssigned,
    UserAssigned,
    #[serde(rename = "SystemAssigned, UserAssigned")]
    SystemAssignedUserAssigned,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIdentity {
    #[serde(rename = "type")]
    pub identity_type: IdentityType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_assigned_identities: BTreeMap<String, UserAssignedIdentity>,
}

impl ClusterIdentity {
    pub fn user_assigned(identity_id: impl Into<String>) -> Self {
        Self {
            identity_type: IdentityType::UserAssigned,
            user_assigned_identities: BTreeMap::from([(
                identity_id.into(),
                UserAssignedIdentity::default(),
            )]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignedIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCreateProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_definition: Option<ClusterDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_profile: Option<SecurityProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_profile: Option<ComputeProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_profile: Option<StorageProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_encryption_properties: Option<DiskEncryptionProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_in_transit_properties: Option<EncryptionInTransitProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_supported_tls_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_properties: Option<NetworkProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_isolation_properties: Option<ComputeIsolationProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_version: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurations: Option<Configurations>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ldaps_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_user_password: Option<String>,
    #[serde(
        default,
        rename = "clusterUsersGroupDNs",
        skip_serializing_if = "Option::is_none"
    )]
    pub cluster_users_group_dns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadds_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msi_resource_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeProfile {
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_instance_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_instance_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale: Option<Autoscale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_profile: Option<HardwareProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_profile: Option<OsProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_network_profile: Option<VirtualNetworkProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_disks_groups: Option<Vec<DataDisksGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_actions: Option<Vec<ScriptAction>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDisksGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disks_per_node: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Autoscale {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<AutoscaleCapacity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<AutoscaleRecurrence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscaleCapacity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_instance_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_instance_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscaleRecurrence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<AutoscaleSchedule>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscaleSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_and_capacity: Option<AutoscaleTimeAndCapacity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscaleTimeAndCapacity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_instance_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_instance_count: Option<i64>,
}

/// Body of the worker-role autoscale update call. An absent `autoscale`
/// disables autoscaling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscaleConfigurationUpdateParameter {
    pub autoscale: Option<Autoscale>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux_operating_system_profile: Option<LinuxOperatingSystemProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinuxOperatingSystemProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_profile: Option<SshProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshProfile {
    #[serde(default)]
    pub public_keys: Vec<SshPublicKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshPublicKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_data: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptAction {
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub parameters: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfile {
    #[serde(default)]
    pub storageaccounts: Vec<StorageAccount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msi_resource_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskEncryptionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msi_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_at_host: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionInTransitProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_encryption_in_transit_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_provider_connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeIsolationProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_compute_isolation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_sku: Option<String>,
}

/// A cluster as returned by GET
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub identity: Option<ClusterIdentity>,
    #[serde(default)]
    pub properties: Option<ClusterGetProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterGetProperties {
    #[serde(default)]
    pub cluster_version: Option<String>,
    #[serde(default)]
    pub os_type: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub cluster_definition: ClusterDefinition,
    #[serde(default)]
    pub security_profile: Option<SecurityProfile>,
    #[serde(default)]
    pub compute_profile: Option<ComputeProfile>,
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub cluster_state: Option<String>,
    #[serde(default)]
    pub connectivity_endpoints: Option<Vec<ConnectivityEndpoint>>,
    #[serde(default)]
    pub disk_encryption_properties: Option<DiskEncryptionProperties>,
    #[serde(default)]
    pub encryption_in_transit_properties: Option<EncryptionInTransitProperties>,
    #[serde(default)]
    pub min_supported_tls_version: Option<String>,
    #[serde(default)]
    pub network_properties: Option<NetworkProperties>,
    #[serde(default)]
    pub compute_isolation_properties: Option<ComputeIsolationProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityEndpoint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default, rename = "privateIPAddress")]
    pub private_ip_address: Option<String>,
}

/// Body of the tags PATCH call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterPatchParameters {
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResizeParameters {
    pub target_instance_count: i64,
}

/// Body of the gateway settings update call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateGatewaySettingsParameters {
    #[serde(rename = "restAuthCredential.isEnabled")]
    pub is_credential_enabled: bool,
    #[serde(rename = "restAuthCredential.username")]
    pub user_name: String,
    #[serde(rename = "restAuthCredential.password")]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfigurations {
    #[serde(default)]
    pub configurations: Option<Configurations>,
}

/// Enable request for both the monitoring and the Azure Monitor extension
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringRequest {
    pub workspace_id: String,
    pub primary_key: String,
}

/// Status reported by both the monitoring and the Azure Monitor extension
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringStatus {
    #[serde(default)]
    pub cluster_monitoring_enabled: Option<bool>,
    #[serde(default)]
    pub workspace_id: Option<String>,
}

/// What GET reports right after a successful create: secrets are dropped,
/// the version is the full build and the tier comes back lowercased.
#[cfg(test)]
impl Cluster {
    pub(crate) fn provisioned_from(id: &str, params: &ClusterCreateParametersExtended) -> Self {
        let p = &params.properties;

        let compute_profile = p.compute_profile.clone().map(|mut profile| {
            for role in &mut profile.roles {
                if let Some(linux) = role
                    .os_profile
                    .as_mut()
                    .and_then(|o| o.linux_operating_system_profile.as_mut())
                {
                    linux.password = None;
                }
            }
            profile
        });

        let endpoint = |name: &str, location: String, port: i64| ConnectivityEndpoint {
            name: Some(name.to_string()),
            protocol: Some("TCP".to_string()),
            location: Some(location),
            port: Some(port),
            private_ip_address: None,
        };
        let cluster_name = id.rsplit('/').next().unwrap_or_default();

        Cluster {
            id: Some(id.to_string()),
            name: Some(cluster_name.to_string()),
            location: params.location.clone(),
            tags: Some(params.tags.clone()),
            identity: params.identity.clone(),
            properties: Some(ClusterGetProperties {
                cluster_version: p.cluster_version.as_ref().map(|v| format!("{}.1000.0", v)),
                os_type: p.os_type.clone(),
                tier: p.tier.as_ref().map(|t| t.to_lowercase()),
                cluster_definition: ClusterDefinition {
                    configurations: None,
                    ..p.cluster_definition.clone().unwrap_or_default()
                },
                security_profile: p.security_profile.clone().map(|mut s| {
                    s.domain_user_password = None;
                    s
                }),
                compute_profile,
                provisioning_state: Some("Succeeded".to_string()),
                cluster_state: Some("Running".to_string()),
                connectivity_endpoints: Some(vec![
                    endpoint("SSH", format!("{}-ssh.azurehdinsight.net", cluster_name), 22),
                    endpoint("HTTPS", format!("{}.azurehdinsight.net", cluster_name), 443),
                ]),
                disk_encryption_properties: p.disk_encryption_properties.clone(),
                encryption_in_transit_properties: p.encryption_in_transit_properties.clone(),
                min_supported_tls_version: p.min_supported_tls_version.clone(),
                network_properties: p.network_properties.clone(),
                compute_isolation_properties: p.compute_isolation_properties.clone(),
            }),
        }
    }
}
