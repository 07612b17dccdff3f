//! Typed Spark cluster settings
//!
//! `SparkCluster` is the single point where declarative attributes are
//! converted into structured values. Create requests are built from it and
//! remote responses are flattened back into it.

use std::collections::{BTreeMap, HashMap};

use hdinsight_core::provider::{ProviderError, ProviderResult};
use hdinsight_core::resource::Value;

use crate::attrs::{AttrSource, Attrs, AttrsBuilder};
use crate::cluster_id::ClusterId;
use crate::mappings::configurations::GATEWAY_SECTION;
use crate::mappings::roles::{expand_roles, flatten_roles};
use crate::mappings::{
    ComponentVersion, ComputeIsolation, DiskEncryption, Gateway, Metastores, MonitorConfig,
    Network, Roles, SPARK_ROLES, SecurityProfile, StorageAccount, StorageAccountGen2,
    expand_storage_accounts, merge_configurations,
};
use crate::models::{
    Cluster, ClusterCreateParametersExtended, ClusterCreateProperties, ClusterDefinition,
    ComputeProfile, Configurations, EncryptionInTransitProperties, MonitoringStatus,
    OS_TYPE_LINUX, StorageProfile,
};
use crate::utils::{
    TIERS, find_connectivity_endpoint, normalize_location, normalize_tier,
    reconcile_cluster_version, validate_cluster_name,
};

pub const CLUSTER_KIND: &str = "Spark";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparkCluster {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub cluster_version: String,
    pub tier: String,
    pub tls_min_version: Option<String>,
    pub encryption_in_transit_enabled: Option<bool>,
    pub disk_encryption: Option<DiskEncryption>,
    pub component_version: ComponentVersion,
    pub compute_isolation: Option<ComputeIsolation>,
    pub gateway: Gateway,
    pub metastores: Option<Metastores>,
    pub network: Option<Network>,
    pub security_profile: Option<SecurityProfile>,
    pub storage_accounts: Vec<StorageAccount>,
    pub storage_accounts_gen2: Vec<StorageAccountGen2>,
    pub roles: Roles,
    pub monitor: Option<MonitorConfig>,
    pub extension: Option<MonitorConfig>,
    pub tags: BTreeMap<String, String>,
    pub https_endpoint: Option<String>,
    pub ssh_endpoint: Option<String>,
}

/// Everything Read collects from the remote side
#[derive(Debug, Clone)]
pub struct RemoteCluster<'a> {
    pub id: &'a ClusterId,
    pub cluster: &'a Cluster,
    pub configurations: &'a Configurations,
    pub monitoring: &'a MonitoringStatus,
    pub azure_monitor: &'a MonitoringStatus,
}

// =============================================================================
// Declarative attributes
// =============================================================================

impl SparkCluster {
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> ProviderResult<Self> {
        let attrs = Attrs::root(attributes);

        let name = attrs.required_string("name")?;
        validate_cluster_name(&name).map_err(ProviderError::validation)?;

        let tier = attrs.required_string("tier")?;
        if !TIERS.iter().any(|t| t.eq_ignore_ascii_case(&tier)) {
            return Err(ProviderError::validation(format!(
                "`tier`: invalid value {:?}, expected one of: {}",
                tier,
                TIERS.join(", ")
            )));
        }

        Ok(Self {
            name,
            resource_group_name: attrs.required_string("resource_group_name")?,
            location: attrs.required_string("location")?,
            cluster_version: attrs.required_string("cluster_version")?,
            tier,
            tls_min_version: attrs.optional_string("tls_min_version")?,
            encryption_in_transit_enabled: attrs.optional_bool("encryption_in_transit_enabled")?,
            disk_encryption: attrs
                .block("disk_encryption")?
                .map(|b| DiskEncryption::from_attrs(&b))
                .transpose()?,
            component_version: ComponentVersion::from_attrs(
                &attrs.required_block("component_version")?,
            )?,
            compute_isolation: attrs
                .block("compute_isolation")?
                .map(|b| ComputeIsolation::from_attrs(&b))
                .transpose()?,
            gateway: Gateway::from_attrs(&attrs.required_block("gateway")?)?,
            metastores: attrs
                .block("metastores")?
                .map(|b| Metastores::from_attrs(&b))
                .transpose()?
                .filter(|m| !m.is_empty()),
            network: attrs
                .block("network")?
                .map(|b| Network::from_attrs(&b))
                .transpose()?,
            security_profile: attrs
                .block("security_profile")?
                .map(|b| SecurityProfile::from_attrs(&b))
                .transpose()?,
            storage_accounts: attrs
                .blocks("storage_account")?
                .iter()
                .map(StorageAccount::from_attrs)
                .collect::<ProviderResult<Vec<_>>>()?,
            storage_accounts_gen2: attrs
                .blocks("storage_account_gen2")?
                .iter()
                .map(StorageAccountGen2::from_attrs)
                .collect::<ProviderResult<Vec<_>>>()?,
            roles: Roles::from_attrs(&attrs.required_block("roles")?)?,
            monitor: attrs
                .block("monitor")?
                .map(|b| MonitorConfig::from_attrs(&b))
                .transpose()?,
            extension: attrs
                .block("extension")?
                .map(|b| MonitorConfig::from_attrs(&b))
                .transpose()?,
            tags: attrs.string_map("tags")?,
            https_endpoint: attrs.optional_string("https_endpoint")?,
            ssh_endpoint: attrs.optional_string("ssh_endpoint")?,
        })
    }

    pub fn to_attributes(&self) -> HashMap<String, Value> {
        let mut builder = AttrsBuilder::new()
            .string("name", &self.name)
            .string("resource_group_name", &self.resource_group_name)
            .string("location", &self.location)
            .string("cluster_version", &self.cluster_version)
            .string("tier", &self.tier)
            .opt_string("tls_min_version", self.tls_min_version.as_deref())
            .opt_bool(
                "encryption_in_transit_enabled",
                self.encryption_in_transit_enabled,
            )
            .blocks(
                "disk_encryption",
                self.disk_encryption.iter().map(DiskEncryption::to_attrs).collect(),
            )
            .block("component_version", self.component_version.to_attrs())
            .opt_block(
                "compute_isolation",
                self.compute_isolation.as_ref().map(ComputeIsolation::to_attrs),
            )
            .block("gateway", self.gateway.to_attrs())
            .opt_block("metastores", self.metastores.as_ref().map(Metastores::to_attrs))
            .opt_block("network", self.network.as_ref().map(Network::to_attrs))
            .opt_block(
                "security_profile",
                self.security_profile.as_ref().map(SecurityProfile::to_attrs),
            )
            .blocks(
                "storage_account",
                self.storage_accounts.iter().map(StorageAccount::to_attrs).collect(),
            )
            .blocks(
                "storage_account_gen2",
                self.storage_accounts_gen2
                    .iter()
                    .map(StorageAccountGen2::to_attrs)
                    .collect(),
            )
            .block("roles", self.roles.to_attrs())
            .opt_block("monitor", self.monitor.as_ref().map(MonitorConfig::to_attrs))
            .opt_block("extension", self.extension.as_ref().map(MonitorConfig::to_attrs))
            .opt_string("https_endpoint", self.https_endpoint.as_deref())
            .opt_string("ssh_endpoint", self.ssh_endpoint.as_deref());
        if !self.tags.is_empty() {
            builder = builder.string_map("tags", &self.tags);
        }
        builder.build()
    }

    pub fn cluster_id(&self, subscription_id: &str) -> ClusterId {
        ClusterId::new(subscription_id, &self.resource_group_name, &self.name)
    }

    /// Location and tier in the form the API reports them
    pub fn normalized(&self) -> Self {
        Self {
            location: normalize_location(&self.location),
            tier: normalize_tier(&self.tier),
            ..self.clone()
        }
    }
}

// =============================================================================
// Expand
// =============================================================================

impl SparkCluster {
    /// Build the create request. Fails before any network call on values the
    /// API would reject.
    pub fn create_parameters(&self) -> ProviderResult<ClusterCreateParametersExtended> {
        let configurations = merge_configurations(
            self.gateway.expand(),
            self.metastores
                .as_ref()
                .map(Metastores::expand)
                .unwrap_or_default(),
        )?;

        let (storage_accounts, mut identity) =
            expand_storage_accounts(&self.storage_accounts, &self.storage_accounts_gen2)
                .map_err(|e| ProviderError::validation(format!("expanding storage: {}", e.message)))?;

        let roles = expand_roles(&self.roles, &SPARK_ROLES)?;

        let disk_encryption_properties = self
            .disk_encryption
            .as_ref()
            .map(DiskEncryption::expand)
            .transpose()?;

        let security_profile = self.security_profile.as_ref().map(|profile| {
            // the domain identity replaces any storage identity
            identity = Some(profile.identity());
            profile.expand()
        });

        Ok(ClusterCreateParametersExtended {
            location: normalize_location(&self.location),
            tags: self.tags.clone(),
            properties: ClusterCreateProperties {
                cluster_version: Some(self.cluster_version.clone()),
                os_type: Some(OS_TYPE_LINUX.to_string()),
                tier: Some(normalize_tier(&self.tier)),
                cluster_definition: Some(ClusterDefinition {
                    kind: Some(CLUSTER_KIND.to_string()),
                    component_version: Some(self.component_version.expand()),
                    configurations: Some(configurations),
                }),
                security_profile,
                compute_profile: Some(ComputeProfile { roles }),
                storage_profile: Some(StorageProfile {
                    storageaccounts: storage_accounts,
                }),
                disk_encryption_properties,
                encryption_in_transit_properties: Some(EncryptionInTransitProperties {
                    is_encryption_in_transit_enabled: Some(
                        self.encryption_in_transit_enabled.unwrap_or(false),
                    ),
                }),
                min_supported_tls_version: self.tls_min_version.clone(),
                network_properties: self.network.as_ref().map(Network::expand),
                compute_isolation_properties: self
                    .compute_isolation
                    .as_ref()
                    .map(ComputeIsolation::expand),
            },
            identity,
        })
    }
}

// =============================================================================
// Flatten
// =============================================================================

impl SparkCluster {
    /// Rebuild the settings from remote state. Values the API never returns
    /// (secrets and storage blocks) come from `prior`.
    pub fn from_remote(remote: RemoteCluster<'_>, prior: Option<&SparkCluster>) -> ProviderResult<Self> {
        let id = remote.id;
        let props = remote.cluster.properties.as_ref().ok_or_else(|| {
            ProviderError::remote(format!("retrieving {}: response carries no properties", id))
        })?;

        let gateway_section = remote.configurations.get(GATEWAY_SECTION).ok_or_else(|| {
            ProviderError::remote(format!(
                "retrieving gateway for {}: configuration section {:?} is missing",
                id, GATEWAY_SECTION
            ))
        })?;

        let roles = flatten_roles(
            props.compute_profile.as_ref(),
            &SPARK_ROLES,
            prior.map(|p| &p.roles),
        )
        .ok_or_else(|| {
            ProviderError::remote(format!(
                "flattening `roles` for {}: compute profile lacks a head, worker or zookeeper role",
                id
            ))
        })?;

        let disk_encryption = props
            .disk_encryption_properties
            .as_ref()
            .map(DiskEncryption::flatten)
            .transpose()?;

        let endpoints = props.connectivity_endpoints.as_deref();

        Ok(Self {
            name: id.cluster_name.clone(),
            resource_group_name: id.resource_group_name.clone(),
            location: normalize_location(&remote.cluster.location),
            cluster_version: reconcile_cluster_version(
                prior.map(|p| p.cluster_version.as_str()),
                props.cluster_version.as_deref().unwrap_or_default(),
            ),
            tier: normalize_tier(props.tier.as_deref().unwrap_or_default()),
            tls_min_version: props.min_supported_tls_version.clone(),
            encryption_in_transit_enabled: props
                .encryption_in_transit_properties
                .as_ref()
                .and_then(|e| e.is_encryption_in_transit_enabled),
            disk_encryption,
            component_version: ComponentVersion::flatten(
                props.cluster_definition.component_version.as_ref(),
            ),
            compute_isolation: props
                .compute_isolation_properties
                .as_ref()
                .map(ComputeIsolation::flatten),
            gateway: Gateway::flatten(gateway_section, prior.map(|p| &p.gateway)),
            metastores: Metastores::flatten(
                remote.configurations,
                prior.and_then(|p| p.metastores.as_ref()),
            ),
            network: props.network_properties.as_ref().map(Network::flatten),
            security_profile: SecurityProfile::flatten(
                props.security_profile.as_ref(),
                prior.and_then(|p| p.security_profile.as_ref()),
            ),
            storage_accounts: prior.map(|p| p.storage_accounts.clone()).unwrap_or_default(),
            storage_accounts_gen2: prior
                .map(|p| p.storage_accounts_gen2.clone())
                .unwrap_or_default(),
            roles,
            monitor: MonitorConfig::flatten(remote.monitoring, prior.and_then(|p| p.monitor.as_ref())),
            extension: MonitorConfig::flatten(
                remote.azure_monitor,
                prior.and_then(|p| p.extension.as_ref()),
            ),
            tags: remote.cluster.tags.clone().unwrap_or_default(),
            https_endpoint: find_connectivity_endpoint("HTTPS", endpoints),
            ssh_endpoint: find_connectivity_endpoint("SSH", endpoints),
        })
    }
}
