//! `disk_encryption` block

use std::collections::HashMap;
use std::sync::LazyLock;

use hdinsight_core::provider::{ProviderError, ProviderResult};
use hdinsight_core::resource::Value;
use regex::Regex;

use crate::attrs::{AttrSource, AttrsBuilder};
use crate::models::DiskEncryptionProperties;

pub const ENCRYPTION_ALGORITHMS: &[&str] = &["RSA-OAEP", "RSA-OAEP-256", "RSA1_5"];

static KEY_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https://[^/]+/)keys/([^/]+)/([^/]+)/?$").expect("valid key URL pattern")
});

/// Parts of a versioned Key Vault key URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVaultKey {
    /// Vault base URI, always ending in `/`
    pub vault_uri: String,
    pub name: String,
    pub version: String,
}

impl KeyVaultKey {
    /// Parse `https://{vault}.vault.azure.net/keys/{name}/{version}`
    pub fn parse(input: &str) -> Result<Self, String> {
        let caps = KEY_URL.captures(input).ok_or_else(|| {
            format!(
                "{:?} is not a versioned Key Vault key ID (https://{{vault}}/keys/{{name}}/{{version}})",
                input
            )
        })?;
        Ok(Self {
            vault_uri: caps[1].to_string(),
            name: caps[2].to_string(),
            version: caps[3].to_string(),
        })
    }

    pub fn id(&self) -> String {
        let base = if self.vault_uri.ends_with('/') {
            self.vault_uri.clone()
        } else {
            format!("{}/", self.vault_uri)
        };
        format!("{}keys/{}/{}", base, self.name, self.version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskEncryption {
    pub encryption_algorithm: Option<String>,
    pub encryption_at_host_enabled: Option<bool>,
    pub key_vault_key_id: Option<String>,
    pub key_vault_managed_identity_id: Option<String>,
}

impl DiskEncryption {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        let encryption_algorithm = block.optional_string("encryption_algorithm")?;
        if let Some(algorithm) = &encryption_algorithm
            && !ENCRYPTION_ALGORITHMS.contains(&algorithm.as_str())
        {
            return Err(ProviderError::validation(format!(
                "`{}`: invalid value {:?}, expected one of: {}",
                block.path_of("encryption_algorithm"),
                algorithm,
                ENCRYPTION_ALGORITHMS.join(", ")
            )));
        }
        Ok(Self {
            encryption_algorithm,
            encryption_at_host_enabled: block.optional_bool("encryption_at_host_enabled")?,
            key_vault_key_id: block.optional_string("key_vault_key_id")?,
            key_vault_managed_identity_id: block
                .optional_string("key_vault_managed_identity_id")?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .opt_string("encryption_algorithm", self.encryption_algorithm.as_deref())
            .opt_bool("encryption_at_host_enabled", self.encryption_at_host_enabled)
            .opt_string("key_vault_key_id", self.key_vault_key_id.as_deref())
            .opt_string(
                "key_vault_managed_identity_id",
                self.key_vault_managed_identity_id.as_deref(),
            )
            .build()
    }

    /// Fails when `key_vault_key_id` is not a versioned key URL
    pub fn expand(&self) -> ProviderResult<DiskEncryptionProperties> {
        let key = self
            .key_vault_key_id
            .as_deref()
            .map(KeyVaultKey::parse)
            .transpose()
            .map_err(|e| {
                ProviderError::validation(format!(
                    "expanding `disk_encryption.key_vault_key_id`: {}",
                    e
                ))
            })?;

        Ok(DiskEncryptionProperties {
            vault_uri: key.as_ref().map(|k| k.vault_uri.clone()),
            key_name: key.as_ref().map(|k| k.name.clone()),
            key_version: key.as_ref().map(|k| k.version.clone()),
            encryption_algorithm: self.encryption_algorithm.clone(),
            msi_resource_id: self.key_vault_managed_identity_id.clone(),
            encryption_at_host: self.encryption_at_host_enabled,
        })
    }

    /// Fails when the response carries only part of a key reference
    pub fn flatten(input: &DiskEncryptionProperties) -> ProviderResult<Self> {
        let key_vault_key_id = match (&input.vault_uri, &input.key_name, &input.key_version) {
            (Some(vault_uri), Some(name), Some(version)) => Some(
                KeyVaultKey {
                    vault_uri: vault_uri.clone(),
                    name: name.clone(),
                    version: version.clone(),
                }
                .id(),
            ),
            (None, None, None) => None,
            _ => {
                return Err(ProviderError::remote(
                    "flattening `disk_encryption`: response carries an incomplete Key Vault key reference",
                ));
            }
        };
        Ok(Self {
            encryption_algorithm: input.encryption_algorithm.clone(),
            encryption_at_host_enabled: input.encryption_at_host,
            key_vault_key_id,
            key_vault_managed_identity_id: input.msi_resource_id.clone(),
        })
    }
}
