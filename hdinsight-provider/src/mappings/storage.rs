//! `storage_account` and `storage_account_gen2` blocks
//!
//! The API never returns storage account keys, so both blocks are
//! write-only: they are expanded on create and carried over on read.

use std::collections::HashMap;

use hdinsight_core::provider::{ProviderError, ProviderResult};
use hdinsight_core::resource::Value;
use url::Url;

use crate::attrs::{AttrSource, AttrsBuilder};
use crate::models::{ClusterIdentity, StorageAccount as WireStorageAccount};

/// Blob storage account authenticated with an access key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageAccount {
    pub storage_container_id: String,
    pub storage_account_key: String,
    pub is_default: bool,
    pub storage_resource_id: Option<String>,
}

impl StorageAccount {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            storage_container_id: block.required_string("storage_container_id")?,
            storage_account_key: block.required_string("storage_account_key")?,
            is_default: block.bool_or("is_default", false)?,
            storage_resource_id: block.optional_string("storage_resource_id")?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .string("storage_container_id", &self.storage_container_id)
            .string("storage_account_key", &self.storage_account_key)
            .bool("is_default", self.is_default)
            .opt_string("storage_resource_id", self.storage_resource_id.as_deref())
            .build()
    }

    fn expand(&self) -> ProviderResult<WireStorageAccount> {
        let (host, container) = split_endpoint_url(&self.storage_container_id)
            .map_err(|e| ProviderError::validation(format!("`storage_container_id`: {}", e)))?;
        Ok(WireStorageAccount {
            name: Some(host),
            is_default: Some(self.is_default),
            container: Some(container),
            key: Some(self.storage_account_key.clone()),
            resource_id: self.storage_resource_id.clone(),
            ..Default::default()
        })
    }
}

/// Data Lake Gen2 filesystem accessed through a managed identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageAccountGen2 {
    pub storage_resource_id: String,
    pub filesystem_id: String,
    pub managed_identity_resource_id: String,
    pub is_default: bool,
}

impl StorageAccountGen2 {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            storage_resource_id: block.required_string("storage_resource_id")?,
            filesystem_id: block.required_string("filesystem_id")?,
            managed_identity_resource_id: block.required_string("managed_identity_resource_id")?,
            is_default: block.bool_or("is_default", false)?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .string("storage_resource_id", &self.storage_resource_id)
            .string("filesystem_id", &self.filesystem_id)
            .string(
                "managed_identity_resource_id",
                &self.managed_identity_resource_id,
            )
            .bool("is_default", self.is_default)
            .build()
    }

    fn expand(&self) -> ProviderResult<WireStorageAccount> {
        let (host, file_system) = split_endpoint_url(&self.filesystem_id)
            .map_err(|e| ProviderError::validation(format!("`filesystem_id`: {}", e)))?;
        Ok(WireStorageAccount {
            name: Some(host),
            is_default: Some(self.is_default),
            file_system: Some(file_system),
            resource_id: Some(self.storage_resource_id.clone()),
            msi_resource_id: Some(self.managed_identity_resource_id.clone()),
            ..Default::default()
        })
    }
}

/// Split `https://{account}.{service}.core.windows.net/{name}` into host and name
fn split_endpoint_url(input: &str) -> Result<(String, String), String> {
    let url = Url::parse(input).map_err(|e| format!("parsing {:?}: {}", input, e))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| format!("{:?} has no host", input))?;
    let name = url.path().trim_matches('/');
    if name.is_empty() || name.contains('/') {
        return Err(format!(
            "{:?} must name exactly one container or filesystem",
            input
        ));
    }
    Ok((host.to_string(), name.to_string()))
}

/// Expand both storage styles into the storage profile.
///
/// Exactly one account across both lists must be the default. Gen2 accounts
/// authenticate with a managed identity, which becomes the cluster identity.
pub fn expand_storage_accounts(
    accounts: &[StorageAccount],
    gen2_accounts: &[StorageAccountGen2],
) -> ProviderResult<(Vec<WireStorageAccount>, Option<ClusterIdentity>)> {
    if gen2_accounts.len() > 1 {
        return Err(ProviderError::validation(
            "at most one `storage_account_gen2` may be specified",
        ));
    }

    let defaults = accounts.iter().filter(|a| a.is_default).count()
        + gen2_accounts.iter().filter(|a| a.is_default).count();
    match defaults {
        1 => {}
        0 => {
            return Err(ProviderError::validation(
                "exactly one `storage_account` or `storage_account_gen2` must be the default, found none",
            ));
        }
        n => {
            return Err(ProviderError::validation(format!(
                "exactly one `storage_account` or `storage_account_gen2` must be the default, found {}",
                n
            )));
        }
    }

    let mut expanded = Vec::with_capacity(accounts.len() + gen2_accounts.len());
    for account in accounts {
        expanded.push(account.expand()?);
    }

    let mut identity = None;
    for account in gen2_accounts {
        expanded.push(account.expand()?);
        identity = Some(ClusterIdentity::user_assigned(
            &account.managed_identity_resource_id,
        ));
    }

    Ok((expanded, identity))
}
