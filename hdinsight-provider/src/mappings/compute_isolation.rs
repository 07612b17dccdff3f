//! `compute_isolation` block

use std::collections::HashMap;

use hdinsight_core::provider::ProviderResult;
use hdinsight_core::resource::Value;

use crate::attrs::{AttrSource, AttrsBuilder};
use crate::models::ComputeIsolationProperties;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputeIsolation {
    pub compute_isolation_enabled: bool,
    pub host_sku: Option<String>,
}

impl ComputeIsolation {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            compute_isolation_enabled: block.bool_or("compute_isolation_enabled", false)?,
            host_sku: block.optional_string("host_sku")?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .bool("compute_isolation_enabled", self.compute_isolation_enabled)
            .opt_string("host_sku", self.host_sku.as_deref())
            .build()
    }

    pub fn expand(&self) -> ComputeIsolationProperties {
        ComputeIsolationProperties {
            enable_compute_isolation: Some(self.compute_isolation_enabled),
            host_sku: self.host_sku.clone(),
        }
    }

    pub fn flatten(input: &ComputeIsolationProperties) -> Self {
        Self {
            compute_isolation_enabled: input.enable_compute_isolation.unwrap_or(false),
            host_sku: input.host_sku.clone().filter(|s| !s.is_empty()),
        }
    }
}
