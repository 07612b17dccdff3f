//! `monitor` and `extension` blocks
//!
//! Both attach a Log Analytics workspace to the cluster through separate
//! extension endpoints, with the same request and status shapes.

use std::collections::HashMap;

use hdinsight_core::provider::ProviderResult;
use hdinsight_core::resource::Value;

use crate::attrs::{AttrSource, AttrsBuilder};
use crate::models::{MonitoringRequest, MonitoringStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorConfig {
    pub log_analytics_workspace_id: String,
    pub primary_key: String,
}

impl MonitorConfig {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            log_analytics_workspace_id: block.required_string("log_analytics_workspace_id")?,
            primary_key: block.required_string("primary_key")?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .string("log_analytics_workspace_id", &self.log_analytics_workspace_id)
            .string("primary_key", &self.primary_key)
            .build()
    }

    pub fn expand(&self) -> MonitoringRequest {
        MonitoringRequest {
            workspace_id: self.log_analytics_workspace_id.clone(),
            primary_key: self.primary_key.clone(),
        }
    }

    /// `None` unless the extension is enabled. The key is never returned.
    pub fn flatten(status: &MonitoringStatus, prior: Option<&MonitorConfig>) -> Option<Self> {
        if !status.cluster_monitoring_enabled.unwrap_or(false) {
            return None;
        }
        Some(Self {
            log_analytics_workspace_id: status.workspace_id.clone().unwrap_or_default(),
            primary_key: prior.map(|p| p.primary_key.clone()).unwrap_or_default(),
        })
    }
}
