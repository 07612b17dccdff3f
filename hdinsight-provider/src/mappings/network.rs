//! `network` block

use std::collections::HashMap;

use hdinsight_core::provider::{ProviderError, ProviderResult};
use hdinsight_core::resource::Value;

use crate::attrs::{AttrSource, AttrsBuilder};
use crate::models::NetworkProperties;

pub const CONNECTION_DIRECTIONS: &[&str] = &["Inbound", "Outbound"];

const PRIVATE_LINK_ENABLED: &str = "Enabled";
const PRIVATE_LINK_DISABLED: &str = "Disabled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub connection_direction: String,
    pub private_link_enabled: bool,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            connection_direction: "Inbound".to_string(),
            private_link_enabled: false,
        }
    }
}

impl Network {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        let connection_direction = block
            .optional_string("connection_direction")?
            .unwrap_or_else(|| Network::default().connection_direction);
        if !CONNECTION_DIRECTIONS.contains(&connection_direction.as_str()) {
            return Err(ProviderError::validation(format!(
                "`{}`: invalid value {:?}, expected one of: {}",
                block.path_of("connection_direction"),
                connection_direction,
                CONNECTION_DIRECTIONS.join(", ")
            )));
        }
        Ok(Self {
            connection_direction,
            private_link_enabled: block.bool_or("private_link_enabled", false)?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .string("connection_direction", &self.connection_direction)
            .bool("private_link_enabled", self.private_link_enabled)
            .build()
    }

    pub fn expand(&self) -> NetworkProperties {
        let private_link = if self.private_link_enabled {
            PRIVATE_LINK_ENABLED
        } else {
            PRIVATE_LINK_DISABLED
        };
        NetworkProperties {
            resource_provider_connection: Some(self.connection_direction.clone()),
            private_link: Some(private_link.to_string()),
        }
    }

    /// Absent wire values fall back to the defaults the API applies
    pub fn flatten(input: &NetworkProperties) -> Self {
        let defaults = Network::default();
        Self {
            connection_direction: input
                .resource_provider_connection
                .clone()
                .unwrap_or(defaults.connection_direction),
            private_link_enabled: input
                .private_link
                .as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case(PRIVATE_LINK_ENABLED)),
        }
    }
}
