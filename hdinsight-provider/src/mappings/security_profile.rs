//! `security_profile` block (Enterprise Security Package)

use std::collections::HashMap;

use hdinsight_core::provider::ProviderResult;
use hdinsight_core::resource::Value;

use crate::attrs::{AttrSource, AttrsBuilder};
use crate::models::{ClusterIdentity, SecurityProfile as WireSecurityProfile};

const DIRECTORY_TYPE: &str = "ActiveDirectory";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityProfile {
    pub aadds_resource_id: String,
    pub domain_name: String,
    pub domain_username: String,
    pub domain_user_password: String,
    pub ldaps_urls: Vec<String>,
    pub msi_resource_id: String,
    pub cluster_users_group_dns: Vec<String>,
}

impl SecurityProfile {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            aadds_resource_id: block.required_string("aadds_resource_id")?,
            domain_name: block.required_string("domain_name")?,
            domain_username: block.required_string("domain_username")?,
            domain_user_password: block.required_string("domain_user_password")?,
            ldaps_urls: block.string_list("ldaps_urls")?,
            msi_resource_id: block.required_string("msi_resource_id")?,
            cluster_users_group_dns: block.string_list("cluster_users_group_dns")?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .string("aadds_resource_id", &self.aadds_resource_id)
            .string("domain_name", &self.domain_name)
            .string("domain_username", &self.domain_username)
            .string("domain_user_password", &self.domain_user_password)
            .strings("ldaps_urls", &self.ldaps_urls)
            .string("msi_resource_id", &self.msi_resource_id)
            .strings("cluster_users_group_dns", &self.cluster_users_group_dns)
            .build()
    }

    pub fn expand(&self) -> WireSecurityProfile {
        WireSecurityProfile {
            directory_type: Some(DIRECTORY_TYPE.to_string()),
            domain: Some(self.domain_name.clone()),
            ldaps_urls: Some(self.ldaps_urls.clone()),
            domain_username: Some(self.domain_username.clone()),
            domain_user_password: Some(self.domain_user_password.clone()),
            cluster_users_group_dns: Some(self.cluster_users_group_dns.clone()),
            aadds_resource_id: Some(self.aadds_resource_id.clone()),
            msi_resource_id: Some(self.msi_resource_id.clone()),
        }
    }

    /// The cluster runs as the profile's managed identity and nothing else
    pub fn identity(&self) -> ClusterIdentity {
        ClusterIdentity::user_assigned(&self.msi_resource_id)
    }

    /// The API never returns the domain password, so it comes from `prior`
    pub fn flatten(input: Option<&WireSecurityProfile>, prior: Option<&SecurityProfile>) -> Option<Self> {
        let input = input?;
        Some(Self {
            aadds_resource_id: input.aadds_resource_id.clone().unwrap_or_default(),
            domain_name: input.domain.clone().unwrap_or_default(),
            domain_username: input.domain_username.clone().unwrap_or_default(),
            domain_user_password: prior
                .map(|p| p.domain_user_password.clone())
                .unwrap_or_default(),
            ldaps_urls: input.ldaps_urls.clone().unwrap_or_default(),
            msi_resource_id: input.msi_resource_id.clone().unwrap_or_default(),
            cluster_users_group_dns: input.cluster_users_group_dns.clone().unwrap_or_default(),
        })
    }
}
