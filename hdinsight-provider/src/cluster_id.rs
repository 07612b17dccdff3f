//! ARM identifier of an HDInsight cluster

use std::fmt;

use hdinsight_core::provider::{ProviderError, ProviderResult};

const PROVIDER_NAMESPACE: &str = "Microsoft.HDInsight";

/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.HDInsight/clusters/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub cluster_name: String,
}

impl ClusterId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group_name: impl Into<String>,
        cluster_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
            cluster_name: cluster_name.into(),
        }
    }

    /// Parse an ARM resource ID. The fixed segments are matched
    /// case-insensitively since ARM does not preserve their casing.
    pub fn parse(input: &str) -> ProviderResult<Self> {
        let segments: Vec<&str> = input.trim_matches('/').split('/').collect();
        let invalid = || {
            ProviderError::validation(format!(
                "parsing cluster ID {:?}: expected /subscriptions/{{subscriptionId}}/resourceGroups/{{resourceGroupName}}/providers/{}/clusters/{{clusterName}}",
                input, PROVIDER_NAMESPACE
            ))
        };

        let [subs, sub, rgs, rg, providers, namespace, clusters, name] = segments.as_slice() else {
            return Err(invalid());
        };

        let fixed_ok = subs.eq_ignore_ascii_case("subscriptions")
            && rgs.eq_ignore_ascii_case("resourceGroups")
            && providers.eq_ignore_ascii_case("providers")
            && namespace.eq_ignore_ascii_case(PROVIDER_NAMESPACE)
            && clusters.eq_ignore_ascii_case("clusters");
        if !fixed_ok || sub.is_empty() || rg.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(*sub, *rg, *name))
    }

    /// The formatted resource ID
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/clusters/{}",
            self.subscription_id, self.resource_group_name, PROVIDER_NAMESPACE, self.cluster_name
        )
    }
}
