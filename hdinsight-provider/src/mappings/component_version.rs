//! `component_version` block

use std::collections::{BTreeMap, HashMap};

use hdinsight_core::provider::ProviderResult;
use hdinsight_core::resource::Value;

use crate::attrs::{AttrSource, AttrsBuilder};

const SPARK_COMPONENT: &str = "Spark";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentVersion {
    pub spark: String,
}

impl ComponentVersion {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            spark: block.required_string("spark")?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new().string("spark", &self.spark).build()
    }

    pub fn expand(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(SPARK_COMPONENT.to_string(), self.spark.clone())])
    }

    /// A response without a Spark entry flattens to an empty version
    pub fn flatten(input: Option<&BTreeMap<String, String>>) -> Self {
        Self {
            spark: input
                .and_then(|versions| versions.get(SPARK_COMPONENT))
                .cloned()
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::Attrs;

    #[test]
    fn expand_uses_component_name() {
        let version = ComponentVersion {
            spark: "2.4".to_string(),
        };
        let expanded = version.expand();
        assert_eq!(expanded.get("Spark").map(String::as_str), Some("2.4"));
        assert_eq!(ComponentVersion::flatten(Some(&expanded)), version);
    }

    #[test]
    fn flatten_missing_is_empty() {
        assert_eq!(ComponentVersion::flatten(None).spark, "");
        let other = BTreeMap::from([("Hadoop".to_string(), "3.1".to_string())]);
        assert_eq!(ComponentVersion::flatten(Some(&other)).spark, "");
    }

    #[test]
    fn spark_is_required() {
        let empty = HashMap::new();
        assert!(ComponentVersion::from_attrs(&Attrs::root(&empty)).is_err());
    }
}
