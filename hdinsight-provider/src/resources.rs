//! Resource type definitions for the HDInsight provider

use hdinsight_core::provider::ResourceType;
use hdinsight_core::schema::ResourceSchema;

use crate::schemas;

// =============================================================================
// Resource Type Definitions
// =============================================================================

macro_rules! define_resource_type {
    ($name:ident, $type_name:expr, $schema:path) => {
        pub struct $name;
        impl ResourceType for $name {
            fn name(&self) -> &'static str {
                $type_name
            }
            fn schema(&self) -> ResourceSchema {
                $schema()
            }
        }
    };
}

define_resource_type!(
    SparkClusterType,
    schemas::spark_cluster::RESOURCE_TYPE,
    schemas::spark_cluster::schema
);

/// Returns all resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![Box::new(SparkClusterType)]
}
