//! HDInsight resource schema definitions

pub mod common;
pub mod spark_cluster;

use hdinsight_core::schema::ResourceSchema;

/// Returns all HDInsight schemas
pub fn all_schemas() -> Vec<ResourceSchema> {
    vec![spark_cluster::schema()]
}
