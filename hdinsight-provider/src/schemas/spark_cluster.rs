//! Spark cluster resource schema definition
//!
//! Based on the HDInsight `2021-06-01` cluster API with `kind = "Spark"`.

use hdinsight_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::common;

pub const RESOURCE_TYPE: &str = "hdinsight_spark_cluster";

pub fn schema() -> ResourceSchema {
    ResourceSchema::new(RESOURCE_TYPE)
        .with_description("An HDInsight cluster running Apache Spark")
        .attribute(
            AttributeSchema::new("name", common::cluster_name())
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("resource_group_name", types::non_empty_string())
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("location", types::non_empty_string())
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("cluster_version", types::non_empty_string())
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("tier", common::tier())
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("tls_min_version", common::tls_version())
                .force_new()
                .computed(),
        )
        .attribute(
            AttributeSchema::new("encryption_in_transit_enabled", AttributeType::Bool)
                .force_new()
                .computed(),
        )
        .attribute(common::disk_encryption())
        .attribute(
            AttributeSchema::new(
                "component_version",
                AttributeType::block([AttributeSchema::new(
                    "spark",
                    types::non_empty_string(),
                )
                .required()
                .force_new()]),
            )
            .required(),
        )
        .attribute(common::compute_isolation())
        .attribute(common::gateway())
        .attribute(common::metastores())
        .attribute(common::network())
        .attribute(common::security_profile())
        .attribute(common::storage_account())
        .attribute(common::storage_account_gen2())
        .attribute(common::roles())
        .attribute(common::monitor())
        .attribute(common::extension())
        .attribute(AttributeSchema::new("tags", types::tags()))
        .attribute(
            AttributeSchema::new("https_endpoint", AttributeType::String)
                .read_only()
                .with_description("Host of the cluster's HTTPS endpoint"),
        )
        .attribute(
            AttributeSchema::new("ssh_endpoint", AttributeType::String)
                .read_only()
                .with_description("Host of the cluster's SSH endpoint"),
        )
}
