//! Schema fragments shared by the HDInsight cluster resources

use hdinsight_core::resource::Value;
use hdinsight_core::schema::{AttributeSchema, AttributeType, types};

use crate::mappings::disk_encryption::{ENCRYPTION_ALGORITHMS, KeyVaultKey};
use crate::mappings::network::CONNECTION_DIRECTIONS;
use crate::utils::{TIERS, TLS_VERSIONS, validate_cluster_name};

fn enum_of(values: &[&str]) -> AttributeType {
    AttributeType::Enum(values.iter().map(|v| v.to_string()).collect())
}

/// Cluster name type with custom validation
pub fn cluster_name() -> AttributeType {
    AttributeType::Custom {
        name: "ClusterName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => validate_cluster_name(s),
            _ => Err("Expected string".to_string()),
        },
    }
}

/// Tier type; accepted in any casing
pub fn tier() -> AttributeType {
    AttributeType::Custom {
        name: "Tier".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) if TIERS.iter().any(|t| t.eq_ignore_ascii_case(s)) => Ok(()),
            Value::String(s) => Err(format!(
                "Invalid tier '{}', expected one of: {}",
                s,
                TIERS.join(", ")
            )),
            _ => Err("Expected string".to_string()),
        },
    }
}

pub fn tls_version() -> AttributeType {
    enum_of(TLS_VERSIONS)
}

/// Versioned Key Vault key URL
pub fn key_vault_key_id() -> AttributeType {
    AttributeType::Custom {
        name: "KeyVaultKeyId".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => KeyVaultKey::parse(s).map(|_| ()),
            _ => Err("Expected string".to_string()),
        },
    }
}

pub fn disk_encryption() -> AttributeSchema {
    AttributeSchema::new(
        "disk_encryption",
        AttributeType::bounded_list(
            AttributeType::block([
                AttributeSchema::new("encryption_algorithm", enum_of(ENCRYPTION_ALGORITHMS)),
                AttributeSchema::new("encryption_at_host_enabled", AttributeType::Bool),
                AttributeSchema::new("key_vault_key_id", key_vault_key_id()),
                AttributeSchema::new("key_vault_managed_identity_id", AttributeType::String),
            ]),
            1,
        ),
    )
    .force_new()
    .with_description("Disk encryption with a customer-managed key or at host")
}

pub fn compute_isolation() -> AttributeSchema {
    AttributeSchema::new(
        "compute_isolation",
        AttributeType::block([
            AttributeSchema::new("compute_isolation_enabled", AttributeType::Bool)
                .with_default(Value::Bool(false)),
            AttributeSchema::new("host_sku", AttributeType::String),
        ]),
    )
    .force_new()
    .computed()
}

pub fn gateway() -> AttributeSchema {
    AttributeSchema::new(
        "gateway",
        AttributeType::block([
            AttributeSchema::new("username", types::non_empty_string()).required(),
            AttributeSchema::new("password", types::non_empty_string())
                .required()
                .sensitive(),
        ]),
    )
    .required()
    .with_description("Credentials of the cluster's HTTP gateway")
}

fn metastore() -> AttributeType {
    AttributeType::block([
        AttributeSchema::new("server", types::non_empty_string()).required(),
        AttributeSchema::new("database_name", types::non_empty_string()).required(),
        AttributeSchema::new("username", types::non_empty_string()).required(),
        AttributeSchema::new("password", types::non_empty_string())
            .required()
            .sensitive(),
    ])
}

pub fn metastores() -> AttributeSchema {
    AttributeSchema::new(
        "metastores",
        AttributeType::block([
            AttributeSchema::new("hive", metastore()),
            AttributeSchema::new("oozie", metastore()),
            AttributeSchema::new("ambari", metastore()),
        ]),
    )
    .force_new()
    .with_description("External SQL databases for the Hive, Oozie and Ambari metastores")
}

pub fn network() -> AttributeSchema {
    AttributeSchema::new(
        "network",
        AttributeType::block([
            AttributeSchema::new("connection_direction", enum_of(CONNECTION_DIRECTIONS))
                .with_default(Value::string("Inbound")),
            AttributeSchema::new("private_link_enabled", AttributeType::Bool)
                .with_default(Value::Bool(false)),
        ]),
    )
    .force_new()
    .computed()
}

pub fn security_profile() -> AttributeSchema {
    AttributeSchema::new(
        "security_profile",
        AttributeType::block([
            AttributeSchema::new("aadds_resource_id", types::non_empty_string()).required(),
            AttributeSchema::new("domain_name", types::non_empty_string()).required(),
            AttributeSchema::new("domain_username", types::non_empty_string()).required(),
            AttributeSchema::new("domain_user_password", types::non_empty_string())
                .required()
                .sensitive(),
            AttributeSchema::new("ldaps_urls", AttributeType::list(AttributeType::String)),
            AttributeSchema::new("msi_resource_id", types::non_empty_string()).required(),
            AttributeSchema::new(
                "cluster_users_group_dns",
                AttributeType::list(AttributeType::String),
            ),
        ]),
    )
    .force_new()
    .with_description("Enterprise Security Package domain join settings")
}

pub fn storage_account() -> AttributeSchema {
    AttributeSchema::new(
        "storage_account",
        AttributeType::list(AttributeType::block([
            AttributeSchema::new("storage_container_id", types::non_empty_string()).required(),
            AttributeSchema::new("storage_account_key", types::non_empty_string())
                .required()
                .sensitive(),
            AttributeSchema::new("is_default", AttributeType::Bool).required(),
            AttributeSchema::new("storage_resource_id", AttributeType::String),
        ])),
    )
    .force_new()
    .write_only()
}

pub fn storage_account_gen2() -> AttributeSchema {
    AttributeSchema::new(
        "storage_account_gen2",
        AttributeType::bounded_list(
            AttributeType::block([
                AttributeSchema::new("storage_resource_id", types::non_empty_string())
                    .required(),
                AttributeSchema::new("filesystem_id", types::non_empty_string()).required(),
                AttributeSchema::new("managed_identity_resource_id", types::non_empty_string())
                    .required(),
                AttributeSchema::new("is_default", AttributeType::Bool).required(),
            ]),
            1,
        ),
    )
    .force_new()
    .write_only()
}

fn autoscale() -> AttributeType {
    AttributeType::block([
        AttributeSchema::new(
            "capacity",
            AttributeType::block([
                AttributeSchema::new("min_instance_count", types::positive_int()).required(),
                AttributeSchema::new("max_instance_count", types::positive_int()).required(),
            ]),
        ),
        AttributeSchema::new(
            "recurrence",
            AttributeType::block([
                AttributeSchema::new("timezone", types::non_empty_string()).required(),
                AttributeSchema::new(
                    "schedule",
                    AttributeType::list(AttributeType::block([
                        AttributeSchema::new("days", AttributeType::list(AttributeType::String))
                            .required(),
                        AttributeSchema::new("time", types::non_empty_string()).required(),
                        AttributeSchema::new("target_instance_count", types::positive_int())
                            .required(),
                    ])),
                )
                .required(),
            ]),
        ),
    ])
}

/// One node role. Only the worker role takes an instance count and autoscale.
pub fn node(worker: bool) -> AttributeType {
    let mut attributes = vec![
        AttributeSchema::new("vm_size", types::non_empty_string())
            .required()
            .force_new()
            .case_insensitive(),
        AttributeSchema::new("username", types::non_empty_string())
            .required()
            .force_new(),
        AttributeSchema::new("password", AttributeType::String)
            .sensitive()
            .force_new(),
        AttributeSchema::new("ssh_keys", AttributeType::list(AttributeType::String)).force_new(),
        AttributeSchema::new("subnet_id", AttributeType::String).force_new(),
        AttributeSchema::new("virtual_network_id", AttributeType::String).force_new(),
        AttributeSchema::new(
            "script_actions",
            AttributeType::list(AttributeType::block([
                AttributeSchema::new("name", types::non_empty_string()).required(),
                AttributeSchema::new("uri", types::non_empty_string()).required(),
                AttributeSchema::new("parameters", AttributeType::String),
            ])),
        )
        .force_new(),
        // rejected at expand time for roles without data disks
        AttributeSchema::new("number_of_disks_per_node", types::positive_int()).force_new(),
    ];
    if worker {
        attributes.push(
            AttributeSchema::new("target_instance_count", types::positive_int()).required(),
        );
        attributes.push(AttributeSchema::new("autoscale", autoscale()));
    } else {
        // accepted for symmetry; must equal the role's fixed count
        attributes.push(AttributeSchema::new("target_instance_count", types::positive_int()));
    }
    AttributeType::block(attributes)
}

pub fn roles() -> AttributeSchema {
    AttributeSchema::new(
        "roles",
        AttributeType::block([
            AttributeSchema::new("head_node", node(false)).required(),
            AttributeSchema::new("worker_node", node(true)).required(),
            AttributeSchema::new("zookeeper_node", node(false)).required(),
        ]),
    )
    .required()
}

fn log_analytics(name: &str) -> AttributeSchema {
    AttributeSchema::new(
        name,
        AttributeType::block([
            AttributeSchema::new("log_analytics_workspace_id", types::non_empty_string())
                .required(),
            AttributeSchema::new("primary_key", types::non_empty_string())
                .required()
                .sensitive(),
        ]),
    )
}

pub fn monitor() -> AttributeSchema {
    log_analytics("monitor").with_description("Classic Log Analytics monitoring")
}

pub fn extension() -> AttributeSchema {
    log_analytics("extension").with_description("Azure Monitor extension")
}
