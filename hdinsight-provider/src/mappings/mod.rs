//! Expand/flatten pairs for each compound attribute
//!
//! Every block has a typed struct with `from_attrs`/`to_attrs` for the
//! declarative side and `expand`/`flatten` for the wire side.

pub mod component_version;
pub mod compute_isolation;
pub mod configurations;
pub mod disk_encryption;
pub mod monitor;
pub mod network;
pub mod roles;
pub mod security_profile;
pub mod storage;

pub use component_version::ComponentVersion;
pub use compute_isolation::ComputeIsolation;
pub use configurations::{Gateway, Metastore, Metastores, merge_configurations};
pub use disk_encryption::DiskEncryption;
pub use monitor::MonitorConfig;
pub use network::Network;
pub use roles::{Node, NodeAutoscale, RoleDefinitions, Roles, SPARK_ROLES};
pub use security_profile::SecurityProfile;
pub use storage::{StorageAccount, StorageAccountGen2, expand_storage_accounts};
