//! `roles` block: head, worker and zookeeper node definitions
//!
//! The API takes one generic role shape for every node type. What a user may
//! set on each role (instance counts, autoscale, data disks) is fixed per
//! cluster kind by a `NodeDefinition`.

use std::collections::HashMap;

use hdinsight_core::provider::{ProviderError, ProviderResult};
use hdinsight_core::resource::Value;

use crate::attrs::{AttrSource, AttrsBuilder};
use crate::models::{
    Autoscale as WireAutoscale, AutoscaleCapacity as WireAutoscaleCapacity,
    AutoscaleRecurrence as WireAutoscaleRecurrence, AutoscaleSchedule as WireAutoscaleSchedule,
    AutoscaleTimeAndCapacity, ComputeProfile, DataDisksGroup, HardwareProfile,
    LinuxOperatingSystemProfile, OsProfile, Role, ScriptAction as WireScriptAction, SshProfile,
    SshPublicKey, VirtualNetworkProfile,
};

pub const HEAD_NODE_ROLE: &str = "headnode";
pub const WORKER_NODE_ROLE: &str = "workernode";
pub const ZOOKEEPER_NODE_ROLE: &str = "zookeepernode";

/// What may be configured on one role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDefinition {
    pub can_specify_instance_count: bool,
    pub min_instance_count: i64,
    pub max_instance_count: Option<i64>,
    pub can_specify_disks: bool,
    pub fixed_target_instance_count: Option<i64>,
    pub can_autoscale_by_capacity: bool,
    pub can_autoscale_on_schedule: bool,
}

impl NodeDefinition {
    pub fn can_autoscale(&self) -> bool {
        self.can_autoscale_by_capacity || self.can_autoscale_on_schedule
    }
}

/// Node definitions of one cluster kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDefinitions {
    pub head_node: NodeDefinition,
    pub worker_node: NodeDefinition,
    pub zookeeper_node: NodeDefinition,
}

pub const SPARK_HEAD_NODE: NodeDefinition = NodeDefinition {
    can_specify_instance_count: false,
    min_instance_count: 2,
    max_instance_count: Some(2),
    can_specify_disks: false,
    fixed_target_instance_count: Some(2),
    can_autoscale_by_capacity: false,
    can_autoscale_on_schedule: false,
};

pub const SPARK_WORKER_NODE: NodeDefinition = NodeDefinition {
    can_specify_instance_count: true,
    min_instance_count: 1,
    max_instance_count: None,
    can_specify_disks: false,
    fixed_target_instance_count: None,
    can_autoscale_by_capacity: true,
    can_autoscale_on_schedule: true,
};

pub const SPARK_ZOOKEEPER_NODE: NodeDefinition = NodeDefinition {
    can_specify_instance_count: false,
    min_instance_count: 3,
    max_instance_count: Some(3),
    can_specify_disks: false,
    fixed_target_instance_count: Some(3),
    can_autoscale_by_capacity: false,
    can_autoscale_on_schedule: false,
};

pub const SPARK_ROLES: RoleDefinitions = RoleDefinitions {
    head_node: SPARK_HEAD_NODE,
    worker_node: SPARK_WORKER_NODE,
    zookeeper_node: SPARK_ZOOKEEPER_NODE,
};

// =============================================================================
// Typed node settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptAction {
    pub name: String,
    pub uri: String,
    pub parameters: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoscaleCapacity {
    pub min_instance_count: i64,
    pub max_instance_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoscaleSchedule {
    pub days: Vec<String>,
    pub time: String,
    pub target_instance_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoscaleRecurrence {
    pub timezone: String,
    pub schedule: Vec<AutoscaleSchedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAutoscale {
    pub capacity: Option<AutoscaleCapacity>,
    pub recurrence: Option<AutoscaleRecurrence>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub vm_size: String,
    pub username: String,
    pub password: Option<String>,
    pub ssh_keys: Vec<String>,
    pub subnet_id: Option<String>,
    pub virtual_network_id: Option<String>,
    pub script_actions: Vec<ScriptAction>,
    pub target_instance_count: Option<i64>,
    pub number_of_disks_per_node: Option<i64>,
    pub autoscale: Option<NodeAutoscale>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles {
    pub head_node: Node,
    pub worker_node: Node,
    pub zookeeper_node: Node,
}

// =============================================================================
// Declarative attributes
// =============================================================================

impl ScriptAction {
    fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            name: block.required_string("name")?,
            uri: block.required_string("uri")?,
            parameters: block.optional_string("parameters")?,
        })
    }

    fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .string("name", &self.name)
            .string("uri", &self.uri)
            .opt_string("parameters", self.parameters.as_deref())
            .build()
    }
}

impl NodeAutoscale {
    fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        let capacity = match block.block("capacity")? {
            Some(capacity) => Some(AutoscaleCapacity {
                min_instance_count: required_int(&capacity, "min_instance_count")?,
                max_instance_count: required_int(&capacity, "max_instance_count")?,
            }),
            None => None,
        };

        let recurrence = match block.block("recurrence")? {
            Some(recurrence) => {
                let schedule = recurrence
                    .blocks("schedule")?
                    .iter()
                    .map(|entry| {
                        Ok(AutoscaleSchedule {
                            days: entry.string_list("days")?,
                            time: entry.required_string("time")?,
                            target_instance_count: required_int(entry, "target_instance_count")?,
                        })
                    })
                    .collect::<ProviderResult<Vec<_>>>()?;
                Some(AutoscaleRecurrence {
                    timezone: recurrence.required_string("timezone")?,
                    schedule,
                })
            }
            None => None,
        };

        Ok(Self {
            capacity,
            recurrence,
        })
    }

    fn to_attrs(&self) -> HashMap<String, Value> {
        let capacity = self.capacity.map(|c| {
            AttrsBuilder::new()
                .int("min_instance_count", c.min_instance_count)
                .int("max_instance_count", c.max_instance_count)
                .build()
        });
        let recurrence = self.recurrence.as_ref().map(|r| {
            let schedule = r
                .schedule
                .iter()
                .map(|s| {
                    AttrsBuilder::new()
                        .strings("days", &s.days)
                        .string("time", &s.time)
                        .int("target_instance_count", s.target_instance_count)
                        .build()
                })
                .collect();
            AttrsBuilder::new()
                .string("timezone", &r.timezone)
                .blocks("schedule", schedule)
                .build()
        });
        AttrsBuilder::new()
            .opt_block("capacity", capacity)
            .opt_block("recurrence", recurrence)
            .build()
    }
}

fn required_int<'a>(block: &impl AttrSource<'a>, key: &str) -> ProviderResult<i64> {
    block
        .optional_int(key)?
        .ok_or_else(|| ProviderError::validation(format!("`{}` is required", block.path_of(key))))
}

impl Node {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            vm_size: block.required_string("vm_size")?,
            username: block.required_string("username")?,
            password: block.optional_string("password")?,
            ssh_keys: block.string_list("ssh_keys")?,
            subnet_id: block.optional_string("subnet_id")?,
            virtual_network_id: block.optional_string("virtual_network_id")?,
            script_actions: block
                .blocks("script_actions")?
                .iter()
                .map(ScriptAction::from_attrs)
                .collect::<ProviderResult<Vec<_>>>()?,
            target_instance_count: block.optional_int("target_instance_count")?,
            number_of_disks_per_node: block.optional_int("number_of_disks_per_node")?,
            autoscale: block
                .block("autoscale")?
                .map(|b| NodeAutoscale::from_attrs(&b))
                .transpose()?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .string("vm_size", &self.vm_size)
            .string("username", &self.username)
            .opt_string("password", self.password.as_deref())
            .strings("ssh_keys", &self.ssh_keys)
            .opt_string("subnet_id", self.subnet_id.as_deref())
            .opt_string("virtual_network_id", self.virtual_network_id.as_deref())
            .blocks(
                "script_actions",
                self.script_actions.iter().map(ScriptAction::to_attrs).collect(),
            )
            .opt_int("target_instance_count", self.target_instance_count)
            .opt_int("number_of_disks_per_node", self.number_of_disks_per_node)
            .opt_block("autoscale", self.autoscale.as_ref().map(NodeAutoscale::to_attrs))
            .build()
    }
}

impl Roles {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            head_node: Node::from_attrs(&block.required_block("head_node")?)?,
            worker_node: Node::from_attrs(&block.required_block("worker_node")?)?,
            zookeeper_node: Node::from_attrs(&block.required_block("zookeeper_node")?)?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .block("head_node", self.head_node.to_attrs())
            .block("worker_node", self.worker_node.to_attrs())
            .block("zookeeper_node", self.zookeeper_node.to_attrs())
            .build()
    }
}

// =============================================================================
// Expand
// =============================================================================

/// Expand all three roles, validating each against its definition
pub fn expand_roles(roles: &Roles, definitions: &RoleDefinitions) -> ProviderResult<Vec<Role>> {
    Ok(vec![
        expand_node(
            "roles.head_node",
            HEAD_NODE_ROLE,
            &roles.head_node,
            &definitions.head_node,
        )?,
        expand_node(
            "roles.worker_node",
            WORKER_NODE_ROLE,
            &roles.worker_node,
            &definitions.worker_node,
        )?,
        expand_node(
            "roles.zookeeper_node",
            ZOOKEEPER_NODE_ROLE,
            &roles.zookeeper_node,
            &definitions.zookeeper_node,
        )?,
    ])
}

fn expand_node(
    path: &str,
    role_name: &str,
    node: &Node,
    definition: &NodeDefinition,
) -> ProviderResult<Role> {
    let invalid = |message: String| ProviderError::validation(format!("`{}`: {}", path, message));

    let password = node.password.as_deref().filter(|p| !p.is_empty());
    let ssh_profile = match (password, node.ssh_keys.is_empty()) {
        (Some(_), false) => {
            return Err(invalid(
                "`password` and `ssh_keys` cannot both be specified".to_string(),
            ));
        }
        (None, true) => {
            return Err(invalid(
                "either a `password` or `ssh_keys` must be specified".to_string(),
            ));
        }
        (Some(_), true) => None,
        (None, false) => Some(SshProfile {
            public_keys: node
                .ssh_keys
                .iter()
                .map(|key| SshPublicKey {
                    certificate_data: Some(key.clone()),
                })
                .collect(),
        }),
    };

    let virtual_network_profile = match (&node.virtual_network_id, &node.subnet_id) {
        (Some(vnet), Some(subnet)) => Some(VirtualNetworkProfile {
            id: Some(vnet.clone()),
            subnet: Some(subnet.clone()),
        }),
        (None, None) => None,
        _ => {
            return Err(invalid(
                "`subnet_id` and `virtual_network_id` must be specified together".to_string(),
            ));
        }
    };

    let data_disks_groups = match node.number_of_disks_per_node {
        Some(_) if !definition.can_specify_disks => {
            return Err(invalid(
                "`number_of_disks_per_node` cannot be set on this role".to_string(),
            ));
        }
        Some(disks) if disks < 1 => {
            return Err(invalid(format!(
                "`number_of_disks_per_node` must be at least 1, got {}",
                disks
            )));
        }
        Some(disks) => Some(vec![DataDisksGroup {
            disks_per_node: Some(disks),
        }]),
        None => None,
    };

    let (min_instance_count, target_instance_count) = if definition.can_specify_instance_count {
        let target = node
            .target_instance_count
            .ok_or_else(|| invalid("`target_instance_count` is required".to_string()))?;
        check_instance_count(target, definition).map_err(invalid)?;
        (None, Some(target))
    } else {
        let fixed = definition.fixed_target_instance_count;
        if let Some(target) = node.target_instance_count
            && Some(target) != fixed
        {
            return Err(invalid(format!(
                "`target_instance_count` cannot be changed on this role: expected {}, got {}",
                fixed.map(|f| f.to_string()).unwrap_or_default(),
                target
            )));
        }
        (Some(definition.min_instance_count), fixed)
    };

    let autoscale = match &node.autoscale {
        Some(autoscale) => Some(expand_autoscale(autoscale, definition).map_err(invalid)?),
        None => None,
    };

    let script_actions = if node.script_actions.is_empty() {
        None
    } else {
        Some(
            node.script_actions
                .iter()
                .map(|action| WireScriptAction {
                    name: action.name.clone(),
                    uri: action.uri.clone(),
                    parameters: action.parameters.clone().unwrap_or_default(),
                })
                .collect(),
        )
    };

    Ok(Role {
        name: role_name.to_string(),
        min_instance_count,
        target_instance_count,
        autoscale,
        hardware_profile: Some(HardwareProfile {
            vm_size: Some(node.vm_size.clone()),
        }),
        os_profile: Some(OsProfile {
            linux_operating_system_profile: Some(LinuxOperatingSystemProfile {
                username: Some(node.username.clone()),
                password: password.map(str::to_string),
                ssh_profile,
            }),
        }),
        virtual_network_profile,
        data_disks_groups,
        script_actions,
    })
}

fn check_instance_count(count: i64, definition: &NodeDefinition) -> Result<(), String> {
    if count < definition.min_instance_count {
        return Err(format!(
            "instance count must be at least {}, got {}",
            definition.min_instance_count, count
        ));
    }
    if let Some(max) = definition.max_instance_count
        && count > max
    {
        return Err(format!("instance count must be at most {}, got {}", max, count));
    }
    Ok(())
}

fn expand_autoscale(
    autoscale: &NodeAutoscale,
    definition: &NodeDefinition,
) -> Result<WireAutoscale, String> {
    if !definition.can_autoscale() {
        return Err("`autoscale` is not supported on this role".to_string());
    }

    match (&autoscale.capacity, &autoscale.recurrence) {
        (Some(_), Some(_)) => {
            Err("`autoscale.capacity` and `autoscale.recurrence` cannot both be specified".to_string())
        }
        (None, None) => {
            Err("`autoscale` needs either a `capacity` or a `recurrence` block".to_string())
        }
        (Some(capacity), None) => {
            if !definition.can_autoscale_by_capacity {
                return Err("autoscaling by capacity is not supported on this role".to_string());
            }
            check_instance_count(capacity.min_instance_count, definition)?;
            check_instance_count(capacity.max_instance_count, definition)?;
            if capacity.min_instance_count > capacity.max_instance_count {
                return Err(format!(
                    "`autoscale.capacity.min_instance_count` ({}) must not exceed `max_instance_count` ({})",
                    capacity.min_instance_count, capacity.max_instance_count
                ));
            }
            Ok(WireAutoscale {
                capacity: Some(WireAutoscaleCapacity {
                    min_instance_count: Some(capacity.min_instance_count),
                    max_instance_count: Some(capacity.max_instance_count),
                }),
                recurrence: None,
            })
        }
        (None, Some(recurrence)) => {
            if !definition.can_autoscale_on_schedule {
                return Err("autoscaling on a schedule is not supported on this role".to_string());
            }
            if recurrence.schedule.is_empty() {
                return Err("`autoscale.recurrence.schedule` must not be empty".to_string());
            }
            let mut schedule = Vec::with_capacity(recurrence.schedule.len());
            for entry in &recurrence.schedule {
                check_instance_count(entry.target_instance_count, definition)?;
                schedule.push(WireAutoscaleSchedule {
                    days: Some(entry.days.clone()),
                    time_and_capacity: Some(AutoscaleTimeAndCapacity {
                        time: Some(entry.time.clone()),
                        min_instance_count: Some(entry.target_instance_count),
                        max_instance_count: Some(entry.target_instance_count),
                    }),
                });
            }
            Ok(WireAutoscale {
                capacity: None,
                recurrence: Some(WireAutoscaleRecurrence {
                    time_zone: Some(recurrence.timezone.clone()),
                    schedule: Some(schedule),
                }),
            })
        }
    }
}

/// Expand only the autoscale settings of the worker role, for in-place updates
pub fn expand_worker_autoscale(
    node: &Node,
    definitions: &RoleDefinitions,
) -> ProviderResult<Option<WireAutoscale>> {
    node.autoscale
        .as_ref()
        .map(|a| expand_autoscale(a, &definitions.worker_node))
        .transpose()
        .map_err(|e| ProviderError::validation(format!("`roles.worker_node`: {}", e)))
}

/// Validate a new worker instance count, for in-place resizes
pub fn check_worker_count(count: i64, definitions: &RoleDefinitions) -> ProviderResult<()> {
    check_instance_count(count, &definitions.worker_node).map_err(|e| {
        ProviderError::validation(format!("`roles.worker_node.target_instance_count`: {}", e))
    })
}

// =============================================================================
// Flatten
// =============================================================================

/// Flatten the compute profile back into node settings. Secrets the API does
/// not return come from `prior`. Returns `None` when a role is missing.
pub fn flatten_roles(
    profile: Option<&ComputeProfile>,
    definitions: &RoleDefinitions,
    prior: Option<&Roles>,
) -> Option<Roles> {
    let profile = profile?;
    let find = |name: &str| {
        profile
            .roles
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    };

    Some(Roles {
        head_node: flatten_node(
            find(HEAD_NODE_ROLE)?,
            &definitions.head_node,
            prior.map(|p| &p.head_node),
        ),
        worker_node: flatten_node(
            find(WORKER_NODE_ROLE)?,
            &definitions.worker_node,
            prior.map(|p| &p.worker_node),
        ),
        zookeeper_node: flatten_node(
            find(ZOOKEEPER_NODE_ROLE)?,
            &definitions.zookeeper_node,
            prior.map(|p| &p.zookeeper_node),
        ),
    })
}

fn flatten_node(role: &Role, definition: &NodeDefinition, prior: Option<&Node>) -> Node {
    let linux = role
        .os_profile
        .as_ref()
        .and_then(|p| p.linux_operating_system_profile.as_ref());

    let remote_keys: Vec<String> = linux
        .and_then(|l| l.ssh_profile.as_ref())
        .map(|s| {
            s.public_keys
                .iter()
                .filter_map(|k| k.certificate_data.clone())
                .collect()
        })
        .unwrap_or_default();
    let ssh_keys = if remote_keys.is_empty() {
        prior.map(|p| p.ssh_keys.clone()).unwrap_or_default()
    } else {
        remote_keys
    };

    let script_actions = match &role.script_actions {
        Some(actions) if !actions.is_empty() => actions
            .iter()
            .map(|a| ScriptAction {
                name: a.name.clone(),
                uri: a.uri.clone(),
                parameters: Some(a.parameters.clone()).filter(|p| !p.is_empty()),
            })
            .collect(),
        _ => prior.map(|p| p.script_actions.clone()).unwrap_or_default(),
    };

    let vnet = role.virtual_network_profile.as_ref();

    Node {
        vm_size: role
            .hardware_profile
            .as_ref()
            .and_then(|h| h.vm_size.clone())
            .unwrap_or_default(),
        username: linux.and_then(|l| l.username.clone()).unwrap_or_default(),
        password: prior.and_then(|p| p.password.clone()),
        ssh_keys,
        subnet_id: vnet.and_then(|v| v.subnet.clone()),
        virtual_network_id: vnet.and_then(|v| v.id.clone()),
        script_actions,
        target_instance_count: if definition.can_specify_instance_count {
            role.target_instance_count
        } else {
            None
        },
        number_of_disks_per_node: if definition.can_specify_disks {
            role.data_disks_groups
                .as_ref()
                .and_then(|groups| groups.first())
                .and_then(|g| g.disks_per_node)
        } else {
            None
        },
        autoscale: if definition.can_autoscale() {
            role.autoscale.as_ref().and_then(flatten_autoscale)
        } else {
            None
        },
    }
}

fn flatten_autoscale(input: &WireAutoscale) -> Option<NodeAutoscale> {
    let capacity = input.capacity.as_ref().map(|c| AutoscaleCapacity {
        min_instance_count: c.min_instance_count.unwrap_or_default(),
        max_instance_count: c.max_instance_count.unwrap_or_default(),
    });
    let recurrence = input.recurrence.as_ref().map(|r| AutoscaleRecurrence {
        timezone: r.time_zone.clone().unwrap_or_default(),
        schedule: r
            .schedule
            .iter()
            .flatten()
            .map(|s| {
                let tc = s.time_and_capacity.clone().unwrap_or_default();
                AutoscaleSchedule {
                    days: s.days.clone().unwrap_or_default(),
                    time: tc.time.unwrap_or_default(),
                    target_instance_count: tc
                        .max_instance_count
                        .or(tc.min_instance_count)
                        .unwrap_or_default(),
                }
            })
            .collect(),
    });
    if capacity.is_none() && recurrence.is_none() {
        None
    } else {
        Some(NodeAutoscale {
            capacity,
            recurrence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(target: Option<i64>) -> Node {
        Node {
            vm_size: "Standard_D13_V2".to_string(),
            username: "sshuser".to_string(),
            password: Some("Sup3rS3cret!".to_string()),
            target_instance_count: target,
            ..Default::default()
        }
    }

    fn roles(worker_count: i64) -> Roles {
        Roles {
            head_node: node(None),
            worker_node: node(Some(worker_count)),
            zookeeper_node: node(None),
        }
    }

    fn worker(expanded: &[Role]) -> &Role {
        expanded.iter().find(|r| r.name == WORKER_NODE_ROLE).unwrap()
    }

    #[test]
    fn fixed_roles_get_fixed_counts() {
        let expanded = expand_roles(&roles(3), &SPARK_ROLES).unwrap();
        let names: Vec<&str> = expanded.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![HEAD_NODE_ROLE, WORKER_NODE_ROLE, ZOOKEEPER_NODE_ROLE]);
        assert_eq!(expanded[0].target_instance_count, Some(2));
        assert_eq!(expanded[2].target_instance_count, Some(3));
        assert_eq!(worker(&expanded).target_instance_count, Some(3));
        assert_eq!(worker(&expanded).min_instance_count, None);
    }

    #[test]
    fn worker_below_minimum_is_rejected() {
        let err = expand_roles(&roles(0), &SPARK_ROLES).unwrap_err();
        assert!(err.message.contains("roles.worker_node"));
        assert!(err.message.contains("at least 1"));
    }

    #[test]
    fn worker_count_is_required() {
        let mut roles = roles(1);
        roles.worker_node.target_instance_count = None;
        assert!(expand_roles(&roles, &SPARK_ROLES).is_err());
    }

    #[test]
    fn fixed_counts_cannot_change() {
        let mut bad_head = roles(3);
        bad_head.head_node.target_instance_count = Some(3);
        assert!(expand_roles(&bad_head, &SPARK_ROLES).is_err());

        let mut bad_zookeeper = roles(3);
        bad_zookeeper.zookeeper_node.target_instance_count = Some(5);
        let err = expand_roles(&bad_zookeeper, &SPARK_ROLES).unwrap_err();
        assert!(err.message.contains("roles.zookeeper_node"));

        let mut matching = roles(3);
        matching.head_node.target_instance_count = Some(2);
        matching.zookeeper_node.target_instance_count = Some(3);
        assert!(expand_roles(&matching, &SPARK_ROLES).is_ok());
    }

    #[test]
    fn password_and_ssh_keys_are_exclusive() {
        let mut both = roles(2);
        both.head_node.ssh_keys = vec!["ssh-rsa AAAA".to_string()];
        assert!(expand_roles(&both, &SPARK_ROLES).is_err());

        let mut neither = roles(2);
        neither.head_node.password = None;
        assert!(expand_roles(&neither, &SPARK_ROLES).is_err());

        let mut keys_only = roles(2);
        keys_only.head_node.password = None;
        keys_only.head_node.ssh_keys = vec!["ssh-rsa AAAA".to_string()];
        let expanded = expand_roles(&keys_only, &SPARK_ROLES).unwrap();
        let linux = expanded[0]
            .os_profile
            .as_ref()
            .and_then(|p| p.linux_operating_system_profile.as_ref())
            .unwrap();
        assert_eq!(linux.password, None);
        assert_eq!(linux.ssh_profile.as_ref().unwrap().public_keys.len(), 1);
    }

    #[test]
    fn virtual_network_needs_both_ids() {
        let mut roles = roles(2);
        roles.worker_node.subnet_id = Some("/subnets/hdi".to_string());
        assert!(expand_roles(&roles, &SPARK_ROLES).is_err());
        roles.worker_node.virtual_network_id = Some("/vnets/hdi".to_string());
        assert!(expand_roles(&roles, &SPARK_ROLES).is_ok());
    }

    #[test]
    fn data_disks_are_not_supported_for_spark() {
        let mut roles = roles(2);
        roles.worker_node.number_of_disks_per_node = Some(2);
        assert!(expand_roles(&roles, &SPARK_ROLES).is_err());
    }

    #[test]
    fn autoscale_capacity_on_worker() {
        let mut roles = roles(2);
        roles.worker_node.autoscale = Some(NodeAutoscale {
            capacity: Some(AutoscaleCapacity {
                min_instance_count: 2,
                max_instance_count: 6,
            }),
            recurrence: None,
        });
        let expanded = expand_roles(&roles, &SPARK_ROLES).unwrap();
        let capacity = worker(&expanded)
            .autoscale
            .as_ref()
            .and_then(|a| a.capacity.as_ref())
            .unwrap();
        assert_eq!(capacity.max_instance_count, Some(6));

        roles.worker_node.autoscale = Some(NodeAutoscale {
            capacity: Some(AutoscaleCapacity {
                min_instance_count: 6,
                max_instance_count: 2,
            }),
            recurrence: None,
        });
        assert!(expand_roles(&roles, &SPARK_ROLES).is_err());
    }

    #[test]
    fn autoscale_on_head_is_rejected() {
        let mut roles = roles(2);
        roles.head_node.autoscale = Some(NodeAutoscale {
            capacity: Some(AutoscaleCapacity {
                min_instance_count: 2,
                max_instance_count: 2,
            }),
            recurrence: None,
        });
        assert!(expand_roles(&roles, &SPARK_ROLES).is_err());
    }

    #[test]
    fn round_trip_with_recurrence() {
        let mut original = roles(4);
        original.worker_node.password = None;
        original.worker_node.ssh_keys = vec!["ssh-rsa AAAA".to_string()];
        original.worker_node.script_actions = vec![ScriptAction {
            name: "install-libs".to_string(),
            uri: "https://scripts.example.net/install.sh".to_string(),
            parameters: None,
        }];
        original.worker_node.autoscale = Some(NodeAutoscale {
            capacity: None,
            recurrence: Some(AutoscaleRecurrence {
                timezone: "Pacific Standard Time".to_string(),
                schedule: vec![AutoscaleSchedule {
                    days: vec!["Monday".to_string(), "Friday".to_string()],
                    time: "09:00".to_string(),
                    target_instance_count: 8,
                }],
            }),
        });

        let mut expanded = expand_roles(&original, &SPARK_ROLES).unwrap();
        for role in &mut expanded {
            // the API never echoes passwords
            if let Some(linux) = role
                .os_profile
                .as_mut()
                .and_then(|p| p.linux_operating_system_profile.as_mut())
            {
                linux.password = None;
            }
        }
        let profile = ComputeProfile { roles: expanded };

        let flattened = flatten_roles(Some(&profile), &SPARK_ROLES, Some(&original)).unwrap();
        assert_eq!(flattened, original);
    }

    #[test]
    fn flatten_requires_all_roles() {
        let profile = ComputeProfile {
            roles: vec![Role {
                name: WORKER_NODE_ROLE.to_string(),
                ..Default::default()
            }],
        };
        assert_eq!(flatten_roles(Some(&profile), &SPARK_ROLES, None), None);
        assert_eq!(flatten_roles(None, &SPARK_ROLES, None), None);
    }

    #[test]
    fn attrs_round_trip() {
        let original = roles(3);
        let attrs = original.to_attrs();
        let parsed = Roles::from_attrs(&crate::attrs::Attrs::root(&attrs)).unwrap();
        assert_eq!(parsed, original);
    }
}
