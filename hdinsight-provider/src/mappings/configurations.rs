//! `gateway` and `metastores` blocks
//!
//! Both end up in the cluster definition's configuration sections: the
//! gateway credentials under `gateway`, each external metastore under its
//! own `*-site`/`*-env`/`ambari-conf` sections.

use std::collections::{BTreeMap, HashMap};

use hdinsight_core::provider::{ProviderError, ProviderResult};
use hdinsight_core::resource::Value;

use crate::attrs::{AttrSource, AttrsBuilder};
use crate::models::{Configurations, UpdateGatewaySettingsParameters};

pub const GATEWAY_SECTION: &str = "gateway";
const GATEWAY_ENABLED: &str = "restAuthCredential.isEnabled";
const GATEWAY_USERNAME: &str = "restAuthCredential.username";
const GATEWAY_PASSWORD: &str = "restAuthCredential.password";

const HIVE_SITE: &str = "hive-site";
const HIVE_ENV: &str = "hive-env";
const OOZIE_SITE: &str = "oozie-site";
const OOZIE_ENV: &str = "oozie-env";
const AMBARI_CONF: &str = "ambari-conf";

const SQL_SERVER_DRIVER: &str = "com.microsoft.sqlserver.jdbc.SQLServerDriver";
const EXISTING_DATABASE: &str = "Existing MSSQL Server database with SQL authentication";

fn jdbc_url(server: &str, database: &str) -> String {
    format!(
        "jdbc:sqlserver://{};database={};encrypt=true;trustServerCertificate=true;create=false;loginTimeout=300",
        server, database
    )
}

fn section(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// Gateway
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gateway {
    pub username: String,
    pub password: String,
}

impl Gateway {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            username: block.required_string("username")?,
            password: block.required_string("password")?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .string("username", &self.username)
            .string("password", &self.password)
            .build()
    }

    pub fn expand(&self) -> Configurations {
        Configurations::from([(
            GATEWAY_SECTION.to_string(),
            section(&[
                (GATEWAY_ENABLED, "true"),
                (GATEWAY_USERNAME, self.username.as_str()),
                (GATEWAY_PASSWORD, self.password.as_str()),
            ]),
        )])
    }

    pub fn expand_update(&self) -> UpdateGatewaySettingsParameters {
        UpdateGatewaySettingsParameters {
            is_credential_enabled: true,
            user_name: self.username.clone(),
            password: self.password.clone(),
        }
    }

    /// The password is taken from the response when present, from `prior`
    /// otherwise.
    pub fn flatten(section: &BTreeMap<String, String>, prior: Option<&Gateway>) -> Self {
        let password = section
            .get(GATEWAY_PASSWORD)
            .cloned()
            .or_else(|| prior.map(|p| p.password.clone()))
            .unwrap_or_default();
        Self {
            username: section.get(GATEWAY_USERNAME).cloned().unwrap_or_default(),
            password,
        }
    }
}

// =============================================================================
// Metastores
// =============================================================================

/// Connection settings of one external SQL metastore
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metastore {
    pub server: String,
    pub database_name: String,
    pub username: String,
    pub password: String,
}

impl Metastore {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            server: block.required_string("server")?,
            database_name: block.required_string("database_name")?,
            username: block.required_string("username")?,
            password: block.required_string("password")?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .string("server", &self.server)
            .string("database_name", &self.database_name)
            .string("username", &self.username)
            .string("password", &self.password)
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metastores {
    pub hive: Option<Metastore>,
    pub oozie: Option<Metastore>,
    pub ambari: Option<Metastore>,
}

impl Metastores {
    pub fn from_attrs<'a>(block: &impl AttrSource<'a>) -> ProviderResult<Self> {
        Ok(Self {
            hive: block.block("hive")?.map(|b| Metastore::from_attrs(&b)).transpose()?,
            oozie: block.block("oozie")?.map(|b| Metastore::from_attrs(&b)).transpose()?,
            ambari: block.block("ambari")?.map(|b| Metastore::from_attrs(&b)).transpose()?,
        })
    }

    pub fn to_attrs(&self) -> HashMap<String, Value> {
        AttrsBuilder::new()
            .opt_block("hive", self.hive.as_ref().map(Metastore::to_attrs))
            .opt_block("oozie", self.oozie.as_ref().map(Metastore::to_attrs))
            .opt_block("ambari", self.ambari.as_ref().map(Metastore::to_attrs))
            .build()
    }

    pub fn is_empty(&self) -> bool {
        self.hive.is_none() && self.oozie.is_none() && self.ambari.is_none()
    }

    pub fn expand(&self) -> Configurations {
        let mut configurations = Configurations::new();

        if let Some(hive) = &self.hive {
            configurations.insert(
                HIVE_SITE.to_string(),
                section(&[
                    ("javax.jdo.option.ConnectionDriverName", SQL_SERVER_DRIVER),
                    (
                        "javax.jdo.option.ConnectionURL",
                        jdbc_url(&hive.server, &hive.database_name).as_str(),
                    ),
                    ("javax.jdo.option.ConnectionUserName", hive.username.as_str()),
                    ("javax.jdo.option.ConnectionPassword", hive.password.as_str()),
                ]),
            );
            configurations.insert(
                HIVE_ENV.to_string(),
                section(&[
                    ("hive_database", EXISTING_DATABASE),
                    ("hive_database_name", hive.database_name.as_str()),
                    ("hive_database_type", "mssql"),
                    ("hive_existing_mssql_server_database", hive.database_name.as_str()),
                    ("hive_existing_mssql_server_host", hive.server.as_str()),
                    ("hive_hostname", hive.server.as_str()),
                ]),
            );
        }

        if let Some(oozie) = &self.oozie {
            configurations.insert(
                OOZIE_SITE.to_string(),
                section(&[
                    ("oozie.service.JPAService.jdbc.driver", SQL_SERVER_DRIVER),
                    (
                        "oozie.service.JPAService.jdbc.url",
                        jdbc_url(&oozie.server, &oozie.database_name).as_str(),
                    ),
                    ("oozie.service.JPAService.jdbc.username", oozie.username.as_str()),
                    ("oozie.service.JPAService.jdbc.password", oozie.password.as_str()),
                    ("oozie.db.schema.name", "oozie"),
                ]),
            );
            configurations.insert(
                OOZIE_ENV.to_string(),
                section(&[
                    ("oozie_database", EXISTING_DATABASE),
                    ("oozie_database_name", oozie.database_name.as_str()),
                    ("oozie_database_type", "mssql"),
                    ("oozie_existing_mssql_server_database", oozie.database_name.as_str()),
                    ("oozie_existing_mssql_server_host", oozie.server.as_str()),
                    ("oozie_hostname", oozie.server.as_str()),
                ]),
            );
        }

        if let Some(ambari) = &self.ambari {
            configurations.insert(
                AMBARI_CONF.to_string(),
                section(&[
                    ("database-server", ambari.server.as_str()),
                    ("database-name", ambari.database_name.as_str()),
                    ("database-user-name", ambari.username.as_str()),
                    ("database-user-password", ambari.password.as_str()),
                ]),
            );
        }

        configurations
    }

    /// Passwords come from the response when present, from `prior` otherwise.
    /// Returns `None` when no metastore section is configured.
    pub fn flatten(configurations: &Configurations, prior: Option<&Metastores>) -> Option<Self> {
        let password = |found: Option<&String>, prior: Option<&Metastore>| {
            found
                .cloned()
                .or_else(|| prior.map(|p| p.password.clone()))
                .unwrap_or_default()
        };

        let hive = match (configurations.get(HIVE_SITE), configurations.get(HIVE_ENV)) {
            (Some(site), Some(env)) => Some(Metastore {
                server: env.get("hive_hostname").cloned().unwrap_or_default(),
                database_name: env.get("hive_database_name").cloned().unwrap_or_default(),
                username: site
                    .get("javax.jdo.option.ConnectionUserName")
                    .cloned()
                    .unwrap_or_default(),
                password: password(
                    site.get("javax.jdo.option.ConnectionPassword"),
                    prior.and_then(|p| p.hive.as_ref()),
                ),
            }),
            _ => None,
        };

        let oozie = match (configurations.get(OOZIE_SITE), configurations.get(OOZIE_ENV)) {
            (Some(site), Some(env)) => Some(Metastore {
                server: env.get("oozie_hostname").cloned().unwrap_or_default(),
                database_name: env.get("oozie_database_name").cloned().unwrap_or_default(),
                username: site
                    .get("oozie.service.JPAService.jdbc.username")
                    .cloned()
                    .unwrap_or_default(),
                password: password(
                    site.get("oozie.service.JPAService.jdbc.password"),
                    prior.and_then(|p| p.oozie.as_ref()),
                ),
            }),
            _ => None,
        };

        let ambari = configurations.get(AMBARI_CONF).map(|conf| Metastore {
            server: conf.get("database-server").cloned().unwrap_or_default(),
            database_name: conf.get("database-name").cloned().unwrap_or_default(),
            username: conf.get("database-user-name").cloned().unwrap_or_default(),
            password: password(
                conf.get("database-user-password"),
                prior.and_then(|p| p.ambari.as_ref()),
            ),
        });

        let metastores = Self { hive, oozie, ambari };
        (!metastores.is_empty()).then_some(metastores)
    }
}

/// Union of independently produced configuration mappings. Each input owns
/// distinct sections; a section produced twice is an error.
pub fn merge_configurations(
    base: Configurations,
    extra: Configurations,
) -> ProviderResult<Configurations> {
    let mut merged = base;
    for (section, values) in extra {
        if merged.contains_key(&section) {
            return Err(ProviderError::validation(format!(
                "configuration section {:?} is produced by more than one block",
                section
            )));
        }
        merged.insert(section, values);
    }
    Ok(merged)
}
