// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    identity::ServiceAccount,
    inventory::{Action, ServiceIdentity, ServiceRole},
};

/// Config is the model of the dbsetup configuration file: the state an instance should be in,
/// and the host-side details of how to get it there.
///
/// The file is deserialized into a Config object. The desired half is handed to the
/// reconciliation engine unchanged; the host half selects the collaborators the CLI wires up.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Config {
    pub desired: DesiredConfiguration,
    #[serde(default)]
    pub host: HostConfig,
}

impl Config {
    /// Read and validate the configuration file at `path`.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("could not open config file '{path}': {e}")))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).map_err(|e| Error::config(e.to_string()))?;
        config.desired.validate()?;
        Ok(config)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityMode {
    #[default]
    Windows,
    /// Mixed mode: Windows authentication plus SQL logins, which requires an SA password.
    Sql,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupType {
    Automatic,
    Manual,
    Disabled,
}

impl std::fmt::Display for StartupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                StartupType::Automatic => "Automatic",
                StartupType::Manual => "Manual",
                StartupType::Disabled => "Disabled",
            }
        )
    }
}

/// The declared state of one instance.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct DesiredConfiguration {
    pub action: Action,
    pub instance_name: String,
    pub instance_id: Option<String>,
    /// Major version of the installation media.
    pub product_version: u32,
    pub features: Vec<String>,

    pub product_key: Option<String>,
    pub update_enabled: Option<bool>,
    pub update_source: Option<String>,
    pub install_shared_dir: Option<String>,
    pub install_shared_wow_dir: Option<String>,
    pub instance_dir: Option<String>,

    /// Unset means the installer's default is kept.
    pub browser_startup_type: Option<StartupType>,

    pub engine: EngineSettings,
    pub analysis: AnalysisSettings,
    pub service_accounts: ServiceAccounts,
    pub cluster: ClusterSettings,

    pub suppress_reboot: bool,
    pub force_reboot: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct EngineSettings {
    pub security_mode: SecurityMode,
    pub sa_password: Option<String>,
    pub collation: Option<String>,
    /// Added to the identity running setup, which is always an administrator.
    pub sysadmin_accounts: Vec<String>,
    pub data_dir: Option<String>,
    pub user_db_dir: Option<String>,
    pub user_db_log_dir: Option<String>,
    pub temp_db_dir: Option<String>,
    pub temp_db_log_dir: Option<String>,
    pub backup_dir: Option<String>,
}

impl EngineSettings {
    /// The declared directories, keyed by installer parameter.
    pub fn directories(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("INSTALLSQLDATADIR", self.data_dir.as_deref()),
            ("SQLUSERDBDIR", self.user_db_dir.as_deref()),
            ("SQLUSERDBLOGDIR", self.user_db_log_dir.as_deref()),
            ("SQLTEMPDBDIR", self.temp_db_dir.as_deref()),
            ("SQLTEMPDBLOGDIR", self.temp_db_log_dir.as_deref()),
            ("SQLBACKUPDIR", self.backup_dir.as_deref()),
        ]
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct AnalysisSettings {
    pub collation: Option<String>,
    /// `MULTIDIMENSIONAL`, `TABULAR` or `POWERPIVOT`.
    pub server_mode: Option<String>,
    pub sysadmin_accounts: Vec<String>,
    pub data_dir: Option<String>,
    pub log_dir: Option<String>,
    pub backup_dir: Option<String>,
    pub temp_dir: Option<String>,
    pub config_dir: Option<String>,
}

impl AnalysisSettings {
    pub fn directories(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("ASDATADIR", self.data_dir.as_deref()),
            ("ASLOGDIR", self.log_dir.as_deref()),
            ("ASBACKUPDIR", self.backup_dir.as_deref()),
            ("ASTEMPDIR", self.temp_dir.as_deref()),
            ("ASCONFIGDIR", self.config_dir.as_deref()),
        ]
    }
}

/// The identity each service runs as. A service left unset keeps the installer's default.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ServiceAccounts {
    pub sql: Option<ServiceIdentity>,
    pub agent: Option<ServiceIdentity>,
    pub fulltext: Option<ServiceIdentity>,
    pub reporting: Option<ServiceIdentity>,
    pub analysis: Option<ServiceIdentity>,
    pub integration: Option<ServiceIdentity>,
}

impl ServiceAccounts {
    pub fn get(&self, role: ServiceRole) -> Option<&ServiceIdentity> {
        match role {
            ServiceRole::Sql => self.sql.as_ref(),
            ServiceRole::Agent => self.agent.as_ref(),
            ServiceRole::FullText => self.fulltext.as_ref(),
            ServiceRole::Reporting => self.reporting.as_ref(),
            ServiceRole::Analysis => self.analysis.as_ref(),
            ServiceRole::Integration => self.integration.as_ref(),
        }
    }
}

/// Failover cluster settings. Ignored for a plain install.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ClusterSettings {
    pub group_name: Option<String>,
    /// Empty means the installer picks the address assignment.
    pub ip_addresses: Vec<Ipv4Addr>,
    pub network_name: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// The installer's command line has no escape for a double quote, so no value may contain one.
/// Returns the dotted path of the first offending setting.
fn find_quote(value: &toml::Value, path: &str) -> Option<String> {
    match value {
        toml::Value::String(s) if s.contains('"') => Some(path.to_string()),
        toml::Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, item)| find_quote(item, &format!("{path}[{i}]"))),
        toml::Value::Table(table) => table.iter().find_map(|(key, item)| {
            let path = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            find_quote(item, &path)
        }),
        _ => None,
    }
}

impl DesiredConfiguration {
    /// Reject combinations the installer would refuse, before anything is probed or run.
    pub fn validate(&self) -> Result<()> {
        if self.instance_name.trim().is_empty() {
            return Err(Error::config("instance_name must not be empty"));
        }

        if self.product_version == 0 {
            return Err(Error::config("product_version must be set"));
        }

        if self.engine.security_mode == SecurityMode::Sql && is_blank(&self.engine.sa_password) {
            return Err(Error::config(
                "security_mode 'Sql' requires engine.sa_password",
            ));
        }

        if self.action.is_cluster_action()
            && self.action != Action::PrepareFailoverCluster
            && is_blank(&self.cluster.group_name)
        {
            return Err(Error::config(format!(
                "action '{}' requires cluster.group_name",
                self.action
            )));
        }

        if self.action.maps_storage() && is_blank(&self.cluster.network_name) {
            return Err(Error::config(format!(
                "action '{}' requires cluster.network_name",
                self.action
            )));
        }

        for role in ServiceRole::ALL {
            let Some(identity) = self.service_accounts.get(role) else {
                continue;
            };
            if let ServiceAccount::Credential { username, password } =
                ServiceAccount::classify(identity)
            {
                if password.is_empty() {
                    return Err(Error::config(format!(
                        "service account '{username}' for {} requires a password",
                        role.tag()
                    )));
                }
            }
        }

        let settings = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        if let Some(path) = find_quote(&settings, "") {
            return Err(Error::config(format!(
                "{path} must not contain a double quote"
            )));
        }

        Ok(())
    }
}

/// Where the host-side collaborators live.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HostConfig {
    /// Directory holding the installation media.
    pub media_path: String,
    /// Installer executable, relative to `media_path` unless absolute.
    pub installer: String,
    /// Command that prints the current state of an instance as TOML.
    pub probe_command: Option<String>,
    /// Snapshot of the failover cluster's disks and networks.
    pub topology: Option<String>,
    /// Path whose presence signals that pending file operations need a reboot.
    pub reboot_marker: Option<String>,
    /// Name of this cluster node. Defaults to the host name.
    pub node_name: Option<String>,
    pub setup_timeout_secs: u64,
    pub lock_dir: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            media_path: ".".to_string(),
            installer: crate::default_installer(),
            probe_command: None,
            topology: None,
            reboot_marker: None,
            node_name: None,
            setup_timeout_secs: 7200,
            lock_dir: None,
        }
    }
}

impl HostConfig {
    pub fn installer_path(&self) -> String {
        let installer = std::path::Path::new(&self.installer);
        if installer.is_absolute() {
            self.installer.clone()
        } else {
            std::path::Path::new(&self.media_path)
                .join(installer)
                .to_string_lossy()
                .into_owned()
        }
    }
}
