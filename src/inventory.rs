// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! The observed side of a reconciliation pass, and the narrow interfaces through which it is
//! obtained from the host.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    net::Ipv4Addr,
};

use serde::{Deserialize, Serialize};

use crate::error::{InstallerError, ProbeError, Result};

/// The installer action requested by the desired configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Install,
    InstallFailoverCluster,
    AddNode,
    PrepareFailoverCluster,
    CompleteFailoverCluster,
}

impl Action {
    /// Every action except a plain install touches the failover cluster.
    pub fn is_cluster_action(&self) -> bool {
        !matches!(self, Action::Install)
    }

    /// Actions that claim cluster disks for the instance's directories.
    pub fn maps_storage(&self) -> bool {
        matches!(
            self,
            Action::InstallFailoverCluster | Action::CompleteFailoverCluster
        )
    }

    /// Actions that assign client network addresses to the instance.
    pub fn maps_network(&self) -> bool {
        matches!(
            self,
            Action::InstallFailoverCluster | Action::CompleteFailoverCluster | Action::AddNode
        )
    }

    /// Actions after which the instance is expected to report its cluster group, network name
    /// and addresses. A prepared node has no cluster identity yet.
    pub fn checks_cluster_attributes(&self) -> bool {
        self.maps_network()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Action::Install => "Install",
                Action::InstallFailoverCluster => "InstallFailoverCluster",
                Action::AddNode => "AddNode",
                Action::PrepareFailoverCluster => "PrepareFailoverCluster",
                Action::CompleteFailoverCluster => "CompleteFailoverCluster",
            }
        )
    }
}

/// The services whose run-as identity can be chosen at install time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRole {
    Sql,
    Agent,
    FullText,
    Reporting,
    Analysis,
    Integration,
}

impl ServiceRole {
    pub const ALL: [ServiceRole; 6] = [
        ServiceRole::Sql,
        ServiceRole::Agent,
        ServiceRole::FullText,
        ServiceRole::Reporting,
        ServiceRole::Analysis,
        ServiceRole::Integration,
    ];

    /// The prefix the installer uses for this service's account parameters.
    pub fn tag(&self) -> &'static str {
        match self {
            ServiceRole::Sql => "SQL",
            ServiceRole::Agent => "AGT",
            ServiceRole::FullText => "FT",
            ServiceRole::Reporting => "RS",
            ServiceRole::Analysis => "AS",
            ServiceRole::Integration => "IS",
        }
    }

    /// The feature that installs this service.
    pub fn feature(&self) -> &'static str {
        use crate::feature::*;
        match self {
            ServiceRole::Sql | ServiceRole::Agent => ENGINE,
            ServiceRole::FullText => FULLTEXT,
            ServiceRole::Reporting => REPORTING,
            ServiceRole::Analysis => ANALYSIS,
            ServiceRole::Integration => INTEGRATION,
        }
    }
}

/// A credential a service runs as. The password is optional because virtual and managed
/// accounts have none.
#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceIdentity {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl ServiceIdentity {
    pub fn new(username: &str, password: Option<&str>) -> Self {
        Self {
            username: username.to_string(),
            password: password.map(|p| p.to_string()),
        }
    }
}

impl fmt::Debug for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceIdentity")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .finish()
    }
}

/// Snapshot of what is installed for an instance, as reported by the inventory probe.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CurrentState {
    pub instance_name: String,
    pub features: BTreeSet<String>,
    pub cluster_group_name: Option<String>,
    pub cluster_network_name: Option<String>,
    pub cluster_ip_addresses: Vec<Ipv4Addr>,
    /// Directory paths keyed by the installer parameter they correspond to
    /// (e.g. `INSTALLSQLDATADIR`).
    pub directories: BTreeMap<String, String>,
    /// The username each installed service runs as, keyed by service tag (e.g. `SQL`).
    pub service_accounts: BTreeMap<String, String>,
}

impl CurrentState {
    /// The state reported for an instance that has nothing installed.
    pub fn empty(instance_name: &str) -> Self {
        Self {
            instance_name: instance_name.to_string(),
            ..Default::default()
        }
    }
}

/// A failover-cluster disk that could back the instance's storage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClusterDiskResource {
    pub id: String,
    /// Nodes that are allowed to own the disk.
    pub owners: BTreeSet<String>,
    /// Mount points of the partitions the disk backs, e.g. `E:\`.
    pub partitions: BTreeSet<String>,
}

/// How a cluster network may be used. Ordered so that `>= Client` selects networks that can
/// carry client traffic.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum NetworkRole {
    None,
    Cluster,
    Client,
    ClusterAndClient,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClusterNetworkResource {
    pub name: String,
    pub address: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub role: NetworkRole,
}

/// Enumerates what is currently installed for an instance.
pub trait InventoryProbe {
    fn probe(&self, instance_name: &str) -> std::result::Result<CurrentState, ProbeError>;
}

/// Read-only queries of the failover cluster topology.
pub trait ClusterInventory {
    /// List the cluster disks. With `exclude_assigned`, disks that already belong to a cluster
    /// role are left out.
    fn disk_resources(&self, exclude_assigned: bool) -> Result<Vec<ClusterDiskResource>>;

    /// List the cluster networks whose role is at least `min_role`.
    fn network_resources(&self, min_role: NetworkRole) -> Result<Vec<ClusterNetworkResource>>;
}

/// What the installer process left behind once it exited.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallerOutput {
    pub exit_code: Option<i32>,
    pub output: String,
}

/// Runs the installer to completion. This is the only mutating operation of a pass.
pub trait Installer {
    fn run(
        &self,
        path: &str,
        arguments: &str,
    ) -> std::result::Result<InstallerOutput, InstallerError>;
}

/// The host-level indicator that pending operations need a reboot to complete.
pub trait RebootIndicator {
    fn is_reboot_pending(&self) -> bool;
}
