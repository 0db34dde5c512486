// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! In-memory stand-ins for the reconciliation collaborators, shared by the integration tests.
//!
//! Each fake records how it was used so that a test can assert not only on the outcome of a
//! pass, but also on which external operations it performed.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeSet, VecDeque},
    net::Ipv4Addr,
};

use crate::{
    config::DesiredConfiguration,
    converge::{DriverSettings, Reconciler},
    error::{InstallerError, ProbeError, Result},
    inventory::*,
};

pub const TEST_NODE: &str = "NODE1";
pub const TEST_SETUP_IDENTITY: &str = "CORP\\setupadmin";
pub const TEST_INSTALLER: &str = "D:\\setup.exe";

/// Given a relative `path` in the test directory, prepend the full path to the test directory.
pub fn test_path(path: &str) -> String {
    format!("{}/tests/{path}", env!("CARGO_MANIFEST_DIR"))
}

/// Answers probes from a queue of states. Each probe consumes one state until only the last is
/// left, which is then returned for every later probe. `None` means the instance is not found.
pub struct FakeProbe {
    states: RefCell<VecDeque<Option<CurrentState>>>,
    calls: Cell<usize>,
}

impl FakeProbe {
    pub fn new(state: Option<CurrentState>) -> Self {
        Self {
            states: RefCell::new(VecDeque::from([state])),
            calls: Cell::new(0),
        }
    }

    /// Queue the state reported after the ones already queued, e.g. after the installer ran.
    pub fn then(self, state: Option<CurrentState>) -> Self {
        self.states.borrow_mut().push_back(state);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl InventoryProbe for FakeProbe {
    fn probe(&self, instance_name: &str) -> std::result::Result<CurrentState, ProbeError> {
        self.calls.set(self.calls.get() + 1);
        let mut states = self.states.borrow_mut();
        let state = if states.len() > 1 {
            states.pop_front().flatten()
        } else {
            states.front().cloned().flatten()
        };
        state.ok_or_else(|| ProbeError::InstanceNotFound(instance_name.to_string()))
    }
}

/// A cluster with a fixed set of disks and networks.
#[derive(Default)]
pub struct FakeCluster {
    /// Each disk, and whether it is already assigned to a cluster role.
    pub disks: Vec<(ClusterDiskResource, bool)>,
    pub networks: Vec<ClusterNetworkResource>,
    queries: Cell<usize>,
}

impl FakeCluster {
    pub fn new(
        disks: Vec<(ClusterDiskResource, bool)>,
        networks: Vec<ClusterNetworkResource>,
    ) -> Self {
        Self {
            disks,
            networks,
            queries: Cell::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.get()
    }
}

impl ClusterInventory for FakeCluster {
    fn disk_resources(&self, exclude_assigned: bool) -> Result<Vec<ClusterDiskResource>> {
        self.queries.set(self.queries.get() + 1);
        Ok(self
            .disks
            .iter()
            .filter(|(_, assigned)| !(exclude_assigned && *assigned))
            .map(|(disk, _)| disk.clone())
            .collect())
    }

    fn network_resources(&self, min_role: NetworkRole) -> Result<Vec<ClusterNetworkResource>> {
        self.queries.set(self.queries.get() + 1);
        Ok(self
            .networks
            .iter()
            .filter(|network| network.role >= min_role)
            .cloned()
            .collect())
    }
}

/// Records every invocation and exits with a fixed code.
pub struct FakeInstaller {
    exit_code: Option<i32>,
    output: String,
    invocations: RefCell<Vec<(String, String)>>,
}

impl FakeInstaller {
    pub fn exiting_with(exit_code: Option<i32>) -> Self {
        Self {
            exit_code,
            output: String::new(),
            invocations: RefCell::new(Vec::new()),
        }
    }

    pub fn with_output(mut self, output: &str) -> Self {
        self.output = output.to_string();
        self
    }

    /// The `(path, arguments)` of every run, in order.
    pub fn invocations(&self) -> Vec<(String, String)> {
        self.invocations.borrow().clone()
    }
}

impl Installer for FakeInstaller {
    fn run(
        &self,
        path: &str,
        arguments: &str,
    ) -> std::result::Result<InstallerOutput, InstallerError> {
        self.invocations
            .borrow_mut()
            .push((path.to_string(), arguments.to_string()));
        Ok(InstallerOutput {
            exit_code: self.exit_code,
            output: self.output.clone(),
        })
    }
}

pub struct FakeReboot(pub bool);

impl RebootIndicator for FakeReboot {
    fn is_reboot_pending(&self) -> bool {
        self.0
    }
}

pub fn test_settings() -> DriverSettings {
    DriverSettings {
        installer_path: TEST_INSTALLER.to_string(),
        node_name: TEST_NODE.to_string(),
        setup_identity: TEST_SETUP_IDENTITY.to_string(),
    }
}

pub fn reconciler<'a>(
    probe: &'a FakeProbe,
    cluster: &'a FakeCluster,
    installer: &'a FakeInstaller,
    reboot: &'a FakeReboot,
) -> Reconciler<'a> {
    Reconciler::new(probe, cluster, installer, reboot, test_settings())
}

fn string_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn disk(id: &str, owners: &[&str], partitions: &[&str]) -> ClusterDiskResource {
    ClusterDiskResource {
        id: id.to_string(),
        owners: string_set(owners),
        partitions: string_set(partitions),
    }
}

pub fn network(name: &str, address: &str, mask: &str, role: NetworkRole) -> ClusterNetworkResource {
    ClusterNetworkResource {
        name: name.to_string(),
        address: address.parse().unwrap(),
        mask: mask.parse().unwrap(),
        role,
    }
}

pub fn installed(instance: &str, features: &[&str]) -> CurrentState {
    CurrentState {
        instance_name: instance.to_string(),
        features: string_set(features),
        ..Default::default()
    }
}

/// A clustered instance reporting the given group, network name and addresses.
pub fn installed_clustered(
    instance: &str,
    features: &[&str],
    group: &str,
    network_name: &str,
    addresses: &[Ipv4Addr],
) -> CurrentState {
    CurrentState {
        cluster_group_name: Some(group.to_string()),
        cluster_network_name: Some(network_name.to_string()),
        cluster_ip_addresses: addresses.to_vec(),
        ..installed(instance, features)
    }
}

/// A minimal standalone install of `features` on major version 15.
pub fn desired(features: &[&str]) -> DesiredConfiguration {
    DesiredConfiguration {
        instance_name: "MSSQLSERVER".to_string(),
        product_version: 15,
        features: features.iter().map(|f| f.to_string()).collect(),
        ..Default::default()
    }
}

/// A failover-cluster install of the engine with data on `E:` and logs on `F:`.
pub fn desired_cluster(action: Action, addresses: &[&str]) -> DesiredConfiguration {
    let mut desired = desired(&["SQLENGINE"]);
    desired.action = action;
    desired.engine.data_dir = Some("E:\\MSSQL\\Data\\".to_string());
    desired.engine.user_db_log_dir = Some("F:\\MSSQL\\Log".to_string());
    desired.cluster.group_name = Some("SQL Server (MSSQLSERVER)".to_string());
    desired.cluster.network_name = Some("SQLCLU01".to_string());
    desired.cluster.ip_addresses = addresses.iter().map(|a| a.parse().unwrap()).collect();
    desired
}
