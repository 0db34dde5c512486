// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! Mapping of declared cluster settings onto the resources the failover cluster actually has.

pub mod network;
pub mod storage;

use log::debug;

use crate::{
    config::DesiredConfiguration,
    error::Result,
    inventory::{ClusterInventory, NetworkRole},
};

pub use network::{map_cluster_addresses, DEFAULT_IP_ASSIGNMENT};
pub use storage::{drive_qualifier, map_cluster_disks, required_drives};

/// The cluster resources a pass will hand to the installer. A mapping that does not apply to the
/// action is left as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterMapping {
    pub disks: Option<Vec<String>>,
    pub ip_addresses: Option<Vec<String>>,
}

/// Resolve the declared storage paths and IP addresses of `desired` against the cluster, as seen
/// from `node_name`.
pub fn map_cluster_resources(
    desired: &DesiredConfiguration,
    inventory: &dyn ClusterInventory,
    node_name: &str,
) -> Result<ClusterMapping> {
    let mut mapping = ClusterMapping::default();

    if desired.action.maps_storage() {
        let paths = desired
            .engine
            .directories()
            .into_iter()
            .filter_map(|(_, path)| path);
        let required = required_drives(paths)?;
        let available = inventory.disk_resources(true)?;
        debug!(
            "mapping drives {:?} onto {} available cluster disk(s) for node {node_name}",
            required,
            available.len()
        );
        mapping.disks = Some(map_cluster_disks(&required, &available, node_name)?);
    }

    if desired.action.maps_network() {
        let networks = inventory.network_resources(NetworkRole::Client)?;
        debug!(
            "mapping {} declared address(es) onto {} client network(s)",
            desired.cluster.ip_addresses.len(),
            networks.len()
        );
        mapping.ip_addresses = Some(map_cluster_addresses(
            &desired.cluster.ip_addresses,
            &networks,
        )?);
    }

    Ok(mapping)
}
