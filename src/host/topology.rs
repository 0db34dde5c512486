// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! A snapshot of the failover cluster's disks and networks, written by whatever enumerates the
//! cluster on this host.
//!
//! ```toml
//! [[disks]]
//! id = "Cluster Disk 1"
//! owners = ["NODE1", "NODE2"]
//! partitions = ["E:\\"]
//!
//! [[networks]]
//! name = "Client Network"
//! network = "10.0.0.0/24"
//! role = "cluster_and_client"
//! ```

use std::{net::Ipv4Addr, str::FromStr};

use cidr::Ipv4Inet;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    inventory::{ClusterDiskResource, ClusterInventory, ClusterNetworkResource, NetworkRole},
};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DiskEntry {
    #[serde(flatten)]
    pub resource: ClusterDiskResource,
    /// Already belongs to a cluster role.
    #[serde(default)]
    pub assigned: bool,
}

/// A network given either as `network = "a.b.c.d/len"` or as separate `address` and `mask`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NetworkEntry {
    pub name: String,
    pub network: Option<String>,
    pub address: Option<Ipv4Addr>,
    pub mask: Option<Ipv4Addr>,
    pub role: NetworkRole,
}

impl NetworkEntry {
    fn resource(&self) -> Result<ClusterNetworkResource> {
        let (address, mask) = match (&self.network, self.address, self.mask) {
            (Some(network), _, _) => {
                let inet = Ipv4Inet::from_str(network).map_err(|e| {
                    Error::cluster_inventory(format!(
                        "network '{}' has invalid address '{network}': {e}",
                        self.name
                    ))
                })?;
                (inet.first_address(), inet.mask())
            }
            (None, Some(address), Some(mask)) => (address, mask),
            _ => {
                return Err(Error::cluster_inventory(format!(
                    "network '{}' needs either 'network' or both 'address' and 'mask'",
                    self.name
                )))
            }
        };

        Ok(ClusterNetworkResource {
            name: self.name.clone(),
            address,
            mask,
            role: self.role,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TopologyFile {
    #[serde(default)]
    pub disks: Vec<DiskEntry>,
    #[serde(default)]
    pub networks: Vec<NetworkEntry>,
}

impl TopologyFile {
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::cluster_inventory(format!("could not open topology file '{path}': {e}"))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::cluster_inventory(e.to_string()))
    }
}

impl ClusterInventory for TopologyFile {
    fn disk_resources(&self, exclude_assigned: bool) -> Result<Vec<ClusterDiskResource>> {
        Ok(self
            .disks
            .iter()
            .filter(|disk| !(exclude_assigned && disk.assigned))
            .map(|disk| disk.resource.clone())
            .collect())
    }

    fn network_resources(&self, min_role: NetworkRole) -> Result<Vec<ClusterNetworkResource>> {
        self.networks
            .iter()
            .filter(|network| network.role >= min_role)
            .map(|network| network.resource())
            .collect()
    }
}
