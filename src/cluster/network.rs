// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use std::net::Ipv4Addr;

use crate::{
    error::{Error, Result},
    inventory::ClusterNetworkResource,
    network::is_address_in_network,
};

/// Tells the installer to choose the address assignment itself.
pub const DEFAULT_IP_ASSIGNMENT: &str = "DEFAULT";

fn format_assignment(address: Ipv4Addr, network: &ClusterNetworkResource) -> String {
    format!("IPv4;{address};{};{}", network.name, network.mask)
}

/// Assign each declared address to the client networks it falls within.
///
/// An address inside several networks yields one assignment per network. The result is in
/// declared-address order, then network order. Fails when fewer assignments than declared
/// addresses were produced; more is accepted.
pub fn map_cluster_addresses(
    declared: &[Ipv4Addr],
    networks: &[ClusterNetworkResource],
) -> Result<Vec<String>> {
    if declared.is_empty() {
        return Ok(vec![DEFAULT_IP_ASSIGNMENT.to_string()]);
    }

    let matched: Vec<String> = declared
        .iter()
        .flat_map(|address| {
            networks
                .iter()
                .filter(|network| is_address_in_network(*address, network.address, network.mask))
                .map(|network| format_assignment(*address, network))
        })
        .collect();

    if matched.len() < declared.len() {
        return Err(Error::ClusterIpAddressNotValid {
            declared: declared.to_vec(),
            matched,
        });
    }

    Ok(matched)
}
