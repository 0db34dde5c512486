// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! Subnet matching for IPv4 addresses.

use std::net::Ipv4Addr;

/// Returns true when `address` lies within the network described by `network` and `mask`.
///
/// Each operand is converted to its big-endian `u32` form, so the comparison is exact and works
/// for non-contiguous masks as well as ordinary prefix masks.
pub fn is_address_in_network(address: Ipv4Addr, network: Ipv4Addr, mask: Ipv4Addr) -> bool {
    let address = u32::from(address);
    let network = u32::from(network);
    let mask = u32::from(mask);

    (address & mask) == (network & mask)
}
