// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use std::collections::BTreeSet;

use crate::{
    error::{Error, Result},
    inventory::ClusterDiskResource,
};

/// The drive qualifier of a path, e.g. `E:` for `e:\Data`. Returns `None` when the path does not
/// start with one.
pub fn drive_qualifier(path: &str) -> Option<String> {
    let path = path.trim();
    let (drive, _) = path.split_once(':')?;
    if drive.is_empty() || drive.contains(|c| c == '\\' || c == '/') {
        return None;
    }
    Some(format!("{}:", drive.to_uppercase()))
}

/// The deduplicated set of drives that the non-empty `paths` live on.
pub fn required_drives<'a, I>(paths: I) -> Result<BTreeSet<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    paths
        .into_iter()
        .filter(|path| !path.trim().is_empty())
        .map(|path| {
            drive_qualifier(path).ok_or_else(|| Error::UnqualifiedClusterPath {
                path: path.to_string(),
            })
        })
        .collect()
}

/// Select the cluster disks that back the `required` drives and may be owned by `node_name`.
///
/// `available` should already exclude disks assigned to a cluster role. Every required drive
/// must resolve to exactly one disk; anything else fails with the partial mapping.
pub fn map_cluster_disks(
    required: &BTreeSet<String>,
    available: &[ClusterDiskResource],
    node_name: &str,
) -> Result<Vec<String>> {
    let mapped: BTreeSet<String> = available
        .iter()
        .filter(|disk| {
            disk.owners
                .iter()
                .any(|owner| owner.eq_ignore_ascii_case(node_name))
        })
        .filter(|disk| {
            disk.partitions
                .iter()
                .filter_map(|partition| drive_qualifier(partition))
                .any(|drive| required.contains(&drive))
        })
        .map(|disk| disk.id.clone())
        .collect();

    if mapped.len() != required.len() {
        return Err(Error::ClusterDiskMapping {
            required: required.iter().cloned().collect(),
            mapped: mapped.into_iter().collect(),
        });
    }

    Ok(mapped.into_iter().collect())
}
