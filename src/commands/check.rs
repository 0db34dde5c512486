// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use crate::{
    commands::{Handle, HandledResult, EXIT_FAILED, EXIT_OK},
    config::DesiredConfiguration,
    converge::Reconciler,
};

pub fn test(reconciler: &Reconciler, desired: &DesiredConfiguration) -> HandledResult<u8> {
    let current = reconciler
        .inspect(desired)
        .handle_err(|e| eprintln!("Could not inspect instance: {e}"))?;
    let gaps = reconciler
        .gaps(desired, &current)
        .handle_err(|e| eprintln!("{e}"))?;

    if gaps.is_empty() {
        println!("{}: in desired state", desired.instance_name);
        return Ok(EXIT_OK);
    }

    for feature in &gaps.missing_features {
        println!("{}: feature {feature} is not installed", desired.instance_name);
    }
    for mismatch in &gaps.cluster_mismatches {
        println!("{}: {mismatch}", desired.instance_name);
    }

    Ok(EXIT_FAILED)
}
