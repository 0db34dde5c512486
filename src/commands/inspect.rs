// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use crate::{
    commands::{Handle, HandledResult, EXIT_OK},
    config::DesiredConfiguration,
    converge::Reconciler,
};

pub fn inspect(reconciler: &Reconciler, desired: &DesiredConfiguration) -> HandledResult<u8> {
    let state = reconciler
        .inspect(desired)
        .handle_err(|e| eprintln!("Could not inspect instance: {e}"))?;

    let toml = toml::to_string_pretty(&state)
        .handle_err(|e| eprintln!("Could not format current state: {e}"))?;
    print!("{toml}");

    Ok(EXIT_OK)
}
