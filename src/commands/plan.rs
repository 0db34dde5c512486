// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use crate::{
    commands::{Handle, HandledResult, EXIT_OK},
    config::DesiredConfiguration,
    converge::{Reconciler, Step},
};

pub fn plan(reconciler: &Reconciler, desired: &DesiredConfiguration) -> HandledResult<u8> {
    let current = reconciler
        .inspect(desired)
        .handle_err(|e| eprintln!("Could not inspect instance: {e}"))?;

    match reconciler
        .plan(desired, &current)
        .handle_err(|e| eprintln!("Could not plan installation: {e}"))?
    {
        Step::Done(convergence, mismatches) => {
            println!("Nothing to install ({convergence:?}).");
            for mismatch in mismatches {
                println!("  {mismatch}");
            }
        }
        Step::Install(plan) => println!("{}", plan.arguments.render_redacted()),
    }

    Ok(EXIT_OK)
}
