// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use crate::{
    commands::{Handle, HandledResult, EXIT_OK, EXIT_PARTIAL},
    config::Config,
    converge::{Convergence, Reconciler},
    host::InstanceLock,
};

pub fn reconcile(reconciler: &Reconciler, config: &Config) -> HandledResult<u8> {
    let desired = &config.desired;
    let lock_dir = match &config.host.lock_dir {
        Some(dir) => dir.clone(),
        None => crate::default_lock_dir(),
    };

    let _lock = InstanceLock::acquire(&lock_dir, &desired.instance_name)
        .handle_err(|e| eprintln!("Could not lock instance '{}': {e}", desired.instance_name))?;

    let result = reconciler
        .reconcile(desired)
        .handle_err(|e| eprintln!("{}: {e}", desired.instance_name))?;

    if let Some(invocation) = &result.invocation {
        println!("Ran installer: {invocation}");
    }
    if result.reboot_required {
        println!("{}: reboot required", desired.instance_name);
    }
    if result.reboot_suppressed {
        println!("{}: reboot required but suppressed", desired.instance_name);
    }

    match result.convergence {
        Convergence::Converged => {
            println!("{}: converged", desired.instance_name);
            Ok(EXIT_OK)
        }
        Convergence::PartiallyConverged => {
            println!("{}: partially converged", desired.instance_name);
            for mismatch in &result.cluster_mismatches {
                println!("  {mismatch}");
            }
            Ok(EXIT_PARTIAL)
        }
    }
}
