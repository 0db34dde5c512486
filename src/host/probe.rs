// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use std::process::Command;

use log::debug;

use crate::{
    error::ProbeError,
    inventory::{CurrentState, InventoryProbe},
};

/// Obtains the current state by running an external probe.
///
/// The probe is invoked as `<command> <instance name>` and prints the state as TOML on stdout.
/// Printing nothing means the instance is not installed.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    command: String,
}

impl CommandProbe {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

impl InventoryProbe for CommandProbe {
    fn probe(&self, instance_name: &str) -> Result<CurrentState, ProbeError> {
        debug!("running probe '{} {instance_name}'", self.command);
        let output = Command::new(&self.command)
            .arg(instance_name)
            .output()
            .map_err(|e| ProbeError::Failed(format!("could not run '{}': {e}", self.command)))?;

        if !output.status.success() {
            return Err(ProbeError::Failed(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Err(ProbeError::InstanceNotFound(instance_name.to_string()));
        }

        let mut state: CurrentState = toml::from_str(&stdout)
            .map_err(|e| ProbeError::Failed(format!("could not parse probe output: {e}")))?;
        if state.instance_name.is_empty() {
            state.instance_name = instance_name.to_string();
        }
        Ok(state)
    }
}
