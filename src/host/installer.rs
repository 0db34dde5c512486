// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use std::{process::Stdio, time::Duration};

use log::debug;

use crate::{
    error::InstallerError,
    inventory::{Installer, InstallerOutput},
};

/// Runs the installer as a child process and waits for it, up to a timeout.
#[derive(Debug, Clone)]
pub struct ProcessInstaller {
    timeout: Duration,
}

impl ProcessInstaller {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run_child(
        &self,
        path: &str,
        arguments: &str,
    ) -> Result<InstallerOutput, InstallerError> {
        let mut command = tokio::process::Command::new(path);
        add_arguments(&mut command, arguments);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|err| InstallerError::Spawn {
            path: path.to_string(),
            err,
        })?;
        debug!("installer started with pid {:?}", child.id());

        // On timeout the child is dropped, which kills it.
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                Ok(InstallerOutput {
                    exit_code: output.status.code(),
                    output: text,
                })
            }
            Ok(Err(err)) => Err(InstallerError::Spawn {
                path: path.to_string(),
                err,
            }),
            Err(_) => Err(InstallerError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

impl Installer for ProcessInstaller {
    fn run(&self, path: &str, arguments: &str) -> Result<InstallerOutput, InstallerError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| InstallerError::Spawn {
                path: path.to_string(),
                err,
            })?;

        rt.block_on(self.run_child(path, arguments))
    }
}

/// The installer parses its own command line on Windows, so it is passed through untouched.
#[cfg(windows)]
fn add_arguments(command: &mut tokio::process::Command, arguments: &str) {
    command.raw_arg(arguments);
}

#[cfg(not(windows))]
fn add_arguments(command: &mut tokio::process::Command, arguments: &str) {
    command.args(split_command_line(arguments));
}

/// Split a command line into words the way the installer would: whitespace separates words,
/// and double quotes group whitespace into a word without being part of it.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            c => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(word);
    }

    words
}
