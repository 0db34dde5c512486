// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

pub mod check;
pub mod inspect;
pub mod plan;
pub mod reconcile;
pub mod validate;

use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::{
    config::{Config, HostConfig},
    converge::{DriverSettings, Reconciler},
    host::{user, CommandProbe, ProcessInstaller, RebootMarker, TopologyFile},
};

/// An error that was already reported to the operator. Callers only pass it up; `main()` turns it
/// into a nonzero exit status. Build one with `handle_err()`, which runs a reporting closure on the
/// underlying error first.
#[derive(Debug, PartialEq)]
pub struct HandledError {}

pub type HandledResult<T> = std::result::Result<T, HandledError>;

pub fn handled_error<T>() -> HandledResult<T> {
    HandledResult::Err(HandledError {})
}

pub trait Handle<T, F> {
    fn handle_err(self, handler: F) -> HandledResult<T>;
}

impl<T, E, F: FnOnce(E)> Handle<T, F> for std::result::Result<T, E> {
    /// Report the error through `handler` and mark it handled.
    fn handle_err(self, handler: F) -> HandledResult<T> {
        self.map_err(|e| {
            handler(e);
            HandledError {}
        })
    }
}

/// Process exit statuses for the commands.
pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILED: u8 = 1;
pub const EXIT_PARTIAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the current state of the instance.
    Inspect,
    /// Check whether the instance matches its desired configuration.
    Test,
    /// Print the installer command line a reconciliation would run, with secrets masked.
    Plan,
    /// Run the installer if needed and verify the result.
    Reconcile,
    /// Check the configuration file.
    Validate,
}

/// Load the configuration named on the command line, or the default one.
pub fn load_config(cli: &Cli) -> HandledResult<Config> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => crate::default_config_path(),
    };
    Config::from_file(&path).handle_err(|e| eprintln!("{e}"))
}

/// The real collaborators described by the host section of the configuration.
pub struct HostCollaborators {
    probe: CommandProbe,
    cluster: TopologyFile,
    installer: ProcessInstaller,
    reboot: RebootMarker,
    settings: DriverSettings,
}

impl HostCollaborators {
    pub fn from_config(host: &HostConfig) -> HandledResult<Self> {
        let Some(probe_command) = &host.probe_command else {
            eprintln!("host.probe_command must be set in the configuration.");
            return handled_error();
        };

        let cluster = match &host.topology {
            Some(path) => TopologyFile::from_file(path).handle_err(|e| eprintln!("{e}"))?,
            None => TopologyFile::default(),
        };

        Ok(Self {
            probe: CommandProbe::new(probe_command),
            cluster,
            installer: ProcessInstaller::new(Duration::from_secs(host.setup_timeout_secs)),
            reboot: RebootMarker::new(host.reboot_marker.as_deref()),
            settings: DriverSettings {
                installer_path: host.installer_path(),
                node_name: host.node_name.clone().unwrap_or_else(user::node_name),
                setup_identity: user::current_user(),
            },
        })
    }

    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(
            &self.probe,
            &self.cluster,
            &self.installer,
            &self.reboot,
            self.settings.clone(),
        )
    }
}

pub fn main(cli: &Cli) -> HandledResult<u8> {
    let config = load_config(cli)?;

    if let Commands::Validate = cli.command {
        return validate::validate(&config);
    }

    let host = HostCollaborators::from_config(&config.host)?;
    let reconciler = host.reconciler();

    match &cli.command {
        Commands::Inspect => inspect::inspect(&reconciler, &config.desired),
        Commands::Test => check::test(&reconciler, &config.desired),
        Commands::Plan => plan::plan(&reconciler, &config.desired),
        Commands::Reconcile => reconcile::reconcile(&reconciler, &config),
        Commands::Validate => unreachable!(),
    }
}
