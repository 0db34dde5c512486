// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use std::process::ExitCode;

use clap::Parser;

use dbsetup_lib::commands::{self, Cli};

/// The dbsetup binary inspects, tests and reconciles an instance against its configuration.
fn main() -> ExitCode {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().filter_or("DBSETUP_LOG", default_level);
    env_logger::Builder::from_env(env).init();

    match commands::main(&args) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::from(commands::EXIT_FAILED),
    }
}
