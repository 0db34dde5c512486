// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

pub mod arguments;
pub mod cluster;
pub mod commands;
pub mod config;
pub mod converge;
pub mod error;
pub mod feature;
pub mod host;
pub mod identity;
pub mod inventory;
pub mod network;
pub mod test_env;

pub use error::{Error, Result};

pub fn default_config_path() -> String {
    match std::env::var("DBSETUP_CONFIG") {
        Ok(conf) => conf,
        Err(_) => "/etc/dbsetup/dbsetup.toml".to_string(),
    }
}

pub fn default_lock_dir() -> String {
    match std::env::var("DBSETUP_LOCK_DIR") {
        Ok(dir) => dir,
        Err(_) => "/var/run/dbsetup".to_string(),
    }
}

/// The installer executable, relative to the media directory unless absolute.
pub fn default_installer() -> String {
    match std::env::var("DBSETUP_INSTALLER") {
        Ok(installer) => installer,
        Err(_) => "setup.exe".to_string(),
    }
}
