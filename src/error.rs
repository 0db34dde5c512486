// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use std::net::Ipv4Addr;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a reconciliation pass can fail. None of these are retried; they are surfaced to the
/// caller with enough context to diagnose the failure without re-running the pass.
#[derive(Debug, Error)]
pub enum Error {
    /// A requested feature has been removed from the installer for this product version.
    #[error("feature '{feature}' is not supported by the installer for major version {version}")]
    UnsupportedFeature { feature: String, version: u32 },

    /// The drives required by the declared paths did not map one-to-one onto available cluster
    /// disks owned by this node.
    #[error(
        "could not map cluster disks: {} drive(s) required ({}), {} disk(s) mapped ({})",
        required.len(),
        required.join(", "),
        mapped.len(),
        mapped.join(", ")
    )]
    ClusterDiskMapping {
        required: Vec<String>,
        mapped: Vec<String>,
    },

    /// A declared cluster path carried no drive qualifier and cannot be mapped to a disk.
    #[error("cluster path '{path}' has no drive qualifier")]
    UnqualifiedClusterPath { path: String },

    /// Some declared IP address matched none of the client-usable cluster networks.
    #[error(
        "{} address(es) declared but only {} cluster network match(es) found: {}",
        declared.len(),
        matched.len(),
        declared.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ")
    )]
    ClusterIpAddressNotValid {
        declared: Vec<Ipv4Addr>,
        matched: Vec<String>,
    },

    #[error("installer failed: {0}")]
    InstallerExecution(#[from] InstallerError),

    /// The installer ran, but the observed state afterwards still differs from the declared one.
    #[error(
        "installation did not converge: missing features [{}], cluster mismatches [{}]",
        missing_features.join(", "),
        cluster_mismatches.join("; ")
    )]
    ConvergenceVerification {
        missing_features: Vec<String>,
        cluster_mismatches: Vec<String>,
    },

    #[error("inventory probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("cluster inventory query failed: {0}")]
    ClusterInventory(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn cluster_inventory(msg: impl Into<String>) -> Self {
        Self::ClusterInventory(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    /// Nothing is installed under the instance name. The driver treats this as an empty state.
    #[error("instance '{0}' not found")]
    InstanceNotFound(String),

    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("failed to start '{path}': {err}")]
    Spawn { path: String, err: std::io::Error },

    #[error("installer did not exit within {secs} seconds")]
    Timeout { secs: u64 },

    #[error("installer exited with code {code}: {output}")]
    ExitCode { code: i32, output: String },

    /// The process ended without an exit code, e.g. it was killed by a signal.
    #[error("installer was terminated without an exit code")]
    Terminated,
}
