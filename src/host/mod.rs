// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! Implementations of the reconciliation collaborators that talk to the real host: the
//! inventory probe command, the cluster topology snapshot, the installer process and the reboot
//! indicator.

pub mod installer;
pub mod lock;
pub mod probe;
pub mod reboot;
pub mod topology;
pub mod user;

pub use installer::ProcessInstaller;
pub use lock::InstanceLock;
pub use probe::CommandProbe;
pub use reboot::RebootMarker;
pub use topology::TopologyFile;
