// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use std::{
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

#[cfg(unix)]
use nix::fcntl::{Flock, FlockArg};

/// An exclusive lock on one instance, held for the duration of a reconciliation pass so that
/// two passes never run the installer against the same instance. Released on drop.
pub struct InstanceLock {
    path: PathBuf,
    #[cfg(unix)]
    _lock: Flock<File>,
    #[cfg(not(unix))]
    _file: File,
}

/// If creating the lock file fails because `dir` doesn't exist, create it and try again.
fn open_lock_file(dir: &str, path: &Path) -> io::Result<File> {
    let open = || {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
    };
    match open() {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            std::fs::create_dir_all(dir)?;
            open()
        }
        other => other,
    }
}

impl InstanceLock {
    /// Take the lock on `instance` without waiting. Fails with `WouldBlock` if another pass
    /// holds it.
    pub fn acquire(dir: &str, instance: &str) -> io::Result<Self> {
        let path = Path::new(dir).join(format!("{}.lock", instance.to_lowercase()));
        let file = open_lock_file(dir, &path)?;

        #[cfg(unix)]
        let lock = Flock::lock(file, FlockArg::LockExclusiveNonblock).map_err(|(_, errno)| {
            io::Error::new(
                io::ErrorKind::WouldBlock,
                format!(
                    "instance '{instance}' is locked by another pass ({}): {errno}",
                    path.display()
                ),
            )
        })?;

        Ok(Self {
            path,
            #[cfg(unix)]
            _lock: lock,
            #[cfg(not(unix))]
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for InstanceLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceLock").field("path", &self.path).finish()
    }
}
