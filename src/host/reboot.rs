// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use std::path::PathBuf;

use crate::inventory::RebootIndicator;

/// Reports a pending reboot when the marker file exists and is not empty, the way a pending
/// file-rename list is only meaningful while it has entries.
#[derive(Debug, Clone, Default)]
pub struct RebootMarker {
    path: Option<PathBuf>,
}

impl RebootMarker {
    pub fn new(path: Option<&str>) -> Self {
        Self {
            path: path.map(PathBuf::from),
        }
    }
}

impl RebootIndicator for RebootMarker {
    fn is_reboot_pending(&self) -> bool {
        match &self.path {
            Some(path) => std::fs::metadata(path).is_ok_and(|m| m.len() > 0),
            None => false,
        }
    }
}
