// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! Feature tags and the calculation of which requested features still need installing.

use std::collections::BTreeSet;

use crate::error::{Error, Result};

pub const ENGINE: &str = "SQLENGINE";
pub const REPLICATION: &str = "REPLICATION";
pub const FULLTEXT: &str = "FULLTEXT";
pub const REPORTING: &str = "RS";
pub const ANALYSIS: &str = "AS";
pub const INTEGRATION: &str = "IS";
pub const CONNECTIVITY: &str = "CONN";
pub const BACKWARD_COMPAT: &str = "BC";
pub const SDK: &str = "SDK";
pub const ADMIN_TOOLS_BASIC: &str = "SSMS";
pub const ADMIN_TOOLS_ADVANCED: &str = "ADV_SSMS";

/// The management tools stopped shipping with the installer at this major version.
pub const ADMIN_TOOLS_REMOVED_IN: u32 = 13;

/// Normalize a set of feature tags to upper case.
pub fn normalize<I, S>(features: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    features
        .into_iter()
        .map(|f| f.as_ref().trim().to_uppercase())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Fail if any requested feature cannot be installed by the installer for `version`.
///
/// Every requested feature is checked, including ones that are already installed.
pub fn check_supported(desired: &BTreeSet<String>, version: u32) -> Result<()> {
    if version != ADMIN_TOOLS_REMOVED_IN {
        return Ok(());
    }

    match desired
        .iter()
        .find(|f| *f == ADMIN_TOOLS_BASIC || *f == ADMIN_TOOLS_ADVANCED)
    {
        Some(feature) => Err(Error::UnsupportedFeature {
            feature: feature.clone(),
            version,
        }),
        None => Ok(()),
    }
}

/// Compute the requested features which are not already installed.
///
/// Tags are compared case-insensitively; the result is upper case.
pub fn features_to_install<D, C>(desired: D, current: C, version: u32) -> Result<BTreeSet<String>>
where
    D: IntoIterator,
    D::Item: AsRef<str>,
    C: IntoIterator,
    C::Item: AsRef<str>,
{
    let desired = normalize(desired);
    check_supported(&desired, version)?;

    let current = normalize(current);
    Ok(desired.difference(&current).cloned().collect())
}
