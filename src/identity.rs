// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! Classification of service credentials into the parameter shapes the installer accepts.

use std::fmt;

use crate::{
    arguments::{Argument, Value, MASK},
    inventory::{ServiceIdentity, ServiceRole},
};

const AUTHORITY_PREFIX: &str = "NT AUTHORITY\\";
const AUTHORITY_PREFIX_COMPACT: &str = "NTAUTHORITY\\";
const VIRTUAL_PREFIX: &str = "NT SERVICE\\";

const BUILT_IN_ACCOUNTS: [&str; 5] = [
    "SYSTEM",
    "LOCALSERVICE",
    "LOCAL SERVICE",
    "NETWORKSERVICE",
    "NETWORK SERVICE",
];

/// The shape a service credential takes when handed to the installer.
#[derive(Clone, PartialEq)]
pub enum ServiceAccount {
    /// One of the operating system's built-in accounts, in `NT AUTHORITY\NAME` form.
    BuiltIn(String),
    /// A per-service virtual account, in `NT SERVICE\NAME` form.
    Virtual(String),
    /// A managed or group-managed service account; the platform owns its password.
    Managed(String),
    /// An ordinary account whose password must be supplied.
    Credential { username: String, password: String },
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceAccount::BuiltIn(name) => write!(f, "BuiltIn({name:?})"),
            ServiceAccount::Virtual(name) => write!(f, "Virtual({name:?})"),
            ServiceAccount::Managed(name) => write!(f, "Managed({name:?})"),
            ServiceAccount::Credential { username, .. } => {
                write!(f, "Credential({username:?}, {MASK})")
            }
        }
    }
}

/// Strip `prefix` from the front of `s`, ignoring ASCII case.
fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn built_in_account(username: &str) -> Option<&'static str> {
    let name = strip_prefix_ignore_case(username, AUTHORITY_PREFIX)
        .or_else(|| strip_prefix_ignore_case(username, AUTHORITY_PREFIX_COMPACT))
        .unwrap_or(username);

    BUILT_IN_ACCOUNTS
        .iter()
        .find(|account| account.eq_ignore_ascii_case(name))
        .copied()
}

impl ServiceAccount {
    /// Classify a credential. The first matching rule wins.
    pub fn classify(identity: &ServiceIdentity) -> Self {
        let username = identity.username.trim();

        if let Some(account) = built_in_account(username) {
            return ServiceAccount::BuiltIn(format!("{AUTHORITY_PREFIX}{account}"));
        }

        if let Some(service) = strip_prefix_ignore_case(username, VIRTUAL_PREFIX) {
            if !service.is_empty() {
                return ServiceAccount::Virtual(format!(
                    "{VIRTUAL_PREFIX}{}",
                    service.to_uppercase()
                ));
            }
        }

        if username.ends_with('$') {
            return ServiceAccount::Managed(username.to_string());
        }

        ServiceAccount::Credential {
            username: username.to_string(),
            password: identity.password.clone().unwrap_or_default(),
        }
    }

    pub fn username(&self) -> &str {
        match self {
            ServiceAccount::BuiltIn(name)
            | ServiceAccount::Virtual(name)
            | ServiceAccount::Managed(name) => name,
            ServiceAccount::Credential { username, .. } => username,
        }
    }

    /// The installer arguments for running `role` as this account. Only a `Credential` carries a
    /// password, and it is marked secret.
    pub fn arguments(&self, role: ServiceRole) -> Vec<Argument> {
        let account = Argument::new(
            format!("{}SVCACCOUNT", role.tag()),
            Value::Text(self.username().to_string()),
        );

        match self {
            ServiceAccount::Credential { password, .. } => vec![
                account,
                Argument::new(
                    format!("{}SVCPASSWORD", role.tag()),
                    Value::Secret(password.clone()),
                ),
            ],
            _ => vec![account],
        }
    }
}
