// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! Who is running setup, and on which node.

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// The account running this process.
#[cfg(unix)]
pub fn current_user() -> String {
    match nix::unistd::User::from_uid(nix::unistd::getuid()) {
        Ok(Some(user)) => user.name,
        _ => env_var("USER").unwrap_or_else(|| "root".to_string()),
    }
}

/// The account running this process, qualified with its domain.
#[cfg(not(unix))]
pub fn current_user() -> String {
    let user = env_var("USERNAME").unwrap_or_else(|| "Administrator".to_string());
    match env_var("USERDOMAIN") {
        Some(domain) => format!("{domain}\\{user}"),
        None => user,
    }
}

/// The name of this host, as the failover cluster knows it.
#[cfg(unix)]
pub fn node_name() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(not(unix))]
pub fn node_name() -> String {
    env_var("COMPUTERNAME").unwrap_or_else(|| "localhost".to_string())
}
