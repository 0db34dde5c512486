// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use crate::{
    commands::{HandledResult, EXIT_OK},
    config::Config,
    feature,
};

/// The configuration was already validated when it was loaded; print a summary of it.
pub fn validate(config: &Config) -> HandledResult<u8> {
    let desired = &config.desired;
    let features: Vec<String> = feature::normalize(&desired.features).into_iter().collect();

    println!("instance:  {}", desired.instance_name);
    println!("action:    {}", desired.action);
    println!("version:   {}", desired.product_version);
    println!("features:  {}", features.join(","));
    if desired.action.is_cluster_action() {
        println!(
            "cluster:   group={} network={} addresses={}",
            desired.cluster.group_name.as_deref().unwrap_or("<none>"),
            desired.cluster.network_name.as_deref().unwrap_or("<none>"),
            desired.cluster.ip_addresses.len()
        );
    }
    println!("installer: {}", config.host.installer_path());

    Ok(EXIT_OK)
}
