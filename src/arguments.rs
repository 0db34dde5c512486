// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! The typed installer argument set, how it is assembled from the desired configuration, and
//! how it is rendered onto the installer command line.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::{
    cluster::ClusterMapping,
    config::{DesiredConfiguration, SecurityMode},
    feature,
    identity::ServiceAccount,
    inventory::{Action, ServiceRole},
};

/// Replaces secret values in the log-safe rendering.
pub const MASK: &str = "********";

const SKIP_CLUSTER_VERIFICATION: &str = "Cluster_VerifyForErrors";

/// The value of an installer argument.
#[derive(Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Text(String),
    /// Rendered sorted, each element quoted.
    List(Vec<String>),
    /// A string that must never appear in logged output.
    Secret(String),
    /// The feature list: comma-joined and unquoted.
    Features(Vec<String>),
}

impl Value {
    /// Empty values are left off the command line entirely.
    fn is_empty(&self) -> bool {
        match self {
            Value::Bool(_) => false,
            Value::Text(s) | Value::Secret(s) => s.is_empty(),
            Value::List(l) | Value::Features(l) => l.is_empty(),
        }
    }

    fn render(&self, redact: bool) -> String {
        match self {
            Value::Bool(true) => quote("True"),
            Value::Bool(false) => quote("False"),
            Value::Text(s) => quote(s),
            Value::Secret(_) if redact => quote(MASK),
            Value::Secret(s) => quote(s),
            Value::List(items) => {
                let mut items: Vec<&String> = items.iter().collect();
                items.sort();
                items
                    .into_iter()
                    .map(|item| quote(item))
                    .collect::<Vec<_>>()
                    .join(" ")
            }
            Value::Features(features) => features.join(","),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Text(s) => write!(f, "Text({s:?})"),
            Value::List(l) => write!(f, "List({l:?})"),
            Value::Secret(_) => write!(f, "Secret({MASK})"),
            Value::Features(l) => write!(f, "Features({l:?})"),
        }
    }
}

fn quote(s: &str) -> String {
    format!("\"{s}\"")
}

/// Strip trailing path separators, so `C:\Data\` is passed as `C:\Data`.
pub fn trim_path(path: &str) -> String {
    path.trim_end_matches(|c| c == '\\' || c == '/').to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub key: String,
    pub value: Value,
}

impl Argument {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into().to_uppercase(),
            value,
        }
    }
}

/// A set of installer arguments with unique, upper-case keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSet {
    args: BTreeMap<String, Value>,
}

impl ArgumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an argument, returning the value it replaced.
    pub fn insert(&mut self, arg: Argument) -> Option<Value> {
        self.args.insert(arg.key, arg.value)
    }

    pub fn extend(&mut self, args: impl IntoIterator<Item = Argument>) {
        for arg in args {
            self.insert(arg);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.args.get(&key.to_uppercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.args.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn render_with(&self, redact: bool) -> String {
        self.args
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("/{key}={}", value.render(redact)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The command line handed to the installer. Contains secrets in clear text.
    pub fn render(&self) -> String {
        self.render_with(false)
    }

    /// The command line with every secret masked, safe to log.
    pub fn render_redacted(&self) -> String {
        self.render_with(true)
    }
}

/// `Display` uses the redacted rendering.
impl fmt::Display for ArgumentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_redacted())
    }
}

/// Everything the argument builder draws on for one pass.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub desired: &'a DesiredConfiguration,
    /// The features this pass installs; gates the feature-specific arguments.
    pub features: &'a BTreeSet<String>,
    pub cluster: &'a ClusterMapping,
    /// The account running setup. It is always made an administrator.
    pub setup_identity: &'a str,
}

impl BuildContext<'_> {
    fn requires(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }
}

fn text(key: &str, value: &str) -> Argument {
    Argument::new(key, Value::Text(value.to_string()))
}

fn directory(key: &str, path: &str) -> Argument {
    Argument::new(key, Value::Text(trim_path(path)))
}

/// The setup identity followed by any additional accounts, without duplicates.
fn admin_accounts(setup_identity: &str, declared: &[String]) -> Vec<String> {
    let mut accounts = vec![setup_identity.to_string()];
    for account in declared {
        if !accounts.iter().any(|a| a.eq_ignore_ascii_case(account)) {
            accounts.push(account.clone());
        }
    }
    accounts
}

fn common_arguments(ctx: &BuildContext) -> Vec<Argument> {
    vec![
        Argument::new("QUIET", Value::Bool(true)),
        Argument::new("IACCEPTSQLSERVERLICENSETERMS", Value::Bool(true)),
        text("ACTION", &ctx.desired.action.to_string()),
        Argument::new(
            "FEATURES",
            Value::Features(ctx.features.iter().cloned().collect()),
        ),
        text("INSTANCENAME", &ctx.desired.instance_name),
    ]
}

fn pass_through_arguments(ctx: &BuildContext) -> Vec<Argument> {
    let desired = ctx.desired;
    let mut args = Vec::new();

    if let Some(id) = &desired.instance_id {
        args.push(text("INSTANCEID", id));
    }
    if let Some(key) = &desired.product_key {
        args.push(Argument::new("PID", Value::Secret(key.clone())));
    }
    if let Some(enabled) = desired.update_enabled {
        args.push(Argument::new("UPDATEENABLED", Value::Bool(enabled)));
    }
    if let Some(source) = &desired.update_source {
        args.push(directory("UPDATESOURCE", source));
    }
    for (key, path) in [
        ("INSTALLSHAREDDIR", &desired.install_shared_dir),
        ("INSTALLSHAREDWOWDIR", &desired.install_shared_wow_dir),
        ("INSTANCEDIR", &desired.instance_dir),
    ] {
        if let Some(path) = path {
            args.push(directory(key, path));
        }
    }

    args
}

fn browser_arguments(ctx: &BuildContext) -> Vec<Argument> {
    match ctx.desired.browser_startup_type {
        Some(startup) => vec![text("BROWSERSVCSTARTUPTYPE", &startup.to_string())],
        None => Vec::new(),
    }
}

fn engine_arguments(ctx: &BuildContext) -> Vec<Argument> {
    if !ctx.requires(feature::ENGINE) {
        return Vec::new();
    }
    let engine = &ctx.desired.engine;
    let mut args = Vec::new();

    if engine.security_mode == SecurityMode::Sql {
        args.push(text("SECURITYMODE", "SQL"));
        args.push(Argument::new(
            "SAPWD",
            Value::Secret(engine.sa_password.clone().unwrap_or_default()),
        ));
    }
    if let Some(collation) = &engine.collation {
        args.push(text("SQLCOLLATION", collation));
    }
    args.push(Argument::new(
        "SQLSYSADMINACCOUNTS",
        Value::List(admin_accounts(ctx.setup_identity, &engine.sysadmin_accounts)),
    ));
    for (key, path) in engine.directories() {
        if let Some(path) = path {
            args.push(directory(key, path));
        }
    }

    args
}

fn analysis_arguments(ctx: &BuildContext) -> Vec<Argument> {
    if !ctx.requires(feature::ANALYSIS) {
        return Vec::new();
    }
    let analysis = &ctx.desired.analysis;
    let mut args = Vec::new();

    if let Some(collation) = &analysis.collation {
        args.push(text("ASCOLLATION", collation));
    }
    if let Some(mode) = &analysis.server_mode {
        args.push(text("ASSERVERMODE", &mode.to_uppercase()));
    }
    args.push(Argument::new(
        "ASSYSADMINACCOUNTS",
        Value::List(admin_accounts(
            ctx.setup_identity,
            &analysis.sysadmin_accounts,
        )),
    ));
    for (key, path) in analysis.directories() {
        if let Some(path) = path {
            args.push(directory(key, path));
        }
    }

    args
}

fn service_account_arguments(ctx: &BuildContext) -> Vec<Argument> {
    ServiceRole::ALL
        .iter()
        .filter(|role| ctx.requires(role.feature()))
        .filter_map(|role| {
            ctx.desired
                .service_accounts
                .get(*role)
                .map(|identity| ServiceAccount::classify(identity).arguments(*role))
        })
        .flatten()
        .collect()
}

fn cluster_arguments(ctx: &BuildContext) -> Vec<Argument> {
    let action = ctx.desired.action;
    let cluster = &ctx.desired.cluster;
    let mut args = Vec::new();

    if matches!(
        action,
        Action::InstallFailoverCluster | Action::PrepareFailoverCluster
    ) {
        args.push(text("SKIPRULES", SKIP_CLUSTER_VERIFICATION));
    }

    if action.maps_storage() {
        if let Some(group) = &cluster.group_name {
            args.push(text("FAILOVERCLUSTERGROUP", group));
        }
        if let Some(name) = &cluster.network_name {
            args.push(text("FAILOVERCLUSTERNETWORKNAME", name));
        }
        if let Some(disks) = &ctx.cluster.disks {
            args.push(Argument::new(
                "FAILOVERCLUSTERDISKS",
                Value::List(disks.clone()),
            ));
        }
    }

    if action.maps_network() {
        if let Some(addresses) = &ctx.cluster.ip_addresses {
            args.push(Argument::new(
                "FAILOVERCLUSTERIPADDRESSES",
                Value::List(addresses.clone()),
            ));
        }
    }

    args
}

/// Assemble the installer arguments for a pass.
///
/// Each group of arguments comes from its own builder, applied in a fixed order.
pub fn build_arguments(ctx: &BuildContext) -> ArgumentSet {
    let builders: [fn(&BuildContext) -> Vec<Argument>; 7] = [
        common_arguments,
        pass_through_arguments,
        browser_arguments,
        engine_arguments,
        analysis_arguments,
        service_account_arguments,
        cluster_arguments,
    ];

    let mut set = ArgumentSet::new();
    for builder in builders {
        set.extend(builder(ctx));
    }
    set
}
