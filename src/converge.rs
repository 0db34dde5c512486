// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! The convergence driver: one reconciliation pass from probing the current state through
//! running the installer to verifying the result.
//!
//! A pass moves through the stages in `Stage` in order. Any error ends the pass; nothing is
//! retried, and the caller decides whether to run another pass.

use std::{collections::BTreeSet, fmt};

use log::{debug, info, warn};

use crate::{
    arguments::{build_arguments, ArgumentSet, BuildContext},
    cluster::{map_cluster_resources, ClusterMapping},
    config::DesiredConfiguration,
    error::{Error, InstallerError, ProbeError, Result},
    feature,
    inventory::{
        Action, ClusterInventory, CurrentState, Installer, InventoryProbe, RebootIndicator,
    },
};

/// Exit code with which the installer reports success that needs a reboot to take effect.
pub const EXIT_SUCCESS_REBOOT_REQUIRED: i32 = 3010;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Probing,
    Diffing,
    Mapping,
    Building,
    Executing,
    AwaitingCompletion,
    Verifying,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Stage::Probing => "probing",
                Stage::Diffing => "diffing",
                Stage::Mapping => "mapping",
                Stage::Building => "building",
                Stage::Executing => "executing",
                Stage::AwaitingCompletion => "awaiting completion",
                Stage::Verifying => "verifying",
            }
        )
    }
}

fn enter(stage: Stage, instance: &str) {
    debug!("instance {instance}: {stage}");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    Converged,
    /// Every requested feature is installed but the cluster attributes differ from the declared
    /// ones, and installing features cannot change them.
    PartiallyConverged,
}

/// The outcome of a pass that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceResult {
    pub convergence: Convergence,
    /// Redacted installer command line, if the installer was run.
    pub invocation: Option<String>,
    pub exit_code: Option<i32>,
    /// The host should reboot to finish the installation.
    pub reboot_required: bool,
    /// A reboot was needed but the configuration asked for it not to be signalled.
    pub reboot_suppressed: bool,
    pub cluster_mismatches: Vec<String>,
}

impl ConvergenceResult {
    fn without_installer(convergence: Convergence, cluster_mismatches: Vec<String>) -> Self {
        Self {
            convergence,
            invocation: None,
            exit_code: None,
            reboot_required: false,
            reboot_suppressed: false,
            cluster_mismatches,
        }
    }
}

/// What separates the current state from the desired one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gaps {
    pub missing_features: BTreeSet<String>,
    pub cluster_mismatches: Vec<String>,
}

impl Gaps {
    pub fn is_empty(&self) -> bool {
        self.missing_features.is_empty() && self.cluster_mismatches.is_empty()
    }
}

/// An installer run that is ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub features: BTreeSet<String>,
    pub cluster: ClusterMapping,
    pub arguments: ArgumentSet,
}

/// Whether a pass needs the installer at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Done(Convergence, Vec<String>),
    Install(Plan),
}

/// Compare the declared cluster attributes with the ones the instance reports. Actions that do
/// not give the instance a cluster identity never mismatch.
pub fn cluster_mismatches(desired: &DesiredConfiguration, current: &CurrentState) -> Vec<String> {
    let mut mismatches = Vec::new();
    if !desired.action.checks_cluster_attributes() {
        return mismatches;
    }

    let differs = |want: &Option<String>, have: &Option<String>| match (want, have) {
        (Some(want), Some(have)) => !want.eq_ignore_ascii_case(have),
        (Some(_), None) => true,
        (None, _) => false,
    };

    let cluster = &desired.cluster;
    if differs(&cluster.group_name, &current.cluster_group_name) {
        mismatches.push(format!(
            "cluster group is {:?}, expected {:?}",
            current.cluster_group_name, cluster.group_name
        ));
    }
    if differs(&cluster.network_name, &current.cluster_network_name) {
        mismatches.push(format!(
            "cluster network name is {:?}, expected {:?}",
            current.cluster_network_name, cluster.network_name
        ));
    }
    for address in &cluster.ip_addresses {
        if !current.cluster_ip_addresses.contains(address) {
            mismatches.push(format!("cluster address {address} is not assigned"));
        }
    }

    mismatches
}

/// The host-specific details a pass runs with.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub installer_path: String,
    /// Name of this node within the failover cluster.
    pub node_name: String,
    /// The account running setup.
    pub setup_identity: String,
}

/// Drives an instance towards its desired configuration through the given collaborators.
pub struct Reconciler<'a> {
    probe: &'a dyn InventoryProbe,
    cluster: &'a dyn ClusterInventory,
    installer: &'a dyn Installer,
    reboot: &'a dyn RebootIndicator,
    settings: DriverSettings,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        probe: &'a dyn InventoryProbe,
        cluster: &'a dyn ClusterInventory,
        installer: &'a dyn Installer,
        reboot: &'a dyn RebootIndicator,
        settings: DriverSettings,
    ) -> Self {
        Self {
            probe,
            cluster,
            installer,
            reboot,
            settings,
        }
    }

    /// Report the current state of the instance. An instance that is not found has nothing
    /// installed.
    pub fn inspect(&self, desired: &DesiredConfiguration) -> Result<CurrentState> {
        match self.probe.probe(&desired.instance_name) {
            Ok(state) => Ok(state),
            Err(ProbeError::InstanceNotFound(name)) => {
                debug!("instance {name} not found, treating it as not installed");
                Ok(CurrentState::empty(&name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Determine what separates `current` from `desired`.
    pub fn gaps(&self, desired: &DesiredConfiguration, current: &CurrentState) -> Result<Gaps> {
        Ok(Gaps {
            missing_features: feature::features_to_install(
                &desired.features,
                &current.features,
                desired.product_version,
            )?,
            cluster_mismatches: cluster_mismatches(desired, current),
        })
    }

    /// Whether the instance already matches its desired configuration.
    pub fn is_satisfied(&self, desired: &DesiredConfiguration) -> Result<bool> {
        let current = self.inspect(desired)?;
        Ok(self.gaps(desired, &current)?.is_empty())
    }

    /// Decide, from the current state, whether the installer must run and with what arguments.
    pub fn plan(&self, desired: &DesiredConfiguration, current: &CurrentState) -> Result<Step> {
        let instance = &desired.instance_name;

        enter(Stage::Diffing, instance);
        let gaps = self.gaps(desired, current)?;

        if gaps.missing_features.is_empty() {
            if gaps.cluster_mismatches.is_empty() {
                return Ok(Step::Done(Convergence::Converged, Vec::new()));
            }
            if desired.action != Action::CompleteFailoverCluster {
                return Ok(Step::Done(
                    Convergence::PartiallyConverged,
                    gaps.cluster_mismatches,
                ));
            }
        }

        let mut cluster = ClusterMapping::default();
        if desired.action.is_cluster_action() {
            enter(Stage::Mapping, instance);
            cluster = map_cluster_resources(desired, self.cluster, &self.settings.node_name)?;
        }

        enter(Stage::Building, instance);
        let arguments = build_arguments(&BuildContext {
            desired,
            features: &gaps.missing_features,
            cluster: &cluster,
            setup_identity: &self.settings.setup_identity,
        });

        Ok(Step::Install(Plan {
            features: gaps.missing_features,
            cluster,
            arguments,
        }))
    }

    /// Run one reconciliation pass.
    pub fn reconcile(&self, desired: &DesiredConfiguration) -> Result<ConvergenceResult> {
        let instance = &desired.instance_name;

        enter(Stage::Probing, instance);
        let current = self.inspect(desired)?;

        let plan = match self.plan(desired, &current)? {
            Step::Done(convergence, mismatches) => {
                info!("instance {instance}: nothing to install ({convergence:?})");
                return Ok(ConvergenceResult::without_installer(convergence, mismatches));
            }
            Step::Install(plan) => plan,
        };

        enter(Stage::Executing, instance);
        let invocation = plan.arguments.render_redacted();
        info!(
            "instance {instance}: running {} {invocation}",
            self.settings.installer_path
        );
        let output = self
            .installer
            .run(&self.settings.installer_path, &plan.arguments.render())?;

        enter(Stage::AwaitingCompletion, instance);
        let exit_code = match output.exit_code {
            Some(0) => 0,
            Some(EXIT_SUCCESS_REBOOT_REQUIRED) => EXIT_SUCCESS_REBOOT_REQUIRED,
            Some(code) => {
                return Err(InstallerError::ExitCode {
                    code,
                    output: output.output,
                }
                .into())
            }
            None => return Err(InstallerError::Terminated.into()),
        };

        let reboot_needed = exit_code == EXIT_SUCCESS_REBOOT_REQUIRED
            || desired.force_reboot
            || self.reboot.is_reboot_pending();
        let reboot_suppressed = reboot_needed && desired.suppress_reboot;
        if reboot_suppressed {
            warn!("instance {instance}: a reboot is required but was suppressed");
        }

        enter(Stage::Verifying, instance);
        let current = self.inspect(desired)?;
        let requested = feature::normalize(&desired.features);
        let installed = feature::normalize(&current.features);
        let missing_features: Vec<String> = requested.difference(&installed).cloned().collect();
        let cluster_mismatches = cluster_mismatches(desired, &current);

        if !missing_features.is_empty() || !cluster_mismatches.is_empty() {
            return Err(Error::ConvergenceVerification {
                missing_features,
                cluster_mismatches,
            });
        }

        info!("instance {instance}: converged");
        Ok(ConvergenceResult {
            convergence: Convergence::Converged,
            invocation: Some(invocation),
            exit_code: Some(exit_code),
            reboot_required: reboot_needed && !desired.suppress_reboot,
            reboot_suppressed,
            cluster_mismatches: Vec::new(),
        })
    }
}
