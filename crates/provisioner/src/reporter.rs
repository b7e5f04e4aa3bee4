//! Progress reporting for provisioning runs.

use std::fmt;

use error_stack::Report;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::error::ProvisionError;
use crate::platform::Submitted;
use crate::resources::AutoscalingVersion;

/// The steps of a run, in order. Discovery only runs for `VersionSelection::Newest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Asking which autoscaling versions the server serves
    Discovery,
    Workload,
    Autoscaler,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery => f.write_str("discovery"),
            Self::Workload => f.write_str("workload"),
            Self::Autoscaler => f.write_str("autoscaler"),
        }
    }
}

/// Receives driver progress. Handed to the driver explicitly.
pub trait Reporter: Send + Sync {
    /// The autoscaling API version the run will use.
    fn version_selected(&self, version: AutoscalingVersion, discovered: bool);

    fn step_started(&self, step: Step, name: &str);

    fn step_succeeded(&self, step: Step, submitted: &Submitted);

    fn step_failed(&self, step: Step, error: &Report<ProvisionError>);

    /// Both objects were accepted.
    fn completed(&self);
}

/// [`Reporter`] writing one `tracing` event per notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn version_selected(&self, version: AutoscalingVersion, discovered: bool) {
        if version.is_deprecated() {
            warn!(
                api_version = %format!("autoscaling/{version}"),
                discovered,
                "Using deprecated autoscaling API, removed from current Kubernetes releases"
            );
        } else {
            info!(api_version = %format!("autoscaling/{version}"), discovered, "Selected autoscaling API");
        }
    }

    fn step_started(&self, step: Step, name: &str) {
        match step {
            Step::Discovery => info!(%step, group = %name, "=== Discovering {name} API versions ==="),
            _ => info!(%step, resource = %name, "=== Creating {step} ==="),
        }
    }

    fn step_succeeded(&self, step: Step, submitted: &Submitted) {
        info!(
            %step,
            kind = %submitted.kind,
            api_version = %submitted.api_version,
            namespace = %submitted.namespace,
            "Created {}: {}",
            submitted.kind,
            submitted.name
        );
    }

    fn step_failed(&self, step: Step, error: &Report<ProvisionError>) {
        match step {
            Step::Discovery => error!(%step, "Failed to discover autoscaling API versions: {error:?}"),
            _ => error!(%step, "Failed to create {step}: {error:?}"),
        }
    }

    fn completed(&self) {
        info!("Provisioning completed successfully");
    }
}
