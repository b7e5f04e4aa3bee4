//! Two-step provisioning: workload first, then its autoscaler.
//!
//! The run stops at the first failure. Nothing is retried and nothing already
//! created is rolled back, so a failed autoscaler leaves the workload behind.

use std::future::Future;
use std::time::Duration;

use error_stack::Report;

use crate::config::ProvisionConfig;
use crate::error::ProvisionError;
use crate::error::ProvisionResult;
use crate::platform::ClusterClient;
use crate::platform::Submitted;
use crate::reporter::Reporter;
use crate::reporter::Step;
use crate::resources::AutoscalingPolicySpec;
use crate::resources::version::AUTOSCALING_GROUP;
use crate::resources::AutoscalingVersion;
use crate::resources::VersionSelection;
use crate::resources::WorkloadSpec;

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionState {
    Start,
    WorkloadSubmitted,
    PolicySubmitted,
    Done,
    /// Terminal. `completed` is the last step that was accepted, if any.
    Failed { completed: Option<Step> },
}

/// Everything one run submits, already built and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionPlan {
    pub workload: WorkloadSpec,
    pub autoscaler: AutoscalingPolicySpec,
    pub version: VersionSelection,
    pub request_timeout: Option<Duration>,
}

impl ProvisionPlan {
    /// Validate `config` and build both specs from it.
    pub fn from_config(config: &ProvisionConfig) -> ProvisionResult<Self> {
        config.validate()?;

        Ok(Self {
            workload: WorkloadSpec::from_config(config),
            autoscaler: AutoscalingPolicySpec::from_config(config),
            version: config.autoscaler.version,
            request_timeout: config.request_timeout(),
        })
    }
}

/// Acknowledgements of a fully successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSummary {
    pub workload: Submitted,
    pub autoscaler: Submitted,
}

pub struct ProvisioningDriver<'a> {
    client: &'a dyn ClusterClient,
    reporter: &'a dyn Reporter,
    state: ProvisionState,
}

impl<'a> ProvisioningDriver<'a> {
    pub fn new(client: &'a dyn ClusterClient, reporter: &'a dyn Reporter) -> Self {
        Self {
            client,
            reporter,
            state: ProvisionState::Start,
        }
    }

    pub fn state(&self) -> ProvisionState {
        self.state
    }

    /// Submit the workload, then the autoscaler.
    ///
    /// A driver runs once; later calls fail with
    /// [`ProvisionError::AlreadyRun`] without touching the cluster.
    ///
    /// # Errors
    ///
    /// Whatever the first failing call returned. When the autoscaler fails the
    /// report notes that the workload stays in place.
    #[tracing::instrument(skip_all, fields(namespace = %plan.workload.namespace))]
    pub async fn run(&mut self, plan: &ProvisionPlan) -> ProvisionResult<ProvisionSummary> {
        if self.state != ProvisionState::Start {
            return Err(Report::new(ProvisionError::AlreadyRun)
                .attach_printable(format!("driver state: {:?}", self.state)));
        }

        let version = match self.resolve_version(plan.version, plan.request_timeout).await {
            Ok(version) => version,
            Err(e) => return Err(self.fail(None, Step::Discovery, e)),
        };

        self.reporter
            .step_started(Step::Workload, &plan.workload.name);
        let workload = match self
            .bounded(
                Step::Workload,
                &plan.workload.name,
                plan.request_timeout,
                self.client.create_workload(&plan.workload),
            )
            .await
        {
            Ok(submitted) => submitted,
            Err(e) => return Err(self.fail(None, Step::Workload, e)),
        };
        self.reporter.step_succeeded(Step::Workload, &workload);
        self.state = ProvisionState::WorkloadSubmitted;

        self.reporter
            .step_started(Step::Autoscaler, &plan.autoscaler.name);
        let autoscaler = match self
            .bounded(
                Step::Autoscaler,
                &plan.autoscaler.name,
                plan.request_timeout,
                self.client.create_autoscaler(&plan.autoscaler, version),
            )
            .await
        {
            Ok(submitted) => submitted,
            Err(e) => {
                let e = e.attach_printable(format!(
                    "{} {}/{} remains provisioned, no rollback is attempted",
                    workload.kind, workload.namespace, workload.name
                ));
                return Err(self.fail(Some(Step::Workload), Step::Autoscaler, e));
            }
        };
        self.reporter.step_succeeded(Step::Autoscaler, &autoscaler);
        self.state = ProvisionState::PolicySubmitted;

        self.reporter.completed();
        self.state = ProvisionState::Done;

        Ok(ProvisionSummary {
            workload,
            autoscaler,
        })
    }

    async fn resolve_version(
        &self,
        selection: VersionSelection,
        timeout: Option<Duration>,
    ) -> ProvisionResult<AutoscalingVersion> {
        let (version, discovered) = match selection {
            VersionSelection::Pinned(version) => (version, false),
            VersionSelection::Newest => {
                self.reporter.step_started(Step::Discovery, AUTOSCALING_GROUP);
                let served = self
                    .bounded(
                        Step::Discovery,
                        AUTOSCALING_GROUP,
                        timeout,
                        self.client.served_autoscaling_versions(),
                    )
                    .await?;
                let version = AutoscalingVersion::newest_served(&served).ok_or_else(|| {
                    Report::new(ProvisionError::NoServedVersion {
                        advertised: served.clone(),
                    })
                })?;
                (version, true)
            }
        };

        self.reporter.version_selected(version, discovered);
        Ok(version)
    }

    /// Await `call`, giving up after `timeout` if one is set.
    async fn bounded<T, F>(
        &self,
        step: Step,
        name: &str,
        timeout: Option<Duration>,
        call: F,
    ) -> ProvisionResult<T>
    where
        F: Future<Output = ProvisionResult<T>>,
    {
        let Some(timeout) = timeout else {
            return call.await;
        };

        tokio::time::timeout(timeout, call).await.map_err(|_| {
            Report::new(ProvisionError::DeadlineExceeded {
                kind: step.to_string(),
                name: name.to_string(),
                seconds: timeout.as_secs(),
            })
        })?
    }

    fn fail(
        &mut self,
        completed: Option<Step>,
        step: Step,
        error: Report<ProvisionError>,
    ) -> Report<ProvisionError> {
        self.reporter.step_failed(step, &error);
        self.state = ProvisionState::Failed { completed };
        error
    }
}
