//! In-memory stand-in for the API server.
//!
//! Applies the checks the real server applies to the two kinds we create:
//! duplicate names conflict, selectors must match template labels, HPA bounds
//! must be ordered, and unknown autoscaling versions are not found.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use error_stack::Report;
use provisioner::platform::ClusterClient;
use provisioner::platform::Submitted;
use provisioner::reporter::Reporter;
use provisioner::reporter::Step;
use provisioner::resources::AutoscalingPolicySpec;
use provisioner::resources::AutoscalingVersion;
use provisioner::resources::WorkloadSpec;
use provisioner::ProvisionError;
use provisioner::ProvisionResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateWorkload {
        namespace: String,
        name: String,
    },
    CreateAutoscaler {
        namespace: String,
        name: String,
        version: AutoscalingVersion,
    },
    Discover,
}

pub struct StubCluster {
    served: Vec<String>,
    autoscaler_delay: Option<Duration>,
    discovery_delay: Option<Duration>,
    workload_failure: Option<ProvisionError>,
    calls: Mutex<Vec<Call>>,
    /// (kind, namespace, name) of every object that exists
    objects: Mutex<BTreeSet<(String, String, String)>>,
}

impl StubCluster {
    /// Serves every autoscaling version and accepts any valid object.
    pub fn new() -> Self {
        Self {
            served: AutoscalingVersion::ALL
                .iter()
                .map(|v| v.as_str().to_string())
                .collect(),
            autoscaler_delay: None,
            discovery_delay: None,
            workload_failure: None,
            calls: Mutex::new(Vec::new()),
            objects: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn serving(mut self, versions: &[&str]) -> Self {
        self.served = versions.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn with_autoscaler_delay(mut self, delay: Duration) -> Self {
        self.autoscaler_delay = Some(delay);
        self
    }

    pub fn with_discovery_delay(mut self, delay: Duration) -> Self {
        self.discovery_delay = Some(delay);
        self
    }

    pub fn failing_workloads_with(mut self, error: ProvisionError) -> Self {
        self.workload_failure = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn autoscaler_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::CreateAutoscaler { .. }))
            .count()
    }

    pub fn contains(&self, kind: &str, namespace: &str, name: &str) -> bool {
        self.objects.lock().unwrap().contains(&(
            kind.to_string(),
            namespace.to_string(),
            name.to_string(),
        ))
    }

    fn store(&self, kind: &str, namespace: &str, name: &str) -> ProvisionResult<()> {
        let inserted = self.objects.lock().unwrap().insert((
            kind.to_string(),
            namespace.to_string(),
            name.to_string(),
        ));
        if !inserted {
            return Err(Report::new(ProvisionError::Conflict {
                kind: kind.to_string(),
                name: name.to_string(),
                message: format!("{kind} \"{name}\" already exists"),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterClient for StubCluster {
    async fn create_workload(&self, spec: &WorkloadSpec) -> ProvisionResult<Submitted> {
        self.calls.lock().unwrap().push(Call::CreateWorkload {
            namespace: spec.namespace.clone(),
            name: spec.name.clone(),
        });

        if let Some(error) = &self.workload_failure {
            return Err(Report::new(error.clone()));
        }

        if !spec.selector_matches_labels() {
            return Err(Report::new(ProvisionError::Validation {
                kind: "Deployment".to_string(),
                name: spec.name.clone(),
                message: "spec.template.metadata.labels: Invalid value: `selector` does not match template `labels`".to_string(),
            }));
        }

        self.store("Deployment", &spec.namespace, &spec.name)?;

        Ok(Submitted {
            kind: "Deployment".to_string(),
            api_version: "apps/v1".to_string(),
            name: spec.name.clone(),
            namespace: spec.namespace.clone(),
        })
    }

    async fn create_autoscaler(
        &self,
        spec: &AutoscalingPolicySpec,
        version: AutoscalingVersion,
    ) -> ProvisionResult<Submitted> {
        self.calls.lock().unwrap().push(Call::CreateAutoscaler {
            namespace: spec.namespace.clone(),
            name: spec.name.clone(),
            version,
        });

        if let Some(delay) = self.autoscaler_delay {
            tokio::time::sleep(delay).await;
        }

        if !self.served.iter().any(|v| v == version.as_str()) {
            return Err(Report::new(ProvisionError::UnsupportedVersion {
                version: version.to_string(),
                message: "the server could not find the requested resource".to_string(),
            }));
        }

        if spec.min_replicas < 1 || spec.min_replicas > spec.max_replicas {
            return Err(Report::new(ProvisionError::Validation {
                kind: "HorizontalPodAutoscaler".to_string(),
                name: spec.name.clone(),
                message: format!(
                    "spec.maxReplicas: Invalid value: {}: must be greater than or equal to `minReplicas`",
                    spec.max_replicas
                ),
            }));
        }

        self.store("HorizontalPodAutoscaler", &spec.namespace, &spec.name)?;

        Ok(Submitted {
            kind: "HorizontalPodAutoscaler".to_string(),
            api_version: format!("autoscaling/{version}"),
            name: spec.name.clone(),
            namespace: spec.namespace.clone(),
        })
    }

    async fn served_autoscaling_versions(&self) -> ProvisionResult<Vec<String>> {
        self.calls.lock().unwrap().push(Call::Discover);

        if let Some(delay) = self.discovery_delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self.served.clone())
    }
}

/// Reporter keeping one line per notification.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl Reporter for RecordingReporter {
    fn version_selected(&self, version: AutoscalingVersion, discovered: bool) {
        self.push(format!("version {version} discovered={discovered}"));
    }

    fn step_started(&self, step: Step, name: &str) {
        self.push(format!("start {step} {name}"));
    }

    fn step_succeeded(&self, step: Step, submitted: &Submitted) {
        self.push(format!("ok {step} {}", submitted.name));
    }

    fn step_failed(&self, step: Step, _error: &Report<ProvisionError>) {
        self.push(format!("failed {step}"));
    }

    fn completed(&self) {
        self.push("completed".to_string());
    }
}
