use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use error_stack::Report;
use error_stack::ResultExt;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ProvisionError;
use crate::error::ProvisionResult;
use crate::resources::VersionSelection;

/// Everything a provisioning run needs to know about what to create.
///
/// `Default` is the nginx demo: a two-replica deployment in `default` scaled
/// between 2 and 10 replicas at 70% CPU through the deprecated
/// `autoscaling/v2beta1` API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvisionConfig {
    pub namespace: String,
    pub workload: WorkloadConfig,
    pub autoscaler: AutoscalerConfig,
    /// Upper bound for each create call, in seconds. No bound when unset.
    pub request_timeout_secs: Option<u64>,
}

/// Parameters of the replicated workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkloadConfig {
    pub name: String,
    pub replicas: i32,
    pub container_name: String,
    pub image: String,
    pub container_port: i32,
    /// CPU request quantity, e.g. `100m`
    pub cpu_request: String,
    /// Memory request quantity, e.g. `128Mi`
    pub memory_request: String,
    /// Labels stamped on the pod template
    pub labels: BTreeMap<String, String>,
    /// Labels the deployment selects pods by
    pub selector: BTreeMap<String, String>,
}

/// Parameters of the autoscaling policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoscalerConfig {
    pub name: String,
    pub min_replicas: i32,
    pub max_replicas: i32,
    /// Target average CPU utilization, percent
    pub target_cpu_utilization: i32,
    /// Target average memory utilization, percent
    pub target_memory_utilization: Option<i32>,
    pub version: VersionSelection,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            workload: WorkloadConfig::default(),
            autoscaler: AutoscalerConfig::default(),
            request_timeout_secs: None,
        }
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        let labels = BTreeMap::from([("app".to_string(), "nginx".to_string())]);
        Self {
            name: "nginx-deployment".to_string(),
            replicas: 2,
            container_name: "nginx".to_string(),
            image: "nginx:1.20".to_string(),
            container_port: 80,
            cpu_request: "100m".to_string(),
            memory_request: "128Mi".to_string(),
            selector: labels.clone(),
            labels,
        }
    }
}

impl Default for AutoscalerConfig {
    fn default() -> Self {
        Self {
            name: "nginx-hpa".to_string(),
            min_replicas: 2,
            max_replicas: 10,
            target_cpu_utilization: 70,
            target_memory_utilization: None,
            version: VersionSelection::default(),
        }
    }
}

impl ProvisionConfig {
    /// Load a config from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> ProvisionResult<Self> {
        let contents = std::fs::read_to_string(path).change_context(
            ProvisionError::InvalidConfig {
                message: format!("Failed to read config file: {}", path.display()),
            },
        )?;

        serde_yaml::from_str(&contents).change_context(ProvisionError::InvalidConfig {
            message: format!("Failed to parse config file: {}", path.display()),
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Reject values the API server would refuse anyway.
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::InvalidConfig`] naming the first offending field
    pub fn validate(&self) -> ProvisionResult<()> {
        let workload = &self.workload;
        let autoscaler = &self.autoscaler;

        require_non_empty("namespace", &self.namespace)?;
        require_non_empty("workload.name", &workload.name)?;
        require_non_empty("workload.containerName", &workload.container_name)?;
        require_non_empty("workload.image", &workload.image)?;
        require_non_empty("autoscaler.name", &autoscaler.name)?;

        if workload.replicas < 1 {
            return Err(invalid(format!(
                "workload.replicas must be at least 1, got {}",
                workload.replicas
            )));
        }

        if !(1..=65535).contains(&workload.container_port) {
            return Err(invalid(format!(
                "workload.containerPort must be within 1-65535, got {}",
                workload.container_port
            )));
        }

        for (field, value) in [
            ("workload.cpuRequest", &workload.cpu_request),
            ("workload.memoryRequest", &workload.memory_request),
        ] {
            if !is_valid_quantity(value) {
                return Err(invalid(format!("{field} is not a valid quantity: {value:?}")));
            }
        }

        if workload.selector.is_empty() {
            return Err(invalid("workload.selector must not be empty".to_string()));
        }

        if let Some((key, value)) = workload
            .selector
            .iter()
            .find(|(k, v)| workload.labels.get(*k) != Some(*v))
        {
            return Err(invalid(format!(
                "workload.selector {key}={value} does not match the pod template labels"
            )));
        }

        if autoscaler.min_replicas < 1 {
            return Err(invalid(format!(
                "autoscaler.minReplicas must be at least 1, got {}",
                autoscaler.min_replicas
            )));
        }

        if autoscaler.min_replicas > autoscaler.max_replicas {
            return Err(invalid(format!(
                "autoscaler.minReplicas ({}) exceeds maxReplicas ({})",
                autoscaler.min_replicas, autoscaler.max_replicas
            )));
        }

        check_utilization("autoscaler.targetCpuUtilization", autoscaler.target_cpu_utilization)?;
        if let Some(memory) = autoscaler.target_memory_utilization {
            check_utilization("autoscaler.targetMemoryUtilization", memory)?;
        }

        if self.request_timeout_secs == Some(0) {
            return Err(invalid("requestTimeoutSecs must be positive".to_string()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> Report<ProvisionError> {
    Report::new(ProvisionError::InvalidConfig { message })
}

fn require_non_empty(field: &str, value: &str) -> ProvisionResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

fn check_utilization(field: &str, value: i32) -> ProvisionResult<()> {
    if !(1..=100).contains(&value) {
        return Err(invalid(format!("{field} must be within 1-100, got {value}")));
    }
    Ok(())
}

/// Suffixes accepted after the numeric part of a quantity.
const QUANTITY_SUFFIXES: [&str; 14] = [
    "", "m", "k", "M", "G", "T", "P", "E", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei",
];

/// Check a resource quantity such as `100m`, `0.5`, `128Mi` or `1G`.
///
/// Covers the decimal and binary SI forms; exponent notation is not accepted.
pub fn is_valid_quantity(value: &str) -> bool {
    let split = value
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let (numeric_part, unit) = value.split_at(split);

    if !QUANTITY_SUFFIXES.contains(&unit) {
        return false;
    }

    let digits = numeric_part.strip_prefix('+').unwrap_or(numeric_part);
    let mut parts = digits.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    match fraction {
        Some(fraction) => {
            (!whole.is_empty() || !fraction.is_empty()) && all_digits(whole) && all_digits(fraction)
        }
        None => !whole.is_empty() && all_digits(whole),
    }
}
