use kube::api::ApiResource;
use kube::api::DynamicObject;
use kube::core::GroupVersionKind;
use serde_json::json;
use serde_json::Value;

use crate::config::ProvisionConfig;
use crate::resources::version::AutoscalingVersion;
use crate::resources::version::AUTOSCALING_GROUP;
use crate::resources::workload::WORKLOAD_API_VERSION;
use crate::resources::workload::WORKLOAD_KIND;

/// Kind name of the autoscaling resource.
pub const AUTOSCALER_KIND: &str = "HorizontalPodAutoscaler";

/// Identity of the object the autoscaler scales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleTargetRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
}

/// Resource whose utilization drives scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceMetric {
    Cpu,
    Memory,
}

impl ResourceMetric {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
        }
    }
}

/// Target average utilization for one resource, percent of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricThreshold {
    pub resource: ResourceMetric,
    pub target_average_utilization: i32,
}

/// An autoscaling policy independent of the API version it is sent with.
///
/// `min_replicas <= max_replicas` is the API server's to enforce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoscalingPolicySpec {
    pub name: String,
    pub namespace: String,
    pub target: ScaleTargetRef,
    pub min_replicas: i32,
    pub max_replicas: i32,
    pub metrics: Vec<MetricThreshold>,
}

impl AutoscalingPolicySpec {
    /// Build the policy described by `config`, targeting its workload.
    pub fn from_config(config: &ProvisionConfig) -> Self {
        let autoscaler = &config.autoscaler;

        let mut metrics = vec![MetricThreshold {
            resource: ResourceMetric::Cpu,
            target_average_utilization: autoscaler.target_cpu_utilization,
        }];
        if let Some(memory) = autoscaler.target_memory_utilization {
            metrics.push(MetricThreshold {
                resource: ResourceMetric::Memory,
                target_average_utilization: memory,
            });
        }

        Self {
            name: autoscaler.name.clone(),
            namespace: config.namespace.clone(),
            target: ScaleTargetRef {
                api_version: WORKLOAD_API_VERSION.to_string(),
                kind: WORKLOAD_KIND.to_string(),
                name: config.workload.name.clone(),
            },
            min_replicas: autoscaler.min_replicas,
            max_replicas: autoscaler.max_replicas,
            metrics,
        }
    }

    /// Render the `spec` body in the schema of `version`.
    ///
    /// `autoscaling/v1` only knows a CPU target, so other metrics are dropped.
    pub fn spec_body(&self, version: AutoscalingVersion) -> Value {
        let mut spec = json!({
            "scaleTargetRef": {
                "apiVersion": self.target.api_version,
                "kind": self.target.kind,
                "name": self.target.name,
            },
            "minReplicas": self.min_replicas,
            "maxReplicas": self.max_replicas,
        });

        match version {
            AutoscalingVersion::V1 => {
                if let Some(cpu) = self
                    .metrics
                    .iter()
                    .find(|m| m.resource == ResourceMetric::Cpu)
                {
                    spec["targetCPUUtilizationPercentage"] = json!(cpu.target_average_utilization);
                }
            }
            AutoscalingVersion::V2beta1 => {
                spec["metrics"] = self
                    .metrics
                    .iter()
                    .map(|m| {
                        json!({
                            "type": "Resource",
                            "resource": {
                                "name": m.resource.as_str(),
                                "targetAverageUtilization": m.target_average_utilization,
                            },
                        })
                    })
                    .collect();
            }
            AutoscalingVersion::V2beta2 | AutoscalingVersion::V2 => {
                spec["metrics"] = self
                    .metrics
                    .iter()
                    .map(|m| {
                        json!({
                            "type": "Resource",
                            "resource": {
                                "name": m.resource.as_str(),
                                "target": {
                                    "type": "Utilization",
                                    "averageUtilization": m.target_average_utilization,
                                },
                            },
                        })
                    })
                    .collect();
            }
        }

        spec
    }

    /// Render as an untyped object addressed at `autoscaling/{version}`.
    pub fn to_dynamic_object(&self, version: AutoscalingVersion) -> DynamicObject {
        DynamicObject::new(&self.name, &api_resource(version))
            .within(&self.namespace)
            .data(json!({ "spec": self.spec_body(version) }))
    }
}

/// Resource descriptor for HPAs served at `autoscaling/{version}`.
pub fn api_resource(version: AutoscalingVersion) -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk(
        AUTOSCALING_GROUP,
        version.as_str(),
        AUTOSCALER_KIND,
    ))
}
