use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::apps::v1::DeploymentSpec;
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::api::core::v1::ContainerPort;
use k8s_openapi::api::core::v1::PodSpec;
use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::config::ProvisionConfig;

/// Kind name of the workload resource.
pub const WORKLOAD_KIND: &str = "Deployment";
/// Group/version the workload is created under.
pub const WORKLOAD_API_VERSION: &str = "apps/v1";

/// One container of the pod template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub port: i32,
    pub cpu_request: String,
    pub memory_request: String,
}

/// A replicated workload as this program declares it.
///
/// `selector` must be a subset of `labels` or the API server rejects the
/// object; nothing here enforces that, so invalid specs can still be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub labels: BTreeMap<String, String>,
    pub selector: BTreeMap<String, String>,
    pub containers: Vec<ContainerSpec>,
}

impl WorkloadSpec {
    /// Build the workload described by `config`.
    pub fn from_config(config: &ProvisionConfig) -> Self {
        let workload = &config.workload;
        Self {
            name: workload.name.clone(),
            namespace: config.namespace.clone(),
            replicas: workload.replicas,
            labels: workload.labels.clone(),
            selector: workload.selector.clone(),
            containers: vec![ContainerSpec {
                name: workload.container_name.clone(),
                image: workload.image.clone(),
                port: workload.container_port,
                cpu_request: workload.cpu_request.clone(),
                memory_request: workload.memory_request.clone(),
            }],
        }
    }

    /// Whether every selector entry appears verbatim in the template labels.
    pub fn selector_matches_labels(&self) -> bool {
        !self.selector.is_empty()
            && self
                .selector
                .iter()
                .all(|(key, value)| self.labels.get(key) == Some(value))
    }

    /// Render as the `apps/v1` object submitted to the API server.
    pub fn to_deployment(&self) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(self.replicas),
                selector: LabelSelector {
                    match_labels: Some(self.selector.clone()),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(self.labels.clone()),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        containers: self.containers.iter().map(ContainerSpec::to_container).collect(),
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl ContainerSpec {
    fn to_container(&self) -> Container {
        let requests = BTreeMap::from([
            ("cpu".to_string(), Quantity(self.cpu_request.clone())),
            ("memory".to_string(), Quantity(self.memory_request.clone())),
        ]);

        Container {
            name: self.name.clone(),
            image: Some(self.image.clone()),
            ports: Some(vec![ContainerPort {
                container_port: self.port,
                ..Default::default()
            }]),
            resources: Some(ResourceRequirements {
                requests: Some(requests),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
