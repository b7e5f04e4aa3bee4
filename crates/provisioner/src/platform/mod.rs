//! Kubernetes API integration.
//!
//! The driver only talks to the cluster through [`ClusterClient`], so runs can
//! be exercised without an API server. [`KubeCluster`] is the real thing.

use async_trait::async_trait;

use crate::error::ProvisionResult;
use crate::resources::AutoscalingPolicySpec;
use crate::resources::AutoscalingVersion;
use crate::resources::WorkloadSpec;

pub mod kube_client;
pub mod kube_cluster;

pub use kube_cluster::KubeCluster;

/// Acknowledgement that an object now exists on the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub kind: String,
    pub api_version: String,
    pub name: String,
    pub namespace: String,
}

/// Create operations consumed by the provisioning driver.
///
/// Implementations submit exactly once. They never retry and never turn an
/// "already exists" answer into success.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Create the workload in its namespace.
    async fn create_workload(&self, spec: &WorkloadSpec) -> ProvisionResult<Submitted>;

    /// Create the autoscaling policy at `autoscaling/{version}`.
    ///
    /// The version is sent as given; if the server does not serve it the
    /// rejection comes back as [`crate::ProvisionError::UnsupportedVersion`].
    async fn create_autoscaler(
        &self,
        spec: &AutoscalingPolicySpec,
        version: AutoscalingVersion,
    ) -> ProvisionResult<Submitted>;

    /// Versions of the `autoscaling` group the server advertises.
    async fn served_autoscaling_versions(&self) -> ProvisionResult<Vec<String>>;
}
