//! Declarative resources this program submits.
//!
//! - [`WorkloadSpec`]: the replicated workload, rendered as an `apps/v1` Deployment
//! - [`AutoscalingPolicySpec`]: the HPA, rendered for any [`AutoscalingVersion`]

pub mod autoscaler;
pub mod version;
pub mod workload;

pub use autoscaler::AutoscalingPolicySpec;
pub use autoscaler::MetricThreshold;
pub use autoscaler::ResourceMetric;
pub use autoscaler::ScaleTargetRef;
pub use autoscaler::AUTOSCALER_KIND;
pub use version::AutoscalingVersion;
pub use version::VersionSelection;
pub use workload::ContainerSpec;
pub use workload::WorkloadSpec;
pub use workload::WORKLOAD_KIND;
