//! Error types for provisioning runs.

use core::error::Error;

use derive_more::Display;
use error_stack::Report;

/// Result type for provisioning operations.
pub type ProvisionResult<T> = Result<T, Report<ProvisionError>>;

/// Errors that can occur while provisioning resources.
///
/// Every variant is fatal for the run. Server-originated messages are kept
/// verbatim so the operator sees exactly what the control plane said.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ProvisionError {
    /// The kubeconfig could not be read or parsed
    #[display("Failed to load kubeconfig: {message}")]
    Config { message: String },

    /// The local provisioning configuration is out of range
    #[display("Invalid provisioning config: {message}")]
    InvalidConfig { message: String },

    /// The API server could not be reached or refused our credentials
    #[display("Failed to connect to Kubernetes API: {message}")]
    Connection { message: String },

    /// The API server rejected the object as schema-invalid
    #[display("{kind} {name} rejected as invalid: {message}")]
    Validation {
        kind: String,
        name: String,
        message: String,
    },

    /// An object with that name already exists in the namespace
    #[display("{kind} {name} already exists: {message}")]
    Conflict {
        kind: String,
        name: String,
        message: String,
    },

    /// The requested autoscaling API version is not served by this cluster
    #[display("autoscaling/{version} is not served by this cluster: {message}")]
    UnsupportedVersion { version: String, message: String },

    /// Discovery found none of the autoscaling versions this program can render
    #[display("cluster serves no known autoscaling API version (advertised: {advertised:?})")]
    NoServedVersion { advertised: Vec<String> },

    /// Any other API status
    #[display("{kind} {name} rejected with status {code}: {message}")]
    Rejected {
        kind: String,
        name: String,
        code: u16,
        message: String,
    },

    /// A caller-imposed request deadline expired
    #[display("{kind} {name} was not acknowledged within {seconds}s")]
    DeadlineExceeded {
        kind: String,
        name: String,
        seconds: u64,
    },

    /// The driver was asked to run a second time
    #[display("provisioning driver has already run")]
    AlreadyRun,
}

impl Error for ProvisionError {}
