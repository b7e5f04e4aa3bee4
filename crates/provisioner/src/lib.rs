pub mod config;
pub mod driver;
pub mod error;
pub mod platform;
pub mod reporter;
pub mod resources;

pub use driver::ProvisionPlan;
pub use driver::ProvisionState;
pub use driver::ProvisionSummary;
pub use driver::ProvisioningDriver;
pub use error::ProvisionError;
pub use error::ProvisionResult;
