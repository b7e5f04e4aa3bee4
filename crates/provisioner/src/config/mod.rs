pub mod cli;
pub mod provision;

pub use cli::*;
pub use provision::*;
