pub mod config;
pub mod domain;
pub mod errors;
pub mod format;
pub mod validation;

pub use domain::{PolicyAndBalance, RawPolicy, TokenBalance};
pub use errors::PolicyApiError;
