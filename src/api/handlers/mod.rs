//! HTTP request handlers

pub mod health;
pub mod policy;

pub use health::health_check;
pub use policy::policy_and_balance;
