use serde::{Deserialize, Serialize};

/// Query string of `GET /policy_and_balance`.
///
/// Both fields are optional here so that a missing parameter is reported
/// through the service error body rather than axum's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PolicyQuery {
    /// Caller account, 40 hex digits with optional `0x`
    pub address: Option<String>,
    /// License plate used as the lookup key
    pub plate: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub network: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
