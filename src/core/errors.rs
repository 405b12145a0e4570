//! Error types for policy lookups and service startup.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::types::ErrorResponse;

/// Errors raised while looking up a policy or bringing the service up.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PolicyApiError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Contract call reverted: {0}")]
    ContractReverted(String),

    #[error("Upstream node unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Invalid contract data: {0}")]
    InvalidPolicyData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PolicyApiError {
    /// Every per-request failure is reported as a 500; callers tell the
    /// cases apart by [`error_code`](Self::error_code).
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Machine-readable code placed next to the message in error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "INVALID_ADDRESS",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ContractReverted(_) => "CONTRACT_REVERTED",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::InvalidPolicyData(_) => "INVALID_CONTRACT_DATA",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Failures caused by the request itself rather than the node or service.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidAddress(_) | Self::InvalidInput(_))
    }
}

impl IntoResponse for PolicyApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_input_error() {
            tracing::warn!(code = self.error_code(), "request rejected: {}", self);
        } else {
            tracing::error!(code = self.error_code(), "policy lookup failed: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.error_code().to_string(),
        });

        (status, body).into_response()
    }
}

impl From<std::io::Error> for PolicyApiError {
    fn from(err: std::io::Error) -> Self {
        PolicyApiError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PolicyApiError {
    fn from(err: serde_json::Error) -> Self {
        PolicyApiError::Config(err.to_string())
    }
}
