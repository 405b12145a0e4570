//! Liveness endpoint.

use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::api::server::PolicyServer;
use crate::api::types::HealthResponse;

/// Reports process liveness without contacting the node.
pub async fn health_check(State(state): State<Arc<PolicyServer>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        network: state.service.reader().network_name().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
