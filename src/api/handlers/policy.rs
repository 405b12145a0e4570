//! Policy lookup handler.

use axum::{
    extract::{Query, State},
    response::Json,
};
use std::sync::Arc;

use crate::api::server::PolicyServer;
use crate::api::types::PolicyQuery;
use crate::core::domain::PolicyAndBalance;
use crate::core::errors::PolicyApiError;

/// `GET /policy_and_balance?address=<addr>&plate=<plate>`
pub async fn policy_and_balance(
    State(state): State<Arc<PolicyServer>>,
    Query(query): Query<PolicyQuery>,
) -> Result<Json<PolicyAndBalance>, PolicyApiError> {
    let address = query
        .address
        .ok_or_else(|| PolicyApiError::InvalidInput("missing query parameter 'address'".into()))?;
    let plate = query
        .plate
        .ok_or_else(|| PolicyApiError::InvalidInput("missing query parameter 'plate'".into()))?;

    let doc = state.service.policy_and_balance(&address, &plate).await?;
    Ok(Json(doc))
}
