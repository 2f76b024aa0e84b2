//! Axum HTTP handlers for the allocation webhook.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use crate::{
    error::AllocationError,
    models::{AllocationRequest, AllocationResponse},
    resolver, AppState,
};

// ------------------------------------------------------------------ //
//  GET | POST /allocate                                               //
// ------------------------------------------------------------------ //

/// Allocate a provisioning device to one of its linked hubs and ensure its
/// digital-twin record exists.
///
/// Linear flow: validate → resolve twin → select hub → build response.
/// Validation failures return 400 with the message and touch no store;
/// store failures surface as 500 for this request only.
pub async fn allocate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AllocationRequest>,
) -> Result<impl IntoResponse, AllocationError> {
    let req = req.validate()?;

    let twin_id = resolver::resolve(
        state.twin_store.as_ref(),
        &req.model_id,
        &req.registration_id,
    )
    .await?;

    let hub = state.selector.select(&req.linked_hubs);
    let resp = AllocationResponse::new(hub, &req.model_id, &twin_id);

    info!(
        registration_id = %req.registration_id,
        hub = %resp.iot_hub_host_name,
        twin_id = %twin_id,
        "device allocated"
    );

    Ok((StatusCode::OK, Json(resp)))
}

// ------------------------------------------------------------------ //
//  Health                                                             //
// ------------------------------------------------------------------ //

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}
