//! Error taxonomy for the allocation webhook.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::twin_store::TwinStoreError;

/// Failure modes of a single allocation request.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Malformed or incomplete request. Surfaced to the caller as a client
    /// error carrying the human-readable message; no store call is made.
    #[error("{0}")]
    Validation(String),

    /// Twin store failure other than not-found. Fatal for this request only;
    /// the process keeps serving other requests.
    #[error("twin store error: {0}")]
    Store(#[from] TwinStoreError),
}

impl IntoResponse for AllocationError {
    fn into_response(self) -> Response {
        match self {
            AllocationError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            AllocationError::Store(e) => {
                error!(error = %e, "twin resolution failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "allocation failed").into_response()
            }
        }
    }
}
