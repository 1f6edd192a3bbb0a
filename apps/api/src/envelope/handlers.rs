//! Axum route handlers for the Envelope API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::envelope::{generate_envelopes, Recipient, ReturnAddress};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnvelopeRequest {
    pub return_address: ReturnAddress,
    pub addresses: Vec<Recipient>,
}

#[derive(Debug, Serialize)]
pub struct EnvelopeResponse {
    pub s3_links: Vec<String>,
}

/// POST /api/v1/envelopes
///
/// Renders one addressed envelope PDF per recipient and returns the
/// uploaded URLs.
pub async fn handle_generate_envelopes(
    State(state): State<AppState>,
    Json(request): Json<EnvelopeRequest>,
) -> Result<Json<EnvelopeResponse>, AppError> {
    if request.addresses.is_empty() {
        return Err(AppError::Validation(
            "addresses must contain at least 1 recipient".to_string(),
        ));
    }

    let s3_links = generate_envelopes(&state, request.return_address, request.addresses).await?;
    Ok(Json(EnvelopeResponse { s3_links }))
}
