//! Axum route handlers for the Message API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::message::{generate_messages, validate, MessageRequest, MessageSet};
use crate::state::AppState;

/// POST /api/v1/messages
///
/// Generates the four card-message styles for a recipient and occasion.
pub async fn handle_generate_messages(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageSet>, AppError> {
    validate(&request)?;
    let set = generate_messages(&state.llm, &request).await?;
    Ok(Json(set))
}
