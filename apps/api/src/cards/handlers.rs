//! Axum route handlers for the Card API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::cards::{generate_card_pdf, generate_card_png};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CardRequest {
    pub greeting: String,
    pub body: String,
    pub signoff: String,
    /// Thumbnail artwork URL for the PDF cover page.
    pub thumbnail: Option<String>,
    /// Last-page artwork URL; a blank panel is used when missing.
    pub last_page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub url: String,
    /// False when the text overflows even at the minimum font size; the
    /// artifact is still produced best-effort.
    pub fits: bool,
}

/// POST /api/v1/cards/png
///
/// Renders the single-page card and returns the uploaded PNG's URL.
pub async fn handle_card_png(
    State(state): State<AppState>,
    Json(request): Json<CardRequest>,
) -> Result<Json<CardResponse>, AppError> {
    let artifact = generate_card_png(&state, request.greeting, request.body, request.signoff).await?;
    Ok(Json(CardResponse {
        url: artifact.url,
        fits: artifact.fits,
    }))
}

/// POST /api/v1/cards/pdf
///
/// Renders the two-page print PDF (cover composite + letter spread) and
/// returns the uploaded PDF's URL. The thumbnail is required; the last page
/// falls back to a blank panel.
pub async fn handle_card_pdf(
    State(state): State<AppState>,
    Json(request): Json<CardRequest>,
) -> Result<Json<CardResponse>, AppError> {
    let thumbnail = request
        .thumbnail
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("thumbnail is required".to_string()))?
        .to_owned();

    let artifact = generate_card_pdf(
        &state,
        request.greeting,
        request.body,
        request.signoff,
        Some(&thumbnail),
        request.last_page.as_deref(),
    )
    .await?;

    Ok(Json(CardResponse {
        url: artifact.url,
        fits: artifact.fits,
    }))
}
