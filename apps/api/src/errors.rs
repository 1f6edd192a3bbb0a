use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::pdf::PdfError;
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "A rendering error occurred".to_string(),
                )
            }
            AppError::Pdf(e) => {
                tracing::error!("PDF error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PDF_ERROR",
                    "A PDF assembly error occurred".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
