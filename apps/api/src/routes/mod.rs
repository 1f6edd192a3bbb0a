pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::cards::handlers as card_handlers;
use crate::envelope::handlers as envelope_handlers;
use crate::message::handlers as message_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Message API
        .route(
            "/api/v1/messages",
            post(message_handlers::handle_generate_messages),
        )
        // Card API
        .route("/api/v1/cards/png", post(card_handlers::handle_card_png))
        .route("/api/v1/cards/pdf", post(card_handlers::handle_card_pdf))
        // Envelope API
        .route(
            "/api/v1/envelopes",
            post(envelope_handlers::handle_generate_envelopes),
        )
        .with_state(state)
}
