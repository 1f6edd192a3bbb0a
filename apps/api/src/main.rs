mod cards;
mod config;
mod envelope;
mod errors;
mod layout;
mod llm_client;
mod message;
mod pdf;
mod render;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::{CanvasSpec, LayoutParams};
use crate::llm_client::LlmClient;
use crate::render::fonts::FontStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cardsmith API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Load the card face (falls back to a system font with a warning)
    let fonts = FontStore::open(Path::new(&config.font_path))?;
    info!("Card font loaded: {}", fonts.path().display());

    // Card stock and font-size search policy
    let canvas = CanvasSpec::default();
    let layout = LayoutParams::default();
    info!(
        "Card canvas: {}mm x {}mm @ {}dpi ({}x{} px)",
        canvas.width_mm,
        canvas.height_mm,
        canvas.dpi,
        canvas.width_px(),
        canvas.height_px()
    );

    // Build app state
    let state = AppState {
        s3,
        llm,
        http: reqwest::Client::new(),
        config: config.clone(),
        fonts,
        canvas,
        layout,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "cardsmith-static",
    );

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials);
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let s3_config = loader.load().await;

    aws_sdk_s3::Client::new(&s3_config)
}
