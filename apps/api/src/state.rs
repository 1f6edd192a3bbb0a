use aws_sdk_s3::Client as S3Client;

use crate::config::Config;
use crate::layout::{CanvasSpec, LayoutParams};
use crate::llm_client::LlmClient;
use crate::render::fonts::FontStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub s3: S3Client,
    pub llm: LlmClient,
    /// Plain HTTP client for fetching thumbnail / last-page images.
    pub http: reqwest::Client,
    pub config: Config,
    /// Card face loaded at startup (configured path or system fallback).
    pub fonts: FontStore,
    /// Card stock dimensions; one nominal page, spreads are derived.
    pub canvas: CanvasSpec,
    /// Font-size search bounds and line-spacing policy.
    pub layout: LayoutParams,
}
