use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Constructed once at startup and passed down explicitly — no module-level
/// globals, so tests can build their own configs in parallel.
#[derive(Debug, Clone)]
pub struct Config {
    pub s3_bucket: String,
    /// Custom endpoint for MinIO/local stacks; unset means real AWS.
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
    /// Base URL for public object links; defaults to the virtual-hosted
    /// bucket URL when unset.
    pub s3_public_url: Option<String>,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    /// Card face; falls back to a system face (with a warning) if unloadable.
    pub font_path: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: std::env::var("S3_ENDPOINT").ok(),
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-2".to_string()),
            s3_public_url: std::env::var("S3_PUBLIC_URL").ok(),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            font_path: std::env::var("CARD_FONT_PATH")
                .unwrap_or_else(|_| "assets/fonts/wilson.ttf".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
