//! S3 upload helpers for rendered artifacts.
//!
//! Every object gets a fresh UUID name under its prefix so repeated requests
//! never collide. Bytes are spooled through a temp file and streamed from
//! disk; the spool file is removed when the handle drops.

use std::io::Write;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;

pub const CARD_PDF_PREFIX: &str = "generated-cards/";
pub const CARD_PNG_PREFIX: &str = "generated-cards-png/";
pub const ENVELOPE_PREFIX: &str = "envelopes/";

/// `{prefix}{uuid}.{ext}`
fn object_key(prefix: &str, ext: &str) -> String {
    format!("{prefix}{}.{ext}", Uuid::new_v4())
}

/// Public URL of an uploaded object: the configured base URL when set,
/// otherwise the virtual-hosted bucket URL (region segment omitted for
/// us-east-1, which has no location constraint).
fn object_url(config: &Config, key: &str) -> String {
    if let Some(base) = &config.s3_public_url {
        return format!("{}/{key}", base.trim_end_matches('/'));
    }
    if config.s3_region == "us-east-1" {
        format!("https://{}.s3.amazonaws.com/{key}", config.s3_bucket)
    } else {
        format!(
            "https://{}.s3-{}.amazonaws.com/{key}",
            config.s3_bucket, config.s3_region
        )
    }
}

/// Uploads rendered bytes under `{prefix}{uuid}.{ext}` and returns the
/// public URL.
pub async fn upload_bytes(
    s3: &S3Client,
    config: &Config,
    prefix: &str,
    ext: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let key = object_key(prefix, ext);

    let mut spool = tempfile::NamedTempFile::new()
        .map_err(|e| AppError::Storage(format!("spool file: {e}")))?;
    spool
        .write_all(bytes)
        .map_err(|e| AppError::Storage(format!("spool write: {e}")))?;

    let body = ByteStream::from_path(spool.path())
        .await
        .map_err(|e| AppError::Storage(format!("spool read: {e}")))?;

    s3.put_object()
        .bucket(&config.s3_bucket)
        .key(&key)
        .content_type(content_type)
        .body(body)
        .send()
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    info!("Upload successful: {key} to {}", config.s3_bucket);
    Ok(object_url(config, &key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            s3_bucket: "tobre-cards".to_string(),
            s3_endpoint: None,
            s3_region: "us-east-2".to_string(),
            s3_public_url: None,
            aws_access_key_id: String::new(),
            aws_secret_access_key: String::new(),
            anthropic_api_key: String::new(),
            font_path: String::new(),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_object_key_shape() {
        let key = object_key(CARD_PNG_PREFIX, "png");
        assert!(key.starts_with("generated-cards-png/"));
        assert!(key.ends_with(".png"));
        // prefix + uuid (36 chars) + ".png"
        assert_eq!(key.len(), CARD_PNG_PREFIX.len() + 36 + 4);
    }

    #[test]
    fn test_object_url_regional_bucket() {
        let config = test_config();
        assert_eq!(
            object_url(&config, "generated-cards/x.pdf"),
            "https://tobre-cards.s3-us-east-2.amazonaws.com/generated-cards/x.pdf"
        );
    }

    #[test]
    fn test_object_url_us_east_1_has_no_region_segment() {
        let mut config = test_config();
        config.s3_region = "us-east-1".to_string();
        assert_eq!(
            object_url(&config, "k.png"),
            "https://tobre-cards.s3.amazonaws.com/k.png"
        );
    }

    #[test]
    fn test_object_url_prefers_public_base() {
        let mut config = test_config();
        config.s3_public_url = Some("https://cdn.example.com/".to_string());
        assert_eq!(object_url(&config, "k.png"), "https://cdn.example.com/k.png");
    }
}
