//! Card orchestration: turns the three text blocks into uploaded artifacts.
//!
//! Two products: a single-page PNG card, and the two-page print PDF whose
//! first page is the last-page/thumbnail composite and whose second page is
//! the letter spread. Rasterization is CPU-bound and runs on the blocking
//! pool; fetching and uploading stay async.

pub mod handlers;

use image::RgbImage;
use tracing::warn;

use crate::errors::AppError;
use crate::layout::CardText;
use crate::state::AppState;
use crate::{pdf, render, storage};

/// Outcome of a card generation: where the artifact lives, and whether the
/// text actually fit the usable area (false means the layout fell back to
/// the minimum font size and overflows).
#[derive(Debug, Clone)]
pub struct CardArtifact {
    pub url: String,
    pub fits: bool,
}

/// Fetches a panel image over HTTP. Any failure degrades to `None` — the
/// caller substitutes a blank panel, the card still ships.
async fn fetch_panel(http: &reqwest::Client, url: &str) -> Option<RgbImage> {
    let result = async {
        let resp = http.get(url).send().await?.error_for_status()?;
        resp.bytes().await
    }
    .await;

    match result {
        Ok(bytes) => match image::load_from_memory(&bytes) {
            Ok(img) => Some(img.to_rgb8()),
            Err(e) => {
                warn!("panel image at {url} failed to decode: {e}");
                None
            }
        },
        Err(e) => {
            warn!("failed to fetch panel image {url}: {e}");
            None
        }
    }
}

/// Renders the single-panel card and uploads it as PNG.
pub async fn generate_card_png(
    state: &AppState,
    greeting: String,
    body: String,
    signoff: String,
) -> Result<CardArtifact, AppError> {
    let spec = state.canvas;
    let params = state.layout;
    let store = state.fonts.clone();

    let (png, fits) = tokio::task::spawn_blocking(move || -> Result<(Vec<u8>, bool), AppError> {
        let text = CardText {
            greeting: &greeting,
            body: &body,
            signoff: &signoff,
        };
        let (img, layout) = render::render_card(&text, &spec, &store, &params);
        Ok((render::encode_png(&img)?, layout.fits))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    if !fits {
        warn!("card text overflows even at the minimum font size");
    }

    let url = storage::upload_bytes(
        &state.s3,
        &state.config,
        storage::CARD_PNG_PREFIX,
        "png",
        "image/png",
        &png,
    )
    .await?;

    Ok(CardArtifact { url, fits })
}

/// Renders the two-page print PDF and uploads it.
///
/// Page 1: last-page artwork and thumbnail side by side (either panel blank
/// when its image is missing or unfetchable). Page 2: blank left page plus
/// the letter on the right, split by the dashed fold rule.
pub async fn generate_card_pdf(
    state: &AppState,
    greeting: String,
    body: String,
    signoff: String,
    thumbnail_url: Option<&str>,
    last_page_url: Option<&str>,
) -> Result<CardArtifact, AppError> {
    let spec = state.canvas;
    let params = state.layout;
    let store = state.fonts.clone();

    let fetch = |url: Option<&str>| {
        let http = state.http.clone();
        let url = url.map(str::to_owned);
        async move {
            match url {
                Some(u) => fetch_panel(&http, &u).await,
                None => None,
            }
        }
    };
    let (last_page, thumbnail) = tokio::join!(fetch(last_page_url), fetch(thumbnail_url));

    let (pdf_bytes, fits) =
        tokio::task::spawn_blocking(move || -> Result<(Vec<u8>, bool), AppError> {
            let blank = render::blank_page(spec.width_px(), spec.height_px());
            let left = last_page.unwrap_or_else(|| blank.clone());
            let right = thumbnail.unwrap_or(blank);
            let cover = render::compose_pages(&left, &right, &spec);

            let text = CardText {
                greeting: &greeting,
                body: &body,
                signoff: &signoff,
            };
            let (letter, layout) = render::render_card_spread(&text, &spec, &store, &params);

            let bytes = pdf::images_to_pdf(&[cover, letter], spec.width_mm * 2.0, spec.height_mm)?;
            Ok((bytes, layout.fits))
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    if !fits {
        warn!("card text overflows even at the minimum font size");
    }

    let url = storage::upload_bytes(
        &state.s3,
        &state.config,
        storage::CARD_PDF_PREFIX,
        "pdf",
        "application/pdf",
        &pdf_bytes,
    )
    .await?;

    Ok(CardArtifact { url, fits })
}
