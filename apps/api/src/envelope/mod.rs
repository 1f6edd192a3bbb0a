//! Envelope generation: one single-page PDF per recipient, addressed with
//! the card face — return address top-left, recipient centered.

pub mod handlers;

use image::{Rgb, RgbImage};
use serde::Deserialize;

use crate::errors::AppError;
use crate::layout::{mm_to_px, TextMeasure};
use crate::render::fonts::FontStore;
use crate::state::AppState;
use crate::{pdf, render, storage};

/// A6-style invitation envelope: 7.25in × 5.25in.
pub const ENVELOPE_WIDTH_MM: f64 = 184.15;
pub const ENVELOPE_HEIGHT_MM: f64 = 133.35;

/// Envelope ink — the print template's blue.
const INK: Rgb<u8> = Rgb([30, 64, 175]);

// Point sizes from the print template, scaled to the render resolution.
const RETURN_PT: f32 = 12.0;
const RECIPIENT_NAME_PT: f32 = 36.0;
const RECIPIENT_ADDRESS_PT: f32 = 18.0;

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnAddress {
    pub name: String,
    pub address: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recipient {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Street")]
    pub street: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "ZIP")]
    pub zip: String,
}

impl Recipient {
    /// Street line plus the "City, ST ZIP" line.
    fn address_lines(&self) -> [String; 2] {
        [
            self.street.clone(),
            format!("{}, {} {}", self.city, self.state, self.zip),
        ]
    }
}

fn pt_to_px(pt: f32, dpi: u32) -> f32 {
    pt * dpi as f32 / 72.0
}

fn in_to_px(inches: f32, dpi: u32) -> f32 {
    inches * dpi as f32
}

/// Renders one addressed envelope face.
pub fn render_envelope(
    recipient: &Recipient,
    return_address: &ReturnAddress,
    dpi: u32,
    store: &FontStore,
) -> RgbImage {
    let width = mm_to_px(ENVELOPE_WIDTH_MM, dpi);
    let height = mm_to_px(ENVELOPE_HEIGHT_MM, dpi);
    let mut img = render::blank_page(width, height);
    let font = store.font();

    // Return block: half-inch inset from the top-left corner.
    let inset = in_to_px(0.5, dpi);
    let return_size = pt_to_px(RETURN_PT, dpi);
    render::draw_text(&mut img, font, return_size, inset, inset, INK, &return_address.name);
    for (i, line) in return_address.address.iter().enumerate() {
        let y = inset + in_to_px(0.25, dpi) * (i + 1) as f32;
        render::draw_text(&mut img, font, return_size, inset, y, INK, line);
    }

    // Recipient name just above the vertical midline, centered.
    let mid_y = height as f32 / 2.0;
    let name_size = pt_to_px(RECIPIENT_NAME_PT, dpi);
    let name_w = store.line_width(&recipient.name, name_size);
    render::draw_text(
        &mut img,
        font,
        name_size,
        (width as f32 - name_w) / 2.0,
        mid_y - name_size - in_to_px(0.1, dpi),
        INK,
        &recipient.name,
    );

    // Address lines below the midline, centered.
    let addr_size = pt_to_px(RECIPIENT_ADDRESS_PT, dpi);
    for (i, line) in recipient.address_lines().iter().enumerate() {
        let w = store.line_width(line, addr_size);
        let y = mid_y + in_to_px(0.1, dpi) + in_to_px(0.4, dpi) * i as f32;
        render::draw_text(&mut img, font, addr_size, (width as f32 - w) / 2.0, y, INK, line);
    }

    img
}

/// Renders, packages, and uploads one envelope PDF per recipient, returning
/// the uploaded URLs in request order.
pub async fn generate_envelopes(
    state: &AppState,
    return_address: ReturnAddress,
    recipients: Vec<Recipient>,
) -> Result<Vec<String>, AppError> {
    let dpi = state.canvas.dpi;
    let mut urls = Vec::with_capacity(recipients.len());

    for recipient in recipients {
        let store = state.fonts.clone();
        let ret = return_address.clone();

        let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, AppError> {
            let img = render_envelope(&recipient, &ret, dpi, &store);
            Ok(pdf::images_to_pdf(
                &[img],
                ENVELOPE_WIDTH_MM,
                ENVELOPE_HEIGHT_MM,
            )?)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

        let url = storage::upload_bytes(
            &state.s3,
            &state.config,
            storage::ENVELOPE_PREFIX,
            "pdf",
            "application/pdf",
            &bytes,
        )
        .await?;
        urls.push(url);
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_canvas_is_7_25_by_5_25_inches() {
        assert_eq!(mm_to_px(ENVELOPE_WIDTH_MM, 300), 2175);
        assert_eq!(mm_to_px(ENVELOPE_HEIGHT_MM, 300), 1575);
    }

    #[test]
    fn test_address_lines_format() {
        let r = Recipient {
            name: "Ada Lovelace".to_string(),
            street: "12 Analytical Way".to_string(),
            city: "London".to_string(),
            state: "LN".to_string(),
            zip: "10101".to_string(),
        };
        assert_eq!(
            r.address_lines(),
            ["12 Analytical Way".to_string(), "London, LN 10101".to_string()]
        );
    }

    #[test]
    fn test_pt_and_inch_scaling() {
        assert_eq!(pt_to_px(72.0, 300), 300.0);
        assert_eq!(in_to_px(1.0, 300), 300.0);
    }
}
