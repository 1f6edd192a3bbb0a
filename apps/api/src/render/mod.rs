//! Rasterization: turns a [`LayoutResult`] into pixels on a card page.
//!
//! Pages are white RGB buffers; text is painted with alpha-blended rusttype
//! glyphs in the house ink color. The dual-panel helpers add the dashed
//! fold rule and the side-by-side page composite.

pub mod fonts;

use std::path::PathBuf;

use image::{imageops, imageops::FilterType, ImageBuffer, Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use thiserror::Error;

use crate::layout::{CanvasSpec, CardText, ContentArea, LayoutParams, LayoutResult};
use fonts::FontStore;

/// Card ink color, same as the legacy print pipeline.
pub const TEXT_COLOR: Rgb<u8> = Rgb([23, 89, 141]);

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

const DASH_LEN: u32 = 10;
const DASH_GAP: u32 = 10;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read font {path}: {source}")]
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse font {0}")]
    FontParse(PathBuf),

    #[error("no usable font: configured face and all fallbacks failed to load")]
    NoUsableFont,

    #[error("image encode: {0}")]
    Encode(String),
}

/// A blank white page.
pub fn blank_page(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_pixel(width, height, WHITE)
}

/// Paints one line of text with its top-left at `(x, y)`; the baseline sits
/// one ascent below. Glyph coverage is alpha-blended onto the page.
pub fn draw_text(
    img: &mut RgbImage,
    font: &Font<'_>,
    size_px: f32,
    x: f32,
    y: f32,
    color: Rgb<u8>,
    text: &str,
) {
    let scale = Scale::uniform(size_px);
    let ascent = font.v_metrics(scale).ascent;

    for glyph in font.layout(text, scale, point(x, y + ascent)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                if px >= img.width() || py >= img.height() || coverage <= 0.0 {
                    return;
                }
                let dst = img.get_pixel_mut(px, py);
                let inv = 1.0 - coverage;
                for c in 0..3 {
                    dst.0[c] = (color.0[c] as f32 * coverage + dst.0[c] as f32 * inv) as u8;
                }
            });
        }
    }
}

/// Paints every placed line of a layout onto the page in the card ink.
pub fn paint_layout(img: &mut RgbImage, layout: &LayoutResult, font: &Font<'_>) {
    for line in layout.all_lines() {
        draw_text(
            img,
            font,
            layout.font_size as f32,
            line.x,
            line.y,
            TEXT_COLOR,
            &line.text,
        );
    }
}

/// Vertical dashed rule (the fold line) at column `x`.
pub fn dashed_rule(img: &mut RgbImage, x: u32) {
    if x >= img.width() {
        return;
    }
    let mut y = 0;
    while y < img.height() {
        for dy in 0..DASH_LEN {
            if y + dy < img.height() {
                img.put_pixel(x, y + dy, BLACK);
            }
        }
        y += DASH_LEN + DASH_GAP;
    }
}

/// Renders a single-panel card page: layout, then paint.
pub fn render_card(
    text: &CardText<'_>,
    spec: &CanvasSpec,
    store: &FontStore,
    params: &LayoutParams,
) -> (RgbImage, LayoutResult) {
    let mut img = blank_page(spec.width_px(), spec.height_px());
    let area = ContentArea::single(spec.width_px(), spec.height_px());
    let layout = crate::layout::lay_out(text, &area, store, params);
    paint_layout(&mut img, &layout, store.font());
    (img, layout)
}

/// Renders the letter spread: a blank left page, the dashed fold rule at the
/// midpoint, and the card text confined to the right panel.
pub fn render_card_spread(
    text: &CardText<'_>,
    spec: &CanvasSpec,
    store: &FontStore,
    params: &LayoutParams,
) -> (RgbImage, LayoutResult) {
    let total_width = spec.spread_width_px();
    let height = spec.height_px();
    let panel_width = total_width / 2;

    let mut img = blank_page(total_width, height);
    dashed_rule(&mut img, panel_width);

    let area = ContentArea::right_panel(panel_width, height);
    let layout = crate::layout::lay_out(text, &area, store, params);
    paint_layout(&mut img, &layout, store.font());
    (img, layout)
}

/// Composes two images side by side on a spread page (last page on the
/// left, thumbnail on the right), separated by the dashed fold rule. Both
/// panels are resized to the nominal page size.
pub fn compose_pages(left: &RgbImage, right: &RgbImage, spec: &CanvasSpec) -> RgbImage {
    let panel_w = spec.width_px();
    let panel_h = spec.height_px();
    let total_width = spec.spread_width_px();

    let left = imageops::resize(left, panel_w, panel_h, FilterType::Lanczos3);
    let right = imageops::resize(right, panel_w, panel_h, FilterType::Lanczos3);

    let mut out = blank_page(total_width, panel_h);
    imageops::replace(&mut out, &left, 0, 0);
    imageops::replace(&mut out, &right, (total_width - panel_w) as i64, 0);
    dashed_rule(&mut out, total_width / 2);
    out
}

/// Encodes a page as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, RenderError> {
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_page_is_white() {
        let img = blank_page(4, 4);
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_dashed_rule_alternates() {
        let mut img = blank_page(3, 60);
        dashed_rule(&mut img, 1);
        // First dash covers rows 0..10, then a 10 px gap, then dash again.
        assert_eq!(*img.get_pixel(1, 0), BLACK);
        assert_eq!(*img.get_pixel(1, 9), BLACK);
        assert_eq!(*img.get_pixel(1, 10), WHITE);
        assert_eq!(*img.get_pixel(1, 19), WHITE);
        assert_eq!(*img.get_pixel(1, 20), BLACK);
        // Neighbor columns untouched.
        assert_eq!(*img.get_pixel(0, 0), WHITE);
        assert_eq!(*img.get_pixel(2, 0), WHITE);
    }

    #[test]
    fn test_compose_pages_dimensions_and_rule() {
        let spec = CanvasSpec {
            width_mm: 25.4,
            height_mm: 25.4,
            dpi: 100,
        };
        let left = blank_page(10, 10);
        let right = blank_page(200, 200);
        let out = compose_pages(&left, &right, &spec);
        assert_eq!(out.width(), 200);
        assert_eq!(out.height(), 100);
        // Fold rule at the midpoint.
        assert_eq!(*out.get_pixel(100, 0), BLACK);
    }

    #[test]
    fn test_encode_png_magic_bytes() {
        let img = blank_page(2, 2);
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
