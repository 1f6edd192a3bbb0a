//! Physical canvas geometry: millimeter page sizes, pixel conversion, and
//! the margin math that defines the usable content rectangle.

use serde::{Deserialize, Serialize};

/// Margins take this fraction of the canvas width/height on every side.
/// Fixed policy constant — not configurable per call.
pub const MARGIN_FRACTION: f64 = 0.15;

/// Converts millimeters to pixels at the given resolution.
///
/// Invariant: `width_px = round(width_mm / 25.4 * dpi)`.
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    (mm / 25.4 * dpi as f64).round() as u32
}

/// A card page in physical units, convertible to pixels at its resolution.
///
/// The default is the production card stock: 127mm × 177.8mm at 300 dpi
/// (1500 × 2100 px).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    pub dpi: u32,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width_mm: 127.0,
            height_mm: 177.8,
            dpi: 300,
        }
    }
}

impl CanvasSpec {
    pub fn width_px(&self) -> u32 {
        mm_to_px(self.width_mm, self.dpi)
    }

    pub fn height_px(&self) -> u32 {
        mm_to_px(self.height_mm, self.dpi)
    }

    /// Width of a dual-panel spread (two pages side by side).
    pub fn spread_width_px(&self) -> u32 {
        mm_to_px(self.width_mm * 2.0, self.dpi)
    }
}

/// The usable content rectangle after margins, plus the horizontal offset of
/// the panel it lives in. All line x-positions are relative to the usable
/// area (offset + margin), which is what lets a spread confine text to its
/// right half without touching the layout algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentArea {
    /// Left edge of the panel on the full canvas (0 for a single page,
    /// the midpoint for the right half of a spread).
    pub x_offset: f32,
    pub width_margin: f32,
    pub height_margin: f32,
    /// Maximum line width inside the margins.
    pub max_width: f32,
    pub usable_height: f32,
}

impl ContentArea {
    /// Content area of a single full-width page.
    pub fn single(width_px: u32, height_px: u32) -> Self {
        Self::panel(0.0, width_px, height_px)
    }

    /// Content area of the right panel of a dual spread. `panel_width_px` is
    /// the width of ONE panel (half the spread); margins are computed from
    /// the panel, so the text block sits inside the right page exactly as it
    /// would on a single page.
    pub fn right_panel(panel_width_px: u32, height_px: u32) -> Self {
        Self::panel(panel_width_px as f32, panel_width_px, height_px)
    }

    fn panel(x_offset: f32, panel_width_px: u32, height_px: u32) -> Self {
        let width_margin = (panel_width_px as f64 * MARGIN_FRACTION).floor() as f32;
        let height_margin = (height_px as f64 * MARGIN_FRACTION).floor() as f32;
        Self {
            x_offset,
            width_margin,
            height_margin,
            max_width: panel_width_px as f32 - 2.0 * width_margin,
            usable_height: height_px as f32 - 2.0 * height_margin,
        }
    }

    /// Absolute x of the usable area's left edge on the canvas.
    pub fn left_edge(&self) -> f32 {
        self.x_offset + self.width_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_canvas_is_1500_by_2100_px() {
        let spec = CanvasSpec::default();
        assert_eq!(spec.width_px(), 1500);
        assert_eq!(spec.height_px(), 2100);
        assert_eq!(spec.spread_width_px(), 3000);
    }

    #[test]
    fn test_mm_to_px_rounds() {
        // 10mm at 300dpi = 118.11 px -> 118
        assert_eq!(mm_to_px(10.0, 300), 118);
        // 25.4mm is exactly one inch
        assert_eq!(mm_to_px(25.4, 300), 300);
    }

    #[test]
    fn test_single_panel_margins() {
        let area = ContentArea::single(1500, 2100);
        assert_eq!(area.x_offset, 0.0);
        assert_eq!(area.width_margin, 225.0);
        assert_eq!(area.height_margin, 315.0);
        assert_eq!(area.max_width, 1050.0);
        assert_eq!(area.usable_height, 1470.0);
        assert_eq!(area.left_edge(), 225.0);
    }

    #[test]
    fn test_right_panel_is_offset_single_panel() {
        let single = ContentArea::single(1500, 2100);
        let right = ContentArea::right_panel(1500, 2100);
        assert_eq!(right.x_offset, 1500.0);
        assert_eq!(right.max_width, single.max_width);
        assert_eq!(right.usable_height, single.usable_height);
        assert_eq!(right.left_edge(), 1725.0);
    }
}
