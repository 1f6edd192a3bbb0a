//! Font loading with a process-wide cache and a fallback chain.
//!
//! The configured card face is preferred; when it cannot be read or parsed
//! we log a warning and substitute the first loadable fallback face instead
//! of failing the request. Parsed fonts are cached behind a mutex and handed
//! out as `Arc<Font>` — immutable after load, safe for concurrent renders.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rusttype::{point, Font, Scale};
use tracing::warn;

use crate::layout::measure::TextMeasure;
use crate::render::RenderError;

/// Substitute faces tried in order when the configured font fails to load.
pub const FALLBACK_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

static FONT_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<Font<'static>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn load_cached(path: &Path) -> Result<Arc<Font<'static>>, RenderError> {
    if let Some(f) = FONT_CACHE.lock().get(path) {
        return Ok(Arc::clone(f));
    }

    let bytes = std::fs::read(path).map_err(|source| RenderError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    let font = Font::try_from_vec(bytes)
        .ok_or_else(|| RenderError::FontParse(path.to_path_buf()))?;

    let font = Arc::new(font);
    FONT_CACHE
        .lock()
        .insert(path.to_path_buf(), Arc::clone(&font));
    Ok(font)
}

/// The loaded card face. Cheap to clone; measurement goes through the
/// `TextMeasure` impl so the layout engine never sees rusttype directly.
#[derive(Clone)]
pub struct FontStore {
    font: Arc<Font<'static>>,
    path: PathBuf,
}

impl FontStore {
    /// Loads the configured face, falling back through
    /// [`FALLBACK_FONT_PATHS`] with a warning. Errors only when no face at
    /// all can be loaded.
    pub fn open(path: &Path) -> Result<Self, RenderError> {
        match load_cached(path) {
            Ok(font) => Ok(Self {
                font,
                path: path.to_path_buf(),
            }),
            Err(e) => {
                warn!("failed to load font {}: {e}; trying fallbacks", path.display());
                for fallback in FALLBACK_FONT_PATHS {
                    let fb = Path::new(fallback);
                    if let Ok(font) = load_cached(fb) {
                        warn!("using fallback font {}", fb.display());
                        return Ok(Self {
                            font,
                            path: fb.to_path_buf(),
                        });
                    }
                }
                Err(RenderError::NoUsableFont)
            }
        }
    }

    pub fn font(&self) -> &Font<'static> {
        &self.font
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextMeasure for FontStore {
    fn line_width(&self, text: &str, size_px: f32) -> f32 {
        let scale = Scale::uniform(size_px);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .map(|g| g.unpositioned().h_metrics().advance_width)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_reports_read_error() {
        let err = load_cached(Path::new("/nonexistent/face.ttf")).unwrap_err();
        assert!(matches!(err, RenderError::FontRead { .. }));
    }

    #[test]
    fn test_garbage_bytes_report_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let err = load_cached(&path).unwrap_err();
        assert!(matches!(err, RenderError::FontParse(_)));
    }
}
