// Text layout engine: canvas geometry, the measurement seam, wrapping,
// alignment, and the binary-search font sizing that makes a card fit.
// Everything here is pure and synchronous — CPU-bound callers run it inside
// tokio::task::spawn_blocking.

pub mod canvas;
pub mod engine;
pub mod measure;

// Re-export the public API consumed by other modules (render, cards, envelope).
pub use canvas::{mm_to_px, CanvasSpec, ContentArea};
pub use engine::{is_poem, lay_out, CardText, LayoutParams, LayoutResult, PlacedLine};
pub use measure::TextMeasure;
