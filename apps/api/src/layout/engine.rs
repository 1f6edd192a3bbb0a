//! The text-fitting core: splits the three card blocks into display lines,
//! finds the largest font size at which everything fits the usable area via
//! binary search, and emits absolute pixel positions for every line.
//!
//! The whole module is a pure function of its inputs — no I/O, no globals,
//! no randomness — so identical requests always produce identical cards.

use tracing::debug;

use super::canvas::ContentArea;
use super::measure::TextMeasure;

/// A body with more than this many newline characters is treated as a poem.
pub const POEM_NEWLINE_THRESHOLD: usize = 2;

/// Poem vs prose classification for the body block.
///
/// Heuristic, not a structural guarantee: raw newline count decides. Kept
/// behind this one predicate so the policy can change without touching the
/// layout algorithm.
pub fn is_poem(body: &str) -> bool {
    body.matches('\n').count() > POEM_NEWLINE_THRESHOLD
}

/// How a raw string becomes display lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeMode {
    /// Greedy word wrap to the maximum width; original line breaks ignored.
    Wrap,
    /// Split on explicit newlines, trim each line, drop empties.
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Search bounds and spacing policy for the font-size search.
///
/// Constructed explicitly and passed in (never read from globals) so tests
/// can run in parallel with different settings.
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub min_font_size: u32,
    pub max_font_size: u32,
    pub line_spacing_factor: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            min_font_size: 10,
            max_font_size: 1000,
            line_spacing_factor: 1.4,
        }
    }
}

/// The three text blocks of a card.
#[derive(Debug, Clone, Copy)]
pub struct CardText<'a> {
    pub greeting: &'a str,
    pub body: &'a str,
    pub signoff: &'a str,
}

/// Lines produced for one block at one candidate size.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSet {
    pub lines: Vec<String>,
    pub widths: Vec<f32>,
    pub max_line_width: f32,
    pub fits_width: bool,
}

impl LineSet {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// A display line with its absolute canvas position (top-left of the line
/// box; the painter adds the font ascent to reach the baseline).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// The layout contract: chosen size, spacing, positioned lines per block,
/// and whether the text actually fits. `fits == false` means the search
/// fell back to the minimum size and the card will overflow; callers decide
/// whether that is acceptable.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub font_size: u32,
    pub line_spacing: f32,
    pub fits: bool,
    pub greeting: Vec<PlacedLine>,
    pub body: Vec<PlacedLine>,
    pub signoff: Vec<PlacedLine>,
}

impl LayoutResult {
    /// All placed lines in paint order.
    pub fn all_lines(&self) -> impl Iterator<Item = &PlacedLine> {
        self.greeting
            .iter()
            .chain(self.body.iter())
            .chain(self.signoff.iter())
    }
}

/// Splits `text` into display lines no wider than `max_width` at `size_px`.
///
/// Wrap mode packs whitespace-separated words greedily; the candidate line
/// is measured as the joined string, spaces included. A single word wider
/// than `max_width` still gets its own line — no hyphenation, the overflow
/// is reported through `fits_width` instead.
pub fn split_lines(
    text: &str,
    measure: &dyn TextMeasure,
    size_px: f32,
    max_width: f32,
    mode: ShapeMode,
) -> LineSet {
    let lines: Vec<String> = match mode {
        ShapeMode::Preserve => text
            .split('\n')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect(),
        ShapeMode::Wrap => {
            let mut lines = Vec::new();
            let mut current = String::new();
            for word in text.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_owned()
                } else {
                    format!("{current} {word}")
                };
                if measure.line_width(&candidate, size_px) <= max_width {
                    current = candidate;
                } else {
                    if !current.is_empty() {
                        lines.push(current);
                    }
                    current = word.to_owned();
                }
            }
            if !current.is_empty() {
                lines.push(current);
            }
            lines
        }
    };

    let widths: Vec<f32> = lines
        .iter()
        .map(|l| measure.line_width(l, size_px))
        .collect();
    // Empty input yields no lines and trivially fits.
    let max_line_width = widths.iter().copied().fold(0.0_f32, f32::max);
    LineSet {
        fits_width: max_line_width <= max_width,
        lines,
        widths,
        max_line_width,
    }
}

/// Absolute x-position of each line under the given alignment, measured
/// from the canvas edge (panel offset + margin + alignment shift).
fn x_positions(set: &LineSet, align: Align, area: &ContentArea) -> Vec<f32> {
    set.widths
        .iter()
        .map(|&w| {
            let rel = match align {
                Align::Left => 0.0,
                // Clamp so zero/over-wide lines sit on the margin instead of
                // drifting left of it.
                Align::Center => ((area.max_width - w) / 2.0).max(0.0),
                Align::Right => area.max_width - w,
            };
            area.left_edge() + rel
        })
        .collect()
}

/// Lines for all three blocks at one candidate size. Greeting always wraps,
/// the body wraps or preserves depending on the poem classification, and the
/// sign-off always preserves its explicit breaks.
fn split_blocks(
    text: &CardText<'_>,
    measure: &dyn TextMeasure,
    size_px: f32,
    max_width: f32,
    poem: bool,
) -> (LineSet, LineSet, LineSet) {
    let body_mode = if poem {
        ShapeMode::Preserve
    } else {
        ShapeMode::Wrap
    };
    (
        split_lines(text.greeting, measure, size_px, max_width, ShapeMode::Wrap),
        split_lines(text.body, measure, size_px, max_width, body_mode),
        split_lines(text.signoff, measure, size_px, max_width, ShapeMode::Preserve),
    )
}

/// Total height of the composed card at one candidate: all block lines plus
/// the two blank separator lines between blocks, times the line spacing.
fn total_height(
    greeting: &LineSet,
    body: &LineSet,
    signoff: &LineSet,
    line_spacing: f32,
) -> f32 {
    let total_lines = greeting.line_count() + body.line_count() + signoff.line_count() + 2;
    total_lines as f32 * line_spacing
}

/// Binary search for the largest integer font size whose composed layout
/// fits the usable height AND whose body lines all fit the usable width.
///
/// Measuring line widths is the expensive step, so the search does
/// O(log(max - min)) measurements instead of a linear scan. Correctness
/// rests on monotonicity: line count never decreases and line spacing
/// strictly increases with size, so total height is non-decreasing.
///
/// Returns `(size, true)` for the best fitting size, or
/// `(min_font_size, false)` when even the minimum overflows — rendering
/// proceeds best-effort and the caller sees the overflow through the flag.
fn find_font_size(
    text: &CardText<'_>,
    area: &ContentArea,
    measure: &dyn TextMeasure,
    params: &LayoutParams,
    poem: bool,
) -> (u32, bool) {
    let mut left = params.min_font_size;
    let mut right = params.max_font_size;
    let mut best = None;

    while left <= right {
        let mid = left + (right - left) / 2;
        let line_spacing = mid as f32 * params.line_spacing_factor;
        let (greeting, body, signoff) =
            split_blocks(text, measure, mid as f32, area.max_width, poem);
        let height = total_height(&greeting, &body, &signoff, line_spacing);

        debug!(
            size = mid,
            height,
            body_fits = body.fits_width,
            "font size candidate"
        );

        if height <= area.usable_height && body.fits_width {
            best = Some(mid);
            left = mid + 1;
        } else {
            if mid == 0 {
                break;
            }
            right = mid - 1;
        }
    }

    match best {
        Some(size) => (size, true),
        None => (params.min_font_size, false),
    }
}

/// Lays the three blocks out on the content area: picks the font size, then
/// vertically centers the whole text block and positions every line.
///
/// Order top-down: greeting, one blank line-spacing gap, body, another gap,
/// sign-off. Greeting is left-aligned, the body is centered when classified
/// as a poem, and the sign-off is right-aligned.
pub fn lay_out(
    text: &CardText<'_>,
    area: &ContentArea,
    measure: &dyn TextMeasure,
    params: &LayoutParams,
) -> LayoutResult {
    let poem = is_poem(text.body);
    let (font_size, fits) = find_font_size(text, area, measure, params, poem);
    let line_spacing = font_size as f32 * params.line_spacing_factor;

    let (greeting, body, signoff) =
        split_blocks(text, measure, font_size as f32, area.max_width, poem);

    let height = total_height(&greeting, &body, &signoff, line_spacing);
    // Centers the block; goes negative on overflow and the painter clips.
    let start_y = area.height_margin + (area.usable_height - height) / 2.0;

    debug!(
        font_size,
        fits, poem, height, start_y, "layout composed"
    );

    let body_align = if poem { Align::Center } else { Align::Left };
    let mut y = start_y;
    let place = |set: &LineSet, align: Align, y: &mut f32| -> Vec<PlacedLine> {
        let placed = set
            .lines
            .iter()
            .zip(x_positions(set, align, area))
            .map(|(line, x)| {
                let p = PlacedLine {
                    text: line.clone(),
                    x,
                    y: *y,
                };
                *y += line_spacing;
                p
            })
            .collect();
        // Blank separator line after the block.
        *y += line_spacing;
        placed
    };

    let greeting = place(&greeting, Align::Left, &mut y);
    let body = place(&body, body_align, &mut y);
    let signoff = place(&signoff, Align::Right, &mut y);

    LayoutResult {
        font_size,
        line_spacing,
        fits,
        greeting,
        body,
        signoff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::canvas::ContentArea;
    use crate::layout::measure::testing::CharGrid;

    fn area() -> ContentArea {
        // Default 127mm x 177.8mm card at 300 dpi.
        ContentArea::single(1500, 2100)
    }

    fn sample() -> CardText<'static> {
        CardText {
            greeting: "Dear Brother,",
            body: "Wishing you a wonderful day filled with joy and laughter.",
            signoff: "Yours,\nMatti",
        }
    }

    /// Height at the chosen size must satisfy the acceptance predicate while
    /// size + 1 must violate it — i.e. the search really found the maximum.
    fn accepted(text: &CardText<'_>, area: &ContentArea, params: &LayoutParams, size: u32) -> bool {
        let poem = is_poem(text.body);
        let spacing = size as f32 * params.line_spacing_factor;
        let (g, b, s) = split_blocks(text, &CharGrid, size as f32, area.max_width, poem);
        total_height(&g, &b, &s, spacing) <= area.usable_height && b.fits_width
    }

    #[test]
    fn test_poem_classification_threshold() {
        // Exactly 3 newlines => poem; exactly 2 => prose.
        assert!(is_poem("a\nb\nc\nd"));
        assert!(!is_poem("a\nb\nc"));
        assert!(!is_poem(""));
    }

    #[test]
    fn test_wrap_empty_text_yields_no_lines_and_fits() {
        let set = split_lines("", &CharGrid, 50.0, 1000.0, ShapeMode::Wrap);
        assert!(set.lines.is_empty());
        assert_eq!(set.max_line_width, 0.0);
        assert!(set.fits_width);
    }

    #[test]
    fn test_wrap_packs_greedily() {
        // At size 10 each char is 6px: "aaaa bbbb" = 9 chars = 54px fits
        // max 56, adding " cccc" (14 chars = 84px) does not.
        let set = split_lines("aaaa bbbb cccc", &CharGrid, 10.0, 56.0, ShapeMode::Wrap);
        assert_eq!(set.lines, vec!["aaaa bbbb".to_string(), "cccc".to_string()]);
        assert!(set.fits_width);
    }

    #[test]
    fn test_wrap_exact_fit_boundary() {
        // A candidate exactly at max_width is kept on the line (<=, not <).
        let set = split_lines("aa bb", &CharGrid, 10.0, 30.0, ShapeMode::Wrap);
        assert_eq!(set.lines, vec!["aa bb".to_string()]);
    }

    #[test]
    fn test_overwide_word_alone_on_line() {
        // "ccccccccc" is 54px at size 10, wider than max 30. It must still
        // be emitted alone, with fits_width = false.
        let set = split_lines("aa ccccccccc bb", &CharGrid, 10.0, 30.0, ShapeMode::Wrap);
        assert_eq!(
            set.lines,
            vec!["aa".to_string(), "ccccccccc".to_string(), "bb".to_string()]
        );
        assert!(!set.fits_width);
    }

    #[test]
    fn test_preserve_trims_and_drops_empty_lines() {
        let set = split_lines(
            "  Yours,  \n\n   Matti\n",
            &CharGrid,
            10.0,
            1000.0,
            ShapeMode::Preserve,
        );
        assert_eq!(set.lines, vec!["Yours,".to_string(), "Matti".to_string()]);
    }

    #[test]
    fn test_total_height_is_monotonic_in_font_size() {
        let text = sample();
        let area = area();
        let params = LayoutParams::default();
        let mut prev = 0.0_f32;
        for size in (10..400).step_by(7) {
            let poem = is_poem(text.body);
            let spacing = size as f32 * params.line_spacing_factor;
            let (g, b, s) = split_blocks(&text, &CharGrid, size as f32, area.max_width, poem);
            let h = total_height(&g, &b, &s, spacing);
            assert!(
                h >= prev,
                "height decreased from {prev} to {h} at size {size}"
            );
            prev = h;
        }
    }

    #[test]
    fn test_lay_out_is_deterministic() {
        let text = sample();
        let params = LayoutParams::default();
        let a = lay_out(&text, &area(), &CharGrid, &params);
        let b = lay_out(&text, &area(), &CharGrid, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_prose_card_scenario() {
        let text = sample();
        let area = area();
        let params = LayoutParams::default();
        let result = lay_out(&text, &area, &CharGrid, &params);

        assert!(result.fits);
        // Body has no newlines => prose => left-aligned at the margin.
        assert!(!is_poem(text.body));
        for line in &result.body {
            assert_eq!(line.x, area.left_edge());
        }

        // Sign-off preserves its explicit break: two right-aligned lines
        // whose right edges coincide at margin + max_width.
        assert_eq!(result.signoff.len(), 2);
        assert_eq!(result.signoff[0].text, "Yours,");
        assert_eq!(result.signoff[1].text, "Matti");
        let right_edge = area.left_edge() + area.max_width;
        for line in &result.signoff {
            let w = CharGrid.line_width(&line.text, result.font_size as f32);
            assert!((line.x + w - right_edge).abs() < 0.001);
        }

        // The chosen size is the largest acceptable integer in range.
        assert!(accepted(&text, &area, &params, result.font_size));
        assert!(!accepted(&text, &area, &params, result.font_size + 1));
    }

    #[test]
    fn test_poem_card_scenario() {
        let text = CardText {
            greeting: "Dear Sis,",
            body: "Roses are red\nViolets are blue\nSugar is sweet\nAnd so are you",
            signoff: "Love,\nMe",
        };
        let area = area();
        let result = lay_out(&text, &area, &CharGrid, &LayoutParams::default());

        assert!(is_poem(text.body));
        assert_eq!(result.body.len(), 4);
        for line in &result.body {
            let w = CharGrid.line_width(&line.text, result.font_size as f32);
            let expected = area.left_edge() + (area.max_width - w) / 2.0;
            assert!((line.x - expected).abs() < 0.001, "line not centered");
        }
    }

    #[test]
    fn test_empty_signoff_still_counts_the_two_gaps() {
        let text = CardText {
            greeting: "Hi",
            body: "Short note.",
            signoff: "",
        };
        let area = area();
        let params = LayoutParams::default();
        let result = lay_out(&text, &area, &CharGrid, &params);

        assert!(result.signoff.is_empty());
        // total_lines = greeting + body + 0 + 2; reconstruct the height the
        // search used and check it against the acceptance predicate.
        let total = result.greeting.len() + result.body.len() + 2;
        let height = total as f32 * result.line_spacing;
        assert!(height <= area.usable_height);
    }

    #[test]
    fn test_unfittable_word_falls_back_to_min_size_without_fits() {
        // One word so wide it exceeds max_width even at the minimum size:
        // at size 10 each char is 6px, so 200 chars = 1200px > 1050px.
        let wide = "x".repeat(200);
        let text = CardText {
            greeting: "",
            body: &wide,
            signoff: "",
        };
        let params = LayoutParams::default();
        let result = lay_out(&text, &area(), &CharGrid, &params);

        assert_eq!(result.font_size, params.min_font_size);
        assert!(!result.fits);
        // The word is still laid out alone on its line, best-effort.
        assert_eq!(result.body.len(), 1);
    }

    #[test]
    fn test_blocks_are_stacked_with_gaps() {
        let text = sample();
        let result = lay_out(&text, &area(), &CharGrid, &LayoutParams::default());
        let spacing = result.line_spacing;

        // Consecutive lines within a block are one spacing apart.
        for block in [&result.greeting, &result.body, &result.signoff] {
            for pair in block.windows(2) {
                assert!((pair[1].y - pair[0].y - spacing).abs() < 0.001);
            }
        }
        // Between blocks there is exactly one blank line: last greeting line
        // to first body line is 2 spacings.
        let last_greeting = result.greeting.last().unwrap();
        let first_body = result.body.first().unwrap();
        assert!((first_body.y - last_greeting.y - 2.0 * spacing).abs() < 0.001);
    }

    #[test]
    fn test_right_panel_offsets_every_line() {
        let text = sample();
        let single = lay_out(
            &text,
            &ContentArea::single(1500, 2100),
            &CharGrid,
            &LayoutParams::default(),
        );
        let spread = lay_out(
            &text,
            &ContentArea::right_panel(1500, 2100),
            &CharGrid,
            &LayoutParams::default(),
        );

        assert_eq!(single.font_size, spread.font_size);
        for (a, b) in single.all_lines().zip(spread.all_lines()) {
            assert_eq!(a.text, b.text);
            assert!((b.x - a.x - 1500.0).abs() < 0.001);
            assert_eq!(a.y, b.y);
        }
    }
}
