//! # Page Break Decisions
//!
//! The two small rules the row engine applies before drawing anything:
//! how tall a cell must be to hold its text, and whether that height still
//! fits above the bottom margin.

/// Decide what to do with a row at the current cursor position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakDecision {
    /// The row's minimum height fits on the current page.
    Place,
    /// Nothing of the row can be drawn here; retry it on the next page.
    MoveToNextPage,
}

/// Compare the space left on the page against the height a row needs.
/// Equal is a fit.
pub fn decide_break(remaining_height: f64, required_height: f64) -> BreakDecision {
    if remaining_height < required_height {
        BreakDecision::MoveToNextPage
    } else {
        BreakDecision::Place
    }
}

/// Estimated number of wrapped lines for text of `text_width` in a column
/// of `column_width`.
pub fn lines_needed(text_width: f64, column_width: f64) -> usize {
    if column_width <= 0.0 {
        return 1;
    }
    // Float-to-int casts saturate, so an infinite width lands on usize::MAX.
    ((text_width / column_width).floor() as usize).saturating_add(1)
}

/// Minimum cell height for `lines` lines of text.
pub fn cell_height(lines: usize, line_height: f64) -> f64 {
    lines as f64 * line_height
}
