use ratatui::style::Style;
use ratatui::text::Span;

use crate::util::unicode;

/// Checkbox symbol for a task (markdown checkbox style)
pub(super) fn check_symbol(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Pad `spans` with `style` so they fill `width` cells, then append
/// `right` flush against the right edge if it fits.
pub(super) fn push_right_aligned<'a>(
    spans: &mut Vec<Span<'a>>,
    right: Span<'a>,
    width: usize,
    style: Style,
) {
    let used = spans_width(spans);
    let right_width = unicode::display_width(&right.content);
    if used + right_width < width {
        spans.push(Span::styled(" ".repeat(width - used - right_width), style));
        spans.push(right);
    } else if used < width {
        spans.push(Span::styled(" ".repeat(width - used), style));
    }
}

/// Split the editor buffer around its cursor: (before, under, after).
/// `under` is a single space when the cursor sits at the end.
pub(super) fn split_at_cursor(buffer: &str, cursor: usize) -> (&str, &str, &str) {
    let cursor = cursor.min(buffer.len());
    let (before, rest) = buffer.split_at(cursor);
    match unicode::next_grapheme_boundary(buffer, cursor) {
        Some(end) => (before, &buffer[cursor..end], &buffer[end..]),
        None => (before, if rest.is_empty() { " " } else { rest }, ""),
    }
}
