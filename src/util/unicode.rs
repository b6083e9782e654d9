//! Terminal-cell and grapheme helpers for the single-line task editor.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate to at most `max_cells` cells, ending in `…` when cut.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let budget = max_cells - 1;
    let mut used = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let w = display_width(g);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push('\u{2026}');
    out
}

/// Byte offset of the grapheme after the one at `offset`, or None at the end.
pub fn next_grapheme_boundary(s: &str, offset: usize) -> Option<usize> {
    let rest = s.get(offset..).filter(|r| !r.is_empty())?;
    let g = rest.graphemes(true).next()?;
    Some(offset + g.len())
}

/// Byte offset of the grapheme before `offset`, or None at the start.
pub fn prev_grapheme_boundary(s: &str, offset: usize) -> Option<usize> {
    let head = s.get(..offset).filter(|h| !h.is_empty())?;
    let g = head.graphemes(true).next_back()?;
    Some(offset - g.len())
}

fn is_space(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}

/// Start of the word left of `offset` (skips whitespace first).
pub fn word_boundary_left(s: &str, offset: usize) -> usize {
    let head = &s[..offset.min(s.len())];
    let mut pos = head.len();
    let mut seen_word = false;
    for (i, g) in head.grapheme_indices(true).rev() {
        if is_space(g) {
            if seen_word {
                break;
            }
        } else {
            seen_word = true;
        }
        pos = i;
    }
    pos
}

/// Start of the next word right of `offset`, or the end of the string.
pub fn word_boundary_right(s: &str, offset: usize) -> usize {
    let start = offset.min(s.len());
    let mut seen_space = false;
    for (i, g) in s[start..].grapheme_indices(true) {
        if is_space(g) {
            seen_space = true;
        } else if seen_space {
            return start + i;
        }
    }
    s.len()
}
