//! Text Module
//!
//! Flat text projection of a node tree and the mapping back from flat char
//! offsets to (node, offset) ranges.
//!
//! All offsets in this module count chars, not bytes.

pub mod offset_map;
pub mod range;

pub use offset_map::{find_last_not_greater_than, text_content, TextContentOffsetMap};
pub use range::{range_from_text_offsets, BoundaryPoint, TextRange};

/// Byte index of the char at `char_idx`, or `s.len()` past the end
#[inline]
pub(crate) fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(pos, _)| pos)
}

/// Substring by char positions, clamped to the string
pub(crate) fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let from = char_to_byte(s, start);
    let to = char_to_byte(s, end).max(from);
    &s[from..to]
}

/// Suffix starting at char position `start`
pub(crate) fn char_tail(s: &str, start: usize) -> &str {
    &s[char_to_byte(s, start)..]
}
