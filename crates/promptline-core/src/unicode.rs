//! Code-point indexing helpers.
//!
//! Every offset handled by the editing core is a rune (code point) index, never
//! a byte index. These helpers translate between the two so multi-byte input
//! can never split a character.

use unicode_width::UnicodeWidthStr;

/// Number of runes in `s`.
///
/// ```
/// use promptline_core::unicode::rune_count;
///
/// assert_eq!(rune_count("héllo"), 5);
/// assert_eq!(rune_count("日本語"), 3);
/// ```
pub fn rune_count(s: &str) -> usize {
    s.chars().count()
}

/// Terminal column width of `s` (wide CJK runes count as two columns).
pub fn display_width(s: &str) -> usize {
    s.width()
}

/// Byte offset of the rune at `rune_index`, or `s.len()` past the end.
pub fn byte_index(s: &str, rune_index: usize) -> usize {
    s.char_indices()
        .nth(rune_index)
        .map_or(s.len(), |(byte_idx, _)| byte_idx)
}

/// Substring between two rune indices (`start` inclusive, `end` exclusive).
///
/// Out-of-range indices are clamped; an inverted range yields `""`.
///
/// ```
/// use promptline_core::unicode::rune_slice;
///
/// assert_eq!(rune_slice("日本語です", 1, 3), "本語");
/// assert_eq!(rune_slice("abc", 2, 99), "c");
/// assert_eq!(rune_slice("abc", 2, 1), "");
/// ```
pub fn rune_slice(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let start_byte = byte_index(s, start);
    let end_byte = byte_index(s, end);
    &s[start_byte..end_byte]
}

/// Split `s` at a rune index, clamping past-the-end indices.
pub fn split_at_rune(s: &str, rune_index: usize) -> (&str, &str) {
    s.split_at(byte_index(s, rune_index))
}

/// Rune at `index`, if any.
pub fn char_at(s: &str, index: usize) -> Option<char> {
    s.chars().nth(index)
}

/// True when every rune of `s` can be inserted as literal text.
///
/// Tabs and newlines are accepted; every other control rune is rejected.
pub fn is_printable(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_literal)
}

/// `s` without the runes [`is_printable`] rejects.
///
/// ```
/// use promptline_core::unicode::strip_control;
///
/// assert_eq!(strip_control("a\x07b\tc\x1b[0m"), "ab\tc[0m");
/// ```
pub fn strip_control(s: &str) -> String {
    s.chars().filter(|&c| is_literal(c)).collect()
}

fn is_literal(c: char) -> bool {
    !c.is_control() || c == '\t' || c == '\n'
}
