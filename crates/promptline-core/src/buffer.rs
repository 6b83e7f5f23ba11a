//! Mutable line buffer.
//!
//! The Buffer owns the text being edited and the cursor. Every mutation
//! re-clamps the cursor into `0..=len(text)`, so no operation here can fail:
//! running out of text is a silent no-op.

use crate::document::{Document, WordSeparators};
use crate::unicode;

/// The line being edited plus its cursor.
///
/// All positions are rune indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    text: String,
    cursor_position: usize,
    /// Column kept across consecutive vertical moves.
    preferred_column: Option<usize>,
}

impl Buffer {
    /// Create a new empty buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::Buffer;
    ///
    /// let buffer = Buffer::new();
    /// assert_eq!(buffer.text(), "");
    /// assert_eq!(buffer.cursor_position(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current cursor position as a rune index.
    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn preferred_column(&self) -> Option<usize> {
        self.preferred_column
    }

    /// Length of the text in runes.
    pub fn len(&self) -> usize {
        unicode::rune_count(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Snapshot of the text and cursor for read-only analysis.
    pub fn document(&self) -> Document {
        Document::with_text(self.text.clone(), self.cursor_position)
    }

    /// Cursor offset in terminal columns.
    pub fn display_cursor_position(&self) -> usize {
        unicode::display_width(self.text_before_cursor())
    }

    pub fn text_before_cursor(&self) -> &str {
        unicode::split_at_rune(&self.text, self.cursor_position).0
    }

    pub fn text_after_cursor(&self) -> &str {
        unicode::split_at_rune(&self.text, self.cursor_position).1
    }

    /// Replace the whole text and put the cursor at its end.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::Buffer;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.set_text("ls -la");
    /// assert_eq!(buffer.cursor_position(), 6);
    /// ```
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor_position = self.len();
        self.preferred_column = None;
    }

    /// Move the cursor, clamping to the text bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::Buffer;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.set_text("hello world");
    ///
    /// buffer.set_cursor_position(5);
    /// assert_eq!(buffer.cursor_position(), 5);
    ///
    /// buffer.set_cursor_position(100);
    /// assert_eq!(buffer.cursor_position(), 11);
    /// ```
    pub fn set_cursor_position(&mut self, position: usize) {
        self.cursor_position = position.min(self.len());
        self.preferred_column = None;
    }

    /// Clear text, cursor and preferred column.
    pub fn reset(&mut self) {
        *self = Buffer::new();
    }

    /// Insert text at the cursor.
    ///
    /// With `overwrite`, the inserted runes replace the same number of runes
    /// after the cursor (never past the end of the text). With `move_cursor`
    /// false the cursor stays where it was, which is what previews use.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::Buffer;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.set_text("hello world");
    /// buffer.set_cursor_position(5);
    ///
    /// buffer.insert_text(" beautiful", false, true);
    /// assert_eq!(buffer.text(), "hello beautiful world");
    /// assert_eq!(buffer.cursor_position(), 15);
    ///
    /// buffer.set_cursor_position(6);
    /// buffer.insert_text("BEAU", true, false);
    /// assert_eq!(buffer.text(), "hello BEAUtiful world");
    /// assert_eq!(buffer.cursor_position(), 6);
    /// ```
    pub fn insert_text(&mut self, text: &str, overwrite: bool, move_cursor: bool) {
        let inserted = unicode::rune_count(text);
        let len = self.len();
        let cursor = self.cursor_position.min(len);

        let before = unicode::rune_slice(&self.text, 0, cursor);
        let resume = if overwrite {
            (cursor + inserted).min(len)
        } else {
            cursor
        };
        let after = unicode::rune_slice(&self.text, resume, len);

        self.text = format!("{before}{text}{after}");
        self.cursor_position = if move_cursor { cursor + inserted } else { cursor };
        self.preferred_column = None;
    }

    /// Delete up to `count` runes before the cursor and return them.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::Buffer;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.set_text("hello world");
    /// buffer.set_cursor_position(5);
    ///
    /// assert_eq!(buffer.delete_before_cursor(2), "lo");
    /// assert_eq!(buffer.text(), "hel world");
    /// assert_eq!(buffer.cursor_position(), 3);
    /// assert_eq!(buffer.delete_before_cursor(50), "hel");
    /// assert_eq!(buffer.delete_before_cursor(1), "");
    /// ```
    pub fn delete_before_cursor(&mut self, count: usize) -> String {
        let cursor = self.cursor_position;
        let start = cursor.saturating_sub(count);
        if start == cursor {
            return String::new();
        }

        let deleted = unicode::rune_slice(&self.text, start, cursor).to_string();
        let len = self.len();
        self.text = format!(
            "{}{}",
            unicode::rune_slice(&self.text, 0, start),
            unicode::rune_slice(&self.text, cursor, len)
        );
        self.cursor_position = start;
        self.preferred_column = None;
        deleted
    }

    /// Delete up to `count` runes after the cursor and return them.
    pub fn delete(&mut self, count: usize) -> String {
        let cursor = self.cursor_position;
        let len = self.len();
        let end = cursor.saturating_add(count).min(len);
        if end == cursor {
            return String::new();
        }

        let deleted = unicode::rune_slice(&self.text, cursor, end).to_string();
        self.text = format!(
            "{}{}",
            unicode::rune_slice(&self.text, 0, cursor),
            unicode::rune_slice(&self.text, end, len)
        );
        self.preferred_column = None;
        deleted
    }

    /// Move the cursor left, stopping at the start of the current line.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::Buffer;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.set_text("ab\ncdef");
    /// buffer.cursor_left(2);
    /// assert_eq!(buffer.cursor_position(), 5);
    ///
    /// buffer.cursor_left(10);
    /// assert_eq!(buffer.cursor_position(), 3);
    /// ```
    pub fn cursor_left(&mut self, count: usize) {
        let available = unicode::rune_count(self.document().current_line_before_cursor());
        self.cursor_position -= count.min(available);
        self.preferred_column = None;
    }

    /// Move the cursor right, stopping at the end of the current line.
    pub fn cursor_right(&mut self, count: usize) {
        let available = unicode::rune_count(self.document().current_line_after_cursor());
        self.cursor_position += count.min(available);
        self.preferred_column = None;
    }

    /// Move up `count` visual lines, keeping the preferred column.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::Buffer;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.set_text("line1\nab\nline3");
    /// buffer.set_cursor_position(13);
    ///
    /// buffer.cursor_up(1);
    /// assert_eq!(buffer.cursor_position(), 8);
    /// buffer.cursor_up(1);
    /// assert_eq!(buffer.cursor_position(), 4);
    /// ```
    pub fn cursor_up(&mut self, count: usize) {
        let doc = self.document();
        let column = *self
            .preferred_column
            .get_or_insert_with(|| doc.cursor_position_col());
        self.cursor_position = doc.cursor_up_position(count, Some(column));
    }

    /// Move down `count` visual lines, keeping the preferred column.
    pub fn cursor_down(&mut self, count: usize) {
        let doc = self.document();
        let column = *self
            .preferred_column
            .get_or_insert_with(|| doc.cursor_position_col());
        self.cursor_position = doc.cursor_down_position(count, Some(column));
    }

    /// Move to the start of the previous word.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::{Buffer, WordSeparators};
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.set_text("foo bar  baz");
    ///
    /// buffer.move_to_start_of_word(&WordSeparators::Whitespace);
    /// assert_eq!(buffer.cursor_position(), 9);
    /// buffer.move_to_start_of_word(&WordSeparators::Whitespace);
    /// assert_eq!(buffer.cursor_position(), 4);
    /// ```
    pub fn move_to_start_of_word(&mut self, separators: &WordSeparators) {
        let distance = self.document().find_start_of_previous_word(separators);
        self.cursor_position -= distance;
        self.preferred_column = None;
    }

    /// Move to the end of the next word.
    pub fn move_to_end_of_word(&mut self, separators: &WordSeparators) {
        let distance = self.document().find_end_of_current_word(separators);
        self.cursor_position += distance;
        self.preferred_column = None;
    }

    /// Delete from the start of the previous word up to the cursor.
    pub fn delete_word_before_cursor(&mut self, separators: &WordSeparators) -> String {
        let distance = self.document().find_start_of_previous_word(separators);
        self.delete_before_cursor(distance)
    }

    /// Delete from the cursor to the end of the next word.
    pub fn delete_word_after_cursor(&mut self, separators: &WordSeparators) -> String {
        let distance = self.document().find_end_of_current_word(separators);
        self.delete(distance)
    }

    pub fn move_to_line_start(&mut self) {
        self.cursor_position = self.document().start_of_line_position();
        self.preferred_column = None;
    }

    pub fn move_to_line_end(&mut self) {
        self.cursor_position = self.document().end_of_line_position();
        self.preferred_column = None;
    }

    /// Delete from the start of the current line to the cursor.
    pub fn kill_line_before_cursor(&mut self) -> String {
        let count = unicode::rune_count(self.document().current_line_before_cursor());
        self.delete_before_cursor(count)
    }

    /// Delete from the cursor to the end of the current line.
    pub fn kill_line_after_cursor(&mut self) -> String {
        let count = unicode::rune_count(self.document().current_line_after_cursor());
        self.delete(count)
    }

    /// Swap the two runes immediately before the cursor.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::Buffer;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.set_text("hello world");
    /// buffer.set_cursor_position(5);
    ///
    /// buffer.swap_characters_before_cursor();
    /// assert_eq!(buffer.text(), "helol world");
    /// assert_eq!(buffer.cursor_position(), 5);
    /// ```
    pub fn swap_characters_before_cursor(&mut self) {
        let cursor = self.cursor_position;
        if cursor < 2 {
            return;
        }
        let mut chars: Vec<char> = self.text.chars().collect();
        chars.swap(cursor - 2, cursor - 1);
        self.text = chars.into_iter().collect();
        self.preferred_column = None;
    }

    /// Insert a line break, optionally repeating the current indentation.
    pub fn new_line(&mut self, copy_margin: bool) {
        let margin = if copy_margin {
            self.document().leading_whitespace_in_current_line().to_string()
        } else {
            String::new()
        };
        self.insert_text(&format!("\n{margin}"), false, true);
    }

    /// Join the current line with the next one using `separator`.
    ///
    /// Leading whitespace of the next line is dropped. Nothing happens on the
    /// last line.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::Buffer;
    ///
    /// let mut buffer = Buffer::new();
    /// buffer.set_text("first line\n   second line");
    /// buffer.set_cursor_position(5);
    ///
    /// buffer.join_next_line(" ");
    /// assert_eq!(buffer.text(), "first line second line");
    /// assert_eq!(buffer.cursor_position(), 5);
    /// ```
    pub fn join_next_line(&mut self, separator: &str) {
        let doc = self.document();
        if doc.on_last_line() {
            return;
        }
        let newline_at = doc.end_of_line_position();
        let len = self.len();
        let head = unicode::rune_slice(&self.text, 0, newline_at);
        let tail = unicode::rune_slice(&self.text, newline_at + 1, len).trim_start();
        self.text = format!("{head}{separator}{tail}");
        self.preferred_column = None;
    }
}
