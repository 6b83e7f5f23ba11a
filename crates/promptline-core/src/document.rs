//! Immutable view over a line of text and its cursor.
//!
//! A [`Document`] answers every question the editing core asks about text
//! (what is before the cursor, where the current word starts, which visual
//! line the cursor sits on) without mutating anything. [`Buffer`](crate::Buffer)
//! builds one whenever it needs an answer.

use crate::unicode;

/// Set of characters that delimit words for motion and completion.
///
/// The default treats any Unicode whitespace as a separator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WordSeparators {
    /// Any whitespace rune separates words.
    #[default]
    Whitespace,
    /// Only the listed runes separate words.
    Chars(Vec<char>),
}

impl WordSeparators {
    /// Build a separator set from the runes of `chars`.
    ///
    /// An empty string falls back to [`WordSeparators::Whitespace`].
    ///
    /// ```
    /// use promptline_core::WordSeparators;
    ///
    /// let seps = WordSeparators::from_chars(" ./");
    /// assert!(seps.is_separator('/'));
    /// assert!(!seps.is_separator('-'));
    /// assert_eq!(WordSeparators::from_chars(""), WordSeparators::Whitespace);
    /// ```
    pub fn from_chars(chars: &str) -> Self {
        let mut set: Vec<char> = chars.chars().collect();
        if set.is_empty() {
            return WordSeparators::Whitespace;
        }
        set.sort_unstable();
        set.dedup();
        WordSeparators::Chars(set)
    }

    /// Whether `c` separates words under this set.
    pub fn is_separator(&self, c: char) -> bool {
        match self {
            WordSeparators::Whitespace => c.is_whitespace(),
            WordSeparators::Chars(set) => set.binary_search(&c).is_ok(),
        }
    }
}

/// Text plus a cursor expressed as a rune index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    text: String,
    cursor_position: usize,
}

impl Document {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A document over `text` with the cursor clamped into `0..=len`.
    ///
    /// ```
    /// use promptline_core::Document;
    ///
    /// let doc = Document::with_text("hello", 42);
    /// assert_eq!(doc.cursor_position(), 5);
    /// ```
    pub fn with_text(text: impl Into<String>, cursor_position: usize) -> Self {
        let text = text.into();
        let cursor_position = cursor_position.min(unicode::rune_count(&text));
        Document {
            text,
            cursor_position,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Cursor offset in terminal columns from the start of the text.
    pub fn display_cursor_position(&self) -> usize {
        unicode::display_width(self.text_before_cursor())
    }

    pub fn text_before_cursor(&self) -> &str {
        unicode::split_at_rune(&self.text, self.cursor_position).0
    }

    pub fn text_after_cursor(&self) -> &str {
        unicode::split_at_rune(&self.text, self.cursor_position).1
    }

    /// Rune at `cursor + offset`, if the position exists.
    pub fn char_relative_to_cursor(&self, offset: isize) -> Option<char> {
        let target = self.cursor_position.checked_add_signed(offset)?;
        unicode::char_at(&self.text, target)
    }

    // Words

    /// The word being typed: runes between the last separator and the cursor.
    ///
    /// Empty when the rune right before the cursor is a separator.
    ///
    /// ```
    /// use promptline_core::{Document, WordSeparators};
    ///
    /// let doc = Document::with_text("git che", 7);
    /// assert_eq!(doc.word_before_cursor(&WordSeparators::Whitespace), "che");
    ///
    /// let doc = Document::with_text("src/ma", 6);
    /// assert_eq!(doc.word_before_cursor(&WordSeparators::from_chars("/")), "ma");
    /// ```
    pub fn word_before_cursor(&self, separators: &WordSeparators) -> &str {
        let before = self.text_before_cursor();
        let start = before
            .char_indices()
            .rev()
            .find(|&(_, c)| separators.is_separator(c))
            .map_or(0, |(idx, c)| idx + c.len_utf8());
        &before[start..]
    }

    /// Runes between the cursor and the next separator.
    pub fn word_after_cursor(&self, separators: &WordSeparators) -> &str {
        let after = self.text_after_cursor();
        let end = after
            .char_indices()
            .find(|&(_, c)| separators.is_separator(c))
            .map_or(after.len(), |(idx, _)| idx);
        &after[..end]
    }

    /// Runes to move left to reach the start of the previous word.
    ///
    /// Skips the separators adjacent to the cursor first, then the word
    /// itself, so a cursor already sitting on a word start still moves.
    ///
    /// ```
    /// use promptline_core::{Document, WordSeparators};
    ///
    /// let ws = WordSeparators::Whitespace;
    /// assert_eq!(Document::with_text("foo bar  baz", 12).find_start_of_previous_word(&ws), 3);
    /// assert_eq!(Document::with_text("foo bar  baz", 9).find_start_of_previous_word(&ws), 5);
    /// ```
    pub fn find_start_of_previous_word(&self, separators: &WordSeparators) -> usize {
        let before: Vec<char> = self.text_before_cursor().chars().collect();
        let mut pos = before.len();
        while pos > 0 && separators.is_separator(before[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && !separators.is_separator(before[pos - 1]) {
            pos -= 1;
        }
        before.len() - pos
    }

    /// Runes to move right to reach the end of the next word.
    pub fn find_end_of_current_word(&self, separators: &WordSeparators) -> usize {
        let after: Vec<char> = self.text_after_cursor().chars().collect();
        let mut pos = 0;
        while pos < after.len() && separators.is_separator(after[pos]) {
            pos += 1;
        }
        while pos < after.len() && !separators.is_separator(after[pos]) {
            pos += 1;
        }
        pos
    }

    // Lines

    /// Rune index at which every line starts. Always contains `0`.
    pub fn line_start_indexes(&self) -> Vec<usize> {
        let mut starts = vec![0];
        starts.extend(
            self.text
                .chars()
                .enumerate()
                .filter(|&(_, c)| c == '\n')
                .map(|(idx, _)| idx + 1),
        );
        starts
    }

    pub fn line_count(&self) -> usize {
        self.line_start_indexes().len()
    }

    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    /// Zero-based line the cursor is on.
    pub fn cursor_position_row(&self) -> usize {
        self.translate_index_to_position(self.cursor_position).0
    }

    /// Zero-based rune column of the cursor within its line.
    pub fn cursor_position_col(&self) -> usize {
        self.translate_index_to_position(self.cursor_position).1
    }

    /// Convert a rune index into `(row, col)`.
    pub fn translate_index_to_position(&self, index: usize) -> (usize, usize) {
        let starts = self.line_start_indexes();
        let row = starts.partition_point(|&start| start <= index).saturating_sub(1);
        (row, index - starts[row])
    }

    /// Convert `(row, col)` into a rune index, clamping both coordinates.
    ///
    /// ```
    /// use promptline_core::Document;
    ///
    /// let doc = Document::with_text("ab\ncdef\ng", 0);
    /// assert_eq!(doc.translate_row_col_to_index(1, 2), 5);
    /// assert_eq!(doc.translate_row_col_to_index(0, 9), 2);
    /// assert_eq!(doc.translate_row_col_to_index(7, 0), 8);
    /// ```
    pub fn translate_row_col_to_index(&self, row: usize, col: usize) -> usize {
        let lines = self.lines();
        let starts = self.line_start_indexes();
        let row = row.min(lines.len() - 1);
        starts[row] + col.min(unicode::rune_count(lines[row]))
    }

    pub fn current_line(&self) -> &str {
        self.lines()[self.cursor_position_row()]
    }

    pub fn current_line_before_cursor(&self) -> &str {
        let before = self.text_before_cursor();
        before.rfind('\n').map_or(before, |idx| &before[idx + 1..])
    }

    pub fn current_line_after_cursor(&self) -> &str {
        let after = self.text_after_cursor();
        after.find('\n').map_or(after, |idx| &after[..idx])
    }

    pub fn on_first_line(&self) -> bool {
        self.cursor_position_row() == 0
    }

    pub fn on_last_line(&self) -> bool {
        self.cursor_position_row() + 1 >= self.line_count()
    }

    /// Rune index of the start of the cursor's line.
    pub fn start_of_line_position(&self) -> usize {
        self.cursor_position - unicode::rune_count(self.current_line_before_cursor())
    }

    /// Rune index of the end of the cursor's line (before any `\n`).
    pub fn end_of_line_position(&self) -> usize {
        self.cursor_position + unicode::rune_count(self.current_line_after_cursor())
    }

    /// Target index after moving `count` lines up, keeping `preferred_column`
    /// (or the current column) when the target line is long enough.
    pub fn cursor_up_position(&self, count: usize, preferred_column: Option<usize>) -> usize {
        let (row, col) = self.translate_index_to_position(self.cursor_position);
        if count == 0 || row == 0 {
            return self.cursor_position;
        }
        self.translate_row_col_to_index(row.saturating_sub(count), preferred_column.unwrap_or(col))
    }

    /// Target index after moving `count` lines down.
    pub fn cursor_down_position(&self, count: usize, preferred_column: Option<usize>) -> usize {
        let (row, col) = self.translate_index_to_position(self.cursor_position);
        if count == 0 || self.on_last_line() {
            return self.cursor_position;
        }
        self.translate_row_col_to_index(row + count, preferred_column.unwrap_or(col))
    }

    /// Spaces and tabs at the start of the cursor's line.
    pub fn leading_whitespace_in_current_line(&self) -> &str {
        let line = self.current_line();
        let trimmed = line.trim_start_matches([' ', '\t']);
        &line[..line.len() - trimmed.len()]
    }
}
