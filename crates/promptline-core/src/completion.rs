//! Completion: the [`Completer`] contract and the selection window over its
//! results.
//!
//! The [`CompletionManager`] keeps the suggestions for the current buffer,
//! which one is selected and which slice of them is on screen. Selection
//! cycles through "nothing selected" so the user can always back out of a
//! completion by pressing Tab once more.

use crate::buffer::Buffer;
use crate::document::{Document, WordSeparators};
use crate::error::CollaboratorError;
use crate::suggestion::Suggestion;
use crate::unicode;

/// Source of suggestions for the text before the cursor.
///
/// Completers run synchronously on the engine thread, so a slow completer
/// delays the next render.
///
/// # Examples
///
/// ## Using a closure
///
/// ```
/// use promptline_core::{Completer, Suggestion, WordSeparators};
///
/// let completer = |before: &str, _: &WordSeparators| -> Vec<Suggestion> {
///     if before.ends_with("he") {
///         vec![Suggestion::new("help", "Show help")]
///     } else {
///         vec![]
///     }
/// };
///
/// let found = completer.complete("he", &WordSeparators::Whitespace).unwrap();
/// assert_eq!(found[0].text, "help");
/// ```
///
/// ## Implementing the trait directly
///
/// ```
/// use promptline_core::{CollaboratorError, Completer, Document, Suggestion, WordSeparators};
///
/// struct Tables(Vec<String>);
///
/// impl Completer for Tables {
///     fn complete(
///         &self,
///         before: &str,
///         separators: &WordSeparators,
///     ) -> Result<Vec<Suggestion>, CollaboratorError> {
///         let doc = Document::with_text(before, usize::MAX);
///         let word = doc.word_before_cursor(separators);
///         Ok(self.0.iter().filter(|t| t.starts_with(word)).map(Suggestion::text_only).collect())
///     }
/// }
/// ```
pub trait Completer {
    /// Suggestions for `text_before_cursor`, most relevant first.
    fn complete(
        &self,
        text_before_cursor: &str,
        separators: &WordSeparators,
    ) -> Result<Vec<Suggestion>, CollaboratorError>;
}

impl<F> Completer for F
where
    F: Fn(&str, &WordSeparators) -> Vec<Suggestion>,
{
    fn complete(
        &self,
        text_before_cursor: &str,
        separators: &WordSeparators,
    ) -> Result<Vec<Suggestion>, CollaboratorError> {
        Ok(self(text_before_cursor, separators))
    }
}

/// Completer that never suggests anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompletion;

impl Completer for NoCompletion {
    fn complete(&self, _: &str, _: &WordSeparators) -> Result<Vec<Suggestion>, CollaboratorError> {
        Ok(Vec::new())
    }
}

/// Filters a fixed list by the word before the cursor, ignoring case.
///
/// # Examples
///
/// ```
/// use promptline_core::{Completer, StaticCompleter, Suggestion, WordSeparators};
///
/// let completer = StaticCompleter::new(vec![
///     Suggestion::new("users", "Manage users"),
///     Suggestion::new("upload", "Upload files"),
///     Suggestion::new("update", "Update records"),
/// ]);
///
/// let found = completer.complete("get UP", &WordSeparators::Whitespace).unwrap();
/// assert_eq!(found.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCompleter {
    suggestions: Vec<Suggestion>,
}

impl StaticCompleter {
    pub fn new(suggestions: Vec<Suggestion>) -> Self {
        Self { suggestions }
    }

    /// Build from `(text, description)` pairs.
    pub fn from_pairs<S1, S2>(pairs: Vec<(S1, S2)>) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::new(pairs.into_iter().map(Suggestion::from).collect())
    }

    /// Build from bare texts.
    pub fn from_strings<S: Into<String>>(strings: Vec<S>) -> Self {
        Self::new(strings.into_iter().map(Suggestion::text_only).collect())
    }
}

impl Completer for StaticCompleter {
    fn complete(
        &self,
        text_before_cursor: &str,
        separators: &WordSeparators,
    ) -> Result<Vec<Suggestion>, CollaboratorError> {
        let doc = Document::with_text(text_before_cursor, usize::MAX);
        let prefix = doc.word_before_cursor(separators).to_lowercase();

        Ok(self
            .suggestions
            .iter()
            .filter(|suggestion| suggestion.text.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect())
    }
}

/// Suggestions for the current buffer plus the selection and scroll window.
///
/// Invariants kept by every method:
/// `window_start <= selected < window_start + max_visible` while something is
/// selected, and `window_start <= max(0, len - max_visible)` always.
pub struct CompletionManager {
    completer: Box<dyn Completer>,
    separators: WordSeparators,
    suggestions: Vec<Suggestion>,
    selected: Option<usize>,
    window_start: usize,
    max_visible: usize,
}

impl std::fmt::Debug for CompletionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionManager")
            .field("separators", &self.separators)
            .field("suggestions", &self.suggestions)
            .field("selected", &self.selected)
            .field("window_start", &self.window_start)
            .field("max_visible", &self.max_visible)
            .finish_non_exhaustive()
    }
}

impl CompletionManager {
    /// A manager showing at most `max_visible` rows (at least one).
    pub fn new(
        completer: Box<dyn Completer>,
        max_visible: usize,
        separators: WordSeparators,
    ) -> Self {
        CompletionManager {
            completer,
            separators,
            suggestions: Vec::new(),
            selected: None,
            window_start: 0,
            max_visible: max_visible.max(1),
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Index of the highlighted suggestion, `None` when not completing.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_suggestion(&self) -> Option<&Suggestion> {
        self.selected.and_then(|idx| self.suggestions.get(idx))
    }

    pub fn window_start(&self) -> usize {
        self.window_start
    }

    pub fn max_visible(&self) -> usize {
        self.max_visible
    }

    pub fn separators(&self) -> &WordSeparators {
        &self.separators
    }

    pub fn is_completing(&self) -> bool {
        self.selected.is_some()
    }

    /// The suggestions currently inside the scroll window.
    pub fn visible(&self) -> &[Suggestion] {
        let end = (self.window_start + self.max_visible).min(self.suggestions.len());
        &self.suggestions[self.window_start.min(end)..end]
    }

    /// Ask the completer again for `document` and drop any selection.
    pub fn update(&mut self, document: &Document) -> Result<(), CollaboratorError> {
        let suggestions = self
            .completer
            .complete(document.text_before_cursor(), &self.separators)?;
        log::trace!("completer returned {} suggestions", suggestions.len());
        self.suggestions = suggestions;
        self.reset_selection();
        Ok(())
    }

    /// Forget every suggestion.
    pub fn clear(&mut self) {
        self.suggestions.clear();
        self.reset_selection();
    }

    /// Drop the selection but keep the list.
    pub fn reset_selection(&mut self) {
        self.selected = None;
        self.window_start = 0;
    }

    /// Select the next suggestion; past the last one nothing is selected.
    ///
    /// ```
    /// use promptline_core::{CompletionManager, Document, StaticCompleter, WordSeparators};
    ///
    /// let completer = StaticCompleter::from_strings(vec!["hello", "help"]);
    /// let mut manager = CompletionManager::new(Box::new(completer), 6, WordSeparators::Whitespace);
    /// manager.update(&Document::with_text("hel", 3)).unwrap();
    ///
    /// manager.next();
    /// assert_eq!(manager.selected(), Some(0));
    /// manager.next();
    /// manager.next();
    /// assert_eq!(manager.selected(), None);
    /// ```
    pub fn next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.selected = match self.selected {
            None => Some(0),
            Some(idx) if idx + 1 < self.suggestions.len() => Some(idx + 1),
            Some(_) => None,
        };
        self.scroll_to_selection();
    }

    /// Select the previous suggestion; before the first one nothing is
    /// selected, and from nothing the last one is selected.
    pub fn previous(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.selected = match self.selected {
            None => Some(self.suggestions.len() - 1),
            Some(0) => None,
            Some(idx) => Some(idx - 1),
        };
        self.scroll_to_selection();
    }

    /// Replace the word before the cursor with the selected suggestion.
    ///
    /// Clears the completion state afterwards. Returns `false` and leaves the
    /// buffer alone when nothing is selected.
    pub fn confirm(&mut self, buffer: &mut Buffer) -> bool {
        let Some(text) = self.selected_suggestion().map(|s| s.text.clone()) else {
            return false;
        };
        let word = unicode::rune_count(buffer.document().word_before_cursor(&self.separators));
        buffer.delete_before_cursor(word);
        buffer.insert_text(&text, false, true);
        self.clear();
        true
    }

    /// What the buffer would look like if the selection were confirmed.
    pub fn preview(&self, buffer: &Buffer) -> Option<Buffer> {
        let suggestion = self.selected_suggestion()?;
        let mut preview = buffer.clone();
        let word = unicode::rune_count(preview.document().word_before_cursor(&self.separators));
        preview.delete_before_cursor(word);
        preview.insert_text(&suggestion.text, false, true);
        Some(preview)
    }

    fn scroll_to_selection(&mut self) {
        match self.selected {
            None => self.window_start = 0,
            Some(idx) if idx < self.window_start => self.window_start = idx,
            Some(idx) if idx >= self.window_start + self.max_visible => {
                self.window_start = idx + 1 - self.max_visible;
            }
            Some(_) => {}
        }
    }
}
