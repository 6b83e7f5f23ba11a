//! Render snapshots and the renderer contract.

use crate::error::CollaboratorError;
use crate::style::StyleConfig;
use crate::suggestion::Suggestion;

/// Extra instruction attached to a snapshot by the action that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderHint {
    /// Wipe the screen before drawing.
    ClearScreen,
}

/// Everything a renderer needs for one full redraw.
///
/// Snapshots are owned copies: nothing the renderer does can reach back into
/// the engine state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderSnapshot {
    pub text: String,
    /// Rune index of the cursor in `text`
    pub cursor_position: usize,
    pub suggestions: Vec<Suggestion>,
    pub selected: Option<usize>,
    pub window_start: usize,
    pub max_visible: usize,
    /// Buffer text as it would read with the selection confirmed
    pub preview: Option<String>,
    /// Live label replacing the static prefix when present
    pub label: Option<String>,
    pub hint: Option<RenderHint>,
}

impl RenderSnapshot {
    /// The suggestions inside the scroll window.
    pub fn visible_suggestions(&self) -> &[Suggestion] {
        let end = (self.window_start + self.max_visible).min(self.suggestions.len());
        &self.suggestions[self.window_start.min(end)..end]
    }

    /// The live label, or the static prefix from `style`.
    ///
    /// ```
    /// use promptline_core::{RenderSnapshot, StyleConfig};
    ///
    /// let style = StyleConfig::default();
    /// let mut snapshot = RenderSnapshot::default();
    /// assert_eq!(snapshot.prefix(&style), "> ");
    ///
    /// snapshot.label = Some("db(main)> ".into());
    /// assert_eq!(snapshot.prefix(&style), "db(main)> ");
    /// ```
    pub fn prefix<'a>(&'a self, style: &'a StyleConfig) -> &'a str {
        self.label.as_deref().unwrap_or(&style.prefix)
    }
}

/// Paints snapshots. Every call is a full redraw.
pub trait Renderer {
    fn render(
        &mut self,
        snapshot: &RenderSnapshot,
        style: &StyleConfig,
    ) -> Result<(), CollaboratorError>;

    /// Called once per submit with the committed line, before the executor
    /// runs, so the renderer can move past it.
    fn break_line(
        &mut self,
        snapshot: &RenderSnapshot,
        style: &StyleConfig,
    ) -> Result<(), CollaboratorError> {
        let _ = (snapshot, style);
        Ok(())
    }
}

/// Supplies the live prefix, re-queried before every render.
pub trait LabelSupplier {
    fn label(&mut self) -> Option<String>;
}

impl<F> LabelSupplier for F
where
    F: FnMut() -> Option<String>,
{
    fn label(&mut self) -> Option<String> {
        self()
    }
}
