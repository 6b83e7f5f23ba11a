//! Actions, bindings and the dispatcher that picks one per input event.
//!
//! Resolution order for an event:
//!
//! 1. the user's named-key bindings,
//! 2. the default named-key table of the active [`KeyBindMode`],
//! 3. the raw byte table, matched against the event's exact bytes,
//! 4. printable text becomes [`Action::InsertText`]; anything else is dropped.
//!
//! A raw binding therefore never shadows a named key. It only sees events no
//! named table claimed, which includes every sequence the decoder reported as
//! [`Key::NotDefined`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::buffer::Buffer;
use crate::key::{Key, KeyEvent};
use crate::render::RenderHint;
use crate::unicode;

/// Which default table backs the user's bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyBindMode {
    /// Only the keys every terminal user expects (arrows, Enter, Tab...).
    Common,
    /// Common keys plus the readline control chords.
    #[default]
    Emacs,
}

/// User function run against the buffer.
pub type CustomAction = Arc<dyn Fn(&mut Buffer) -> Option<RenderHint> + Send + Sync>;

/// What a binding does.
#[derive(Clone)]
pub enum Action {
    /// Insert literal text at the cursor.
    InsertText(String),
    /// Confirm the selected suggestion, or submit the line when nothing is
    /// selected.
    SubmitOrConfirm,
    /// Submit the line regardless of completion state.
    Submit,
    /// End the session as aborted.
    Abort,
    /// End the session normally.
    Exit,
    /// Delete the rune under the cursor, or exit on an empty buffer.
    DeleteCharOrExit,
    CompletionNext,
    CompletionPrevious,
    /// Previous suggestion while completing, the line above in multi-line
    /// text, otherwise an older history entry.
    PreviousOrOlder,
    /// Next suggestion while completing, the line below in multi-line text,
    /// otherwise a newer history entry.
    NextOrNewer,
    HistoryOlder,
    HistoryNewer,
    CancelCompletion,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    LineStart,
    LineEnd,
    WordBackward,
    WordForward,
    DeleteBackward,
    DeleteForward,
    DeleteWordBackward,
    DeleteWordForward,
    KillLineBefore,
    KillLineAfter,
    SwapCharacters,
    ClearScreen,
    /// Explicitly do nothing, shadowing a default.
    Ignore,
    Custom(CustomAction),
}

impl Action {
    /// Wrap a buffer edit as an action.
    ///
    /// ```
    /// use promptline_core::{Action, Buffer};
    ///
    /// let upper = Action::custom(|buffer: &mut Buffer| {
    ///     let text = buffer.text().to_uppercase();
    ///     buffer.set_text(text);
    /// });
    /// ```
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut Buffer) + Send + Sync + 'static,
    {
        Action::Custom(Arc::new(move |buffer: &mut Buffer| -> Option<RenderHint> {
            f(buffer);
            None
        }))
    }

    /// Wrap a buffer edit that also asks the renderer for something.
    pub fn custom_with_hint<F>(f: F) -> Self
    where
        F: Fn(&mut Buffer) -> Option<RenderHint> + Send + Sync + 'static,
    {
        Action::Custom(Arc::new(f))
    }

    /// Actions that only move through the suggestion list.
    pub fn is_completion_cycle(&self) -> bool {
        matches!(self, Action::CompletionNext | Action::CompletionPrevious)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::InsertText(text) => f.debug_tuple("InsertText").field(text).finish(),
            Action::SubmitOrConfirm => write!(f, "SubmitOrConfirm"),
            Action::Submit => write!(f, "Submit"),
            Action::Abort => write!(f, "Abort"),
            Action::Exit => write!(f, "Exit"),
            Action::DeleteCharOrExit => write!(f, "DeleteCharOrExit"),
            Action::CompletionNext => write!(f, "CompletionNext"),
            Action::CompletionPrevious => write!(f, "CompletionPrevious"),
            Action::PreviousOrOlder => write!(f, "PreviousOrOlder"),
            Action::NextOrNewer => write!(f, "NextOrNewer"),
            Action::HistoryOlder => write!(f, "HistoryOlder"),
            Action::HistoryNewer => write!(f, "HistoryNewer"),
            Action::CancelCompletion => write!(f, "CancelCompletion"),
            Action::CursorLeft => write!(f, "CursorLeft"),
            Action::CursorRight => write!(f, "CursorRight"),
            Action::CursorUp => write!(f, "CursorUp"),
            Action::CursorDown => write!(f, "CursorDown"),
            Action::LineStart => write!(f, "LineStart"),
            Action::LineEnd => write!(f, "LineEnd"),
            Action::WordBackward => write!(f, "WordBackward"),
            Action::WordForward => write!(f, "WordForward"),
            Action::DeleteBackward => write!(f, "DeleteBackward"),
            Action::DeleteForward => write!(f, "DeleteForward"),
            Action::DeleteWordBackward => write!(f, "DeleteWordBackward"),
            Action::DeleteWordForward => write!(f, "DeleteWordForward"),
            Action::KillLineBefore => write!(f, "KillLineBefore"),
            Action::KillLineAfter => write!(f, "KillLineAfter"),
            Action::SwapCharacters => write!(f, "SwapCharacters"),
            Action::ClearScreen => write!(f, "ClearScreen"),
            Action::Ignore => write!(f, "Ignore"),
            Action::Custom(_) => write!(f, "Custom(<function>)"),
        }
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Action::InsertText(a), Action::InsertText(b)) => a == b,
            (Action::Custom(a), Action::Custom(b)) => Arc::ptr_eq(a, b),
            (a, b) => {
                !matches!(a, Action::InsertText(_) | Action::Custom(_))
                    && std::mem::discriminant(a) == std::mem::discriminant(b)
            }
        }
    }
}

/// A named key bound to an action.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    pub key: Key,
    pub action: Action,
}

impl KeyBinding {
    pub fn new(key: Key, action: Action) -> Self {
        KeyBinding { key, action }
    }
}

/// An exact byte sequence bound to an action.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBinding {
    pub sequence: Vec<u8>,
    pub action: Action,
}

impl RawBinding {
    pub fn new(sequence: impl Into<Vec<u8>>, action: Action) -> Self {
        RawBinding {
            sequence: sequence.into(),
            action,
        }
    }
}

/// The default named-key bindings for `mode`.
pub fn default_bindings(mode: KeyBindMode) -> Vec<KeyBinding> {
    let mut bindings = vec![
        KeyBinding::new(Key::Enter, Action::SubmitOrConfirm),
        KeyBinding::new(Key::ControlJ, Action::SubmitOrConfirm),
        KeyBinding::new(Key::ControlM, Action::SubmitOrConfirm),
        KeyBinding::new(Key::Tab, Action::CompletionNext),
        KeyBinding::new(Key::ControlI, Action::CompletionNext),
        KeyBinding::new(Key::BackTab, Action::CompletionPrevious),
        KeyBinding::new(Key::Up, Action::PreviousOrOlder),
        KeyBinding::new(Key::ControlP, Action::PreviousOrOlder),
        KeyBinding::new(Key::Down, Action::NextOrNewer),
        KeyBinding::new(Key::ControlN, Action::NextOrNewer),
        KeyBinding::new(Key::Left, Action::CursorLeft),
        KeyBinding::new(Key::Right, Action::CursorRight),
        KeyBinding::new(Key::Home, Action::LineStart),
        KeyBinding::new(Key::End, Action::LineEnd),
        KeyBinding::new(Key::Backspace, Action::DeleteBackward),
        KeyBinding::new(Key::Delete, Action::DeleteForward),
        KeyBinding::new(Key::ControlC, Action::Abort),
        KeyBinding::new(Key::ControlD, Action::DeleteCharOrExit),
        KeyBinding::new(Key::Escape, Action::CancelCompletion),
    ];

    if mode == KeyBindMode::Emacs {
        bindings.extend([
            KeyBinding::new(Key::ControlA, Action::LineStart),
            KeyBinding::new(Key::ControlE, Action::LineEnd),
            KeyBinding::new(Key::ControlF, Action::CursorRight),
            KeyBinding::new(Key::ControlB, Action::CursorLeft),
            KeyBinding::new(Key::ControlH, Action::DeleteBackward),
            KeyBinding::new(Key::ControlK, Action::KillLineAfter),
            KeyBinding::new(Key::ControlU, Action::KillLineBefore),
            KeyBinding::new(Key::ControlW, Action::DeleteWordBackward),
            KeyBinding::new(Key::ControlL, Action::ClearScreen),
            KeyBinding::new(Key::ControlT, Action::SwapCharacters),
            KeyBinding::new(Key::ControlLeft, Action::WordBackward),
            KeyBinding::new(Key::ControlRight, Action::WordForward),
        ]);
    }
    bindings
}

/// The default raw byte bindings for `mode`: the Meta chords, which
/// terminals send as ESC followed by the letter.
pub fn default_raw_bindings(mode: KeyBindMode) -> Vec<RawBinding> {
    match mode {
        KeyBindMode::Common => Vec::new(),
        KeyBindMode::Emacs => vec![
            RawBinding::new(*b"\x1bb", Action::WordBackward),
            RawBinding::new(*b"\x1bf", Action::WordForward),
            RawBinding::new(*b"\x1bd", Action::DeleteWordForward),
            RawBinding::new(*b"\x1b\x7f", Action::DeleteWordBackward),
        ],
    }
}

/// Immutable lookup tables built once per session.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    mode: KeyBindMode,
    user: HashMap<Key, Action>,
    defaults: HashMap<Key, Action>,
    raw: HashMap<Vec<u8>, Action>,
}

impl Dispatcher {
    /// Build the tables. User raw bindings replace default raw bindings for
    /// the same sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use promptline_core::{Action, Dispatcher, Key, KeyBindMode, KeyBinding, KeyEvent};
    ///
    /// let dispatcher = Dispatcher::new(
    ///     KeyBindMode::Emacs,
    ///     &[KeyBinding::new(Key::ControlA, Action::LineEnd)],
    ///     &[],
    /// );
    /// let action = dispatcher.resolve(&KeyEvent::simple(Key::ControlA, vec![0x01]));
    /// assert_eq!(action, Some(Action::LineEnd));
    /// ```
    pub fn new(mode: KeyBindMode, user: &[KeyBinding], user_raw: &[RawBinding]) -> Self {
        let defaults = default_bindings(mode)
            .into_iter()
            .map(|b| (b.key, b.action))
            .collect();
        let user = user
            .iter()
            .map(|b| (b.key, b.action.clone()))
            .collect();
        let raw = default_raw_bindings(mode)
            .into_iter()
            .chain(user_raw.iter().cloned())
            .map(|b| (b.sequence, b.action))
            .collect();

        Dispatcher {
            mode,
            user,
            defaults,
            raw,
        }
    }

    pub fn mode(&self) -> KeyBindMode {
        self.mode
    }

    /// Pick the action for `event`, or `None` when it should be dropped.
    pub fn resolve(&self, event: &KeyEvent) -> Option<Action> {
        if event.key.is_bindable() {
            if let Some(action) = self.user.get(&event.key) {
                log::trace!("{:?} resolved by user binding", event.key);
                return Some(action.clone());
            }
            if let Some(action) = self.defaults.get(&event.key) {
                log::trace!("{:?} resolved by {:?} defaults", event.key, self.mode);
                return Some(action.clone());
            }
        }

        if !event.raw_bytes.is_empty() {
            if let Some(action) = self.raw.get(&event.raw_bytes) {
                log::trace!("raw bytes {:?} resolved by raw binding", event.raw_bytes);
                return Some(action.clone());
            }
        }

        match event.text.as_deref() {
            Some(text) if unicode::is_printable(text) => Some(Action::InsertText(text.to_string())),
            Some(text) if event.key == Key::BracketedPaste => {
                let kept = unicode::strip_control(text);
                log::trace!(
                    "paste had {} control runes removed",
                    unicode::rune_count(text) - unicode::rune_count(&kept)
                );
                (!kept.is_empty()).then_some(Action::InsertText(kept))
            }
            _ => {
                log::trace!("dropping unbound input {:?}", event);
                None
            }
        }
    }
}
