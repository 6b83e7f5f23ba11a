//! Key names and decoded input events.
//!
//! A [`KeyEvent`] is what an input source hands to the engine: the named key
//! the decoder recognised, the exact bytes it came from, and any literal text.

/// Every named key the dispatcher can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    Escape,

    // Control characters (Ctrl+A through Ctrl+Z)
    ControlA,
    ControlB,
    ControlC,
    ControlD,
    ControlE,
    ControlF,
    ControlG,
    ControlH,
    ControlI,
    ControlJ,
    ControlK,
    ControlL,
    ControlM,
    ControlN,
    ControlO,
    ControlP,
    ControlQ,
    ControlR,
    ControlS,
    ControlT,
    ControlU,
    ControlV,
    ControlW,
    ControlX,
    ControlY,
    ControlZ,

    ControlSpace,
    ControlBackslash,
    ControlSquareClose,
    ControlCircumflex,
    ControlUnderscore,
    ControlLeft,
    ControlRight,
    ControlUp,
    ControlDown,

    Up,
    Down,
    Right,
    Left,

    ShiftLeft,
    ShiftUp,
    ShiftDown,
    ShiftRight,

    Home,
    End,
    Delete,
    ShiftDelete,
    ControlDelete,
    PageUp,
    PageDown,
    BackTab,
    Insert,
    Backspace,

    Tab,
    Enter,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,

    /// Wildcard used only in pattern matching; never bindable.
    Any,
    /// Text delivered inside a bracketed paste.
    BracketedPaste,
    /// Decoded but deliberately inert.
    Ignore,
    /// Printable text or a sequence the decoder did not recognise.
    NotDefined,
}

impl Key {
    /// Whether a binding may be registered for this key.
    ///
    /// The meta keys describe decoder outcomes rather than keys, so binding
    /// them would shadow every printable character.
    pub fn is_bindable(self) -> bool {
        !matches!(self, Key::Any | Key::Ignore | Key::NotDefined)
    }
}

/// One decoded input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// The bytes that produced this event, empty for synthetic events
    pub raw_bytes: Vec<u8>,
    /// Literal text carried by printable input or a paste
    pub text: Option<String>,
}

impl KeyEvent {
    pub fn new(key: Key, raw_bytes: Vec<u8>, text: Option<String>) -> Self {
        Self {
            key,
            raw_bytes,
            text,
        }
    }

    /// Event for a named key without text content.
    pub fn simple(key: Key, raw_bytes: Vec<u8>) -> Self {
        Self::new(key, raw_bytes, None)
    }

    /// Synthetic named-key event with no raw bytes.
    ///
    /// ```
    /// use promptline_core::{Key, KeyEvent};
    ///
    /// let event = KeyEvent::key(Key::Tab);
    /// assert!(event.raw_bytes.is_empty());
    /// ```
    pub fn key(key: Key) -> Self {
        Self::new(key, Vec::new(), None)
    }

    /// Printable text typed by the user.
    ///
    /// ```
    /// use promptline_core::{Key, KeyEvent};
    ///
    /// let event = KeyEvent::text("é");
    /// assert_eq!(event.key, Key::NotDefined);
    /// assert_eq!(event.raw_bytes, "é".as_bytes());
    /// assert_eq!(event.text_or_empty(), "é");
    /// ```
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(Key::NotDefined, text.as_bytes().to_vec(), Some(text))
    }

    /// Bytes the decoder could not name.
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Key::NotDefined, bytes.into(), None)
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

impl Default for KeyEvent {
    fn default() -> Self {
        Self::raw(Vec::new())
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        KeyEvent::key(key)
    }
}
