//! Promptline Core Library
//!
//! The editing engine behind an interactive terminal prompt: a rune-indexed
//! text buffer, command history, a completion window, a layered key-binding
//! dispatcher and the event loop that ties them to an input source and a
//! renderer. Terminal I/O lives outside this crate; the engine only talks to
//! the [`InputSource`], [`Renderer`], [`Completer`] and [`Executor`] traits.

// Text model
pub mod buffer;
pub mod document;
pub mod unicode;

// Editing state
pub mod completion;
pub mod history;
pub mod suggestion;

// Input and dispatch
pub mod input;
pub mod key;
pub mod keybind;

// Presentation
pub mod render;
pub mod style;

// Engine
pub mod config;
pub mod engine;
pub mod error;

pub mod prelude;

pub use buffer::Buffer;
pub use document::{Document, WordSeparators};

pub use completion::{Completer, CompletionManager, NoCompletion, StaticCompleter};
pub use history::{History, HistoryPolicy};
pub use suggestion::Suggestion;

pub use input::{InputMessage, InputReader, InputSource};
pub use key::{Key, KeyEvent};
pub use keybind::{
    default_bindings, default_raw_bindings, Action, CustomAction, Dispatcher, KeyBindMode,
    KeyBinding, RawBinding,
};

pub use render::{LabelSupplier, RenderHint, RenderSnapshot, Renderer};
pub use style::{Color, StyleConfig};

pub use config::{EngineConfig, EngineConfigBuilder, DEFAULT_MAX_VISIBLE};
pub use engine::{Engine, EngineState, ExitChecker, ExitReason, Executor};
pub use error::{
    BoxError, CollaboratorError, ConfigError, EngineError, EngineResult, InputError,
};
