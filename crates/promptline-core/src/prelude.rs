//! Convenient re-exports for building a prompt.
//!
//! ```
//! use promptline_core::prelude::*;
//!
//! let config = EngineConfig::builder().with_prefix(">>> ").build().unwrap();
//! let suggestion = Suggestion::new("help", "Show help");
//! # let _ = (config, suggestion);
//! ```

pub use crate::buffer::Buffer;
pub use crate::document::{Document, WordSeparators};

pub use crate::completion::{Completer, StaticCompleter};
pub use crate::suggestion::Suggestion;

pub use crate::key::{Key, KeyEvent};
pub use crate::keybind::{Action, KeyBindMode};

pub use crate::render::{RenderSnapshot, Renderer};
pub use crate::style::{Color, StyleConfig};

pub use crate::config::EngineConfig;
pub use crate::engine::{Engine, ExitReason, Executor};
pub use crate::error::{CollaboratorError, EngineError};
pub use crate::input::InputSource;
