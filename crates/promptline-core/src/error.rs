//! Error types for configuration, input and collaborators.
//!
//! Editing itself never fails: buffer, history and completion operations
//! clamp at their boundaries. Errors only come from building a configuration
//! or from the outside world.

use thiserror::Error;

use crate::key::Key;

/// Boxed error produced by application code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Problems found while validating an engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max visible suggestions must be greater than zero")]
    ZeroMaxVisible,

    #[error("key {0:?} is bound more than once")]
    DuplicateKeyBinding(Key),

    #[error("key {0:?} cannot be bound")]
    UnbindableKey(Key),

    #[error("raw byte sequence {0:?} is bound more than once")]
    DuplicateRawBinding(Vec<u8>),

    #[error("raw byte binding has an empty sequence")]
    EmptyRawSequence,

    #[error("prefix {0:?} contains control characters")]
    InvalidPrefix(String),
}

/// Failure reading from an input source.
///
/// End of input is not an error; sources report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read input")]
    Io(#[from] std::io::Error),

    #[error("input source failed: {0}")]
    Source(String),
}

/// Failure reported by a completer, renderer or executor.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] BoxError),
}

impl CollaboratorError {
    pub fn msg(message: impl Into<String>) -> Self {
        CollaboratorError::Message(message.into())
    }
}

/// Everything that can end a session abnormally.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("completer failed")]
    Completer(#[source] CollaboratorError),

    #[error("renderer failed")]
    Renderer(#[source] CollaboratorError),

    #[error("executor failed")]
    Executor(#[source] CollaboratorError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("input reader thread panicked")]
    ReaderPanicked,
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::DuplicateKeyBinding(Key::ControlA).to_string(),
            "key ControlA is bound more than once"
        );
        assert_eq!(
            ConfigError::ZeroMaxVisible.to_string(),
            "max visible suggestions must be greater than zero"
        );
    }

    #[test]
    fn test_engine_error_keeps_collaborator_source() {
        let err = EngineError::Renderer(CollaboratorError::msg("terminal gone"));
        assert_eq!(err.to_string(), "renderer failed");
        assert_eq!(err.source().map(|e| e.to_string()).as_deref(), Some("terminal gone"));
    }

    #[test]
    fn test_boxed_errors_convert() {
        let boxed: BoxError = "db offline".into();
        let err = CollaboratorError::from(boxed);
        assert_eq!(err.to_string(), "db offline");
    }
}
