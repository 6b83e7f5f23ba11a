//! Byte-level input for promptline.
//!
//! [`KeyDecoder`] turns raw terminal bytes into [`KeyEvent`]s and
//! [`ByteStreamSource`] wraps it around any [`std::io::Read`] so the engine
//! can consume it as an [`InputSource`]. The [`mock`] module has scripted
//! and recording collaborators for tests.
//!
//! Putting the terminal into raw mode and painting the screen are left to
//! the application.
//!
//! ```
//! use std::io::Cursor;
//! use promptline_core::{Engine, EngineConfig, ExitReason, StaticCompleter};
//! use promptline_io::mock::{RecordingExecutor, RecordingRenderer};
//! use promptline_io::ByteStreamSource;
//!
//! let executor = RecordingExecutor::new();
//! let mut engine = Engine::new(
//!     EngineConfig::default(),
//!     executor.clone(),
//!     StaticCompleter::from_strings(vec!["hello", "help"]),
//!     RecordingRenderer::new(),
//! );
//!
//! let input = ByteStreamSource::new(Cursor::new(b"hel\t\r\r".to_vec()));
//! assert_eq!(engine.run(input).unwrap(), ExitReason::Eof);
//! assert_eq!(executor.lines(), ["hello"]);
//! ```

pub mod decoder;
pub mod mock;
pub mod sequence;
pub mod stream;

pub use decoder::{DecoderState, KeyDecoder};
pub use sequence::{AsciiSequence, Lookup, SequenceTable, ASCII_SEQUENCES};
pub use stream::ByteStreamSource;

pub use promptline_core::{InputError, InputSource, Key, KeyEvent};
