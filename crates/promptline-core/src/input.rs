//! Input sources and the reader thread that feeds the engine.
//!
//! The reader thread is the only producer on a single `mpsc` channel, so
//! events reach the engine losslessly and in arrival order. It reads one
//! event per request from the engine and never reads ahead: once a session
//! ends, nothing more is taken from the source, and the source (with any
//! input it buffered) can be handed to the next session. Dropping the
//! sender (end of input, a read error, or a panic) is how the engine learns
//! the stream is over.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::{EngineError, InputError};
use crate::key::KeyEvent;

/// A blocking, ordered stream of decoded input events.
pub trait InputSource: Send {
    /// Block until the next event. `Ok(None)` marks the end of input and is
    /// distinct from a read failure.
    fn read_event(&mut self) -> Result<Option<KeyEvent>, InputError>;
}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn read_event(&mut self) -> Result<Option<KeyEvent>, InputError> {
        (**self).read_event()
    }
}

/// What travels from the reader thread to the engine.
#[derive(Debug)]
pub enum InputMessage {
    Event(KeyEvent),
    /// The source failed; nothing follows this message.
    Failed(InputError),
}

impl From<KeyEvent> for InputMessage {
    fn from(event: KeyEvent) -> Self {
        InputMessage::Event(event)
    }
}

/// Owns the reader thread, its request line and the receiving end of its
/// channel.
///
/// A reader can outlive one session: pass it to
/// [`Engine::run_reader`](crate::Engine::run_reader) once per prompt and
/// keystrokes typed between prompts stay queued in the source. Dropping the
/// reader stops the thread without another read; [`shutdown`](Self::shutdown)
/// also waits for it and returns the source.
///
/// ```
/// use std::collections::VecDeque;
/// use promptline_core::{InputError, InputMessage, InputReader, InputSource, KeyEvent};
///
/// struct Queue(VecDeque<KeyEvent>);
///
/// impl InputSource for Queue {
///     fn read_event(&mut self) -> Result<Option<KeyEvent>, InputError> {
///         Ok(self.0.pop_front())
///     }
/// }
///
/// let source = Queue(["a", "b", "c"].into_iter().map(KeyEvent::text).collect());
/// let reader = InputReader::spawn(source).unwrap();
///
/// assert!(matches!(reader.next_message(), Some(InputMessage::Event(e)) if e.text_or_empty() == "a"));
/// let rest = reader.shutdown().unwrap();
/// assert_eq!(rest.0.len(), 2);
/// ```
pub struct InputReader<S> {
    requests: Sender<()>,
    receiver: Receiver<InputMessage>,
    handle: JoinHandle<S>,
}

impl<S> InputReader<S>
where
    S: InputSource + 'static,
{
    /// Start serving `source` on a dedicated thread.
    pub fn spawn(source: S) -> Result<Self, InputError> {
        let (requests, request_receiver) = mpsc::channel();
        let (sender, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("promptline-input".to_string())
            .spawn(move || Self::reader_thread_main(source, request_receiver, sender))?;

        Ok(InputReader {
            requests,
            receiver,
            handle,
        })
    }

    /// Ask for one event and block until it arrives.
    ///
    /// `None` once the source ended, failed earlier, or the thread died.
    pub fn next_message(&self) -> Option<InputMessage> {
        if self.requests.send(()).is_err() {
            log::trace!("reader thread already gone");
        }
        self.receiver.recv().ok()
    }

    /// Stop the thread and take the source back.
    ///
    /// Never blocks on the source: the thread only reads while a
    /// [`next_message`](Self::next_message) call is waiting.
    pub fn shutdown(self) -> Result<S, EngineError> {
        let InputReader {
            requests,
            receiver,
            handle,
        } = self;
        drop(requests);
        drop(receiver);
        handle.join().map_err(|_| EngineError::ReaderPanicked)
    }

    fn reader_thread_main(
        mut source: S,
        requests: Receiver<()>,
        sender: Sender<InputMessage>,
    ) -> S {
        while requests.recv().is_ok() {
            match source.read_event() {
                Ok(Some(event)) => {
                    if sender.send(InputMessage::Event(event)).is_err() {
                        log::trace!("engine hung up, reader thread stopping");
                        break;
                    }
                }
                Ok(None) => {
                    log::debug!("input source reached end of stream");
                    break;
                }
                Err(err) => {
                    log::warn!("input source failed: {err}");
                    let _ = sender.send(InputMessage::Failed(err));
                    break;
                }
            }
        }
        source
    }
}
