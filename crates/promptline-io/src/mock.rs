//! Scripted and recording collaborators for tests and demos.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use promptline_core::{
    CollaboratorError, Executor, InputError, InputSource, Key, KeyEvent, RenderSnapshot,
    Renderer, StyleConfig,
};

use crate::decoder::KeyDecoder;

enum Scripted {
    Event(KeyEvent),
    Fail(String),
}

/// Input source replaying a queue of events, then end of input.
///
/// ```
/// use promptline_io::mock::ScriptedInput;
/// use promptline_io::{InputSource, Key};
///
/// let mut input = ScriptedInput::new().text("hi").key(Key::Enter);
/// assert_eq!(input.len(), 3);
/// assert_eq!(input.read_event().unwrap().unwrap().text.as_deref(), Some("h"));
/// ```
#[derive(Default)]
pub struct ScriptedInput {
    queue: VecDeque<Scripted>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(mut self, event: KeyEvent) -> Self {
        self.queue.push_back(Scripted::Event(event));
        self
    }

    /// One printable event per character.
    pub fn text(mut self, text: &str) -> Self {
        for c in text.chars() {
            self.queue
                .push_back(Scripted::Event(KeyEvent::text(c.to_string())));
        }
        self
    }

    pub fn key(self, key: Key) -> Self {
        self.event(KeyEvent::key(key))
    }

    /// Queue whatever `bytes` decode to, as a terminal would deliver them.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        let mut decoder = KeyDecoder::new();
        let mut events = decoder.feed(bytes);
        events.extend(decoder.flush());
        self.queue.extend(events.into_iter().map(Scripted::Event));
        self
    }

    /// Fail the read after everything queued so far.
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.queue.push_back(Scripted::Fail(message.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl FromIterator<KeyEvent> for ScriptedInput {
    fn from_iter<I: IntoIterator<Item = KeyEvent>>(iter: I) -> Self {
        ScriptedInput {
            queue: iter.into_iter().map(Scripted::Event).collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_event(&mut self) -> Result<Option<KeyEvent>, InputError> {
        match self.queue.pop_front() {
            Some(Scripted::Event(event)) => Ok(Some(event)),
            Some(Scripted::Fail(message)) => Err(InputError::Source(message)),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Default)]
struct Recording {
    frames: Vec<RenderSnapshot>,
    committed: Vec<String>,
}

/// Renderer that keeps every snapshot. Clones share the same record, so a
/// test can keep one handle and give the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn frames(&self) -> Vec<RenderSnapshot> {
        self.lock().frames.clone()
    }

    pub fn last_frame(&self) -> Option<RenderSnapshot> {
        self.lock().frames.last().cloned()
    }

    pub fn render_count(&self) -> usize {
        self.lock().frames.len()
    }

    /// Lines passed to `break_line`, oldest first.
    pub fn committed(&self) -> Vec<String> {
        self.lock().committed.clone()
    }
}

impl Renderer for RecordingRenderer {
    fn render(
        &mut self,
        snapshot: &RenderSnapshot,
        _: &StyleConfig,
    ) -> Result<(), CollaboratorError> {
        self.lock().frames.push(snapshot.clone());
        Ok(())
    }

    fn break_line(
        &mut self,
        snapshot: &RenderSnapshot,
        _: &StyleConfig,
    ) -> Result<(), CollaboratorError> {
        self.lock().committed.push(snapshot.text.clone());
        Ok(())
    }
}

/// Executor that records submitted lines.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Executor for RecordingExecutor {
    fn execute(&mut self, line: &str) -> Result<(), CollaboratorError> {
        self.lines
            .lock()
            .map_err(|_| CollaboratorError::msg("recording executor poisoned"))?
            .push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_input_order_and_failure() {
        let mut input = ScriptedInput::new()
            .text("a")
            .key(Key::Tab)
            .fail("device unplugged")
            .text("never");

        assert_eq!(input.read_event().unwrap().unwrap().text.as_deref(), Some("a"));
        assert_eq!(input.read_event().unwrap().unwrap().key, Key::Tab);
        let err = input.read_event().unwrap_err();
        assert!(matches!(err, InputError::Source(ref m) if m == "device unplugged"));
    }

    #[test]
    fn test_scripted_bytes_are_decoded() {
        let mut input = ScriptedInput::new().bytes(b"x\x1b[A\x1b");
        let keys: Vec<Key> = std::iter::from_fn(|| input.read_event().unwrap())
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, [Key::NotDefined, Key::Up, Key::Escape]);
    }

    #[test]
    fn test_from_iterator() {
        let input: ScriptedInput = [KeyEvent::key(Key::Up), KeyEvent::key(Key::Down)]
            .into_iter()
            .collect();
        assert_eq!(input.len(), 2);
        assert!(ScriptedInput::new().is_empty());
    }

    #[test]
    fn test_recording_renderer_shares_state() {
        let renderer = RecordingRenderer::new();
        let mut handle = renderer.clone();
        let snapshot = RenderSnapshot {
            text: "ls".into(),
            cursor_position: 2,
            ..RenderSnapshot::default()
        };
        handle.render(&snapshot, &StyleConfig::default()).unwrap();
        handle.break_line(&snapshot, &StyleConfig::default()).unwrap();

        assert_eq!(renderer.render_count(), 1);
        assert_eq!(renderer.last_frame().unwrap().cursor_position, 2);
        assert_eq!(renderer.committed(), ["ls"]);
    }

    #[test]
    fn test_recording_executor() {
        let executor = RecordingExecutor::new();
        let mut handle = executor.clone();
        handle.execute("one").unwrap();
        handle.execute("two").unwrap();
        assert_eq!(executor.lines(), ["one", "two"]);
    }
}
