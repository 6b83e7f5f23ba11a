// Shared collaborators for the engine integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use promptline_core::unicode::split_at_rune;
use promptline_core::{
    CollaboratorError, InputError, InputSource, Key, KeyEvent, RenderSnapshot, Renderer,
    StyleConfig,
};

/// Renderer that keeps every frame it was asked to draw.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    frames: Arc<Mutex<Vec<RenderSnapshot>>>,
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<RenderSnapshot> {
        self.frames.lock().unwrap().clone()
    }

    pub fn last_frame(&self) -> RenderSnapshot {
        self.frames().last().cloned().expect("nothing rendered")
    }

    pub fn render_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    /// One line per render or line break, oldest first.
    pub fn transcript(&self) -> String {
        self.lines.lock().unwrap().join("\n")
    }
}

impl Renderer for RecordingRenderer {
    fn render(
        &mut self,
        snapshot: &RenderSnapshot,
        style: &StyleConfig,
    ) -> Result<(), CollaboratorError> {
        self.lines.lock().unwrap().push(frame_line(snapshot, style));
        self.frames.lock().unwrap().push(snapshot.clone());
        Ok(())
    }

    fn break_line(
        &mut self,
        snapshot: &RenderSnapshot,
        _: &StyleConfig,
    ) -> Result<(), CollaboratorError> {
        self.lines.lock().unwrap().push(format!("--- {}", snapshot.text));
        Ok(())
    }
}

/// `prefix` + text with `|` at the cursor, then the visible suggestions with
/// the selected one in brackets.
pub fn frame_line(snapshot: &RenderSnapshot, style: &StyleConfig) -> String {
    let (before, after) = split_at_rune(&snapshot.text, snapshot.cursor_position);
    let mut line = format!("{}{before}|{after}", snapshot.prefix(style));

    let visible = snapshot.visible_suggestions();
    if !visible.is_empty() {
        let items: Vec<String> = visible
            .iter()
            .enumerate()
            .map(|(offset, suggestion)| {
                if snapshot.selected == Some(snapshot.window_start + offset) {
                    format!("[{}]", suggestion.text)
                } else {
                    suggestion.text.clone()
                }
            })
            .collect();
        line.push_str("  ");
        line.push_str(&items.join(" "));
    }
    line
}

/// Input source replaying a fixed list of events, then end of input.
pub struct ScriptedSource {
    events: VecDeque<KeyEvent>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedSource {
    fn read_event(&mut self) -> Result<Option<KeyEvent>, InputError> {
        Ok(self.events.pop_front())
    }
}

/// Input source fed live from a channel, like a terminal shared between
/// consecutive prompts. Clones read from the same queue.
#[derive(Clone)]
pub struct ChannelSource {
    queue: Arc<Mutex<Receiver<KeyEvent>>>,
}

impl ChannelSource {
    pub fn new() -> (Sender<KeyEvent>, Self) {
        let (sender, receiver) = mpsc::channel();
        let source = ChannelSource {
            queue: Arc::new(Mutex::new(receiver)),
        };
        (sender, source)
    }

    /// Next event without blocking, for checking what was left unread.
    pub fn try_take(&self) -> Option<KeyEvent> {
        self.queue.lock().unwrap().try_recv().ok()
    }
}

impl InputSource for ChannelSource {
    fn read_event(&mut self) -> Result<Option<KeyEvent>, InputError> {
        Ok(self.queue.lock().unwrap().recv().ok())
    }
}

/// One printable event per rune of `text`.
pub fn typed(text: &str) -> Vec<KeyEvent> {
    text.chars().map(|c| KeyEvent::text(c.to_string())).collect()
}

pub fn key(key: Key) -> KeyEvent {
    KeyEvent::key(key)
}

/// Executor that collects submitted lines.
pub fn collecting_executor() -> (impl FnMut(&str) + 'static, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    let executor = move |line: &str| sink.lock().unwrap().push(line.to_string());
    (executor, lines)
}
