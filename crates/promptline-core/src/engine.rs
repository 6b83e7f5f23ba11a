//! The read/edit/render loop.
//!
//! An [`Engine`] owns every piece of mutable editing state. Each input event
//! goes through one cycle:
//!
//! ```text
//! Idle -> Processing -> (Executing) -> Rendering -> Idle
//! ```
//!
//! One event is consumed, at most one action is applied and exactly one
//! snapshot is rendered. `Executing` only occurs when the action submits the
//! line. A cycle that ends the session leaves the engine in `Exited` or
//! `Aborted`, and no further events are processed.
//!
//! # Examples
//!
//! ```
//! use std::sync::mpsc;
//! use promptline_core::{
//!     CollaboratorError, Engine, EngineConfig, ExitReason, InputMessage, Key, KeyEvent,
//!     RenderSnapshot, Renderer, StaticCompleter, StyleConfig,
//! };
//!
//! struct Silent;
//! impl Renderer for Silent {
//!     fn render(&mut self, _: &RenderSnapshot, _: &StyleConfig) -> Result<(), CollaboratorError> {
//!         Ok(())
//!     }
//! }
//!
//! let config = EngineConfig::builder().build().unwrap();
//! let completer = StaticCompleter::from_strings(vec!["hello", "help"]);
//! let mut engine = Engine::new(config, |line: &str| println!("got {line}"), completer, Silent);
//!
//! let (tx, rx) = mpsc::channel();
//! for event in [KeyEvent::text("h"), KeyEvent::text("i"), KeyEvent::key(Key::Enter)] {
//!     tx.send(InputMessage::Event(event)).unwrap();
//! }
//! drop(tx);
//!
//! assert_eq!(engine.run_with(&rx).unwrap(), ExitReason::Eof);
//! assert_eq!(engine.history().entries(), ["hi"]);
//! ```

use std::sync::mpsc::Receiver;

use crate::buffer::Buffer;
use crate::completion::{Completer, CompletionManager};
use crate::config::EngineConfig;
use crate::error::{CollaboratorError, EngineError, EngineResult};
use crate::history::History;
use crate::input::{InputMessage, InputReader, InputSource};
use crate::keybind::{Action, Dispatcher};
use crate::key::KeyEvent;
use crate::render::{LabelSupplier, RenderHint, RenderSnapshot, Renderer};

/// Receives every submitted line.
pub trait Executor {
    fn execute(&mut self, line: &str) -> Result<(), CollaboratorError>;
}

impl<F> Executor for F
where
    F: FnMut(&str),
{
    fn execute(&mut self, line: &str) -> Result<(), CollaboratorError> {
        self(line);
        Ok(())
    }
}

/// Decides after each execution whether the session should end.
pub trait ExitChecker {
    fn should_exit(&mut self, line: &str) -> bool;
}

impl<F> ExitChecker for F
where
    F: FnMut(&str) -> bool,
{
    fn should_exit(&mut self, line: &str) -> bool {
        self(line)
    }
}

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Waiting for the next event.
    Idle,
    /// Dispatching and applying one event.
    Processing,
    /// Handing the submitted line to the executor.
    Executing,
    /// Handing a snapshot to the renderer.
    Rendering,
    Exited,
    Aborted,
}

impl EngineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, EngineState::Exited | EngineState::Aborted)
    }
}

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    /// The input source closed.
    Eof,
    /// An exit action fired or the exit checker accepted a line.
    Exit,
    /// An abort action fired.
    Aborted,
}

#[derive(Debug, Default)]
struct Outcome {
    hint: Option<RenderHint>,
    exit: Option<ExitReason>,
}

/// The line-editing engine.
pub struct Engine {
    config: EngineConfig,
    buffer: Buffer,
    history: History,
    completion: CompletionManager,
    dispatcher: Dispatcher,
    executor: Box<dyn Executor>,
    renderer: Box<dyn Renderer>,
    label_supplier: Option<Box<dyn LabelSupplier>>,
    exit_checker: Option<Box<dyn ExitChecker>>,
    state: EngineState,
    exit_reason: Option<ExitReason>,
    last_label: Option<String>,
    started: bool,
}

impl Engine {
    /// Assemble an engine from a validated configuration and its
    /// collaborators.
    pub fn new(
        config: EngineConfig,
        executor: impl Executor + 'static,
        completer: impl Completer + 'static,
        renderer: impl Renderer + 'static,
    ) -> Self {
        let completion = CompletionManager::new(
            Box::new(completer),
            config.max_visible(),
            config.word_separators().clone(),
        );

        Engine {
            buffer: Buffer::new(),
            history: config.build_history(),
            dispatcher: config.build_dispatcher(),
            completion,
            config,
            executor: Box::new(executor),
            renderer: Box::new(renderer),
            label_supplier: None,
            exit_checker: None,
            state: EngineState::Idle,
            exit_reason: None,
            last_label: None,
            started: false,
        }
    }

    /// Use a live label instead of the static prefix.
    pub fn with_label_supplier(mut self, supplier: impl LabelSupplier + 'static) -> Self {
        self.label_supplier = Some(Box::new(supplier));
        self
    }

    /// Consult `checker` after every executed line.
    pub fn with_exit_checker(mut self, checker: impl ExitChecker + 'static) -> Self {
        self.exit_checker = Some(Box::new(checker));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn completion(&self) -> &CompletionManager {
        &self.completion
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit_reason
    }

    /// Paint the initial prompt. Runs once; later calls do nothing.
    ///
    /// [`run`](Self::run) and [`run_with`](Self::run_with) call this
    /// themselves. Callers driving the engine through [`step`](Self::step)
    /// decide whether they want the initial frame.
    pub fn start(&mut self) -> EngineResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        log::debug!("prompt session started in {:?} mode", self.dispatcher.mode());

        if self.config.show_completion_at_start() {
            self.refresh_completion()?;
        }
        self.render(None)?;
        self.transition(EngineState::Idle);
        Ok(())
    }

    /// Read from `source` on a reader thread until the session ends.
    ///
    /// The thread is stopped before this returns, and it never reads past the
    /// event that ended the session.
    pub fn run<S>(&mut self, source: S) -> EngineResult<ExitReason>
    where
        S: InputSource + 'static,
    {
        let reader = InputReader::spawn(source)?;
        let result = self.run_reader(&reader);
        let stopped = reader.shutdown();
        let reason = result?;
        stopped?;
        Ok(reason)
    }

    /// Like [`run`](Self::run) over a reader the caller keeps, so one source
    /// can serve several prompts without losing input in between.
    pub fn run_reader<S>(&mut self, reader: &InputReader<S>) -> EngineResult<ExitReason>
    where
        S: InputSource + 'static,
    {
        self.drive(|| reader.next_message())
    }

    /// Consume events from `receiver` until the session ends.
    ///
    /// Blocks without timeout while waiting. A closed channel ends the
    /// session with [`ExitReason::Eof`].
    pub fn run_with(&mut self, receiver: &Receiver<InputMessage>) -> EngineResult<ExitReason> {
        self.drive(|| receiver.recv().ok())
    }

    fn drive<F>(&mut self, mut next_message: F) -> EngineResult<ExitReason>
    where
        F: FnMut() -> Option<InputMessage>,
    {
        self.start()?;
        loop {
            if let Some(reason) = self.exit_reason {
                return Ok(reason);
            }
            match next_message() {
                Some(InputMessage::Event(event)) => {
                    self.step(event)?;
                }
                Some(InputMessage::Failed(err)) => return Err(err.into()),
                None => {
                    log::debug!("input closed, ending session");
                    self.finish(ExitReason::Eof);
                }
            }
        }
    }

    /// Run one full cycle for `event` and return the resulting state.
    ///
    /// Once the engine is in a terminal state, events are ignored.
    pub fn step(&mut self, event: KeyEvent) -> EngineResult<EngineState> {
        if self.state.is_terminal() {
            log::trace!("session over, ignoring {:?}", event.key);
            return Ok(self.state);
        }

        self.transition(EngineState::Processing);
        let outcome = match self.dispatcher.resolve(&event) {
            Some(action) => self.apply(action)?,
            None => Outcome::default(),
        };

        self.render(outcome.hint)?;
        match outcome.exit {
            Some(reason) => self.finish(reason),
            None => self.transition(EngineState::Idle),
        }
        Ok(self.state)
    }

    fn apply(&mut self, action: Action) -> EngineResult<Outcome> {
        let text_before = self.buffer.text().to_string();
        let cursor_before = self.buffer.cursor_position();
        let mut outcome = Outcome::default();
        let mut completion_action = false;

        match action {
            Action::CompletionNext => {
                self.completion.next();
                completion_action = true;
            }
            Action::CompletionPrevious => {
                self.completion.previous();
                completion_action = true;
            }
            Action::PreviousOrOlder if self.completion.is_completing() => {
                self.completion.previous();
                completion_action = true;
            }
            Action::NextOrNewer if self.completion.is_completing() => {
                self.completion.next();
                completion_action = true;
            }
            Action::PreviousOrOlder if !self.buffer.document().on_first_line() => {
                self.commit_selection();
                self.buffer.cursor_up(1);
            }
            Action::NextOrNewer if !self.buffer.document().on_last_line() => {
                self.commit_selection();
                self.buffer.cursor_down(1);
            }
            Action::PreviousOrOlder | Action::HistoryOlder => {
                self.commit_selection();
                if let Some(entry) = self.history.older(self.buffer.text()) {
                    let entry = entry.to_string();
                    self.buffer.set_text(entry);
                }
            }
            Action::NextOrNewer | Action::HistoryNewer => {
                self.commit_selection();
                if let Some(entry) = self.history.newer(self.buffer.text()) {
                    let entry = entry.to_string();
                    self.buffer.set_text(entry);
                }
            }
            Action::CancelCompletion => {
                self.completion.reset_selection();
                completion_action = true;
            }
            Action::SubmitOrConfirm if self.completion.is_completing() => {
                self.completion.confirm(&mut self.buffer);
                completion_action = true;
            }
            Action::SubmitOrConfirm | Action::Submit => {
                self.commit_selection();
                outcome.exit = self.submit()?;
                return Ok(outcome);
            }
            Action::Abort => {
                outcome.exit = Some(ExitReason::Aborted);
                return Ok(outcome);
            }
            Action::Exit => {
                outcome.exit = Some(ExitReason::Exit);
                return Ok(outcome);
            }
            Action::DeleteCharOrExit if self.buffer.is_empty() => {
                outcome.exit = Some(ExitReason::Exit);
                return Ok(outcome);
            }
            Action::ClearScreen => outcome.hint = Some(RenderHint::ClearScreen),
            Action::Ignore => {}
            edit => {
                self.commit_selection();
                outcome.hint = self.apply_edit(edit);
            }
        }

        let changed =
            self.buffer.text() != text_before || self.buffer.cursor_position() != cursor_before;
        if changed && !completion_action {
            self.refresh_completion()?;
        }
        Ok(outcome)
    }

    fn apply_edit(&mut self, action: Action) -> Option<RenderHint> {
        let separators = self.config.word_separators();
        let buffer = &mut self.buffer;
        match action {
            Action::InsertText(text) => buffer.insert_text(&text, false, true),
            Action::DeleteCharOrExit | Action::DeleteForward => {
                buffer.delete(1);
            }
            Action::DeleteBackward => {
                buffer.delete_before_cursor(1);
            }
            Action::CursorLeft => buffer.cursor_left(1),
            Action::CursorRight => buffer.cursor_right(1),
            Action::CursorUp => buffer.cursor_up(1),
            Action::CursorDown => buffer.cursor_down(1),
            Action::LineStart => buffer.move_to_line_start(),
            Action::LineEnd => buffer.move_to_line_end(),
            Action::WordBackward => buffer.move_to_start_of_word(separators),
            Action::WordForward => buffer.move_to_end_of_word(separators),
            Action::DeleteWordBackward => {
                buffer.delete_word_before_cursor(separators);
            }
            Action::DeleteWordForward => {
                buffer.delete_word_after_cursor(separators);
            }
            Action::KillLineBefore => {
                buffer.kill_line_before_cursor();
            }
            Action::KillLineAfter => {
                buffer.kill_line_after_cursor();
            }
            Action::SwapCharacters => buffer.swap_characters_before_cursor(),
            Action::Custom(f) => return f(buffer),
            other => log::trace!("{other:?} is not a buffer edit"),
        }
        None
    }

    /// Apply a pending suggestion before the buffer is edited further.
    fn commit_selection(&mut self) {
        if self.completion.confirm(&mut self.buffer) {
            log::trace!("committed selected suggestion before edit");
        }
    }

    fn submit(&mut self) -> EngineResult<Option<ExitReason>> {
        self.transition(EngineState::Executing);
        let line = self.buffer.text().to_string();
        log::debug!("submitting line of {} runes", self.buffer.len());

        let committed = self.snapshot(self.last_label.clone(), None);
        self.renderer
            .break_line(&committed, self.config.style())
            .map_err(|err| collaborator_failed(EngineError::Renderer, err))?;

        self.history.add(line.as_str());
        self.executor
            .execute(&line)
            .map_err(|err| collaborator_failed(EngineError::Executor, err))?;

        let exit = self
            .exit_checker
            .as_mut()
            .is_some_and(|checker| checker.should_exit(&line));

        self.buffer.reset();
        self.completion.clear();
        if self.config.show_completion_at_start() {
            self.refresh_completion()?;
        }
        Ok(exit.then_some(ExitReason::Exit))
    }

    fn refresh_completion(&mut self) -> EngineResult<()> {
        self.completion
            .update(&self.buffer.document())
            .map_err(|err| collaborator_failed(EngineError::Completer, err))
    }

    fn render(&mut self, hint: Option<RenderHint>) -> EngineResult<()> {
        self.transition(EngineState::Rendering);
        let label = self
            .label_supplier
            .as_mut()
            .and_then(|supplier| supplier.label());
        self.last_label.clone_from(&label);

        let snapshot = self.snapshot(label, hint);
        self.renderer
            .render(&snapshot, self.config.style())
            .map_err(|err| collaborator_failed(EngineError::Renderer, err))
    }

    fn snapshot(&self, label: Option<String>, hint: Option<RenderHint>) -> RenderSnapshot {
        RenderSnapshot {
            text: self.buffer.text().to_string(),
            cursor_position: self.buffer.cursor_position(),
            suggestions: self.completion.suggestions().to_vec(),
            selected: self.completion.selected(),
            window_start: self.completion.window_start(),
            max_visible: self.completion.max_visible(),
            preview: self
                .completion
                .preview(&self.buffer)
                .map(|preview| preview.text().to_string()),
            label,
            hint,
        }
    }

    fn finish(&mut self, reason: ExitReason) {
        self.exit_reason = Some(reason);
        self.transition(match reason {
            ExitReason::Aborted => EngineState::Aborted,
            ExitReason::Eof | ExitReason::Exit => EngineState::Exited,
        });
        log::debug!("prompt session ended: {reason:?}");
    }

    fn transition(&mut self, next: EngineState) {
        if self.state != next {
            log::trace!("engine {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

fn collaborator_failed(
    wrap: fn(CollaboratorError) -> EngineError,
    err: CollaboratorError,
) -> EngineError {
    let err = wrap(err);
    log::warn!("{err}: {}", source_message(&err));
    err
}

fn source_message(err: &EngineError) -> String {
    std::error::Error::source(err)
        .map(|source| source.to_string())
        .unwrap_or_default()
}
