mod common;

use common::{collecting_executor, key, typed, ChannelSource, RecordingRenderer, ScriptedSource};
use promptline_core::{
    CollaboratorError, Engine, EngineConfig, EngineError, EngineState, ExitReason, InputReader,
    Key, KeyEvent, RenderSnapshot, Renderer, StaticCompleter, StyleConfig,
};

fn hello_engine() -> (Engine, RecordingRenderer, std::sync::Arc<std::sync::Mutex<Vec<String>>>) {
    let renderer = RecordingRenderer::new();
    let (executor, lines) = collecting_executor();
    let engine = Engine::new(
        EngineConfig::default(),
        executor,
        StaticCompleter::from_strings(vec!["hello", "help"]),
        renderer.clone(),
    );
    (engine, renderer, lines)
}

#[test]
fn test_complete_hel_to_hello() {
    let (mut engine, _, _) = hello_engine();
    for event in typed("hel") {
        engine.step(event).unwrap();
    }
    let texts: Vec<_> = engine
        .completion()
        .suggestions()
        .iter()
        .map(|s| s.text.as_str())
        .collect();
    assert_eq!(texts, ["hello", "help"]);

    engine.step(key(Key::Tab)).unwrap();
    assert_eq!(engine.completion().selected(), Some(0));

    engine.step(key(Key::Enter)).unwrap();
    assert_eq!(engine.buffer().text(), "hello");
    assert_eq!(engine.buffer().cursor_position(), 5);
    assert_eq!(engine.completion().selected(), None);
    assert!(engine.completion().suggestions().is_empty());
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn test_session_transcript() {
    let (mut engine, renderer, lines) = hello_engine();
    let mut events = typed("hel");
    events.extend([key(Key::Tab), key(Key::Enter), key(Key::Enter)]);

    let reason = engine.run(ScriptedSource::new(events)).unwrap();

    assert_eq!(reason, ExitReason::Eof);
    assert_eq!(*lines.lock().unwrap(), ["hello"]);
    assert_eq!(engine.history().entries(), ["hello"]);
    insta::assert_snapshot!(renderer.transcript(), @r"
    > |
    > h|  hello help
    > he|  hello help
    > hel|  hello help
    > hel|  [hello] help
    > hello|
    --- hello
    > |
    ");
}

#[test]
fn test_abort_leaves_queued_events_unprocessed() {
    let (mut engine, renderer, lines) = hello_engine();
    let mut events = typed("ab");
    events.push(key(Key::ControlC));
    events.extend(typed("cd"));
    events.push(key(Key::Enter));

    let reason = engine.run(ScriptedSource::new(events)).unwrap();

    assert_eq!(reason, ExitReason::Aborted);
    assert_eq!(engine.state(), EngineState::Aborted);
    assert!(lines.lock().unwrap().is_empty());
    // initial frame, "a", "b", final frame for the abort
    assert_eq!(renderer.render_count(), 4);
    assert_eq!(renderer.last_frame().text, "ab");
}

#[test]
fn test_keystrokes_after_abort_stay_in_the_source() {
    let (mut engine, _, _) = hello_engine();
    let (sender, source) = ChannelSource::new();
    let terminal = source.clone();
    sender.send(KeyEvent::text("a")).unwrap();
    sender.send(key(Key::ControlC)).unwrap();

    assert_eq!(engine.run(source).unwrap(), ExitReason::Aborted);

    // typed while the application is between prompts
    sender.send(KeyEvent::text("x")).unwrap();
    let next = terminal.try_take().expect("keystroke was consumed after the session");
    assert_eq!(next.text_or_empty(), "x");
    assert!(terminal.try_take().is_none());
}

#[test]
fn test_one_reader_serves_consecutive_prompts() {
    let (sender, source) = ChannelSource::new();
    let mut events = typed("ls");
    events.push(key(Key::Enter));
    events.extend(typed("pwd"));
    events.push(key(Key::Enter));
    for event in events {
        sender.send(event).unwrap();
    }
    drop(sender);

    let reader = InputReader::spawn(source).unwrap();

    let (executor, first_lines) = collecting_executor();
    let mut first = Engine::new(
        EngineConfig::default(),
        executor,
        StaticCompleter::default(),
        RecordingRenderer::new(),
    )
    .with_exit_checker(|_: &str| true);
    assert_eq!(first.run_reader(&reader).unwrap(), ExitReason::Exit);

    let (executor, second_lines) = collecting_executor();
    let mut second = Engine::new(
        EngineConfig::default(),
        executor,
        StaticCompleter::default(),
        RecordingRenderer::new(),
    );
    assert_eq!(second.run_reader(&reader).unwrap(), ExitReason::Eof);
    reader.shutdown().unwrap();

    assert_eq!(*first_lines.lock().unwrap(), ["ls"]);
    assert_eq!(*second_lines.lock().unwrap(), ["pwd"]);
}

#[test]
fn test_multibyte_editing_through_engine() {
    let (mut engine, renderer, lines) = hello_engine();
    let mut events = typed("日本語");
    events.extend([key(Key::Left), key(Key::Backspace)]);
    events.extend(typed("x"));
    events.push(key(Key::Enter));

    engine.run(ScriptedSource::new(events)).unwrap();

    assert_eq!(*lines.lock().unwrap(), ["日x語"]);
    let frames = renderer.frames();
    let after_backspace = &frames[frames.len() - 3];
    assert_eq!(after_backspace.text, "日語");
    assert_eq!(after_backspace.cursor_position, 1);
}

#[test]
fn test_history_recalled_across_submits() {
    let (mut engine, _, lines) = hello_engine();
    let mut events = typed("one");
    events.push(key(Key::Enter));
    events.extend(typed("two"));
    events.push(key(Key::Enter));
    events.extend([key(Key::Up), key(Key::Up), key(Key::Enter)]);

    engine.run(ScriptedSource::new(events)).unwrap();

    assert_eq!(*lines.lock().unwrap(), ["one", "two", "one"]);
    assert_eq!(engine.history().entries(), ["one", "two", "one"]);
}

#[test]
fn test_renderer_failure_ends_session_with_error() {
    struct Fragile {
        budget: usize,
    }

    impl Renderer for Fragile {
        fn render(
            &mut self,
            _: &RenderSnapshot,
            _: &StyleConfig,
        ) -> Result<(), CollaboratorError> {
            if self.budget == 0 {
                return Err(CollaboratorError::msg("broken pipe"));
            }
            self.budget -= 1;
            Ok(())
        }
    }

    let (executor, _) = collecting_executor();
    let mut engine = Engine::new(
        EngineConfig::default(),
        executor,
        StaticCompleter::default(),
        Fragile { budget: 2 },
    );

    let err = engine
        .run(ScriptedSource::new(typed("abc")))
        .unwrap_err();
    assert!(matches!(err, EngineError::Renderer(_)));
    assert_eq!(engine.buffer().text(), "ab");
}

#[test]
fn test_executor_failure_propagates() {
    struct Refuses;

    impl promptline_core::Executor for Refuses {
        fn execute(&mut self, line: &str) -> Result<(), CollaboratorError> {
            Err(CollaboratorError::msg(format!("cannot run {line}")))
        }
    }

    let mut engine = Engine::new(
        EngineConfig::default(),
        Refuses,
        StaticCompleter::default(),
        RecordingRenderer::new(),
    );
    let mut events = typed("rm");
    events.push(key(Key::Enter));

    let err = engine.run(ScriptedSource::new(events)).unwrap_err();
    assert!(matches!(err, EngineError::Executor(_)));
    assert_eq!(engine.history().entries(), ["rm"]);
}

#[test]
fn test_ignored_input_is_still_one_cycle() {
    let (mut engine, renderer, _) = hello_engine();
    engine.step(KeyEvent::raw(*b"\x1b[200;5~")).unwrap();
    engine.step(KeyEvent::simple(Key::F12, b"\x1b[24~".to_vec())).unwrap();
    assert_eq!(renderer.render_count(), 2);
    assert_eq!(engine.buffer().text(), "");
}

#[test]
fn test_paste_with_stray_control_byte_is_inserted() {
    let (mut engine, _, _) = hello_engine();
    engine.step(KeyEvent::text(">")).unwrap();
    let paste = KeyEvent::new(
        Key::BracketedPaste,
        b"\x1b[200~hello\x07world\x1b[201~".to_vec(),
        Some("hello\x07world".into()),
    );
    engine.step(paste).unwrap();

    assert_eq!(engine.buffer().text(), ">helloworld");
    assert_eq!(engine.buffer().cursor_position(), 11);
}
