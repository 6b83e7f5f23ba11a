//! Incremental decoder from raw terminal bytes to key events.
//!
//! Bytes can arrive split at any point, so the decoder is a small state
//! machine that holds partial escape sequences and partial UTF-8 characters
//! until they complete. Output rules:
//!
//! - a named sequence becomes an event for that [`Key`] carrying the bytes;
//! - a printable character becomes a [`Key::NotDefined`] event with text;
//! - `ESC` followed by one printable byte (a Meta chord) becomes a
//!   [`Key::NotDefined`] event with those two raw bytes and no text, so it
//!   can be caught by a raw binding;
//! - an unknown CSI sequence becomes a raw [`Key::NotDefined`] event;
//! - a bracketed paste becomes one [`Key::BracketedPaste`] event whose text
//!   has its line endings normalized to `\n`. A paste larger than the
//!   decoder will hold is delivered as several consecutive paste events.

use std::mem;

use promptline_core::{Key, KeyEvent};

use crate::sequence::{Lookup, SequenceTable};

const ESC: u8 = 0x1b;
const MAX_PENDING: usize = 1024;
/// Paste bytes held before a partial paste event is emitted.
const MAX_PASTE: usize = 1 << 20;

pub const PASTE_START: &[u8] = b"\x1b[200~";
pub const PASTE_END: &[u8] = b"\x1b[201~";

/// What the decoder is in the middle of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Ground,
    /// Saw `ESC`, not yet `ESC [`.
    Escape,
    /// Inside a Control Sequence Introducer.
    Csi,
    /// Waiting for `remaining` continuation bytes.
    Utf8 { remaining: usize },
    /// Between the paste start and end markers.
    Paste,
}

/// Turns a byte stream into [`KeyEvent`]s.
#[derive(Debug, Clone)]
pub struct KeyDecoder {
    state: DecoderState,
    pending: Vec<u8>,
    paste: Vec<u8>,
    /// Part of the current paste was already emitted.
    paste_continued: bool,
    table: SequenceTable,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::with_table(SequenceTable::default())
    }

    pub fn with_table(table: SequenceTable) -> Self {
        KeyDecoder {
            state: DecoderState::Ground,
            pending: Vec::new(),
            paste: Vec::new(),
            paste_continued: false,
            table,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Whether bytes are being held back waiting for more input.
    pub fn has_pending(&self) -> bool {
        self.state != DecoderState::Ground
    }

    /// Decode `bytes` and return every event they complete.
    ///
    /// ```
    /// use promptline_io::{Key, KeyDecoder};
    ///
    /// let mut decoder = KeyDecoder::new();
    /// assert!(decoder.feed(b"\x1b[").is_empty());
    /// let events = decoder.feed(b"Ah");
    /// assert_eq!(events[0].key, Key::Up);
    /// assert_eq!(events[1].text.as_deref(), Some("h"));
    /// ```
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        for &byte in bytes {
            if self.pending.len() >= MAX_PENDING {
                log::trace!("discarding {} undecodable bytes", self.pending.len());
                events.push(KeyEvent::raw(mem::take(&mut self.pending)));
                self.state = DecoderState::Ground;
            }
            self.step(byte, &mut events);
        }
        events
    }

    /// Resolve a pending `ESC` or Meta prefix at the end of a read.
    ///
    /// Terminals write an escape sequence in one go, so an `ESC` left over
    /// once a read is drained was the Escape key itself (or a Meta chord
    /// whose second byte happens to start a longer sequence). Pending CSI,
    /// UTF-8 and paste input is left alone.
    pub fn settle_escape(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        if self.state == DecoderState::Escape {
            self.settle(&mut events);
        }
        events
    }

    /// Emit everything still held, as at end of input.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        self.settle(&mut events);
        match self.state {
            DecoderState::Utf8 { .. } => {
                events.push(KeyEvent::raw(mem::take(&mut self.pending)));
            }
            DecoderState::Paste => {
                log::trace!("input ended inside a bracketed paste");
                events.push(self.finish_paste(false));
            }
            _ => {}
        }
        self.reset();
        events
    }

    pub fn reset(&mut self) {
        self.state = DecoderState::Ground;
        self.pending.clear();
        self.paste.clear();
        self.paste_continued = false;
    }

    fn step(&mut self, byte: u8, events: &mut Vec<KeyEvent>) {
        match self.state {
            DecoderState::Ground => self.ground(byte, events),
            DecoderState::Escape => self.escape(byte, events),
            DecoderState::Csi => self.csi(byte, events),
            DecoderState::Utf8 { remaining } => self.utf8(byte, remaining, events),
            DecoderState::Paste => self.paste_byte(byte, events),
        }
    }

    fn ground(&mut self, byte: u8, events: &mut Vec<KeyEvent>) {
        match byte {
            ESC => {
                self.pending.push(byte);
                self.state = DecoderState::Escape;
            }
            0x20..=0x7e => events.push(KeyEvent::text(char::from(byte).to_string())),
            0xc2..=0xdf => self.begin_utf8(byte, 1),
            0xe0..=0xef => self.begin_utf8(byte, 2),
            0xf0..=0xf4 => self.begin_utf8(byte, 3),
            _ => match self.table.lookup(&[byte]) {
                Lookup::Exact(key) => events.push(KeyEvent::simple(key, vec![byte])),
                _ => {
                    log::trace!("stray byte {byte:#04x}");
                    events.push(KeyEvent::raw(vec![byte]));
                }
            },
        }
    }

    fn begin_utf8(&mut self, lead: u8, remaining: usize) {
        self.pending.push(lead);
        self.state = DecoderState::Utf8 { remaining };
    }

    fn utf8(&mut self, byte: u8, remaining: usize, events: &mut Vec<KeyEvent>) {
        if !is_utf8_continuation(byte) {
            events.push(KeyEvent::raw(mem::take(&mut self.pending)));
            self.state = DecoderState::Ground;
            self.step(byte, events);
            return;
        }

        self.pending.push(byte);
        if remaining > 1 {
            self.state = DecoderState::Utf8 {
                remaining: remaining - 1,
            };
            return;
        }

        self.state = DecoderState::Ground;
        match String::from_utf8(mem::take(&mut self.pending)) {
            Ok(text) => events.push(KeyEvent::text(text)),
            Err(err) => events.push(KeyEvent::raw(err.into_bytes())),
        }
    }

    fn escape(&mut self, byte: u8, events: &mut Vec<KeyEvent>) {
        self.pending.push(byte);
        if byte == b'[' && self.pending.len() == 2 {
            self.state = DecoderState::Csi;
            return;
        }

        match self.table.lookup(&self.pending) {
            Lookup::Exact(key) => self.emit_pending(key, events),
            Lookup::Prefix => {}
            Lookup::NoMatch if self.pending.len() == 2 && is_meta_byte(byte) => {
                events.push(KeyEvent::raw(mem::take(&mut self.pending)));
                self.state = DecoderState::Ground;
            }
            Lookup::NoMatch => self.abandon_sequence(events),
        }
    }

    fn csi(&mut self, byte: u8, events: &mut Vec<KeyEvent>) {
        self.pending.push(byte);
        if self.pending == PASTE_START {
            self.pending.clear();
            self.state = DecoderState::Paste;
            return;
        }

        match self.table.lookup(&self.pending) {
            Lookup::Exact(key) => self.emit_pending(key, events),
            Lookup::Prefix => {}
            Lookup::NoMatch if is_csi_parameter(byte) => {}
            Lookup::NoMatch if is_csi_final(byte) => {
                log::trace!("unknown CSI sequence {:?}", self.pending);
                events.push(KeyEvent::raw(mem::take(&mut self.pending)));
                self.state = DecoderState::Ground;
            }
            Lookup::NoMatch => self.abandon_sequence(events),
        }
    }

    fn paste_byte(&mut self, byte: u8, events: &mut Vec<KeyEvent>) {
        self.paste.push(byte);
        if self.paste.ends_with(PASTE_END) {
            let content = self.paste.len() - PASTE_END.len();
            self.paste.truncate(content);
            events.push(self.finish_paste(true));
            self.paste_continued = false;
            self.state = DecoderState::Ground;
        } else if self.paste.len() >= MAX_PASTE {
            log::trace!("paste exceeded {MAX_PASTE} bytes, emitting what arrived so far");
            let tail = self.paste.split_off(self.paste_chunk_end());
            events.push(self.finish_paste(false));
            self.paste = tail;
            self.paste_continued = true;
        }
    }

    /// Where to cut an oversized paste. Holds back anything that could start
    /// the end marker, a split `\r\n` or a split UTF-8 character.
    fn paste_chunk_end(&self) -> usize {
        let limit = self.paste.len() - (PASTE_END.len() - 1);
        let mut end = limit;
        while end > 0 && is_utf8_continuation(self.paste[end]) {
            end -= 1;
        }
        if end == 0 {
            end = limit;
        }
        if self.paste[end - 1] == b'\r' {
            end -= 1;
        }
        end
    }

    fn finish_paste(&mut self, terminated: bool) -> KeyEvent {
        let content = mem::take(&mut self.paste);
        let text = normalize_newlines(&String::from_utf8_lossy(&content));

        let mut raw = if self.paste_continued {
            Vec::new()
        } else {
            PASTE_START.to_vec()
        };
        raw.extend_from_slice(&content);
        if terminated {
            raw.extend_from_slice(PASTE_END);
        }
        KeyEvent::new(Key::BracketedPaste, raw, Some(text))
    }

    fn emit_pending(&mut self, key: Key, events: &mut Vec<KeyEvent>) {
        let bytes = mem::take(&mut self.pending);
        self.state = DecoderState::Ground;
        events.push(KeyEvent::simple(key, bytes));
    }

    /// The pending bytes cannot become a sequence: emit the `ESC` as the
    /// Escape key and decode what followed it from scratch.
    fn abandon_sequence(&mut self, events: &mut Vec<KeyEvent>) {
        let rest = self.pending.split_off(1);
        self.emit_pending(Key::Escape, events);
        for byte in rest {
            self.step(byte, events);
        }
    }

    /// Turn held escape input into events without waiting for more bytes.
    fn settle(&mut self, events: &mut Vec<KeyEvent>) {
        while matches!(self.state, DecoderState::Escape | DecoderState::Csi) {
            let pending = mem::take(&mut self.pending);
            self.state = DecoderState::Ground;

            let rest = match pending.len() {
                0 | 1 => {
                    events.push(KeyEvent::simple(Key::Escape, vec![ESC]));
                    Vec::new()
                }
                2 => {
                    events.push(KeyEvent::raw(pending));
                    Vec::new()
                }
                _ => match self.table.longest_match(&pending) {
                    Some((key, len)) => {
                        events.push(KeyEvent::simple(key, pending[..len].to_vec()));
                        pending[len..].to_vec()
                    }
                    None => {
                        events.push(KeyEvent::raw(pending));
                        Vec::new()
                    }
                },
            };
            for byte in rest {
                self.step(byte, events);
            }
        }
    }
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_meta_byte(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7f)
}

fn is_utf8_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

fn is_csi_parameter(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b';' | b':' | b'<' | b'=' | b'>' | b'?')
}

fn is_csi_final(byte: u8) -> bool {
    matches!(byte, b'@'..=b'~')
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(events: &[KeyEvent]) -> Vec<Key> {
        events.iter().map(|e| e.key).collect()
    }

    #[test]
    fn test_printable_ascii() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed(b"ls -l");
        let text: String = events.iter().map(|e| e.text_or_empty()).collect();
        assert_eq!(text, "ls -l");
        assert!(events.iter().all(|e| e.key == Key::NotDefined));
        assert_eq!(events[0].raw_bytes, b"l");
    }

    #[test]
    fn test_control_bytes() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed(&[0x09, 0x0d, 0x0a, 0x08, 0x7f, 0x03]);
        assert_eq!(
            keys(&events),
            [
                Key::Tab,
                Key::Enter,
                Key::ControlJ,
                Key::ControlH,
                Key::Backspace,
                Key::ControlC
            ]
        );
        assert_eq!(events[0].raw_bytes, [0x09]);
    }

    #[test]
    fn test_multibyte_split_across_feeds() {
        let mut decoder = KeyDecoder::new();
        let bytes = "日é".as_bytes();
        assert!(decoder.feed(&bytes[..2]).is_empty());
        assert_eq!(decoder.state(), DecoderState::Utf8 { remaining: 1 });

        let events = decoder.feed(&bytes[2..]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].text.as_deref(), Some("日"));
        assert_eq!(events[0].raw_bytes, "日".as_bytes());
        assert_eq!(events[1].text.as_deref(), Some("é"));
    }

    #[test]
    fn test_broken_utf8_is_raw() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed(&[0xe6, 0x97, b'a']);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, Key::NotDefined);
        assert_eq!(events[0].raw_bytes, [0xe6, 0x97]);
        assert!(events[0].text.is_none());
        assert_eq!(events[1].text.as_deref(), Some("a"));

        let events = decoder.feed(&[0x80, 0xff]);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.text.is_none()));
    }

    #[test]
    fn test_csi_split_across_feeds() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert!(decoder.feed(b"[1;").is_empty());
        assert!(decoder.feed(b"5").is_empty());
        let events = decoder.feed(b"C");
        assert_eq!(keys(&events), [Key::ControlRight]);
        assert_eq!(events[0].raw_bytes, b"\x1b[1;5C");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_application_mode_arrows() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed(b"\x1bOA\x1bOD\x1b[Z");
        assert_eq!(keys(&events), [Key::Up, Key::Left, Key::BackTab]);
    }

    #[test]
    fn test_meta_chord_is_raw_two_bytes() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed(b"\x1bb\x1b\x7f");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, Key::NotDefined);
        assert_eq!(events[0].raw_bytes, b"\x1bb");
        assert!(events[0].text.is_none());
        assert_eq!(events[1].raw_bytes, b"\x1b\x7f");
    }

    #[test]
    fn test_unknown_csi_is_raw() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed(b"\x1b[1;3Dx");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, Key::NotDefined);
        assert_eq!(events[0].raw_bytes, b"\x1b[1;3D");
        assert_eq!(events[1].text.as_deref(), Some("x"));
    }

    #[test]
    fn test_ignore_sequence_is_reported() {
        let mut decoder = KeyDecoder::new();
        assert_eq!(keys(&decoder.feed(b"\x1b[E")), [Key::Ignore]);
    }

    #[test]
    fn test_lone_escape_waits_for_settle() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert_eq!(decoder.state(), DecoderState::Escape);

        let events = decoder.settle_escape();
        assert_eq!(keys(&events), [Key::Escape]);
        assert_eq!(decoder.state(), DecoderState::Ground);
    }

    #[test]
    fn test_settle_leaves_csi_alone() {
        let mut decoder = KeyDecoder::new();
        decoder.feed(b"\x1b[1");
        assert!(decoder.settle_escape().is_empty());
        assert_eq!(keys(&decoder.feed(b"~")), [Key::Home]);
    }

    #[test]
    fn test_double_escape() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed(b"\x1b\x1b[A");
        assert_eq!(keys(&events), [Key::Escape, Key::Up]);
    }

    #[test]
    fn test_escape_then_control_byte() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed(&[ESC, 0x03]);
        assert_eq!(keys(&events), [Key::Escape, Key::ControlC]);
    }

    #[test]
    fn test_malformed_csi_restarts() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed(b"\x1b[1\x01");
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].key, Key::Escape);
        assert_eq!(events[1].text.as_deref(), Some("["));
        assert_eq!(events[2].text.as_deref(), Some("1"));
        assert_eq!(events[3].key, Key::ControlA);
    }

    #[test]
    fn test_bracketed_paste() {
        let mut decoder = KeyDecoder::new();
        let mut input = PASTE_START.to_vec();
        input.extend_from_slice(b"echo a\r\necho b\rdone");
        input.extend_from_slice(PASTE_END);
        input.push(b'!');

        let events = decoder.feed(&input);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, Key::BracketedPaste);
        assert_eq!(events[0].text.as_deref(), Some("echo a\necho b\ndone"));
        assert!(events[0].raw_bytes.starts_with(PASTE_START));
        assert!(events[0].raw_bytes.ends_with(PASTE_END));
        assert_eq!(events[1].text.as_deref(), Some("!"));
    }

    #[test]
    fn test_paste_keeps_escape_bytes_and_spans_feeds() {
        let mut decoder = KeyDecoder::new();
        decoder.feed(PASTE_START);
        assert_eq!(decoder.state(), DecoderState::Paste);
        assert!(decoder.feed(b"a\x1b[Ab").is_empty());
        assert!(decoder.feed(b"\x1b[20").is_empty());
        let events = decoder.feed(b"1~");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text.as_deref(), Some("a\x1b[Ab"));
    }

    #[test]
    fn test_oversized_paste_arrives_in_order_without_loss() {
        let mut decoder = KeyDecoder::new();
        let mut input = PASTE_START.to_vec();
        input.extend(std::iter::repeat(b'x').take(MAX_PASTE - 2));
        input.extend_from_slice("日本\r\ntail".as_bytes());
        input.extend_from_slice(PASTE_END);

        let events = decoder.feed(&input);
        assert_eq!(keys(&events), [Key::BracketedPaste, Key::BracketedPaste]);
        assert!(events[0].raw_bytes.starts_with(PASTE_START));
        assert!(!events[0].raw_bytes.ends_with(PASTE_END));
        assert!(!events[1].raw_bytes.starts_with(PASTE_START));
        assert!(events[1].raw_bytes.ends_with(PASTE_END));

        let text: String = events.iter().map(|e| e.text_or_empty()).collect();
        let expected = format!("{}日本\ntail", "x".repeat(MAX_PASTE - 2));
        assert_eq!(text, expected);
        assert_eq!(decoder.state(), DecoderState::Ground);
    }

    #[test]
    fn test_oversized_paste_does_not_split_crlf() {
        let mut decoder = KeyDecoder::new();
        let mut input = PASTE_START.to_vec();
        input.extend(std::iter::repeat(b'y').take(MAX_PASTE - 6));
        input.extend_from_slice(b"\r\nz");
        input.extend_from_slice(PASTE_END);

        let events = decoder.feed(&input);
        assert_eq!(events.len(), 2);
        let text: String = events.iter().map(|e| e.text_or_empty()).collect();
        assert_eq!(text, format!("{}\nz", "y".repeat(MAX_PASTE - 6)));
        assert!(events[1].raw_bytes.starts_with(b"\r\n"));
    }

    #[test]
    fn test_flush_emits_held_input() {
        let mut decoder = KeyDecoder::new();
        decoder.feed(b"\x1b[Ax");
        assert!(decoder.flush().is_empty());

        decoder.feed(b"\x1bO");
        let events = decoder.flush();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].raw_bytes, b"\x1bO");

        decoder.feed(b"\x1b[1;5");
        let events = decoder.flush();
        assert_eq!(keys(&events), [Key::Escape, Key::NotDefined, Key::NotDefined, Key::NotDefined, Key::NotDefined]);
        assert_eq!(events[1].text.as_deref(), Some("["));

        decoder.feed(&[0xe6]);
        let events = decoder.flush();
        assert_eq!(events[0].raw_bytes, [0xe6]);

        decoder.feed(b"\x1b[200~half");
        let events = decoder.flush();
        assert_eq!(events[0].key, Key::BracketedPaste);
        assert_eq!(events[0].text.as_deref(), Some("half"));
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_custom_table() {
        let mut table = SequenceTable::default();
        table.insert(*b"\x1b[1;3D", Key::ControlLeft);
        let mut decoder = KeyDecoder::with_table(table);
        assert_eq!(keys(&decoder.feed(b"\x1b[1;3D")), [Key::ControlLeft]);
    }
}
