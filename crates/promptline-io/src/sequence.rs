//! Byte sequences terminals send for named keys.
//!
//! The default table follows the VT100/xterm conventions plus the Linux
//! console and rxvt variants. Lookups distinguish a complete sequence from
//! a prefix of a longer one, which is what the decoder needs to decide
//! whether to wait for more bytes.

use std::collections::BTreeMap;
use std::ops::Bound;

use promptline_core::Key;

/// A named key and the bytes that produce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiSequence {
    pub key: Key,
    pub bytes: &'static [u8],
}

const fn seq(key: Key, bytes: &'static [u8]) -> AsciiSequence {
    AsciiSequence { key, bytes }
}

/// Sequences recognised out of the box.
pub const ASCII_SEQUENCES: &[AsciiSequence] = &[
    seq(Key::Escape, b"\x1b"),
    seq(Key::ControlSpace, b"\x00"),
    seq(Key::ControlA, b"\x01"),
    seq(Key::ControlB, b"\x02"),
    seq(Key::ControlC, b"\x03"),
    seq(Key::ControlD, b"\x04"),
    seq(Key::ControlE, b"\x05"),
    seq(Key::ControlF, b"\x06"),
    seq(Key::ControlG, b"\x07"),
    seq(Key::ControlH, b"\x08"),
    seq(Key::Tab, b"\x09"),
    seq(Key::ControlJ, b"\x0a"),
    seq(Key::ControlK, b"\x0b"),
    seq(Key::ControlL, b"\x0c"),
    seq(Key::Enter, b"\x0d"),
    seq(Key::ControlN, b"\x0e"),
    seq(Key::ControlO, b"\x0f"),
    seq(Key::ControlP, b"\x10"),
    seq(Key::ControlQ, b"\x11"),
    seq(Key::ControlR, b"\x12"),
    seq(Key::ControlS, b"\x13"),
    seq(Key::ControlT, b"\x14"),
    seq(Key::ControlU, b"\x15"),
    seq(Key::ControlV, b"\x16"),
    seq(Key::ControlW, b"\x17"),
    seq(Key::ControlX, b"\x18"),
    seq(Key::ControlY, b"\x19"),
    seq(Key::ControlZ, b"\x1a"),
    seq(Key::ControlBackslash, b"\x1c"),
    seq(Key::ControlSquareClose, b"\x1d"),
    seq(Key::ControlCircumflex, b"\x1e"),
    seq(Key::ControlUnderscore, b"\x1f"),
    seq(Key::Backspace, b"\x7f"),
    // cursor keys, normal and application mode
    seq(Key::Up, b"\x1b[A"),
    seq(Key::Down, b"\x1b[B"),
    seq(Key::Right, b"\x1b[C"),
    seq(Key::Left, b"\x1b[D"),
    seq(Key::Up, b"\x1bOA"),
    seq(Key::Down, b"\x1bOB"),
    seq(Key::Right, b"\x1bOC"),
    seq(Key::Left, b"\x1bOD"),
    seq(Key::Home, b"\x1b[H"),
    seq(Key::Home, b"\x1bOH"),
    seq(Key::Home, b"\x1b0H"),
    seq(Key::Home, b"\x1b[1~"),
    seq(Key::Home, b"\x1b[7~"),
    seq(Key::End, b"\x1b[F"),
    seq(Key::End, b"\x1bOF"),
    seq(Key::End, b"\x1b0F"),
    seq(Key::End, b"\x1b[4~"),
    seq(Key::End, b"\x1b[8~"),
    seq(Key::Insert, b"\x1b[2~"),
    seq(Key::Delete, b"\x1b[3~"),
    seq(Key::ShiftDelete, b"\x1b[3;2~"),
    seq(Key::ControlDelete, b"\x1b[3;5~"),
    seq(Key::PageUp, b"\x1b[5~"),
    seq(Key::PageDown, b"\x1b[6~"),
    seq(Key::BackTab, b"\x1b[Z"),
    seq(Key::F1, b"\x1bOP"),
    seq(Key::F2, b"\x1bOQ"),
    seq(Key::F3, b"\x1bOR"),
    seq(Key::F4, b"\x1bOS"),
    // Linux console
    seq(Key::F1, b"\x1b[[A"),
    seq(Key::F2, b"\x1b[[B"),
    seq(Key::F3, b"\x1b[[C"),
    seq(Key::F4, b"\x1b[[D"),
    seq(Key::F5, b"\x1b[[E"),
    // rxvt
    seq(Key::F1, b"\x1b[11~"),
    seq(Key::F2, b"\x1b[12~"),
    seq(Key::F3, b"\x1b[13~"),
    seq(Key::F4, b"\x1b[14~"),
    seq(Key::F5, b"\x1b[15~"),
    seq(Key::F6, b"\x1b[17~"),
    seq(Key::F7, b"\x1b[18~"),
    seq(Key::F8, b"\x1b[19~"),
    seq(Key::F9, b"\x1b[20~"),
    seq(Key::F10, b"\x1b[21~"),
    seq(Key::F11, b"\x1b[23~"),
    seq(Key::F12, b"\x1b[24~"),
    seq(Key::F13, b"\x1b[25~"),
    seq(Key::F14, b"\x1b[26~"),
    seq(Key::F15, b"\x1b[28~"),
    seq(Key::F16, b"\x1b[29~"),
    seq(Key::F17, b"\x1b[31~"),
    seq(Key::F18, b"\x1b[32~"),
    seq(Key::F19, b"\x1b[33~"),
    seq(Key::F20, b"\x1b[34~"),
    // xterm shifted function keys
    seq(Key::F13, b"\x1b[1;2P"),
    seq(Key::F14, b"\x1b[1;2Q"),
    seq(Key::F15, b"\x1b[1;2R"),
    seq(Key::F16, b"\x1b[1;2S"),
    seq(Key::F17, b"\x1b[15;2~"),
    seq(Key::F18, b"\x1b[17;2~"),
    seq(Key::F19, b"\x1b[18;2~"),
    seq(Key::F20, b"\x1b[19;2~"),
    seq(Key::F21, b"\x1b[20;2~"),
    seq(Key::F22, b"\x1b[21;2~"),
    seq(Key::F23, b"\x1b[23;2~"),
    seq(Key::F24, b"\x1b[24;2~"),
    seq(Key::ControlUp, b"\x1b[1;5A"),
    seq(Key::ControlDown, b"\x1b[1;5B"),
    seq(Key::ControlRight, b"\x1b[1;5C"),
    seq(Key::ControlLeft, b"\x1b[1;5D"),
    seq(Key::ControlUp, b"\x1b[5A"),
    seq(Key::ControlDown, b"\x1b[5B"),
    seq(Key::ControlRight, b"\x1b[5C"),
    seq(Key::ControlLeft, b"\x1b[5D"),
    seq(Key::ControlRight, b"\x1b[Oc"),
    seq(Key::ControlLeft, b"\x1b[Od"),
    seq(Key::ShiftUp, b"\x1b[1;2A"),
    seq(Key::ShiftDown, b"\x1b[1;2B"),
    seq(Key::ShiftRight, b"\x1b[1;2C"),
    seq(Key::ShiftLeft, b"\x1b[1;2D"),
    // xterm keypad 5
    seq(Key::Ignore, b"\x1b[E"),
];

/// Outcome of looking up a partial or complete sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The bytes name a key.
    Exact(Key),
    /// The bytes start at least one longer sequence.
    Prefix,
    NoMatch,
}

/// Lookup table from byte sequences to keys.
#[derive(Debug, Clone)]
pub struct SequenceTable {
    sequences: BTreeMap<Vec<u8>, Key>,
}

impl SequenceTable {
    /// A table without any sequences.
    pub fn empty() -> Self {
        SequenceTable {
            sequences: BTreeMap::new(),
        }
    }

    /// Add or replace a sequence.
    pub fn insert(&mut self, bytes: impl Into<Vec<u8>>, key: Key) {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return;
        }
        self.sequences.insert(bytes, key);
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Classify `bytes` against the table. A complete sequence wins over
    /// being the prefix of a longer one.
    ///
    /// ```
    /// use promptline_io::sequence::{Lookup, SequenceTable};
    /// use promptline_io::Key;
    ///
    /// let table = SequenceTable::default();
    /// assert_eq!(table.lookup(b"\x1b[A"), Lookup::Exact(Key::Up));
    /// assert_eq!(table.lookup(b"\x1b[1;5"), Lookup::Prefix);
    /// assert_eq!(table.lookup(b"\x1b[9"), Lookup::NoMatch);
    /// ```
    pub fn lookup(&self, bytes: &[u8]) -> Lookup {
        if bytes.is_empty() {
            return Lookup::NoMatch;
        }
        if let Some(key) = self.sequences.get(bytes) {
            return Lookup::Exact(*key);
        }

        // Every extension of `bytes` sorts directly after it.
        let next = self
            .sequences
            .range::<[u8], _>((Bound::Excluded(bytes), Bound::Unbounded))
            .next();
        match next {
            Some((sequence, _)) if sequence.starts_with(bytes) => Lookup::Prefix,
            _ => Lookup::NoMatch,
        }
    }

    /// The longest sequence at the start of `bytes`, with its length.
    pub fn longest_match(&self, bytes: &[u8]) -> Option<(Key, usize)> {
        (1..=bytes.len())
            .rev()
            .find_map(|len| self.sequences.get(&bytes[..len]).map(|key| (*key, len)))
    }
}

impl Default for SequenceTable {
    fn default() -> Self {
        let mut table = SequenceTable::empty();
        for sequence in ASCII_SEQUENCES {
            // first entry wins, as with a linear scan of the list
            table
                .sequences
                .entry(sequence.bytes.to_vec())
                .or_insert(sequence.key);
        }
        table
    }
}
