//! Konghou key mapping — three registers of twelve scale degrees laid over
//! the Z, A, and Q keyboard rows.
//!
//! The playable range is the three octaves C3..=B5 (48..=83). Pitches outside
//! fold in by octave transposition; a pitch that lands on a gap in the degree
//! tables maps to nothing and the caller drops it without sounding anything.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Inclusive bottom of the playable range (C3).
pub const NOTE_MIN: u8 = 48;
/// Inclusive top of the playable range (B5).
pub const NOTE_MAX: u8 = 83;

const OCTAVE: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Shift,
    Ctrl,
}

/// A single key tap, optionally chorded with a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCombo {
    pub modifier: Option<Modifier>,
    pub key: char,
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            Some(Modifier::Shift) => write!(f, "Shift+{}", self.key),
            Some(Modifier::Ctrl) => write!(f, "Ctrl+{}", self.key),
            None => write!(f, "{}", self.key),
        }
    }
}

const fn plain(key: char) -> KeyCombo {
    KeyCombo {
        modifier: None,
        key,
    }
}

const fn shift(key: char) -> KeyCombo {
    KeyCombo {
        modifier: Some(Modifier::Shift),
        key,
    }
}

const fn ctrl(key: char) -> KeyCombo {
    KeyCombo {
        modifier: Some(Modifier::Ctrl),
        key,
    }
}

/// Semitone offset within a register for each scale-degree label.
///
/// "b3" and "3" are distinct labels (flat vs natural third) that happen to
/// fill adjacent semitones; together the twelve labels cover the chromatic
/// octave.
const DEGREE_OFFSETS: [(&str, u8); 12] = [
    ("1", 0),
    ("#1", 1),
    ("2", 2),
    ("b3", 3),
    ("3", 4),
    ("4", 5),
    ("#4", 6),
    ("5", 7),
    ("#5", 8),
    ("6", 9),
    ("b7", 10),
    ("7", 11),
];

/// Key assignments per register: base pitch plus one key per degree label.
const REGISTERS: [(u8, [(&str, KeyCombo); 12]); 3] = [
    // low — C3, bottom row
    (
        48,
        [
            ("1", plain('Z')),
            ("#1", shift('Z')),
            ("2", plain('X')),
            ("b3", ctrl('C')),
            ("3", plain('C')),
            ("4", plain('V')),
            ("#4", shift('V')),
            ("5", plain('B')),
            ("#5", shift('B')),
            ("6", plain('N')),
            ("b7", ctrl('M')),
            ("7", plain('M')),
        ],
    ),
    // med — C4, home row
    (
        60,
        [
            ("1", plain('A')),
            ("#1", shift('A')),
            ("2", plain('S')),
            ("b3", ctrl('D')),
            ("3", plain('D')),
            ("4", plain('F')),
            ("#4", shift('F')),
            ("5", plain('G')),
            ("#5", shift('G')),
            ("6", plain('H')),
            ("b7", ctrl('J')),
            ("7", plain('J')),
        ],
    ),
    // high — C5, top row
    (
        72,
        [
            ("1", plain('Q')),
            ("#1", shift('Q')),
            ("2", plain('W')),
            ("b3", ctrl('E')),
            ("3", plain('E')),
            ("4", plain('R')),
            ("#4", shift('R')),
            ("5", plain('T')),
            ("#5", shift('T')),
            ("6", plain('Y')),
            ("b7", ctrl('U')),
            ("7", plain('U')),
        ],
    ),
];

fn degree_offset(label: &str) -> Option<u8> {
    DEGREE_OFFSETS
        .iter()
        .find(|(degree, _)| *degree == label)
        .map(|&(_, offset)| offset)
}

fn build_map() -> HashMap<u8, KeyCombo> {
    let mut mapping = HashMap::new();
    for (base, keys) in REGISTERS {
        for (degree, combo) in keys {
            let Some(offset) = degree_offset(degree) else {
                continue;
            };
            let pitch = base + offset;
            if (NOTE_MIN..=NOTE_MAX).contains(&pitch) {
                mapping.insert(pitch, combo);
            }
        }
    }
    mapping
}

fn note_keys() -> &'static HashMap<u8, KeyCombo> {
    static NOTE_KEYS: OnceLock<HashMap<u8, KeyCombo>> = OnceLock::new();
    NOTE_KEYS.get_or_init(build_map)
}

/// Fold a pitch into the playable range by whole octaves.
pub fn transpose_into_range(mut pitch: u8) -> u8 {
    while pitch < NOTE_MIN {
        pitch += OCTAVE;
    }
    while pitch > NOTE_MAX {
        pitch -= OCTAVE;
    }
    pitch
}

/// Key combination for a pitch, after folding it into range.
///
/// `None` means the folded pitch has no table entry; the note is dropped
/// silently, never approximated to a neighbour.
pub fn key_for_pitch(pitch: u8) -> Option<KeyCombo> {
    note_keys().get(&transpose_into_range(pitch)).copied()
}
