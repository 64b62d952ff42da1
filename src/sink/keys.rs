//! Keystroke macro sink — chords become rolled key taps on the konghou
//! layout.
//!
//! Keystrokes are momentary, so there is no sustain: note-offs and program
//! changes are ignored. Within a chord the taps are rolled with a short
//! delay, scaled so louder chords strum faster.

use std::thread;
use std::time::Duration;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use super::{OutputSink, SinkError};
use crate::config::RollConfig;
use crate::keymap::{self, KeyCombo, Modifier};
use crate::player::chord::Chord;

/// Keystroke-backed output sink.
pub struct MacroSink {
    enigo: Enigo,
    roll: RollConfig,
    released: bool,
}

impl MacroSink {
    pub fn new(roll: RollConfig) -> Result<Self, SinkError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| SinkError::Input(e.to_string()))?;
        Ok(Self {
            enigo,
            roll,
            released: false,
        })
    }

    fn tap(&mut self, combo: KeyCombo) {
        let modifier = combo.modifier.map(|m| match m {
            Modifier::Shift => Key::Shift,
            Modifier::Ctrl => Key::Control,
        });
        if let Some(key) = modifier {
            let _ = self.enigo.key(key, Direction::Press);
        }
        let _ = self
            .enigo
            .key(Key::Unicode(combo.key.to_ascii_lowercase()), Direction::Click);
        if let Some(key) = modifier {
            let _ = self.enigo.key(key, Direction::Release);
        }
    }
}

/// Inter-note delay within one chord: louder chords strum faster, bounded
/// below by the configured minimum.
fn roll_delay(velocity: u8, roll: RollConfig) -> Duration {
    let fraction = f64::from(velocity.min(127)) / 127.0;
    let spread = roll.max_ms - roll.min_ms;
    let ms = (roll.max_ms - fraction * spread).max(roll.min_ms);
    Duration::from_secs_f64(ms / 1000.0)
}

impl OutputSink for MacroSink {
    fn on_chord(&mut self, chord: &Chord) {
        if self.released {
            return;
        }
        let delay = roll_delay(chord.velocity(), self.roll);
        let pitches = chord.pitches();
        for (i, &pitch) in pitches.iter().enumerate() {
            let Some(combo) = keymap::key_for_pitch(pitch) else {
                // Unmapped after register folding: dropped, nothing emitted.
                continue;
            };
            self.tap(combo);
            if i + 1 < pitches.len() {
                thread::sleep(delay);
            }
        }
    }

    fn on_note_off(&mut self, _channel: u8, _pitch: u8) {}

    fn set_volume(&mut self, _volume: u8) {}

    fn set_program(&mut self, _channel: u8, _program: u8) {}

    fn release(&mut self) {
        self.released = true;
    }
}
