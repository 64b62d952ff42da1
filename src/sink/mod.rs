//! Output sinks — where a scheduled chord becomes sound or keystrokes.

use std::fmt;

use crate::player::chord::Chord;

pub mod keys;
pub mod synth;

pub use keys::MacroSink;
pub use synth::SynthSink;

/// Rendering backend for one playback session.
///
/// A session owns exactly one sink and calls [`OutputSink::release`] exactly
/// once at its exit point; sinks keep `release` idempotent as a safety net
/// for `Drop`.
pub trait OutputSink {
    /// Emit a chord of simultaneous note-ons at one representative velocity.
    fn on_chord(&mut self, chord: &Chord);

    /// End a sounding note. Keystroke output is momentary, so the macro sink
    /// ignores this.
    fn on_note_off(&mut self, channel: u8, pitch: u8);

    /// Forward the shared gain value (0..=127).
    fn set_volume(&mut self, volume: u8);

    /// Select an instrument program on a channel. The macro sink ignores
    /// this.
    fn set_program(&mut self, channel: u8, program: u8);

    /// Tear down the backend. Safe to call more than once; only the first
    /// call does anything.
    fn release(&mut self);
}

/// Failure to construct an output sink.
#[derive(Debug, Clone)]
pub enum SinkError {
    /// The instrument resource (SoundFont) could not be loaded.
    ResourceLoad(String),
    /// No usable audio output device.
    NoOutputDevice,
    /// The audio stream could not be configured or started.
    Stream(String),
    /// The keystroke backend could not be initialized.
    Input(String),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::ResourceLoad(e) => write!(f, "failed to load instrument resource: {e}"),
            SinkError::NoOutputDevice => write!(f, "no audio output device found"),
            SinkError::Stream(e) => write!(f, "audio stream error: {e}"),
            SinkError::Input(e) => write!(f, "keystroke backend error: {e}"),
        }
    }
}

impl std::error::Error for SinkError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            SinkError::NoOutputDevice.to_string(),
            "no audio output device found"
        );
        assert_eq!(
            SinkError::ResourceLoad("missing.sf2".to_string()).to_string(),
            "failed to load instrument resource: missing.sf2"
        );
        assert_eq!(
            SinkError::Stream("format".to_string()).to_string(),
            "audio stream error: format"
        );
    }
}
