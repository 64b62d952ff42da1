//! Score decoding and musical-time reconstruction.
//!
//! A [`Score`] is the playable form of a MIDI file: every event carries its
//! absolute tick and its wall-clock offset from the start of the piece,
//! reconstructed from the file's tempo changes.

pub mod duration;
pub mod event;
pub mod load;
pub mod tempo;

pub use load::Score;
pub use tempo::{TempoMap, TempoSegment};
