//! Chord aggregation — same-instant note-ons batched into one emission.

/// Representative velocity when a chord somehow carries none.
const DEFAULT_VELOCITY: u8 = 64;

/// One note inside a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordNote {
    pub channel: u8,
    pub pitch: u8,
}

/// A group of note-ons sharing one scheduling instant.
///
/// All notes sound at one representative velocity: the loudest of the
/// aggregated note-ons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    notes: Vec<ChordNote>,
    velocity: u8,
}

impl Chord {
    pub fn notes(&self) -> &[ChordNote] {
        &self.notes
    }

    /// Distinct pitches, ascending.
    pub fn pitches(&self) -> Vec<u8> {
        let mut pitches: Vec<u8> = self.notes.iter().map(|n| n.pitch).collect();
        pitches.sort_unstable();
        pitches.dedup();
        pitches
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Collects note-ons during one scheduling step.
#[derive(Debug, Default)]
pub struct ChordAggregator {
    notes: Vec<ChordNote>,
    velocities: Vec<u8>,
}

impl ChordAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sounding note-on. Duplicate (channel, pitch) pairs collapse,
    /// but every velocity still counts toward the representative.
    pub fn add(&mut self, channel: u8, pitch: u8, velocity: u8) {
        let note = ChordNote { channel, pitch };
        if !self.notes.contains(&note) {
            self.notes.push(note);
        }
        self.velocities.push(velocity);
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Close the step: hand back the chord, if any, and reset for the next.
    pub fn take(&mut self) -> Option<Chord> {
        if self.notes.is_empty() {
            self.velocities.clear();
            return None;
        }
        let velocity = self
            .velocities
            .iter()
            .copied()
            .max()
            .unwrap_or(DEFAULT_VELOCITY);
        self.velocities.clear();
        Some(Chord {
            notes: std::mem::take(&mut self.notes),
            velocity,
        })
    }
}
