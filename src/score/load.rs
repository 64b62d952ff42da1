//! Score loading — SMF bytes through midly into a time-sorted stream.

use std::fs;
use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use super::duration;
use super::event::{EventKind, TimedEvent, TrackEvent};
use super::tempo::TempoMap;
use crate::player::PlayerError;

/// A decoded piece, ready for a playback session.
#[derive(Debug, Clone)]
pub struct Score {
    pub ticks_per_beat: u32,
    /// All events, sorted by tick. The sort is stable, so events sharing a
    /// tick keep their track order.
    pub events: Vec<TimedEvent>,
    /// Estimated total duration in seconds.
    pub duration_seconds: f64,
}

impl Score {
    /// Decode a MIDI file from disk.
    pub fn load(path: &Path) -> Result<Self, PlayerError> {
        let bytes = fs::read(path)
            .map_err(|e| PlayerError::Decode(format!("{}: {e}", path.display())))?;
        let smf = Smf::parse(&bytes).map_err(|e| PlayerError::Decode(e.to_string()))?;
        Self::from_smf(&smf)
    }

    /// Build a score from an already-parsed SMF.
    pub fn from_smf(smf: &Smf) -> Result<Self, PlayerError> {
        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(ticks) => u32::from(ticks.as_int()),
            Timing::Timecode(..) => {
                return Err(PlayerError::Decode(
                    "SMPTE timecode files are not supported".into(),
                ))
            }
        };
        Ok(Self::from_tracks(decode_tracks(smf), ticks_per_beat))
    }

    /// Assemble a score from decoded per-track delta streams.
    pub fn from_tracks(tracks: Vec<Vec<TrackEvent>>, ticks_per_beat: u32) -> Self {
        let tempo_map = TempoMap::from_tracks(&tracks, ticks_per_beat);
        let duration_seconds = duration::estimate_seconds(&tracks, &tempo_map);

        let mut events = Vec::with_capacity(tracks.iter().map(Vec::len).sum());
        for track in &tracks {
            let mut tick = 0u64;
            for event in track {
                tick += event.delta;
                events.push(TimedEvent {
                    tick,
                    seconds: tempo_map.seconds_at_tick(tick),
                    kind: event.kind,
                });
            }
        }
        events.sort_by_key(|e| e.tick);

        Self {
            ticks_per_beat,
            events,
            duration_seconds,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Normalize midly track events into the decoded representation.
fn decode_tracks(smf: &Smf) -> Vec<Vec<TrackEvent>> {
    smf.tracks
        .iter()
        .map(|track| {
            track
                .iter()
                .map(|event| {
                    let kind = match event.kind {
                        TrackEventKind::Midi { channel, message } => {
                            decode_message(channel.as_int(), message)
                        }
                        TrackEventKind::Meta(MetaMessage::Tempo(us_per_beat)) => {
                            EventKind::Tempo(us_per_beat.as_int())
                        }
                        _ => EventKind::Meta,
                    };
                    TrackEvent::new(u64::from(event.delta.as_int()), kind)
                })
                .collect()
        })
        .collect()
}

fn decode_message(channel: u8, message: MidiMessage) -> EventKind {
    match message {
        // Velocity-zero note-on is a note-off by MIDI convention.
        MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => EventKind::NoteOff {
            channel,
            pitch: key.as_int(),
        },
        MidiMessage::NoteOn { key, vel } => EventKind::NoteOn {
            channel,
            pitch: key.as_int(),
            velocity: vel.as_int(),
        },
        MidiMessage::NoteOff { key, .. } => EventKind::NoteOff {
            channel,
            pitch: key.as_int(),
        },
        MidiMessage::ProgramChange { program } => EventKind::ProgramChange {
            channel,
            program: program.as_int(),
        },
        _ => EventKind::Meta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn note_on(delta: u64, pitch: u8, velocity: u8) -> TrackEvent {
        TrackEvent::new(
            delta,
            EventKind::NoteOn {
                channel: 0,
                pitch,
                velocity,
            },
        )
    }

    #[test]
    fn events_are_sorted_across_tracks() {
        let tracks = vec![
            vec![note_on(480, 60, 100)],
            vec![note_on(0, 64, 100), note_on(960, 67, 100)],
        ];
        let score = Score::from_tracks(tracks, 480);
        let ticks: Vec<u64> = score.events.iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![0, 480, 960]);
    }

    #[test]
    fn same_tick_events_share_identical_seconds() {
        let tracks = vec![vec![note_on(480, 60, 100)], vec![note_on(480, 64, 100)]];
        let score = Score::from_tracks(tracks, 480);
        assert_eq!(score.events[0].tick, score.events[1].tick);
        // Bit-identical, not merely close: chord batching depends on it.
        assert_eq!(
            score.events[0].seconds.to_bits(),
            score.events[1].seconds.to_bits()
        );
    }

    #[test]
    fn seconds_follow_the_tempo_map() {
        let tracks = vec![vec![note_on(480, 60, 100)]];
        let score = Score::from_tracks(tracks, 480);
        assert_approx_eq!(score.events[0].seconds, 0.5);
        assert_approx_eq!(score.duration_seconds, 0.5);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let result = Score::load(Path::new("definitely/not/a/file.mid"));
        assert!(matches!(result, Err(PlayerError::Decode(_))));
    }

    #[test]
    fn empty_score() {
        let score = Score::from_tracks(vec![], 480);
        assert!(score.is_empty());
        assert_eq!(score.len(), 0);
        assert_approx_eq!(score.duration_seconds, 0.0);
    }
}
