//! Total playable duration — the last note-bearing tick through the tempo map.

use super::event::TrackEvent;
use super::tempo::TempoMap;

/// Highest absolute tick carrying a note event, across all tracks.
///
/// Tracks without notes contribute nothing. `None` means the piece has no
/// notes at all.
pub fn last_note_tick(tracks: &[Vec<TrackEvent>]) -> Option<u64> {
    let mut last: Option<u64> = None;
    for track in tracks {
        let mut tick = 0u64;
        for event in track {
            tick += event.delta;
            if event.kind.is_note() {
                last = Some(last.map_or(tick, |l| l.max(tick)));
            }
        }
    }
    last
}

/// Estimated duration of the piece in seconds; 0.0 for a piece with no notes.
pub fn estimate_seconds(tracks: &[Vec<TrackEvent>], tempo_map: &TempoMap) -> f64 {
    last_note_tick(tracks).map_or(0.0, |tick| tempo_map.seconds_at_tick(tick))
}
