//! Tempo map — ordered (tick, µs/beat) change points and the tick→seconds
//! integral.

use std::collections::BTreeMap;

use super::event::{EventKind, TrackEvent};

/// 120 BPM, the MIDI default when a file sets no tempo before tick 0.
pub const DEFAULT_US_PER_BEAT: u32 = 500_000;

/// A span of ticks sharing one microseconds-per-beat rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoSegment {
    pub start_tick: u64,
    pub us_per_beat: u32,
}

/// Sorted tempo change points for one piece.
///
/// The segment list is strictly increasing in `start_tick` and always starts
/// at tick 0.
#[derive(Debug, Clone)]
pub struct TempoMap {
    segments: Vec<TempoSegment>,
    ticks_per_beat: u32,
}

impl TempoMap {
    /// Collect tempo changes from per-track delta streams.
    ///
    /// Tempo events may appear in any track. Duplicate ticks collapse to the
    /// value written last in track iteration order; downstream timing depends
    /// on that tie-break, so it must not become first-wins.
    pub fn from_tracks(tracks: &[Vec<TrackEvent>], ticks_per_beat: u32) -> Self {
        let mut changes: BTreeMap<u64, u32> = BTreeMap::new();
        for track in tracks {
            let mut tick = 0u64;
            for event in track {
                tick += event.delta;
                if let EventKind::Tempo(us_per_beat) = event.kind {
                    changes.insert(tick, us_per_beat);
                }
            }
        }
        changes.entry(0).or_insert(DEFAULT_US_PER_BEAT);

        let segments = changes
            .into_iter()
            .map(|(start_tick, us_per_beat)| TempoSegment {
                start_tick,
                us_per_beat,
            })
            .collect();
        Self {
            segments,
            ticks_per_beat,
        }
    }

    pub fn ticks_per_beat(&self) -> u32 {
        self.ticks_per_beat
    }

    pub fn segments(&self) -> &[TempoSegment] {
        &self.segments
    }

    /// Convert an absolute tick to seconds by integrating segment by segment:
    /// each span contributes `ticks * µs_per_beat / ticks_per_beat / 1e6`.
    pub fn seconds_at_tick(&self, tick: u64) -> f64 {
        let mut seconds = 0.0;
        for pair in self.segments.windows(2) {
            let (segment, next) = (pair[0], pair[1]);
            if tick <= next.start_tick {
                return seconds + self.span_seconds(tick - segment.start_tick, segment.us_per_beat);
            }
            seconds += self.span_seconds(next.start_tick - segment.start_tick, segment.us_per_beat);
        }
        // The tick-0 segment always exists, so the list is never empty.
        let last = self.segments[self.segments.len() - 1];
        seconds + self.span_seconds(tick - last.start_tick, last.us_per_beat)
    }

    fn span_seconds(&self, ticks: u64, us_per_beat: u32) -> f64 {
        ticks as f64 * f64::from(us_per_beat) / f64::from(self.ticks_per_beat) / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn tempo(delta: u64, us_per_beat: u32) -> TrackEvent {
        TrackEvent::new(delta, EventKind::Tempo(us_per_beat))
    }

    #[test]
    fn empty_input_seeds_default_at_tick_zero() {
        let map = TempoMap::from_tracks(&[], 480);
        assert_eq!(
            map.segments(),
            &[TempoSegment {
                start_tick: 0,
                us_per_beat: DEFAULT_US_PER_BEAT
            }]
        );
    }

    #[test]
    fn segments_are_sorted_and_start_at_zero() {
        let tracks = vec![vec![tempo(960, 400_000), tempo(240, 300_000)]];
        let map = TempoMap::from_tracks(&tracks, 480);
        assert_eq!(map.segments()[0].start_tick, 0);
        let ticks: Vec<u64> = map.segments().iter().map(|s| s.start_tick).collect();
        assert_eq!(ticks, vec![0, 960, 1200]);
    }

    #[test]
    fn explicit_tempo_at_zero_replaces_default() {
        let tracks = vec![vec![tempo(0, 250_000)]];
        let map = TempoMap::from_tracks(&tracks, 480);
        assert_eq!(
            map.segments(),
            &[TempoSegment {
                start_tick: 0,
                us_per_beat: 250_000
            }]
        );
    }

    #[test]
    fn duplicate_tick_last_track_wins() {
        // Two tracks set a tempo at the same tick; the later track's value
        // must survive.
        let tracks = vec![vec![tempo(480, 400_000)], vec![tempo(480, 300_000)]];
        let map = TempoMap::from_tracks(&tracks, 480);
        let at_480 = map
            .segments()
            .iter()
            .find(|s| s.start_tick == 480)
            .copied()
            .unwrap();
        assert_eq!(at_480.us_per_beat, 300_000);
    }

    #[test]
    fn duplicate_tick_within_track_last_wins() {
        let tracks = vec![vec![tempo(480, 400_000), tempo(0, 350_000)]];
        let map = TempoMap::from_tracks(&tracks, 480);
        let at_480 = map
            .segments()
            .iter()
            .find(|s| s.start_tick == 480)
            .copied()
            .unwrap();
        assert_eq!(at_480.us_per_beat, 350_000);
    }

    #[test]
    fn constant_tempo_closed_form() {
        // 480 ticks/beat at the default 500,000 µs/beat: one beat is 0.5s.
        let map = TempoMap::from_tracks(&[], 480);
        assert_approx_eq!(map.seconds_at_tick(480), 0.5);
        assert_approx_eq!(map.seconds_at_tick(960), 1.0);
        assert_approx_eq!(map.seconds_at_tick(0), 0.0);
    }

    #[test]
    fn integral_across_tempo_change() {
        // 1 beat at 500,000 µs (0.5s), then 1 beat at 250,000 µs (0.25s).
        let tracks = vec![vec![tempo(480, 250_000)]];
        let map = TempoMap::from_tracks(&tracks, 480);
        assert_approx_eq!(map.seconds_at_tick(480), 0.5);
        assert_approx_eq!(map.seconds_at_tick(960), 0.75);
        // Partial span inside the second segment.
        assert_approx_eq!(map.seconds_at_tick(720), 0.625);
    }

    #[test]
    fn tick_before_first_change_uses_default() {
        let tracks = vec![vec![tempo(960, 250_000)]];
        let map = TempoMap::from_tracks(&tracks, 480);
        assert_approx_eq!(map.seconds_at_tick(480), 0.5);
    }
}
