//! One playback session — the real-time scheduling loop.
//!
//! The loop owns the score, the sink, and the pacing clock. Cancellation and
//! pause are cooperative: flags are polled between short sleeps, never
//! preempted. Paused time is excluded by shifting the clock origin, so wait
//! targets computed before a pause stay correct after it.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use super::chord::ChordAggregator;
use super::state::SharedState;
use super::{Outcome, PlayerUpdate};
use crate::score::event::EventKind;
use crate::score::Score;
use crate::sink::OutputSink;

/// How often the paused flag is rechecked.
const PAUSE_POLL: Duration = Duration::from_millis(50);
/// Upper bound for one pacing sleep while waiting on an event target.
const SPIN_SLEEP: Duration = Duration::from_millis(1);

/// Elapsed session time, minus paused spans.
#[derive(Debug)]
struct PlaybackClock {
    origin: Instant,
}

impl PlaybackClock {
    fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Shift the origin forward so a paused span never counts as playback
    /// time.
    fn exclude(&mut self, paused: Duration) {
        self.origin += paused;
    }
}

/// Run one session to completion over an already-open sink.
///
/// The sink's `release` is called exactly once, at the single exit point,
/// on every path out of the loop.
pub fn run(
    score: &Score,
    sink: &mut dyn OutputSink,
    shared: &SharedState,
    updates: &Sender<PlayerUpdate>,
) -> Outcome {
    let total = score.events.len();
    let mut aggregator = ChordAggregator::new();
    let mut clock = PlaybackClock::start();
    let mut index = 0;
    let mut processed = 0;

    let outcome = 'playback: loop {
        if index >= total {
            break Outcome::Finished;
        }
        if !shared.is_running() {
            break Outcome::Cancelled;
        }

        // Cooperative pause: sleep-poll without advancing the pacing clock.
        if shared.is_paused() {
            let pause_start = Instant::now();
            while shared.is_paused() && shared.is_running() {
                thread::sleep(PAUSE_POLL);
            }
            clock.exclude(pause_start.elapsed());
            if !shared.is_running() {
                break Outcome::Cancelled;
            }
        }

        let step = score.events[index];
        let target = Duration::from_secs_f64(step.seconds);
        loop {
            if !shared.is_running() {
                break 'playback Outcome::Cancelled;
            }
            let now = clock.elapsed();
            if now >= target {
                break;
            }
            thread::sleep((target - now).min(SPIN_SLEEP));
        }

        sink.set_volume(shared.volume());

        // Everything at this exact tick is one scheduling step.
        while index < total && score.events[index].tick == step.tick {
            dispatch(score.events[index].kind, &mut aggregator, sink);
            index += 1;
            processed += 1;
            let percent = (processed * 100 / total) as u8;
            let _ = updates.send(PlayerUpdate::Progress(percent));
        }

        if let Some(chord) = aggregator.take() {
            sink.on_chord(&chord);
        }
    };

    sink.release();
    outcome
}

fn dispatch(kind: EventKind, aggregator: &mut ChordAggregator, sink: &mut dyn OutputSink) {
    match kind {
        // Velocity-zero note-ons were normalized to note-offs at decode time.
        EventKind::NoteOn {
            channel,
            pitch,
            velocity,
        } => aggregator.add(channel, pitch, velocity),
        EventKind::NoteOff { channel, pitch } => sink.on_note_off(channel, pitch),
        EventKind::ProgramChange { channel, program } => sink.set_program(channel, program),
        EventKind::Tempo(_) | EventKind::Meta => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_excludes_paused_spans() {
        let mut clock = PlaybackClock::start();
        thread::sleep(Duration::from_millis(20));
        let before = clock.elapsed();
        clock.exclude(Duration::from_millis(15));
        let after = clock.elapsed();
        assert!(after < before, "excluded span must rewind elapsed time");
    }

    #[test]
    fn clock_advances_monotonically() {
        let clock = PlaybackClock::start();
        let a = clock.elapsed();
        thread::sleep(Duration::from_millis(5));
        assert!(clock.elapsed() > a);
    }
}
