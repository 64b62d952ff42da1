//! Playback control — the session worker and its controller surface.
//!
//! A [`Player`] runs at most one session at a time on a background thread.
//! Starting a new session cancels the previous worker and joins it before
//! any new sink opens, so two sinks are never alive at once.

pub mod chord;
pub mod session;
pub mod state;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::PlayerConfig;
use crate::score::Score;
use crate::sink::{MacroSink, OutputSink, SinkError, SynthSink};
use state::SharedState;

/// Output variant for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// SoundFont synthesis.
    #[default]
    Synth,
    /// Keystrokes into the external instrument.
    Macro,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    Cancelled,
    Errored,
}

/// Messages from the session worker to its controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerUpdate {
    /// Estimated total duration in seconds, sent once near session start.
    Duration(f64),
    /// Percent complete, 0..=100, sent for every processed event.
    Progress(u8),
    /// Fatal session error, sent before `Stopped(Errored)`.
    Error(String),
    /// Terminal state of the session. Always the last update sent.
    Stopped(Outcome),
}

/// Errors surfaced by a playback session.
#[derive(Debug, Clone)]
pub enum PlayerError {
    /// The file is not a structurally valid MIDI stream.
    Decode(String),
    /// The instrument resource (SoundFont) could not be loaded.
    ResourceLoad(String),
    /// The output backend could not be opened.
    Sink(String),
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerError::Decode(e) => write!(f, "decode error: {e}"),
            PlayerError::ResourceLoad(e) => write!(f, "resource load error: {e}"),
            PlayerError::Sink(e) => write!(f, "sink error: {e}"),
        }
    }
}

impl std::error::Error for PlayerError {}

impl From<SinkError> for PlayerError {
    fn from(error: SinkError) -> Self {
        match error {
            SinkError::ResourceLoad(e) => PlayerError::ResourceLoad(e),
            other => PlayerError::Sink(other.to_string()),
        }
    }
}

struct ActiveSession {
    shared: Arc<SharedState>,
    thread: Option<JoinHandle<()>>,
}

/// Controller for playback sessions.
pub struct Player {
    config: PlayerConfig,
    updates: Sender<PlayerUpdate>,
    active: Option<ActiveSession>,
}

impl Player {
    pub fn new(config: PlayerConfig, updates: Sender<PlayerUpdate>) -> Self {
        Self {
            config,
            updates,
            active: None,
        }
    }

    /// Start playing `path`, replacing any active session.
    ///
    /// The previous worker is cancelled and joined first; its sink is fully
    /// released before the new one is acquired.
    pub fn play(&mut self, path: PathBuf, mode: Mode) {
        self.stop();

        let shared = Arc::new(SharedState::new(self.config.volume));
        let worker_shared = shared.clone();
        let updates = self.updates.clone();
        let config = self.config.clone();
        let thread = std::thread::spawn(move || {
            run_worker(&path, mode, &config, &worker_shared, &updates);
        });

        self.active = Some(ActiveSession {
            shared,
            thread: Some(thread),
        });
    }

    /// Cancel the active session and wait until its sink is released.
    pub fn stop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.shared.request_stop();
            if let Some(thread) = active.thread.take() {
                let _ = thread.join();
            }
        }
    }

    /// Flip the pause flag; returns the new value. No-op without a session.
    pub fn toggle_pause(&mut self) -> bool {
        self.active
            .as_ref()
            .map(|a| a.shared.toggle_pause())
            .unwrap_or(false)
    }

    /// Set the volume for the active session and for future ones.
    pub fn set_volume(&mut self, volume: u8) {
        self.config.volume = volume.min(127);
        if let Some(active) = &self.active {
            active.shared.set_volume(volume);
        }
    }

    pub fn paused(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.shared.is_paused())
    }

    pub fn errored(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.shared.has_error())
    }

    /// Whether a session worker is still alive.
    pub fn is_playing(&self) -> bool {
        self.active
            .as_ref()
            .and_then(|a| a.thread.as_ref())
            .is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker body: decode, open the sink, run the loop, report the outcome.
///
/// A decode failure never reaches sink acquisition; a sink failure never
/// emits a note.
fn run_worker(
    path: &Path,
    mode: Mode,
    config: &PlayerConfig,
    shared: &SharedState,
    updates: &Sender<PlayerUpdate>,
) {
    let score = match Score::load(path) {
        Ok(score) => score,
        Err(error) => return fail(shared, updates, &error),
    };
    let _ = updates.send(PlayerUpdate::Duration(score.duration_seconds));

    let mut sink = match open_sink(mode, config) {
        Ok(sink) => sink,
        Err(error) => return fail(shared, updates, &PlayerError::from(error)),
    };

    let outcome = session::run(&score, sink.as_mut(), shared, updates);
    let _ = updates.send(PlayerUpdate::Stopped(outcome));
}

fn fail(shared: &SharedState, updates: &Sender<PlayerUpdate>, error: &PlayerError) {
    shared.flag_error();
    let _ = updates.send(PlayerUpdate::Error(error.to_string()));
    let _ = updates.send(PlayerUpdate::Stopped(Outcome::Errored));
}

fn open_sink(mode: Mode, config: &PlayerConfig) -> Result<Box<dyn OutputSink>, SinkError> {
    match mode {
        Mode::Synth => Ok(Box::new(SynthSink::new(&config.soundfont)?)),
        Mode::Macro => Ok(Box::new(MacroSink::new(config.roll)?)),
    }
}
