//! Shared playback flags — one writer per field across the two threads.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Cross-thread playback state for one session.
///
/// Writer discipline: `running` and `paused` and `volume` are written by the
/// controller; `error` is written by the session worker. Both sides read
/// freely. Each field is an independent flag, never a publication fence for
/// other data, so relaxed ordering is enough.
#[derive(Debug)]
pub struct SharedState {
    running: AtomicBool,
    paused: AtomicBool,
    volume: AtomicU8,
    error: AtomicBool,
}

impl SharedState {
    pub fn new(volume: u8) -> Self {
        Self {
            running: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            volume: AtomicU8::new(volume.min(127)),
            error: AtomicBool::new(false),
        }
    }

    /// Controller-side: request cooperative cancellation. The worker observes
    /// this at its next poll, within the sleep granularity.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Controller-side: flip the pause flag, returning the new value.
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Controller-side: set the mixer volume (clamped to 0..=127).
    pub fn set_volume(&self, volume: u8) {
        self.volume.store(volume.min(127), Ordering::Relaxed);
    }

    pub fn volume(&self) -> u8 {
        self.volume.load(Ordering::Relaxed)
    }

    /// Worker-side: mark the session as failed.
    pub fn flag_error(&self) {
        self.error.store(true, Ordering::Relaxed);
    }

    pub fn has_error(&self) -> bool {
        self.error.load(Ordering::Relaxed)
    }
}
