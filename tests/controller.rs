//! Controller tests — error surfacing and session replacement, driven with
//! inputs that fail before any sink could open.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use konghou::config::PlayerConfig;
use konghou::player::{Mode, Outcome, Player, PlayerUpdate};

fn collect_until_stopped(rx: &mpsc::Receiver<PlayerUpdate>) -> Vec<PlayerUpdate> {
    let mut updates = Vec::new();
    loop {
        let update = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker never reported a terminal state");
        let done = matches!(update, PlayerUpdate::Stopped(_));
        updates.push(update);
        if done {
            return updates;
        }
    }
}

#[test]
fn decode_error_surfaces_without_opening_a_sink() {
    let (tx, rx) = mpsc::channel();
    let mut player = Player::new(PlayerConfig::default(), tx);
    player.play(PathBuf::from("no/such/file.mid"), Mode::Synth);

    let updates = collect_until_stopped(&rx);
    assert!(updates
        .iter()
        .any(|u| matches!(u, PlayerUpdate::Error(_))));
    assert_eq!(
        updates.last(),
        Some(&PlayerUpdate::Stopped(Outcome::Errored))
    );
    assert!(player.errored());
    assert!(!player.is_playing());
}

#[test]
fn replacing_a_session_joins_the_previous_worker_first() {
    let (tx, rx) = mpsc::channel();
    let mut player = Player::new(PlayerConfig::default(), tx);

    player.play(PathBuf::from("first.mid"), Mode::Synth);
    player.play(PathBuf::from("second.mid"), Mode::Synth);

    // Each worker runs to its terminal state before the next one starts, so
    // the update stream is two complete Error/Stopped sequences in order.
    let first = collect_until_stopped(&rx);
    let second = collect_until_stopped(&rx);
    assert_eq!(
        first.last(),
        Some(&PlayerUpdate::Stopped(Outcome::Errored))
    );
    assert_eq!(
        second.last(),
        Some(&PlayerUpdate::Stopped(Outcome::Errored))
    );
}

#[test]
fn stop_without_a_session_is_a_no_op() {
    let (tx, _rx) = mpsc::channel();
    let mut player = Player::new(PlayerConfig::default(), tx);
    player.stop();
    assert!(!player.is_playing());
    assert!(!player.paused());
    assert!(!player.errored());
}

#[test]
fn pause_toggle_without_a_session_reports_unpaused() {
    let (tx, _rx) = mpsc::channel();
    let mut player = Player::new(PlayerConfig::default(), tx);
    assert!(!player.toggle_pause());
    assert!(!player.paused());
}
