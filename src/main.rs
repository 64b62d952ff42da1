//! konghou — play MIDI files through a SoundFont or as konghou keystrokes.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use konghou::config::PlayerConfig;
use konghou::player::{Mode, Outcome, Player, PlayerUpdate};
use konghou::playlist::Playlist;

#[derive(Parser, Debug)]
#[command(
    name = "konghou",
    version,
    about = "MIDI performer: SoundFont synthesis or konghou keystrokes"
)]
struct Args {
    /// MIDI files to play in order, or a single .m3u playlist.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Drive the external instrument with keystrokes instead of synthesizing.
    #[arg(long)]
    keys: bool,

    /// SoundFont path (overrides config).
    #[arg(long)]
    soundfont: Option<PathBuf>,

    /// Initial volume, 0-127 (overrides config).
    #[arg(long)]
    volume: Option<u8>,
}

fn main() {
    let args = Args::parse();

    let mut config = PlayerConfig::load().unwrap_or_default();
    if let Some(soundfont) = args.soundfont {
        config.soundfont = soundfont;
    }
    if let Some(volume) = args.volume {
        config.volume = volume.min(127);
    }
    let mode = if args.keys { Mode::Macro } else { Mode::Synth };

    let mut playlist = match build_playlist(&args.files) {
        Ok(playlist) => playlist,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        if let Err(e) = ctrlc::set_handler(move || interrupted.store(true, Ordering::Relaxed)) {
            eprintln!("failed to install interrupt handler: {e}");
        }
    }

    let (updates_tx, updates_rx) = mpsc::channel();
    let mut player = Player::new(config, updates_tx);

    loop {
        let Some(path) = playlist.current().map(Path::to_path_buf) else {
            break;
        };
        println!("playing: {}", path.display());
        player.play(path, mode);

        if !drain_session(&updates_rx, &interrupted) {
            player.stop();
            println!();
            println!("stopped.");
            return;
        }
        if playlist.next().is_none() {
            break;
        }
    }
    println!("done.");
}

/// Print updates until the session reports a terminal state.
///
/// Returns false when the user interrupted; exits the process on a session
/// error.
fn drain_session(updates: &mpsc::Receiver<PlayerUpdate>, interrupted: &AtomicBool) -> bool {
    let mut last_percent = None;
    loop {
        if interrupted.load(Ordering::Relaxed) {
            return false;
        }
        match updates.recv_timeout(Duration::from_millis(100)) {
            Ok(PlayerUpdate::Duration(seconds)) => println!("duration: {seconds:.1}s"),
            Ok(PlayerUpdate::Progress(percent)) => {
                if last_percent != Some(percent) {
                    print!("\r{percent:3}%");
                    let _ = io::stdout().flush();
                    last_percent = Some(percent);
                }
            }
            Ok(PlayerUpdate::Error(message)) => eprintln!("error: {message}"),
            Ok(PlayerUpdate::Stopped(outcome)) => {
                println!();
                if outcome == Outcome::Errored {
                    std::process::exit(1);
                }
                return true;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => return true,
        }
    }
}

fn build_playlist(files: &[PathBuf]) -> Result<Playlist, String> {
    if files.len() == 1
        && files[0]
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("m3u"))
    {
        Playlist::load(&files[0])
            .map_err(|e| format!("failed to load playlist {}: {e}", files[0].display()))
    } else {
        Ok(Playlist::new(files.to_vec()))
    }
}
