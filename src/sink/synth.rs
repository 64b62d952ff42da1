//! SoundFont synthesizer sink — rustysynth driven inside a cpal callback.
//!
//! The session thread never touches the synthesizer directly: note commands
//! cross to the audio callback over a lock-free ring buffer, and the
//! callback applies whatever has arrived before rendering each block.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapProd, HeapRb,
};
use rustysynth::{SoundFont, Synthesizer, SynthesizerSettings};

use super::{OutputSink, SinkError};
use crate::player::chord::Chord;

/// Ring buffer capacity (number of commands).
const COMMAND_CAPACITY: usize = 1024;

/// Commands crossing from the session thread to the audio callback.
#[derive(Debug, Clone, Copy)]
enum SynthCommand {
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    NoteOff { channel: u8, pitch: u8 },
    Program { channel: u8, program: u8 },
    Gain(u8),
    AllNotesOff,
}

/// Synthesizer-backed output sink. Owns the cpal stream and the command
/// producer; the callback owns the synthesizer.
pub struct SynthSink {
    stream: Option<cpal::Stream>,
    commands: HeapProd<SynthCommand>,
}

impl SynthSink {
    /// Load the SoundFont and start an output stream.
    ///
    /// Fails before any audio setup if the SoundFont is missing or invalid,
    /// so a bad instrument resource never acquires a device.
    pub fn new(soundfont: &Path) -> Result<Self, SinkError> {
        let mut file = File::open(soundfont)
            .map_err(|e| SinkError::ResourceLoad(format!("{}: {e}", soundfont.display())))?;
        let sound_font = Arc::new(
            SoundFont::new(&mut file).map_err(|e| SinkError::ResourceLoad(e.to_string()))?,
        );

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(SinkError::NoOutputDevice)?;
        let config = device
            .default_output_config()
            .map_err(|e| SinkError::Stream(e.to_string()))?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let settings = SynthesizerSettings::new(sample_rate as i32);
        let mut synthesizer = Synthesizer::new(&sound_font, &settings)
            .map_err(|e| SinkError::ResourceLoad(e.to_string()))?;

        let rb = HeapRb::<SynthCommand>::new(COMMAND_CAPACITY);
        let (producer, mut consumer) = rb.split();

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let out_channels = channels as usize;
        let mut left: Vec<f32> = Vec::new();
        let mut right: Vec<f32> = Vec::new();

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    while let Some(command) = consumer.try_pop() {
                        apply(&mut synthesizer, command);
                    }
                    let frames = data.len() / out_channels;
                    left.resize(frames, 0.0);
                    right.resize(frames, 0.0);
                    synthesizer.render(&mut left[..], &mut right[..]);
                    for (frame, chunk) in data.chunks_mut(out_channels).enumerate() {
                        chunk[0] = left[frame];
                        if chunk.len() > 1 {
                            chunk[1] = right[frame];
                        }
                    }
                },
                |err| eprintln!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| SinkError::Stream(e.to_string()))?;

        stream.play().map_err(|e| SinkError::Stream(e.to_string()))?;

        Ok(Self {
            stream: Some(stream),
            commands: producer,
        })
    }

    fn push(&mut self, command: SynthCommand) {
        // Dropped if the callback has stopped draining.
        let _ = self.commands.try_push(command);
    }
}

fn apply(synthesizer: &mut Synthesizer, command: SynthCommand) {
    match command {
        SynthCommand::NoteOn {
            channel,
            pitch,
            velocity,
        } => synthesizer.note_on(i32::from(channel), i32::from(pitch), i32::from(velocity)),
        SynthCommand::NoteOff { channel, pitch } => {
            synthesizer.note_off(i32::from(channel), i32::from(pitch));
        }
        SynthCommand::Program { channel, program } => {
            synthesizer.process_midi_message(i32::from(channel), 0xC0, i32::from(program), 0);
        }
        SynthCommand::Gain(volume) => {
            synthesizer.set_master_volume(f32::from(volume) / 127.0);
        }
        SynthCommand::AllNotesOff => synthesizer.note_off_all(false),
    }
}

impl OutputSink for SynthSink {
    fn on_chord(&mut self, chord: &Chord) {
        let velocity = chord.velocity();
        for &note in chord.notes() {
            self.push(SynthCommand::NoteOn {
                channel: note.channel,
                pitch: note.pitch,
                velocity,
            });
        }
    }

    fn on_note_off(&mut self, channel: u8, pitch: u8) {
        self.push(SynthCommand::NoteOff { channel, pitch });
    }

    fn set_volume(&mut self, volume: u8) {
        self.push(SynthCommand::Gain(volume.min(127)));
    }

    fn set_program(&mut self, channel: u8, program: u8) {
        self.push(SynthCommand::Program { channel, program });
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.push(SynthCommand::AllNotesOff);
            // Let the callback drain the all-off before the stream drops.
            thread::sleep(Duration::from_millis(30));
            drop(stream);
        }
    }
}

impl Drop for SynthSink {
    fn drop(&mut self) {
        self.release();
    }
}
