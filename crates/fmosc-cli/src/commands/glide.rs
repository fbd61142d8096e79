//! Step a voice across the keyboard, live or into a WAV file.
//!
//! Each step retargets the primary frequency; the voice's parameter
//! smoothing turns the steps into glides.

use super::common::{VoiceArgs, frames_for, install_ctrlc, pull_frames};
use clap::Args;
use fmosc_core::{KeyEntry, Note, keyboard};
use fmosc_io::{
    AudioBackend, BackendStreamConfig, CpalBackend, OfflineBackend, VoicePlayer, WavSpec,
    write_wav,
};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

#[derive(Args)]
pub struct GlideArgs {
    /// First key
    #[arg(long, default_value = "A2")]
    from: String,

    /// Last key (may be below the first)
    #[arg(long, default_value = "A4")]
    to: String,

    /// Time on each key in milliseconds
    #[arg(long, default_value = "150")]
    step_ms: u32,

    /// White keys only
    #[arg(long)]
    white: bool,

    /// Write to this WAV file instead of playing
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    out: Option<PathBuf>,

    /// Output device (partial name) for live playback
    #[arg(long)]
    device: Option<String>,

    #[command(flatten)]
    voice: VoiceArgs,
}

/// Keys from `from` to `to` inclusive, in the direction of travel.
fn key_path(from: Note, to: Note, white_only: bool) -> Vec<KeyEntry> {
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    let mut keys: Vec<KeyEntry> = keyboard()
        .filter(|k| k.note >= lo && k.note <= hi)
        .filter(|k| !white_only || !k.is_black())
        .collect();
    if from > to {
        keys.reverse();
    }
    keys
}

pub fn run(args: GlideArgs) -> anyhow::Result<()> {
    let from: Note = args.from.parse()?;
    let to: Note = args.to.parse()?;
    let keys = key_path(from, to, args.white);
    anyhow::ensure!(!keys.is_empty(), "no keys between {from} and {to}");

    let mut voice_args = args.voice.clone();
    voice_args.note = Some(from.to_string());
    voice_args.frequency = None;
    let mut preset = voice_args.build_preset()?;

    match args.out {
        Some(path) => {
            let backend = OfflineBackend::new();
            let config = BackendStreamConfig {
                sample_rate: preset.sample_rate,
                buffer_size: preset.buffer_size,
                channels: 1,
                device_name: None,
            };
            let player = VoicePlayer::start(&backend, &config, preset.build_voice()?)?;

            let step_frames = frames_for(args.step_ms as f32 / 1000.0, preset.sample_rate);
            let mut samples = Vec::with_capacity(step_frames * keys.len());
            for key in &keys {
                player.controller().set_note(key.note)?;
                pull_frames(
                    &backend,
                    step_frames,
                    1,
                    preset.buffer_size as usize,
                    &mut samples,
                );
            }
            player.stop()?;

            let spec = WavSpec {
                channels: 1,
                sample_rate: preset.sample_rate,
                bits_per_sample: 32,
            };
            write_wav(&path, &samples, spec)?;
            println!(
                "Rendered glide {from} -> {to} ({} keys) to {}",
                keys.len(),
                path.display()
            );
        }
        None => {
            let backend = CpalBackend::new();
            let mut config = BackendStreamConfig {
                sample_rate: preset.sample_rate,
                buffer_size: preset.buffer_size,
                channels: 2,
                device_name: args.device,
            };
            let device_rate = backend.actual_sample_rate(&config);
            preset.sample_rate = device_rate;
            config.sample_rate = device_rate;

            let player = VoicePlayer::start(&backend, &config, preset.build_voice()?)?;
            let running = install_ctrlc()?;
            let step = Duration::from_millis(u64::from(args.step_ms));

            for key in &keys {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                player.controller().set_note(key.note)?;
                println!("  {:<8} {:>9.2} Hz", key.label().to_string(), key.frequency);
                std::thread::sleep(step);
            }
            player.stop()?;
        }
    }

    Ok(())
}
