//! Offline rendering to WAV.

use super::common::{VoiceArgs, frames_for, pull_frames};
use clap::Args;
use fmosc_io::{BackendStreamConfig, OfflineBackend, VoicePlayer, WavSpec, write_wav};
use std::path::PathBuf;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    voice: VoiceArgs,

    /// Duration in seconds
    #[arg(short, long, default_value = "2.0")]
    duration: f32,

    /// Output channels (the voice is copied to each)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..=8))]
    channels: u16,

    /// Bit depth (16, 24 or 32-bit float)
    #[arg(long, default_value = "32")]
    bits: u16,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let preset = args.voice.build_preset()?;
    let voice = preset.build_voice()?;

    let backend = OfflineBackend::new();
    let config = BackendStreamConfig {
        sample_rate: preset.sample_rate,
        buffer_size: preset.buffer_size,
        channels: args.channels,
        device_name: None,
    };
    let player = VoicePlayer::start(&backend, &config, voice)?;

    let frames = frames_for(args.duration, preset.sample_rate);
    let channels = usize::from(args.channels);
    let mut samples = Vec::with_capacity(frames * channels);
    pull_frames(
        &backend,
        frames,
        channels,
        preset.buffer_size as usize,
        &mut samples,
    );
    player.stop()?;

    let spec = WavSpec {
        channels: args.channels,
        sample_rate: preset.sample_rate,
        bits_per_sample: args.bits,
    };
    write_wav(&args.output, &samples, spec)?;

    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    println!("Rendered '{}' to {}", preset.name, args.output.display());
    println!(
        "  {} frames, {} Hz, {} ch, {}-bit, peak {:.3}",
        frames, preset.sample_rate, args.channels, args.bits, peak
    );
    Ok(())
}
