//! Real-time playback on an audio device.

use super::common::{VoiceArgs, install_ctrlc};
use clap::Args;
use fmosc_io::{AudioBackend, BackendStreamConfig, CpalBackend, VoicePlayer};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    voice: VoiceArgs,

    /// Stop after this many seconds (plays until Ctrl+C otherwise)
    #[arg(short, long)]
    duration: Option<f32>,

    /// Output device (partial name)
    #[arg(short, long)]
    output: Option<String>,

    /// Output channels
    #[arg(long, default_value = "2")]
    channels: u16,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let mut preset = args.voice.build_preset()?;

    let backend = CpalBackend::new();
    let mut config = BackendStreamConfig {
        sample_rate: preset.sample_rate,
        buffer_size: preset.buffer_size,
        channels: args.channels,
        device_name: args.output,
    };

    // The voice has to render at whatever rate the device runs.
    let device_rate = backend.actual_sample_rate(&config);
    if device_rate != preset.sample_rate {
        tracing::info!(
            requested = preset.sample_rate,
            device = device_rate,
            "using device sample rate"
        );
        preset.sample_rate = device_rate;
        config.sample_rate = device_rate;
    }

    let voice = preset.build_voice()?;
    let player = VoicePlayer::start(&backend, &config, voice)?;
    let targets = player.controller().targets();

    println!("Playing '{}'", preset.name);
    println!(
        "  {:.2} Hz, FM amount {:.1} Hz, gain {:.2}",
        targets.primary_frequency, targets.fm_amount, targets.gain
    );
    println!("\nPress Ctrl+C to stop.\n");

    let running = install_ctrlc()?;
    let deadline = args
        .duration
        .map(|secs| Instant::now() + Duration::from_secs_f32(secs.max(0.0)));

    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    player.stop()?;
    println!("Done!");
    Ok(())
}
