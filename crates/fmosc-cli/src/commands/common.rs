//! Shared CLI helpers used across multiple commands.

use clap::{Args, ValueEnum};
use fmosc_config::{SmoothingKind, VoicePreset, WaveformKind, get_factory_preset, resolve_preset};
use fmosc_io::OfflineBackend;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Waveform types for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliWaveform {
    Sine,
    Triangle,
    Saw,
    Square,
}

impl From<CliWaveform> for WaveformKind {
    fn from(w: CliWaveform) -> Self {
        match w {
            CliWaveform::Sine => WaveformKind::Sine,
            CliWaveform::Triangle => WaveformKind::Triangle,
            CliWaveform::Saw => WaveformKind::Saw,
            CliWaveform::Square => WaveformKind::Square,
        }
    }
}

/// Smoothing curves for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliSmoothing {
    Linear,
    Exponential,
}

impl From<CliSmoothing> for SmoothingKind {
    fn from(s: CliSmoothing) -> Self {
        match s {
            CliSmoothing::Linear => SmoothingKind::Linear,
            CliSmoothing::Exponential => SmoothingKind::Exponential,
        }
    }
}

/// Voice selection shared by every command that builds a voice.
///
/// A preset supplies the starting point; individual flags override it.
#[derive(Args, Debug, Default, Clone)]
pub struct VoiceArgs {
    /// Preset name or path to a preset file
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Starting note, e.g. "A4", "C#3" or "Bb2"
    #[arg(short, long, conflicts_with = "frequency")]
    pub note: Option<String>,

    /// Starting primary frequency in Hz
    #[arg(short, long)]
    pub frequency: Option<f32>,

    /// Fixed modulator frequency in Hz
    #[arg(long, conflicts_with = "fm_ratio")]
    pub fm_frequency: Option<f32>,

    /// Modulator frequency as a multiple of the primary
    #[arg(long)]
    pub fm_ratio: Option<f32>,

    /// Frequency deviation in Hz
    #[arg(long)]
    pub fm_amount: Option<f32>,

    /// Output gain (0-1)
    #[arg(short, long)]
    pub gain: Option<f32>,

    /// Carrier waveform
    #[arg(long, value_enum)]
    pub carrier: Option<CliWaveform>,

    /// Modulator waveform
    #[arg(long, value_enum)]
    pub modulator: Option<CliWaveform>,

    /// Parameter smoothing curve
    #[arg(long, value_enum)]
    pub smoothing: Option<CliSmoothing>,

    /// Parameter smoothing window in milliseconds
    #[arg(long)]
    pub smoothing_ms: Option<f32>,

    /// Sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,
}

impl VoiceArgs {
    /// Resolve the preset and apply flag overrides.
    ///
    /// Without `--preset` the factory `init` voice is the base.
    pub fn build_preset(&self) -> anyhow::Result<VoicePreset> {
        let mut preset = match &self.preset {
            Some(name) => resolve_preset(name).map_err(|e| {
                anyhow::anyhow!("{e}. Use 'fmosc presets list' to see available presets.")
            })?,
            None => get_factory_preset("init").unwrap_or_else(|| VoicePreset::new("Init")),
        };

        let voice = &mut preset.voice;
        if let Some(note) = &self.note {
            voice.note = Some(note.clone());
            voice.frequency = None;
        }
        if let Some(hz) = self.frequency {
            voice.frequency = Some(hz);
            voice.note = None;
        }
        if let Some(hz) = self.fm_frequency {
            voice.fm_frequency = Some(hz);
            voice.fm_ratio = None;
        }
        if let Some(ratio) = self.fm_ratio {
            voice.fm_ratio = Some(ratio);
            voice.fm_frequency = None;
        }
        if let Some(depth) = self.fm_amount {
            voice.fm_amount = depth;
        }
        if let Some(level) = self.gain {
            voice.gain = level;
        }
        if let Some(w) = self.carrier {
            preset.carrier = w.into();
        }
        if let Some(w) = self.modulator {
            preset.modulator = w.into();
        }
        if let Some(s) = self.smoothing {
            preset.smoothing = s.into();
        }
        if let Some(ms) = self.smoothing_ms {
            preset.smoothing_ms = ms;
        }
        if let Some(sr) = self.sample_rate {
            preset.sample_rate = sr;
        }

        preset.validate()?;
        tracing::debug!(preset = %preset.name, "voice preset resolved");
        Ok(preset)
    }
}

/// Flag cleared by Ctrl+C.
pub fn install_ctrlc() -> anyhow::Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;
    Ok(running)
}

/// Pull `frames` frames of `channels`-channel audio from an attached
/// offline stream, in buffers of `buffer_size` frames.
pub fn pull_frames(
    backend: &OfflineBackend,
    frames: usize,
    channels: usize,
    buffer_size: usize,
    out: &mut Vec<f32>,
) {
    let mut buffer = vec![0.0f32; buffer_size.max(1) * channels];
    let mut remaining = frames;
    while remaining > 0 {
        let n = remaining.min(buffer_size.max(1));
        let chunk = &mut buffer[..n * channels];
        backend.pull(chunk);
        out.extend_from_slice(chunk);
        remaining -= n;
    }
}

/// Number of whole frames in `seconds` at `sample_rate`.
pub fn frames_for(seconds: f32, sample_rate: u32) -> usize {
    (f64::from(seconds.max(0.0)) * f64::from(sample_rate)).round() as usize
}
