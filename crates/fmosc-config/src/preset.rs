//! Voice preset file format and operations.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use fmosc_core::note::frequency_of;
use fmosc_core::{FmVoice, Modulation, Smoothing, VoiceOptions, VoiceParams, Waveform};

use crate::error::ConfigError;

/// Lowest accepted sample rate in Hz.
pub const MIN_SAMPLE_RATE: u32 = 8000;
/// Highest accepted sample rate in Hz.
pub const MAX_SAMPLE_RATE: u32 = 192_000;
/// Smallest accepted host buffer size in frames.
pub const MIN_BUFFER_SIZE: u32 = 16;
/// Largest accepted host buffer size in frames.
pub const MAX_BUFFER_SIZE: u32 = 8192;
/// Longest accepted smoothing window in milliseconds.
pub const MAX_SMOOTHING_MS: f32 = 1000.0;

/// Smoothing curve as written in preset files.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingKind {
    /// Constant-rate ramp.
    #[default]
    Linear,
    /// One-pole approach.
    Exponential,
}

impl From<SmoothingKind> for Smoothing {
    fn from(kind: SmoothingKind) -> Self {
        match kind {
            SmoothingKind::Linear => Smoothing::Linear,
            SmoothingKind::Exponential => Smoothing::Exponential,
        }
    }
}

impl FromStr for SmoothingKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(SmoothingKind::Linear),
            "exponential" | "exp" => Ok(SmoothingKind::Exponential),
            _ => Err(ConfigError::invalid(
                "smoothing",
                format!("unknown smoothing '{s}', expected linear or exponential"),
            )),
        }
    }
}

impl fmt::Display for SmoothingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SmoothingKind::Linear => "linear",
            SmoothingKind::Exponential => "exponential",
        })
    }
}

/// Oscillator waveform as written in preset files.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WaveformKind {
    /// Sine.
    #[default]
    Sine,
    /// Triangle.
    Triangle,
    /// Band-limited saw.
    Saw,
    /// Band-limited square.
    Square,
}

impl From<WaveformKind> for Waveform {
    fn from(kind: WaveformKind) -> Self {
        match kind {
            WaveformKind::Sine => Waveform::Sine,
            WaveformKind::Triangle => Waveform::Triangle,
            WaveformKind::Saw => Waveform::Saw,
            WaveformKind::Square => Waveform::Square,
        }
    }
}

impl FromStr for WaveformKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sine" | "sin" => Ok(WaveformKind::Sine),
            "triangle" | "tri" => Ok(WaveformKind::Triangle),
            "saw" | "sawtooth" => Ok(WaveformKind::Saw),
            "square" | "sqr" => Ok(WaveformKind::Square),
            _ => Err(ConfigError::invalid(
                "waveform",
                format!("unknown waveform '{s}', expected sine, triangle, saw or square"),
            )),
        }
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WaveformKind::Sine => "sine",
            WaveformKind::Triangle => "triangle",
            WaveformKind::Saw => "saw",
            WaveformKind::Square => "square",
        })
    }
}

/// Initial voice parameters in a preset.
///
/// At most one of `note`/`frequency` and one of `fm_frequency`/`fm_ratio`
/// may be set. Unset values fall back to the voice defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceSettings {
    /// Starting note name, e.g. `"A4"` or `"C#3"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Starting primary frequency in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f32>,

    /// Fixed modulator frequency in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fm_frequency: Option<f32>,

    /// Modulator frequency as a multiple of the primary frequency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fm_ratio: Option<f32>,

    /// Frequency deviation in Hz.
    #[serde(default)]
    pub fm_amount: f32,

    /// Output gain, 0.0 to 1.0.
    #[serde(default = "default_gain")]
    pub gain: f32,
}

fn default_gain() -> f32 {
    fmosc_core::voice::DEFAULT_GAIN
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            note: None,
            frequency: None,
            fm_frequency: None,
            fm_ratio: None,
            fm_amount: 0.0,
            gain: default_gain(),
        }
    }
}

impl VoiceSettings {
    /// Resolve to validated voice parameters.
    pub fn to_params(&self) -> Result<VoiceParams, ConfigError> {
        let defaults = VoiceParams::default();

        let primary_frequency = match (&self.note, self.frequency) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::invalid(
                    "voice",
                    "set either note or frequency, not both",
                ));
            }
            (Some(note), None) => frequency_of(note.as_str())?,
            (None, Some(hz)) => hz,
            (None, None) => defaults.primary_frequency,
        };

        let modulation = match (self.fm_frequency, self.fm_ratio) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::invalid(
                    "voice",
                    "set either fm_frequency or fm_ratio, not both",
                ));
            }
            (Some(hz), None) => Modulation::Fixed(hz),
            (None, Some(ratio)) => Modulation::Ratio(ratio),
            (None, None) => defaults.modulation,
        };

        VoiceParams {
            primary_frequency,
            modulation,
            fm_amount: self.fm_amount,
            gain: self.gain,
        }
        .validated()
        .map_err(ConfigError::from)
    }
}

/// Preset file for one FM voice.
///
/// # TOML Format
///
/// ```toml
/// name = "Bell"
/// description = "Inharmonic bell"
/// sample_rate = 48000
/// buffer_size = 512
/// smoothing_ms = 20.0
/// smoothing = "linear"
/// carrier = "sine"
/// modulator = "sine"
///
/// [voice]
/// note = "A4"
/// fm_ratio = 3.5
/// fm_amount = 600.0
/// gain = 0.7
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoicePreset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate hint (defaults to 48000).
    /// Hosts may override it with the device rate.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Host buffer size hint in frames.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,

    /// Parameter smoothing window in milliseconds.
    #[serde(default = "default_smoothing_ms")]
    pub smoothing_ms: f32,

    /// Parameter smoothing curve.
    #[serde(default)]
    pub smoothing: SmoothingKind,

    /// Carrier waveform.
    #[serde(default)]
    pub carrier: WaveformKind,

    /// Modulator waveform.
    #[serde(default)]
    pub modulator: WaveformKind,

    /// Initial voice parameters.
    #[serde(default)]
    pub voice: VoiceSettings,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_buffer_size() -> u32 {
    512
}

fn default_smoothing_ms() -> f32 {
    fmosc_core::param::DEFAULT_SMOOTHING_MS
}

impl VoicePreset {
    /// Create a preset with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            smoothing_ms: default_smoothing_ms(),
            smoothing: SmoothingKind::default(),
            carrier: WaveformKind::default(),
            modulator: WaveformKind::default(),
            voice: VoiceSettings::default(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate hint.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the initial voice parameters.
    pub fn with_voice(mut self, voice: VoiceSettings) -> Self {
        self.voice = voice;
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check ranges and voice parameters without building a voice.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(ConfigError::invalid(
                "sample_rate",
                format!("must be between {MIN_SAMPLE_RATE} and {MAX_SAMPLE_RATE}"),
            ));
        }
        if !(MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&self.buffer_size) {
            return Err(ConfigError::invalid(
                "buffer_size",
                format!("must be between {MIN_BUFFER_SIZE} and {MAX_BUFFER_SIZE}"),
            ));
        }
        if !(self.smoothing_ms.is_finite() && (0.0..=MAX_SMOOTHING_MS).contains(&self.smoothing_ms))
        {
            return Err(ConfigError::invalid(
                "smoothing_ms",
                format!("must be between 0 and {MAX_SMOOTHING_MS}"),
            ));
        }
        if !(0.0..=1.0).contains(&self.voice.gain) {
            return Err(ConfigError::invalid("gain", "must be between 0.0 and 1.0"));
        }
        self.voice.to_params()?;
        Ok(())
    }

    /// Construction options for the voice.
    pub fn voice_options(&self) -> VoiceOptions {
        VoiceOptions {
            sample_rate: self.sample_rate as f32,
            smoothing_ms: self.smoothing_ms,
            smoothing: self.smoothing.into(),
            carrier: self.carrier.into(),
            modulator: self.modulator.into(),
        }
    }

    /// Validated initial parameters for the voice.
    pub fn voice_params(&self) -> Result<VoiceParams, ConfigError> {
        self.voice.to_params()
    }

    /// Validate and build an active voice.
    pub fn build_voice(&self) -> Result<FmVoice, ConfigError> {
        self.validate()?;
        Ok(FmVoice::new(self.voice_params()?, self.voice_options())?)
    }
}

impl Default for VoicePreset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
