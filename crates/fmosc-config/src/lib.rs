//! Voice presets and configuration for fmosc.
//!
//! # Features
//!
//! - **Preset files**: load and save [`VoicePreset`]s as TOML
//! - **Validation**: range checks plus the synthesis core's own parameter rules
//! - **Factory presets**: built-in voices that need no files
//! - **Paths**: the per-user presets directory
//!
//! # Example
//!
//! ```rust,no_run
//! use fmosc_config::{VoicePreset, VoiceSettings, paths::user_presets_dir};
//!
//! let preset = VoicePreset::new("Pluck")
//!     .with_description("Short bright pluck")
//!     .with_voice(VoiceSettings {
//!         note: Some("E3".to_string()),
//!         fm_ratio: Some(3.0),
//!         fm_amount: 250.0,
//!         ..VoiceSettings::default()
//!     });
//!
//! preset.save(user_presets_dir().join("pluck.toml")).unwrap();
//!
//! let mut voice = preset.build_voice().unwrap();
//! let samples = voice.render(512).unwrap();
//! ```

mod error;
mod preset;

/// Factory presets bundled with the library.
pub mod factory_presets;

/// Platform-specific preset locations.
pub mod paths;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use paths::{find_preset, resolve_preset, user_presets_dir};
pub use preset::{
    MAX_BUFFER_SIZE, MAX_SAMPLE_RATE, MAX_SMOOTHING_MS, MIN_BUFFER_SIZE, MIN_SAMPLE_RATE,
    SmoothingKind, VoicePreset, VoiceSettings, WaveformKind,
};
