//! Audio output layer for fmosc.
//!
//! This crate provides:
//!
//! - **Backends**: the [`AudioBackend`] trait with a hardware [`CpalBackend`]
//!   and a pull-driven [`OfflineBackend`]
//! - **Playback**: [`VoicePlayer`] hands an [`FmVoice`](fmosc_core::FmVoice)
//!   to a backend and keeps the control half on the caller's thread
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for rendered audio
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fmosc_core::FmVoice;
//! use fmosc_io::{BackendStreamConfig, CpalBackend, VoicePlayer};
//!
//! let backend = CpalBackend::new();
//! let config = BackendStreamConfig::default();
//! let voice = FmVoice::with_sample_rate(config.sample_rate as f32)?;
//!
//! let player = VoicePlayer::start(&backend, &config, voice)?;
//! player.controller().set_note("A4")?;
//! std::thread::sleep(std::time::Duration::from_secs(1));
//! player.stop()?;
//! ```

pub mod backend;
pub mod cpal_backend;
mod devices;
pub mod offline;
mod player;
mod wav;

pub use backend::{AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle};
pub use cpal_backend::CpalBackend;
pub use devices::{AudioDevice, default_device, find_device_fuzzy, list_devices};
pub use offline::OfflineBackend;
pub use player::VoicePlayer;
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The voice rejected a control operation.
    #[error("Voice error: {0}")]
    Voice(#[from] fmosc_core::SynthError),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
