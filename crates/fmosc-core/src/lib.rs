//! fmosc Core - FM synthesis voice
//!
//! A two-operator frequency-modulation voice with lock-free, click-free
//! parameter control, designed for real-time use with zero allocation in the
//! audio path.
//!
//! # Components
//!
//! - [`note`] - Note/frequency table for A0..=C7, MIDI conversion and the
//!   ordered keyboard table
//! - [`param`] - Parameter smoothing ([`LinearSmoothedParam`], [`SmoothedParam`])
//! - [`port`] - Atomic control-to-render parameter ports
//! - [`oscillator`] - Phase-accumulator oscillator
//! - [`voice`] - [`FmVoice`] and its thread-safe [`VoiceController`]
//! - [`render`] - [`RenderCallback`] for audio hosts
//!
//! # Example
//!
//! ```rust
//! use fmosc_core::{FmVoice, VoiceOptions, VoiceParams};
//!
//! let mut voice = FmVoice::new(VoiceParams::default(), VoiceOptions::with_sample_rate(44100.0))?;
//! voice.set_note("A4")?;
//! voice.set_fm_amount(0.0)?;
//! voice.set_gain(0.8)?;
//!
//! let samples = voice.render(44100)?;
//! assert_eq!(samples.len(), 44100);
//! # Ok::<(), fmosc_core::SynthError>(())
//! ```
//!
//! # no_std Support
//!
//! Disable default features to build without the standard library. `alloc`
//! is still required for the shared parameter cells.
//!
//! ```toml
//! fmosc-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;
pub mod note;
pub mod oscillator;
pub mod param;
pub mod port;
pub mod render;
pub mod voice;

/// Largest block rendered in one pass by [`RenderCallback`].
pub const MAX_BLOCK_SIZE: usize = 2048;

pub use error::{Result, SynthError};
pub use note::{IntoNote, KeyEntry, Midi, Note, frequency_of, keyboard, midi_to_frequency};
pub use oscillator::{Oscillator, Waveform};
pub use param::{LinearSmoothedParam, SmoothedParam, Smoother, Smoothing};
pub use port::{ParamHandle, ParamPort, ParamReader};
pub use render::RenderCallback;
pub use voice::{FmVoice, Modulation, VoiceController, VoiceOptions, VoiceParams, VoiceState};
