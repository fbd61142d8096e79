//! Two-operator FM voice.
//!
//! A sine modulator bends the instantaneous frequency of a sine carrier:
//!
//! ```text
//! mod_signal    = modulator(fm_frequency)
//! carrier_freq  = primary_frequency + mod_signal * fm_amount
//! output        = carrier(carrier_freq) * gain
//! ```
//!
//! `fm_amount` is a frequency deviation in Hz. With an amount of zero the
//! voice is a plain sine at the primary frequency.
//!
//! Control and rendering are split. [`VoiceController`] is the control-side
//! half: every setter validates, then publishes through a lock-free
//! [`ParamHandle`](crate::port::ParamHandle). The render-side half owns the
//! oscillators and the port readers and can be moved to an audio thread with
//! [`FmVoice::into_render_callback`].
//!
//! ```rust
//! use fmosc_core::voice::{FmVoice, VoiceOptions, VoiceParams};
//!
//! let mut voice = FmVoice::new(VoiceParams::default(), VoiceOptions::default()).unwrap();
//! voice.set_note("A4").unwrap();
//! voice.set_fm_frequency(220.0).unwrap();
//! voice.set_fm_amount(100.0).unwrap();
//!
//! let block = voice.render(256).unwrap();
//! assert!(block.iter().all(|s| s.abs() <= 1.0));
//! ```

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::error::{Result, SynthError};
use crate::note::{IntoNote, midi_to_frequency};
use crate::oscillator::{Oscillator, Waveform};
use crate::param::{DEFAULT_SMOOTHING_MS, Smoothing};
use crate::port::{ParamHandle, ParamPort, ParamReader};
use crate::render::RenderCallback;

const ACTIVE: u8 = 1;
const RELEASED: u8 = 2;

const TRACK_FIXED: u8 = 0;
const TRACK_RATIO: u8 = 1;

/// MIDI note a default voice starts on (D3).
pub const DEFAULT_MIDI_NOTE: u8 = 50;

/// Default modulator-to-primary ratio.
pub const DEFAULT_FM_RATIO: f32 = 2.0;

/// Default output gain.
pub const DEFAULT_GAIN: f32 = 0.8;

/// Lifecycle of a voice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceState {
    /// Accepting control changes and producing audio.
    Active,
    /// Released. Setters fail and rendering is silent.
    Released,
}

/// How the modulator frequency is derived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Modulation {
    /// Fixed modulator frequency in Hz.
    Fixed(f32),
    /// Modulator follows the primary frequency times this ratio.
    Ratio(f32),
}

/// Initial parameter values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceParams {
    /// Carrier base frequency in Hz.
    pub primary_frequency: f32,
    /// Modulator frequency source.
    pub modulation: Modulation,
    /// Frequency deviation in Hz, >= 0.
    pub fm_amount: f32,
    /// Output gain, clamped to [0, 1].
    pub gain: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            primary_frequency: midi_to_frequency(f32::from(DEFAULT_MIDI_NOTE)),
            modulation: Modulation::Ratio(DEFAULT_FM_RATIO),
            fm_amount: 0.0,
            gain: DEFAULT_GAIN,
        }
    }
}

impl VoiceParams {
    /// Defaults with the primary frequency taken from `note`.
    pub fn from_note(note: impl IntoNote) -> Result<Self> {
        Ok(Self {
            primary_frequency: note.into_note()?.frequency(),
            ..Self::default()
        })
    }

    /// Check every field, returning the values the voice will start with.
    pub fn validated(self) -> Result<Self> {
        let modulation = match self.modulation {
            Modulation::Fixed(hz) => Modulation::Fixed(check_frequency("fm_frequency", hz)?),
            Modulation::Ratio(r) => Modulation::Ratio(check_frequency("fm_ratio", r)?),
        };
        Ok(Self {
            primary_frequency: check_frequency("primary_frequency", self.primary_frequency)?,
            modulation,
            fm_amount: check_amount(self.fm_amount)?,
            gain: check_gain(self.gain)?,
        })
    }
}

/// Construction-time settings that do not change while the voice runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceOptions {
    /// Render sample rate in Hz.
    pub sample_rate: f32,
    /// Smoothing window for parameter changes, in milliseconds.
    pub smoothing_ms: f32,
    /// Smoothing curve.
    pub smoothing: Smoothing,
    /// Carrier waveform.
    pub carrier: Waveform,
    /// Modulator waveform.
    pub modulator: Waveform,
}

impl Default for VoiceOptions {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            smoothing_ms: DEFAULT_SMOOTHING_MS,
            smoothing: Smoothing::Linear,
            carrier: Waveform::Sine,
            modulator: Waveform::Sine,
        }
    }
}

impl VoiceOptions {
    /// Default options at the given sample rate.
    pub fn with_sample_rate(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SynthError::invalid(
                "sample_rate",
                "must be finite and greater than zero",
            ));
        }
        if !(self.smoothing_ms.is_finite() && self.smoothing_ms >= 0.0) {
            return Err(SynthError::invalid(
                "smoothing_ms",
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

fn check_frequency(param: &'static str, hz: f32) -> Result<f32> {
    if hz.is_finite() && hz > 0.0 {
        Ok(hz)
    } else {
        Err(SynthError::invalid(param, "must be finite and greater than zero"))
    }
}

fn check_amount(depth: f32) -> Result<f32> {
    if depth.is_finite() && depth >= 0.0 {
        Ok(depth)
    } else {
        Err(SynthError::invalid("fm_amount", "must be finite and non-negative"))
    }
}

fn check_gain(level: f32) -> Result<f32> {
    if level.is_finite() {
        Ok(level.clamp(0.0, 1.0))
    } else {
        Err(SynthError::invalid("gain", "must be finite"))
    }
}

/// State shared by the control and render halves.
#[derive(Debug)]
struct VoiceShared {
    lifecycle: AtomicU8,
    tracking: AtomicU8,
}

impl VoiceShared {
    fn state(&self) -> VoiceState {
        if self.lifecycle.load(Ordering::Acquire) == RELEASED {
            VoiceState::Released
        } else {
            VoiceState::Active
        }
    }

    /// Returns true if this call moved the voice to Released.
    fn release(&self) -> bool {
        self.lifecycle
            .compare_exchange(ACTIVE, RELEASED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Control-side handle to a voice.
///
/// Cheap to clone, `Send + Sync`. Setters never block and never allocate, so
/// they are safe to call from UI or MIDI threads while the voice renders.
#[derive(Debug, Clone)]
pub struct VoiceController {
    shared: Arc<VoiceShared>,
    primary: ParamHandle,
    fm_frequency: ParamHandle,
    fm_ratio: ParamHandle,
    fm_amount: ParamHandle,
    gain: ParamHandle,
}

impl VoiceController {
    #[inline]
    fn ensure_active(&self) -> Result<()> {
        match self.shared.state() {
            VoiceState::Active => Ok(()),
            VoiceState::Released => Err(SynthError::AlreadyReleased),
        }
    }

    /// Set the carrier base frequency in Hz. Glides over the smoothing window.
    pub fn set_primary_frequency(&self, hz: f32) -> Result<()> {
        self.ensure_active()?;
        self.primary
            .set_target(check_frequency("primary_frequency", hz)?);
        Ok(())
    }

    /// Set the primary frequency from a note.
    pub fn set_note(&self, note: impl IntoNote) -> Result<()> {
        self.ensure_active()?;
        let note = note.into_note()?;
        self.primary.set_target(note.frequency());
        Ok(())
    }

    /// Set a fixed modulator frequency in Hz.
    pub fn set_fm_frequency(&self, hz: f32) -> Result<()> {
        self.ensure_active()?;
        self.fm_frequency
            .set_target(check_frequency("fm_frequency", hz)?);
        self.shared.tracking.store(TRACK_FIXED, Ordering::Release);
        Ok(())
    }

    /// Make the modulator track the primary frequency times `ratio`.
    pub fn set_fm_ratio(&self, ratio: f32) -> Result<()> {
        self.ensure_active()?;
        self.fm_ratio.set_target(check_frequency("fm_ratio", ratio)?);
        self.shared.tracking.store(TRACK_RATIO, Ordering::Release);
        Ok(())
    }

    /// Set the frequency deviation in Hz. Zero disables modulation.
    pub fn set_fm_amount(&self, depth: f32) -> Result<()> {
        self.ensure_active()?;
        self.fm_amount.set_target(check_amount(depth)?);
        Ok(())
    }

    /// Set output gain. Finite values are clamped to [0, 1].
    pub fn set_gain(&self, level: f32) -> Result<()> {
        self.ensure_active()?;
        self.gain.set_target(check_gain(level)?);
        Ok(())
    }

    /// Release the voice. Fails if it was already released.
    pub fn release(&self) -> Result<()> {
        if self.shared.release() {
            #[cfg(feature = "tracing")]
            tracing::debug!("fm voice released");
            Ok(())
        } else {
            Err(SynthError::AlreadyReleased)
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VoiceState {
        self.shared.state()
    }

    /// Most recently published targets.
    pub fn targets(&self) -> VoiceParams {
        let modulation = if self.shared.tracking.load(Ordering::Acquire) == TRACK_RATIO {
            Modulation::Ratio(self.fm_ratio.target())
        } else {
            Modulation::Fixed(self.fm_frequency.target())
        };
        VoiceParams {
            primary_frequency: self.primary.target(),
            modulation,
            fm_amount: self.fm_amount.target(),
            gain: self.gain.target(),
        }
    }
}

/// Render-side half of a voice. Releases the voice when dropped.
#[derive(Debug)]
pub(crate) struct VoiceEngine {
    shared: Arc<VoiceShared>,
    sample_rate: f32,
    carrier: Oscillator,
    modulator: Oscillator,
    primary: ParamReader,
    fm_frequency: ParamReader,
    fm_ratio: ParamReader,
    fm_amount: ParamReader,
    gain: ParamReader,
}

impl VoiceEngine {
    pub(crate) fn is_released(&self) -> bool {
        self.shared.state() == VoiceState::Released
    }

    /// Fill `out` with the next samples. Silent once released.
    ///
    /// Parameter targets are picked up once, at the start of the call.
    pub(crate) fn render(&mut self, out: &mut [f32]) {
        if self.is_released() {
            out.fill(0.0);
            return;
        }
        if out.is_empty() {
            return;
        }

        let track_ratio = self.shared.tracking.load(Ordering::Acquire) == TRACK_RATIO;
        self.primary.sync();
        self.fm_amount.sync();
        self.gain.sync();
        if track_ratio {
            self.fm_ratio.sync();
        } else {
            self.fm_frequency.sync();
        }

        let sr = self.sample_rate;
        let mut primary = self.primary.current();
        let mut mod_frequency = 0.0;
        for sample in out.iter_mut() {
            primary = self.primary.read_current();
            mod_frequency = if track_ratio {
                primary * self.fm_ratio.read_current()
            } else {
                self.fm_frequency.read_current()
            };
            let depth = self.fm_amount.read_current();
            let gain = self.gain.read_current();

            let mod_signal = self.modulator.advance(sr, mod_frequency);
            let carrier = self.carrier.advance(sr, primary + mod_signal * depth);
            *sample = carrier * gain;
        }

        // Keep the idle modulator source parked at the live modulator
        // frequency so switching tracking mode ramps instead of jumping.
        if track_ratio {
            self.fm_frequency.follow(mod_frequency);
        } else if primary > 0.0 {
            self.fm_ratio.follow(mod_frequency / primary);
        }
    }
}

impl Drop for VoiceEngine {
    fn drop(&mut self) {
        if self.shared.release() {
            #[cfg(feature = "tracing")]
            tracing::debug!("fm voice released on drop");
        }
    }
}

/// A monophonic two-operator FM voice.
///
/// Owns both halves. Use [`controller`](Self::controller) to drive it from
/// another thread, or [`into_render_callback`](Self::into_render_callback)
/// to hand rendering to an audio host.
#[derive(Debug)]
pub struct FmVoice {
    controller: VoiceController,
    engine: VoiceEngine,
}

impl FmVoice {
    /// Create an active voice.
    pub fn new(params: VoiceParams, options: VoiceOptions) -> Result<Self> {
        options.validate()?;
        let params = params.validated()?;

        let VoiceOptions {
            sample_rate,
            smoothing_ms,
            smoothing,
            carrier,
            modulator,
        } = options;
        let port = |initial: f32| ParamPort::new(initial, smoothing, sample_rate, smoothing_ms);

        let (fixed_hz, ratio, tracking) = match params.modulation {
            Modulation::Fixed(hz) => (hz, hz / params.primary_frequency, TRACK_FIXED),
            Modulation::Ratio(r) => (params.primary_frequency * r, r, TRACK_RATIO),
        };

        let shared = Arc::new(VoiceShared {
            lifecycle: AtomicU8::new(ACTIVE),
            tracking: AtomicU8::new(tracking),
        });
        let (primary_handle, primary) = port(params.primary_frequency);
        let (fm_frequency_handle, fm_frequency) = port(fixed_hz);
        let (fm_ratio_handle, fm_ratio) = port(ratio);
        let (fm_amount_handle, fm_amount) = port(params.fm_amount);
        let (gain_handle, gain) = port(params.gain);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate,
            primary_frequency = params.primary_frequency,
            "fm voice created"
        );

        Ok(Self {
            controller: VoiceController {
                shared: Arc::clone(&shared),
                primary: primary_handle,
                fm_frequency: fm_frequency_handle,
                fm_ratio: fm_ratio_handle,
                fm_amount: fm_amount_handle,
                gain: gain_handle,
            },
            engine: VoiceEngine {
                shared,
                sample_rate,
                carrier: Oscillator::new(carrier),
                modulator: Oscillator::new(modulator),
                primary,
                fm_frequency,
                fm_ratio,
                fm_amount,
                gain,
            },
        })
    }

    /// Default voice at `sample_rate`.
    pub fn with_sample_rate(sample_rate: f32) -> Result<Self> {
        Self::new(
            VoiceParams::default(),
            VoiceOptions::with_sample_rate(sample_rate),
        )
    }

    /// Render sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.engine.sample_rate
    }

    /// A control handle for this voice.
    pub fn controller(&self) -> VoiceController {
        self.controller.clone()
    }

    /// See [`VoiceController::set_primary_frequency`].
    pub fn set_primary_frequency(&mut self, hz: f32) -> Result<()> {
        self.controller.set_primary_frequency(hz)
    }

    /// See [`VoiceController::set_note`].
    pub fn set_note(&mut self, note: impl IntoNote) -> Result<()> {
        self.controller.set_note(note)
    }

    /// See [`VoiceController::set_fm_frequency`].
    pub fn set_fm_frequency(&mut self, hz: f32) -> Result<()> {
        self.controller.set_fm_frequency(hz)
    }

    /// See [`VoiceController::set_fm_ratio`].
    pub fn set_fm_ratio(&mut self, ratio: f32) -> Result<()> {
        self.controller.set_fm_ratio(ratio)
    }

    /// See [`VoiceController::set_fm_amount`].
    pub fn set_fm_amount(&mut self, depth: f32) -> Result<()> {
        self.controller.set_fm_amount(depth)
    }

    /// See [`VoiceController::set_gain`].
    pub fn set_gain(&mut self, level: f32) -> Result<()> {
        self.controller.set_gain(level)
    }

    /// Release the voice. A second call fails with [`SynthError::AlreadyReleased`].
    pub fn release(&mut self) -> Result<()> {
        self.controller.release()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VoiceState {
        self.controller.state()
    }

    /// Render into `out` without allocating.
    ///
    /// On a released voice `out` is zero-filled and
    /// [`SynthError::AlreadyReleased`] is returned.
    pub fn render_into(&mut self, out: &mut [f32]) -> Result<()> {
        if self.engine.is_released() {
            out.fill(0.0);
            return Err(SynthError::AlreadyReleased);
        }
        self.engine.render(out);
        Ok(())
    }

    /// Render `len` samples into a new buffer.
    ///
    /// Fails with [`SynthError::InvalidParameter`] instead of aborting when
    /// the buffer cannot be allocated.
    pub fn render(&mut self, len: usize) -> Result<Vec<f32>> {
        if self.engine.is_released() {
            return Err(SynthError::AlreadyReleased);
        }
        let mut out = Vec::new();
        out.try_reserve_exact(len)
            .map_err(|_| SynthError::invalid("len", "too many samples to allocate"))?;
        out.resize(len, 0.0);
        self.engine.render(&mut out);
        Ok(out)
    }

    /// Split into a control handle and a host-facing render callback that
    /// writes `channels` interleaved channels (at least one).
    pub fn into_render_callback(self, channels: usize) -> (VoiceController, RenderCallback) {
        let Self { controller, engine } = self;
        (controller, RenderCallback::new(engine, channels))
    }
}
