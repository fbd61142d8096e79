//! Parameter smoothing for click-free changes.
//!
//! An abrupt jump in frequency or gain at audio rate is heard as a click.
//! The smoothers here move a `current` value toward a `target` over a short
//! window instead of snapping.
//!
//! ## Smoothing Methods
//!
//! - **Linear** ([`LinearSmoothedParam`]): constant rate, lands exactly on the
//!   target after the window. The default for voice parameters.
//! - **Exponential** ([`SmoothedParam`]): one-pole lowpass, time constant set
//!   so five time constants fit in the window (99.3% settled).
//!
//! [`Smoother`] selects between the two at runtime from a [`Smoothing`] policy.
//!
//! ```rust
//! use fmosc_core::param::{Smoother, Smoothing};
//!
//! let mut gain = Smoother::new(Smoothing::Linear, 0.0, 48000.0, 10.0);
//! gain.set_target(1.0);
//!
//! // 10 ms at 48 kHz
//! for _ in 0..480 {
//!     gain.advance();
//! }
//! assert_eq!(gain.get(), 1.0);
//! ```

use libm::expf;

/// Default smoothing window in milliseconds.
pub const DEFAULT_SMOOTHING_MS: f32 = 20.0;

/// Relative gap at which exponential smoothing snaps to its target.
pub const SETTLE_TOLERANCE: f32 = 1e-6;

/// How a parameter approaches a new target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Smoothing {
    /// Constant rate; reaches the target exactly at the end of the window.
    #[default]
    Linear,
    /// One-pole approach; 99.3% settled at the end of the window.
    Exponential,
}

/// A parameter with exponential (one-pole) smoothing.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    /// Smoothing coefficient (1 = instant, towards 0 = slower)
    coeff: f32,
    sample_rate: f32,
    window_ms: f32,
}

impl SmoothedParam {
    /// Create a parameter settled at `initial`.
    ///
    /// `window_ms` is the time to settle within 0.7% of a new target.
    pub fn new(initial: f32, sample_rate: f32, window_ms: f32) -> Self {
        let mut param = Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate,
            window_ms,
        };
        param.recalculate_coeff();
        param
    }

    /// Set the value to approach.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set target and current together.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update sample rate and recalculate the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Set the settling window in milliseconds.
    pub fn set_window_ms(&mut self, window_ms: f32) {
        self.window_ms = window_ms;
        self.recalculate_coeff();
    }

    /// Advance one sample and return the new current value.
    ///
    /// Snaps to the target once a step no longer changes the value at `f32`
    /// resolution, or the gap is within [`SETTLE_TOLERANCE`] of the target's
    /// magnitude, so any finite target is reached in finite time.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        // y[n] = y[n-1] + coeff * (target - y[n-1])
        let next = self.current + self.coeff * (self.target - self.current);
        let tolerance = SETTLE_TOLERANCE * self.target.abs().max(1.0);
        if next == self.current || (next - self.target).abs() <= tolerance {
            self.current = self.target;
        } else {
            self.current = next;
        }
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the current value has reached the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Jump to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    /// `coeff = 1 - exp(-1 / (tau * sample_rate))` with `tau = window / 5`.
    fn recalculate_coeff(&mut self) {
        if self.window_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let time_constant = self.window_ms / 5000.0;
            let samples = time_constant * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}

/// A parameter with linear smoothing (constant rate of change).
///
/// Changing the target mid-ramp restarts the ramp from the current value, so
/// the value never jumps and never passes the target.
#[derive(Debug, Clone)]
pub struct LinearSmoothedParam {
    current: f32,
    target: f32,
    increment: f32,
    samples_remaining: u32,
    sample_rate: f32,
    window_ms: f32,
}

impl LinearSmoothedParam {
    /// Create a parameter settled at `initial`.
    pub fn new(initial: f32, sample_rate: f32, window_ms: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            increment: 0.0,
            samples_remaining: 0,
            sample_rate,
            window_ms,
        }
    }

    /// Set the value to approach over one window.
    ///
    /// Re-setting the current target is a no-op, so it is safe to call once
    /// per block with an unchanged value.
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;

        let samples = self.window_samples();
        if samples == 0 {
            self.snap_to_target();
        } else {
            self.increment = (target - self.current) / samples as f32;
            self.samples_remaining = samples;
        }
    }

    /// Set target and current together.
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.snap_to_target();
    }

    /// Update sample rate. Takes effect on the next target change.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Set the ramp window in milliseconds. Takes effect on the next target change.
    pub fn set_window_ms(&mut self, window_ms: f32) {
        self.window_ms = window_ms;
    }

    /// Advance one sample and return the new current value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.increment;
            self.samples_remaining -= 1;
            if self.samples_remaining == 0 {
                self.current = self.target;
            }
        }
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the ramp is complete.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.samples_remaining == 0
    }

    /// Jump to the target.
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
        self.increment = 0.0;
        self.samples_remaining = 0;
    }

    fn window_samples(&self) -> u32 {
        if self.window_ms <= 0.0 || self.sample_rate <= 0.0 {
            0
        } else {
            (self.window_ms / 1000.0 * self.sample_rate) as u32
        }
    }
}

/// Runtime-selected smoother.
#[derive(Debug, Clone)]
pub enum Smoother {
    /// Linear ramp.
    Linear(LinearSmoothedParam),
    /// One-pole approach.
    Exponential(SmoothedParam),
}

impl Smoother {
    /// Create a smoother settled at `initial`.
    pub fn new(policy: Smoothing, initial: f32, sample_rate: f32, window_ms: f32) -> Self {
        match policy {
            Smoothing::Linear => {
                Smoother::Linear(LinearSmoothedParam::new(initial, sample_rate, window_ms))
            }
            Smoothing::Exponential => {
                Smoother::Exponential(SmoothedParam::new(initial, sample_rate, window_ms))
            }
        }
    }

    /// Policy in use.
    pub fn policy(&self) -> Smoothing {
        match self {
            Smoother::Linear(_) => Smoothing::Linear,
            Smoother::Exponential(_) => Smoothing::Exponential,
        }
    }

    /// Set the value to approach.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        match self {
            Smoother::Linear(p) => p.set_target(target),
            Smoother::Exponential(p) => p.set_target(target),
        }
    }

    /// Set target and current together.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        match self {
            Smoother::Linear(p) => p.set_immediate(value),
            Smoother::Exponential(p) => p.set_immediate(value),
        }
    }

    /// Advance one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self {
            Smoother::Linear(p) => p.advance(),
            Smoother::Exponential(p) => p.advance(),
        }
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        match self {
            Smoother::Linear(p) => p.get(),
            Smoother::Exponential(p) => p.get(),
        }
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        match self {
            Smoother::Linear(p) => p.target(),
            Smoother::Exponential(p) => p.target(),
        }
    }

    /// Whether the current value has reached the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        match self {
            Smoother::Linear(p) => p.is_settled(),
            Smoother::Exponential(p) => p.is_settled(),
        }
    }

    /// Jump to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        match self {
            Smoother::Linear(p) => p.snap_to_target(),
            Smoother::Exponential(p) => p.snap_to_target(),
        }
    }
}
