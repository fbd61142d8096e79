//! Audio-rate phase-accumulator oscillator.
//!
//! The oscillator keeps its phase in cycles, `[0.0, 1.0)`, and takes the
//! frequency on every call instead of storing it. That is what FM needs: the
//! carrier's instantaneous frequency changes every sample, and a frequency
//! change must never reset the phase or the modulation sidebands are lost.
//!
//! Phase is wrapped every step (Euclidean, so a negative instantaneous
//! frequency from deep modulation runs the phase backwards and still stays in
//! range). Non-sine waveforms use PolyBLEP to reduce aliasing.

use core::f32::consts::TAU;
use libm::{fabsf, floorf, sinf};

/// Euclidean wrap into `[0.0, 1.0)`.
#[inline]
fn wrap_unit(a: f32) -> f32 {
    let r = a - floorf(a);
    // a - floor(a) rounds up to 1.0 for tiny negative inputs
    if r >= 1.0 { 0.0 } else { r }
}

/// Oscillator waveform types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Pure fundamental. The reference carrier and modulator shape.
    #[default]
    Sine,
    /// Odd harmonics falling off as 1/n².
    Triangle,
    /// All harmonics, bright.
    Saw,
    /// Odd harmonics, hollow.
    Square,
}

/// Phase-accumulator oscillator.
///
/// ```rust
/// use fmosc_core::oscillator::Oscillator;
///
/// let mut osc = Oscillator::sine();
/// let first = osc.advance(48000.0, 440.0);
/// assert_eq!(first, 0.0); // sine starts at phase 0
/// ```
#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    /// Current phase in cycles, [0.0, 1.0)
    phase: f32,
    waveform: Waveform,
    /// Leaky integrator state for the triangle
    integrator: f32,
}

impl Oscillator {
    /// Create an oscillator with the given waveform at phase 0.
    pub fn new(waveform: Waveform) -> Self {
        Self {
            phase: 0.0,
            waveform,
            integrator: 0.0,
        }
    }

    /// Sine oscillator at phase 0.
    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    /// Waveform in use.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Change waveform. Phase is kept.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
        self.integrator = 0.0;
    }

    /// Current phase in cycles.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Set phase in cycles; wrapped into `[0.0, 1.0)`.
    pub fn set_phase(&mut self, phase: f32) {
        if phase.is_finite() {
            self.phase = wrap_unit(phase);
        }
    }

    /// Reset phase and waveform state.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.integrator = 0.0;
    }

    /// Produce one sample at the current phase, then advance the phase by
    /// `frequency / sample_rate`.
    ///
    /// Output is in `[-1.0, 1.0]`. A non-finite frequency or non-positive
    /// sample rate holds the phase for this step instead of corrupting it.
    #[inline]
    pub fn advance(&mut self, sample_rate: f32, frequency: f32) -> f32 {
        let increment = if sample_rate > 0.0 && frequency.is_finite() {
            frequency / sample_rate
        } else {
            0.0
        };

        let output = self.generate(self.phase, fabsf(increment));
        self.phase = wrap_unit(self.phase + increment);
        output
    }

    #[inline]
    fn generate(&mut self, phase: f32, dt: f32) -> f32 {
        match self.waveform {
            Waveform::Sine => sinf(phase * TAU),

            Waveform::Saw => {
                let naive = 2.0 * phase - 1.0;
                (naive - poly_blep(phase, dt)).clamp(-1.0, 1.0)
            }

            Waveform::Square => square_with_blep(phase, dt).clamp(-1.0, 1.0),

            Waveform::Triangle => {
                // Leaky integration of a band-limited square. The leak keeps
                // DC from building up; it tightens as frequency rises.
                let leak = 1.0 - dt.min(0.1);
                self.integrator = leak * self.integrator + square_with_blep(phase, dt) * dt * 4.0;
                self.integrator.clamp(-1.0, 1.0)
            }
        }
    }
}

#[inline]
fn square_with_blep(phase: f32, dt: f32) -> f32 {
    let naive = if phase < 0.5 { 1.0 } else { -1.0 };
    naive + poly_blep(phase, dt) - poly_blep(wrap_unit(phase + 0.5), dt)
}

/// 2nd-order PolyBLEP residual around a unit-phase discontinuity at `t = 0`.
///
/// `dt` is the per-sample phase increment; the correction is zero more than
/// one sample away from the step.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let n = t / dt;
        n + n - n * n - 1.0
    } else if t > 1.0 - dt {
        let n = (t - 1.0) / dt;
        n * n + n + n + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_rising_zero_crossings(osc: &mut Oscillator, sr: f32, freq: f32, n: usize) -> i32 {
        let mut crossings = 0;
        let mut prev = 0.0;
        for _ in 0..n {
            let sample = osc.advance(sr, freq);
            if prev <= 0.0 && sample > 0.0 {
                crossings += 1;
            }
            prev = sample;
        }
        crossings
    }

    #[test]
    fn sine_frequency_440hz() {
        let mut osc = Oscillator::sine();
        let crossings = count_rising_zero_crossings(&mut osc, 48000.0, 440.0, 48000);
        assert!((crossings - 440).abs() <= 2, "got {crossings}");
    }

    #[test]
    fn sine_frequency_1000hz_at_44100() {
        let mut osc = Oscillator::sine();
        let crossings = count_rising_zero_crossings(&mut osc, 44100.0, 1000.0, 44100);
        assert!((crossings - 1000).abs() <= 2, "got {crossings}");
    }

    #[test]
    fn sine_matches_closed_form() {
        let mut osc = Oscillator::sine();
        let sr = 48000.0;
        for n in 0..64 {
            let expected = sinf(TAU * 440.0 * n as f32 / sr);
            let actual = osc.advance(sr, 440.0);
            assert!((actual - expected).abs() < 1e-4, "sample {n}");
        }
    }

    #[test]
    fn every_waveform_stays_in_range() {
        for waveform in [Waveform::Sine, Waveform::Triangle, Waveform::Saw, Waveform::Square] {
            let mut osc = Oscillator::new(waveform);
            for i in 0..20000 {
                let freq = 50.0 + (i % 7000) as f32;
                let s = osc.advance(48000.0, freq);
                assert!((-1.0..=1.0).contains(&s), "{waveform:?} out of range: {s}");
            }
        }
    }

    #[test]
    fn phase_stays_bounded_with_negative_frequency() {
        let mut osc = Oscillator::sine();
        for _ in 0..10000 {
            osc.advance(48000.0, -3000.0);
            assert!((0.0..1.0).contains(&osc.phase()));
        }
    }

    #[test]
    fn phase_stays_bounded_over_long_runs() {
        let mut osc = Oscillator::sine();
        for _ in 0..(48000 * 20) {
            osc.advance(48000.0, 12345.678);
        }
        assert!((0.0..1.0).contains(&osc.phase()));
    }

    #[test]
    fn frequency_change_keeps_phase() {
        let mut osc = Oscillator::sine();
        for _ in 0..37 {
            osc.advance(48000.0, 440.0);
        }
        let before = osc.phase();
        osc.advance(48000.0, 880.0);
        let expected = wrap_unit(before + 880.0 / 48000.0);
        assert!((osc.phase() - expected).abs() < 1e-6);
    }

    #[test]
    fn non_finite_inputs_hold_phase() {
        let mut osc = Oscillator::sine();
        osc.advance(48000.0, 1000.0);
        let phase = osc.phase();
        let s = osc.advance(48000.0, f32::NAN);
        assert!(s.is_finite());
        assert_eq!(osc.phase(), phase);
        osc.advance(0.0, 440.0);
        assert_eq!(osc.phase(), phase);
        osc.advance(48000.0, f32::INFINITY);
        assert_eq!(osc.phase(), phase);
    }

    #[test]
    fn set_phase_wraps() {
        let mut osc = Oscillator::sine();
        osc.set_phase(1.25);
        assert!((osc.phase() - 0.25).abs() < 1e-6);
        osc.set_phase(-0.25);
        assert!((osc.phase() - 0.75).abs() < 1e-6);
        osc.reset();
        assert_eq!(osc.phase(), 0.0);
    }

    #[test]
    fn wrap_unit_never_returns_one() {
        assert_eq!(wrap_unit(-1e-12), 0.0);
        assert_eq!(wrap_unit(1.0), 0.0);
        assert!((wrap_unit(2.5) - 0.5).abs() < 1e-6);
    }
}
