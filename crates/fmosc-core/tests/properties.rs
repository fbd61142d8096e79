//! Property-based tests for fmosc-core.
//!
//! Note-table ordering, oscillator phase bounds, smoothing convergence and
//! voice output bounds under randomized parameters.

use fmosc_core::{
    FmVoice, LinearSmoothedParam, Modulation, Note, Oscillator, SmoothedParam, SynthError,
    VoiceOptions, VoiceParams, Waveform, frequency_of,
};
use proptest::prelude::*;

fn waveform(i: usize) -> Waveform {
    match i % 4 {
        0 => Waveform::Sine,
        1 => Waveform::Triangle,
        2 => Waveform::Saw,
        _ => Waveform::Square,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Higher key index always means higher frequency.
    #[test]
    fn frequency_increases_with_index(a in 0i32..76, b in 0i32..76) {
        prop_assume!(a != b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        prop_assert!(frequency_of(lo).unwrap() < frequency_of(hi).unwrap());
    }

    /// Index, MIDI number and sharp spelling all resolve to the same key.
    #[test]
    fn addressing_modes_agree(index in 0i32..76) {
        let note = Note::from_index(index).unwrap();
        let by_midi = Note::from_midi(note.midi()).unwrap();
        let by_name: Note = note.sharp_name().to_string().parse().unwrap();
        let by_flat: Note = note.flat_name().to_string().parse().unwrap();
        prop_assert_eq!(note, by_midi);
        prop_assert_eq!(note, by_name);
        prop_assert_eq!(note, by_flat);
    }

    /// Every index outside the span is rejected with its value.
    #[test]
    fn out_of_span_index_is_rejected(index in prop_oneof![-1000i32..0, 76i32..1000]) {
        let err = frequency_of(index).unwrap_err();
        let rejected_with_index = matches!(err, SynthError::OutOfRange { note, .. } if note == index);
        prop_assert!(rejected_with_index);
    }

    /// Phase stays in [0, 1) for any finite frequency, including negative.
    #[test]
    fn oscillator_phase_bounded(
        freqs in prop::collection::vec(-30000.0f32..30000.0, 1..512),
        wave in 0usize..4,
    ) {
        let mut osc = Oscillator::new(waveform(wave));
        for f in freqs {
            let s = osc.advance(48000.0, f);
            prop_assert!((-1.0..=1.0).contains(&s));
            prop_assert!((0.0..1.0).contains(&osc.phase()));
        }
    }

    /// Linear smoothing lands exactly on target and never overshoots.
    #[test]
    fn linear_smoothing_no_overshoot(
        start in -1000.0f32..1000.0,
        target in -1000.0f32..1000.0,
        window_ms in 1.0f32..50.0,
    ) {
        let mut p = LinearSmoothedParam::new(start, 48000.0, window_ms);
        p.set_target(target);
        let (lo, hi) = if start < target { (start, target) } else { (target, start) };
        // f32 accumulation error, not overshoot
        let slack = 1e-4 * (lo.abs().max(hi.abs()) + 1.0);
        let samples = (window_ms / 1000.0 * 48000.0) as usize + 1;
        for _ in 0..samples {
            let v = p.advance();
            prop_assert!(v >= lo - slack && v <= hi + slack, "{} outside [{}, {}]", v, lo, hi);
        }
        prop_assert_eq!(p.get(), target);
    }

    /// Exponential smoothing lands exactly on the target.
    #[test]
    fn exponential_smoothing_converges(
        start in -10.0f32..10.0,
        target in -10.0f32..10.0,
    ) {
        let mut p = SmoothedParam::new(start, 48000.0, 10.0);
        p.set_target(target);
        for _ in 0..4800 {
            p.advance();
        }
        prop_assert!(p.is_settled());
        prop_assert_eq!(p.get(), target);
    }

    /// Voice output stays finite and within gain for any valid parameter set.
    #[test]
    fn voice_output_bounded(
        primary in 20.0f32..4000.0,
        fm in 0.1f32..8000.0,
        depth in 0.0f32..10000.0,
        gain in -1.0f32..2.0,
        carrier in 0usize..4,
        modulator in 0usize..4,
    ) {
        let options = VoiceOptions {
            carrier: waveform(carrier),
            modulator: waveform(modulator),
            ..VoiceOptions::with_sample_rate(48000.0)
        };
        let params = VoiceParams {
            primary_frequency: primary,
            modulation: Modulation::Fixed(fm),
            fm_amount: depth,
            gain,
        };
        let mut voice = FmVoice::new(params, options).unwrap();
        let limit = gain.clamp(0.0, 1.0);
        for s in voice.render(1024).unwrap() {
            prop_assert!(s.is_finite());
            prop_assert!(s.abs() <= limit + 1e-6);
        }
    }

    /// A rejected setter value never changes the published target.
    #[test]
    fn rejected_values_do_not_publish(bad in prop_oneof![
        Just(f32::NAN),
        Just(f32::INFINITY),
        Just(f32::NEG_INFINITY),
        -1.0e6f32..=0.0,
    ]) {
        let mut voice = FmVoice::with_sample_rate(48000.0).unwrap();
        let before = voice.controller().targets();
        prop_assert!(voice.set_primary_frequency(bad).is_err());
        prop_assert!(voice.set_fm_frequency(bad).is_err());
        prop_assert!(voice.set_fm_ratio(bad).is_err());
        prop_assert_eq!(voice.controller().targets(), before);
    }
}
