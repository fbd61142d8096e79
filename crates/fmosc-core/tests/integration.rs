//! Integration tests for fmosc-core.
//!
//! End-to-end checks through the public API: note table, voice rendering,
//! spectral content, smoothing and the release lifecycle across threads.

use fmosc_core::{
    FmVoice, Midi, Modulation, Oscillator, Smoothing, SynthError, VoiceOptions, VoiceParams,
    VoiceState, frequency_of, keyboard,
};
use rustfft::{FftPlanner, num_complex::Complex};

/// Frequency of the strongest FFT bin, excluding DC.
fn peak_frequency(samples: &[f32], sample_rate: f32) -> f32 {
    let n = samples.len();
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex<f32>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut buffer);

    let (bin, _) = buffer[..n / 2]
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
        .unwrap();
    bin as f32 * sample_rate / n as f32
}

fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

// ---------------------------------------------------------------------------
// 1. Note table
// ---------------------------------------------------------------------------

#[test]
fn keyboard_is_strictly_ascending() {
    let freqs: Vec<f32> = keyboard().map(|k| k.frequency).collect();
    assert_eq!(freqs.len(), 76);
    assert!(freqs.windows(2).all(|w| w[0] < w[1]));
    assert!((freqs[0] - 27.5).abs() < 1e-4);
    assert!((freqs[75] - 2093.005).abs() < 1e-2);
}

#[test]
fn enharmonic_spellings_agree_across_the_keyboard() {
    for key in keyboard().filter(|k| k.is_black()) {
        let sharp = key.note.sharp_name().to_string();
        let flat = key.note.flat_name().to_string();
        assert_eq!(frequency_of(sharp.as_str()).unwrap(), key.frequency);
        assert_eq!(frequency_of(flat.as_str()).unwrap(), key.frequency);
    }
}

#[test]
fn out_of_span_notes_are_rejected() {
    assert!(matches!(frequency_of("G#0"), Err(SynthError::OutOfRange { .. })));
    assert!(matches!(frequency_of("C#7"), Err(SynthError::OutOfRange { .. })));
    assert!(matches!(frequency_of(Midi(20)), Err(SynthError::OutOfRange { .. })));
    assert!(frequency_of(Midi(96)).is_ok());
}

// ---------------------------------------------------------------------------
// 2. Rendering
// ---------------------------------------------------------------------------

#[test]
fn a4_scenario_renders_clean_440_sine() {
    let sr = 44100.0;
    let mut voice =
        FmVoice::new(VoiceParams::default(), VoiceOptions::with_sample_rate(sr)).unwrap();
    voice.set_note("A4").unwrap();
    voice.set_fm_amount(0.0).unwrap();
    voice.set_gain(0.8).unwrap();

    let mut output = Vec::with_capacity(44100);
    let mut block = [0.0f32; 441];
    for _ in 0..100 {
        voice.render_into(&mut block).unwrap();
        output.extend_from_slice(&block);
    }

    let peak = peak_frequency(&output, sr);
    assert!((peak - 440.0).abs() <= 1.0, "peak at {peak} Hz");

    let amplitude = peak_amplitude(&output);
    assert!(amplitude > 0.79 && amplitude <= 0.8, "amplitude {amplitude}");

    // Largest step a 440 Hz sine at 0.8 can take in one sample.
    let max_step = 0.8 * std::f32::consts::TAU * 440.0 / sr + 1e-4;
    for (i, w) in output.windows(2).enumerate() {
        assert!((w[1] - w[0]).abs() <= max_step, "discontinuity at sample {i}");
    }
}

#[test]
fn block_size_does_not_change_output() {
    let params = VoiceParams {
        primary_frequency: 330.0,
        modulation: Modulation::Fixed(165.0),
        fm_amount: 80.0,
        gain: 0.5,
    };
    let options = VoiceOptions::with_sample_rate(48000.0);

    let mut whole = FmVoice::new(params, options).unwrap();
    let reference = whole.render(4096).unwrap();

    let mut blocked = FmVoice::new(params, options).unwrap();
    let mut output = Vec::new();
    for size in [1, 63, 512, 1000, 2520] {
        output.extend(blocked.render(size).unwrap());
    }
    assert_eq!(output.len(), reference.len());
    assert_eq!(output, reference);
}

#[test]
fn constant_parameters_peak_at_primary() {
    let sr = 48000.0;
    for (primary, fm, depth) in [(220.0, 110.0, 0.0), (1000.0, 3000.0, 0.0), (440.0, 300.0, 10.0)] {
        let mut voice = FmVoice::new(
            VoiceParams {
                primary_frequency: primary,
                modulation: Modulation::Fixed(fm),
                fm_amount: depth,
                gain: 1.0,
            },
            VoiceOptions::with_sample_rate(sr),
        )
        .unwrap();

        let mut output = Vec::new();
        for _ in 0..12 {
            output.extend(voice.render(4000).unwrap());
        }
        let peak = peak_frequency(&output, sr);
        assert!((peak - primary).abs() <= 2.0, "expected {primary}, peak at {peak}");
    }
}

#[test]
fn modulation_creates_sidebands() {
    let sr = 48000.0;
    let mut voice = FmVoice::new(
        VoiceParams {
            primary_frequency: 1000.0,
            modulation: Modulation::Fixed(200.0),
            fm_amount: 400.0,
            gain: 1.0,
        },
        VoiceOptions::with_sample_rate(sr),
    )
    .unwrap();
    let output = voice.render(48000).unwrap();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(output.len());
    let mut buffer: Vec<Complex<f32>> = output.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut buffer);

    // Modulation index 2: the first sideband pair is stronger than the carrier.
    let carrier = buffer[1000].norm();
    let upper = buffer[1200].norm();
    let lower = buffer[800].norm();
    assert!(upper > carrier && lower > carrier);
}

#[test]
fn depth_zero_ignores_modulator_frequency() {
    let sr = 48000.0;
    for fm in [0.5, 55.0, 4000.0, 19000.0] {
        let mut voice = FmVoice::new(
            VoiceParams {
                primary_frequency: 261.63,
                modulation: Modulation::Fixed(fm),
                fm_amount: 0.0,
                gain: 1.0,
            },
            VoiceOptions::with_sample_rate(sr),
        )
        .unwrap();
        let mut reference = Oscillator::sine();
        for s in voice.render(2048).unwrap() {
            assert_eq!(s, reference.advance(sr, 261.63));
        }
    }
}

#[test]
fn glide_is_continuous() {
    let sr = 48000.0;
    let mut voice = FmVoice::new(
        VoiceParams {
            primary_frequency: 110.0,
            gain: 1.0,
            ..VoiceParams::default()
        },
        VoiceOptions::with_sample_rate(sr),
    )
    .unwrap();
    let mut output = voice.render(480).unwrap();
    for key in keyboard().skip(30).step_by(4).take(8) {
        voice.set_primary_frequency(key.frequency).unwrap();
        output.extend(voice.render(480).unwrap());
    }
    let highest = keyboard().skip(30).step_by(4).take(8).last().unwrap().frequency;
    let max_step = std::f32::consts::TAU * highest / sr + 1e-3;
    assert!(output.windows(2).all(|w| (w[1] - w[0]).abs() <= max_step));
}

#[test]
fn exponential_gain_step_converges_in_range() {
    let sr = 48000.0;
    let options = VoiceOptions {
        smoothing: Smoothing::Exponential,
        smoothing_ms: 10.0,
        ..VoiceOptions::with_sample_rate(sr)
    };
    let mut voice = FmVoice::new(
        VoiceParams {
            primary_frequency: 440.0,
            gain: 0.0,
            ..VoiceParams::default()
        },
        options,
    )
    .unwrap();
    voice.render(32).unwrap();
    voice.set_gain(1.0).unwrap();

    let ramp = voice.render(480).unwrap();
    assert!(ramp.iter().all(|s| s.abs() <= 1.0));

    // After the window the envelope of the sine is within 1% of full scale.
    let settled = voice.render(4800).unwrap();
    let amplitude = peak_amplitude(&settled);
    assert!(amplitude > 0.99 && amplitude <= 1.0, "amplitude {amplitude}");
}

// ---------------------------------------------------------------------------
// 3. Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn release_during_rendering_silences_next_block() {
    let voice = FmVoice::with_sample_rate(48000.0).unwrap();
    let (controller, mut callback) = voice.into_render_callback(2);
    controller.set_note("A4").unwrap();

    let audio = std::thread::spawn(move || {
        let mut buffer = vec![0.0f32; 256];
        let mut silent_blocks = 0;
        while silent_blocks < 3 {
            callback.process(&mut buffer);
            if callback.is_released() && buffer.iter().all(|&s| s == 0.0) {
                silent_blocks += 1;
            }
        }
        callback
    });

    std::thread::sleep(std::time::Duration::from_millis(5));
    controller.release().unwrap();
    let callback = audio.join().unwrap();

    assert!(callback.is_released());
    assert_eq!(controller.state(), VoiceState::Released);
    assert_eq!(controller.release(), Err(SynthError::AlreadyReleased));
    assert_eq!(controller.set_note("A4"), Err(SynthError::AlreadyReleased));
}

#[test]
fn independent_voices_do_not_interact() {
    let mut a = FmVoice::with_sample_rate(48000.0).unwrap();
    let mut b = FmVoice::with_sample_rate(48000.0).unwrap();
    a.set_note("C4").unwrap();
    b.set_note("C4").unwrap();
    a.release().unwrap();

    assert_eq!(a.state(), VoiceState::Released);
    assert_eq!(b.state(), VoiceState::Active);
    assert!(b.render(128).unwrap().iter().any(|&s| s != 0.0));
}
