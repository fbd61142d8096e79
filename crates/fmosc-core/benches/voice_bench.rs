//! Criterion benchmarks for fmosc-core
//!
//! Run with: cargo bench -p fmosc-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fmosc_core::{
    FmVoice, Modulation, Oscillator, Smoothing, VoiceOptions, VoiceParams, Waveform,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn fm_params() -> VoiceParams {
    VoiceParams {
        primary_frequency: 440.0,
        modulation: Modulation::Ratio(1.5),
        fm_amount: 300.0,
        gain: 0.8,
    }
}

fn bench_oscillator_waveforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oscillator");

    let waveforms = [
        ("Sine", Waveform::Sine),
        ("Triangle", Waveform::Triangle),
        ("Saw", Waveform::Saw),
        ("Square", Waveform::Square),
    ];

    for (name, waveform) in &waveforms {
        for &block_size in BLOCK_SIZES {
            let mut osc = Oscillator::new(*waveform);

            group.bench_with_input(
                BenchmarkId::new(*name, block_size),
                &block_size,
                |b, &size| {
                    b.iter(|| {
                        let mut sum = 0.0f32;
                        for _ in 0..size {
                            sum += osc.advance(SAMPLE_RATE, 440.0);
                        }
                        black_box(sum)
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_voice_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("FmVoice");

    for (name, smoothing) in [("Linear", Smoothing::Linear), ("Exponential", Smoothing::Exponential)] {
        for &block_size in BLOCK_SIZES {
            let options = VoiceOptions {
                smoothing,
                ..VoiceOptions::with_sample_rate(SAMPLE_RATE)
            };
            let mut voice = FmVoice::new(fm_params(), options).unwrap();
            let mut buffer = vec![0.0f32; block_size];

            group.bench_with_input(
                BenchmarkId::new(name, block_size),
                &block_size,
                |b, _| {
                    b.iter(|| {
                        voice.render_into(black_box(&mut buffer)).unwrap();
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_voice_with_glide(c: &mut Criterion) {
    let mut group = c.benchmark_group("FmVoice_Glide");

    for &block_size in BLOCK_SIZES {
        let mut voice =
            FmVoice::new(fm_params(), VoiceOptions::with_sample_rate(SAMPLE_RATE)).unwrap();
        let mut buffer = vec![0.0f32; block_size];
        let mut toggle = false;

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    toggle = !toggle;
                    let hz = if toggle { 440.0 } else { 660.0 };
                    voice.set_primary_frequency(hz).unwrap();
                    voice.render_into(black_box(&mut buffer)).unwrap();
                })
            },
        );
    }

    group.finish();
}

fn bench_render_callback(c: &mut Criterion) {
    let mut group = c.benchmark_group("RenderCallback_Stereo");

    for &block_size in BLOCK_SIZES {
        let voice =
            FmVoice::new(fm_params(), VoiceOptions::with_sample_rate(SAMPLE_RATE)).unwrap();
        let (_controller, mut callback) = voice.into_render_callback(2);
        let mut buffer = vec![0.0f32; block_size * 2];

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                b.iter(|| callback.process(black_box(&mut buffer)))
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_oscillator_waveforms,
    bench_voice_render,
    bench_voice_with_glide,
    bench_render_callback,
);
criterion_main!(benches);
