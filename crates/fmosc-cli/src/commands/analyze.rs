//! Spectral peak analysis of rendered audio.

use clap::Args;
use fmosc_io::{read_wav, read_wav_info};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use std::f32::consts::PI;
use std::path::PathBuf;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// FFT size (power of two)
    #[arg(long, default_value = "16384")]
    fft_size: usize,

    /// Show top N peaks
    #[arg(long, default_value = "5")]
    peaks: usize,
}

/// A spectral peak.
#[derive(Debug, Clone, Copy)]
pub struct Peak {
    /// Interpolated frequency in Hz.
    pub frequency: f32,
    /// Level in dB relative to the strongest bin.
    pub level_db: f32,
}

/// Hann-windowed magnitude spectrum of the first `fft_size` samples.
///
/// Short inputs are zero-padded.
pub fn magnitude_spectrum(samples: &[f32], fft_size: usize) -> Vec<f32> {
    let n = samples.len().min(fft_size);
    let mut buffer: Vec<Complex<f32>> = (0..fft_size)
        .map(|i| {
            if i < n {
                let w = 0.5 - 0.5 * (2.0 * PI * i as f32 / n as f32).cos();
                Complex::new(samples[i] * w, 0.0)
            } else {
                Complex::new(0.0, 0.0)
            }
        })
        .collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(fft_size).process(&mut buffer);
    buffer[..fft_size / 2].iter().map(|c| c.norm()).collect()
}

/// Strongest local maxima, loudest first.
///
/// Frequencies are refined by parabolic interpolation over the peak bin.
pub fn find_peaks(magnitudes: &[f32], sample_rate: u32, fft_size: usize, count: usize) -> Vec<Peak> {
    let max = magnitudes.iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return Vec::new();
    }

    let bin_hz = sample_rate as f32 / fft_size as f32;
    let mut peaks: Vec<(usize, f32)> = (1..magnitudes.len().saturating_sub(1))
        .filter(|&i| magnitudes[i] > magnitudes[i - 1] && magnitudes[i] >= magnitudes[i + 1])
        .map(|i| (i, magnitudes[i]))
        .collect();
    peaks.sort_by(|a, b| b.1.total_cmp(&a.1));
    peaks.truncate(count);

    peaks
        .into_iter()
        .map(|(i, mag)| {
            let (a, b, c) = (magnitudes[i - 1], mag, magnitudes[i + 1]);
            let denom = a - 2.0 * b + c;
            let offset = if denom.abs() > f32::EPSILON {
                0.5 * (a - c) / denom
            } else {
                0.0
            };
            Peak {
                frequency: (i as f32 + offset) * bin_hz,
                level_db: 20.0 * (mag / max).log10(),
            }
        })
        .collect()
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.fft_size.is_power_of_two() && args.fft_size >= 64,
        "FFT size must be a power of two >= 64"
    );

    let info = read_wav_info(&args.input)?;
    let (samples, spec) = read_wav(&args.input)?;
    anyhow::ensure!(!samples.is_empty(), "{} has no samples", args.input.display());

    println!("File: {}", args.input.display());
    println!(
        "  {} Hz, {} ch, {}-bit, {:.3}s",
        info.sample_rate, info.channels, info.bits_per_sample, info.duration_secs
    );

    let rms = (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt();
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    println!("  Peak {peak:.3}, RMS {rms:.3}");

    let spectrum = magnitude_spectrum(&samples, args.fft_size);
    let peaks = find_peaks(&spectrum, spec.sample_rate, args.fft_size, args.peaks);

    println!("\nSpectral Peaks:");
    for (i, p) in peaks.iter().enumerate() {
        println!("  {:>2}. {:>10.2} Hz  {:>7.1} dB", i + 1, p.frequency, p.level_db);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn single_tone_peak() {
        let samples = sine(440.0, 48000, 16384);
        let spectrum = magnitude_spectrum(&samples, 16384);
        let peaks = find_peaks(&spectrum, 48000, 16384, 1);
        assert_eq!(peaks.len(), 1);
        assert!((peaks[0].frequency - 440.0).abs() < 1.0, "{:?}", peaks[0]);
        assert!(peaks[0].level_db.abs() < 1e-3);
    }

    #[test]
    fn two_tones_loudest_first() {
        let a = sine(300.0, 48000, 16384);
        let b = sine(1200.0, 48000, 16384);
        let mixed: Vec<f32> = a.iter().zip(&b).map(|(x, y)| 0.8 * x + 0.2 * y).collect();
        let spectrum = magnitude_spectrum(&mixed, 16384);
        let peaks = find_peaks(&spectrum, 48000, 16384, 2);
        assert!((peaks[0].frequency - 300.0).abs() < 1.0);
        assert!((peaks[1].frequency - 1200.0).abs() < 1.0);
        assert!(peaks[1].level_db < -10.0);
    }

    #[test]
    fn silence_has_no_peaks() {
        let spectrum = magnitude_spectrum(&[0.0; 1024], 1024);
        assert!(find_peaks(&spectrum, 48000, 1024, 5).is_empty());
    }
}
