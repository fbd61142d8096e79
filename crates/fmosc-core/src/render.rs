//! Host-facing render callback.
//!
//! Audio hosts pull interleaved buffers of `frames * channels` samples at
//! their own cadence. [`RenderCallback`] renders the voice in mono into a
//! preallocated scratch block and copies each sample to every channel.
//!
//! `process` never fails and never allocates. Buffers longer than
//! [`MAX_BLOCK_SIZE`] frames are rendered in chunks; parameter targets are
//! picked up at the start of each chunk.

use alloc::vec;
use alloc::vec::Vec;

use crate::MAX_BLOCK_SIZE;
use crate::voice::VoiceEngine;

/// Render side of an [`FmVoice`](crate::voice::FmVoice), ready for an audio
/// thread.
///
/// Dropping the callback releases the voice.
///
/// ```rust
/// use fmosc_core::voice::FmVoice;
///
/// let voice = FmVoice::with_sample_rate(44100.0).unwrap();
/// let (controller, mut callback) = voice.into_render_callback(2);
/// controller.set_note("A4").unwrap();
///
/// let mut buffer = [0.0_f32; 512];
/// callback.process(&mut buffer);
/// assert!(buffer.chunks(2).all(|frame| frame[0] == frame[1]));
/// ```
#[derive(Debug)]
pub struct RenderCallback {
    engine: VoiceEngine,
    channels: usize,
    scratch: Vec<f32>,
}

impl RenderCallback {
    pub(crate) fn new(engine: VoiceEngine, channels: usize) -> Self {
        Self {
            engine,
            channels: channels.max(1),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Output channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Whether the voice has been released. Released callbacks output silence.
    pub fn is_released(&self) -> bool {
        self.engine.is_released()
    }

    /// Fill an interleaved buffer, duplicating the mono signal to every channel.
    ///
    /// A trailing partial frame is zeroed.
    pub fn process(&mut self, interleaved: &mut [f32]) {
        if self.engine.is_released() {
            interleaved.fill(0.0);
            return;
        }

        let channels = self.channels;
        for chunk in interleaved.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let frames = chunk.len() / channels;
            let mono = &mut self.scratch[..frames];
            self.engine.render(mono);

            let mut frame_iter = chunk.chunks_exact_mut(channels);
            for (frame, &sample) in (&mut frame_iter).zip(mono.iter()) {
                frame.fill(sample);
            }
            frame_iter.into_remainder().fill(0.0);
        }
    }

    /// Fill a mono buffer.
    pub fn render_mono(&mut self, out: &mut [f32]) {
        self.engine.render(out);
    }
}
