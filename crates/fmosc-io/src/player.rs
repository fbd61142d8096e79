//! Voice playback on an [`AudioBackend`].

use fmosc_core::{FmVoice, VoiceController};

use crate::backend::{AudioBackend, BackendStreamConfig, StreamHandle};
use crate::{Error, Result};

/// A voice rendering on a backend stream.
///
/// The render half lives inside the stream's output callback. The control
/// half stays here and may be cloned to other threads. Dropping the player
/// stops the stream, which drops the render half and releases the voice.
#[derive(Debug)]
pub struct VoicePlayer {
    stream: StreamHandle,
    controller: VoiceController,
}

impl VoicePlayer {
    /// Start `voice` on `backend`.
    ///
    /// The voice must have been built for the rate the backend will actually
    /// run `config` at; a mismatch would shift every pitch, so it is rejected.
    pub fn start(
        backend: &dyn AudioBackend,
        config: &BackendStreamConfig,
        voice: FmVoice,
    ) -> Result<Self> {
        let device_rate = backend.actual_sample_rate(config);
        if (voice.sample_rate() - device_rate as f32).abs() > f32::EPSILON {
            return Err(Error::Stream(format!(
                "voice renders at {} Hz but {} runs at {device_rate} Hz",
                voice.sample_rate(),
                backend.name()
            )));
        }

        let (controller, mut render) = voice.into_render_callback(usize::from(config.channels));
        let stream = backend.build_output_stream(
            config,
            Box::new(move |buffer: &mut [f32]| render.process(buffer)),
            Box::new(|err: &str| tracing::warn!(error = err, "audio stream error")),
        )?;

        tracing::info!(
            backend = backend.name(),
            sample_rate = device_rate,
            channels = config.channels,
            "voice playback started"
        );
        Ok(Self { stream, controller })
    }

    /// Control handle for the playing voice.
    pub fn controller(&self) -> &VoiceController {
        &self.controller
    }

    /// Release the voice and close the stream.
    ///
    /// Fails with [`Error::Voice`] if the voice was already released through
    /// a controller; the stream is closed either way.
    pub fn stop(self) -> Result<()> {
        let Self { stream, controller } = self;
        let released = controller.release();
        drop(stream);
        tracing::info!("voice playback stopped");
        released.map_err(Error::from)
    }
}
