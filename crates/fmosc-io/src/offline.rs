//! Pull-driven backend for rendering without audio hardware.
//!
//! [`OfflineBackend`] stores the output callback instead of handing it to a
//! device. The caller drives it with [`OfflineBackend::pull`], one buffer at
//! a time, which is how the CLI renders to WAV and how playback is tested.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::{AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle};
use crate::{AudioDevice, Error, Result};

type Slot = Arc<Mutex<Option<OutputCallback>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<OutputCallback>> {
    // A panic inside a callback leaves the slot usable.
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Backend whose stream advances only when pulled.
///
/// At most one stream is attached at a time. Dropping the returned
/// [`StreamHandle`] detaches the callback and drops it.
#[derive(Clone, Default)]
pub struct OfflineBackend {
    slot: Slot,
    sample_rate: Option<u32>,
}

/// Clears the slot when the stream handle is dropped.
struct Attached {
    slot: Slot,
}

impl Drop for Attached {
    fn drop(&mut self) {
        lock(&self.slot).take();
    }
}

impl OfflineBackend {
    /// Create a backend with no stream attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that reports `sample_rate` as its actual rate,
    /// regardless of what a stream requests.
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            slot: Slot::default(),
            sample_rate: Some(sample_rate),
        }
    }

    /// Run the attached callback once over `buffer`.
    ///
    /// Returns `false` and leaves `buffer` silent when no stream is attached.
    pub fn pull(&self, buffer: &mut [f32]) -> bool {
        match lock(&self.slot).as_mut() {
            Some(callback) => {
                callback(buffer);
                true
            }
            None => {
                buffer.fill(0.0);
                false
            }
        }
    }

    /// Whether a stream is currently attached.
    pub fn is_attached(&self) -> bool {
        lock(&self.slot).is_some()
    }
}

impl std::fmt::Debug for OfflineBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineBackend")
            .field("attached", &self.is_attached())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

impl AudioBackend for OfflineBackend {
    fn name(&self) -> &str {
        "offline"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        Ok(vec![AudioDevice {
            name: "offline".to_string(),
            default_sample_rate: self.sample_rate.unwrap_or(48000),
            default_channels: 2,
            is_default: true,
        }])
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        Ok(self.list_devices()?.into_iter().next())
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        _error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        if let Some(name) = config.device_name.as_deref()
            && !"offline".contains(name.to_lowercase().as_str())
        {
            return Err(Error::DeviceNotFound(format!(
                "no output device matching '{name}'"
            )));
        }

        let mut slot = lock(&self.slot);
        if slot.is_some() {
            return Err(Error::Stream(
                "offline backend already has a stream attached".to_string(),
            ));
        }
        *slot = Some(callback);
        drop(slot);

        tracing::debug!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            "offline stream attached"
        );
        Ok(StreamHandle::new(Attached {
            slot: Arc::clone(&self.slot),
        }))
    }

    fn actual_sample_rate(&self, config: &BackendStreamConfig) -> u32 {
        self.sample_rate.unwrap_or(config.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_callback() -> OutputCallback {
        let mut n = 0.0f32;
        Box::new(move |buf: &mut [f32]| {
            for s in buf.iter_mut() {
                n += 1.0;
                *s = n;
            }
        })
    }

    #[test]
    fn pull_without_stream_is_silent() {
        let backend = OfflineBackend::new();
        let mut buf = [1.0f32; 8];
        assert!(!backend.pull(&mut buf));
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn pull_runs_attached_callback_in_order() {
        let backend = OfflineBackend::new();
        let config = BackendStreamConfig::default();
        let _stream = backend
            .build_output_stream(&config, counter_callback(), Box::new(|_| {}))
            .unwrap();

        let mut buf = [0.0f32; 4];
        assert!(backend.pull(&mut buf));
        assert_eq!(buf, [1.0, 2.0, 3.0, 4.0]);
        assert!(backend.pull(&mut buf));
        assert_eq!(buf, [5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn dropping_handle_detaches() {
        let backend = OfflineBackend::new();
        let stream = backend
            .build_output_stream(
                &BackendStreamConfig::default(),
                counter_callback(),
                Box::new(|_| {}),
            )
            .unwrap();
        assert!(backend.is_attached());
        drop(stream);
        assert!(!backend.is_attached());
    }

    #[test]
    fn second_stream_is_rejected_until_first_dropped() {
        let backend = OfflineBackend::new();
        let config = BackendStreamConfig::default();
        let first = backend
            .build_output_stream(&config, counter_callback(), Box::new(|_| {}))
            .unwrap();
        assert!(matches!(
            backend.build_output_stream(&config, counter_callback(), Box::new(|_| {})),
            Err(Error::Stream(_))
        ));
        drop(first);
        assert!(
            backend
                .build_output_stream(&config, counter_callback(), Box::new(|_| {}))
                .is_ok()
        );
    }

    #[test]
    fn unknown_device_name_is_rejected() {
        let backend = OfflineBackend::new();
        let config = BackendStreamConfig {
            device_name: Some("speakers".to_string()),
            ..BackendStreamConfig::default()
        };
        assert!(matches!(
            backend.build_output_stream(&config, counter_callback(), Box::new(|_| {})),
            Err(Error::DeviceNotFound(_))
        ));
    }

    #[test]
    fn reported_sample_rate() {
        let config = BackendStreamConfig::default();
        assert_eq!(OfflineBackend::new().actual_sample_rate(&config), 48000);
        assert_eq!(
            OfflineBackend::with_sample_rate(44100).actual_sample_rate(&config),
            44100
        );
        let devices = OfflineBackend::new().list_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert!(devices[0].is_default);
    }
}
