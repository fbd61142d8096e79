//! Output device enumeration via cpal.

use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

use crate::Result;

/// Fallback when a device does not report a default config.
const FALLBACK_SAMPLE_RATE: u32 = 48000;

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub default_channels: u16,
    /// Whether this is the host's default output.
    pub is_default: bool,
}

fn describe(device: &Device, default_name: Option<&str>) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    let (default_sample_rate, default_channels) = device
        .default_output_config()
        .map(|c| (c.sample_rate(), c.channels()))
        .unwrap_or((FALLBACK_SAMPLE_RATE, 2));
    Some(AudioDevice {
        is_default: default_name == Some(name.as_str()),
        name,
        default_sample_rate,
        default_channels,
    })
}

/// List output devices on the default host.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let mut devices: Vec<AudioDevice> = Vec::new();
    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Some(info) = describe(&device, default_name.as_deref())
                && !devices.iter().any(|d| d.name == info.name)
            {
                devices.push(info);
            }
        }
    }
    Ok(devices)
}

/// The default output device, if the host has one.
pub fn default_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| {
        let name = device_name(&d).ok();
        describe(&d, name.as_deref())
    }))
}

/// First device whose name contains `query`, case-insensitive.
pub fn find_device_fuzzy<'a>(devices: &'a [AudioDevice], query: &str) -> Option<&'a AudioDevice> {
    let query = query.to_lowercase();
    devices
        .iter()
        .find(|d| d.name.to_lowercase().contains(&query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str) -> AudioDevice {
        AudioDevice {
            name: name.to_string(),
            default_sample_rate: 48000,
            default_channels: 2,
            is_default: false,
        }
    }

    #[test]
    fn fuzzy_match_is_case_insensitive_substring() {
        let devices = vec![device("Built-in Output"), device("USB Audio CODEC")];
        assert_eq!(
            find_device_fuzzy(&devices, "usb").map(|d| d.name.as_str()),
            Some("USB Audio CODEC")
        );
        assert_eq!(
            find_device_fuzzy(&devices, "BUILT").map(|d| d.name.as_str()),
            Some("Built-in Output")
        );
        assert!(find_device_fuzzy(&devices, "hdmi").is_none());
    }

    #[test]
    fn listing_does_not_fail_without_hardware() {
        // Device availability depends on the system.
        assert!(list_devices().is_ok());
        assert!(default_device().is_ok());
    }
}
