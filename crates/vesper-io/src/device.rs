//! Output device discovery via cpal.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone)]
pub struct OutputDevice {
    /// Human-readable device name.
    pub name: String,
    /// Channel count of the device's default output configuration.
    pub channels: u16,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Whether this is the host's default output device.
    pub is_default: bool,
}

fn describe(device: &Device, default_name: Option<&str>) -> Option<OutputDevice> {
    let name = device_name(device).ok()?;
    let (channels, default_sample_rate) = device
        .default_output_config()
        .map(|c| (c.channels(), c.sample_rate()))
        .unwrap_or((2, 48000));
    Some(OutputDevice {
        is_default: default_name == Some(name.as_str()),
        name,
        channels,
        default_sample_rate,
    })
}

/// List all output devices on the default host.
pub fn list_devices() -> Result<Vec<OutputDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let mut devices = Vec::new();
    if let Ok(outputs) = host.output_devices() {
        devices.extend(outputs.filter_map(|d| describe(&d, default_name.as_deref())));
    }
    Ok(devices)
}

/// Get the default output device, if the host has one.
pub fn default_output_device() -> Option<OutputDevice> {
    let device = cpal::default_host().default_output_device()?;
    let mut info = describe(&device, None)?;
    info.is_default = true;
    Some(info)
}

/// Find an output device whose name contains `name` (case-insensitive), or
/// the default device when `name` is `None`.
pub(crate) fn find_output_device(host: &Host, name: Option<&str>) -> Result<Device> {
    let Some(search) = name else {
        return host.default_output_device().ok_or(Error::NoDevice);
    };

    let search_lower = search.to_lowercase();
    let devices = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;

    for device in devices {
        if let Ok(dev_name) = device_name(&device)
            && dev_name.to_lowercase().contains(search_lower.as_str())
        {
            return Ok(device);
        }
    }
    Err(Error::DeviceNotFound(format!(
        "no output device matching '{}'",
        search
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices_does_not_panic() {
        // Device availability depends on the system.
        let result = list_devices();
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_device_is_flagged() {
        if let Some(device) = default_output_device() {
            assert!(device.is_default);
            assert!(device.channels > 0);
        }
    }

    #[test]
    fn test_unknown_device_name_is_not_found() {
        let host = cpal::default_host();
        let result = find_output_device(&host, Some("no-such-device-7f3a9c"));
        assert!(matches!(
            result,
            Err(Error::DeviceNotFound(_)) | Err(Error::Stream(_))
        ));
    }
}
