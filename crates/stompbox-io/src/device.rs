//! Device discovery via cpal.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

use crate::{Error, Result};

/// Fallback when a device does not report a default config.
const FALLBACK_SAMPLE_RATE: u32 = 48000;

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether the device supports audio input.
    pub is_input: bool,
    /// Whether the device supports audio output.
    pub is_output: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

fn input_info(device: &Device) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    Some(AudioDevice {
        name,
        is_input: true,
        is_output: device.default_output_config().is_ok(),
        default_sample_rate: device
            .default_input_config()
            .map(|c| c.sample_rate())
            .unwrap_or(FALLBACK_SAMPLE_RATE),
    })
}

fn output_info(device: &Device) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    Some(AudioDevice {
        name,
        is_input: device.default_input_config().is_ok(),
        is_output: true,
        default_sample_rate: device
            .default_output_config()
            .map(|c| c.sample_rate())
            .unwrap_or(FALLBACK_SAMPLE_RATE),
    })
}

/// Lists the devices of `host`, inputs first, each name once.
pub(crate) fn list_host_devices(host: &Host) -> Vec<AudioDevice> {
    let mut devices: Vec<AudioDevice> = Vec::new();

    if let Ok(inputs) = host.input_devices() {
        devices.extend(inputs.filter_map(|d| input_info(&d)));
    }

    if let Ok(outputs) = host.output_devices() {
        for info in outputs.filter_map(|d| output_info(&d)) {
            if !devices.iter().any(|d| d.name == info.name) {
                devices.push(info);
            }
        }
    }

    devices
}

/// Default input and output of `host`.
pub(crate) fn host_defaults(host: &Host) -> (Option<AudioDevice>, Option<AudioDevice>) {
    let input = host.default_input_device().and_then(|d| input_info(&d));
    let output = host.default_output_device().and_then(|d| output_info(&d));
    (input, output)
}

/// List all audio devices of the default host.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    Ok(list_host_devices(&cpal::default_host()))
}

/// Default input and output devices of the default host.
pub fn default_device() -> Result<(Option<AudioDevice>, Option<AudioDevice>)> {
    Ok(host_defaults(&cpal::default_host()))
}

/// Find a device by partial name match (case-insensitive).
///
/// Returns the first device of the requested direction whose name contains
/// the search string.
///
/// ```rust,ignore
/// use stompbox_io::find_device_fuzzy;
///
/// let interface = find_device_fuzzy("USB", true)?;
/// ```
pub fn find_device_fuzzy(search: &str, is_input: bool) -> Result<AudioDevice> {
    let search_lower = search.to_lowercase();
    list_devices()?
        .into_iter()
        .find(|d| {
            let matches_type = if is_input { d.is_input } else { d.is_output };
            matches_type && d.name.to_lowercase().contains(&search_lower)
        })
        .ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "no {} device matching '{}'",
                if is_input { "input" } else { "output" },
                search
            ))
        })
}
