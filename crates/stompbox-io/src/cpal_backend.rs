//! cpal-based audio backend.
//!
//! [`CpalBackend`] wraps a cpal [`Host`] (ALSA on Linux, CoreAudio on macOS,
//! WASAPI on Windows). cpal reports failures as backend-specific text; they
//! are sorted into the crate's error kinds so the engine can tell a refused
//! microphone from a busy or missing device.
//!
//! ```rust,ignore
//! use stompbox_io::{AudioBackend, BackendStreamConfig, CpalBackend};
//!
//! let backend = CpalBackend::new();
//! let stream = backend.build_output_stream(
//!     &BackendStreamConfig::default(),
//!     Box::new(|buffer: &mut [f32]| buffer.fill(0.0)),
//!     Box::new(|err| eprintln!("Audio error: {err}")),
//! )?;
//! // plays until `stream` is dropped
//! ```

use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, InputCallback, OutputCallback, StreamHandle,
};
use crate::device::{device_name, host_defaults, list_host_devices};
use crate::{AudioDevice, Error, Result};

/// Sorts a backend failure message into an error kind.
///
/// Host APIs word these differently (`EACCES`, "Permission denied",
/// `AUDCLNT_E_DEVICE_IN_USE`, "Device or resource busy"), so matching is on
/// lowercase substrings.
pub fn classify_message(message: &str) -> Error {
    let lower = message.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["permission", "not permitted", "access denied", "eacces", "unauthori"]) {
        Error::PermissionDenied(message.to_string())
    } else if has(&["busy", "in use", "in_use", "exclusive"]) {
        Error::DeviceBusy(message.to_string())
    } else if has(&["not available", "no such device", "not found", "disconnected"]) {
        Error::DeviceNotFound(message.to_string())
    } else {
        Error::Stream(message.to_string())
    }
}

fn classify_build_error(err: &cpal::BuildStreamError) -> Error {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => Error::DeviceNotFound(err.to_string()),
        _ => classify_message(&err.to_string()),
    }
}

/// cpal-based audio backend.
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Create a backend on the platform's default audio host.
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self { host }
    }

    fn find_device(&self, name: Option<&str>, input: bool) -> Result<cpal::Device> {
        let direction = if input { "input" } else { "output" };
        let Some(search) = name else {
            let device = if input {
                self.host.default_input_device()
            } else {
                self.host.default_output_device()
            };
            return device.ok_or(Error::NoDevice);
        };

        let search_lower = search.to_lowercase();
        let devices = if input {
            self.host.input_devices()
        } else {
            self.host.output_devices()
        }
        .map_err(|e| classify_message(&e.to_string()))?;

        for device in devices {
            if let Ok(dev_name) = device_name(&device)
                && dev_name.to_lowercase().contains(&search_lower)
            {
                return Ok(device);
            }
        }
        Err(Error::DeviceNotFound(format!(
            "no {direction} device matching '{search}'"
        )))
    }

    fn stream_config(config: &BackendStreamConfig) -> cpal::StreamConfig {
        cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for CpalBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CpalBackend")
            .field("host", &self.host.id().name())
            .finish()
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        Ok(list_host_devices(&self.host))
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        Ok(host_defaults(&self.host).1)
    }

    fn default_input_device(&self) -> Result<Option<AudioDevice>> {
        Ok(host_defaults(&self.host).0)
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: OutputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.find_device(config.device_name.as_deref(), false)?;

        let stream = device
            .build_output_stream(
                &Self::stream_config(config),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| classify_build_error(&e))?;

        stream
            .play()
            .map_err(|e| classify_message(&e.to_string()))?;
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }

    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: InputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.find_device(config.device_name.as_deref(), true)?;

        let stream = device
            .build_input_stream(
                &Self::stream_config(config),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    callback(data);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| classify_build_error(&e))?;

        stream
            .play()
            .map_err(|e| classify_message(&e.to_string()))?;
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            "input stream started"
        );

        Ok(StreamHandle::new(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpal_backend_name() {
        let backend = CpalBackend::new();
        assert_eq!(backend.name(), "cpal");
    }

    #[test]
    fn test_cpal_backend_list_devices() {
        let backend = CpalBackend::new();
        // device availability depends on the system; this must not panic
        assert!(backend.list_devices().is_ok());
    }

    #[test]
    fn classifies_permission_failures() {
        for msg in [
            "A backend-specific error has occurred: Permission denied (os error 13)",
            "EACCES",
            "Access denied by the system",
        ] {
            assert!(matches!(classify_message(msg), Error::PermissionDenied(_)), "{msg}");
        }
    }

    #[test]
    fn classifies_busy_and_missing_devices() {
        assert!(matches!(
            classify_message("ALSA function 'snd_pcm_open' failed: Device or resource busy"),
            Error::DeviceBusy(_)
        ));
        assert!(matches!(
            classify_message("AUDCLNT_E_DEVICE_IN_USE"),
            Error::DeviceBusy(_)
        ));
        assert!(matches!(
            classify_message("The requested device is no longer available"),
            Error::DeviceNotFound(_)
        ));
        assert!(matches!(
            classify_message("sample format not supported"),
            Error::Stream(_)
        ));
    }
}
