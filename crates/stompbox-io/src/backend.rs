//! Pluggable audio backend abstraction.
//!
//! [`AudioBackend`] decouples the pedalboard engine from the platform audio
//! API. Two implementations ship with this crate:
//!
//! - [`CpalBackend`](crate::CpalBackend) - ALSA, CoreAudio, WASAPI via cpal
//! - [`MockBackend`](crate::MockBackend) - deterministic, driven by tests
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │        Engine controller         │
//! └──────────────┬───────────────────┘
//!                │ Box<dyn AudioBackend>
//!                ▼
//! ┌──────────────────────────────────┐
//! │        AudioBackend trait        │
//! │ permission / devices / streams   │
//! └──────────────┬───────────────────┘
//!        ┌───────┴────────┐
//!        ▼                ▼
//! ┌─────────────┐  ┌─────────────┐
//! │ CpalBackend │  │ MockBackend │
//! └─────────────┘  └─────────────┘
//! ```
//!
//! Callbacks are boxed closures so the trait stays object safe. Streams come
//! back as [`StreamHandle`]s that stop the stream when dropped, which is how
//! the engine releases devices on disconnect.

use crate::{AudioDevice, Result};

/// Configuration for building an audio stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Device name filter; `None` uses the system default.
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 128,
            channels: 2,
            device_name: None,
        }
    }
}

/// Whether the platform lets us open the capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// Access granted.
    Granted,
    /// Access refused; opening the input will fail.
    Denied,
    /// The platform will ask the user when the input is opened.
    Prompt,
    /// The backend cannot tell.
    #[default]
    Unknown,
}

impl PermissionState {
    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
            PermissionState::Prompt => "prompt",
            PermissionState::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-erased audio stream handle.
///
/// The stream runs while this handle exists; dropping it stops the stream
/// and releases the device.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wraps a backend-specific stream object.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Audio output callback.
///
/// Runs on the real-time thread and fills an interleaved buffer of
/// `frames * channels` samples. Must not allocate, lock or block.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Audio input callback.
///
/// Runs on the real-time thread with captured interleaved samples.
pub type InputCallback = Box<dyn FnMut(&[f32]) + Send>;

/// Called with a human-readable message when a running stream fails.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Pluggable audio backend.
///
/// Object safe: the engine holds a `Box<dyn AudioBackend>` and never sees a
/// platform type.
pub trait AudioBackend: Send {
    /// Human-readable name of this backend (e.g. "cpal", "mock").
    fn name(&self) -> &str;

    /// List all available audio devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// Get the default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Get the default input device, if any.
    fn default_input_device(&self) -> Result<Option<AudioDevice>>;

    /// Build and start an output stream.
    ///
    /// The returned [`StreamHandle`] keeps the stream alive.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// Build and start an input stream.
    ///
    /// The returned [`StreamHandle`] keeps the stream alive.
    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        callback: InputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// Sample rate the backend will actually run `config` at.
    ///
    /// Defaults to the requested rate.
    fn actual_sample_rate(&self, config: &BackendStreamConfig) -> u32 {
        config.sample_rate
    }

    /// Capture permission as far as the backend can tell.
    ///
    /// Defaults to [`PermissionState::Unknown`].
    fn permission_state(&self) -> PermissionState {
        PermissionState::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_low_latency_stereo() {
        let config = BackendStreamConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.buffer_size, 128);
        assert_eq!(config.channels, 2);
        assert!(config.device_name.is_none());
    }

    #[test]
    fn stream_handle_debug() {
        let handle = StreamHandle::new(42u32);
        assert!(format!("{handle:?}").contains("StreamHandle"));
    }

    #[test]
    fn permission_labels() {
        assert_eq!(PermissionState::default(), PermissionState::Unknown);
        assert_eq!(PermissionState::Denied.to_string(), "denied");
    }
}
