//! Audio device access for the stompbox pedalboard.
//!
//! This crate provides:
//!
//! - **Backend abstraction**: [`AudioBackend`], object safe, with boxed
//!   real-time callbacks and RAII [`StreamHandle`]s
//! - **cpal backend**: [`CpalBackend`] for ALSA, CoreAudio and WASAPI devices
//! - **Mock backend**: [`MockBackend`] for deterministic tests, with audio
//!   pumped by hand and injectable failures
//! - **Device discovery**: [`list_devices`], [`find_device_fuzzy`]
//!
//! ## Quick Start
//!
//! ```rust
//! use stompbox_io::{AudioBackend, BackendStreamConfig, MockBackend};
//!
//! let backend = MockBackend::new();
//! let config = BackendStreamConfig { channels: 1, ..BackendStreamConfig::default() };
//! let _out = backend
//!     .build_output_stream(&config, Box::new(|buf| buf.fill(0.25)), Box::new(|_| {}))
//!     .unwrap();
//!
//! assert_eq!(backend.pump(&[], 4), vec![0.25; 4]);
//! ```

pub mod backend;
pub mod cpal_backend;
mod device;
pub mod mock;

pub use backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, InputCallback, OutputCallback,
    PermissionState, StreamHandle,
};
pub use cpal_backend::CpalBackend;
pub use device::{AudioDevice, default_device, find_device_fuzzy, list_devices};
pub use mock::MockBackend;

/// Error types for audio device access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The platform refused access to the capture device.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The device exists but another client holds it.
    #[error("Device busy: {0}")]
    DeviceBusy(String),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),
}

/// Convenience result type for audio device access.
pub type Result<T> = std::result::Result<T, Error>;
