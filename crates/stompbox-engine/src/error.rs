//! Engine error type.

use stompbox_core::graph::GraphError;
use stompbox_effects::UnknownParam;
use thiserror::Error;

/// Errors reported by the engine controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Capture access was refused by the platform or the user.
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),

    /// No usable audio device.
    #[error("audio device not found: {0}")]
    DeviceNotFound(String),

    /// The device is held by another application.
    #[error("audio device busy: {0}")]
    DeviceBusy(String),

    /// A node-level operation was attempted while disconnected.
    #[error("audio graph not ready")]
    GraphNotReady,

    /// An `(effect, field)` pair that names no knob.
    #[error(transparent)]
    UnknownParam(#[from] UnknownParam),

    /// Building or compiling the audio graph failed.
    #[error("audio graph error: {0}")]
    Graph(#[from] GraphError),

    /// Any other backend failure.
    #[error("audio backend error: {0}")]
    Backend(String),
}

impl EngineError {
    /// Short message fit for the player.
    ///
    /// ```rust
    /// use stompbox_engine::EngineError;
    ///
    /// let err = EngineError::DeviceBusy("EBUSY".into());
    /// assert_eq!(err.user_message(), "Audio device is in use by another application.");
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            EngineError::PermissionDenied(_) => {
                "Microphone permission denied. Enable audio input access in your system settings."
                    .to_string()
            }
            EngineError::DeviceNotFound(_) => "No audio device found.".to_string(),
            EngineError::DeviceBusy(_) => {
                "Audio device is in use by another application.".to_string()
            }
            EngineError::GraphNotReady => "Audio engine is not connected.".to_string(),
            EngineError::UnknownParam(e) => e.to_string(),
            EngineError::Graph(e) => format!("Could not build the effect chain: {e}."),
            EngineError::Backend(msg) => format!("Audio connection error: {msg}"),
        }
    }
}

impl From<stompbox_io::Error> for EngineError {
    fn from(err: stompbox_io::Error) -> Self {
        match err {
            stompbox_io::Error::PermissionDenied(msg) => EngineError::PermissionDenied(msg),
            stompbox_io::Error::NoDevice => {
                EngineError::DeviceNotFound("no audio device available".to_string())
            }
            stompbox_io::Error::DeviceNotFound(msg) => EngineError::DeviceNotFound(msg),
            stompbox_io::Error::DeviceBusy(msg) => EngineError::DeviceBusy(msg),
            stompbox_io::Error::Stream(msg) => EngineError::Backend(msg),
        }
    }
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
