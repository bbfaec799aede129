//! Engine controller for the stompbox pedalboard.
//!
//! [`EngineController`] ties the pieces together: it opens the capture and
//! playback streams through an [`AudioBackend`](stompbox_io::AudioBackend),
//! builds the effect chain graph, and exposes live control of pedals, knobs
//! and master volume. Level metering, the tuner, performance figures and the
//! metronome click are driven by [`EngineController::poll`].
//!
//! The host thread owns the controller. The audio threads only see the
//! compiled renderer and the capture queue.
//!
//! # Example
//!
//! ```rust
//! use stompbox_config::{EngineConfig, get_factory_preset};
//! use stompbox_engine::{ConnectionState, EngineController};
//! use stompbox_io::MockBackend;
//!
//! let backend = MockBackend::new();
//! let mut engine = EngineController::new(Box::new(backend.clone()), EngineConfig::default());
//!
//! engine.connect().unwrap();
//! assert_eq!(engine.state(), ConnectionState::Connected);
//!
//! engine.apply_preset(&get_factory_preset("blues").unwrap());
//! let out = backend.pump(&[0.1; 128], 128);
//! assert_eq!(out.len(), 256);
//! ```

mod board;
mod controller;
mod error;
mod metronome;
mod scheduler;
mod snapshot;

pub use controller::EngineController;
pub use error::{EngineError, Result};
pub use metronome::{BEATS_PER_BAR, DEFAULT_BPM, MAX_BPM, MIN_BPM, MetronomeState, clamp_bpm};
pub use scheduler::{Scheduler, TaskHandle};
pub use snapshot::{ConnectionState, EngineSnapshot, PerformanceStats};
