//! Configuration and preset management for the stompbox pedalboard.
//!
//! # Features
//!
//! - **Engine config**: [`EngineConfig`], TOML on disk with validated values
//! - **Presets**: [`Preset`], a pedal state plus knob values, TOML or JSON
//! - **Preset storage**: [`PresetStore`] with in-memory and file backends,
//!   one active preset per user
//! - **Factory presets**: built-in boards that need no files
//! - **Paths**: platform-specific config and preset directories
//!
//! # Example
//!
//! ```rust
//! use stompbox_config::{MemoryPresetStore, PresetStore, get_factory_preset};
//!
//! let blues = get_factory_preset("blues").unwrap();
//! assert!(blues.pedal_state.drive);
//!
//! let mut store = MemoryPresetStore::new();
//! let saved = store
//!     .save("player-1", "My Blues", &blues.pedal_state, &blues.params)
//!     .unwrap();
//! store.activate(&saved.id).unwrap();
//! assert_eq!(store.active("player-1").unwrap(), Some(saved));
//! ```

mod engine_config;
mod error;
mod preset;
mod store;

/// Platform-specific paths for configuration and presets.
pub mod paths;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use engine_config::{EngineConfig, TunerSettings};
pub use error::{ConfigError, Result};
pub use factory_presets::{
    FACTORY_PRESET_IDS, factory_presets, get_factory_preset, is_factory_preset,
};
pub use preset::{Preset, PresetCategory, validate_params};
pub use store::{FilePresetStore, MemoryPresetStore, PresetStore};
