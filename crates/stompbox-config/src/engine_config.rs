//! Engine configuration file.
//!
//! ```toml
//! sample_rate = 44100
//! buffer_size = 128
//! output_channels = 2
//! input_device = "Scarlett"
//!
//! meter_interval_ms = 80
//! tuner_interval_ms = 50
//! tuner_hold_ms = 1000
//!
//! [tuner]
//! clarity_threshold = 0.5
//! smoothing = 0.8
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::paths;

/// Lowest pitch the tuner accepts. Its period has to fit in half the tuner
/// buffer.
const TUNER_FLOOR_HZ: u32 = 50;

/// Pitch detector settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerSettings {
    /// RMS below which the input counts as silence.
    pub noise_floor: f32,
    /// YIN absolute threshold on the normalised difference.
    pub yin_threshold: f32,
    /// Readings below this clarity are discarded.
    pub clarity_threshold: f32,
    /// Exponential smoothing weight of the previous reading.
    pub smoothing: f32,
}

impl Default for TunerSettings {
    fn default() -> Self {
        Self {
            noise_floor: 0.01,
            yin_threshold: 0.1,
            clarity_threshold: 0.5,
            smoothing: 0.8,
        }
    }
}

/// Audio engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Requested device sample rate in Hz.
    pub sample_rate: u32,
    /// Device buffer size in frames.
    pub buffer_size: u32,
    /// Output channel count; the mono signal is copied to each.
    pub output_channels: u16,
    /// Input device name filter; `None` uses the system default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_device: Option<String>,
    /// Output device name filter; `None` uses the system default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
    /// Capacity of the input-to-render queue, in device buffers.
    pub input_queue_blocks: usize,
    /// Input level refresh period.
    pub meter_interval_ms: u64,
    /// Samples read per level measurement.
    pub meter_window: usize,
    /// Tuner refresh period.
    pub tuner_interval_ms: u64,
    /// Samples analysed per tuner reading.
    pub tuner_buffer_size: usize,
    /// How long the last good tuner reading stays on screen.
    pub tuner_hold_ms: u64,
    /// Performance statistics refresh period.
    pub perf_interval_ms: u64,
    /// Pitch detector settings.
    pub tuner: TunerSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 128,
            output_channels: 2,
            input_device: None,
            output_device: None,
            input_queue_blocks: 8,
            meter_interval_ms: 80,
            meter_window: 128,
            tuner_interval_ms: 50,
            tuner_buffer_size: 4096,
            tuner_hold_ms: 1000,
            perf_interval_ms: 3000,
            tuner: TunerSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    /// Load the user config file, or the defaults when there is none.
    pub fn load_or_default() -> Result<Self> {
        let path = paths::engine_config_path();
        if path.is_file() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no engine config, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate and write to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let bad = |param: &str, reason: String| {
            Err(ConfigError::invalid("engine config", param, reason))
        };

        if !(8000..=192_000).contains(&self.sample_rate) {
            return bad(
                "sample_rate",
                format!("{} Hz outside 8000..=192000", self.sample_rate),
            );
        }
        if self.buffer_size == 0 || self.buffer_size > 8192 {
            return bad(
                "buffer_size",
                format!("{} frames outside 1..=8192", self.buffer_size),
            );
        }
        if self.output_channels == 0 {
            return bad("output_channels", "must be at least 1".to_string());
        }
        if self.input_queue_blocks == 0 {
            return bad("input_queue_blocks", "must be at least 1".to_string());
        }
        for (name, ms) in [
            ("meter_interval_ms", self.meter_interval_ms),
            ("tuner_interval_ms", self.tuner_interval_ms),
            ("perf_interval_ms", self.perf_interval_ms),
        ] {
            if ms == 0 {
                return bad(name, "interval must be non-zero".to_string());
            }
        }
        if self.meter_window == 0 {
            return bad("meter_window", "must be at least 1 sample".to_string());
        }
        let min_tuner = self.min_tuner_buffer_size();
        if self.tuner_buffer_size < min_tuner {
            return bad(
                "tuner_buffer_size",
                format!(
                    "{} samples is too short for {TUNER_FLOOR_HZ} Hz at {} Hz (need {min_tuner})",
                    self.tuner_buffer_size, self.sample_rate
                ),
            );
        }

        let t = &self.tuner;
        if !t.noise_floor.is_finite() || t.noise_floor < 0.0 {
            return bad("tuner.noise_floor", format!("{} is negative", t.noise_floor));
        }
        if !(t.yin_threshold > 0.0 && t.yin_threshold < 1.0) {
            return bad(
                "tuner.yin_threshold",
                format!("{} outside (0, 1)", t.yin_threshold),
            );
        }
        if !(0.0..=1.0).contains(&t.clarity_threshold) {
            return bad(
                "tuner.clarity_threshold",
                format!("{} outside 0..=1", t.clarity_threshold),
            );
        }
        if !(0.0..1.0).contains(&t.smoothing) {
            return bad("tuner.smoothing", format!("{} outside 0..1", t.smoothing));
        }
        Ok(())
    }

    /// Shortest tuner buffer that holds two periods of the lowest accepted
    /// pitch at this sample rate.
    pub fn min_tuner_buffer_size(&self) -> usize {
        (2 * self.sample_rate).div_ceil(TUNER_FLOOR_HZ) as usize
    }

    /// Level meter period.
    pub fn meter_interval(&self) -> Duration {
        Duration::from_millis(self.meter_interval_ms)
    }

    /// Tuner period.
    pub fn tuner_interval(&self) -> Duration {
        Duration::from_millis(self.tuner_interval_ms)
    }

    /// Tuner hold time.
    pub fn tuner_hold(&self) -> Duration {
        Duration::from_millis(self.tuner_hold_ms)
    }

    /// Performance statistics period.
    pub fn perf_interval(&self) -> Duration {
        Duration::from_millis(self.perf_interval_ms)
    }

    /// Latency of one device buffer in milliseconds.
    pub fn buffer_latency_ms(&self) -> f32 {
        self.buffer_size as f32 * 1000.0 / self.sample_rate as f32
    }
}
