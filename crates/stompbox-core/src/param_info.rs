//! Parameter metadata for discoverable pedal controls.
//!
//! Each live-adjustable value in the pedalboard is described by a
//! [`ParamDescriptor`]: display name, unit, valid range, default and a
//! recommended step for knob-style control. The descriptor is the single place
//! where a value coming from outside (a command line, a stored preset) is
//! clamped before it reaches the audio graph.
//!
//! # Example
//!
//! ```rust
//! use stompbox_core::{ParamDescriptor, ParamUnit};
//!
//! let ratio = ParamDescriptor::new("Ratio", ParamUnit::Ratio, 1.0, 20.0, 4.0).with_step(0.5);
//! assert_eq!(ratio.clamp(50.0), 20.0);
//! assert_eq!(format!("{}{}", ratio.default, ratio.unit.suffix()), "4:1");
//! ```

/// Describes one adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display (e.g., "Delay Time").
    pub name: &'static str,

    /// Unit type for formatting the parameter value.
    pub unit: ParamUnit,

    /// Minimum allowed value for this parameter.
    pub min: f32,

    /// Maximum allowed value for this parameter.
    pub max: f32,

    /// Value used when nothing else is known.
    pub default: f32,

    /// Recommended step increment for encoder-based control.
    pub step: f32,
}

impl ParamDescriptor {
    /// Creates a descriptor with a step of 1% of the range.
    pub const fn new(name: &'static str, unit: ParamUnit, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            unit,
            min,
            max,
            default,
            step: (max - min) / 100.0,
        }
    }

    /// Unitless 0..1 control, the most common knob on the board.
    pub const fn unit_interval(name: &'static str, default: f32) -> Self {
        Self::new(name, ParamUnit::None, 0.0, 1.0, default)
    }

    /// Overrides the recommended step.
    #[must_use]
    pub const fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Clamps a value to the valid range.
    ///
    /// Non-finite input falls back to the default.
    ///
    /// ```rust
    /// use stompbox_core::ParamDescriptor;
    ///
    /// let mix = ParamDescriptor::unit_interval("Mix", 0.5);
    /// assert_eq!(mix.clamp(-1.0), 0.0);
    /// assert_eq!(mix.clamp(f32::NAN), 0.5);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if !value.is_finite() {
            self.default
        } else if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// True if `value` lies inside `[min, max]`.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB) - threshold and level parameters.
    Decibels,

    /// Hertz (Hz) - modulation rates.
    Hertz,

    /// Seconds - delay time, attack and release.
    Seconds,

    /// Ratio (n:1) - compressor ratio.
    Ratio,

    /// Filter quality factor.
    Q,

    /// No unit - normalised 0..1 knobs.
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// ```rust
    /// use stompbox_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Decibels.suffix(), " dB");
    /// assert_eq!(ParamUnit::Seconds.suffix(), " s");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Seconds => " s",
            ParamUnit::Ratio => ":1",
            ParamUnit::Q => " Q",
            ParamUnit::None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_step_is_one_percent() {
        let d = ParamDescriptor::new("Threshold", ParamUnit::Decibels, -60.0, 0.0, -20.0);
        assert!((d.step - 0.6).abs() < 1e-6);
    }

    #[test]
    fn clamp_limits_both_ends() {
        let d = ParamDescriptor::new("Q", ParamUnit::Q, 1.0, 30.0, 10.0);
        assert_eq!(d.clamp(0.0), 1.0);
        assert_eq!(d.clamp(31.0), 30.0);
        assert_eq!(d.clamp(12.5), 12.5);
        assert_eq!(d.clamp(f32::INFINITY), 10.0);
    }

    #[test]
    fn contains_is_inclusive() {
        let d = ParamDescriptor::unit_interval("Depth", 0.5);
        assert!(d.contains(0.0));
        assert!(d.contains(1.0));
        assert!(!d.contains(1.01));
    }
}
