//! CLI command implementations.

pub mod common;
pub mod config;
pub mod devices;
pub mod live;
pub mod pedals;
pub mod presets;
