//! Stompbox Core - DSP primitives and the audio graph host
//!
//! This crate provides the building blocks the pedalboard is assembled from,
//! designed for real-time processing with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Audio Graph
//!
//! - [`graph::AudioGraph`] - node-graph builder (gain, biquad, delay,
//!   oscillator, compressor, wave-shaper, analyser)
//! - [`graph::GraphRenderer`] - compiled, allocation-free renderer
//! - [`graph::AudioParam`] - automatable, modulatable node parameter
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothedParam`] - Exponential smoothing that settles exactly
//! - [`ParamDescriptor`] - Range, default and unit of a control
//!
//! ## Signal Processing
//!
//! - [`Biquad`] - Second-order IIR filter with RBJ cookbook coefficients
//! - [`DelayLine`] - Circular buffer with fractional reads
//! - [`SineOscillator`] - Modulation source
//! - [`EnvelopeFollower`] / [`Compressor`] - Dynamics
//!
//! ## Utilities
//!
//! - [`db_to_linear`], [`linear_to_db`], [`rms`], [`flush_denormal`]
//!
//! # Example
//!
//! ```rust
//! use stompbox_core::FilterKind;
//! use stompbox_core::graph::AudioGraph;
//!
//! let mut graph = AudioGraph::new(48000.0);
//! let tone = graph.create_biquad(FilterKind::Lowpass, 3000.0, 0.707);
//! graph.connect(graph.source(), tone.id()).unwrap();
//! graph.connect(tone.id(), graph.destination()).unwrap();
//!
//! let mut renderer = graph.compile().unwrap();
//! let input = [0.5_f32; 256];
//! let mut output = [0.0_f32; 256];
//! renderer.render(&input, &mut output);
//! assert!(output.iter().all(|s| s.is_finite()));
//! ```

pub mod biquad;
pub mod delay;
pub mod dynamics;
pub mod envelope;
pub mod graph;
pub mod math;
pub mod oscillator;
pub mod param;
pub mod param_info;

pub use biquad::{
    Biquad, FilterKind, bandpass_coefficients, highpass_coefficients, lowpass_coefficients,
};
pub use delay::DelayLine;
pub use dynamics::{Compressor, CompressorSettings, gain_reduction_db};
pub use envelope::EnvelopeFollower;
pub use math::{db_to_linear, flush_denormal, lerp, linear_to_db, rms};
pub use oscillator::SineOscillator;
pub use param::{SETTLE_EPSILON, SmoothedParam};
pub use param_info::{ParamDescriptor, ParamUnit};
