//! Stompbox Effects - pedal stages and the effect chain
//!
//! Every pedal is a small sub-graph built from `stompbox-core` graph nodes and
//! wrapped in a [`BypassMixer`] so it can be switched in and out without
//! clicks or graph rebuilds:
//!
//! - [`CompressorStage`] - dynamics compressor
//! - [`OverdriveStage`] - wave-shaper with tone filter (drive and distortion)
//! - [`ChorusStage`] - LFO-modulated short delay with feedback
//! - [`TremoloStage`] - LFO on an amplitude gain
//! - [`DelayStage`] - feedback delay with wet mix
//! - [`WahStage`] - resonant bandpass
//! - [`ReverbStage`] - four damped feedback delays
//!
//! [`EffectChain`] wires the stages in their fixed order and routes live
//! parameter updates ([`ParamKey`]) to the owning nodes.
//!
//! ## Example
//!
//! ```rust
//! use stompbox_core::graph::AudioGraph;
//! use stompbox_effects::{EffectChain, Pedal, PedalParams, PedalState};
//!
//! let mut graph = AudioGraph::new(44100.0);
//! let (source, sink) = (graph.source(), graph.destination());
//!
//! let mut state = PedalState::default();
//! state.set(Pedal::Drive, true);
//! let mut chain = EffectChain::build(&mut graph, source, sink, &PedalParams::default(), &state)
//!     .unwrap();
//!
//! chain.set_bypass(Pedal::Reverb, false);
//! let mut renderer = graph.compile().unwrap();
//! let mut out = [0.0; 128];
//! renderer.render(&[0.1; 128], &mut out);
//! ```

pub mod bypass;
pub mod chain;
pub mod chorus;
pub mod compressor;
pub mod curve;
pub mod delay;
pub mod overdrive;
pub mod params;
pub mod pedal;
pub mod reverb;
pub mod tremolo;
pub mod wah;

pub use bypass::{BYPASS_TIME_CONSTANT, BypassMixer};
pub use chain::EffectChain;
pub use chorus::ChorusStage;
pub use compressor::CompressorStage;
pub use curve::{CURVE_SAMPLES, CurveCache, curve_key, distortion_curve};
pub use delay::DelayStage;
pub use overdrive::{OverdriveStage, OverdriveVoicing};
pub use params::{
    ChorusParams, CompressorParams, DelayParams, DistortionParams, DriveParams, PARAM_TIME_CONSTANT,
    ParamKey, PedalParams, ReverbParams, TremoloParams, UnknownParam, WahParams,
};
pub use pedal::{CHAIN_ORDER, ParsePedalError, Pedal, PedalState};
pub use reverb::{ReverbStage, reverb_delay_lengths};
pub use tremolo::TremoloStage;
pub use wah::WahStage;
