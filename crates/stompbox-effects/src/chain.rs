//! The pedalboard's effect chain.
//!
//! ```text
//! source ─► compressor ─► drive ─► distortion ─► chorus ─► tremolo ─► delay ─► wah ─► reverb ─► sink
//! ```
//!
//! Every stage sits inside its own [`BypassMixer`]; switching a pedal or
//! turning a knob touches the existing nodes and never rebuilds the graph.

use stompbox_core::graph::{AudioGraph, GraphError, NodeId};

use crate::bypass::BypassMixer;
use crate::chorus::ChorusStage;
use crate::compressor::CompressorStage;
use crate::delay::DelayStage;
use crate::overdrive::{OverdriveStage, OverdriveVoicing};
use crate::params::{ParamKey, PedalParams};
use crate::pedal::{CHAIN_ORDER, Pedal, PedalState};
use crate::reverb::ReverbStage;
use crate::tremolo::TremoloStage;
use crate::wah::WahStage;

/// A stage and the mixer wrapped around it.
#[derive(Debug, Clone)]
pub struct Slot<S> {
    /// Dry/wet crossfader.
    pub mixer: BypassMixer,
    /// The effect's nodes.
    pub stage: S,
}

impl<S> Slot<S> {
    fn build<F>(graph: &mut AudioGraph, engaged: bool, build: F) -> Result<Self, GraphError>
    where
        F: FnOnce(&mut AudioGraph, NodeId, NodeId) -> Result<S, GraphError>,
    {
        let (mut mixer, stage) = BypassMixer::new(graph, build)?;
        if engaged {
            mixer.set_bypass(false);
        }
        Ok(Self { mixer, stage })
    }
}

/// Eight bypassable stages in fixed order.
#[derive(Debug, Clone)]
pub struct EffectChain {
    compressor: Slot<CompressorStage>,
    drive: Slot<OverdriveStage>,
    distortion: Slot<OverdriveStage>,
    chorus: Slot<ChorusStage>,
    tremolo: Slot<TremoloStage>,
    delay: Slot<DelayStage>,
    wah: Slot<WahStage>,
    reverb: Slot<ReverbStage>,
}

impl EffectChain {
    /// Builds every stage, bypassed according to `state`, and connects
    /// `source -> stages -> sink`.
    pub fn build(
        graph: &mut AudioGraph,
        source: NodeId,
        sink: NodeId,
        params: &PedalParams,
        state: &PedalState,
    ) -> Result<Self, GraphError> {
        let compressor = Slot::build(graph, state.compressor, |g, i, o| {
            CompressorStage::build(g, i, o, &params.compressor)
        })?;
        let drive = Slot::build(graph, state.drive, |g, i, o| {
            OverdriveStage::build(
                g,
                i,
                o,
                OverdriveVoicing::DRIVE,
                params.drive.gain,
                params.drive.tone,
            )
        })?;
        let distortion = Slot::build(graph, state.distortion, |g, i, o| {
            OverdriveStage::build(
                g,
                i,
                o,
                OverdriveVoicing::DISTORTION,
                params.distortion.gain,
                params.distortion.tone,
            )
        })?;
        let chorus = Slot::build(graph, state.chorus, |g, i, o| {
            ChorusStage::build(g, i, o, &params.chorus)
        })?;
        let tremolo = Slot::build(graph, state.tremolo, |g, i, o| {
            TremoloStage::build(g, i, o, &params.tremolo)
        })?;
        let delay = Slot::build(graph, state.delay, |g, i, o| {
            DelayStage::build(g, i, o, &params.delay)
        })?;
        let wah = Slot::build(graph, state.wah, |g, i, o| {
            WahStage::build(g, i, o, &params.wah)
        })?;
        let reverb = Slot::build(graph, state.reverb, |g, i, o| {
            ReverbStage::build(g, i, o, &params.reverb)
        })?;

        let chain = Self {
            compressor,
            drive,
            distortion,
            chorus,
            tremolo,
            delay,
            wah,
            reverb,
        };

        let mut prev = source;
        for pedal in CHAIN_ORDER {
            if let Some(mixer) = chain.mixer(pedal) {
                graph.connect(prev, mixer.input())?;
                prev = mixer.output();
            }
        }
        graph.connect(prev, sink)?;

        tracing::debug!(
            nodes = graph.node_count(),
            engaged = state.engaged().count(),
            "effect chain built"
        );
        Ok(chain)
    }

    /// Bypass mixer of `pedal`; `None` for the tuner.
    pub fn mixer(&self, pedal: Pedal) -> Option<&BypassMixer> {
        let mixer = match pedal {
            Pedal::Compressor => &self.compressor.mixer,
            Pedal::Drive => &self.drive.mixer,
            Pedal::Distortion => &self.distortion.mixer,
            Pedal::Chorus => &self.chorus.mixer,
            Pedal::Tremolo => &self.tremolo.mixer,
            Pedal::Delay => &self.delay.mixer,
            Pedal::Wah => &self.wah.mixer,
            Pedal::Reverb => &self.reverb.mixer,
            Pedal::Tuner => return None,
        };
        Some(mixer)
    }

    fn mixer_mut(&mut self, pedal: Pedal) -> Option<&mut BypassMixer> {
        let mixer = match pedal {
            Pedal::Compressor => &mut self.compressor.mixer,
            Pedal::Drive => &mut self.drive.mixer,
            Pedal::Distortion => &mut self.distortion.mixer,
            Pedal::Chorus => &mut self.chorus.mixer,
            Pedal::Tremolo => &mut self.tremolo.mixer,
            Pedal::Delay => &mut self.delay.mixer,
            Pedal::Wah => &mut self.wah.mixer,
            Pedal::Reverb => &mut self.reverb.mixer,
            Pedal::Tuner => return None,
        };
        Some(mixer)
    }

    /// Crossfades `pedal` in or out. The tuner has no stage and is ignored.
    pub fn set_bypass(&mut self, pedal: Pedal, bypassed: bool) {
        if let Some(mixer) = self.mixer_mut(pedal) {
            mixer.set_bypass(bypassed);
        }
    }

    /// Bypass state of `pedal`; the tuner always reads as bypassed.
    pub fn is_bypassed(&self, pedal: Pedal) -> bool {
        self.mixer(pedal).is_none_or(BypassMixer::is_bypassed)
    }

    /// Pushes the value of `key` in `params` onto the owning nodes.
    ///
    /// Master volume is not part of the chain and is ignored here.
    pub fn apply(&self, key: ParamKey, params: &PedalParams) {
        let Some(pedal) = key.pedal() else { return };
        match pedal {
            Pedal::Compressor => self.compressor.stage.apply(key, &params.compressor),
            Pedal::Drive | Pedal::Distortion => {
                let stage = if pedal == Pedal::Drive {
                    &self.drive.stage
                } else {
                    &self.distortion.stage
                };
                stage.apply(key, params.get(key));
            }
            Pedal::Chorus => self.chorus.stage.apply(key, &params.chorus),
            Pedal::Tremolo => self.tremolo.stage.apply(key, &params.tremolo),
            Pedal::Delay => self.delay.stage.apply(key, &params.delay),
            Pedal::Wah => self.wah.stage.apply(key, &params.wah),
            Pedal::Reverb => self.reverb.stage.apply(key, &params.reverb),
            Pedal::Tuner => {}
        }
    }

    /// Pushes every knob.
    pub fn apply_all(&self, params: &PedalParams) {
        for key in ParamKey::ALL {
            self.apply(key, params);
        }
    }

    /// Compressor stage.
    pub fn compressor(&self) -> &CompressorStage {
        &self.compressor.stage
    }

    /// Drive stage.
    pub fn drive(&self) -> &OverdriveStage {
        &self.drive.stage
    }

    /// Distortion stage.
    pub fn distortion(&self) -> &OverdriveStage {
        &self.distortion.stage
    }

    /// Chorus stage.
    pub fn chorus(&self) -> &ChorusStage {
        &self.chorus.stage
    }

    /// Tremolo stage.
    pub fn tremolo(&self) -> &TremoloStage {
        &self.tremolo.stage
    }

    /// Delay stage.
    pub fn delay(&self) -> &DelayStage {
        &self.delay.stage
    }

    /// Wah stage.
    pub fn wah(&self) -> &WahStage {
        &self.wah.stage
    }

    /// Reverb stage.
    pub fn reverb(&self) -> &ReverbStage {
        &self.reverb.stage
    }
}
