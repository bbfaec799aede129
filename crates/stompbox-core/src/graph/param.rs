//! Automatable node parameters.
//!
//! An [`AudioParam`] is shared between the thread that builds and controls the
//! graph and the render thread. The control side writes automation (a target
//! value plus an exponential time constant); the render side reads it once per
//! block, smooths towards the target per sample and publishes the value it
//! actually rendered.
//!
//! Target and time constant live in one `AtomicU64` so the renderer can never
//! observe a new target paired with a stale time constant.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use super::node::NodeId;

/// Pack `(target, time_constant)` into one word. Low half is the target.
#[inline]
pub(crate) fn pack(target: f32, time_constant: f32) -> u64 {
    (u64::from(time_constant.to_bits()) << 32) | u64::from(target.to_bits())
}

/// Inverse of [`pack`].
#[inline]
pub(crate) fn unpack(word: u64) -> (f32, f32) {
    let target = f32::from_bits(word as u32);
    let time_constant = f32::from_bits((word >> 32) as u32);
    (target, time_constant)
}

#[derive(Debug)]
pub(crate) struct ParamShared {
    pub(crate) graph_id: u64,
    pub(crate) owner: NodeId,
    pub(crate) min: f32,
    pub(crate) max: f32,
    pub(crate) default: f32,
    pub(crate) automation: AtomicU64,
    pub(crate) current: AtomicU32,
}

/// Handle to one automatable parameter of a graph node.
///
/// Cloning the handle is cheap and all clones control the same parameter.
#[derive(Debug, Clone)]
pub struct AudioParam {
    pub(crate) shared: Arc<ParamShared>,
}

impl AudioParam {
    pub(crate) fn new(graph_id: u64, owner: NodeId, default: f32, min: f32, max: f32) -> Self {
        Self {
            shared: Arc::new(ParamShared {
                graph_id,
                owner,
                min,
                max,
                default,
                automation: AtomicU64::new(pack(default, 0.0)),
                current: AtomicU32::new(default.to_bits()),
            }),
        }
    }

    /// Last value the renderer produced (intrinsic value plus modulation).
    ///
    /// Before the first rendered block this is the intrinsic value.
    #[inline]
    pub fn value(&self) -> f32 {
        f32::from_bits(self.shared.current.load(Ordering::Acquire))
    }

    /// Intrinsic value the parameter is heading towards.
    #[inline]
    pub fn target(&self) -> f32 {
        unpack(self.shared.automation.load(Ordering::Acquire)).0
    }

    /// Sets the intrinsic value immediately. Non-finite values are ignored.
    pub fn set_value(&self, value: f32) {
        if !value.is_finite() {
            return;
        }
        self.shared.automation.store(pack(value, 0.0), Ordering::Release);
        self.shared.current.store(value.to_bits(), Ordering::Release);
    }

    /// Starts an exponential approach to `target`.
    ///
    /// `time_constant` is in seconds: after one time constant 63.2% of the
    /// distance is covered. Zero or negative means an immediate jump.
    /// Non-finite arguments are ignored.
    pub fn set_target_at_time(&self, target: f32, time_constant: f32) {
        if !target.is_finite() || !time_constant.is_finite() {
            return;
        }
        self.shared
            .automation
            .store(pack(target, time_constant.max(0.0)), Ordering::Release);
    }

    /// Lower bound applied to the rendered value.
    pub fn min_value(&self) -> f32 {
        self.shared.min
    }

    /// Upper bound applied to the rendered value.
    pub fn max_value(&self) -> f32 {
        self.shared.max
    }

    /// Value the parameter was created with.
    pub fn default_value(&self) -> f32 {
        self.shared.default
    }

    /// Node this parameter belongs to.
    pub fn owner(&self) -> NodeId {
        self.shared.owner
    }

    /// True if both handles control the same parameter.
    pub fn same_as(&self, other: &AudioParam) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub(crate) fn publish(&self, value: f32) {
        self.shared.current.store(value.to_bits(), Ordering::Release);
    }

    pub(crate) fn automation(&self) -> u64 {
        self.shared.automation.load(Ordering::Acquire)
    }
}
