use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VesselSimState {
    InPhysics,
    Packed,
    #[default]
    Unloaded,
}

impl Display for VesselSimState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VesselSimState::InPhysics => "in physics",
            VesselSimState::Packed => "packed",
            VesselSimState::Unloaded => "unloaded",
        };
        write!(f, "{name}")
    }
}

/// Host flags the classification is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateFlags {
    pub loaded: bool,
    pub packed: bool,
    pub physics_ready: bool,
    /// This vessel is the one the player is flying.
    pub is_active: bool,
}

impl StateFlags {
    /// True when the host will serve this vessel from its pre-autopilot
    /// callback.
    pub fn is_piloted_in_physics(&self) -> bool {
        self.loaded && !self.packed && self.physics_ready && self.is_active
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateClassification {
    pub state: VesselSimState,
    pub is_first_physics_frame: bool,
    pub is_player_controlled: bool,
    /// Loaded and unpacked but the physics engine isn't ready: `state` is
    /// carried over and nothing physical is recomputed this step.
    pub is_deferred: bool,
}

impl StateClassification {
    /// Inertia, torque and angular velocity are refreshed this step.
    pub fn should_recompute(&self) -> bool {
        self.state == VesselSimState::InPhysics && !self.is_deferred
    }
}

/// Classifies `flags` given last step's state. Rules apply in order:
/// not loaded, packed, physics ready; otherwise the vessel is still between
/// states and keeps `previous`.
pub fn classify(previous: VesselSimState, flags: &StateFlags) -> StateClassification {
    let (state, is_first_physics_frame, is_deferred) = if !flags.loaded {
        (VesselSimState::Unloaded, false, false)
    } else if flags.packed {
        (VesselSimState::Packed, false, false)
    } else if flags.physics_ready {
        (
            VesselSimState::InPhysics,
            previous != VesselSimState::InPhysics,
            false,
        )
    } else {
        (previous, false, true)
    };
    StateClassification {
        state,
        is_first_physics_frame,
        is_player_controlled: flags.is_active,
        is_deferred,
    }
}

/// Keeps the previous state between steps so the physics entry frame can be
/// detected.
#[derive(Debug, Clone, Copy, Default)]
pub struct VesselStateTracker {
    current: StateClassification,
}

impl VesselStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a known state, e.g. a vessel restored already in physics.
    pub fn with_state(state: VesselSimState) -> Self {
        Self {
            current: StateClassification {
                state,
                ..Default::default()
            },
        }
    }

    pub fn current(&self) -> &StateClassification {
        &self.current
    }

    pub fn update(&mut self, flags: &StateFlags) -> StateClassification {
        let next = classify(self.current.state, flags);
        if next.state != self.current.state {
            debug!(from = %self.current.state, to = %next.state, "vessel state changed");
        }
        if next.is_first_physics_frame {
            debug!("first physics frame");
        }
        self.current = next;
        next
    }
}
