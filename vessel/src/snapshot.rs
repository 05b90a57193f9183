use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use transforms::Transform;

use crate::part::Part;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VesselId(pub u32);

/// Everything the host knows about one vessel at the start of a step.
#[derive(Debug, Serialize, Deserialize)]
pub struct VesselSnapshot {
    pub id: VesselId,
    pub name: String,
    pub loaded: bool,
    pub packed: bool,
    /// The control reference transform. Its `up` axis points along the nose.
    pub reference: Transform,
    /// World-space center of mass.
    pub center_of_mass: Vector3<f64>,
    /// Angular velocity reported by the physics engine, vessel frame, rad/s.
    pub angular_velocity: Vector3<f64>,
    /// RCS action group state.
    pub rcs_enabled: bool,
    pub parts: Vec<Part>,
}

impl VesselSnapshot {
    pub fn new(id: VesselId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            loaded: true,
            packed: false,
            reference: Transform::identity(),
            center_of_mass: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            rcs_enabled: true,
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }
}

/// Host-wide state for the current physics step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepContext {
    /// Monotonic physics step counter.
    pub step: u64,
    pub physics_ready: bool,
    /// The vessel the player is flying, if any.
    pub active_vessel: Option<VesselId>,
    pub precision_mode: bool,
}

impl StepContext {
    pub fn new(step: u64) -> Self {
        Self {
            step,
            physics_ready: true,
            active_vessel: None,
            precision_mode: false,
        }
    }

    pub fn with_active_vessel(mut self, id: VesselId) -> Self {
        self.active_vessel = Some(id);
        self
    }

    pub fn is_active(&self, id: VesselId) -> bool {
        self.active_vessel == Some(id)
    }
}

/// Pilot steering for one step, each axis in -1..=1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PilotInput {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PilotInput {
    pub fn is_idle(&self) -> bool {
        [self.pitch, self.roll, self.yaw, self.x, self.y, self.z]
            .iter()
            .all(|axis| *axis == 0.0)
    }
}
