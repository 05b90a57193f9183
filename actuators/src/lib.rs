//! Torque authority of a vessel's actuators.
//!
//! Every actuator capability reports the torque it could exert about the
//! vessel's local control axes (x = pitch, y = roll, z = yaw) as a
//! [`TorquePair`]. The [`aggregator::TorqueAggregator`] sums those per
//! category and folds them into a single torque-available vector.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use transforms::Transform;

pub mod aggregator;
pub mod control_surface;
pub mod directional;
pub mod gimbal;
pub mod provider;
pub mod rcs;
pub mod reaction_wheel;

use control_surface::ControlSurface;
use directional::DirectionalAccumulator;
use gimbal::Gimbal;
use provider::TorqueProvider;
use rcs::RcsThruster;
use reaction_wheel::ReactionWheel;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TorqueQueryError {
    #[error("reported torque is not finite")]
    NonFinite,
    #[error("{0}")]
    Provider(String),
}

/// Torque available in the positive and negative direction of each axis.
/// `positive` components are expected >= 0 and `negative` components <= 0,
/// but the accumulator splits by sign regardless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TorquePair {
    pub positive: Vector3<f64>,
    pub negative: Vector3<f64>,
}

impl TorquePair {
    pub fn new(positive: Vector3<f64>, negative: Vector3<f64>) -> Self {
        Self { positive, negative }
    }

    /// Same authority both ways.
    pub fn symmetric(magnitude: Vector3<f64>) -> Self {
        let magnitude = utilities::component_abs(&magnitude);
        Self {
            positive: magnitude,
            negative: -magnitude,
        }
    }

    pub fn zeros() -> Self {
        Self::default()
    }

    pub fn is_finite(&self) -> bool {
        self.positive.iter().chain(self.negative.iter()).all(|x| x.is_finite())
    }

    pub fn validate(self) -> Result<Self, TorqueQueryError> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(TorqueQueryError::NonFinite)
        }
    }

    /// max(|positive|, |negative|) per axis.
    pub fn magnitude(&self) -> Vector3<f64> {
        utilities::component_max(
            &utilities::component_abs(&self.positive),
            &utilities::component_abs(&self.negative),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TorqueCategory {
    ReactionWheel,
    Rcs,
    ControlSurface,
    Gimbal,
    Other,
}

impl TorqueCategory {
    pub const ALL: [TorqueCategory; 5] = [
        TorqueCategory::ReactionWheel,
        TorqueCategory::Rcs,
        TorqueCategory::ControlSurface,
        TorqueCategory::Gimbal,
        TorqueCategory::Other,
    ];
}

impl Display for TorqueCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TorqueCategory::ReactionWheel => "reaction wheel",
            TorqueCategory::Rcs => "rcs",
            TorqueCategory::ControlSurface => "control surface",
            TorqueCategory::Gimbal => "gimbal",
            TorqueCategory::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Vessel-wide inputs the actuators need for one step.
#[derive(Debug, Clone, Copy)]
pub struct TorqueContext {
    /// The vessel's reference transform. Torques are reported in its axes.
    pub reference: Transform,
    /// World-space center of mass.
    pub center_of_mass: Vector3<f64>,
    /// RCS action group state.
    pub rcs_enabled: bool,
    /// Pilot precision (fine control) mode.
    pub precision_mode: bool,
    /// Lever distance above which precision mode scales thrust by 1/lever.
    pub lever_threshold: f64,
}

impl Default for TorqueContext {
    fn default() -> Self {
        Self {
            reference: Transform::identity(),
            center_of_mass: Vector3::zeros(),
            rcs_enabled: true,
            precision_mode: false,
            lever_threshold: 1.0,
        }
    }
}

/// What a single module adds to its category and to the reaction-speed
/// weighting for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contribution {
    pub torque: DirectionalAccumulator,
    pub reaction: DirectionalAccumulator,
}

impl Contribution {
    pub fn from_pair(pair: &TorquePair) -> Self {
        let mut contribution = Self::default();
        contribution.torque.add_pair(pair);
        contribution
    }

    pub fn with_reaction_weight(mut self, weighted: &Vector3<f64>) -> Self {
        self.reaction.add(weighted);
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum ActuatorCapability {
    ReactionWheel(ReactionWheel),
    ControlSurface(ControlSurface),
    Gimbal(Gimbal),
    Rcs(RcsThruster),
    Other(Box<dyn TorqueProvider>),
}

impl ActuatorCapability {
    pub fn category(&self) -> TorqueCategory {
        match self {
            ActuatorCapability::ReactionWheel(_) => TorqueCategory::ReactionWheel,
            ActuatorCapability::ControlSurface(_) => TorqueCategory::ControlSurface,
            ActuatorCapability::Gimbal(_) => TorqueCategory::Gimbal,
            ActuatorCapability::Rcs(_) => TorqueCategory::Rcs,
            ActuatorCapability::Other(_) => TorqueCategory::Other,
        }
    }

    pub fn contribution(
        &self,
        context: &TorqueContext,
        shielded: bool,
    ) -> Result<Contribution, TorqueQueryError> {
        match self {
            ActuatorCapability::ReactionWheel(wheel) => {
                Ok(Contribution::from_pair(&wheel.potential_torque()?))
            }
            ActuatorCapability::ControlSurface(surface) => surface.contribution(),
            ActuatorCapability::Gimbal(gimbal) => gimbal.contribution(),
            ActuatorCapability::Rcs(rcs) => rcs.contribution(context, shielded),
            ActuatorCapability::Other(provider) => Ok(Contribution::from_pair(
                &provider.potential_torque(context)?.validate()?,
            )),
        }
    }
}

/// A part module that may exert torque. Disabled modules are skipped.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActuatorModule {
    pub name: String,
    pub enabled: bool,
    pub capability: ActuatorCapability,
}

impl ActuatorModule {
    pub fn new(name: &str, capability: ActuatorCapability) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            capability,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
