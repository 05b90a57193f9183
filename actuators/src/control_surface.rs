use serde::{Deserialize, Serialize};

use crate::{Contribution, TorquePair, TorqueQueryError};

/// Aerodynamic control surface. Its authority depends on the current airflow,
/// so the host reports it each step in `potential_torque`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlSurface {
    pub potential_torque: TorquePair,
    /// Maximum deflection, degrees.
    pub deflection_range: f64,
    /// Actuator slew rate, degrees per second.
    pub actuator_speed: f64,
}

impl ControlSurface {
    pub fn new(potential_torque: TorquePair, deflection_range: f64, actuator_speed: f64) -> Self {
        Self {
            potential_torque,
            deflection_range,
            actuator_speed,
        }
    }

    /// Seconds to reach full deflection. Zero when the actuator speed is zero.
    pub fn full_deflection_time(&self) -> f64 {
        utilities::divide_or_zero(self.deflection_range.abs(), self.actuator_speed)
    }

    pub fn contribution(&self) -> Result<Contribution, TorqueQueryError> {
        let pair = self.potential_torque.validate()?;
        let weighted = pair.magnitude() * self.full_deflection_time();
        Ok(Contribution::from_pair(&pair).with_reaction_weight(&weighted))
    }
}
