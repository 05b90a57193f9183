use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{Contribution, TorquePair, TorqueQueryError};

/// Thrust-vectoring engine mount. Reports a single authority used both ways.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gimbal {
    pub potential_torque: Vector3<f64>,
    /// Maximum gimbal angle, degrees.
    pub gimbal_range: f64,
    /// Degrees per second. Only used when `use_response_speed` is set.
    pub response_speed: f64,
    pub use_response_speed: bool,
}

impl Gimbal {
    pub fn new(potential_torque: Vector3<f64>, gimbal_range: f64) -> Self {
        Self {
            potential_torque,
            gimbal_range,
            response_speed: 0.0,
            use_response_speed: false,
        }
    }

    pub fn with_response_speed(mut self, response_speed: f64) -> Self {
        self.response_speed = response_speed;
        self.use_response_speed = true;
        self
    }

    pub fn contribution(&self) -> Result<Contribution, TorqueQueryError> {
        let pair = TorquePair::symmetric(self.potential_torque).validate()?;
        let contribution = Contribution::from_pair(&pair);
        if !self.use_response_speed {
            return Ok(contribution);
        }
        let time = utilities::divide_or_zero(self.gimbal_range.abs(), self.response_speed);
        Ok(contribution.with_reaction_weight(&(pair.magnitude() * time)))
    }
}
