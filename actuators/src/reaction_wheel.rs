use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{TorquePair, TorqueQueryError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionWheelState {
    #[default]
    Active,
    Disabled,
    /// Out of electric charge or otherwise unable to spin up.
    Broken,
}

/// Momentum wheel with the same authority in both directions on each axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactionWheel {
    pub pitch_torque: f64, // Nm
    pub roll_torque: f64,  // Nm
    pub yaw_torque: f64,   // Nm
    /// Percentage of rated torque the wheel is allowed to use, 0..=100.
    pub authority_limiter: f64,
    pub state: ReactionWheelState,
}

impl ReactionWheel {
    pub fn new(pitch_torque: f64, roll_torque: f64, yaw_torque: f64) -> Self {
        Self {
            pitch_torque,
            roll_torque,
            yaw_torque,
            authority_limiter: 100.0,
            state: ReactionWheelState::Active,
        }
    }

    pub fn with_authority_limiter(mut self, percent: f64) -> Self {
        self.authority_limiter = percent;
        self
    }

    pub fn with_state(mut self, state: ReactionWheelState) -> Self {
        self.state = state;
        self
    }

    pub fn potential_torque(&self) -> Result<TorquePair, TorqueQueryError> {
        if self.state != ReactionWheelState::Active {
            return Ok(TorquePair::zeros());
        }
        let authority = self.authority_limiter.clamp(0.0, 100.0) * 0.01;
        let rated = Vector3::new(self.pitch_torque, self.roll_torque, self.yaw_torque);
        TorquePair::symmetric(rated * authority).validate()
    }
}
