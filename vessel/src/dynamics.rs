use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AngularDynamics {
    /// MOI ⊙ ω
    pub angular_momentum: Vector3<f64>,
    /// Signed rotation still to come per axis if full torque is applied to
    /// stop, radians.
    pub distance_to_stop: Vector3<f64>,
}

pub struct AngularDynamicsEstimator;

impl AngularDynamicsEstimator {
    pub fn angular_momentum(moi: &Vector3<f64>, angular_velocity: &Vector3<f64>) -> Vector3<f64> {
        moi.component_mul(angular_velocity)
    }

    /// 0.5 * sign(L) * L² / (τ ⊙ MOI) per axis. Axes where the divisor is zero
    /// report zero.
    pub fn distance_to_stop(
        angular_momentum: &Vector3<f64>,
        moi: &Vector3<f64>,
        torque_available: &Vector3<f64>,
    ) -> Vector3<f64> {
        if torque_available.norm_squared() == 0.0 {
            return Vector3::zeros();
        }
        let squared = angular_momentum.component_mul(angular_momentum);
        let divisor = utilities::invert_or_zero(&torque_available.component_mul(moi));
        let distance = utilities::signum_or_zero(angular_momentum)
            .component_mul(&squared)
            .component_mul(&divisor)
            * 0.5;
        // L² can overflow on its own for absurd inputs
        distance.map(|x| if x.is_finite() { x } else { 0.0 })
    }

    pub fn estimate(
        moi: &Vector3<f64>,
        angular_velocity: &Vector3<f64>,
        torque_available: &Vector3<f64>,
    ) -> AngularDynamics {
        let angular_momentum = Self::angular_momentum(moi, angular_velocity);
        AngularDynamics {
            angular_momentum,
            distance_to_stop: Self::distance_to_stop(&angular_momentum, moi, torque_available),
        }
    }
}
