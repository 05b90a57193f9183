use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use transforms::Transform;

use crate::{Contribution, TorqueContext, TorqueQueryError};

/// Reaction control thruster block. Each nozzle transform sits in world space
/// and fires along its `-up` (or `-forward` with `use_z_axis`) axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RcsThruster {
    pub thrusters: Vec<Transform>,
    /// Per-nozzle thrust, N.
    pub thruster_power: f64,
    pub rcs_enabled: bool,
    /// Visual-only thrusters never produce torque.
    pub just_for_show: bool,
    pub enable_pitch: bool,
    pub enable_roll: bool,
    pub enable_yaw: bool,
    pub use_z_axis: bool,
    /// In precision mode, scale thrust by the lever arm instead of
    /// `precision_factor`.
    pub use_lever: bool,
    pub precision_factor: f64,
}

impl RcsThruster {
    pub fn new(thrusters: Vec<Transform>, thruster_power: f64) -> Self {
        Self {
            thrusters,
            thruster_power,
            rcs_enabled: true,
            just_for_show: false,
            enable_pitch: true,
            enable_roll: true,
            enable_yaw: true,
            use_z_axis: false,
            use_lever: false,
            precision_factor: 1.0,
        }
    }

    /// 1 for each control axis (pitch, roll, yaw) this block responds to.
    pub fn attitude_mask(&self) -> Vector3<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        Vector3::new(
            flag(self.enable_pitch),
            flag(self.enable_roll),
            flag(self.enable_yaw),
        )
    }

    pub fn thrust_direction(&self, thruster: &Transform) -> Vector3<f64> {
        if self.use_z_axis {
            -thruster.forward()
        } else {
            -thruster.up()
        }
    }

    fn is_active(&self, context: &TorqueContext, shielded: bool) -> bool {
        context.rcs_enabled && !shielded && self.rcs_enabled && !self.just_for_show
    }

    fn thrust_power(&self, context: &TorqueContext, lever_arm: &Vector3<f64>, direction: &Vector3<f64>) -> f64 {
        if !context.precision_mode {
            return self.thruster_power;
        }
        if self.use_lever {
            let lever = lever_distance(lever_arm, direction);
            if lever > context.lever_threshold {
                return self.thruster_power / lever;
            }
            self.thruster_power
        } else {
            self.thruster_power * self.precision_factor
        }
    }

    /// Torque from every nozzle, each added on its own so opposing nozzles
    /// fill both halves of the accumulator instead of cancelling. A nozzle
    /// with non-finite torque fails the whole block.
    pub fn contribution(
        &self,
        context: &TorqueContext,
        shielded: bool,
    ) -> Result<Contribution, TorqueQueryError> {
        let mut contribution = Contribution::default();
        if !self.is_active(context, shielded) {
            return Ok(contribution);
        }
        let mask = self.attitude_mask();
        for thruster in &self.thrusters {
            let lever_arm = thruster.translation - context.center_of_mass;
            let direction = self.thrust_direction(thruster);
            let power = self.thrust_power(context, &lever_arm, &direction);
            let torque = lever_arm.cross(&(direction * power));
            let local = context.reference.inverse_transform_direction(&torque);
            if !local.iter().all(|x| x.is_finite()) {
                return Err(TorqueQueryError::NonFinite);
            }
            contribution.torque.add(&local.component_mul(&mask));
        }
        Ok(contribution)
    }
}

/// Perpendicular distance from the center of mass to the thrust line.
pub fn lever_distance(lever_arm: &Vector3<f64>, direction: &Vector3<f64>) -> f64 {
    match direction.try_normalize(f64::EPSILON) {
        Some(unit) => lever_arm.cross(&unit).norm(),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::UnitQuaternion;
    use std::f64::consts::FRAC_PI_2;
    const TOL: f64 = 1e-9;

    /// Nozzle at `position` firing along world `direction`.
    fn nozzle(position: Vector3<f64>, direction: Vector3<f64>) -> Transform {
        // default thrust axis is -up, so rotate -Y onto `direction`
        let rotation = UnitQuaternion::rotation_between(&-Vector3::y(), &direction)
            .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI));
        Transform::new(position, rotation)
    }

    fn pitch_pair() -> RcsThruster {
        // +y offsets firing along +/-z: pure torque about x
        RcsThruster::new(
            vec![
                nozzle(Vector3::new(0.0, 2.0, 0.0), Vector3::z()),
                nozzle(Vector3::new(0.0, 2.0, 0.0), -Vector3::z()),
            ],
            1.0,
        )
    }

    #[test]
    fn test_thrust_direction() {
        let t = nozzle(Vector3::zeros(), Vector3::z());
        let rcs = RcsThruster::new(vec![t], 1.0);
        assert_abs_diff_eq!(rcs.thrust_direction(&t), Vector3::z(), epsilon = TOL);
    }

    #[test]
    fn test_opposing_nozzles_fill_both_halves() {
        let c = pitch_pair().contribution(&TorqueContext::default(), false).unwrap();
        // (0,2,0) x (0,0,1) = (2,0,0)
        assert_abs_diff_eq!(*c.torque.positive(), Vector3::new(2.0, 0.0, 0.0), epsilon = TOL);
        assert_abs_diff_eq!(*c.torque.negative(), Vector3::new(2.0, 0.0, 0.0), epsilon = TOL);
    }

    #[test]
    fn test_relative_to_center_of_mass() {
        let context = TorqueContext {
            center_of_mass: Vector3::new(0.0, 2.0, 0.0),
            ..Default::default()
        };
        let c = pitch_pair().contribution(&context, false).unwrap();
        assert_abs_diff_eq!(c.torque.max(), Vector3::zeros(), epsilon = TOL);
    }

    #[test]
    fn test_reported_in_reference_axes() {
        let context = TorqueContext {
            reference: Transform::from_rotation(UnitQuaternion::from_axis_angle(
                &Vector3::z_axis(),
                FRAC_PI_2,
            )),
            ..Default::default()
        };
        let c = pitch_pair().contribution(&context, false).unwrap();
        // world x torque is local -y for a reference yawed +90 about z
        assert_abs_diff_eq!(c.torque.max(), Vector3::new(0.0, 2.0, 0.0), epsilon = TOL);
    }

    #[test]
    fn test_axis_mask() {
        let mut rcs = pitch_pair();
        rcs.enable_pitch = false;
        let c = rcs.contribution(&TorqueContext::default(), false).unwrap();
        assert!(c.torque.is_zero());
    }

    #[test]
    fn test_gating() {
        let active = TorqueContext::default();
        let group_off = TorqueContext {
            rcs_enabled: false,
            ..Default::default()
        };
        assert!(pitch_pair().contribution(&group_off, false).unwrap().torque.is_zero());
        assert!(pitch_pair().contribution(&active, true).unwrap().torque.is_zero());

        let mut rcs = pitch_pair();
        rcs.rcs_enabled = false;
        assert!(rcs.contribution(&active, false).unwrap().torque.is_zero());

        let mut rcs = pitch_pair();
        rcs.just_for_show = true;
        assert!(rcs.contribution(&active, false).unwrap().torque.is_zero());
    }

    #[test]
    fn test_precision_factor() {
        let context = TorqueContext {
            precision_mode: true,
            ..Default::default()
        };
        let mut rcs = pitch_pair();
        rcs.precision_factor = 0.25;
        let c = rcs.contribution(&context, false).unwrap();
        assert_abs_diff_eq!(c.torque.max(), Vector3::new(0.5, 0.0, 0.0), epsilon = TOL);
    }

    #[test]
    fn test_precision_lever() {
        let context = TorqueContext {
            precision_mode: true,
            ..Default::default()
        };
        let mut rcs = pitch_pair();
        rcs.use_lever = true;
        // lever 2 > 1, power 1/2, torque 2 * 1/2
        let c = rcs.contribution(&context, false).unwrap();
        assert_abs_diff_eq!(c.torque.max(), Vector3::new(1.0, 0.0, 0.0), epsilon = TOL);

        // short levers keep full power
        let mut rcs = RcsThruster::new(
            vec![nozzle(Vector3::new(0.0, 0.5, 0.0), Vector3::z())],
            1.0,
        );
        rcs.use_lever = true;
        let c = rcs.contribution(&context, false).unwrap();
        assert_abs_diff_eq!(c.torque.max(), Vector3::new(0.5, 0.0, 0.0), epsilon = TOL);
    }

    #[test]
    fn test_non_finite_power_is_an_error() {
        let mut rcs = pitch_pair();
        rcs.thruster_power = f64::INFINITY;
        assert_eq!(
            rcs.contribution(&TorqueContext::default(), false),
            Err(TorqueQueryError::NonFinite)
        );
        // gated blocks are never evaluated
        assert!(rcs.contribution(&TorqueContext::default(), true).is_ok());
    }

    #[test]
    fn test_lever_distance() {
        assert_abs_diff_eq!(
            lever_distance(&Vector3::new(3.0, 4.0, 0.0), &Vector3::new(0.0, 0.0, 2.0)),
            5.0,
            epsilon = TOL
        );
        assert_eq!(lever_distance(&Vector3::new(3.0, 4.0, 0.0), &Vector3::zeros()), 0.0);
    }
}
