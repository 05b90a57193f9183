use actuators::{
    TorqueContext,
    aggregator::{CategoryTorque, ContributorFailure, TorqueAggregator, TorqueReport},
};
use mass_properties::InertiaTensorEstimator;
use nalgebra::Vector3;
use tracing::trace;

use crate::{
    config::EstimatorConfig,
    dynamics::AngularDynamicsEstimator,
    snapshot::{PilotInput, StepContext, VesselSnapshot},
    state::{StateFlags, VesselSimState, VesselStateTracker},
};

/// Read-only per-step outputs for the autopilot, attitude hold, persistent
/// rotation and actuator shaping components.
///
/// Outside of full physics, and on steps where the physics engine isn't
/// ready yet, the inertia and torque figures are the last ones computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VesselOutputs {
    pub step: Option<u64>,
    pub state: VesselSimState,
    pub is_first_physics_frame: bool,
    pub is_player_controlled: bool,
    pub pilot_is_idle: bool,
    /// Persisted across packing; only refreshed from the physics engine once
    /// the vessel has been in physics for more than one frame.
    pub angular_velocity: Vector3<f64>,
    pub moi: Vector3<f64>,
    pub angular_momentum: Vector3<f64>,
    pub angular_distance_to_stop: Vector3<f64>,
    pub torque_available: Vector3<f64>,
    pub torque_by_category: CategoryTorque,
    pub reaction_speed: Vector3<f64>,
    /// Contributors that failed this step and were counted as zero.
    pub contributor_failures: Vec<ContributorFailure>,
}

impl VesselOutputs {
    pub fn is_in_physics(&self) -> bool {
        self.state == VesselSimState::InPhysics
    }
}

/// Components that run inside a vessel's step. Each hook sees the outputs as
/// they stand at that point: `before_physics` still has last step's inertia
/// and torque, `after_inertia` has the new MOI with last step's torque.
/// The two physics hooks only run while the vessel is in physics.
pub trait StepCollaborator {
    fn before_physics(&mut self, _snapshot: &VesselSnapshot, _outputs: &VesselOutputs) {}
    fn after_inertia(&mut self, _snapshot: &VesselSnapshot, _outputs: &VesselOutputs) {}
    fn after_torque(
        &mut self,
        _snapshot: &VesselSnapshot,
        _outputs: &VesselOutputs,
        _input: Option<&PilotInput>,
    ) {
    }
}

pub struct NoCollaborator;

impl StepCollaborator for NoCollaborator {}

pub fn state_flags(snapshot: &VesselSnapshot, context: &StepContext) -> StateFlags {
    StateFlags {
        loaded: snapshot.loaded,
        packed: snapshot.packed,
        physics_ready: context.physics_ready,
        is_active: context.is_active(snapshot.id),
    }
}

/// MOI about the reference transform axes, the axes angular velocity and
/// torque are reported in.
pub fn moment_of_inertia(snapshot: &VesselSnapshot, config: &EstimatorConfig) -> Vector3<f64> {
    let reference = &snapshot.reference.rotation;
    let frame = transforms::with_pitch_correction(reference, config.pitch_correction_deg);
    let mut estimator = InertiaTensorEstimator::new(&frame, snapshot.center_of_mass)
        .with_offset_frame(reference);
    estimator.extend(snapshot.parts.iter().filter_map(|p| p.rigid_body.as_ref()));
    estimator.finish().diagonal()
}

pub fn torque_report(
    snapshot: &VesselSnapshot,
    context: &StepContext,
    config: &EstimatorConfig,
) -> TorqueReport {
    let torque_context = TorqueContext {
        reference: snapshot.reference,
        center_of_mass: snapshot.center_of_mass,
        rcs_enabled: snapshot.rcs_enabled,
        precision_mode: context.precision_mode,
        lever_threshold: config.rcs_lever_threshold,
    };
    TorqueAggregator::aggregate(snapshot.parts.iter().map(|p| p.actuators()), &torque_context)
}

/// One step for one vessel with no collaborators.
pub fn tick(
    snapshot: &VesselSnapshot,
    context: &StepContext,
    input: Option<&PilotInput>,
    previous: &VesselOutputs,
    config: &EstimatorConfig,
) -> VesselOutputs {
    tick_with(snapshot, context, input, previous, config, &mut NoCollaborator)
}

/// One step for one vessel. Doesn't care which host callback it was invoked
/// from; that is the scheduler's concern.
pub fn tick_with<C>(
    snapshot: &VesselSnapshot,
    context: &StepContext,
    input: Option<&PilotInput>,
    previous: &VesselOutputs,
    config: &EstimatorConfig,
    collaborator: &mut C,
) -> VesselOutputs
where
    C: StepCollaborator + ?Sized,
{
    let classification =
        VesselStateTracker::with_state(previous.state).update(&state_flags(snapshot, context));

    let mut outputs = previous.clone();
    outputs.step = Some(context.step);
    outputs.state = classification.state;
    outputs.is_first_physics_frame = classification.is_first_physics_frame;
    outputs.is_player_controlled = classification.is_player_controlled;
    outputs.contributor_failures.clear();

    let in_physics = classification.should_recompute();
    if in_physics && !classification.is_first_physics_frame {
        outputs.angular_velocity = snapshot.angular_velocity;
    }

    collaborator.before_physics(snapshot, &outputs);

    if in_physics {
        outputs.moi = moment_of_inertia(snapshot, config);
        outputs.pilot_is_idle = input.is_some_and(PilotInput::is_idle);
        collaborator.after_inertia(snapshot, &outputs);

        let report = torque_report(snapshot, context, config);
        let dynamics = AngularDynamicsEstimator::estimate(
            &outputs.moi,
            &snapshot.angular_velocity,
            &report.torque_available,
        );
        outputs.torque_available = report.torque_available;
        outputs.torque_by_category = report.categories;
        outputs.reaction_speed = report.reaction_speed;
        outputs.contributor_failures = report.failures;
        outputs.angular_momentum = dynamics.angular_momentum;
        outputs.angular_distance_to_stop = dynamics.distance_to_stop;

        trace!(
            vessel = %snapshot.name,
            step = context.step,
            moi = ?outputs.moi,
            torque = ?outputs.torque_available,
            "vessel dynamics updated"
        );
    }

    collaborator.after_torque(snapshot, &outputs, input);
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{part::Part, snapshot::VesselId};
    use actuators::{
        ActuatorCapability, ActuatorModule, TorquePair, TorqueQueryError, provider::TorqueProvider,
        reaction_wheel::ReactionWheel,
    };
    use approx::assert_abs_diff_eq;
    use mass_properties::RigidBody;
    use nalgebra::UnitQuaternion;
    use serde::{Deserialize, Serialize};
    use transforms::Transform;
    const TOL: f64 = 1e-9;

    #[derive(Debug, Serialize, Deserialize)]
    struct Unsupported;

    #[typetag::serde]
    impl TorqueProvider for Unsupported {
        fn potential_torque(&self, _context: &TorqueContext) -> Result<TorquePair, TorqueQueryError> {
            Err(TorqueQueryError::Provider("not available in this build".to_string()))
        }
    }

    fn wheel_part(id: u32, torque: f64) -> Part {
        Part::new(id, "wheel").with_module(ActuatorModule::new(
            "wheel",
            ActuatorCapability::ReactionWheel(ReactionWheel::new(torque, torque, torque)),
        ))
    }

    fn mass_part(id: u32, mass: f64, position: Vector3<f64>) -> Part {
        Part::new(id, "ballast").with_rigid_body(
            RigidBody::new(mass, Vector3::zeros())
                .unwrap()
                .with_position(position),
        )
    }

    #[test]
    fn test_point_mass_vessel_moi() {
        let snapshot = VesselSnapshot::new(VesselId(1), "lander")
            .with_part(mass_part(1, 100.0, Vector3::new(1.0, 0.0, 0.0)));
        let out = tick(
            &snapshot,
            &StepContext::new(0),
            None,
            &VesselOutputs::default(),
            &EstimatorConfig::default(),
        );
        assert!(out.is_in_physics());
        assert_abs_diff_eq!(out.moi, Vector3::new(0.0, 100.0, 100.0), epsilon = TOL);
    }

    #[test]
    fn test_pitch_correction_applies_to_inertia_axes() {
        let snapshot = VesselSnapshot::new(VesselId(1), "lander").with_part(
            Part::new(1, "core").with_rigid_body(RigidBody::new(1.0, Vector3::new(1.0, 2.0, 3.0)).unwrap()),
        );
        let corrected = moment_of_inertia(&snapshot, &EstimatorConfig::default());
        assert_abs_diff_eq!(corrected, Vector3::new(1.0, 3.0, 2.0), epsilon = TOL);

        let uncorrected = moment_of_inertia(
            &snapshot,
            &EstimatorConfig {
                pitch_correction_deg: 0.0,
                ..Default::default()
            },
        );
        assert_abs_diff_eq!(uncorrected, Vector3::new(1.0, 2.0, 3.0), epsilon = TOL);
    }

    #[test]
    fn test_long_vessel_rolling_about_its_nose() {
        // nose along reference up, the roll axis
        let mut snapshot = VesselSnapshot::new(VesselId(1), "rod")
            .with_part(mass_part(1, 100.0, Vector3::new(0.0, 10.0, 0.0)))
            .with_part(mass_part(2, 100.0, Vector3::new(0.0, -10.0, 0.0)))
            .with_part(wheel_part(3, 10.0));
        snapshot.angular_velocity = Vector3::new(0.5, 1.0, 0.0);
        let out = tick(
            &snapshot,
            &StepContext::new(0),
            None,
            &VesselOutputs::default(),
            &EstimatorConfig::default(),
        );
        assert_abs_diff_eq!(out.moi, Vector3::new(20000.0, 0.0, 20000.0), epsilon = TOL);
        // no roll momentum for a rod spinning about its own axis
        assert_abs_diff_eq!(out.angular_momentum, Vector3::new(10000.0, 0.0, 0.0), epsilon = TOL);
        // 0.5 * 1e8 / (10 * 20000)
        assert_abs_diff_eq!(
            out.angular_distance_to_stop,
            Vector3::new(250.0, 0.0, 0.0),
            epsilon = TOL
        );
    }

    #[test]
    fn test_rotated_reference_keeps_nose_on_roll_axis() {
        let reference = UnitQuaternion::from_euler_angles(0.4, -0.9, 1.3);
        let mut snapshot = VesselSnapshot::new(VesselId(1), "rod")
            .with_part(mass_part(1, 100.0, reference * Vector3::new(0.0, 10.0, 0.0)))
            .with_part(mass_part(2, 100.0, reference * Vector3::new(0.0, -10.0, 0.0)));
        snapshot.reference = Transform::from_rotation(reference);
        let moi = moment_of_inertia(&snapshot, &EstimatorConfig::default());
        assert_abs_diff_eq!(moi, Vector3::new(20000.0, 0.0, 20000.0), epsilon = 1e-6);
    }

    #[test]
    fn test_physics_not_ready_defers_recompute() {
        let config = EstimatorConfig::default();
        let mut snapshot = VesselSnapshot::new(VesselId(1), "lander").with_part(wheel_part(1, 2.0));
        snapshot.angular_velocity = Vector3::new(0.1, 0.0, 0.0);
        let first = tick(&snapshot, &StepContext::new(0), None, &VesselOutputs::default(), &config);
        let settled = tick(&snapshot, &StepContext::new(1), None, &first, &config);
        assert_eq!(settled.torque_available, Vector3::new(2.0, 2.0, 2.0));
        assert_eq!(settled.angular_velocity, Vector3::new(0.1, 0.0, 0.0));

        let mut snapshot = VesselSnapshot::new(VesselId(1), "lander").with_part(wheel_part(1, 7.0));
        snapshot.angular_velocity = Vector3::new(0.9, 0.9, 0.9);
        let mut context = StepContext::new(2);
        context.physics_ready = false;
        let deferred = tick(&snapshot, &context, None, &settled, &config);
        assert_eq!(deferred.state, VesselSimState::InPhysics);
        assert!(!deferred.is_first_physics_frame);
        assert_eq!(deferred.torque_available, Vector3::new(2.0, 2.0, 2.0));
        assert_eq!(deferred.angular_velocity, Vector3::new(0.1, 0.0, 0.0));
        assert_eq!(deferred.moi, settled.moi);
        assert_eq!(deferred.angular_momentum, settled.angular_momentum);

        // back in step with physics, no new entry frame
        let resumed = tick(&snapshot, &StepContext::new(3), None, &deferred, &config);
        assert!(!resumed.is_first_physics_frame);
        assert_eq!(resumed.torque_available, Vector3::new(7.0, 7.0, 7.0));
    }

    #[test]
    fn test_wheels_and_distance_to_stop() {
        let mut snapshot = VesselSnapshot::new(VesselId(1), "lander")
            .with_part(wheel_part(1, 10.0))
            .with_part(wheel_part(2, 5.0))
            .with_part(mass_part(3, 100.0, Vector3::new(1.0, 0.0, 0.0)))
            .with_part(mass_part(4, 100.0, Vector3::new(-1.0, 0.0, 0.0)));
        snapshot.angular_velocity = Vector3::new(0.0, 0.3, 0.0);
        let config = EstimatorConfig::default();

        let first = tick(&snapshot, &StepContext::new(0), None, &VesselOutputs::default(), &config);
        assert!(first.is_first_physics_frame);
        assert_eq!(first.torque_available, Vector3::new(15.0, 15.0, 15.0));
        // not trusted on the entry frame
        assert_eq!(first.angular_velocity, Vector3::zeros());

        let second = tick(&snapshot, &StepContext::new(1), None, &first, &config);
        assert!(!second.is_first_physics_frame);
        assert_eq!(second.angular_velocity, Vector3::new(0.0, 0.3, 0.0));
        // L = 200 * 0.3 = 60, d = 0.5 * 3600 / (15 * 200)
        assert_abs_diff_eq!(second.angular_momentum, Vector3::new(0.0, 60.0, 0.0), epsilon = TOL);
        assert_abs_diff_eq!(
            second.angular_distance_to_stop,
            Vector3::new(0.0, 0.6, 0.0),
            epsilon = TOL
        );
    }

    #[test]
    fn test_no_torque_distance_is_zero() {
        let mut snapshot = VesselSnapshot::new(VesselId(1), "brick")
            .with_part(mass_part(1, 100.0, Vector3::new(1.0, 0.0, 0.0)));
        snapshot.angular_velocity = Vector3::new(4.0, -2.0, 9.0);
        let out = tick(
            &snapshot,
            &StepContext::new(0),
            None,
            &VesselOutputs::default(),
            &EstimatorConfig::default(),
        );
        assert_eq!(out.angular_distance_to_stop, Vector3::zeros());
        assert_eq!(out.reaction_speed, Vector3::zeros());
    }

    #[test]
    fn test_packed_keeps_last_values() {
        let mut snapshot = VesselSnapshot::new(VesselId(1), "lander").with_part(wheel_part(1, 2.0));
        let config = EstimatorConfig::default();
        let in_physics = tick(&snapshot, &StepContext::new(0), None, &VesselOutputs::default(), &config);

        snapshot.packed = true;
        snapshot.parts.clear();
        let packed = tick(&snapshot, &StepContext::new(1), None, &in_physics, &config);
        assert_eq!(packed.state, VesselSimState::Packed);
        assert_eq!(packed.torque_available, Vector3::new(2.0, 2.0, 2.0));
        assert_eq!(packed.step, Some(1));
    }

    #[test]
    fn test_structure_change_recomputes() {
        let config = EstimatorConfig::default();
        let full = VesselSnapshot::new(VesselId(1), "lander")
            .with_part(wheel_part(1, 2.0))
            .with_part(wheel_part(2, 3.0));
        let out = tick(&full, &StepContext::new(0), None, &VesselOutputs::default(), &config);
        assert_eq!(out.torque_available, Vector3::new(5.0, 5.0, 5.0));

        let staged = VesselSnapshot::new(VesselId(1), "lander").with_part(wheel_part(1, 2.0));
        let out = tick(&staged, &StepContext::new(1), None, &out, &config);
        assert_eq!(out.torque_available, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_failing_provider_does_not_break_step() {
        let snapshot = VesselSnapshot::new(VesselId(1), "lander")
            .with_part(Part::new(1, "mod part").with_module(ActuatorModule::new(
                "unsupported",
                ActuatorCapability::Other(Box::new(Unsupported)),
            )))
            .with_part(wheel_part(2, 4.0));
        let out = tick(
            &snapshot,
            &StepContext::new(0),
            None,
            &VesselOutputs::default(),
            &EstimatorConfig::default(),
        );
        assert_eq!(out.torque_available, Vector3::new(4.0, 4.0, 4.0));
        assert_eq!(out.contributor_failures.len(), 1);
        assert_eq!(out.contributor_failures[0].part_name, "mod part");
    }

    #[test]
    fn test_pilot_idle() {
        let snapshot = VesselSnapshot::new(VesselId(1), "lander");
        let config = EstimatorConfig::default();
        let previous = VesselOutputs::default();
        let ctx = StepContext::new(0);

        let idle = tick(&snapshot, &ctx, Some(&PilotInput::default()), &previous, &config);
        assert!(idle.pilot_is_idle);
        let steering = PilotInput {
            pitch: 1.0,
            ..Default::default()
        };
        assert!(!tick(&snapshot, &ctx, Some(&steering), &previous, &config).pilot_is_idle);
        assert!(!tick(&snapshot, &ctx, None, &previous, &config).pilot_is_idle);
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<(&'static str, Vector3<f64>, Vector3<f64>)>,
    }

    impl StepCollaborator for Recorder {
        fn before_physics(&mut self, _snapshot: &VesselSnapshot, outputs: &VesselOutputs) {
            self.seen.push(("before", outputs.moi, outputs.torque_available));
        }
        fn after_inertia(&mut self, _snapshot: &VesselSnapshot, outputs: &VesselOutputs) {
            self.seen.push(("inertia", outputs.moi, outputs.torque_available));
        }
        fn after_torque(
            &mut self,
            _snapshot: &VesselSnapshot,
            outputs: &VesselOutputs,
            _input: Option<&PilotInput>,
        ) {
            self.seen.push(("torque", outputs.moi, outputs.torque_available));
        }
    }

    #[test]
    fn test_collaborators_see_ordered_values() {
        let snapshot = VesselSnapshot::new(VesselId(1), "lander")
            .with_part(wheel_part(1, 3.0))
            .with_part(mass_part(2, 10.0, Vector3::new(1.0, 0.0, 0.0)));
        let mut recorder = Recorder::default();
        tick_with(
            &snapshot,
            &StepContext::new(0),
            None,
            &VesselOutputs::default(),
            &EstimatorConfig::default(),
            &mut recorder,
        );
        let stale = Vector3::zeros();
        let moi = Vector3::new(0.0, 10.0, 10.0);
        let torque = Vector3::new(3.0, 3.0, 3.0);
        assert_eq!(recorder.seen.len(), 3);
        assert_eq!(recorder.seen[0], ("before", stale, stale));
        assert_eq!(recorder.seen[1].0, "inertia");
        assert_abs_diff_eq!(recorder.seen[1].1, moi, epsilon = TOL);
        assert_eq!(recorder.seen[1].2, stale);
        assert_eq!(recorder.seen[2].0, "torque");
        assert_eq!(recorder.seen[2].2, torque);
    }
}
