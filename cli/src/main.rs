use actuators::{
    ActuatorCapability, ActuatorModule, TorquePair,
    control_surface::ControlSurface,
    gimbal::Gimbal,
    provider::FixedTorque,
    rcs::RcsThruster,
    reaction_wheel::ReactionWheel,
};
use clap::Parser;
use colored::*;
use mass_properties::{MassPropertiesErrors, RigidBody};
use nalgebra::{UnitQuaternion, Vector3};
use std::{error::Error, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use transforms::Transform;
use utilities::{format_number, format_vector};
use vessel::{
    EstimatorConfig, Part, PilotInput, StepCollaborator, StepContext, VesselId, VesselOutputs,
    VesselSnapshot, VesselTracker,
};

/// Drives a small fleet of vessels through fixed physics steps and prints
/// what the attitude controllers would see.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Estimator settings (.ron)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Fleet of vessel snapshots (.ron). Uses the built-in demo fleet when absent.
    #[arg(short, long)]
    fleet: Option<PathBuf>,
    /// Number of physics steps to run
    #[arg(short, long, default_value_t = 6)]
    steps: u64,
    /// Log debug events
    #[arg(short, long)]
    verbose: bool,
}

/// Prints each vessel's outputs once its torque has been computed, the point
/// where an autopilot would read them.
struct Readout;

impl StepCollaborator for Readout {
    fn after_torque(
        &mut self,
        snapshot: &VesselSnapshot,
        outputs: &VesselOutputs,
        input: Option<&PilotInput>,
    ) {
        let mut header = format!("  {} [{}]", snapshot.name.bold(), outputs.state);
        if outputs.is_first_physics_frame {
            header.push_str(&format!(" {}", "first frame".yellow()));
        }
        if outputs.is_player_controlled {
            header.push_str(&format!(" {}", "piloted".cyan()));
        }
        if input.is_some() && outputs.pilot_is_idle {
            header.push_str(&format!(" {}", "idle".dimmed()));
        }
        println!("{header}");
        println!("    moi              {}", format_vector(&outputs.moi));
        println!("    angular velocity {}", format_vector(&outputs.angular_velocity));
        println!("    torque available {}", format_vector(&outputs.torque_available));
        println!("    reaction speed   {}", format_vector(&outputs.reaction_speed));
        println!(
            "    distance to stop {}",
            format_vector(&outputs.angular_distance_to_stop)
        );
        for failure in &outputs.contributor_failures {
            println!(
                "    {} {} ({}): {}",
                "failed".red(),
                failure.part_name,
                failure.module_name,
                failure.error
            );
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => EstimatorConfig::load(path)?,
        None => EstimatorConfig::default(),
    };
    info!(
        pitch_correction_deg = config.pitch_correction_deg,
        rcs_lever_threshold = config.rcs_lever_threshold,
        "estimator configured"
    );

    let mut fleet = match &cli.fleet {
        Some(path) => ron::from_str::<Vec<VesselSnapshot>>(&std::fs::read_to_string(path)?)?,
        None => demo_fleet()?,
    };
    let mut trackers: Vec<VesselTracker> =
        fleet.iter().map(|_| VesselTracker::new(config)).collect();
    let active = fleet.first().map(|v| v.id);

    for step in 0..cli.steps {
        println!("{} {}", "step".green().bold(), step);
        script(step, &mut fleet);

        let mut context = StepContext::new(step);
        context.active_vessel = active;
        // physics settles one step after launch
        context.physics_ready = step > 0;

        // the host fires the pre-autopilot callback for the flown vessel first
        if let Some((snapshot, tracker)) = fleet
            .iter()
            .zip(trackers.iter_mut())
            .find(|(snapshot, _)| context.is_active(snapshot.id))
        {
            let input = pilot_input(step);
            tracker.pre_autopilot(&context, snapshot, &input, &mut Readout);
        }
        for (snapshot, tracker) in fleet.iter().zip(trackers.iter_mut()) {
            tracker.fixed_update(&context, snapshot, &mut Readout);
        }
    }

    let torque: f64 = trackers
        .iter()
        .map(|t| t.outputs().torque_available.norm())
        .sum();
    info!(vessels = trackers.len(), "fleet torque {}", format_number(torque));
    Ok(())
}

/// Steering for the flown vessel: a short pitch input, then hands off.
fn pilot_input(step: u64) -> PilotInput {
    match step {
        2 | 3 => PilotInput {
            pitch: 0.5,
            ..Default::default()
        },
        _ => PilotInput::default(),
    }
}

/// Scripted events: the relay is packed for a couple of steps, the lander
/// stages off its wheel and everything slowly spins up.
fn script(step: u64, fleet: &mut [VesselSnapshot]) {
    for vessel in fleet.iter_mut() {
        vessel.angular_velocity += Vector3::new(0.01, -0.02, 0.005);
        match (vessel.name.as_str(), step) {
            ("Relay", 2) => vessel.packed = true,
            ("Relay", 4) => vessel.packed = false,
            ("Lander", 4) => vessel.parts.retain(|p| p.name != "wheel"),
            _ => {}
        }
    }
}

fn ballast(id: u32, mass: f64, position: Vector3<f64>) -> Result<Part, MassPropertiesErrors> {
    let body = RigidBody::new(mass, Vector3::new(0.1, 0.1, 0.1) * mass)?.with_position(position);
    Ok(Part::new(id, "ballast").with_rigid_body(body))
}

fn demo_fleet() -> Result<Vec<VesselSnapshot>, MassPropertiesErrors> {
    let nozzle = |x: f64, y: f64, z: f64| {
        Transform::new(
            Vector3::new(x, y, z),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), x.signum() * std::f64::consts::FRAC_PI_2),
        )
    };
    let rcs = RcsThruster::new(vec![nozzle(1.0, 2.0, 0.0), nozzle(-1.0, -2.0, 0.0)], 1.0);

    let lander = VesselSnapshot::new(VesselId(1), "Lander")
        .with_part(
            ballast(1, 400.0, Vector3::new(0.0, 1.0, 0.0))?.with_module(ActuatorModule::new(
                "rcs",
                ActuatorCapability::Rcs(rcs),
            )),
        )
        .with_part(ballast(2, 400.0, Vector3::new(0.0, -1.0, 0.0))?)
        .with_part(Part::new(3, "wheel").with_module(ActuatorModule::new(
            "wheel",
            ActuatorCapability::ReactionWheel(
                ReactionWheel::new(5.0, 5.0, 5.0).with_authority_limiter(80.0),
            ),
        )))
        .with_part(Part::new(4, "fin").with_module(ActuatorModule::new(
            "elevon",
            ActuatorCapability::ControlSurface(ControlSurface::new(
                TorquePair::new(Vector3::new(2.0, 0.5, 0.0), Vector3::new(-1.5, -0.5, 0.0)),
                15.0,
                30.0,
            )),
        )));

    let relay = VesselSnapshot::new(VesselId(2), "Relay")
        .with_part(ballast(1, 150.0, Vector3::new(2.0, 0.0, 0.0))?)
        .with_part(ballast(2, 150.0, Vector3::new(-2.0, 0.0, 0.0))?)
        .with_part(Part::new(3, "engine").with_module(ActuatorModule::new(
            "gimbal",
            ActuatorCapability::Gimbal(
                Gimbal::new(Vector3::new(8.0, 0.0, 8.0), 5.0).with_response_speed(10.0),
            ),
        )))
        .with_part(Part::new(4, "command core").with_module(ActuatorModule::new(
            "core torque",
            ActuatorCapability::Other(Box::new(FixedTorque::new(TorquePair::symmetric(
                Vector3::new(0.5, 0.5, 0.5),
            )))),
        )));

    Ok(vec![lander, relay])
}
