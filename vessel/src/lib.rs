//! Per-step angular dynamics of a multi-part vessel.
//!
//! Each physics step a vessel is classified ([`state`]), and while in full
//! physics its moment of inertia, torque available and stopping distance are
//! rebuilt from the current part snapshot ([`tick`]). The [`scheduler`]
//! makes sure that happens once per step whichever host callback fires.

pub mod config;
pub mod dynamics;
pub mod part;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod tracker;

pub use config::{ConfigErrors, EstimatorConfig};
pub use dynamics::{AngularDynamics, AngularDynamicsEstimator};
pub use part::Part;
pub use scheduler::{Invocation, ScheduleDecision, UpdateScheduler};
pub use snapshot::{PilotInput, StepContext, VesselId, VesselSnapshot};
pub use state::{StateFlags, StateClassification, VesselSimState, VesselStateTracker};
pub use tick::{NoCollaborator, StepCollaborator, VesselOutputs, tick, tick_with};
pub use tracker::VesselTracker;
