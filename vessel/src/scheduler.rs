use std::fmt;

use tracing::debug;

use crate::state::StateFlags;

/// The host callback a vessel update is being requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    /// Fires before the autopilot consumes steering input. Only the vessel
    /// the player is flying gets this one.
    PreAutopilot,
    /// Generic end-of-step tick, fired for every vessel.
    FixedUpdate,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::PreAutopilot => write!(f, "pre-autopilot"),
            Invocation::FixedUpdate => write!(f, "fixed update"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    Run,
    /// The piloted in-physics vessel is updated from the pre-autopilot
    /// callback, never from its own fixed update.
    SkipServedByPreAutopilot,
    SkipAlreadyRan,
}

impl ScheduleDecision {
    pub fn should_run(&self) -> bool {
        *self == ScheduleDecision::Run
    }
}

/// Guarantees one update per vessel per physics step, whichever host
/// callbacks fire.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateScheduler {
    last_step: Option<u64>,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_step(&self) -> Option<u64> {
        self.last_step
    }

    pub fn decide(&self, invocation: Invocation, step: u64, flags: &StateFlags) -> ScheduleDecision {
        let decision = if self.last_step == Some(step) {
            ScheduleDecision::SkipAlreadyRan
        } else if invocation == Invocation::FixedUpdate && flags.is_piloted_in_physics() {
            ScheduleDecision::SkipServedByPreAutopilot
        } else {
            ScheduleDecision::Run
        };
        if !decision.should_run() {
            debug!(step, %invocation, ?decision, "skipping duplicate vessel update");
        }
        decision
    }

    pub fn mark(&mut self, step: u64) {
        self.last_step = Some(step);
    }
}
