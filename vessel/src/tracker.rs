use crate::{
    config::EstimatorConfig,
    scheduler::{Invocation, UpdateScheduler},
    snapshot::{PilotInput, StepContext, VesselSnapshot},
    tick::{StepCollaborator, VesselOutputs, state_flags, tick_with},
};

/// Per-vessel owner of everything that lives across steps: the scheduler,
/// the previous state and the last outputs (which carry the persisted
/// angular velocity).
#[derive(Debug, Clone, Default)]
pub struct VesselTracker {
    config: EstimatorConfig,
    scheduler: UpdateScheduler,
    outputs: VesselOutputs,
}

impl VesselTracker {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            config,
            scheduler: UpdateScheduler::new(),
            outputs: VesselOutputs::default(),
        }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Latest outputs. Between steps these are the values computed on the
    /// last step that ran.
    pub fn outputs(&self) -> &VesselOutputs {
        &self.outputs
    }

    /// Host callback that fires before the autopilot reads steering for the
    /// vessel being flown. Returns the fresh outputs if the update ran.
    pub fn pre_autopilot<C>(
        &mut self,
        context: &StepContext,
        snapshot: &VesselSnapshot,
        input: &PilotInput,
        collaborator: &mut C,
    ) -> Option<&VesselOutputs>
    where
        C: StepCollaborator + ?Sized,
    {
        self.invoke(Invocation::PreAutopilot, context, snapshot, Some(input), collaborator)
    }

    /// Generic end-of-step callback, fired for every vessel.
    pub fn fixed_update<C>(
        &mut self,
        context: &StepContext,
        snapshot: &VesselSnapshot,
        collaborator: &mut C,
    ) -> Option<&VesselOutputs>
    where
        C: StepCollaborator + ?Sized,
    {
        self.invoke(Invocation::FixedUpdate, context, snapshot, None, collaborator)
    }

    fn invoke<C>(
        &mut self,
        invocation: Invocation,
        context: &StepContext,
        snapshot: &VesselSnapshot,
        input: Option<&PilotInput>,
        collaborator: &mut C,
    ) -> Option<&VesselOutputs>
    where
        C: StepCollaborator + ?Sized,
    {
        let flags = state_flags(snapshot, context);
        if !self
            .scheduler
            .decide(invocation, context.step, &flags)
            .should_run()
        {
            return None;
        }
        self.outputs = tick_with(
            snapshot,
            context,
            input,
            &self.outputs,
            &self.config,
            collaborator,
        );
        self.scheduler.mark(context.step);
        Some(&self.outputs)
    }
}
