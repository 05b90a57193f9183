use actuators::{ActuatorModule, aggregator::PartActuators};
use mass_properties::RigidBody;
use serde::{Deserialize, Serialize};

/// One part of a vessel as seen this step.
#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    pub id: u32,
    pub name: String,
    /// None for physicsless parts, which are left out of the inertia tensor.
    pub rigid_body: Option<RigidBody>,
    pub shielded: bool,
    pub modules: Vec<ActuatorModule>,
}

impl Part {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            rigid_body: None,
            shielded: false,
            modules: Vec::new(),
        }
    }

    pub fn with_rigid_body(mut self, rigid_body: RigidBody) -> Self {
        self.rigid_body = Some(rigid_body);
        self
    }

    pub fn with_module(mut self, module: ActuatorModule) -> Self {
        self.modules.push(module);
        self
    }

    pub fn shielded(mut self) -> Self {
        self.shielded = true;
        self
    }

    pub fn actuators(&self) -> PartActuators<'_> {
        PartActuators {
            id: self.id,
            name: &self.name,
            shielded: self.shielded,
            modules: &self.modules,
        }
    }
}
