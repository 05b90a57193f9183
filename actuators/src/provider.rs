use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::{TorqueContext, TorquePair, TorqueQueryError};

/// Open extension point for torque sources the built-in categories don't
/// cover. Implementations are serialized through typetag so they can live in
/// vessel snapshot files.
#[typetag::serde]
pub trait TorqueProvider: Debug {
    fn potential_torque(&self, context: &TorqueContext) -> Result<TorquePair, TorqueQueryError>;
}

/// A provider that always reports the same pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedTorque {
    pub torque: TorquePair,
}

impl FixedTorque {
    pub fn new(torque: TorquePair) -> Self {
        Self { torque }
    }
}

#[typetag::serde]
impl TorqueProvider for FixedTorque {
    fn potential_torque(&self, _context: &TorqueContext) -> Result<TorquePair, TorqueQueryError> {
        Ok(self.torque)
    }
}
