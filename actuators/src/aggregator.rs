use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    ActuatorModule, TorqueCategory, TorqueContext, TorqueQueryError,
    directional::DirectionalAccumulator,
};

/// The actuator-facing view of one part.
#[derive(Debug, Clone, Copy)]
pub struct PartActuators<'a> {
    pub id: u32,
    pub name: &'a str,
    /// Shielded from the airstream (inside a fairing or cargo bay).
    pub shielded: bool,
    pub modules: &'a [ActuatorModule],
}

/// A contributor that failed to report torque and was counted as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributorFailure {
    pub part_id: u32,
    pub part_name: String,
    pub module_index: usize,
    pub module_name: String,
    pub category: TorqueCategory,
    pub error: TorqueQueryError,
}

/// Per-category torque available, max(|positive|, |negative|) per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTorque {
    pub reaction_wheel: Vector3<f64>,
    pub rcs: Vector3<f64>,
    pub control_surface: Vector3<f64>,
    pub gimbal: Vector3<f64>,
    pub other: Vector3<f64>,
}

impl CategoryTorque {
    pub fn get(&self, category: TorqueCategory) -> &Vector3<f64> {
        match category {
            TorqueCategory::ReactionWheel => &self.reaction_wheel,
            TorqueCategory::Rcs => &self.rcs,
            TorqueCategory::ControlSurface => &self.control_surface,
            TorqueCategory::Gimbal => &self.gimbal,
            TorqueCategory::Other => &self.other,
        }
    }

    pub fn total(&self) -> Vector3<f64> {
        self.reaction_wheel + self.rcs + self.control_surface + self.gimbal + self.other
    }
}

/// Result of one aggregation pass. `torque_available` and `reaction_speed`
/// are always componentwise >= 0 and finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TorqueReport {
    pub torque_available: Vector3<f64>,
    pub reaction_speed: Vector3<f64>,
    pub categories: CategoryTorque,
    pub failures: Vec<ContributorFailure>,
}

/// Sums module contributions per category. The result does not depend on
/// part or module order beyond floating point rounding: reordering inputs
/// can move the last bits of a sum, so compare reports with a tolerance
/// unless the inputs are exactly representable.
#[derive(Debug, Clone, Default)]
pub struct TorqueAggregator {
    reaction_wheel: DirectionalAccumulator,
    rcs: DirectionalAccumulator,
    control_surface: DirectionalAccumulator,
    gimbal: DirectionalAccumulator,
    other: DirectionalAccumulator,
    reaction_speed: DirectionalAccumulator,
    failures: Vec<ContributorFailure>,
}

impl TorqueAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn accumulator_mut(&mut self, category: TorqueCategory) -> &mut DirectionalAccumulator {
        match category {
            TorqueCategory::ReactionWheel => &mut self.reaction_wheel,
            TorqueCategory::Rcs => &mut self.rcs,
            TorqueCategory::ControlSurface => &mut self.control_surface,
            TorqueCategory::Gimbal => &mut self.gimbal,
            TorqueCategory::Other => &mut self.other,
        }
    }

    pub fn add_part(&mut self, part: &PartActuators, context: &TorqueContext) {
        for (index, module) in part.modules.iter().enumerate() {
            if !module.enabled {
                continue;
            }
            let category = module.capability.category();
            match module.capability.contribution(context, part.shielded) {
                Ok(contribution) => {
                    self.accumulator_mut(category).merge(&contribution.torque);
                    self.reaction_speed.merge(&contribution.reaction);
                }
                Err(error) => {
                    warn!(
                        part_id = part.id,
                        part = part.name,
                        module = %module.name,
                        %category,
                        "can't get potential torque: {error}"
                    );
                    self.failures.push(ContributorFailure {
                        part_id: part.id,
                        part_name: part.name.to_string(),
                        module_index: index,
                        module_name: module.name.clone(),
                        category,
                        error,
                    });
                }
            }
        }
    }

    pub fn finish(self) -> TorqueReport {
        let categories = CategoryTorque {
            reaction_wheel: self.reaction_wheel.max(),
            rcs: self.rcs.max(),
            control_surface: self.control_surface.max(),
            gimbal: self.gimbal.max(),
            other: self.other.max(),
        };
        let torque_available = categories.total();

        let reaction_speed = if torque_available.norm_squared() > 0.0 {
            self.reaction_speed
                .max()
                .component_mul(&utilities::invert_or_zero(&torque_available))
        } else {
            Vector3::zeros()
        };

        TorqueReport {
            torque_available,
            reaction_speed,
            categories,
            failures: self.failures,
        }
    }

    pub fn aggregate<'a, I>(parts: I, context: &TorqueContext) -> TorqueReport
    where
        I: IntoIterator<Item = PartActuators<'a>>,
    {
        let mut aggregator = Self::new();
        for part in parts {
            aggregator.add_part(&part, context);
        }
        aggregator.finish()
    }
}
