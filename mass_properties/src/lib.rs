use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod estimator;
pub use estimator::InertiaTensorEstimator;

#[derive(Debug, Error)]
pub enum MassPropertiesErrors {
    #[error("mass cannot be less than zero")]
    MassLessThanZero,
    #[error("mass must be finite")]
    MassNotFinite,
    #[error("principal inertia cannot be less than zero")]
    InertiaLessThanZero,
    #[error("principal inertia must be finite")]
    InertiaNotFinite,
}

/// Physical state of a part's rigid body for one physics step.
///
/// `principal_inertia` is the diagonal inertia tensor in the body's principal
/// axes, which are rotated from the part's transform by `inertia_rotation`.
/// `position` is the body's center of mass in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub mass: f64,
    pub principal_inertia: Vector3<f64>,
    pub inertia_rotation: UnitQuaternion<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub position: Vector3<f64>,
}

impl RigidBody {
    pub fn new(mass: f64, principal_inertia: Vector3<f64>) -> Result<Self, MassPropertiesErrors> {
        if !mass.is_finite() {
            return Err(MassPropertiesErrors::MassNotFinite);
        }
        if mass < 0.0 {
            return Err(MassPropertiesErrors::MassLessThanZero);
        }
        if principal_inertia.iter().any(|i| !i.is_finite()) {
            return Err(MassPropertiesErrors::InertiaNotFinite);
        }
        if principal_inertia.iter().any(|i| *i < 0.0) {
            return Err(MassPropertiesErrors::InertiaLessThanZero);
        }
        Ok(Self {
            mass,
            principal_inertia,
            inertia_rotation: UnitQuaternion::identity(),
            rotation: UnitQuaternion::identity(),
            position: Vector3::zeros(),
        })
    }

    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_inertia_rotation(mut self, inertia_rotation: UnitQuaternion<f64>) -> Self {
        self.inertia_rotation = inertia_rotation;
        self
    }
}

/// Full 3x3 inertia tensor. Symmetric by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertiaTensor(Matrix3<f64>);

impl Default for InertiaTensor {
    fn default() -> Self {
        Self::zeros()
    }
}

impl InertiaTensor {
    pub fn zeros() -> Self {
        Self(Matrix3::zeros())
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    /// The diagonal terms, i.e. the moments of inertia about each axis.
    /// Products of inertia are not included.
    pub fn diagonal(&self) -> Vector3<f64> {
        self.0.diagonal()
    }

    /// Adds a principal-axes tensor after rotating it by `rotation`:
    /// R * diag(principal) * R^T
    pub fn add_principal(&mut self, principal: &Vector3<f64>, rotation: &UnitQuaternion<f64>) {
        let r = rotation.to_rotation_matrix();
        let r = r.matrix();
        self.0 += r * Matrix3::from_diagonal(principal) * r.transpose();
    }

    /// Parallel-axis contribution of a point mass at `offset`:
    /// m * |r|^2 * I - m * r r^T
    pub fn add_point_mass(&mut self, mass: f64, offset: &Vector3<f64>) {
        self.0 += Matrix3::from_diagonal_element(mass * offset.norm_squared());
        let outer = offset * offset.transpose();
        self.0 -= outer * mass;
    }
}
