//! Rigid transforms in the host engine's axis convention.
//!
//! The host uses +Z as `forward`, +Y as `up` and +X as `right`. A vessel's
//! reference transform points its `up` axis along the nose, so attitude code
//! usually applies a pitch correction before treating it as a body frame.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            translation,
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation,
        }
    }

    /// Local +Z in world space.
    pub fn forward(&self) -> Vector3<f64> {
        self.rotation * Vector3::z()
    }

    /// Local +Y in world space.
    pub fn up(&self) -> Vector3<f64> {
        self.rotation * Vector3::y()
    }

    /// Local +X in world space.
    pub fn right(&self) -> Vector3<f64> {
        self.rotation * Vector3::x()
    }

    /// Rotates a world direction into this transform's local axes. Translation
    /// is ignored.
    pub fn inverse_transform_direction(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse_transform_vector(v)
    }

    pub fn transform_direction(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.transform_vector(v)
    }

    pub fn transform_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.transform_vector(p) + self.translation
    }
}

/// Rotation about the local X axis by `degrees`, matching the host's
/// `Euler(degrees, 0, 0)`.
pub fn pitch(degrees: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), degrees.to_radians())
}

/// Applies a local pitch correction to `rotation`.
pub fn with_pitch_correction(rotation: &UnitQuaternion<f64>, degrees: f64) -> UnitQuaternion<f64> {
    rotation * pitch(degrees)
}
