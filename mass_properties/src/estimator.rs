use nalgebra::{UnitQuaternion, Vector3};

use crate::{InertiaTensor, RigidBody};

/// Builds a composite inertia tensor about a common center of mass using the
/// parallel-axis theorem. Principal tensors are rotated into the frame given
/// by `frame_rotation` (world -> frame is its inverse). Offsets from the
/// center of mass use the same frame unless [`Self::with_offset_frame`]
/// says otherwise.
///
/// Nothing is cached between steps; build a new estimator each step.
#[derive(Debug, Clone)]
pub struct InertiaTensorEstimator {
    frame_inverse: UnitQuaternion<f64>,
    offset_frame_inverse: UnitQuaternion<f64>,
    center_of_mass: Vector3<f64>,
    tensor: InertiaTensor,
}

impl InertiaTensorEstimator {
    pub fn new(frame_rotation: &UnitQuaternion<f64>, center_of_mass: Vector3<f64>) -> Self {
        let frame_inverse = frame_rotation.inverse();
        Self {
            frame_inverse,
            offset_frame_inverse: frame_inverse,
            center_of_mass,
            tensor: InertiaTensor::zeros(),
        }
    }

    /// Express center-of-mass offsets in `offset_rotation` axes. The host
    /// reports rigid-body inertia axes pitch-corrected relative to the
    /// vessel's reference transform, while angular velocity and torque use
    /// the reference transform itself; offsets follow the latter.
    pub fn with_offset_frame(mut self, offset_rotation: &UnitQuaternion<f64>) -> Self {
        self.offset_frame_inverse = offset_rotation.inverse();
        self
    }

    pub fn add(&mut self, body: &RigidBody) {
        // principal axes -> part -> world -> frame
        let rotation = self.frame_inverse * body.rotation * body.inertia_rotation;
        self.tensor.add_principal(&body.principal_inertia, &rotation);

        let offset = self.offset_frame_inverse * (body.position - self.center_of_mass);
        self.tensor.add_point_mass(body.mass, &offset);
    }

    pub fn extend<'a, I>(&mut self, bodies: I)
    where
        I: IntoIterator<Item = &'a RigidBody>,
    {
        for body in bodies {
            self.add(body);
        }
    }

    pub fn tensor(&self) -> &InertiaTensor {
        &self.tensor
    }

    pub fn finish(self) -> InertiaTensor {
        self.tensor
    }

    /// Convenience for a whole body list. Returns the full tensor; callers
    /// that only want moments of inertia take `.diagonal()`.
    pub fn estimate<'a, I>(
        bodies: I,
        frame_rotation: &UnitQuaternion<f64>,
        center_of_mass: Vector3<f64>,
    ) -> InertiaTensor
    where
        I: IntoIterator<Item = &'a RigidBody>,
    {
        let mut estimator = Self::new(frame_rotation, center_of_mass);
        estimator.extend(bodies);
        estimator.finish()
    }
}
