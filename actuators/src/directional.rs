use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::TorquePair;

/// Sums signed per-axis contributions into separate positive and negative
/// halves. Both halves hold magnitudes and are always componentwise >= 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionalAccumulator {
    positive: Vector3<f64>,
    negative: Vector3<f64>,
}

impl DirectionalAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `v` by sign per axis. Non-finite components are ignored.
    pub fn add(&mut self, v: &Vector3<f64>) {
        for i in 0..3 {
            let x = v[i];
            if !x.is_finite() {
                continue;
            }
            if x >= 0.0 {
                self.positive[i] += x;
            } else {
                self.negative[i] -= x;
            }
        }
    }

    pub fn add_pair(&mut self, pair: &TorquePair) {
        self.add(&pair.positive);
        self.add(&pair.negative);
    }

    pub fn merge(&mut self, other: &DirectionalAccumulator) {
        self.positive += other.positive;
        self.negative += other.negative;
    }

    pub fn positive(&self) -> &Vector3<f64> {
        &self.positive
    }

    pub fn negative(&self) -> &Vector3<f64> {
        &self.negative
    }

    /// Componentwise max of the two halves.
    pub fn max(&self) -> Vector3<f64> {
        utilities::component_max(&self.positive, &self.negative)
    }

    pub fn is_zero(&self) -> bool {
        self.positive == Vector3::zeros() && self.negative == Vector3::zeros()
    }
}
