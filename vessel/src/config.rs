use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigErrors {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Tunables for the per-step estimators. Fields left out of a config file
/// take their default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Pitch applied to the reference rotation to get the body frame the MOI
    /// is reported in. The host's reference transform has `up` along the
    /// nose; -90 brings it into a forward-facing body frame.
    pub pitch_correction_deg: f64,
    /// Lever distance above which precision mode divides RCS thrust by the
    /// lever arm.
    pub rcs_lever_threshold: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            pitch_correction_deg: -90.0,
            rcs_lever_threshold: 1.0,
        }
    }
}

impl EstimatorConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigErrors> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }
}
