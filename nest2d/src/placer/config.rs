use std::f64::consts::{FRAC_PI_2, PI};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::geometry::geo_enums::Alignment;
use crate::util::NestError;

/// Selects the placement strategy and its configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlacerConfig {
    Nfp(NfpConfig),
    BottomLeft(BottomLeftConfig),
}

impl Default for PlacerConfig {
    fn default() -> Self {
        PlacerConfig::Nfp(NfpConfig::default())
    }
}

impl PlacerConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            PlacerConfig::Nfp(c) => c.validate(),
            PlacerConfig::BottomLeft(c) => c.validate(),
        }
    }
}

/// Configuration of the [`NfpPlacer`](crate::placer::NfpPlacer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfpConfig {
    /// Candidate rotations in radians, a single rotation of 0 if empty
    pub rotations: Vec<f64>,
    /// Reference point of the bin placements are snapped to
    pub alignment: Alignment,
    /// Reference point of the bin the pile gravitates towards
    pub starting_point: Alignment,
    /// Discretization accuracy of circular geometry in `(0, 1]`
    pub accuracy: f64,
    /// Also consider placements inside the convex holes of placed items
    pub explore_holes: bool,
    /// Evaluate the rotations concurrently
    pub parallel: bool,
    /// Refine the translation of the best candidate with the optimizer
    pub refine_offset: bool,
    /// Refine the rotation of the best candidate with the optimizer
    pub refine_rotation: bool,
    /// Bottom-left attempt when no feasible placement was found
    pub fallback: Option<BottomLeftConfig>,
}

impl Default for NfpConfig {
    fn default() -> Self {
        Self {
            rotations: vec![0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2],
            alignment: Alignment::Center,
            starting_point: Alignment::Center,
            accuracy: 0.65,
            explore_holes: false,
            parallel: true,
            refine_offset: true,
            refine_rotation: false,
            fallback: None,
        }
    }
}

impl NfpConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.accuracy > 0.0 && self.accuracy <= 1.0) {
            bail!(NestError::InvalidConfig(format!(
                "accuracy must lie in (0, 1], got {}",
                self.accuracy
            )));
        }
        if let Some(r) = self.rotations.iter().find(|r| !r.is_finite()) {
            bail!(NestError::InvalidConfig(format!("rotation {r} is not finite")));
        }
        if let Some(fallback) = &self.fallback {
            fallback.validate()?;
        }
        Ok(())
    }
}

/// Configuration of the [`BottomLeftPlacer`](crate::placer::BottomLeftPlacer)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BottomLeftConfig {
    /// Minimum distance between items, the run's spacing applies if it is larger
    pub min_obj_distance: f64,
    /// Step size of the sliding grid
    pub epsilon: f64,
    /// Try all four right-angle rotations
    pub allow_rotations: bool,
}

impl Default for BottomLeftConfig {
    fn default() -> Self {
        Self {
            min_obj_distance: 0.0,
            epsilon: 1.0,
            allow_rotations: false,
        }
    }
}

impl BottomLeftConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            bail!(NestError::InvalidConfig(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if !(self.min_obj_distance.is_finite() && self.min_obj_distance >= 0.0) {
            bail!(NestError::InvalidConfig(format!(
                "min_obj_distance must be non-negative, got {}",
                self.min_obj_distance
            )));
        }
        Ok(())
    }
}
