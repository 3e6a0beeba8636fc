mod simplex;

#[doc(inline)]
pub use simplex::SimplexOptimizer;

use serde::{Deserialize, Serialize};

/// Termination criteria of the optimizer, checked every iteration.
/// A criterion set to `None` is disabled, `max_iterations` is always active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopCriteria {
    /// Maximum number of iterations, 0 only evaluates the initial point
    pub max_iterations: usize,
    /// Stop when the score spread of the simplex drops below this value
    #[serde(default)]
    pub absolute_score_difference: Option<f64>,
    /// Stop when the score spread of the simplex relative to the best score drops below this value
    #[serde(default)]
    pub relative_score_difference: Option<f64>,
    /// Stop as soon as a score this good is reached
    #[serde(default)]
    pub stop_score: Option<f64>,
}

impl Default for StopCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            absolute_score_difference: None,
            relative_score_difference: Some(1e-12),
            stop_score: None,
        }
    }
}

/// Reason the optimizer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxIterations,
    AbsoluteScoreDifference,
    RelativeScoreDifference,
    StopScore,
}

/// Best point found by an optimization run
#[derive(Debug, Clone, PartialEq)]
pub struct Optimum {
    pub point: Vec<f64>,
    pub score: f64,
    pub n_iterations: usize,
    pub stop_reason: StopReason,
}
