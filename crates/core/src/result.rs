//! Solve result representation.

use crate::ga::GaResult;
use crate::geometry::Configuration;
use crate::sa::SaResult;
use crate::solver::Strategy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of an optimization run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveResult {
    /// Best configuration found.
    pub configuration: Configuration,

    /// Minimum pairwise clearance of `configuration`.
    /// Negative infinity when no feasible configuration was found.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_score::score"))]
    pub best_score: f64,

    /// Strategy used for solving.
    pub strategy: Strategy,

    /// Iterations (SA) or generations (GA) performed.
    pub iterations: u32,

    /// Accepted moves (SA only).
    pub accepted_moves: Option<u32>,

    /// Best score per iteration or generation.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_score::scores"))]
    pub fitness_history: Vec<f64>,

    /// Whether the run was cancelled early.
    pub cancelled: bool,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
}

impl SolveResult {
    /// Returns true if the configuration satisfies every constraint.
    pub fn is_feasible(&self) -> bool {
        self.best_score.is_finite()
    }

    /// Returns true if the run used its full iteration budget.
    pub fn completed_normally(&self) -> bool {
        !self.cancelled
    }

    /// Edge clearance of each circle pair in the result.
    pub fn pair_clearances(&self) -> [f64; 3] {
        self.configuration.pair_clearances()
    }
}

impl From<SaResult> for SolveResult {
    fn from(result: SaResult) -> Self {
        Self {
            configuration: result.best,
            best_score: result.best_score,
            strategy: Strategy::SimulatedAnnealing,
            iterations: result.iterations,
            accepted_moves: Some(result.accepted),
            fitness_history: result.history,
            cancelled: result.cancelled,
            computation_time_ms: result.elapsed.as_millis() as u64,
        }
    }
}

impl From<GaResult> for SolveResult {
    fn from(result: GaResult) -> Self {
        Self {
            configuration: result.best,
            best_score: result.best_score,
            strategy: Strategy::GeneticAlgorithm,
            iterations: result.generations,
            accepted_moves: None,
            fitness_history: result.history,
            cancelled: result.cancelled,
            computation_time_ms: result.elapsed.as_millis() as u64,
        }
    }
}
