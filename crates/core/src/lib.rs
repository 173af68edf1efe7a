//! # U-CirclePack Core
//!
//! Places three fixed-size circles inside a container circle so that every
//! circle keeps a margin to the container edge, no two circles overlap, and
//! the smallest edge-to-edge clearance between circles is as large as
//! possible.
//!
//! ## Core Components
//!
//! - **Geometry**: [`Circle`], [`Configuration`], [`Parameters`], with the
//!   [`is_valid`], [`clearance`] and [`score`] functions
//! - **Generators**: [`random_configuration`], [`triangle_configuration`],
//!   [`perturb`]
//! - **SA**: [`anneal`] with [`SaConfig`] - Metropolis search over single-circle moves
//! - **GA**: [`evolve`] with [`GaConfig`] - elitist tournament GA
//! - **Controller**: [`CirclePackingOptimizer`] - parameter state, best solution, cancellation
//!
//! ## Optimization Strategies
//!
//! | Strategy | Default budget | Description |
//! |----------|----------------|-------------|
//! | `SimulatedAnnealing` | 5000 iterations | Geometric cooling from T=100 to 0.1 |
//! | `GeneticAlgorithm` | 200 generations x 50 | Elitism 5, tournament 3, uniform crossover |
//!
//! Both are heuristics: they give no optimality guarantee.
//!
//! ## Example
//!
//! ```rust
//! use u_circlepack_core::{CirclePackingOptimizer, GaConfig, Strategy};
//!
//! let mut optimizer = CirclePackingOptimizer::with_seed(42)
//!     .with_ga_config(GaConfig::new().with_max_generations(50));
//! optimizer.set_parameters(100.0, 20.0, 15.0, 25.0, 5.0);
//!
//! let result = optimizer
//!     .solve(Strategy::GeneticAlgorithm, |progress| {
//!         println!("generation {}: {:.2}", progress.iteration, progress.best_score);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert!(result.is_feasible());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod ga;
pub mod generator;
pub mod geometry;
pub mod optimizer;
pub mod result;
pub mod sa;
#[cfg(feature = "serde")]
mod serde_score;
pub mod solver;

// Re-exports
pub use error::{CallbackError, Error, Result};
pub use ga::{crossover, evolve, mutate, tournament_select, GaConfig, GaResult};
pub use generator::{
    perturb, random_configuration, reset_configuration, triangle_configuration, MAX_ATTEMPTS,
};
pub use geometry::{
    clearance, is_contained, is_valid, score, Circle, Configuration, Parameters, CIRCLE_COUNT,
    PAIRS,
};
pub use optimizer::CirclePackingOptimizer;
pub use result::SolveResult;
pub use sa::{accept, anneal, anneal_from, SaConfig, SaResult};
pub use solver::{CancelToken, ProgressInfo, RunContext, Strategy};
