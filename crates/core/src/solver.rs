//! Run control shared by the search loops: progress reporting, cancellation
//! and the per-run context.

use crate::error::{CallbackError, Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Optimization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    /// Simulated Annealing over single-circle moves.
    #[default]
    SimulatedAnnealing,
    /// Genetic Algorithm with elitism and tournament selection.
    GeneticAlgorithm,
}

impl Strategy {
    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::SimulatedAnnealing => "simulated-annealing",
            Strategy::GeneticAlgorithm => "genetic-algorithm",
        }
    }
}

/// Progress information passed to callbacks during a run.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgressInfo {
    /// Current iteration (SA) or generation (GA).
    pub iteration: u32,
    /// Iteration or generation ceiling.
    pub total_iterations: u32,
    /// Best score found so far (negative infinity while infeasible).
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_score::score"))]
    pub best_score: f64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Strategy producing this report.
    pub strategy: Strategy,
}

impl ProgressInfo {
    /// Creates a new progress info with default values.
    pub fn new() -> Self {
        Self {
            best_score: f64::NEG_INFINITY,
            ..Default::default()
        }
    }

    /// Sets the iteration info.
    pub fn with_iteration(mut self, current: u32, total: u32) -> Self {
        self.iteration = current;
        self.total_iterations = total;
        self
    }

    /// Sets the best score.
    pub fn with_best_score(mut self, score: f64) -> Self {
        self.best_score = score;
        self
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = elapsed.as_millis() as u64;
        self
    }

    /// Sets the reporting strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Calculates the progress percentage (0.0 to 1.0).
    pub fn progress_percent(&self) -> f64 {
        if self.total_iterations > 0 {
            self.iteration as f64 / self.total_iterations as f64
        } else {
            0.0
        }
    }
}

/// Cooperative cancellation flag.
///
/// Clones share the same flag, so a handle taken before a run (or captured
/// by the progress callback) can stop it. The search loops read the flag once
/// per iteration or generation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Clears a previous request.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }
}

/// State owned by a single search invocation.
///
/// Created by whoever starts the run and passed by reference into the loop,
/// so a cancellation request always belongs to exactly one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    cancel: CancelToken,
    started: Instant,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    /// Creates a context with its own cancellation token.
    pub fn new() -> Self {
        Self::with_cancel_token(CancelToken::new())
    }

    /// Creates a context observing an existing token.
    pub fn with_cancel_token(cancel: CancelToken) -> Self {
        Self {
            cancel,
            started: Instant::now(),
        }
    }

    /// Returns a handle that cancels this run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Records a cancellation request.
    pub fn request_cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true if the run should stop at the next checkpoint.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Time since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Hands control to the progress callback.
    ///
    /// This is the loop's only scheduling point: the callback may render,
    /// request cancellation or fail, in which case the run is aborted.
    pub(crate) fn report<F>(&self, progress: &mut F, info: ProgressInfo) -> Result<()>
    where
        F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
    {
        progress(&info.with_elapsed(self.elapsed())).map_err(Error::Callback)
    }
}
