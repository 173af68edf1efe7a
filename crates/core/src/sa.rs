//! Simulated Annealing over three-circle configurations.
//!
//! The search walks the configuration space with [`perturb`] moves and the
//! Metropolis criterion: improvements are always accepted, a worse candidate
//! is accepted with probability `exp(delta / T)`. The temperature decays
//! geometrically down to a floor.
//!
//! An infeasible start is escaped automatically: moving from a score of
//! negative infinity to any finite score gives `delta = +inf`.

use crate::error::{CallbackError, Error, Result};
use crate::generator::{perturb, random_configuration, DEFAULT_MOVE_AMOUNT};
use crate::geometry::{score, Configuration, Parameters};
use crate::solver::{ProgressInfo, RunContext, Strategy};
use rand::Rng;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for simulated annealing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SaConfig {
    /// Iteration ceiling.
    pub max_iterations: u32,
    /// Starting temperature.
    pub initial_temperature: f64,
    /// Multiplicative cooling factor applied every iteration.
    pub cooling_rate: f64,
    /// Temperature floor.
    pub min_temperature: f64,
    /// Neighbor move amount (offsets span `[-amount/2, amount/2)`).
    pub move_amount: f64,
    /// Progress is reported every this many iterations.
    pub report_interval: u32,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            initial_temperature: 100.0,
            cooling_rate: 0.995,
            min_temperature: 0.1,
            move_amount: DEFAULT_MOVE_AMOUNT,
            report_interval: 50,
        }
    }
}

impl SaConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the iteration ceiling.
    pub fn with_max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the initial temperature.
    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    /// Sets the cooling rate.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the temperature floor.
    pub fn with_min_temperature(mut self, temperature: f64) -> Self {
        self.min_temperature = temperature;
        self
    }

    /// Sets the neighbor move amount.
    pub fn with_move_amount(mut self, amount: f64) -> Self {
        self.move_amount = amount;
        self
    }

    /// Sets the progress reporting interval.
    pub fn with_report_interval(mut self, interval: u32) -> Self {
        self.report_interval = interval.max(1);
        self
    }

    /// Checks that the configuration can drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.report_interval == 0 {
            return Err(Error::InvalidConfig("report_interval must be at least 1".into()));
        }
        if self.min_temperature.is_nan() || self.min_temperature <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_temperature must be positive, got {}",
                self.min_temperature
            )));
        }
        if self.initial_temperature.is_nan() || self.initial_temperature <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "initial_temperature must be positive, got {}",
                self.initial_temperature
            )));
        }
        Ok(())
    }
}

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct SaResult {
    /// Best configuration seen.
    pub best: Configuration,
    /// Score of `best` (negative infinity if nothing feasible was found).
    pub best_score: f64,
    /// Iterations performed.
    pub iterations: u32,
    /// Candidates accepted.
    pub accepted: u32,
    /// Temperature when the loop stopped.
    pub final_temperature: f64,
    /// Best score after each iteration.
    pub history: Vec<f64>,
    /// Whether the run stopped on a cancellation request.
    pub cancelled: bool,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Metropolis acceptance test for a score change of `delta`.
///
/// Improvements (including `+inf`, leaving an infeasible state) are always
/// accepted without drawing. Otherwise the move is accepted with probability
/// `exp(delta / temperature)`, which is zero for `-inf` (becoming
/// infeasible). A NaN delta, from two infeasible states, is rejected.
pub fn accept<R: Rng>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    delta > 0.0 || rng.gen::<f64>() < (delta / temperature).exp()
}

/// Runs simulated annealing from a fresh random configuration.
///
/// Cancellation is checked at the top of every iteration. Every
/// `report_interval` iterations (starting at 0) `progress` receives the
/// iteration, the ceiling and the best score so far; an error from the
/// callback aborts the run.
pub fn anneal<R, F>(
    params: &Parameters,
    config: &SaConfig,
    ctx: &RunContext,
    rng: &mut R,
    progress: F,
) -> Result<SaResult>
where
    R: Rng,
    F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
{
    config.validate()?;
    let start = random_configuration(params, rng);
    anneal_from(start, params, config, ctx, rng, progress)
}

/// Runs simulated annealing from `start`, which may be infeasible.
pub fn anneal_from<R, F>(
    start: Configuration,
    params: &Parameters,
    config: &SaConfig,
    ctx: &RunContext,
    rng: &mut R,
    mut progress: F,
) -> Result<SaResult>
where
    R: Rng,
    F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
{
    config.validate()?;

    let mut current = start;
    let mut current_score = score(&current, params);
    let mut best = current;
    let mut best_score = current_score;

    log::debug!(
        "SA start: iterations={}, initial_score={:.4}",
        config.max_iterations,
        current_score
    );

    let mut temperature = config.initial_temperature;
    let mut history = Vec::with_capacity(config.max_iterations as usize);
    let mut accepted = 0u32;
    let mut iteration = 0u32;

    while iteration < config.max_iterations {
        if ctx.is_cancelled() {
            break;
        }

        let candidate = perturb(&current, config.move_amount, rng);
        let candidate_score = score(&candidate, params);

        if accept(candidate_score - current_score, temperature, rng) {
            current = candidate;
            current_score = candidate_score;
            accepted += 1;
        }

        if current_score > best_score {
            best = current;
            best_score = current_score;
        }
        history.push(best_score);

        temperature = (temperature * config.cooling_rate).max(config.min_temperature);

        if iteration % config.report_interval == 0 {
            log::debug!(
                "SA Iteration {}: temp={:.4}, best_score={:.4}",
                iteration,
                temperature,
                best_score
            );
            ctx.report(
                &mut progress,
                ProgressInfo::new()
                    .with_iteration(iteration, config.max_iterations)
                    .with_best_score(best_score)
                    .with_strategy(Strategy::SimulatedAnnealing),
            )?;
        }

        iteration += 1;
    }

    let cancelled = ctx.is_cancelled() && iteration < config.max_iterations;
    log::info!(
        "SA finished: iterations={}, accepted={}, best_score={:.4}, cancelled={}",
        iteration,
        accepted,
        best_score,
        cancelled
    );

    Ok(SaResult {
        best,
        best_score,
        iterations: iteration,
        accepted,
        final_temperature: temperature,
        history,
        cancelled,
        elapsed: ctx.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::is_valid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn no_progress(_: &ProgressInfo) -> std::result::Result<(), CallbackError> {
        Ok(())
    }

    #[test]
    fn test_anneal_finds_feasible_solution() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(42);
        let result = anneal(
            &params,
            &SaConfig::default(),
            &RunContext::new(),
            &mut rng,
            no_progress,
        )
        .unwrap();

        assert_eq!(result.iterations, 5000);
        assert!(result.best_score.is_finite());
        assert!(result.best_score >= 0.0);
        assert!(is_valid(&result.best, &params));
        assert_eq!(result.history.len(), 5000);
        assert!(!result.cancelled);
    }

    #[test]
    fn test_history_is_non_decreasing() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(11);
        let config = SaConfig::default().with_max_iterations(1500);
        let result = anneal(&params, &config, &RunContext::new(), &mut rng, no_progress).unwrap();

        for pair in result.history.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_temperature_floor() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(5);
        let result = anneal(
            &params,
            &SaConfig::default(),
            &RunContext::new(),
            &mut rng,
            no_progress,
        )
        .unwrap();

        // 100 * 0.995^5000 is far below the floor.
        assert_eq!(result.final_temperature, 0.1);
    }

    #[test]
    fn test_progress_reported_every_interval() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = Vec::new();
        anneal(
            &params,
            &SaConfig::default().with_max_iterations(500),
            &RunContext::new(),
            &mut rng,
            |info: &ProgressInfo| {
                seen.push((info.iteration, info.total_iterations));
                Ok(())
            },
        )
        .unwrap();

        let expected: Vec<(u32, u32)> = (0..500).step_by(50).map(|i| (i, 500)).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_cancel_from_callback_stops_run() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(2);
        let ctx = RunContext::new();
        let token = ctx.cancel_token();

        let result = anneal(
            &params,
            &SaConfig::default(),
            &ctx,
            &mut rng,
            |info: &ProgressInfo| {
                if info.iteration >= 100 {
                    token.cancel();
                }
                Ok(())
            },
        )
        .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.iterations, 101);
        assert!(is_valid(&result.best, &params));
    }

    #[test]
    fn test_accept_leaving_infeasible_state() {
        let mut rng = StdRng::seed_from_u64(31);
        let delta = 4.0 - f64::NEG_INFINITY;
        assert_eq!(delta, f64::INFINITY);
        for _ in 0..100 {
            assert!(accept(delta, 0.1, &mut rng));
        }
    }

    #[test]
    fn test_reject_between_infeasible_states() {
        let mut rng = StdRng::seed_from_u64(32);
        let delta = f64::NEG_INFINITY - f64::NEG_INFINITY;
        assert!(delta.is_nan());
        for _ in 0..100 {
            assert!(!accept(delta, 100.0, &mut rng));
        }
    }

    #[test]
    fn test_reject_becoming_infeasible() {
        let mut rng = StdRng::seed_from_u64(33);
        let delta = f64::NEG_INFINITY - 12.0;
        for _ in 0..100 {
            assert!(!accept(delta, 100.0, &mut rng));
        }
    }

    #[test]
    fn test_accept_probability_follows_metropolis() {
        let mut rng = StdRng::seed_from_u64(34);
        let temperature = 10.0;

        // exp(0) == 1: equal scores are always accepted.
        assert!((0..100).all(|_| accept(0.0, temperature, &mut rng)));

        // exp(-T ln 2 / T) == 0.5
        let delta = -temperature * std::f64::consts::LN_2;
        let trials = 20_000;
        let hits = (0..trials).filter(|_| accept(delta, temperature, &mut rng)).count();
        let rate = hits as f64 / trials as f64;
        assert!((rate - 0.5).abs() < 0.02, "acceptance rate {}", rate);
    }

    #[test]
    fn test_anneal_escapes_infeasible_start() {
        let params = Parameters::default();
        // Slots 0 and 1 overlap by 0.5.
        let start = Configuration::from_positions(&params, [(-34.5, 0.0), (0.0, 0.0), (60.0, 0.0)]);
        assert_eq!(score(&start, &params), f64::NEG_INFINITY);

        let mut rng = StdRng::seed_from_u64(35);
        let result = anneal_from(
            start,
            &params,
            &SaConfig::default(),
            &RunContext::new(),
            &mut rng,
            no_progress,
        )
        .unwrap();

        assert!(result.best_score.is_finite());
        assert!(is_valid(&result.best, &params));
        assert!(result.accepted > 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(0);
        let config = SaConfig::default().with_min_temperature(0.0);
        let err = anneal(&params, &config, &RunContext::new(), &mut rng, no_progress).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
