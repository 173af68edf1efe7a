//! Optimization controller.
//!
//! [`CirclePackingOptimizer`] owns the problem parameters, the displayed
//! configuration and the best solution found so far. It exposes the two
//! search entry points and a cooperative cancellation switch.

use crate::error::{CallbackError, Result};
use crate::ga::{evolve, GaConfig};
use crate::generator;
use crate::geometry::{self, Configuration, Parameters};
use crate::result::SolveResult;
use crate::sa::{anneal, SaConfig};
use crate::solver::{CancelToken, ProgressInfo, RunContext, Strategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Three-circle placement optimizer.
///
/// Searches take `&mut self`, so one controller runs at most one search at a
/// time. To stop a run from elsewhere, take a [`CancelToken`] with
/// [`cancel_handle`](Self::cancel_handle) or capture one in the progress
/// callback.
///
/// ```rust
/// use u_circlepack_core::CirclePackingOptimizer;
///
/// let mut optimizer = CirclePackingOptimizer::with_seed(7);
/// optimizer.set_parameters(100.0, 20.0, 15.0, 25.0, 5.0);
///
/// let best = optimizer.run_simulated_annealing(|_| Ok(())).unwrap();
/// assert!(optimizer.is_valid(&best));
/// assert!(optimizer.best_score() >= 0.0);
/// ```
#[derive(Debug)]
pub struct CirclePackingOptimizer<R: Rng = StdRng> {
    params: Parameters,
    circles: Configuration,
    best_solution: Option<Configuration>,
    best_score: f64,
    cancel: CancelToken,
    sa_config: SaConfig,
    ga_config: GaConfig,
    rng: R,
}

impl CirclePackingOptimizer<StdRng> {
    /// Creates an optimizer with default parameters and an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates an optimizer whose runs are reproducible for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for CirclePackingOptimizer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> CirclePackingOptimizer<R> {
    /// Creates an optimizer drawing from `rng`.
    pub fn with_rng(rng: R) -> Self {
        let params = Parameters::default();
        Self {
            params,
            circles: Configuration::centered(&params),
            best_solution: None,
            best_score: f64::NEG_INFINITY,
            cancel: CancelToken::new(),
            sa_config: SaConfig::default(),
            ga_config: GaConfig::default(),
            rng,
        }
    }

    /// Replaces the annealing configuration.
    pub fn with_sa_config(mut self, config: SaConfig) -> Self {
        self.sa_config = config;
        self
    }

    /// Replaces the genetic algorithm configuration.
    pub fn with_ga_config(mut self, config: GaConfig) -> Self {
        self.ga_config = config;
        self
    }

    /// Sets container radius, circle radii and margin.
    ///
    /// Always clears the best solution, even if the values are unchanged.
    pub fn set_parameters(
        &mut self,
        container_radius: f64,
        r1: f64,
        r2: f64,
        r3: f64,
        margin: f64,
    ) {
        self.apply_parameters(Parameters::new(container_radius, [r1, r2, r3], margin));
    }

    /// Same as [`set_parameters`](Self::set_parameters) for a prepared set.
    pub fn apply_parameters(&mut self, params: Parameters) {
        self.params = params;
        for (slot, circle) in self.circles.circles.iter_mut().enumerate() {
            circle.r = params.radii[slot];
        }
        self.best_solution = None;
        self.best_score = f64::NEG_INFINITY;
        log::debug!("parameters set: {:?}", params);
    }

    /// Current parameters.
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Configuration last committed by a run (or the initial centered one).
    pub fn circles(&self) -> &Configuration {
        &self.circles
    }

    /// Best configuration found since the parameters were last set.
    pub fn best_solution(&self) -> Option<&Configuration> {
        self.best_solution.as_ref()
    }

    /// Score of [`best_solution`](Self::best_solution), or negative infinity.
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// Annealing configuration.
    pub fn sa_config(&self) -> &SaConfig {
        &self.sa_config
    }

    /// Genetic algorithm configuration.
    pub fn ga_config(&self) -> &GaConfig {
        &self.ga_config
    }

    /// Checks containment and non-overlap under the current parameters.
    pub fn is_valid(&self, config: &Configuration) -> bool {
        geometry::is_valid(config, &self.params)
    }

    /// Minimum pairwise edge clearance; meaningful for valid configurations.
    pub fn clearance(&self, config: &Configuration) -> f64 {
        geometry::clearance(config)
    }

    /// Clearance if valid, negative infinity otherwise.
    pub fn score(&self, config: &Configuration) -> f64 {
        geometry::score(config, &self.params)
    }

    /// Draws a random valid configuration (or the triangle fallback).
    pub fn random_configuration(&mut self) -> Configuration {
        generator::random_configuration(&self.params, &mut self.rng)
    }

    /// Deterministic fallback layout for the current parameters.
    pub fn triangle_configuration(&self) -> Configuration {
        generator::triangle_configuration(&self.params)
    }

    /// Replaces the displayed circles. Radii are forced to the current
    /// parameters; the best solution is untouched.
    pub fn set_circles(&mut self, config: Configuration) {
        let positions = config.circles.map(|c| (c.x, c.y));
        self.circles = Configuration::from_positions(&self.params, positions);
    }

    /// Replaces the displayed circles with a random configuration.
    pub fn randomize(&mut self) -> Configuration {
        self.circles = self.random_configuration();
        self.circles
    }

    /// Moves the displayed circles back to the fixed reset layout.
    pub fn reset_circles(&mut self) -> Configuration {
        self.circles = generator::reset_configuration(&self.params);
        self.circles
    }

    /// Clearance of the displayed circles, or `None` if they are invalid.
    pub fn current_clearance(&self) -> Option<f64> {
        self.is_valid(&self.circles).then(|| geometry::clearance(&self.circles))
    }

    /// Asks the active run to stop at its next checkpoint.
    pub fn request_cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle that cancels whichever run this optimizer starts next.
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Runs simulated annealing and returns the best configuration.
    pub fn run_simulated_annealing<F>(&mut self, progress: F) -> Result<Configuration>
    where
        F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
    {
        self.solve(Strategy::SimulatedAnnealing, progress)
            .map(|result| result.configuration)
    }

    /// Runs the genetic algorithm and returns the best configuration.
    pub fn run_genetic_algorithm<F>(&mut self, progress: F) -> Result<Configuration>
    where
        F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
    {
        self.solve(Strategy::GeneticAlgorithm, progress)
            .map(|result| result.configuration)
    }

    /// Runs `strategy` and returns the full result.
    ///
    /// On completion or cancellation the best configuration is committed to
    /// [`circles`](Self::circles) and [`best_solution`](Self::best_solution).
    /// If the progress callback fails, the error is returned and nothing is
    /// committed.
    pub fn solve<F>(&mut self, strategy: Strategy, progress: F) -> Result<SolveResult>
    where
        F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
    {
        let ctx = self.begin_run();
        log::info!("starting {} run: {:?}", strategy.name(), self.params);

        let result: SolveResult = match strategy {
            Strategy::SimulatedAnnealing => {
                anneal(&self.params, &self.sa_config, &ctx, &mut self.rng, progress)?.into()
            }
            Strategy::GeneticAlgorithm => {
                let incumbent = self.best_solution.map(|best| (best, self.best_score));
                evolve(
                    &self.params,
                    &self.ga_config,
                    &ctx,
                    incumbent,
                    &mut self.rng,
                    progress,
                )?
                .into()
            }
        };

        self.commit(&result);
        Ok(result)
    }

    fn begin_run(&self) -> RunContext {
        // A stop request only applies to the run it was issued during.
        self.cancel.reset();
        RunContext::with_cancel_token(self.cancel.clone())
    }

    fn commit(&mut self, result: &SolveResult) {
        self.circles = result.configuration;
        self.best_solution = Some(result.configuration);
        self.best_score = result.best_score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Circle;

    #[test]
    fn test_defaults() {
        let optimizer = CirclePackingOptimizer::with_seed(1);
        assert_eq!(*optimizer.parameters(), Parameters::default());
        assert!(optimizer.best_solution().is_none());
        assert_eq!(optimizer.best_score(), f64::NEG_INFINITY);
        assert_eq!(optimizer.circles()[2].r, 25.0);
        assert_eq!(optimizer.circles()[2].x, 0.0);
    }

    #[test]
    fn test_set_parameters_updates_radii() {
        let mut optimizer = CirclePackingOptimizer::with_seed(1);
        optimizer.set_parameters(80.0, 10.0, 11.0, 12.0, 2.0);
        assert_eq!(optimizer.parameters().container_radius, 80.0);
        assert_eq!(optimizer.circles()[0].r, 10.0);
        assert_eq!(optimizer.circles()[1].r, 11.0);
        assert_eq!(optimizer.circles()[2].r, 12.0);
    }

    #[test]
    fn test_run_commits_best() {
        let mut optimizer = CirclePackingOptimizer::with_seed(4)
            .with_sa_config(SaConfig::default().with_max_iterations(800));
        let best = optimizer.run_simulated_annealing(|_| Ok(())).unwrap();

        assert_eq!(optimizer.best_solution(), Some(&best));
        assert_eq!(*optimizer.circles(), best);
        assert_eq!(optimizer.best_score(), optimizer.score(&best));
    }

    #[test]
    fn test_ga_starts_from_controller_best() {
        let mut optimizer = CirclePackingOptimizer::with_seed(6)
            .with_ga_config(GaConfig::default().with_max_generations(20));
        optimizer.run_simulated_annealing(|_| Ok(())).unwrap();
        let sa_score = optimizer.best_score();

        optimizer.run_genetic_algorithm(|_| Ok(())).unwrap();
        assert!(optimizer.best_score() >= sa_score);
    }

    #[test]
    fn test_randomize_commits_circles() {
        let mut optimizer = CirclePackingOptimizer::with_seed(21);
        let placed = optimizer.randomize();

        assert_eq!(*optimizer.circles(), placed);
        assert!(optimizer.is_valid(&placed));
        assert_eq!(optimizer.current_clearance(), Some(geometry::clearance(&placed)));
        assert!(optimizer.best_solution().is_none());
    }

    #[test]
    fn test_randomize_infeasible_falls_back() {
        let mut optimizer = CirclePackingOptimizer::with_seed(22);
        optimizer.set_parameters(50.0, 40.0, 40.0, 40.0, 5.0);
        let placed = optimizer.randomize();

        assert_eq!(placed, optimizer.triangle_configuration());
        assert_eq!(optimizer.current_clearance(), None);
    }

    #[test]
    fn test_reset_circles_uses_current_radii() {
        let mut optimizer = CirclePackingOptimizer::with_seed(23);
        optimizer.set_parameters(120.0, 10.0, 12.0, 14.0, 2.0);
        optimizer.randomize();
        let layout = optimizer.reset_circles();

        assert_eq!(*optimizer.circles(), layout);
        assert_eq!((layout[0].x, layout[0].y, layout[0].r), (0.0, -30.0, 10.0));
        assert_eq!((layout[1].x, layout[1].y, layout[1].r), (-30.0, 20.0, 12.0));
        assert_eq!((layout[2].x, layout[2].y, layout[2].r), (30.0, 20.0, 14.0));
        assert!(optimizer.current_clearance().is_some());
    }

    #[test]
    fn test_reset_layout_valid_with_default_radii() {
        let mut optimizer = CirclePackingOptimizer::with_seed(24);
        let layout = optimizer.reset_circles();
        // Slots 1 and 2 sit 60 apart; slot 0 is about 58.3 from either.
        assert!(optimizer.is_valid(&layout));
    }

    #[test]
    fn test_set_circles_forces_canonical_radii() {
        let mut optimizer = CirclePackingOptimizer::with_seed(25);
        let config = Configuration::new([
            Circle::new(-60.0, 0.0, 1.0),
            Circle::new(0.0, 0.0, 2.0),
            Circle::new(60.0, 0.0, 3.0),
        ]);
        optimizer.set_circles(config);

        assert_eq!(optimizer.circles()[0], Circle::new(-60.0, 0.0, 20.0));
        assert_eq!(optimizer.circles()[2], Circle::new(60.0, 0.0, 25.0));
        assert_eq!(optimizer.current_clearance(), Some(20.0));
    }

    #[test]
    fn test_stale_cancel_request_is_cleared() {
        let mut optimizer = CirclePackingOptimizer::with_seed(2)
            .with_sa_config(SaConfig::default().with_max_iterations(300));
        optimizer.request_cancel();

        let result = optimizer
            .solve(Strategy::SimulatedAnnealing, |_| Ok(()))
            .unwrap();
        assert!(!result.cancelled);
        assert_eq!(result.iterations, 300);
    }
}
