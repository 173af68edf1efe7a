//! Genetic Algorithm over three-circle configurations.
//!
//! Each individual is a [`Configuration`]. A generation is scored, the top
//! individuals survive unchanged (elitism), and the rest of the next
//! generation is bred with tournament selection, uniform per-slot crossover
//! and occasional positional mutation.

use crate::error::{CallbackError, Error, Result};
use crate::generator::random_configuration;
use crate::geometry::{score, Configuration, Parameters, CIRCLE_COUNT};
use crate::solver::{ProgressInfo, RunContext, Strategy};
use rand::Rng;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the genetic algorithm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GaConfig {
    /// Population size.
    pub population_size: usize,
    /// Maximum number of generations.
    pub max_generations: u32,
    /// Probability that an offspring is mutated (0.0 - 1.0).
    pub mutation_rate: f64,
    /// Number of elite individuals to preserve each generation.
    pub elite_count: usize,
    /// Tournament size for selection.
    pub tournament_size: usize,
    /// Per-slot probability of moving a circle during mutation.
    pub gene_mutation_rate: f64,
    /// Mutation strength; offsets span `[-strength/2, strength/2)`.
    pub mutation_strength: f64,
    /// Progress is reported every this many generations.
    pub report_interval: u32,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 200,
            mutation_rate: 0.1,
            elite_count: 5,
            tournament_size: 3,
            gene_mutation_rate: 0.3,
            mutation_strength: 10.0,
            report_interval: 10,
        }
    }
}

impl GaConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// Sets the maximum generations.
    pub fn with_max_generations(mut self, gen: u32) -> Self {
        self.max_generations = gen;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size.max(1);
        self
    }

    /// Sets the per-slot mutation probability.
    pub fn with_gene_mutation_rate(mut self, rate: f64) -> Self {
        self.gene_mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation strength.
    pub fn with_mutation_strength(mut self, strength: f64) -> Self {
        self.mutation_strength = strength;
        self
    }

    /// Sets the progress reporting interval.
    pub fn with_report_interval(mut self, interval: u32) -> Self {
        self.report_interval = interval.max(1);
        self
    }

    /// Checks that the configuration can drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::InvalidConfig("population_size must be at least 1".into()));
        }
        if self.tournament_size == 0 {
            return Err(Error::InvalidConfig("tournament_size must be at least 1".into()));
        }
        if self.elite_count > self.population_size {
            return Err(Error::InvalidConfig(format!(
                "elite_count ({}) exceeds population_size ({})",
                self.elite_count, self.population_size
            )));
        }
        if self.report_interval == 0 {
            return Err(Error::InvalidConfig("report_interval must be at least 1".into()));
        }
        Ok(())
    }
}

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// The best individual found.
    pub best: Configuration,
    /// Score of `best`.
    pub best_score: f64,
    /// Generations completed.
    pub generations: u32,
    /// Best score recorded at each generation.
    pub history: Vec<f64>,
    /// Whether the run stopped on a cancellation request.
    pub cancelled: bool,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Tournament selection: the fittest of `size` uniform draws with replacement.
///
/// Later draws replace the incumbent only when strictly fitter.
pub fn tournament_select<'a, R: Rng>(
    population: &'a [Configuration],
    fitness: &[f64],
    size: usize,
    rng: &mut R,
) -> &'a Configuration {
    let mut best_idx = rng.gen_range(0..population.len());

    for _ in 1..size {
        let idx = rng.gen_range(0..population.len());
        if fitness[idx] > fitness[best_idx] {
            best_idx = idx;
        }
    }

    &population[best_idx]
}

/// Uniform crossover: each slot's position comes from either parent with
/// equal probability. Radii always come from `params`.
pub fn crossover<R: Rng>(
    parent1: &Configuration,
    parent2: &Configuration,
    params: &Parameters,
    rng: &mut R,
) -> Configuration {
    let mut positions = [(0.0, 0.0); CIRCLE_COUNT];
    for (slot, position) in positions.iter_mut().enumerate() {
        let donor = if rng.gen::<f64>() < 0.5 {
            &parent1[slot]
        } else {
            &parent2[slot]
        };
        *position = (donor.x, donor.y);
    }
    Configuration::from_positions(params, positions)
}

/// Moves each circle with probability `gene_rate` by independent offsets in
/// `[-strength/2, strength/2)`.
pub fn mutate<R: Rng>(individual: &mut Configuration, gene_rate: f64, strength: f64, rng: &mut R) {
    for slot in 0..CIRCLE_COUNT {
        if rng.gen::<f64>() < gene_rate {
            let dx = (rng.gen::<f64>() - 0.5) * strength;
            let dy = (rng.gen::<f64>() - 0.5) * strength;
            individual[slot] = individual[slot].translated(dx, dy);
        }
    }
}

/// Index and score of the first highest-scoring entry.
fn fittest(fitness: &[f64]) -> (usize, f64) {
    fitness
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_idx, best), (idx, &f)| {
            if f > best {
                (idx, f)
            } else {
                (best_idx, best)
            }
        })
}

/// Runs the genetic algorithm.
///
/// `initial_best` seeds the incumbent (e.g. the controller's best so far);
/// a generation's champion replaces it only when strictly better. When no
/// incumbent exists the first generation's champion is taken even if it is
/// infeasible, so the run always yields a configuration.
///
/// Cancellation is checked once per generation. Every `report_interval`
/// generations (starting at 0) `progress` receives the generation, the
/// ceiling and the best score so far.
pub fn evolve<R, F>(
    params: &Parameters,
    config: &GaConfig,
    ctx: &RunContext,
    initial_best: Option<(Configuration, f64)>,
    rng: &mut R,
    mut progress: F,
) -> Result<GaResult>
where
    R: Rng,
    F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
{
    config.validate()?;

    let size = config.population_size;
    let elite = config.elite_count.min(size);

    let (mut best, mut best_score) = match initial_best {
        Some((incumbent, incumbent_score)) => (Some(incumbent), incumbent_score),
        None => (None, f64::NEG_INFINITY),
    };

    let mut population: Vec<Configuration> =
        (0..size).map(|_| random_configuration(params, rng)).collect();

    log::debug!(
        "GA start: population={}, generations={}, incumbent={:.4}",
        size,
        config.max_generations,
        best_score
    );

    let mut history = Vec::with_capacity(config.max_generations as usize);
    let mut generation = 0u32;

    while generation < config.max_generations {
        if ctx.is_cancelled() {
            break;
        }

        let fitness: Vec<f64> = population.iter().map(|ind| score(ind, params)).collect();

        let (champion, champion_score) = fittest(&fitness);
        if champion_score > best_score || best.is_none() {
            best = Some(population[champion]);
            best_score = champion_score;
        }
        history.push(best_score);

        // Stable sort keeps earlier individuals first among equal scores.
        let mut ranked: Vec<usize> = (0..size).collect();
        ranked.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));

        let mut next = Vec::with_capacity(size);
        next.extend(ranked.iter().take(elite).map(|&idx| population[idx]));

        while next.len() < size {
            let parent1 = tournament_select(&population, &fitness, config.tournament_size, rng);
            let parent2 = tournament_select(&population, &fitness, config.tournament_size, rng);
            let mut child = crossover(parent1, parent2, params, rng);

            if rng.gen::<f64>() < config.mutation_rate {
                mutate(
                    &mut child,
                    config.gene_mutation_rate,
                    config.mutation_strength,
                    rng,
                );
            }

            next.push(child);
        }

        population = next;

        if generation % config.report_interval == 0 {
            log::debug!("GA Generation {}: best_score={:.4}", generation, best_score);
            ctx.report(
                &mut progress,
                ProgressInfo::new()
                    .with_iteration(generation, config.max_generations)
                    .with_best_score(best_score)
                    .with_strategy(Strategy::GeneticAlgorithm),
            )?;
        }

        generation += 1;
    }

    let best = match best {
        Some(best) => best,
        None => {
            // Cancelled (or zero generations) before any scoring happened.
            let fitness: Vec<f64> = population.iter().map(|ind| score(ind, params)).collect();
            let (idx, idx_score) = fittest(&fitness);
            best_score = idx_score;
            population[idx]
        }
    };

    let cancelled = ctx.is_cancelled() && generation < config.max_generations;
    log::info!(
        "GA finished: generations={}, best_score={:.4}, cancelled={}",
        generation,
        best_score,
        cancelled
    );

    Ok(GaResult {
        best,
        best_score,
        generations: generation,
        history,
        cancelled,
        elapsed: ctx.elapsed(),
    })
}
