//! Three-circle placement CLI

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use u_circlepack_core::{
    CirclePackingOptimizer, Configuration, GaConfig, Parameters, ProgressInfo, SaConfig,
    SolveResult, Strategy, PAIRS,
};

#[derive(Parser)]
#[command(name = "circlepack")]
#[command(about = "Place three circles inside a container, maximizing their minimum clearance")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize with simulated annealing
    Anneal {
        #[command(flatten)]
        problem: ProblemArgs,

        /// Iteration ceiling (overrides the config file)
        #[arg(long)]
        iterations: Option<u32>,
    },

    /// Optimize with the genetic algorithm
    Evolve {
        #[command(flatten)]
        problem: ProblemArgs,

        /// Generation ceiling (overrides the config file)
        #[arg(long)]
        generations: Option<u32>,

        /// Population size (overrides the config file)
        #[arg(long)]
        population: Option<usize>,
    },

    /// Validate and score a configuration given as x0 y0 x1 y1 x2 y2
    Check {
        #[command(flatten)]
        geometry: GeometryArgs,

        /// Circle centers
        #[arg(
            long,
            required = true,
            num_args = 6,
            value_names = ["X0", "Y0", "X1", "Y1", "X2", "Y2"],
            allow_negative_numbers = true
        )]
        positions: Vec<f64>,
    },

    /// Print the default run configuration as JSON
    Defaults,
}

#[derive(Args)]
struct GeometryArgs {
    /// Container radius
    #[arg(short = 'R', long)]
    container_radius: Option<f64>,

    /// Radii of the three circles
    #[arg(short, long, num_args = 3, value_names = ["R1", "R2", "R3"])]
    radii: Option<Vec<f64>>,

    /// Minimum gap between circles and the container edge
    #[arg(short, long)]
    margin: Option<f64>,

    /// JSON run configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ProblemArgs {
    #[command(flatten)]
    geometry: GeometryArgs,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop once the best clearance reaches this value
    #[arg(short, long)]
    target: Option<f64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

/// Contents of a `--config` file. Missing sections use defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RunConfig {
    parameters: Parameters,
    annealing: SaConfig,
    genetic: GaConfig,
}

impl RunConfig {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}

impl GeometryArgs {
    /// Loads the config file (if any) and applies command-line overrides.
    fn resolve(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };

        if let Some(radius) = self.container_radius {
            config.parameters.container_radius = radius;
        }
        if let Some(radii) = &self.radii {
            let [r1, r2, r3] = radii[..] else {
                bail!("expected exactly three radii, got {}", radii.len());
            };
            config.parameters.radii = [r1, r2, r3];
        }
        if let Some(margin) = self.margin {
            config.parameters.margin = margin;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Anneal {
            problem,
            iterations,
        } => {
            let mut config = problem.geometry.resolve()?;
            if let Some(iterations) = iterations {
                config.annealing.max_iterations = iterations;
            }
            run(Strategy::SimulatedAnnealing, &problem, config)?;
        }

        Commands::Evolve {
            problem,
            generations,
            population,
        } => {
            let mut config = problem.geometry.resolve()?;
            if let Some(generations) = generations {
                config.genetic.max_generations = generations;
            }
            if let Some(population) = population {
                config.genetic.population_size = population;
            }
            run(Strategy::GeneticAlgorithm, &problem, config)?;
        }

        Commands::Check {
            geometry,
            positions,
        } => {
            let params = geometry.resolve()?.parameters;
            let [x0, y0, x1, y1, x2, y2] = positions[..] else {
                bail!("expected six coordinates, got {}", positions.len());
            };
            let configuration =
                Configuration::from_positions(&params, [(x0, y0), (x1, y1), (x2, y2)]);
            check(&params, &configuration);
        }

        Commands::Defaults => {
            println!("{}", serde_json::to_string_pretty(&RunConfig::default())?);
        }
    }

    Ok(())
}

fn run(strategy: Strategy, problem: &ProblemArgs, config: RunConfig) -> anyhow::Result<()> {
    let mut optimizer = match problem.seed {
        Some(seed) => CirclePackingOptimizer::with_seed(seed),
        None => CirclePackingOptimizer::new(),
    }
    .with_sa_config(config.annealing)
    .with_ga_config(config.genetic);
    optimizer.apply_parameters(config.parameters);

    let cancel = optimizer.cancel_handle();
    let target = problem.target;

    let result = optimizer.solve(strategy, |info: &ProgressInfo| {
        log::info!(
            "{} {}/{} ({:.0}%): best clearance {:.4}",
            info.strategy.name(),
            info.iteration,
            info.total_iterations,
            info.progress_percent() * 100.0,
            info.best_score
        );
        if let Some(target) = target {
            if info.best_score >= target {
                log::info!("target clearance {} reached, stopping", target);
                cancel.cancel();
            }
        }
        Ok(())
    })?;

    if problem.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(optimizer.parameters(), &result);
    }
    Ok(())
}

fn print_result(params: &Parameters, result: &SolveResult) {
    println!("Strategy:    {}", result.strategy.name());
    println!(
        "Container:   R={} margin={} radii={:?}",
        params.container_radius, params.margin, params.radii
    );
    println!(
        "Iterations:  {}{}",
        result.iterations,
        if result.cancelled { " (stopped early)" } else { "" }
    );
    println!("Time:        {} ms", result.computation_time_ms);
    if result.is_feasible() {
        println!("Clearance:   {:.4}", result.best_score);
    } else {
        println!("Clearance:   none (no feasible placement found)");
    }
    print_circles(&result.configuration);
}

fn check(params: &Parameters, configuration: &Configuration) {
    let valid = u_circlepack_core::is_valid(configuration, params);
    println!("Valid:       {}", valid);
    for (slot, circle) in configuration.iter().enumerate() {
        let slack = params.container_radius - params.margin - circle.center_distance() - circle.r;
        println!("  circle {} margin slack {:.4}", slot, slack);
    }
    for ((i, j), gap) in PAIRS.iter().zip(configuration.pair_clearances()) {
        println!("  pair ({}, {}) clearance {:.4}", i, j, gap);
    }
    println!("Score:       {:.4}", u_circlepack_core::score(configuration, params));
}

fn print_circles(configuration: &Configuration) {
    for (slot, circle) in configuration.iter().enumerate() {
        println!(
            "  circle {}: x={:>9.4} y={:>9.4} r={}",
            slot, circle.x, circle.y, circle.r
        );
    }
}
