//! Headless runner for the ant world.

mod telemetry;

use ant_brain::Genome;
use ant_core::{RunnerConfig, SimulationConfig};
use ant_world::{Organism, Session, Simulation};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Simulation configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Runner configuration (JSON)
    #[arg(long)]
    runner_config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(short, long)]
    ticks: Option<u64>,

    /// World seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Genome file used to seed the initial population
    #[arg(long)]
    seed_genome: Option<PathBuf>,

    /// Write the oldest survivor's genome here when the run ends
    #[arg(long)]
    export_genome: Option<PathBuf>,

    /// Ticks between population statistics (0 disables them)
    #[arg(long)]
    stats_interval: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.json_logs)?;

    let (sim_config, runner) = load_configs(&args)?;
    info!(
        seed = sim_config.seed,
        ticks = runner.ticks,
        ants = sim_config.population.ant_density,
        max_ants = sim_config.population.max_ants,
        "Starting ant world"
    );

    let simulation = match &runner.seed_genome {
        Some(path) => {
            let genome = read_genome(path)?;
            Simulation::with_seed_genome(sim_config, genome)?
        }
        None => Simulation::new(sim_config)?,
    };

    let mut session = Session::new(simulation, runner.viewport);
    let summary = session.run(runner.ticks, runner.stats_interval);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(path) = &runner.export_genome {
        match oldest_survivor(session.simulation().organisms()) {
            Some(organism) => {
                std::fs::write(path, organism.genome().to_json()?)
                    .with_context(|| format!("writing genome to {}", path.display()))?;
                info!(
                    organism_id = %organism.id,
                    age = organism.age,
                    generation = organism.generation,
                    path = %path.display(),
                    "Exported genome"
                );
            }
            None => warn!("No survivors, nothing to export"),
        }
    }

    Ok(())
}

/// Merge config files with command line overrides
fn load_configs(args: &Args) -> Result<(SimulationConfig, RunnerConfig)> {
    let mut sim_config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    let mut runner = match &args.runner_config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<RunnerConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => RunnerConfig::default(),
    };

    if let Some(seed) = args.seed {
        sim_config.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        runner.ticks = ticks;
    }
    if let Some(interval) = args.stats_interval {
        runner.stats_interval = interval;
    }
    if args.seed_genome.is_some() {
        runner.seed_genome = args.seed_genome.clone();
    }
    if args.export_genome.is_some() {
        runner.export_genome = args.export_genome.clone();
    }

    sim_config.validate()?;
    Ok((sim_config, runner))
}

fn read_genome(path: &Path) -> Result<Genome> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading genome {}", path.display()))?;
    let genome = Genome::try_from(text.as_str())
        .with_context(|| format!("importing genome {}", path.display()))?;
    info!(
        path = %path.display(),
        layers = genome.num_layers(),
        parameters = genome.parameter_count(),
        "Loaded seed genome"
    );
    Ok(genome)
}

/// Oldest organism; ties go to the one with more offspring
fn oldest_survivor(organisms: &[Organism]) -> Option<&Organism> {
    organisms
        .iter()
        .max_by_key(|organism| (organism.age, organism.offspring))
}
