//! Driver loop around a simulation: periodic food spawning, metrics and
//! early stop on extinction.

use crate::simulation::Simulation;
use ant_core::{PopulationStats, Viewport};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Outcome of a call to [`Session::run`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks_run: u64,
    /// True when the run stopped early because no organism was left
    pub extinct: bool,
    pub final_stats: PopulationStats,
}

pub struct Session {
    simulation: Simulation,
    /// Region that receives periodic food
    viewport: Viewport,
}

impl Session {
    pub fn new(simulation: Simulation, viewport: Viewport) -> Self {
        Self {
            simulation,
            viewport,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Resolve one tick, then drop food into the viewport if this tick is a
    /// spawn tick
    pub fn step(&mut self) {
        self.simulation.tick();

        let world = &self.simulation.config().world;
        let interval = world.food_spawn_interval;
        let count = world.food_spawn_count;
        if interval > 0 && self.simulation.current_tick() % interval == 0 {
            self.simulation.spawn_food(self.viewport, count);
        }
    }

    /// Run up to `ticks` ticks, logging metrics every `stats_interval` ticks
    /// (never when zero). Stops early once the population is empty.
    #[instrument(skip(self), fields(seed = self.simulation.config().seed))]
    pub fn run(&mut self, ticks: u64, stats_interval: u64) -> RunSummary {
        info!(
            population = self.simulation.organisms().len(),
            "Starting simulation run"
        );

        let mut ticks_run = 0;
        let mut extinct = false;
        while ticks_run < ticks {
            self.step();
            ticks_run += 1;

            if stats_interval > 0 && ticks_run % stats_interval == 0 {
                self.simulation.emit_population_metrics();
            }

            if self.simulation.organisms().is_empty() {
                extinct = true;
                info!(tick = self.simulation.current_tick(), "Population extinct");
                break;
            }
        }

        let final_stats = self.simulation.stats();
        info!(
            ticks_run,
            extinct,
            population = final_stats.population,
            births = final_stats.counters.births(),
            deaths = final_stats.counters.deaths(),
            "Simulation run completed"
        );

        RunSummary {
            ticks_run,
            extinct,
            final_stats,
        }
    }
}
