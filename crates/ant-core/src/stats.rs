//! Population statistics for logging and external displays.

use crate::types::Stage;
use serde::{Deserialize, Serialize};

/// Cumulative event counters kept by a simulation across its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounters {
    /// Eggs laid through mating
    pub sexual_births: u64,
    /// Eggs laid through asexual reproduction
    pub asexual_births: u64,
    /// Organisms culled with non-positive health
    pub starved_or_killed: u64,
    /// Organisms culled for reaching old age
    pub died_of_age: u64,
    /// Food cells eaten
    pub food_eaten: u64,
    /// Attacks that found a target
    pub attacks: u64,
}

impl EventCounters {
    pub fn births(&self) -> u64 {
        self.sexual_births + self.asexual_births
    }

    pub fn deaths(&self) -> u64 {
        self.starved_or_killed + self.died_of_age
    }
}

/// Snapshot of the live population after a tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub tick: u64,
    pub population: usize,
    pub eggs: usize,
    pub adults: usize,
    pub old: usize,
    pub mean_health: f64,
    pub mean_age: f64,
    pub oldest_age: u64,
    pub materialized_cells: usize,
    pub counters: EventCounters,
}

impl PopulationStats {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }

    /// Fold one organism into the snapshot
    pub fn record(&mut self, stage: Stage, health: i32, age: u64) {
        let n = self.population as f64;
        let new_n = n + 1.0;

        // Incremental means
        self.mean_health = (self.mean_health * n + health as f64) / new_n;
        self.mean_age = (self.mean_age * n + age as f64) / new_n;
        self.oldest_age = self.oldest_age.max(age);

        match stage {
            Stage::Egg => self.eggs += 1,
            Stage::Adult => self.adults += 1,
            Stage::Old => self.old += 1,
        }

        self.population += 1;
    }
}
