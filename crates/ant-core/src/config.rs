//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::Viewport;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// World generation and periodic food parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Probability that a freshly generated cell holds food (0.0 to 1.0)
    pub food_density: f32,
    /// Probability that a freshly generated cell is terrain (0.0 to 1.0)
    pub terrain_density: f32,
    /// Ticks between food spawning events (0 disables spawning)
    pub food_spawn_interval: u64,
    /// Number of food cells placed per spawning event
    pub food_spawn_count: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            food_density: 0.05,
            terrain_density: 0.1,
            food_spawn_interval: 10,
            food_spawn_count: 20,
        }
    }
}

/// Population size and lifecycle timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of adults placed when the simulation is built
    pub ant_density: usize,
    /// Reproduction is refused once the live population reaches this size
    pub max_ants: usize,
    /// Age in ticks at which an adult turns old
    pub ant_lifespan: u64,
    /// Per-organism lifespan jitter, drawn from `-jitter..=jitter` at birth
    pub lifespan_jitter: u64,
    /// Ticks an egg spends before hatching
    pub egg_to_adult_ticks: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            ant_density: 100,
            max_ants: 500,
            ant_lifespan: 1000,
            lifespan_jitter: 20,
            egg_to_adult_ticks: 50,
        }
    }
}

/// Health amounts applied by actions and upkeep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Upper bound for every health gain
    pub max_ant_health: i32,
    /// Starting health of a freshly laid egg
    pub egg_health: i32,
    /// Health lost by every organism each tick
    pub upkeep: i32,
    /// Health restored by eating a food cell
    pub eat_gain: i32,
    /// Health restored by sleeping
    pub sleep_gain: i32,
    /// Damage dealt to a non-egg target
    pub attack_damage: i32,
    /// Damage dealt to an egg target
    pub egg_attack_damage: i32,
    /// Health the attacker gains from attacking an egg
    pub egg_attack_gain: i32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_ant_health: 100,
            egg_health: 100,
            upkeep: 1,
            eat_gain: 30,
            sleep_gain: 2,
            attack_damage: 10,
            egg_attack_damage: 50,
            egg_attack_gain: 20,
        }
    }
}

/// Full simulation configuration. Fixed for the lifetime of a `Simulation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// World configuration
    pub world: WorldConfig,
    /// Population configuration
    pub population: PopulationConfig,
    /// Health configuration
    pub health: HealthConfig,
    /// Width of the uniform noise added to crossed-over and mutated genomes
    pub genome_noise: f32,
    /// Region the initial population is scattered over
    pub spawn_area: Viewport,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world: WorldConfig::default(),
            population: PopulationConfig::default(),
            health: HealthConfig::default(),
            genome_noise: 0.1,
            spawn_area: Viewport::centered(64, 64),
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that would otherwise make the simulation meaningless
    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        for (name, value) in [
            ("food_density", world.food_density),
            ("terrain_density", world.terrain_density),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if world.food_density + world.terrain_density > 1.0 {
            return Err(Error::Config(format!(
                "food_density + terrain_density must not exceed 1, got {}",
                world.food_density + world.terrain_density
            )));
        }

        if self.health.max_ant_health <= 0 {
            return Err(Error::Config("max_ant_health must be positive".to_string()));
        }

        if !self.genome_noise.is_finite() || self.genome_noise < 0.0 {
            return Err(Error::Config(format!(
                "genome_noise must be a non-negative number, got {}",
                self.genome_noise
            )));
        }

        if self.population.ant_density > 0 && self.spawn_area.is_empty() {
            return Err(Error::Config(
                "spawn_area must have a non-zero size when ant_density > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Headless runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Number of ticks to run
    pub ticks: u64,
    /// Region food is spawned into
    pub viewport: Viewport,
    /// Ticks between population statistics log lines (0 disables them)
    pub stats_interval: u64,
    /// Genome file used to seed the initial population
    pub seed_genome: Option<PathBuf>,
    /// Where to write the oldest survivor's genome when the run ends
    pub export_genome: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            ticks: 10_000,
            viewport: Viewport::centered(64, 64),
            stats_interval: 100,
            seed_genome: None,
            export_genome: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population.ant_density, 100);
        assert_eq!(config.health.max_ant_health, 100);
        assert!(config.health.egg_attack_damage > config.health.attack_damage);

        let runner = RunnerConfig::default();
        assert_eq!(runner.ticks, 10_000);
        assert!(runner.seed_genome.is_none());
    }

    #[test]
    fn test_rejects_bad_densities() {
        let mut config = SimulationConfig::default();
        config.world.food_density = 0.7;
        config.world.terrain_density = 0.6;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.world.food_density = -0.1;
        config.world.terrain_density = 0.1;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_empty_spawn_area() {
        let config = SimulationConfig {
            spawn_area: Viewport::new(0, 0, 0, 10),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            spawn_area: Viewport::new(0, 0, 0, 10),
            population: PopulationConfig {
                ant_density: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let json = r#"{ "seed": 9, "world": { "food_density": 0.2 } }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.world.food_density, 0.2);
        assert_eq!(config.world.terrain_density, 0.1);
        assert_eq!(config.population.max_ants, 500);
    }
}
