//! Organism state and management.

use crate::grid::Grid;
use ant_brain::{Action, Genome, SENSOR_INPUTS};
use ant_core::{HealthConfig, OrganismId, PopulationConfig, Position, Rgb, Stage};
use rand::Rng;
use std::collections::HashMap;

/// Sensor value for a neighborhood cell holding another organism
const OCCUPIED: f32 = 2.0;

/// An organism in the simulation
#[derive(Debug, Clone)]
pub struct Organism {
    pub id: OrganismId,
    pub position: Position,
    pub health: i32,
    pub age: u64,
    pub stage: Stage,
    pub stage_age: u64,
    /// Age at which this adult turns old, jitter included
    pub lifespan: u64,
    /// Number of ancestors along the longest parent line
    pub generation: u32,
    pub offspring: u32,
    genome: Genome,
    color: Rgb,
}

impl Organism {
    pub fn new(
        id: OrganismId,
        position: Position,
        stage: Stage,
        health: i32,
        lifespan: u64,
        genome: Genome,
    ) -> Self {
        let color = genome.color();
        Self {
            id,
            position,
            health,
            age: 0,
            stage,
            stage_age: 0,
            lifespan,
            generation: 0,
            offspring: 0,
            genome,
            color,
        }
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Replace the genome and recompute the derived color
    pub fn set_genome(&mut self, genome: Genome) {
        self.color = genome.color();
        self.genome = genome;
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Restore health without exceeding `max`
    pub fn heal(&mut self, amount: i32, max: i32) {
        self.health = self.health.saturating_add(amount).min(max);
    }

    pub fn damage(&mut self, amount: i32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn move_to(&mut self, new_position: Position) {
        self.position = new_position;
    }

    /// Advance one tick: age, upkeep, and stage transition.
    ///
    /// Returns the new stage when a transition happened.
    pub fn tick(&mut self, population: &PopulationConfig, health: &HealthConfig) -> Option<Stage> {
        self.age += 1;
        self.stage_age += 1;
        self.damage(health.upkeep);

        let next = match self.stage {
            Stage::Egg if self.stage_age >= population.egg_to_adult_ticks => {
                self.health = health.max_ant_health;
                Some(Stage::Adult)
            }
            Stage::Adult if self.age >= self.lifespan => Some(Stage::Old),
            _ => None,
        };

        if let Some(stage) = next {
            self.stage = stage;
            self.stage_age = 0;
        }
        next
    }

    /// Encode the 3x3 neighborhood, row-major from the top-left corner
    pub fn sense(&self, grid: &mut Grid, occupancy: &Occupancy) -> [f32; SENSOR_INPUTS] {
        let mut inputs = [0.0; SENSOR_INPUTS];
        let mut i = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let pos = self.position.add(dx, dy);
                inputs[i] = if occupancy.others_at(pos, self.position) > 0 {
                    OCCUPIED
                } else {
                    grid.classify(pos).sensor_value()
                };
                i += 1;
            }
        }
        inputs
    }

    /// Choose this tick's action. Eggs always return `Action::None` and
    /// consume no randomness.
    pub fn decide_action<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        occupancy: &Occupancy,
        rng: &mut R,
    ) -> Action {
        if self.stage == Stage::Egg {
            return Action::None;
        }
        let inputs = self.sense(grid, occupancy);
        let index = self.genome.decide(&inputs, rng);
        Action::select(self.stage, index)
    }
}

/// Positions of all organisms at a fixed moment, indexed by slot in the
/// population. Slots at one position are stored in population order.
#[derive(Debug, Default)]
pub struct Occupancy {
    slots: HashMap<Position, Vec<usize>>,
}

impl Occupancy {
    pub fn from_organisms(organisms: &[Organism]) -> Self {
        let mut slots: HashMap<Position, Vec<usize>> = HashMap::new();
        for (idx, organism) in organisms.iter().enumerate() {
            slots.entry(organism.position).or_default().push(idx);
        }
        Self { slots }
    }

    /// Population slots at `pos`, in population order
    pub fn at(&self, pos: Position) -> &[usize] {
        self.slots.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record `idx` at `pos`, keeping population order
    pub fn insert(&mut self, pos: Position, idx: usize) {
        let slots = self.slots.entry(pos).or_default();
        if let Err(at) = slots.binary_search(&idx) {
            slots.insert(at, idx);
        }
    }

    pub fn remove(&mut self, pos: Position, idx: usize) {
        if let Some(slots) = self.slots.get_mut(&pos) {
            slots.retain(|&slot| slot != idx);
            if slots.is_empty() {
                self.slots.remove(&pos);
            }
        }
    }

    pub fn relocate(&mut self, idx: usize, from: Position, to: Position) {
        self.remove(from, idx);
        self.insert(to, idx);
    }

    /// Organisms at `pos` other than one standing at `own`
    pub fn others_at(&self, pos: Position, own: Position) -> usize {
        let count = self.at(pos).len();
        if pos == own {
            count.saturating_sub(1)
        } else {
            count
        }
    }
}
