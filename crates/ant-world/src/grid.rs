//! Lazily generated, unbounded 2D grid.

use ant_core::{Cell, Position, WorldConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// An unbounded grid whose cells are generated on first access.
///
/// Each cell is rolled from its own ChaCha stream keyed by the world seed and
/// the coordinates, so the content of a coordinate does not depend on the
/// order in which cells are first visited. Once generated a cell is cached
/// and only changes through `consume_food` and `set_food`.
#[derive(Debug, Clone)]
pub struct Grid {
    seed: u64,
    food_density: f32,
    terrain_density: f32,
    cells: HashMap<Position, Cell>,
}

impl Grid {
    pub fn new(seed: u64, food_density: f32, terrain_density: f32) -> Self {
        Self {
            seed,
            food_density,
            terrain_density,
            cells: HashMap::new(),
        }
    }

    /// Create a grid from world configuration
    pub fn from_config(config: &WorldConfig, seed: u64) -> Self {
        Self::new(seed, config.food_density, config.terrain_density)
    }

    /// Classify a coordinate, generating it on first access
    pub fn classify(&mut self, pos: Position) -> Cell {
        if let Some(cell) = self.cells.get(&pos) {
            return *cell;
        }
        let cell = self.generate(pos);
        self.cells.insert(pos, cell);
        cell
    }

    /// Read a coordinate without generating it
    pub fn peek(&self, pos: Position) -> Option<Cell> {
        self.cells.get(&pos).copied()
    }

    /// Turn food into empty ground. Returns whether food was eaten.
    pub fn consume_food(&mut self, pos: Position) -> bool {
        if self.classify(pos) == Cell::Food {
            self.cells.insert(pos, Cell::Empty);
            true
        } else {
            false
        }
    }

    /// Force a coordinate to hold food, whatever it held before
    pub fn set_food(&mut self, pos: Position) {
        self.cells.insert(pos, Cell::Food);
    }

    /// Number of coordinates generated so far
    pub fn materialized(&self) -> usize {
        self.cells.len()
    }

    /// Iterator over all generated cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells.iter().map(|(pos, cell)| (*pos, *cell))
    }

    fn generate(&self, pos: Position) -> Cell {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(((pos.x as u32 as u64) << 32) | pos.y as u32 as u64);
        let roll = rng.gen::<f32>();

        if roll < self.food_density {
            Cell::Food
        } else if roll < self.food_density + self.terrain_density {
            Cell::Terrain
        } else {
            Cell::Empty
        }
    }
}
