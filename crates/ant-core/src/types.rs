//! Core type definitions for the simulation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an organism instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganismId(pub Uuid);

impl OrganismId {
    /// Build an id from a caller-owned random stream so that seeded runs
    /// hand out the same ids every time.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
    }
}

impl fmt::Display for OrganismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 2D position in the world. The world is unbounded, so there is no wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.to_delta();
        self.add(dx, dy)
    }

    /// Orthogonal neighbors in scan order: up, down, left, right
    pub fn orthogonal(&self) -> [Position; 4] {
        Direction::all().map(|d| self.step(d))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Direction for movement. Screen coordinates: up decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }
}

/// Classification of a single grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Food,
    Terrain,
}

impl Cell {
    /// Value this cell contributes to an organism's sensor vector
    pub fn sensor_value(&self) -> f32 {
        match self {
            Cell::Food => 1.0,
            Cell::Terrain => 0.0,
            Cell::Empty => -1.0,
        }
    }

    pub fn is_passable(&self) -> bool {
        !matches!(self, Cell::Terrain)
    }
}

/// Lifecycle stage of an organism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Egg,
    Adult,
    Old,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Egg => "egg",
            Stage::Adult => "adult",
            Stage::Old => "old",
        };
        f.write_str(name)
    }
}

/// Axis-aligned rectangle of world coordinates, `x..x+width` by `y..y+height`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport of the given size centered on the origin
    pub fn centered(width: u32, height: u32) -> Self {
        Self {
            x: -((width / 2) as i32),
            y: -((height / 2) as i32),
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, pos: Position) -> bool {
        let dx = pos.x as i64 - self.x as i64;
        let dy = pos.y as i64 - self.y as i64;
        dx >= 0 && dy >= 0 && dx < self.width as i64 && dy < self.height as i64
    }

    /// Uniformly random position inside the viewport. Callers must check
    /// `is_empty` first.
    /// Offsets past `i32::MAX` clamp to the last representable coordinate,
    /// which still lies inside the viewport.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        let x = offset_coord(self.x, rng.gen_range(0..self.width));
        let y = offset_coord(self.y, rng.gen_range(0..self.height));
        Position::new(x, y)
    }
}

fn offset_coord(origin: i32, offset: u32) -> i32 {
    (origin as i64 + offset as i64).min(i32::MAX as i64) as i32
}

/// Display color derived from a genome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
