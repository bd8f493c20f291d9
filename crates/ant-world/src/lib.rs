//! World simulation engine.
//!
//! This crate implements the unbounded grid world where ants live, eat,
//! fight and breed, and the tick loop that resolves their decisions.

pub mod grid;
pub mod organism;
pub mod session;
pub mod simulation;

pub use grid::Grid;
pub use organism::{Occupancy, Organism};
pub use session::{RunSummary, Session};
pub use simulation::Simulation;
