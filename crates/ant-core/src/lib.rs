//! Core types and utilities for the Ant-Life artificial-life simulation.

pub mod types;
pub mod config;
pub mod error;
pub mod stats;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use stats::*;
