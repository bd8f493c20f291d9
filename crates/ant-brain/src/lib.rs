//! Neural genomes for organisms.
//!
//! A genome is the full parameter set of a small feed-forward network that
//! maps an organism's 3x3 neighborhood onto scores over its action set.
//! The crate provides:
//! - Random initialization and shape validation
//! - The forward pass, softmax, and action sampling
//! - Crossover and noise mutation for reproduction
//! - JSON import/export for sharing genomes

pub mod action;
pub mod genome;
pub mod network;
pub mod mutation;
pub mod validation;

pub use action::{Action, ADULT_ACTIONS, ELDER_ACTIONS};
pub use genome::{Genome, DEFAULT_LAYER_SIZES, SENSOR_INPUTS};
pub use network::{sample_action, sample_index, sigmoid, softmax};
pub use mutation::{Mutator, MutationConfig};
pub use validation::validate_genome;
