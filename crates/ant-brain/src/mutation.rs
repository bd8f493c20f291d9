//! Mutation and crossover operators for genomes.

use crate::genome::Genome;
use ant_core::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Width of the uniform noise band; values move by at most `noise / 2`
    pub noise: f32,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self { noise: 0.1 }
    }
}

pub struct Mutator {
    config: MutationConfig,
}

impl Mutator {
    pub fn new(config: MutationConfig) -> Self {
        Self { config }
    }

    /// Add independent uniform noise to every weight and bias in place
    pub fn mutate<R: Rng + ?Sized>(&self, genome: &mut Genome, rng: &mut R) {
        let half = self.config.noise / 2.0;
        if half <= 0.0 {
            return;
        }
        for value in genome.params_mut() {
            *value += rng.gen_range(-half..=half);
        }
    }

    /// Per-layer crossover: even layers come from `parent_a`, odd layers from
    /// `parent_b`, then noise is applied to the whole child.
    ///
    /// Both parents must share the same shape.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        parent_a: &Genome,
        parent_b: &Genome,
        rng: &mut R,
    ) -> Result<Genome> {
        if !parent_a.same_shape(parent_b) {
            let layer = parent_a
                .shape()
                .iter()
                .zip(parent_b.shape())
                .position(|(a, b)| *a != b)
                .unwrap_or_else(|| parent_a.num_layers().min(parent_b.num_layers()));
            return Err(Error::ShapeMismatch {
                layer,
                expected: parent_a.parameter_count(),
                found: parent_b.parameter_count(),
            });
        }

        let mut weights = Vec::with_capacity(parent_a.num_layers());
        let mut biases = Vec::with_capacity(parent_a.num_layers());
        for layer in 0..parent_a.num_layers() {
            let source = if layer % 2 == 0 { parent_a } else { parent_b };
            weights.push(source.weights[layer].clone());
            biases.push(source.biases[layer].clone());
        }

        let mut child = Genome { weights, biases };
        self.mutate(&mut child, rng);
        Ok(child)
    }
}
