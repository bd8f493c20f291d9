//! Shape validation for genomes.

use crate::genome::Genome;
use ant_core::{Error, Result};

/// Validate that a genome is well-formed and reads `input_width` inputs.
///
/// Every layer must have one bias per neuron, at least one neuron, and rows
/// as wide as the previous layer (or the input, for layer 0).
pub fn validate_genome(genome: &Genome, input_width: usize) -> Result<()> {
    if genome.weights.is_empty() {
        return Err(Error::ShapeMismatch {
            layer: 0,
            expected: 1,
            found: 0,
        });
    }

    if genome.weights.len() != genome.biases.len() {
        return Err(Error::ShapeMismatch {
            layer: genome.weights.len().min(genome.biases.len()),
            expected: genome.weights.len(),
            found: genome.biases.len(),
        });
    }

    let mut width = input_width;
    for (idx, (rows, biases)) in genome.weights.iter().zip(&genome.biases).enumerate() {
        validate_layer(rows, biases, width, idx)?;
        width = rows.len();
    }

    Ok(())
}

fn validate_layer(rows: &[Vec<f32>], biases: &[f32], width: usize, idx: usize) -> Result<()> {
    if rows.is_empty() {
        return Err(Error::ShapeMismatch {
            layer: idx,
            expected: 1,
            found: 0,
        });
    }

    if rows.len() != biases.len() {
        return Err(Error::ShapeMismatch {
            layer: idx,
            expected: rows.len(),
            found: biases.len(),
        });
    }

    if let Some(row) = rows.iter().find(|row| row.len() != width) {
        return Err(Error::ShapeMismatch {
            layer: idx,
            expected: width,
            found: row.len(),
        });
    }

    Ok(())
}
