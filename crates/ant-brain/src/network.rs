//! Forward pass and action sampling.

use crate::genome::Genome;
use rand::Rng;

/// Logistic activation
pub fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

/// Numerically stable softmax: the max score is subtracted before exponentiating
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Walk the cumulative distribution with a draw from `[0, 1)`.
///
/// Returns the first index at which the remaining draw drops to zero or
/// below, or the last index when rounding leaves a positive remainder.
pub fn sample_index(probabilities: &[f32], draw: f32) -> usize {
    let mut remaining = draw;
    for (i, p) in probabilities.iter().enumerate() {
        remaining -= p;
        if remaining <= 0.0 {
            return i;
        }
    }
    probabilities.len().saturating_sub(1)
}

/// Draw once from `rng` and sample an index from the distribution
pub fn sample_action<R: Rng + ?Sized>(probabilities: &[f32], rng: &mut R) -> usize {
    sample_index(probabilities, rng.gen::<f32>())
}

impl Genome {
    /// Run the network on `input` and return the raw score vector.
    ///
    /// The input width is checked when a genome is built or imported, so a
    /// mismatch here is a bug rather than bad data.
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        debug_assert_eq!(input.len(), self.input_width(), "sensor width mismatch");

        let mut activations = input.to_vec();
        for (rows, biases) in self.weights.iter().zip(&self.biases) {
            activations = rows
                .iter()
                .zip(biases)
                .map(|(row, bias)| {
                    let dot: f32 = row.iter().zip(&activations).map(|(w, x)| w * x).sum();
                    sigmoid(dot + bias)
                })
                .collect();
        }
        activations
    }

    /// Forward pass, softmax and sampling in one step
    pub fn decide<R: Rng + ?Sized>(&self, input: &[f32], rng: &mut R) -> usize {
        let scores = self.forward(input);
        let probabilities = softmax(&scores);
        sample_action(&probabilities, rng)
    }
}
