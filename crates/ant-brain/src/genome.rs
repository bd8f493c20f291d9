//! Genome structure: layered weights and biases of a feed-forward network.

use crate::network::sigmoid;
use crate::validation::validate_genome;
use ant_core::{Error, Result, Rgb};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Width of the sensor vector: the 3x3 neighborhood around an organism
pub const SENSOR_INPUTS: usize = 9;

/// Neuron count of every layer in a freshly randomized genome, input excluded
pub const DEFAULT_LAYER_SIZES: [usize; 2] = [10, 9];

/// Range random weights and biases are drawn from
const INIT_RANGE: f32 = 1.0;

/// A complete organism genome.
///
/// `weights[layer][neuron]` is the row of incoming weights for one neuron and
/// `biases[layer][neuron]` its bias. Layer `0` reads the sensor vector; every
/// later layer reads the previous layer's outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub(crate) weights: Vec<Vec<Vec<f32>>>,
    pub(crate) biases: Vec<Vec<f32>>,
}

impl Genome {
    /// Random genome with the default topology
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::random_with_layers(SENSOR_INPUTS, &DEFAULT_LAYER_SIZES, rng)
    }

    /// Random genome reading `input_width` values through layers of the given sizes
    pub fn random_with_layers<R: Rng + ?Sized>(
        input_width: usize,
        layer_sizes: &[usize],
        rng: &mut R,
    ) -> Self {
        let mut weights = Vec::with_capacity(layer_sizes.len());
        let mut biases = Vec::with_capacity(layer_sizes.len());
        let mut width = input_width;

        for &neurons in layer_sizes {
            let layer: Vec<Vec<f32>> = (0..neurons)
                .map(|_| {
                    (0..width)
                        .map(|_| rng.gen_range(-INIT_RANGE..INIT_RANGE))
                        .collect()
                })
                .collect();
            let layer_biases: Vec<f32> = (0..neurons)
                .map(|_| rng.gen_range(-INIT_RANGE..INIT_RANGE))
                .collect();

            weights.push(layer);
            biases.push(layer_biases);
            width = neurons;
        }

        Self { weights, biases }
    }

    /// Build a genome from raw parameters, checking that it reads `input_width` inputs
    pub fn from_parts(
        weights: Vec<Vec<Vec<f32>>>,
        biases: Vec<Vec<f32>>,
        input_width: usize,
    ) -> Result<Self> {
        let genome = Self { weights, biases };
        validate_genome(&genome, input_width)?;
        Ok(genome)
    }

    pub fn weights(&self) -> &[Vec<Vec<f32>>] {
        &self.weights
    }

    pub fn biases(&self) -> &[Vec<f32>] {
        &self.biases
    }

    pub fn num_layers(&self) -> usize {
        self.weights.len()
    }

    /// Width of the input vector the first layer expects
    pub fn input_width(&self) -> usize {
        self.weights
            .first()
            .and_then(|layer| layer.first())
            .map_or(0, |row| row.len())
    }

    /// Width of the final score vector
    pub fn output_width(&self) -> usize {
        self.biases.last().map_or(0, |layer| layer.len())
    }

    /// Neuron count per layer
    pub fn shape(&self) -> Vec<usize> {
        self.biases.iter().map(|layer| layer.len()).collect()
    }

    /// Whether `other` has exactly the same layer and row layout
    pub fn same_shape(&self, other: &Genome) -> bool {
        self.weights.len() == other.weights.len()
            && self.shape() == other.shape()
            && self.input_width() == other.input_width()
            && self
                .weights
                .iter()
                .zip(&other.weights)
                .all(|(a, b)| a.iter().zip(b).all(|(ra, rb)| ra.len() == rb.len()))
    }

    /// Count of all weights and biases
    pub fn parameter_count(&self) -> usize {
        let weights: usize = self
            .weights
            .iter()
            .flat_map(|layer| layer.iter().map(|row| row.len()))
            .sum();
        let biases: usize = self.biases.iter().map(|layer| layer.len()).sum();
        weights + biases
    }

    /// Display color. Parameters are dealt round-robin into three channels;
    /// each channel's mean is squashed into `0..=255`.
    pub fn color(&self) -> Rgb {
        let mut sums = [0.0f32; 3];
        let mut counts = [0u32; 3];

        let params = self
            .weights
            .iter()
            .flat_map(|layer| layer.iter().flatten())
            .chain(self.biases.iter().flatten());
        for (i, value) in params.enumerate() {
            sums[i % 3] += *value;
            counts[i % 3] += 1;
        }

        let channel = |i: usize| {
            let mean = if counts[i] == 0 {
                0.0
            } else {
                sums[i] / counts[i] as f32
            };
            // Means of uniform [-1, 1] values sit near zero; stretch before squashing
            (sigmoid(mean * 8.0) * 255.0).round() as u8
        };

        Rgb::new(channel(0), channel(1), channel(2))
    }

    /// Serialize to JSON for sharing
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a shared genome and check it reads `input_width` inputs
    pub fn from_json(json: &str, input_width: usize) -> Result<Self> {
        let genome: Genome = serde_json::from_str(json)?;
        validate_genome(&genome, input_width)?;
        Ok(genome)
    }

    pub(crate) fn params_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.weights
            .iter_mut()
            .flat_map(|layer| layer.iter_mut().flatten())
            .chain(self.biases.iter_mut().flatten())
    }
}

impl TryFrom<&str> for Genome {
    type Error = Error;

    fn try_from(json: &str) -> Result<Self> {
        Self::from_json(json, SENSOR_INPUTS)
    }
}
