use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{activation::activation::ActivationFunction, error::{NnError, Result}, math::matrix::Matrix};

/// A fully connected layer: `activation(x · weights + biases)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    /// Shape `(input_size, size)`.
    pub weights: Matrix,
    /// Shape `(1, size)`, broadcast over the batch.
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    /// Weights and biases are drawn from `U(-1/sqrt(input_size), 1/sqrt(input_size))`.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let bound = 1.0 / (input_size as f64).sqrt();
        let weights = Matrix::uniform(input_size, size, bound, rng);
        let biases = Matrix::uniform(1, size, bound, rng);

        Layer {
            size,
            weights,
            biases,
            activator: activation
        }
    }

    pub fn from_parts(weights: Matrix, biases: Matrix, activation: ActivationFunction) -> Result<Layer> {
        if biases.rows != 1 || biases.cols != weights.cols {
            return Err(NnError::shape(
                "Layer::from_parts",
                format!("biases 1x{}", weights.cols),
                format!("biases {}x{}", biases.rows, biases.cols),
            ));
        }
        Ok(Layer {
            size: weights.cols,
            weights,
            biases,
            activator: activation,
        })
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.rows * self.weights.cols + self.biases.cols
    }

    /// Pre-activation logits `z = xW + b` for a `batch × input_size` input.
    pub fn linear(&self, input: &Matrix) -> Result<Matrix> {
        if input.cols != self.input_size() {
            return Err(NnError::shape(
                "Layer::linear",
                format!("{} input features", self.input_size()),
                format!("{} input features", input.cols),
            ));
        }
        input.matmul(&self.weights)?.add_row(&self.biases)
    }

    pub fn forward(&self, input: &Matrix) -> Result<Matrix> {
        let z = self.linear(input)?;
        Ok(self.activator.apply(&z))
    }
}
