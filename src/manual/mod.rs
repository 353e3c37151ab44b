//! A forward pass wired by hand from explicit weight matrices, without the
//! `Layer`/`Network` composition. Useful as a reference for what a
//! two-layer network computes.

use rand::Rng;

use crate::activation::activation::{softmax_naive, ActivationFunction};
use crate::error::Result;
use crate::math::matrix::Matrix;

/// Parameters of a single-hidden-layer network.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualParams {
    pub w1: Matrix,
    pub b1: Matrix,
    pub w2: Matrix,
    pub b2: Matrix,
}

impl ManualParams {
    /// Every weight and bias drawn from N(0, 1).
    pub fn random<R: Rng + ?Sized>(n_input: usize, n_hidden: usize, n_output: usize, rng: &mut R) -> ManualParams {
        ManualParams {
            w1: Matrix::normal(n_input, n_hidden, 1.0, rng),
            b1: Matrix::normal(1, n_hidden, 1.0, rng),
            w2: Matrix::normal(n_hidden, n_output, 1.0, rng),
            b2: Matrix::normal(1, n_output, 1.0, rng),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManualOutput {
    pub hidden: Matrix,
    pub logits: Matrix,
    pub probabilities: Matrix,
}

/// `h = sigmoid(x·W1 + b1)`, `logits = h·W2 + b2`, then the reference softmax.
pub fn manual_forward(features: &Matrix, params: &ManualParams) -> Result<ManualOutput> {
    let hidden = ActivationFunction::Sigmoid.apply(&features.matmul(&params.w1)?.add_row(&params.b1)?);
    let logits = hidden.matmul(&params.w2)?.add_row(&params.b2)?;
    let probabilities = softmax_naive(&logits);
    Ok(ManualOutput { hidden, logits, probabilities })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::softmax;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn output_shape_is_batch_by_classes() {
        let mut rng = StdRng::seed_from_u64(7);
        let params = ManualParams::random(784, 256, 10, &mut rng);
        let x = Matrix::uniform(64, 784, 1.0, &mut rng);
        let out = manual_forward(&x, &params).unwrap();
        assert_eq!(out.hidden.shape(), (64, 256));
        assert_eq!(out.logits.shape(), (64, 10));
        assert_eq!(out.probabilities.shape(), (64, 10));
    }

    #[test]
    fn probabilities_are_softmax_of_logits() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = ManualParams::random(6, 4, 3, &mut rng);
        let x = Matrix::uniform(5, 6, 0.5, &mut rng);
        let out = manual_forward(&x, &params).unwrap();
        for (row, logits) in out.probabilities.data.iter().zip(out.logits.data.iter()) {
            let expected = softmax(logits);
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            for (a, b) in row.iter().zip(expected.iter()) {
                assert!((a - b).abs() < 1e-9);
            }
        }
        assert!(out.hidden.data.iter().flatten().all(|&h| h > 0.0 && h < 1.0));
    }

    #[test]
    fn mismatched_features_are_rejected() {
        let params = ManualParams::random(784, 256, 10, &mut StdRng::seed_from_u64(0));
        assert!(manual_forward(&Matrix::zeros(2, 28), &params).is_err());
    }
}
