use serde::{Serialize, Deserialize};
use std::f64::consts::E;

use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    Tanh,
    /// Softmax is vector-valued: it normalizes each row of a batch (the class
    /// dimension) and is only reachable through `apply()`.
    Softmax,
}

impl ActivationFunction {
    /// Element-wise form of the activation, only called by `apply()` after
    /// `Softmax` has been dispatched row-wise.
    fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity | ActivationFunction::Softmax => x,
            ActivationFunction::Tanh => x.tanh(),
        }
    }

    /// Applies the activation to a whole `batch × features` matrix.
    pub fn apply(&self, z: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Softmax => z.map_rows(softmax),
            ActivationFunction::Identity => z.clone(),
            _ => z.map(|x| self.function(x)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::ReLU => "relu",
            ActivationFunction::Identity => "identity",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::Softmax => "softmax",
        }
    }
}

/// Numerically stable softmax of one row: the row maximum is subtracted
/// before exponentiating, which leaves the result unchanged.
pub fn softmax(row: &[f64]) -> Vec<f64> {
    let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = row.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Reference softmax along dim 1: `exp(x) / sum(exp(x))` per row, with no
/// max-subtraction. Logits beyond ~709 overflow to `inf` and the row becomes
/// NaN.
pub fn softmax_naive(logits: &Matrix) -> Matrix {
    logits.map_rows(|row| {
        let exps: Vec<f64> = row.iter().map(|x| x.exp()).collect();
        let sum: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / sum).collect()
    })
}
