pub mod activation;

pub use activation::{softmax, softmax_naive, ActivationFunction};
