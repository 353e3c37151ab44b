pub mod error;
pub mod math;
pub mod tensor;
pub mod activation;
pub mod layers;
pub mod network;
pub mod manual;
pub mod data;
pub mod view;
pub mod config;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use tensor::ImageBatch;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{Network, NetworkSpec, LayerSpec};
pub use manual::{manual_forward, ManualParams};
pub use data::{DataLoader, MnistDataset, Split};
pub use config::RunConfig;
