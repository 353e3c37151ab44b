pub mod metadata;
pub mod network;
pub mod spec;

pub use metadata::ModelMetadata;
pub use network::Network;
pub use spec::{NetworkSpec, LayerSpec, MNIST_CLASSES, MNIST_INPUT};
