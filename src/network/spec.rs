use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::network::metadata::ModelMetadata;

/// Width of a flattened 28×28 MNIST image.
pub const MNIST_INPUT: usize = 784;
/// Number of digit classes.
pub const MNIST_CLASSES: usize = 10;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `size`       — number of neurons in this layer
/// - `input_size` — number of neurons feeding into this layer (the output
///                  size of the previous layer, or the raw input dimension for
///                  the first layer)
/// - `activation` — activation function applied after the linear transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

/// A fully serializable description of a network architecture.
///
/// A spec can be saved to / loaded from JSON independently of any weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl NetworkSpec {
    /// linear(784→256), sigmoid, linear(256→10), softmax.
    pub fn sigmoid_mlp() -> NetworkSpec {
        NetworkSpec {
            name: "sigmoid_mlp".to_owned(),
            layers: vec![
                LayerSpec { size: 256, input_size: MNIST_INPUT, activation: ActivationFunction::Sigmoid },
                LayerSpec { size: MNIST_CLASSES, input_size: 256, activation: ActivationFunction::Softmax },
            ],
            metadata: Some(ModelMetadata::digits("784-256-10, sigmoid hidden layer, softmax output")),
        }
    }

    /// linear(784→128), ReLU, linear(128→64), ReLU, linear(64→10), softmax.
    pub fn relu_mlp() -> NetworkSpec {
        NetworkSpec {
            name: "relu_mlp".to_owned(),
            layers: vec![
                LayerSpec { size: 128, input_size: MNIST_INPUT, activation: ActivationFunction::ReLU },
                LayerSpec { size: 64, input_size: 128, activation: ActivationFunction::ReLU },
                LayerSpec { size: MNIST_CLASSES, input_size: 64, activation: ActivationFunction::Softmax },
            ],
            metadata: Some(ModelMetadata::digits("784-128-64-10, ReLU hidden layers, softmax output")),
        }
    }

    /// Resolves a preset by name (`"sigmoid"` or `"relu"`).
    pub fn preset(name: &str) -> Option<NetworkSpec> {
        match name {
            "sigmoid" | "sigmoid_mlp" => Some(NetworkSpec::sigmoid_mlp()),
            "relu" | "relu_mlp" => Some(NetworkSpec::relu_mlp()),
            _ => None,
        }
    }

    /// Checks that the spec is non-empty and every layer consumes exactly
    /// what the previous one produces.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(NnError::InvalidConfig(format!("network '{}' has no layers", self.name)));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.size == 0 || layer.input_size == 0 {
                return Err(NnError::InvalidConfig(format!(
                    "network '{}': layer {} has a zero dimension ({}→{})",
                    self.name, i, layer.input_size, layer.size
                )));
            }
            if i > 0 && layer.input_size != self.layers[i - 1].size {
                return Err(NnError::InvalidConfig(format!(
                    "network '{}': layer {} expects {} inputs but layer {} produces {}",
                    self.name, i, layer.input_size, i - 1, self.layers[i - 1].size
                )));
            }
        }
        Ok(())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}
