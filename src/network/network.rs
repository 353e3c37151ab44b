use log::debug;
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::metadata::ModelMetadata;
use crate::network::spec::NetworkSpec;
use crate::tensor::ImageBatch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl Network {
    /// Builds a network from (size, input_size, activation) tuples.
    pub fn new<R: Rng + ?Sized>(
        layer_specs: Vec<(usize, usize, ActivationFunction)>,
        rng: &mut R,
    ) -> Network {
        let layers = layer_specs.into_iter()
            .map(|(size, input_size, activation)| Layer::new(size, input_size, activation, rng))
            .collect();
        Network { layers, metadata: None }
    }

    /// Instantiates a validated spec with freshly initialized parameters.
    pub fn from_spec<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate()?;
        let mut network = Network::new(
            spec.layers.iter().map(|l| (l.size, l.input_size, l.activation)).collect(),
            rng,
        );
        network.metadata = spec.metadata.clone();
        debug!(
            "built network '{}' with {} layers, {} parameters",
            spec.name,
            network.layers.len(),
            network.parameter_count()
        );
        Ok(network)
    }

    /// Wraps pre-built layers, checking that consecutive widths agree.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Network> {
        if layers.is_empty() {
            return Err(NnError::InvalidConfig("network has no layers".to_owned()));
        }
        for pair in layers.windows(2) {
            if pair[1].input_size() != pair[0].size {
                return Err(NnError::shape("Network::from_layers", pair[0].size, pair[1].input_size()));
            }
        }
        Ok(Network { layers, metadata: None })
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(|l| l.input_size()).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.size).unwrap_or(0)
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    pub fn layer(&self, i: usize) -> Result<&Layer> {
        let len = self.layers.len();
        self.layers.get(i).ok_or(NnError::IndexOutOfRange { index: i, len })
    }

    /// Mutable access for in-place parameter edits such as zeroing a bias.
    pub fn layer_mut(&mut self, i: usize) -> Result<&mut Layer> {
        let len = self.layers.len();
        self.layers.get_mut(i).ok_or(NnError::IndexOutOfRange { index: i, len })
    }

    /// Forward pass over a `batch × input_size` feature matrix.
    pub fn forward(&self, input: &Matrix) -> Result<Matrix> {
        if input.cols != self.input_size() {
            return Err(NnError::shape(
                "Network::forward",
                format!("{} features per row", self.input_size()),
                format!("{} features per row", input.cols),
            ));
        }
        let mut current = input.clone();
        for layer in &self.layers {
            current = layer.forward(&current)?;
        }
        Ok(current)
    }

    /// Flattens an image batch to `batch × (c·h·w)` and runs `forward`.
    pub fn forward_batch(&self, images: &ImageBatch) -> Result<Matrix> {
        self.forward(&images.flatten()?)
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    ///
    /// Every matrix is checked against its declared shape, so a malformed
    /// file fails here instead of in `forward`.
    pub fn load_json(path: &str) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let stored: Network = serde_json::from_reader(reader)?;
        let layers = stored.layers
            .into_iter()
            .map(|layer| {
                let size = layer.size;
                let rebuilt = Layer::from_parts(layer.weights.checked()?, layer.biases.checked()?, layer.activator)?;
                if rebuilt.size != size {
                    return Err(NnError::shape("Network::load_json", format!("size {}", rebuilt.size), format!("size {}", size)));
                }
                Ok(rebuilt)
            })
            .collect::<Result<Vec<Layer>>>()?;
        let mut network = Network::from_layers(layers)?;
        network.metadata = stored.metadata;
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn sigmoid_mlp_outputs_batch_by_ten_probabilities() {
        let mut rng = StdRng::seed_from_u64(7);
        let net = Network::from_spec(&NetworkSpec::sigmoid_mlp(), &mut rng).unwrap();
        let x = Matrix::uniform(64, 784, 1.0, &mut rng);
        let p = net.forward(&x).unwrap();
        assert_eq!(p.shape(), (64, 10));
        for s in p.row_sums() {
            assert!((s - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn relu_mlp_has_expected_parameter_count() {
        let net = Network::from_spec(&NetworkSpec::relu_mlp(), &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(net.parameter_count(), 784 * 128 + 128 + 128 * 64 + 64 + 64 * 10 + 10);
        assert_eq!(net.input_size(), 784);
        assert_eq!(net.output_size(), 10);
    }

    #[test]
    fn forward_rejects_wrong_width() {
        let net = Network::from_spec(&NetworkSpec::relu_mlp(), &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(matches!(net.forward(&Matrix::zeros(2, 783)), Err(NnError::ShapeMismatch { .. })));
    }

    #[test]
    fn zeroed_parameters_give_uniform_probabilities() {
        let mut net = Network::from_spec(&NetworkSpec::relu_mlp(), &mut StdRng::seed_from_u64(1)).unwrap();
        for i in 0..net.layers.len() {
            let layer = net.layer_mut(i).unwrap();
            layer.weights.fill(0.0);
            layer.biases.fill(0.0);
        }
        let p = net.forward(&Matrix::filled(3, 784, 0.3)).unwrap();
        for row in &p.data {
            for &v in row {
                assert!((v - 0.1).abs() < 1e-12);
            }
        }
        assert!(net.layer(3).is_err());
    }

    #[test]
    fn from_layers_checks_widths() {
        let mut rng = StdRng::seed_from_u64(2);
        let a = Layer::new(5, 4, ActivationFunction::ReLU, &mut rng);
        let b = Layer::new(3, 6, ActivationFunction::Softmax, &mut rng);
        assert!(Network::from_layers(vec![a, b]).is_err());
        assert!(Network::from_layers(vec![]).is_err());
    }

    #[test]
    fn weights_survive_json() {
        let net = Network::from_spec(&NetworkSpec::sigmoid_mlp(), &mut StdRng::seed_from_u64(4)).unwrap();
        let path = std::env::temp_dir().join("digit_mlp_network_json_test.json");
        let path = path.to_str().unwrap();
        net.save_json(path).unwrap();
        let back = Network::load_json(path).unwrap();
        std::fs::remove_file(path).ok();
        assert_eq!(back.layers.len(), 2);
        assert_eq!(back.metadata, net.metadata);
        let x = Matrix::filled(1, 784, 0.5);
        let (a, b) = (net.forward(&x).unwrap(), back.forward(&x).unwrap());
        for (u, v) in a.data[0].iter().zip(b.data[0].iter()) {
            assert!((u - v).abs() < 1e-12);
        }
    }

    fn write_temp(name: &str, text: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn load_rejects_weights_that_disagree_with_their_header() {
        let text = r#"{"layers":[{"size":2,
            "weights":{"rows":3,"cols":2,"data":[[1.0,2.0]]},
            "biases":{"rows":1,"cols":2,"data":[[0.0,0.0]]},
            "activator":"ReLU"}]}"#;
        let path = write_temp("digit_mlp_bad_weights.json", text);
        let res = Network::load_json(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        assert!(matches!(res, Err(NnError::ShapeMismatch { .. })));
    }

    #[test]
    fn load_rejects_bias_and_size_mismatch() {
        let wide_bias = r#"{"layers":[{"size":2,
            "weights":{"rows":1,"cols":2,"data":[[1.0,2.0]]},
            "biases":{"rows":1,"cols":3,"data":[[0.0,0.0,0.0]]},
            "activator":"Identity"}]}"#;
        let wrong_size = r#"{"layers":[{"size":5,
            "weights":{"rows":1,"cols":2,"data":[[1.0,2.0]]},
            "biases":{"rows":1,"cols":2,"data":[[0.0,0.0]]},
            "activator":"Identity"}]}"#;
        for (name, text) in [("digit_mlp_wide_bias.json", wide_bias), ("digit_mlp_wrong_size.json", wrong_size)] {
            let path = write_temp(name, text);
            let res = Network::load_json(path.to_str().unwrap());
            std::fs::remove_file(&path).ok();
            assert!(matches!(res, Err(NnError::ShapeMismatch { .. })), "{} loaded", name);
        }
    }
}
