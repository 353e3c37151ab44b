use std::path::PathBuf;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::dataset::Split;
use crate::data::transform::Compose;
use crate::error::{NnError, Result};
use crate::network::network::Network;
use crate::network::spec::NetworkSpec;

/// Environment variable that overrides `data_dir` when no config file is given.
pub const DATA_DIR_ENV: &str = "DIGIT_MLP_DATA";

/// Settings for one forward-pass demonstration run.
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory holding the decompressed MNIST IDX files.
    pub data_dir: PathBuf,
    pub split: Split,
    pub batch_size: usize,
    pub shuffle: bool,
    /// Seeds both the loader's shuffle and parameter initialization.
    pub seed: u64,
    /// Map pixels to `[-1, 1]` instead of `[0, 1]`.
    pub normalize: bool,
    /// `"sigmoid"`, `"relu"`, or a path to a `NetworkSpec` JSON file.
    pub architecture: String,
    /// When set, the first layer's weights are resampled from N(0, std) and
    /// its biases zeroed after construction.
    pub first_layer_std: Option<f64>,
    /// How many images of the batch get a full text report.
    pub show: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            data_dir: PathBuf::from("mnist_data"),
            split: Split::Train,
            batch_size: 64,
            shuffle: true,
            seed: 7,
            normalize: true,
            architecture: "sigmoid".to_owned(),
            first_layer_std: None,
            show: 1,
        }
    }
}

impl RunConfig {
    pub fn load_json(path: &str) -> Result<RunConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: RunConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, with `data_dir` taken from `DIGIT_MLP_DATA` when set.
    pub fn from_env() -> RunConfig {
        let mut config = RunConfig::default();
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(NnError::InvalidConfig("batch_size must be at least 1".to_owned()));
        }
        if let Some(std) = self.first_layer_std {
            if !(std.is_finite() && std >= 0.0) {
                return Err(NnError::InvalidConfig(format!("first_layer_std must be finite and non-negative, got {}", std)));
            }
        }
        if self.architecture.trim().is_empty() {
            return Err(NnError::InvalidConfig("architecture must not be empty".to_owned()));
        }
        Ok(())
    }

    pub fn transform(&self) -> Compose {
        if self.normalize { Compose::mnist() } else { Compose::to_tensor() }
    }

    /// Resolves `architecture` to a preset or loads it from disk.
    pub fn network_spec(&self) -> Result<NetworkSpec> {
        match NetworkSpec::preset(&self.architecture) {
            Some(spec) => Ok(spec),
            None => NetworkSpec::load_json(&self.architecture),
        }
    }

    /// Instantiates `network_spec()` and applies `first_layer_std`, if set.
    pub fn build_network<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        let spec = self.network_spec()?;
        let mut network = Network::from_spec(&spec, rng)?;
        if let Some(std) = self.first_layer_std {
            let first = network.layer_mut(0)?;
            first.biases.fill(0.0);
            first.weights.fill_normal(std, rng);
            debug!("first layer of '{}' resampled from N(0, {}), biases zeroed", spec.name, std);
        }
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config: RunConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.batch_size, 64);
        assert!(config.shuffle);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config: RunConfig =
            serde_json::from_str(r#"{"batch_size": 8, "split": "test", "architecture": "relu"}"#).unwrap();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.split, Split::Test);
        assert_eq!(config.network_spec().unwrap().name, "relu_mlp");
    }

    #[test]
    fn validate_rejects_zero_batch() {
        let config = RunConfig { batch_size: 0, ..RunConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_architecture_is_read_from_disk() {
        let config = RunConfig { architecture: "/no/such/spec.json".to_owned(), ..RunConfig::default() };
        assert!(matches!(config.network_spec(), Err(NnError::Io(_))));
    }

    #[test]
    fn build_network_reinitializes_first_layer() {
        use rand::{rngs::StdRng, SeedableRng};

        let config = RunConfig { first_layer_std: Some(0.01), ..RunConfig::default() };
        let network = config.build_network(&mut StdRng::seed_from_u64(7)).unwrap();
        let first = network.layer(0).unwrap();
        assert!(first.biases.data.iter().flatten().all(|&b| b == 0.0));

        let weights: Vec<f64> = first.weights.data.iter().flatten().copied().collect();
        let n = weights.len() as f64;
        let mean = weights.iter().sum::<f64>() / n;
        let std = (weights.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert!(mean.abs() < 1e-3, "mean {}", mean);
        assert!((std - 0.01).abs() < 1e-3, "std {}", std);

        // Later layers keep their default initialization.
        assert!(network.layer(1).unwrap().biases.data[0].iter().any(|&b| b != 0.0));
    }

    #[test]
    fn build_network_without_std_keeps_default_init() {
        use rand::{rngs::StdRng, SeedableRng};

        let network = RunConfig::default().build_network(&mut StdRng::seed_from_u64(7)).unwrap();
        let first = network.layer(0).unwrap();
        let bound = 1.0 / (first.input_size() as f64).sqrt();
        assert!(first.biases.data[0].iter().any(|&b| b != 0.0));
        assert!(first.weights.data.iter().flatten().all(|w| w.abs() <= bound));
    }

    #[test]
    fn validate_rejects_negative_first_layer_std() {
        let config = RunConfig { first_layer_std: Some(-1.0), ..RunConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_env_reads_data_dir() {
        std::env::set_var(DATA_DIR_ENV, "/data/mnist");
        let config = RunConfig::from_env();
        std::env::remove_var(DATA_DIR_ENV);
        assert_eq!(config.data_dir, PathBuf::from("/data/mnist"));
        assert_eq!(config.batch_size, RunConfig::default().batch_size);

        assert_eq!(RunConfig::from_env().data_dir, RunConfig::default().data_dir);
    }
}
