//! digit-mlp
//!
//! Loads one batch of MNIST digits, runs it through a hand-wired two-layer
//! forward pass and through a layer-composed network, and prints the
//! predicted class probabilities.
//!
//! Run with:
//!   cargo run --release -- [config.json]
//!
//! Without a config file the defaults apply and `DIGIT_MLP_DATA` may point at
//! the directory holding the decompressed IDX files.

use std::process::ExitCode;

use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use digit_mlp::{
    manual_forward,
    view::{classify_report, predictions},
    DataLoader, ManualParams, MnistDataset, Result, RunConfig,
};

fn main() -> ExitCode {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned());
    pretty_env_logger::formatted_builder().parse_filters(&filters).init();

    let config = match std::env::args().nth(1) {
        Some(path) => RunConfig::load_json(&path),
        None => Ok(RunConfig::from_env()),
    };

    match config.and_then(|c| run(&c)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &RunConfig) -> Result<()> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    // --- Data ---
    let dataset = MnistDataset::load(&config.data_dir, config.split, config.transform())?;
    let mut loader = DataLoader::new(&dataset, config.batch_size, config.shuffle, config.seed)?;
    let batch = loader.first_batch()?;
    let features = batch.images.flatten()?;
    info!("image batch {:?} flattened to {:?}", batch.images.shape(), features.shape());

    // --- Hand-wired forward pass ---
    let params = ManualParams::random(features.cols, 256, 10, &mut rng);
    let manual = manual_forward(&features, &params)?;
    println!("Manual forward pass: probabilities {:?}", manual.probabilities.shape());
    for (i, sum) in manual.probabilities.row_sums().iter().take(4).enumerate() {
        println!("  row {} sums to {:.6}", i, sum);
    }

    // --- Layer-composed network ---
    let spec = config.network_spec()?;
    let network = config.build_network(&mut rng)?;
    println!(
        "\nNetwork '{}': {} -> {} ({} parameters)",
        spec.name,
        network.input_size(),
        network.output_size(),
        network.parameter_count()
    );
    for (i, layer) in network.layers.iter().enumerate() {
        println!("  [{}] linear({}→{}), {}", i, layer.input_size(), layer.size, layer.activator.name());
    }

    let probabilities = network.forward_batch(&batch.images)?;
    println!("Output probabilities: {:?}", probabilities.shape());

    let preds = predictions(&probabilities, &batch.labels)?;
    let correct = preds.iter().filter(|p| p.is_correct() == Some(true)).count();
    info!("{}/{} predictions match their label (untrained weights)", correct, preds.len());

    let (_, width) = dataset.image_dims();
    for pred in preds.iter().take(config.show) {
        let pixels = batch.images.image(pred.index)?;
        println!("\nImage {}:", pred.index);
        print!("{}", classify_report(pixels, width, pred, network.metadata.as_ref())?);
    }

    Ok(())
}
