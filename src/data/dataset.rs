use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::data::idx::{parse_idx_pair, IdxImages};
use crate::data::transform::Compose;
use crate::error::{NnError, Result};
use crate::network::spec::MNIST_CLASSES;

/// Which half of MNIST to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train,
    Test,
}

impl Split {
    /// File names as distributed, after decompression.
    pub fn file_names(&self) -> (&'static str, &'static str) {
        match self {
            Split::Train => ("train-images-idx3-ubyte", "train-labels-idx1-ubyte"),
            Split::Test => ("t10k-images-idx3-ubyte", "t10k-labels-idx1-ubyte"),
        }
    }
}

/// MNIST images and labels held in memory as raw bytes; transforms run on
/// access.
#[derive(Debug, Clone)]
pub struct MnistDataset {
    images: IdxImages,
    labels: Vec<u8>,
    transform: Compose,
}

impl MnistDataset {
    /// Reads the IDX pair for `split` from `dir`. Nothing is downloaded.
    pub fn load(dir: impl AsRef<Path>, split: Split, transform: Compose) -> Result<MnistDataset> {
        let dir = dir.as_ref();
        let (image_name, label_name) = split.file_names();
        let image_bytes = std::fs::read(dir.join(image_name))?;
        let label_bytes = std::fs::read(dir.join(label_name))?;
        let dataset = MnistDataset::from_bytes(&image_bytes, &label_bytes, transform)?;
        info!(
            "loaded {} {:?} images of {}x{} from {}",
            dataset.len(),
            split,
            dataset.images.rows,
            dataset.images.cols,
            dir.display()
        );
        Ok(dataset)
    }

    pub fn from_bytes(image_bytes: &[u8], label_bytes: &[u8], transform: Compose) -> Result<MnistDataset> {
        let (images, labels) = parse_idx_pair(image_bytes, label_bytes, MNIST_CLASSES)?;
        Ok(MnistDataset { images, labels, transform })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(height, width)` of every image.
    pub fn image_dims(&self) -> (usize, usize) {
        (self.images.rows, self.images.cols)
    }

    pub fn pixels_per_image(&self) -> usize {
        self.images.rows * self.images.cols
    }

    /// Transformed pixels of sample `i` plus its label.
    pub fn get(&self, i: usize) -> Result<(Vec<f64>, u8)> {
        let label = *self.labels.get(i).ok_or(NnError::IndexOutOfRange { index: i, len: self.len() })?;
        Ok((self.pixels(i), label))
    }

    /// Appends sample `i`'s transformed pixels to `out`. `i` must be in range.
    pub(crate) fn extend_pixels(&self, i: usize, out: &mut Vec<f64>) {
        let n = self.pixels_per_image();
        out.extend(self.images.pixels[i * n..(i + 1) * n].iter().map(|&p| self.transform.apply(p)));
    }

    pub(crate) fn label(&self, i: usize) -> u8 {
        self.labels[i]
    }

    fn pixels(&self, i: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.pixels_per_image());
        self.extend_pixels(i, &mut out);
        out
    }
}
