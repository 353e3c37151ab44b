use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::dataset::MnistDataset;
use crate::error::{NnError, Result};
use crate::tensor::ImageBatch;

/// One batch: images shaped `(n, 1, height, width)` and their labels.
#[derive(Debug, Clone)]
pub struct Batch {
    pub images: ImageBatch,
    pub labels: Vec<u8>,
}

/// Splits a dataset into fixed-size batches, optionally reshuffled on every
/// pass. The last batch of a pass may be shorter than `batch_size`.
pub struct DataLoader<'a> {
    dataset: &'a MnistDataset,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
}

impl<'a> DataLoader<'a> {
    pub fn new(dataset: &'a MnistDataset, batch_size: usize, shuffle: bool, seed: u64) -> Result<DataLoader<'a>> {
        if batch_size == 0 {
            return Err(NnError::InvalidConfig("batch_size must be at least 1".to_owned()));
        }
        Ok(DataLoader {
            dataset,
            batch_size,
            shuffle,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    /// Starts a new pass over the dataset.
    pub fn iter(&mut self) -> Batches<'a> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            order.shuffle(&mut self.rng);
        }
        debug!(
            "new pass: {} samples in {} batches (shuffle={})",
            order.len(),
            self.num_batches(),
            self.shuffle
        );
        Batches {
            dataset: self.dataset,
            order,
            batch_size: self.batch_size,
            cursor: 0,
        }
    }

    /// The first batch of a fresh pass.
    pub fn first_batch(&mut self) -> Result<Batch> {
        self.iter()
            .next()
            .unwrap_or_else(|| Err(NnError::InvalidConfig("dataset is empty".to_owned())))
    }
}

pub struct Batches<'a> {
    dataset: &'a MnistDataset,
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = self.cursor.saturating_add(self.batch_size).min(self.order.len());
        let indices = &self.order[self.cursor..end];
        self.cursor = end;

        let (height, width) = self.dataset.image_dims();
        let mut pixels = Vec::with_capacity(indices.len() * height * width);
        let mut labels = Vec::with_capacity(indices.len());
        for &i in indices {
            self.dataset.extend_pixels(i, &mut pixels);
            labels.push(self.dataset.label(i));
        }

        Some(ImageBatch::new(indices.len(), 1, height, width, pixels).map(|images| Batch { images, labels }))
    }
}
