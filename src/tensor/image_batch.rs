use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// A batch of images laid out as `(batch, channels, height, width)`, stored
/// contiguously in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    batch: usize,
    channels: usize,
    height: usize,
    width: usize,
    data: Vec<f64>,
}

impl ImageBatch {
    pub fn new(batch: usize, channels: usize, height: usize, width: usize, data: Vec<f64>) -> Result<ImageBatch> {
        let expected = batch * channels * height * width;
        if data.len() != expected {
            return Err(NnError::shape(
                "ImageBatch::new",
                format!("{} values for {}x{}x{}x{}", expected, batch, channels, height, width),
                format!("{} values", data.len()),
            ));
        }
        Ok(ImageBatch { batch, channels, height, width, data })
    }

    pub fn shape(&self) -> [usize; 4] {
        [self.batch, self.channels, self.height, self.width]
    }

    pub fn len(&self) -> usize {
        self.batch
    }

    pub fn is_empty(&self) -> bool {
        self.batch == 0
    }

    pub fn pixels_per_image(&self) -> usize {
        self.channels * self.height * self.width
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// All channels of image `i`, flattened.
    pub fn image(&self, i: usize) -> Result<&[f64]> {
        if i >= self.batch {
            return Err(NnError::IndexOutOfRange { index: i, len: self.batch });
        }
        let n = self.pixels_per_image();
        Ok(&self.data[i * n..(i + 1) * n])
    }

    /// Image `i` as a batch of one.
    pub fn single(&self, i: usize) -> Result<ImageBatch> {
        let pixels = self.image(i)?.to_vec();
        ImageBatch::new(1, self.channels, self.height, self.width, pixels)
    }

    /// Reshapes to `batch × (channels·height·width)`, one image per row.
    pub fn flatten(&self) -> Result<Matrix> {
        let n = self.pixels_per_image();
        if self.batch == 0 || n == 0 {
            return Err(NnError::shape("ImageBatch::flatten", "a non-empty batch", format!("{:?}", self.shape())));
        }
        Ok(Matrix {
            rows: self.batch,
            cols: n,
            data: self.data.chunks_exact(n).map(|c| c.to_vec()).collect(),
        })
    }

    pub fn map<F>(&self, functor: F) -> ImageBatch
    where
        F: Fn(f64) -> f64,
    {
        ImageBatch {
            batch: self.batch,
            channels: self.channels,
            height: self.height,
            width: self.width,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_batch(batch: usize) -> ImageBatch {
        let n = batch * 28 * 28;
        ImageBatch::new(batch, 1, 28, 28, (0..n).map(|x| x as f64).collect()).unwrap()
    }

    #[test]
    fn flatten_gives_one_row_per_image() {
        let images = counting_batch(64);
        assert_eq!(images.shape(), [64, 1, 28, 28]);
        let features = images.flatten().unwrap();
        assert_eq!(features.shape(), (64, 784));
        assert_eq!(features.data[1][0], 784.0);
        assert_eq!(features.data[63][783], (64 * 784 - 1) as f64);
    }

    #[test]
    fn new_rejects_wrong_length() {
        assert!(ImageBatch::new(2, 1, 28, 28, vec![0.0; 784]).is_err());
    }

    #[test]
    fn single_and_image_are_bounds_checked() {
        let images = counting_batch(3);
        let one = images.single(2).unwrap();
        assert_eq!(one.shape(), [1, 1, 28, 28]);
        assert_eq!(one.as_slice()[0], (2 * 784) as f64);
        assert!(images.image(3).is_err());
    }

    #[test]
    fn empty_batch_does_not_flatten() {
        let empty = ImageBatch::new(0, 1, 28, 28, vec![]).unwrap();
        assert!(empty.is_empty());
        assert!(empty.flatten().is_err());
    }

    #[test]
    fn map_keeps_shape() {
        let images = counting_batch(2).map(|x| x * 0.0);
        assert_eq!(images.shape(), [2, 1, 28, 28]);
        assert!(images.as_slice().iter().all(|&x| x == 0.0));
    }
}
