//! Turns an ordinary image file into a one-image batch the classifier can
//! consume.
//!
//! The bytes are decoded (PNG/JPEG/BMP/GIF), resized to `width × height`,
//! converted to grayscale and passed through `transform`. MNIST digits are
//! light strokes on a dark background; set `invert` for dark-on-light input
//! such as a scanned or hand-drawn digit.

use crate::data::transform::Compose;
use crate::error::Result;
use crate::tensor::ImageBatch;

pub fn image_bytes_to_batch(
    bytes: &[u8],
    width: u32,
    height: u32,
    invert: bool,
    transform: &Compose,
) -> Result<ImageBatch> {
    let img = image::load_from_memory(bytes)?;
    let resized = img.resize_exact(width, height, image::imageops::FilterType::Lanczos3);
    let gray = resized.to_luma8();
    let pixels = gray
        .pixels()
        .map(|p| if invert { 255 - p.0[0] } else { p.0[0] })
        .map(|p| transform.apply(p))
        .collect();
    ImageBatch::new(1, 1, height as usize, width as usize, pixels)
}
