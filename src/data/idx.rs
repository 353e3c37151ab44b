//! Parsers for the IDX binary files MNIST ships in.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index in [0, n_classes)
//! ```

use crate::error::{NnError, Result};

/// Raw pixels of an IDX3 file.
#[derive(Debug, Clone, PartialEq)]
pub struct IdxImages {
    pub count: usize,
    pub rows: usize,
    pub cols: usize,
    /// `count * rows * cols` bytes, image after image.
    pub pixels: Vec<u8>,
}

fn be_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

fn check_header(bytes: &[u8], what: &str, dims: u8, header_len: usize) -> Result<()> {
    if bytes.len() < header_len {
        return Err(NnError::Idx(format!(
            "{} file too short: expected at least {} header bytes, got {}",
            what, header_len, bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(NnError::Idx(format!(
            "{} file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}",
            what, bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(NnError::Idx(format!(
            "{} file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}",
            what, bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(NnError::Idx(format!(
            "{} file: byte 3 (dimensions) must be {}, got {}",
            what, dims, bytes[3]
        )));
    }
    Ok(())
}

pub fn parse_images(bytes: &[u8]) -> Result<IdxImages> {
    check_header(bytes, "IDX image", 0x03, 16)?;

    let count = be_u32(bytes, 4);
    let rows = be_u32(bytes, 8);
    let cols = be_u32(bytes, 12);

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        NnError::Idx(format!("IDX image file: rows * cols overflows usize (rows={}, cols={})", rows, cols))
    })?;
    let data_len = count.checked_mul(n_pixels).ok_or_else(|| {
        NnError::Idx(format!(
            "IDX image file: count * pixels overflows usize (count={}, pixels={})",
            count, n_pixels
        ))
    })?;

    if bytes.len() - 16 < data_len {
        return Err(NnError::Idx(format!(
            "IDX image file too short: header declares {} images of {}×{} pixels \
             ({} data bytes), but only {} bytes follow the header",
            count, rows, cols, data_len, bytes.len() - 16
        )));
    }

    Ok(IdxImages {
        count,
        rows,
        cols,
        pixels: bytes[16..16 + data_len].to_vec(),
    })
}

pub fn parse_labels(bytes: &[u8], n_classes: usize) -> Result<Vec<u8>> {
    check_header(bytes, "IDX label", 0x01, 8)?;

    let count = be_u32(bytes, 4);
    if bytes.len() - 8 < count {
        return Err(NnError::Idx(format!(
            "IDX label file too short: header declares {} labels but only {} bytes follow the header",
            count, bytes.len() - 8
        )));
    }

    let labels = bytes[8..8 + count].to_vec();
    if let Some((i, &class)) = labels.iter().enumerate().find(|(_, c)| **c as usize >= n_classes) {
        return Err(NnError::Idx(format!(
            "IDX label at index {}: class {} is out of range for {} classes",
            i, class, n_classes
        )));
    }
    Ok(labels)
}

/// Parses an image/label pair and checks that their counts agree.
pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8], n_classes: usize) -> Result<(IdxImages, Vec<u8>)> {
    if n_classes < 2 {
        return Err(NnError::InvalidConfig(format!("n_classes must be at least 2, got {}", n_classes)));
    }
    let images = parse_images(image_bytes)?;
    let labels = parse_labels(label_bytes, n_classes)?;
    if images.count != labels.len() {
        return Err(NnError::Idx(format!(
            "IDX file mismatch: image file declares {} items but label file declares {}",
            images.count,
            labels.len()
        )));
    }
    Ok((images, labels))
}

/// Encodes images and labels back into IDX bytes.
pub fn encode_idx_pair(images: &IdxImages, labels: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut image_bytes = vec![0x00, 0x00, 0x08, 0x03];
    for v in [images.count, images.rows, images.cols] {
        image_bytes.extend_from_slice(&(v as u32).to_be_bytes());
    }
    image_bytes.extend_from_slice(&images.pixels);

    let mut label_bytes = vec![0x00, 0x00, 0x08, 0x01];
    label_bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    label_bytes.extend_from_slice(labels);

    (image_bytes, label_bytes)
}
