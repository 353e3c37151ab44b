pub mod image_batch;

pub use image_batch::ImageBatch;
