pub mod dataset;
pub mod idx;
pub mod image;
pub mod loader;
pub mod transform;

pub use dataset::{MnistDataset, Split};
pub use self::image::image_bytes_to_batch;
pub use loader::{Batch, DataLoader};
pub use transform::{Compose, Transform};
