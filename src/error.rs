use thiserror::Error;

/// Errors raised while building networks, loading digits or running a
/// forward pass.
#[derive(Debug, Error)]
pub enum NnError {
    #[error("shape mismatch in {op}: expected {expected}, found {found}")]
    ShapeMismatch {
        op: &'static str,
        expected: String,
        found: String,
    },

    #[error("malformed IDX data: {0}")]
    Idx(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl NnError {
    pub(crate) fn shape(op: &'static str, expected: impl ToString, found: impl ToString) -> Self {
        NnError::ShapeMismatch {
            op,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NnError>;
