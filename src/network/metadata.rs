use serde::{Deserialize, Serialize};

/// Optional annotations attached to a saved network or spec.
/// All fields are Option<> so files without metadata deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    pub description: Option<String>,
    /// Human-readable class labels for the output layer (e.g. ["0","1",...,"9"]).
    pub output_labels: Option<Vec<String>>,
}

impl ModelMetadata {
    pub fn digits(description: &str) -> ModelMetadata {
        ModelMetadata {
            description: Some(description.to_owned()),
            output_labels: Some((0..10).map(|d| d.to_string()).collect()),
        }
    }

    /// Label for output column `class`, falling back to the index itself.
    pub fn label(&self, class: usize) -> String {
        self.output_labels
            .as_ref()
            .and_then(|labels| labels.get(class).cloned())
            .unwrap_or_else(|| class.to_string())
    }
}
