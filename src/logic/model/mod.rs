//! Model Module - Classifier Adapter
//!
//! The pretrained model is loaded once at startup into an immutable object
//! and shared by reference. Callers only see the `Classifier` trait, so the
//! ONNX backend can be swapped for a stub in tests.

pub mod inference;
pub mod metadata;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export common types
pub use inference::OnnxClassifier;
pub use metadata::{ModelLoadError, ModelMetadata};

// ============================================================================
// LABEL
// ============================================================================

/// Binary classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Benign,
    Malicious,
}

impl Label {
    /// Class index as emitted by the model; anything non-zero is malicious
    pub fn from_class(class: i64) -> Self {
        if class == 0 {
            Label::Benign
        } else {
            Label::Malicious
        }
    }

    /// Probability-style output, thresholded at 0.5
    pub fn from_score(score: f32) -> Self {
        if score >= 0.5 {
            Label::Malicious
        } else {
            Label::Benign
        }
    }

    pub fn is_malicious(self) -> bool {
        matches!(self, Label::Malicious)
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("classifier input error: {0}")]
    Input(String),

    #[error("inference failed: {0}")]
    Run(String),

    #[error("classifier output error: {0}")]
    Output(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// A loaded, read-only classifier.
///
/// Implementations must be safe to call from many classifications at once.
pub trait Classifier: Send + Sync {
    /// Vector length the model was trained on
    fn expected_features(&self) -> usize;

    /// Classify one feature vector
    fn predict(&self, features: &[f32]) -> Result<Label, InferenceError>;

    fn name(&self) -> &str {
        "classifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_class() {
        assert_eq!(Label::from_class(0), Label::Benign);
        assert_eq!(Label::from_class(1), Label::Malicious);
        assert!(Label::from_class(1).is_malicious());
        assert!(!Label::from_class(0).is_malicious());
    }

    #[test]
    fn test_label_from_score() {
        assert_eq!(Label::from_score(0.49), Label::Benign);
        assert_eq!(Label::from_score(0.5), Label::Malicious);
    }

    #[test]
    fn test_label_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Label::Malicious).unwrap(), "\"malicious\"");
    }
}
