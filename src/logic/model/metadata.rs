//! Model Metadata - sidecar describing which layout a model was trained on
//!
//! `model.onnx` may ship with `model.meta.json`:
//!
//! ```json
//! {
//!   "model_name": "gbc-2024-06",
//!   "feature_version": 1,
//!   "layout_hash": 1234567890,
//!   "feature_count": 19,
//!   "sha256": "9f86d08..."
//! }
//! ```
//!
//! A sidecar that disagrees with the compiled layout, or whose checksum does
//! not match the artifact, makes loading fail.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::logic::features::layout::{validate_layout, LayoutMismatchError, FEATURE_COUNT};

/// Errors that prevent the classifier from loading. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model metadata {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error("model expects {actual} features, layout has {expected}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },

    #[error("onnx runtime error: {0}")]
    Runtime(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub model_name: Option<String>,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_count: usize,
    /// Hex SHA-256 of the model file
    #[serde(default)]
    pub sha256: Option<String>,
    /// Output tensor holding the class label
    #[serde(default)]
    pub label_output: Option<String>,
}

impl ModelMetadata {
    /// `dir/model.onnx` → `dir/model.meta.json`
    pub fn sidecar_path(model_path: &Path) -> PathBuf {
        model_path.with_extension("meta.json")
    }

    /// Read the sidecar next to `model_path`, if there is one
    pub fn load_sidecar(model_path: &Path) -> Result<Option<Self>, ModelLoadError> {
        let path = Self::sidecar_path(model_path);
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| ModelLoadError::Io {
            path: path.clone(),
            source,
        })?;
        let metadata = serde_json::from_str(&raw).map_err(|source| ModelLoadError::Metadata { path, source })?;
        Ok(Some(metadata))
    }

    /// Check the sidecar against the compiled layout and the artifact bytes
    pub fn verify(&self, model_bytes: &[u8]) -> Result<(), ModelLoadError> {
        validate_layout(self.feature_version, self.layout_hash)?;

        if self.feature_count != FEATURE_COUNT {
            return Err(ModelLoadError::FeatureCount {
                expected: FEATURE_COUNT,
                actual: self.feature_count,
            });
        }

        if let Some(expected) = &self.sha256 {
            let actual = sha256_hex(model_bytes);
            if !expected.eq_ignore_ascii_case(&actual) {
                return Err(ModelLoadError::Checksum {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        Ok(())
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::{layout_hash, FEATURE_VERSION};

    fn metadata_for(bytes: &[u8]) -> ModelMetadata {
        ModelMetadata {
            model_name: Some("test".to_string()),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            sha256: Some(sha256_hex(bytes)),
            label_output: None,
        }
    }

    #[test]
    fn test_sidecar_path() {
        let path = ModelMetadata::sidecar_path(Path::new("/models/model.onnx"));
        assert_eq!(path, PathBuf::from("/models/model.meta.json"));
    }

    #[test]
    fn test_verify_accepts_matching_metadata() {
        let bytes = b"fake model";
        assert!(metadata_for(bytes).verify(bytes).is_ok());
    }

    #[test]
    fn test_verify_rejects_other_layout() {
        let bytes = b"fake model";
        let mut meta = metadata_for(bytes);
        meta.layout_hash ^= 1;
        assert!(matches!(meta.verify(bytes), Err(ModelLoadError::Layout(_))));
    }

    #[test]
    fn test_verify_rejects_feature_count() {
        let bytes = b"fake model";
        let mut meta = metadata_for(bytes);
        meta.feature_count = 18;
        assert!(matches!(
            meta.verify(bytes),
            Err(ModelLoadError::FeatureCount { expected: 19, actual: 18 })
        ));
    }

    #[test]
    fn test_verify_rejects_checksum() {
        let meta = metadata_for(b"fake model");
        assert!(matches!(meta.verify(b"tampered"), Err(ModelLoadError::Checksum { .. })));
    }

    #[test]
    fn test_checksum_is_optional() {
        let mut meta = metadata_for(b"x");
        meta.sha256 = None;
        assert!(meta.verify(b"anything").is_ok());
    }

    #[test]
    fn test_load_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.onnx");
        assert!(ModelMetadata::load_sidecar(&model).unwrap().is_none());

        let meta = metadata_for(b"bytes");
        std::fs::write(ModelMetadata::sidecar_path(&model), serde_json::to_string(&meta).unwrap()).unwrap();
        assert_eq!(ModelMetadata::load_sidecar(&model).unwrap(), Some(meta));

        std::fs::write(ModelMetadata::sidecar_path(&model), "{ not json").unwrap();
        assert!(matches!(
            ModelMetadata::load_sidecar(&model),
            Err(ModelLoadError::Metadata { .. })
        ));
    }
}
