//! Inference Engine - ONNX Runtime Integration
//!
//! Loads the gradient-boosted classifier exported to ONNX and runs it over
//! one feature vector at a time.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::metadata::{ModelLoadError, ModelMetadata};
use super::{Classifier, InferenceError, Label};
use crate::logic::features::FEATURE_COUNT;

/// Output name used by sklearn-onnx classifiers
const DEFAULT_LABEL_OUTPUT: &str = "label";

/// ONNX-backed classifier. Weights never change after `load`.
pub struct OnnxClassifier {
    // `Session::run` needs `&mut`
    session: Mutex<Session>,
    label_output: String,
    metadata: Option<ModelMetadata>,
    name: String,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("name", &self.name)
            .field("label_output", &self.label_output)
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load the model at `path`, checking its sidecar metadata when present
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        log::info!("Loading ONNX model from: {}", path.display());

        if !path.exists() {
            return Err(ModelLoadError::NotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let metadata = ModelMetadata::load_sidecar(path)?;
        match &metadata {
            Some(meta) => meta.verify(&bytes)?,
            None => log::warn!(
                "No metadata next to {}; layout compatibility is unchecked",
                path.display()
            ),
        }

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Runtime(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelLoadError::Runtime(format!("Failed to set optimization: {}", e)))?
            .commit_from_memory(&bytes)
            .map_err(|e| ModelLoadError::Runtime(format!("Failed to load model: {}", e)))?;

        let label_output = metadata
            .as_ref()
            .and_then(|m| m.label_output.clone())
            .or_else(|| {
                session
                    .outputs
                    .iter()
                    .find(|o| o.name == DEFAULT_LABEL_OUTPUT)
                    .or_else(|| session.outputs.first())
                    .map(|o| o.name.clone())
            })
            .ok_or_else(|| ModelLoadError::Runtime("Model defines no outputs".to_string()))?;

        let name = metadata
            .as_ref()
            .and_then(|m| m.model_name.clone())
            .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "model".to_string());

        log::info!("ONNX model '{}' loaded ({} bytes, output '{}')", name, bytes.len(), label_output);

        Ok(Self {
            session: Mutex::new(session),
            label_output,
            metadata,
            name,
        })
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }
}

impl Classifier for OnnxClassifier {
    fn expected_features(&self) -> usize {
        self.metadata
            .as_ref()
            .map(|m| m.feature_count)
            .unwrap_or(FEATURE_COUNT)
    }

    fn predict(&self, features: &[f32]) -> Result<Label, InferenceError> {
        let start_time = std::time::Instant::now();

        let input_array = Array2::<f32>::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| InferenceError::Input(format!("Array error: {}", e)))?;
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Input(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Run(e.to_string()))?;

        let output = outputs
            .get(self.label_output.as_str())
            .ok_or_else(|| InferenceError::Output(format!("Missing output '{}'", self.label_output)))?;

        // Class index when exported with a label output, probability otherwise
        let label = match output.try_extract_tensor::<i64>() {
            Ok((_, data)) => data.first().copied().map(Label::from_class),
            Err(_) => {
                let (_, data) = output
                    .try_extract_tensor::<f32>()
                    .map_err(|e| InferenceError::Output(format!("Extract error: {}", e)))?;
                data.last().copied().map(Label::from_score)
            }
        };
        let label = label.ok_or_else(|| InferenceError::Output("Empty output tensor".to_string()))?;

        log::debug!(
            "Inference by '{}' took {}us",
            self.name,
            start_time.elapsed().as_micros()
        );

        Ok(label)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::{layout_hash, FEATURE_VERSION};
    use crate::logic::model::metadata::sha256_hex;

    #[test]
    fn test_missing_artifact_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxClassifier::load(dir.path().join("absent.onnx")).unwrap_err();
        assert!(matches!(err, ModelLoadError::NotFound(_)));
    }

    #[test]
    fn test_sidecar_layout_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.onnx");
        std::fs::write(&model, b"not really onnx").unwrap();

        let meta = ModelMetadata {
            model_name: None,
            feature_version: FEATURE_VERSION + 1,
            layout_hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            sha256: None,
            label_output: None,
        };
        std::fs::write(ModelMetadata::sidecar_path(&model), serde_json::to_vec(&meta).unwrap()).unwrap();

        let err = OnnxClassifier::load(&model).unwrap_err();
        assert!(matches!(err, ModelLoadError::Layout(_)));
    }

    #[test]
    fn test_checksum_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.onnx");
        std::fs::write(&model, b"corrupted download").unwrap();

        let meta = ModelMetadata {
            model_name: None,
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            sha256: Some(sha256_hex(b"original artifact")),
            label_output: None,
        };
        std::fs::write(ModelMetadata::sidecar_path(&model), serde_json::to_vec(&meta).unwrap()).unwrap();

        let err = OnnxClassifier::load(&model).unwrap_err();
        assert!(matches!(err, ModelLoadError::Checksum { .. }));
    }

    #[test]
    fn test_malformed_sidecar_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.onnx");
        std::fs::write(&model, b"bytes").unwrap();
        std::fs::write(ModelMetadata::sidecar_path(&model), "[]").unwrap();

        let err = OnnxClassifier::load(&model).unwrap_err();
        assert!(matches!(err, ModelLoadError::Metadata { .. }));
    }
}
