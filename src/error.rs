//! Error handling

use thiserror::Error;

use crate::logic::features::layout::LayoutMismatchError;
use crate::logic::model::InferenceError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort one classification.
///
/// Probe and feature failures never show up here: they are absorbed
/// into the `-1` sentinel before the classifier runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input is not an http(s) URL with a host
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Input URL did not answer the reachability check
    #[error("url unreachable: {0}")]
    Unreachable(String),

    /// Assembled vector does not have the arity the classifier was trained on
    #[error("feature schema mismatch: classifier expects {expected} features, got {actual}")]
    Schema { expected: usize, actual: usize },

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("http client error: {0}")]
    HttpClient(String),
}
