//! Logic Module - Feature extraction and classification engines
//!
//! ## Architecture
//! - `probes/` - External data gathering (fetch, WHOIS, TLS, reputation, markup)
//! - `features/` - Feature extraction into the versioned 19-slot vector
//! - `model/` - Classifier adapter (ONNX)
//! - `verdict` - Result aggregation
//! - `pipeline` - Orchestration of the above

pub mod config;
pub mod url_input;

pub mod probes;
pub mod features;
pub mod model;

pub mod verdict;
pub mod pipeline;
