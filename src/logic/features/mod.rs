//! Features Module - Feature Extraction Engine
//!
//! Turns a URL plus its probe bundle into the fixed 19-slot vector the
//! classifier was trained on. Extractor groups own disjoint slots; any
//! slot whose input is missing holds the `-1` sentinel.

pub mod content;
pub mod layout;
pub mod lexical;
pub mod registration;
pub mod reputation;
pub mod vector;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};

use crate::logic::probes::ProbeBundle;
use crate::logic::url_input::UrlInput;

// Re-export common types
pub use layout::{feature_index, feature_name, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, SENTINEL};
pub use vector::{ArityError, Feature, FeatureExtractor, FeatureVector, ProbeUnavailable};

use content::ContentFeatures;
use lexical::LexicalFeatures;
use registration::RegistrationFeatures;
use reputation::ReputationFeatures;

/// Assemble the feature vector for `input`.
///
/// `now` anchors the time-dependent registration features.
pub fn extract(input: &UrlInput, bundle: &ProbeBundle, now: DateTime<Utc>) -> FeatureVector {
    let lexical = LexicalFeatures::new(input);
    let registration = RegistrationFeatures::new(bundle.registration.as_ref(), input.domain(), now);
    let content = ContentFeatures::new(bundle.content.as_ref(), bundle.markup(), input.as_str(), input.domain());
    let trust = ReputationFeatures::new(bundle.certificate_status(), bundle.reputation.as_deref());

    let extractors: [&dyn FeatureExtractor; 4] = [&lexical, &trust, &registration, &content];

    let mut vector = FeatureVector::new();
    for extractor in extractors {
        extractor.extract(&mut vector);
    }
    vector
}
