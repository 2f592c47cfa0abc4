//! Feature Vector - Core data structure for ML input
//!
//! **Versioned feature vector with layout validation**
//!
//! Slots are addressed through [`Feature`], never through bare indices,
//! so the ordering contract in `layout.rs` is enforced by the compiler.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::layout::{
    layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT,
    FEATURE_VERSION, SENTINEL,
};

// ============================================================================
// FEATURE INDEX
// ============================================================================

/// One slot of the vector. Discriminant == index in `FEATURE_LAYOUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum Feature {
    DomainLength = 0,
    DomainEntropy = 1,
    QueryParamsCount = 2,
    PathTokensCount = 3,
    HyphenCount = 4,
    DigitsCount = 5,
    SslCertificate = 6,
    DomainAgeDays = 7,
    TemporaryDomain = 8,
    ReputationDatabase = 9,
    IsExpired = 10,
    ScriptToBodyRatio = 11,
    HiddenTagsCount = 12,
    TotalTagsCount = 13,
    IframeCount = 14,
    FaviconLocal = 15,
    IsIp = 16,
    PageTokenCount = 17,
    AbnormalUrl = 18,
}

impl Feature {
    /// All features in vector order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::DomainLength,
        Feature::DomainEntropy,
        Feature::QueryParamsCount,
        Feature::PathTokensCount,
        Feature::HyphenCount,
        Feature::DigitsCount,
        Feature::SslCertificate,
        Feature::DomainAgeDays,
        Feature::TemporaryDomain,
        Feature::ReputationDatabase,
        Feature::IsExpired,
        Feature::ScriptToBodyRatio,
        Feature::HiddenTagsCount,
        Feature::TotalTagsCount,
        Feature::IframeCount,
        Feature::FaviconLocal,
        Feature::IsIp,
        Feature::PageTokenCount,
        Feature::AbnormalUrl,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        FEATURE_LAYOUT[self.index()]
    }
}

// ============================================================================
// FEATURE FAILURE
// ============================================================================

/// Why a feature could not be computed. Collapsed to the `-1` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProbeUnavailable {
    #[error("page content unavailable")]
    Content,
    #[error("markup handle unavailable")]
    Markup,
    #[error("registration record unavailable")]
    Registration,
    #[error("reputation report unavailable")]
    Reputation,
    #[error("certificate status undeterminable")]
    Certificate,
    #[error("computation undefined")]
    Undefined,
}

pub type FeatureResult = Result<f32, ProbeUnavailable>;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned Feature Vector with layout metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    values: [f32; FEATURE_COUNT],
}

/// Raw values do not have the schema length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} feature values, got {actual}")]
pub struct ArityError {
    pub expected: usize,
    pub actual: usize,
}

impl FeatureVector {
    /// Every slot starts as "unknown"
    pub fn new() -> Self {
        Self::from_values([SENTINEL; FEATURE_COUNT])
    }

    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Build from raw values. Never pads or truncates.
    pub fn try_from_slice(values: &[f32]) -> Result<Self, ArityError> {
        let array: [f32; FEATURE_COUNT] = values.try_into().map_err(|_| ArityError {
            expected: FEATURE_COUNT,
            actual: values.len(),
        })?;
        Ok(Self::from_values(array))
    }

    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, feature: Feature) -> f32 {
        self.values[feature.index()]
    }

    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        super::layout::feature_index(name).map(|i| self.values[i])
    }

    pub fn set(&mut self, feature: Feature, value: f32) {
        self.values[feature.index()] = value;
    }

    /// Store a feature outcome; failures become the sentinel
    pub fn put(&mut self, feature: Feature, result: FeatureResult) {
        let value = match result {
            Ok(value) => value,
            Err(reason) => {
                log::debug!("feature {} unavailable: {}", feature.name(), reason);
                SENTINEL
            }
        };
        self.set(feature, value);
    }

    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    pub fn is_compatible(&self) -> bool {
        self.validate().is_ok()
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[f32; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f32; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

impl TryFrom<Vec<f32>> for FeatureVector {
    type Error = ArityError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::try_from_slice(&values)
    }
}

// ============================================================================
// FEATURE EXTRACTOR TRAIT
// ============================================================================

/// Trait for feature extractors
///
/// Each extractor owns a disjoint group of slots and writes all of them,
/// so a failure inside one group never touches another.
pub trait FeatureExtractor {
    /// Slots written by this extractor
    fn features(&self) -> &'static [Feature];

    /// Extract features and update the vector
    fn extract(&self, vector: &mut FeatureVector);
}

// ============================================================================
// TESTS
// ============================================================================
