//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The classifier was trained against exactly this order. Reordering,
//! inserting or removing a slot silently corrupts every prediction.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION and retrain
//! 2. Change order → increment FEATURE_VERSION and retrain
//! 3. Remove feature → increment FEATURE_VERSION and retrain

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Lexical (0-5) ===
    "domain_length",         // 0: Characters in host[:port]
    "domain_entropy",        // 1: Shannon entropy of [a-z0-9] chars in domain
    "query_params_count",    // 2: '&'-separated query tokens
    "path_tokens_count",     // 3: Non-empty '/'-separated path segments
    "hyphen_count",          // 4: '-' in full URL
    "digits_count",          // 5: Digits in full URL

    // === TLS / Registration / Hosting (6-10) ===
    "ssl_certificate",       // 6: 1 valid, 0 invalid, -1 undeterminable
    "domain_age_days",       // 7: Days since registration
    "temporary_domain",      // 8: Free/temporary hosting suffix
    "reputation_database",   // 9: Reputation report says unsafe
    "is_expired",            // 10: Registration expiration in the past

    // === Page content (11-15) ===
    "script_to_body_ratio",  // 11: <script> count / page length
    "hidden_tags_count",     // 12: Elements flagged hidden
    "total_tags_count",      // 13: All elements
    "iframe_count",          // 14: <iframe> + <frame>
    "favicon_local",         // 15: <link> pointing back at the site

    // === Misc (16-18) ===
    "is_ip",                 // 16: Host is an IP literal
    "page_token_count",      // 17: Whitespace tokens in page
    "abnormal_url",          // 18: Registered name absent from domain
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 19;

/// Value stored in a slot whose input was unavailable
pub const SENTINEL: f32 = -1.0;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
/// Used to detect layout mismatches against model metadata
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
     got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
