//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden from the environment (or a `.env` file).

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Phish Shield";

/// File name of the classifier artifact inside the data directory
pub const MODEL_FILE_NAME: &str = "model.onnx";

/// Content fetch timeout (seconds)
pub const DEFAULT_FETCH_TIMEOUT: u64 = 10;

/// Reputation report fetch timeout (seconds)
pub const DEFAULT_REPUTATION_TIMEOUT: u64 = 5;

/// WHOIS connect/read timeout (seconds)
pub const DEFAULT_WHOIS_TIMEOUT: u64 = 10;

/// TLS handshake timeout (seconds)
pub const DEFAULT_TLS_TIMEOUT: u64 = 5;

/// Reachability check timeout used when validating input (seconds)
pub const DEFAULT_VALIDATE_TIMEOUT: u64 = 3;

/// Reputation report page; the classified URL is appended verbatim
pub const DEFAULT_REPUTATION_ENDPOINT: &str = "https://www.siteadvisor.com/sitereport.html?url=";

/// WHOIS root server (answers with `refer:` to the TLD registry)
pub const DEFAULT_WHOIS_ROOT: &str = "whois.iana.org";

/// WHOIS TCP port
pub const DEFAULT_WHOIS_PORT: u16 = 43;

/// User-Agent sent by the HTTP probes
pub const DEFAULT_USER_AGENT: &str = concat!("phish-shield/", env!("CARGO_PKG_VERSION"));

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Get classifier artifact path from environment or use default
///
/// Default: `<data_dir>/phish-shield/model.onnx`, or `./model.onnx`
/// when the platform has no data directory.
pub fn get_model_path() -> PathBuf {
    if let Ok(path) = std::env::var("PHISH_MODEL_PATH") {
        return PathBuf::from(path);
    }

    dirs::data_dir()
        .map(|dir| dir.join("phish-shield").join(MODEL_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(MODEL_FILE_NAME))
}

pub fn get_fetch_timeout() -> u64 {
    env_u64("PHISH_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT)
}

pub fn get_reputation_timeout() -> u64 {
    env_u64("PHISH_REPUTATION_TIMEOUT_SECS", DEFAULT_REPUTATION_TIMEOUT)
}

pub fn get_whois_timeout() -> u64 {
    env_u64("PHISH_WHOIS_TIMEOUT_SECS", DEFAULT_WHOIS_TIMEOUT)
}

pub fn get_tls_timeout() -> u64 {
    env_u64("PHISH_TLS_TIMEOUT_SECS", DEFAULT_TLS_TIMEOUT)
}

pub fn get_validate_timeout() -> u64 {
    env_u64("PHISH_VALIDATE_TIMEOUT_SECS", DEFAULT_VALIDATE_TIMEOUT)
}

/// Get reputation endpoint from environment or use default
pub fn get_reputation_endpoint() -> String {
    std::env::var("PHISH_REPUTATION_ENDPOINT")
        .unwrap_or_else(|_| DEFAULT_REPUTATION_ENDPOINT.to_string())
}

pub fn get_whois_root() -> String {
    std::env::var("PHISH_WHOIS_ROOT")
        .unwrap_or_else(|_| DEFAULT_WHOIS_ROOT.to_string())
}

pub fn get_whois_port() -> u16 {
    std::env::var("PHISH_WHOIS_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_WHOIS_PORT)
}

pub fn get_user_agent() -> String {
    std::env::var("PHISH_USER_AGENT")
        .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string())
}

/// Check if input URLs must be reachable before classification
pub fn is_input_verification_enabled() -> bool {
    std::env::var("PHISH_VERIFY_INPUT")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}
