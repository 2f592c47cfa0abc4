//! Pipeline Configuration
//!
//! Timeouts, endpoints and artifact location for one classifier process.
//! Built once at startup and shared read-only by every classification.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants;

/// WHOIS lookup settings
#[derive(Debug, Clone)]
pub struct WhoisConfig {
    /// First server queried (IANA root by default)
    pub root_server: String,
    pub port: u16,
    pub timeout: Duration,
}

impl Default for WhoisConfig {
    fn default() -> Self {
        Self {
            root_server: constants::DEFAULT_WHOIS_ROOT.to_string(),
            port: constants::DEFAULT_WHOIS_PORT,
            timeout: Duration::from_secs(constants::DEFAULT_WHOIS_TIMEOUT),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Classifier artifact (ONNX)
    pub model_path: PathBuf,

    /// Page content fetch timeout
    pub fetch_timeout: Duration,

    /// Reputation report fetch timeout
    pub reputation_timeout: Duration,

    /// TLS handshake timeout
    pub tls_timeout: Duration,

    /// Reachability check timeout for input validation
    pub validate_timeout: Duration,

    /// Reputation report page prefix
    pub reputation_endpoint: String,

    pub whois: WhoisConfig,

    pub user_agent: String,

    /// Reject URLs that do not answer before classifying them
    pub verify_input: bool,
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            model_path: constants::get_model_path(),
            fetch_timeout: Duration::from_secs(constants::get_fetch_timeout()),
            reputation_timeout: Duration::from_secs(constants::get_reputation_timeout()),
            tls_timeout: Duration::from_secs(constants::get_tls_timeout()),
            validate_timeout: Duration::from_secs(constants::get_validate_timeout()),
            reputation_endpoint: constants::get_reputation_endpoint(),
            whois: WhoisConfig {
                root_server: constants::get_whois_root(),
                port: constants::get_whois_port(),
                timeout: Duration::from_secs(constants::get_whois_timeout()),
            },
            user_agent: constants::get_user_agent(),
            verify_input: constants::is_input_verification_enabled(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(constants::MODEL_FILE_NAME),
            fetch_timeout: Duration::from_secs(constants::DEFAULT_FETCH_TIMEOUT),
            reputation_timeout: Duration::from_secs(constants::DEFAULT_REPUTATION_TIMEOUT),
            tls_timeout: Duration::from_secs(constants::DEFAULT_TLS_TIMEOUT),
            validate_timeout: Duration::from_secs(constants::DEFAULT_VALIDATE_TIMEOUT),
            reputation_endpoint: constants::DEFAULT_REPUTATION_ENDPOINT.to_string(),
            whois: WhoisConfig::default(),
            user_agent: constants::DEFAULT_USER_AGENT.to_string(),
            verify_input: true,
        }
    }
}
