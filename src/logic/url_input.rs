//! URL Input - parsed, normalized classification target
//!
//! Immutable once parsed. Scheme-less input is prefixed with `https://`
//! before anything touches the network.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

use crate::error::PipelineError;

static SCHEME_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("scheme regex"));

/// A URL ready for probing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlInput {
    /// Normalized string as given by the caller (scheme guaranteed)
    raw: String,
    parsed: Url,
    /// Network location: host plus explicit port
    domain: String,
}

impl UrlInput {
    /// Prefix `https://` when the input carries no scheme
    pub fn normalize(input: &str) -> String {
        let trimmed = input.trim();
        if SCHEME_PREFIX.is_match(trimmed) {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        }
    }

    /// Normalize and parse. Only http(s) URLs with a host are accepted.
    pub fn parse(input: &str) -> Result<Self, PipelineError> {
        let raw = Self::normalize(input);
        if raw == "https://" {
            return Err(PipelineError::InvalidUrl("empty url".to_string()));
        }

        let parsed = Url::parse(&raw)
            .map_err(|e| PipelineError::InvalidUrl(format!("{}: {}", raw, e)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(PipelineError::InvalidUrl(format!("unsupported scheme '{}'", other)));
            }
        }

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| PipelineError::InvalidUrl(format!("{}: missing host", raw)))?;

        let domain = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self { raw, parsed, domain })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.parsed
    }

    pub fn scheme(&self) -> &str {
        self.parsed.scheme()
    }

    pub fn is_https(&self) -> bool {
        self.parsed.scheme() == "https"
    }

    /// Host without port; IPv6 literals keep their brackets
    pub fn host(&self) -> &str {
        self.parsed.host_str().unwrap_or_default()
    }

    /// Host plus explicit port (`example.com:8080`)
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn port_or_default(&self) -> u16 {
        self.parsed.port_or_known_default().unwrap_or(443)
    }

    pub fn path(&self) -> &str {
        self.parsed.path()
    }

    /// Raw query string, empty when absent
    pub fn query(&self) -> &str {
        self.parsed.query().unwrap_or_default()
    }
}

impl std::fmt::Display for UrlInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}
