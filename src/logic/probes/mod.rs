//! Probes Module - External Data Gathering
//!
//! Each probe wraps one unreliable channel (page fetch, WHOIS, TLS,
//! reputation report) and reports failure as absent data, never as an error.
//! The four network probes run concurrently; markup is parsed lazily from
//! the fetched content, at most once per classification.

pub mod certificate;
pub mod fetch;
pub mod markup;
pub mod reputation;
pub mod whois;

use std::time::Duration;

use once_cell::unsync::OnceCell;
use serde::Serialize;

use crate::error::PipelineError;
use crate::logic::config::{PipelineConfig, WhoisConfig};
use crate::logic::url_input::UrlInput;

pub use certificate::CertStatus;
pub use fetch::HttpContent;
pub use markup::Markup;
pub use whois::RegistrationRecord;

// ============================================================================
// PROBE BUNDLE
// ============================================================================

/// Per-classification cache of probe outputs. Immutable once gathered.
#[derive(Debug, Default)]
pub struct ProbeBundle {
    pub content: Option<HttpContent>,
    pub registration: Option<RegistrationRecord>,
    pub certificate: Option<CertStatus>,
    /// Raw reputation report page
    pub reputation: Option<String>,
    markup: OnceCell<Option<Markup>>,
}

impl ProbeBundle {
    /// Bundle where every probe failed
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_parts(
        content: Option<HttpContent>,
        registration: Option<RegistrationRecord>,
        certificate: CertStatus,
        reputation: Option<String>,
    ) -> Self {
        Self {
            content,
            registration,
            certificate: Some(certificate),
            reputation,
            markup: OnceCell::new(),
        }
    }

    pub fn certificate_status(&self) -> CertStatus {
        self.certificate.unwrap_or(CertStatus::Undeterminable)
    }

    /// DOM handle over the fetched page, built on first use
    pub fn markup(&self) -> Option<&Markup> {
        self.markup
            .get_or_init(|| self.content.as_ref().and_then(|c| Markup::parse(&c.body)))
            .as_ref()
    }

    pub fn summary(&self) -> ProbeSummary {
        ProbeSummary {
            content: self.content.is_some(),
            registration: self.registration.is_some(),
            certificate: self.certificate_status(),
            reputation: self.reputation.is_some(),
            markup: self.markup().is_some(),
        }
    }
}

/// Which probes produced data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeSummary {
    pub content: bool,
    pub registration: bool,
    pub certificate: CertStatus,
    pub reputation: bool,
    pub markup: bool,
}

// ============================================================================
// PROBER
// ============================================================================

/// Runs all probes for one URL
#[derive(Debug, Clone)]
pub struct Prober {
    http: reqwest::Client,
    fetch_timeout: Duration,
    reputation_timeout: Duration,
    tls_timeout: Duration,
    reputation_endpoint: String,
    whois: WhoisConfig,
}

impl Prober {
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PipelineError::HttpClient(e.to_string()))?;

        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: reqwest::Client, config: &PipelineConfig) -> Self {
        Self {
            http,
            fetch_timeout: config.fetch_timeout,
            reputation_timeout: config.reputation_timeout,
            tls_timeout: config.tls_timeout,
            reputation_endpoint: config.reputation_endpoint.clone(),
            whois: config.whois.clone(),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Query every probe once, concurrently. Each keeps its own timeout;
    /// a slow probe never cancels the others.
    pub async fn gather(&self, input: &UrlInput) -> ProbeBundle {
        let (content, registration, certificate, reputation) = tokio::join!(
            fetch::fetch_content(&self.http, input.as_str(), self.fetch_timeout),
            whois::lookup(input.host(), &self.whois),
            certificate::check(input, self.tls_timeout),
            reputation::fetch_report(
                &self.http,
                &self.reputation_endpoint,
                input.as_str(),
                self.reputation_timeout,
            ),
        );

        ProbeBundle::from_parts(content, registration, certificate, reputation)
    }
}

// ============================================================================
// TEST SUPPORT
// ============================================================================
