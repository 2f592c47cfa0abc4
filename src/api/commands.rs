//! Commands - entry points for callers
//!
//! Input validation, single-URL and batch classification on top of a
//! shared `Pipeline`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::logic::config::PipelineConfig;
use crate::logic::pipeline::{Classification, Pipeline};
use crate::logic::url_input::UrlInput;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// How strictly caller input is checked before classification
#[derive(Debug, Clone, Copy)]
pub struct ValidationPolicy {
    /// Require the URL to answer a GET first
    pub verify: bool,
    pub timeout: Duration,
}

impl From<&PipelineConfig> for ValidationPolicy {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            verify: config.verify_input,
            timeout: config.validate_timeout,
        }
    }
}

/// Outcome for one URL of a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    /// URL as given by the caller
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    fn classified(url: String, classification: Classification) -> Self {
        Self { url, classification: Some(classification), error: None }
    }

    fn failed(url: String, error: String) -> Self {
        Self { url, classification: None, error: Some(error) }
    }

    pub fn is_ok(&self) -> bool {
        self.classification.is_some()
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Normalize and check caller input.
///
/// With verification on, the URL must answer a GET (any status) within the
/// timeout and the URL reached after redirects is returned instead.
pub async fn validate_url(
    client: &reqwest::Client,
    raw: &str,
    policy: ValidationPolicy,
) -> PipelineResult<UrlInput> {
    let input = UrlInput::parse(raw)?;
    if !policy.verify {
        return Ok(input);
    }

    let response = client
        .get(input.as_str())
        .timeout(policy.timeout)
        .send()
        .await
        .map_err(|e| {
            log::debug!("Reachability check failed for {}: {}", input, e);
            PipelineError::Unreachable(input.to_string())
        })?;

    let final_url = response.url().as_str();
    if final_url != input.url().as_str() {
        log::debug!("{} redirected to {}", input, final_url);
    }
    UrlInput::parse(final_url)
}

/// Validate then classify one URL
pub async fn classify_url(
    pipeline: &Pipeline,
    raw: &str,
    policy: ValidationPolicy,
) -> PipelineResult<Classification> {
    let input = validate_url(pipeline.http_client(), raw, policy).await?;
    pipeline.classify(&input).await
}

/// Classify many URLs concurrently.
///
/// Entries come back in input order. A failing URL yields an entry with
/// `error` set and never aborts the rest.
pub async fn classify_batch(
    pipeline: Arc<Pipeline>,
    urls: Vec<String>,
    policy: ValidationPolicy,
) -> Vec<BatchEntry> {
    let tasks: Vec<_> = urls
        .into_iter()
        .map(|url| {
            let pipeline = Arc::clone(&pipeline);
            let target = url.clone();
            let handle = tokio::spawn(async move { classify_url(&pipeline, &target, policy).await });
            (url, handle)
        })
        .collect();

    let mut entries = Vec::with_capacity(tasks.len());
    for (url, handle) in tasks {
        let entry = match handle.await {
            Ok(Ok(classification)) => BatchEntry::classified(url, classification),
            Ok(Err(e)) => {
                log::warn!("Failed to classify {}: {}", url, e);
                BatchEntry::failed(url, e.to_string())
            }
            Err(e) => {
                log::error!("Classification task for {} aborted: {}", url, e);
                BatchEntry::failed(url, format!("classification task aborted: {}", e))
            }
        };
        entries.push(entry);
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::config::WhoisConfig;
    use crate::logic::model::Label;
    use crate::logic::pipeline::test_support::StubClassifier;
    use crate::logic::probes::test_support::{http_response, serve_once};

    const NO_VERIFY: ValidationPolicy = ValidationPolicy {
        verify: false,
        timeout: Duration::from_secs(2),
    };

    const VERIFY: ValidationPolicy = ValidationPolicy {
        verify: true,
        timeout: Duration::from_secs(2),
    };

    /// Every outbound channel points at a closed local port
    fn offline_config() -> PipelineConfig {
        PipelineConfig {
            fetch_timeout: Duration::from_secs(2),
            reputation_timeout: Duration::from_secs(2),
            tls_timeout: Duration::from_secs(2),
            reputation_endpoint: "http://127.0.0.1:1/?url=".to_string(),
            whois: WhoisConfig {
                root_server: "127.0.0.1".to_string(),
                port: 1,
                timeout: Duration::from_secs(2),
            },
            ..PipelineConfig::default()
        }
    }

    fn offline_pipeline(label: Label) -> Arc<Pipeline> {
        Arc::new(Pipeline::new(&offline_config(), Arc::new(StubClassifier::new(label))).unwrap())
    }

    #[test]
    fn test_policy_from_config() {
        let config = PipelineConfig {
            verify_input: false,
            validate_timeout: Duration::from_secs(7),
            ..PipelineConfig::default()
        };
        let policy = ValidationPolicy::from(&config);
        assert!(!policy.verify);
        assert_eq!(policy.timeout, Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_validate_without_verification() {
        let client = reqwest::Client::new();
        let input = validate_url(&client, "example.com/login", NO_VERIFY).await.unwrap();
        assert_eq!(input.as_str(), "https://example.com/login");

        let err = validate_url(&client, "ftp://example.com", NO_VERIFY).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_validate_reachable_url() {
        let addr = serve_once(http_response("404 Not Found", "gone")).await;
        let client = reqwest::Client::new();

        let input = validate_url(&client, &format!("http://{}/page", addr), VERIFY).await.unwrap();
        assert_eq!(input.as_str(), format!("http://{}/page", addr));
    }

    #[tokio::test]
    async fn test_validate_unreachable_url() {
        let client = reqwest::Client::new();
        let err = validate_url(&client, "http://127.0.0.1:1/", VERIFY).await.unwrap_err();
        assert!(matches!(err, PipelineError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_classify_url_with_every_probe_down() {
        let pipeline = offline_pipeline(Label::Malicious);
        let result = classify_url(&pipeline, "http://127.0.0.1:1/login", NO_VERIFY).await.unwrap();

        assert!(result.verdict.result);
        assert!(result.verdict.abnormal_url);
        assert!(!result.probe_summary.content);
        assert!(!result.probe_summary.registration);
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() {
        let pipeline = offline_pipeline(Label::Benign);
        let urls = vec![
            "http://127.0.0.1:1/a".to_string(),
            "ftp://example.com".to_string(),
            "http://127.0.0.1:1/b".to_string(),
        ];

        let entries = classify_batch(pipeline, urls.clone(), NO_VERIFY).await;

        assert_eq!(entries.len(), 3);
        for (entry, url) in entries.iter().zip(&urls) {
            assert_eq!(&entry.url, url);
        }
        assert!(entries[0].is_ok());
        assert!(!entries[1].is_ok());
        assert!(entries[1].error.as_deref().unwrap().contains("unsupported scheme"));
        assert!(entries[2].is_ok());
        assert!(!entries[2].classification.as_ref().unwrap().verdict.result);
    }
}
