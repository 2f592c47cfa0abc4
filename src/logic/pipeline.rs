//! Classification Pipeline
//!
//! URL → probes → feature vector → classifier → verdict.
//!
//! A `Pipeline` holds no per-request state. It is shared behind an `Arc`
//! and each classification builds its own `ProbeBundle`, so any number of
//! classifications can run at once.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::logic::config::PipelineConfig;
use crate::logic::features::{self, FeatureVector};
use crate::logic::model::Classifier;
use crate::logic::probes::{ProbeBundle, ProbeSummary, Prober};
use crate::logic::url_input::UrlInput;
use crate::logic::verdict::Verdict;

/// Everything known about one finished classification
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub url: String,
    pub verdict: Verdict,
    pub features: FeatureVector,
    pub probe_summary: ProbeSummary,
    pub elapsed_ms: u64,
    pub classified_at: DateTime<Utc>,
}

pub struct Pipeline {
    prober: Prober,
    classifier: Arc<dyn Classifier>,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig, classifier: Arc<dyn Classifier>) -> PipelineResult<Self> {
        Ok(Self::with_prober(Prober::new(config)?, classifier))
    }

    pub fn with_prober(prober: Prober, classifier: Arc<dyn Classifier>) -> Self {
        Self { prober, classifier }
    }

    pub fn http_client(&self) -> &reqwest::Client {
        self.prober.http()
    }

    /// Probe `input` and classify it
    pub async fn classify(&self, input: &UrlInput) -> PipelineResult<Classification> {
        let start = Instant::now();
        let bundle = self.prober.gather(input).await;
        let mut classification = self.evaluate(input, &bundle, Utc::now())?;
        classification.elapsed_ms = start.elapsed().as_millis() as u64;
        Ok(classification)
    }

    /// Classify from an already gathered bundle. CPU only.
    pub fn evaluate(
        &self,
        input: &UrlInput,
        bundle: &ProbeBundle,
        now: DateTime<Utc>,
    ) -> PipelineResult<Classification> {
        let start = Instant::now();
        let features = features::extract(input, bundle, now);
        log::debug!("Features for {}: {}", input, features.to_log_entry());

        let expected = self.classifier.expected_features();
        if features.len() != expected {
            log::error!(
                "Schema mismatch for {}: classifier '{}' expects {} features, got {}",
                input,
                self.classifier.name(),
                expected,
                features.len()
            );
            return Err(PipelineError::Schema {
                expected,
                actual: features.len(),
            });
        }
        features.validate()?;

        let label = self.classifier.predict(features.as_slice()).map_err(|e| {
            log::error!("Classifier '{}' failed on {}: {}", self.classifier.name(), input, e);
            e
        })?;
        let verdict = Verdict::aggregate(&features, label);
        let probe_summary = bundle.summary();

        log::info!(
            "Classified {} as {} (ssl={}, temporary={}, reputation={}, abnormal={})",
            input,
            if verdict.result { "malicious" } else { "benign" },
            verdict.ssl_certificate,
            verdict.temporary_domain,
            verdict.in_reputation_database,
            verdict.abnormal_url
        );

        Ok(Classification {
            url: input.as_str().to_string(),
            verdict,
            features,
            probe_summary,
            elapsed_ms: start.elapsed().as_millis() as u64,
            classified_at: now,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::logic::features::FEATURE_COUNT;
    use crate::logic::model::{Classifier, InferenceError, Label};

    /// Returns a fixed label and records how often it was asked
    pub struct StubClassifier {
        pub label: Label,
        pub expected: usize,
        pub calls: AtomicUsize,
    }

    impl StubClassifier {
        pub fn new(label: Label) -> Self {
            Self {
                label,
                expected: FEATURE_COUNT,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn expecting(mut self, expected: usize) -> Self {
            self.expected = expected;
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Classifier for StubClassifier {
        fn expected_features(&self) -> usize {
            self.expected
        }

        fn predict(&self, features: &[f32]) -> Result<Label, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if features.len() != self.expected {
                return Err(InferenceError::Input(format!("got {} features", features.len())));
            }
            Ok(self.label)
        }

        fn name(&self) -> &str {
            "stub"
        }
    }
}
