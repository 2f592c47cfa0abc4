//! Trust Signal Extraction
//!
//! Third-party judgements about the site: the TLS certificate verdict and
//! the reputation report. The report scrape is best-effort; it reads the
//! third `<span>` of the page and looks for the "is safe" phrase.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::vector::{Feature, FeatureExtractor, FeatureResult, FeatureVector, ProbeUnavailable};
use crate::logic::probes::markup::selector;
use crate::logic::probes::CertStatus;

static SPAN: Lazy<Selector> = Lazy::new(|| selector("span"));

/// Position of the verdict span on the report page
const VERDICT_SPAN_INDEX: usize = 2;

const SAFE_PHRASE: &str = "is safe";

pub struct ReputationFeatures<'a> {
    pub certificate: CertStatus,
    /// Raw report page
    pub report: Option<&'a str>,
}

impl<'a> ReputationFeatures<'a> {
    pub fn new(certificate: CertStatus, report: Option<&'a str>) -> Self {
        Self { certificate, report }
    }

    /// 1 valid, 0 invalid; undeterminable passes through as -1
    pub fn ssl_certificate(&self) -> FeatureResult {
        Ok(self.certificate.as_feature())
    }

    /// 1 if the report flags the site, 0 if it calls it safe
    pub fn reputation_database(&self) -> FeatureResult {
        let report = self.report.ok_or(ProbeUnavailable::Reputation)?;
        let document = Html::parse_document(report);
        let verdict = document
            .select(&SPAN)
            .nth(VERDICT_SPAN_INDEX)
            .ok_or(ProbeUnavailable::Undefined)?;

        let text: String = verdict.text().collect();
        Ok(if text.contains(SAFE_PHRASE) { 0.0 } else { 1.0 })
    }
}

impl FeatureExtractor for ReputationFeatures<'_> {
    fn features(&self) -> &'static [Feature] {
        &[Feature::SslCertificate, Feature::ReputationDatabase]
    }

    fn extract(&self, vector: &mut FeatureVector) {
        vector.put(Feature::SslCertificate, self.ssl_certificate());
        vector.put(Feature::ReputationDatabase, self.reputation_database());
    }
}
