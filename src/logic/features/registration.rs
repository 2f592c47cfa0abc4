//! Registration Feature Extraction
//!
//! Domain age, expiry and naming consistency from the WHOIS record.

use chrono::{DateTime, Utc};

use super::vector::{Feature, FeatureExtractor, FeatureResult, FeatureVector, ProbeUnavailable};
use crate::logic::probes::RegistrationRecord;

pub struct RegistrationFeatures<'a> {
    pub record: Option<&'a RegistrationRecord>,
    /// Network location of the classified URL
    pub domain: &'a str,
    /// Reference instant for age / expiry
    pub now: DateTime<Utc>,
}

impl<'a> RegistrationFeatures<'a> {
    pub fn new(record: Option<&'a RegistrationRecord>, domain: &'a str, now: DateTime<Utc>) -> Self {
        Self { record, domain, now }
    }

    fn record(&self) -> Result<&'a RegistrationRecord, ProbeUnavailable> {
        self.record.ok_or(ProbeUnavailable::Registration)
    }

    /// Whole days since the domain was created
    pub fn domain_age_days(&self) -> FeatureResult {
        let created = self.record()?.creation_date.ok_or(ProbeUnavailable::Registration)?;
        Ok((self.now - created).num_days() as f32)
    }

    /// 1 if the registration has lapsed, 0 if it runs into the future
    pub fn is_expired(&self) -> FeatureResult {
        let expires = self.record()?.expiration_date.ok_or(ProbeUnavailable::Registration)?;
        Ok(if expires > self.now { 0.0 } else { 1.0 })
    }

    /// 1 if no registered name occurs in the URL's domain, 0 if one does.
    /// A record without names counts as abnormal.
    pub fn abnormal_url(&self) -> FeatureResult {
        let record = self.record()?;
        let domain = self.domain.to_ascii_lowercase();
        let matched = record
            .registered_names
            .iter()
            .any(|name| !name.is_empty() && domain.contains(&name.to_ascii_lowercase()));
        Ok(if matched { 0.0 } else { 1.0 })
    }
}

impl FeatureExtractor for RegistrationFeatures<'_> {
    fn features(&self) -> &'static [Feature] {
        &[Feature::DomainAgeDays, Feature::IsExpired, Feature::AbnormalUrl]
    }

    fn extract(&self, vector: &mut FeatureVector) {
        vector.put(Feature::DomainAgeDays, self.domain_age_days());
        vector.put(Feature::IsExpired, self.is_expired());
        vector.put(Feature::AbnormalUrl, self.abnormal_url());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn record(names: &[&str]) -> RegistrationRecord {
        RegistrationRecord {
            creation_date: Some(now() - Duration::days(400)),
            expiration_date: Some(now() + Duration::days(30)),
            registered_names: names.iter().map(|s| s.to_string()).collect(),
            registrar: None,
        }
    }

    #[test]
    fn test_age_and_expiry() {
        let rec = record(&["example.com"]);
        let features = RegistrationFeatures::new(Some(&rec), "example.com", now());
        assert_eq!(features.domain_age_days(), Ok(400.0));
        assert_eq!(features.is_expired(), Ok(0.0));
    }

    #[test]
    fn test_expired_registration() {
        let mut rec = record(&["example.com"]);
        rec.expiration_date = Some(now() - Duration::days(1));
        let features = RegistrationFeatures::new(Some(&rec), "example.com", now());
        assert_eq!(features.is_expired(), Ok(1.0));
    }

    #[test]
    fn test_missing_record_is_unavailable() {
        let features = RegistrationFeatures::new(None, "example.com", now());
        assert_eq!(features.domain_age_days(), Err(ProbeUnavailable::Registration));
        assert_eq!(features.is_expired(), Err(ProbeUnavailable::Registration));
        assert_eq!(features.abnormal_url(), Err(ProbeUnavailable::Registration));
    }

    #[test]
    fn test_missing_dates_are_unavailable() {
        let rec = RegistrationRecord {
            registered_names: vec!["example.com".to_string()],
            ..Default::default()
        };
        let features = RegistrationFeatures::new(Some(&rec), "example.com", now());
        assert!(features.domain_age_days().is_err());
        assert!(features.is_expired().is_err());
        assert_eq!(features.abnormal_url(), Ok(0.0));
    }

    #[test]
    fn test_abnormal_url() {
        let rec = record(&["example.com"]);
        let matching = RegistrationFeatures::new(Some(&rec), "login.example.com", now());
        assert_eq!(matching.abnormal_url(), Ok(0.0));

        let other = RegistrationFeatures::new(Some(&rec), "examp1e-login.net", now());
        assert_eq!(other.abnormal_url(), Ok(1.0));

        let nameless = record(&[]);
        let features = RegistrationFeatures::new(Some(&nameless), "example.com", now());
        assert_eq!(features.abnormal_url(), Ok(1.0));
    }
}
