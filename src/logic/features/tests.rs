//! Integration Tests for Feature Extraction Modules
//!
//! Extractor groups combined over realistic and degraded probe bundles.

#[cfg(test)]
mod integration_tests {
    use std::collections::HashSet;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::logic::features::{
        content::ContentFeatures,
        extract,
        lexical::{self, LexicalFeatures},
        registration::RegistrationFeatures,
        reputation::ReputationFeatures,
        vector::{Feature, FeatureExtractor},
        FEATURE_COUNT, SENTINEL,
    };
    use crate::logic::probes::{CertStatus, HttpContent, ProbeBundle, RegistrationRecord};
    use crate::logic::url_input::UrlInput;

    const PAGE: &str = r#"<html><head><title>Sign in</title><link rel="icon" href="/favicon.ico"></head>
<body><form><input type="password"></form><iframe src="x"></iframe><script>go()</script></body></html>"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    fn full_bundle() -> ProbeBundle {
        ProbeBundle::from_parts(
            Some(HttpContent {
                status: 200,
                final_url: "https://secure-login.example.com/".to_string(),
                headers: vec![],
                body: PAGE.to_string(),
            }),
            Some(RegistrationRecord {
                creation_date: Some(now() - Duration::days(12)),
                expiration_date: Some(now() + Duration::days(353)),
                registered_names: vec!["example.com".to_string()],
                registrar: None,
            }),
            CertStatus::Valid,
            Some("<span></span><span></span><span>This link is safe.</span>".to_string()),
        )
    }

    /// Extractor groups must cover every slot exactly once
    #[test]
    fn test_extractor_groups_partition_the_layout() {
        let input = UrlInput::parse("https://example.com").unwrap();
        let bundle = ProbeBundle::empty();

        let lexical = LexicalFeatures::new(&input);
        let registration = RegistrationFeatures::new(None, input.domain(), now());
        let content = ContentFeatures::new(None, None, input.as_str(), input.domain());
        let trust = ReputationFeatures::new(bundle.certificate_status(), None);
        let groups: [&dyn FeatureExtractor; 4] = [&lexical, &registration, &content, &trust];

        let mut seen = HashSet::new();
        for group in groups {
            for feature in group.features() {
                assert!(seen.insert(*feature), "{:?} owned by two groups", feature);
            }
        }
        assert_eq!(seen.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_full_bundle_vector() {
        let input = UrlInput::parse("https://secure-login.example.com/account/verify?id=42&t=1").unwrap();
        let vector = extract(&input, &full_bundle(), now());

        assert_eq!(vector.len(), FEATURE_COUNT);
        assert_eq!(vector.get(Feature::DomainLength), 24.0);
        assert_eq!(vector.get(Feature::QueryParamsCount), 2.0);
        assert_eq!(vector.get(Feature::PathTokensCount), 2.0);
        assert_eq!(vector.get(Feature::HyphenCount), 1.0);
        assert_eq!(vector.get(Feature::DigitsCount), 3.0);
        assert_eq!(vector.get(Feature::SslCertificate), 1.0);
        assert_eq!(vector.get(Feature::DomainAgeDays), 12.0);
        assert_eq!(vector.get(Feature::TemporaryDomain), 0.0);
        assert_eq!(vector.get(Feature::ReputationDatabase), 0.0);
        assert_eq!(vector.get(Feature::IsExpired), 0.0);
        assert!(vector.get(Feature::ScriptToBodyRatio) > 0.0);
        assert_eq!(vector.get(Feature::IframeCount), 1.0);
        assert_eq!(vector.get(Feature::FaviconLocal), 1.0);
        assert_eq!(vector.get(Feature::IsIp), 0.0);
        assert!(vector.get(Feature::PageTokenCount) > 0.0);
        assert_eq!(vector.get(Feature::AbnormalUrl), 0.0);
    }

    /// Content failure degrades only the content slots
    #[test]
    fn test_failed_fetch_only_degrades_content_features() {
        let input = UrlInput::parse("https://my-bank-login.herokuapp.com/a/b").unwrap();
        let vector = extract(&input, &ProbeBundle::empty(), now());

        assert_eq!(vector.len(), FEATURE_COUNT);
        for feature in [
            Feature::ScriptToBodyRatio,
            Feature::HiddenTagsCount,
            Feature::TotalTagsCount,
            Feature::IframeCount,
            Feature::FaviconLocal,
            Feature::PageTokenCount,
        ] {
            assert_eq!(vector.get(feature), SENTINEL, "{:?}", feature);
        }

        assert_eq!(vector.get(Feature::DomainLength), 27.0);
        assert_eq!(vector.get(Feature::HyphenCount), 2.0);
        assert_eq!(vector.get(Feature::IsIp), 0.0);
        assert_eq!(vector.get(Feature::TemporaryDomain), 1.0);
        assert_eq!(vector.get(Feature::PathTokensCount), 2.0);
    }

    #[test]
    fn test_all_probes_failed_still_full_length() {
        let input = UrlInput::parse("http://10.0.0.7/login").unwrap();
        let vector = extract(&input, &ProbeBundle::empty(), now());

        assert_eq!(vector.len(), FEATURE_COUNT);
        assert!(vector.is_compatible());
        assert_eq!(vector.get(Feature::IsIp), 1.0);
        assert_eq!(vector.get(Feature::SslCertificate), SENTINEL);
        assert_eq!(vector.get(Feature::DomainAgeDays), SENTINEL);
        assert_eq!(vector.get(Feature::IsExpired), SENTINEL);
        assert_eq!(vector.get(Feature::ReputationDatabase), SENTINEL);
        assert_eq!(vector.get(Feature::AbnormalUrl), SENTINEL);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let input = UrlInput::parse("https://secure-login.example.com/account").unwrap();
        let bundle = full_bundle();
        assert_eq!(extract(&input, &bundle, now()), extract(&input, &bundle, now()));
    }

    #[test]
    fn test_entropy_invariant_to_reordering() {
        let samples = ["paypal-secure.com", "a1b2c3.net", "zzzqqq.io", "x"];
        for domain in samples {
            let reversed: String = domain.chars().rev().collect();
            let e1 = lexical::domain_entropy(domain);
            let e2 = lexical::domain_entropy(&reversed);
            assert_eq!(e1, e2, "{}", domain);
            assert!(e1 >= 0.0);
        }
    }
}
