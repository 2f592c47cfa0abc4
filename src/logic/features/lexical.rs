//! Lexical Feature Extraction
//!
//! Features computed from the URL string alone. These never need a probe.

use std::net::IpAddr;

use super::vector::{Feature, FeatureExtractor, FeatureResult, FeatureVector};
use crate::logic::url_input::UrlInput;

/// Free / temporary hosting platforms (shared hosts, static-site hosts, page builders)
pub const TEMPORARY_DOMAIN_PLATFORMS: &[&str] = &[
    "herokuapp.com", "github.io", "000webhostapp.com", "freenom.com", "repl.co", "glitch.me",
    "netlify.app", "surge.sh", "pages.dev", "fly.dev", "firebaseapp.com", "awsstatic.com",
    "azurewebsites.net", "vercel.app", "web.app", "appspot.com", "appchkr.com", "blogspot.com",
    "domains.google", "hostingerapp.com", "infomaniak.com", "myfreesites.net", "square7.ch",
    "wixsite.com", "zohosites.in", "weebly.com", "squarespace.com", "blogger.com", "tumblr.com",
    "ghost.io", "strikingly.com", "jimdo.com", "webflow.io", "shopify.com", "bigcartel.com",
    "storenvy.com", "ecwid.com", "tictail.com", "gumroad.com", "sellfy.com", "fastspring.com",
    "sendowl.com", "paddle.com", "gumtree.com", "mozello.com", "ucraft.com", "carrd.co",
    "launchrock.com", "tilda.cc", "bubble.io", "instapage.com", "unbounce.com", "leadpages.com",
    "getresponse.com", "wordpress.com",
];

const ENTROPY_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Shannon entropy (base 2) of the `[a-z0-9]` characters of `domain`,
/// rounded to two decimals.
///
/// Frequencies are taken relative to the full domain length, so
/// separators and other characters dilute the distribution.
pub fn domain_entropy(domain: &str) -> f32 {
    let total = domain.chars().count();
    if total == 0 {
        return 0.0;
    }

    let mut freq = [0usize; 36];
    for c in domain.chars() {
        if let Some(i) = ENTROPY_ALPHABET.find(c) {
            freq[i] += 1;
        }
    }

    let entropy: f64 = freq
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum();

    ((entropy * 100.0).round() / 100.0) as f32
}

/// Number of `&`-separated query tokens, 0 for an empty query
pub fn query_params_count(query: &str) -> usize {
    if query.is_empty() {
        0
    } else {
        query.split('&').count()
    }
}

/// Number of non-empty `/`-separated path segments
pub fn path_tokens_count(path: &str) -> usize {
    path.split('/').filter(|t| !t.is_empty()).count()
}

pub fn hyphen_count(url: &str) -> usize {
    url.matches('-').count()
}

pub fn digits_count(url: &str) -> usize {
    url.chars().filter(|c| c.is_ascii_digit()).count()
}

/// 1 if the domain is, or sits under, a known temporary hosting platform
pub fn temporary_domain(domain: &str) -> f32 {
    let host = domain.split(':').next().unwrap_or(domain).to_ascii_lowercase();
    let hit = TEMPORARY_DOMAIN_PLATFORMS.iter().any(|platform| {
        host == *platform || host.ends_with(&format!(".{}", platform))
    });
    if hit { 1.0 } else { 0.0 }
}

/// 1 if the network location is a literal IP address
pub fn is_ip(domain: &str) -> f32 {
    let literal = domain.trim_start_matches('[').trim_end_matches(']');
    if literal.parse::<IpAddr>().is_ok() { 1.0 } else { 0.0 }
}

/// URL-only features
pub struct LexicalFeatures<'a> {
    pub input: &'a UrlInput,
}

impl<'a> LexicalFeatures<'a> {
    pub fn new(input: &'a UrlInput) -> Self {
        Self { input }
    }

    fn domain_length(&self) -> FeatureResult {
        Ok(self.input.domain().chars().count() as f32)
    }
}

impl FeatureExtractor for LexicalFeatures<'_> {
    fn features(&self) -> &'static [Feature] {
        &[
            Feature::DomainLength,
            Feature::DomainEntropy,
            Feature::QueryParamsCount,
            Feature::PathTokensCount,
            Feature::HyphenCount,
            Feature::DigitsCount,
            Feature::TemporaryDomain,
            Feature::IsIp,
        ]
    }

    fn extract(&self, vector: &mut FeatureVector) {
        let domain = self.input.domain();
        let url = self.input.as_str();

        vector.put(Feature::DomainLength, self.domain_length());
        vector.set(Feature::DomainEntropy, domain_entropy(domain));
        vector.set(Feature::QueryParamsCount, query_params_count(self.input.query()) as f32);
        vector.set(Feature::PathTokensCount, path_tokens_count(self.input.path()) as f32);
        vector.set(Feature::HyphenCount, hyphen_count(url) as f32);
        vector.set(Feature::DigitsCount, digits_count(url) as f32);
        vector.set(Feature::TemporaryDomain, temporary_domain(domain));
        vector.set(Feature::IsIp, is_ip(domain));
    }
}
