//! Content Feature Extraction
//!
//! Page structure signals over the fetched body and its markup.
//! Every feature here degrades to the sentinel when the page is missing.

use once_cell::sync::Lazy;
use scraper::Selector;

use super::vector::{Feature, FeatureExtractor, FeatureResult, FeatureVector, ProbeUnavailable};
use crate::logic::probes::markup::selector;
use crate::logic::probes::{HttpContent, Markup};

static SCRIPT: Lazy<Selector> = Lazy::new(|| selector("script"));
static IFRAME: Lazy<Selector> = Lazy::new(|| selector("iframe"));
static FRAME: Lazy<Selector> = Lazy::new(|| selector("frame"));
static HEAD: Lazy<Selector> = Lazy::new(|| selector("head"));
static LINK_HREF: Lazy<Selector> = Lazy::new(|| selector("link[href]"));

/// Hidden-element rules; matches are summed, an element hit by two rules counts twice
static HIDDEN_RULES: Lazy<Vec<Selector>> = Lazy::new(|| {
    [".hidden", "#hidden", r#"[visibility="none"]"#, r#"[display="none"]"#]
        .iter()
        .map(|css| selector(css))
        .collect()
});

pub struct ContentFeatures<'a> {
    pub content: Option<&'a HttpContent>,
    pub markup: Option<&'a Markup>,
    /// Full classified URL
    pub url: &'a str,
    /// Network location of the classified URL
    pub domain: &'a str,
}

impl<'a> ContentFeatures<'a> {
    pub fn new(content: Option<&'a HttpContent>, markup: Option<&'a Markup>, url: &'a str, domain: &'a str) -> Self {
        Self { content, markup, url, domain }
    }

    fn content(&self) -> Result<&'a HttpContent, ProbeUnavailable> {
        self.content.ok_or(ProbeUnavailable::Content)
    }

    fn markup(&self) -> Result<&'a Markup, ProbeUnavailable> {
        self.content()?;
        self.markup.ok_or(ProbeUnavailable::Markup)
    }

    /// `<script>` count divided by page length in characters
    pub fn script_to_body_ratio(&self) -> FeatureResult {
        let length = self.content()?.body.chars().count();
        let scripts = self.markup()?.count(&SCRIPT);
        if length == 0 {
            return Err(ProbeUnavailable::Undefined);
        }
        Ok(scripts as f32 / length as f32)
    }

    pub fn hidden_tags_count(&self) -> FeatureResult {
        let markup = self.markup()?;
        let hidden: usize = HIDDEN_RULES.iter().map(|rule| markup.count(rule)).sum();
        Ok(hidden as f32)
    }

    pub fn total_tags_count(&self) -> FeatureResult {
        Ok(self.markup()?.element_count() as f32)
    }

    /// `<iframe>` plus legacy `<frame>`
    pub fn iframe_count(&self) -> FeatureResult {
        let markup = self.markup()?;
        Ok((markup.count(&IFRAME) + markup.count(&FRAME)) as f32)
    }

    /// 1 if a `<link>` href points back at the site or is a bare `name.ext`.
    /// A fetched page without a `<head>`, blank pages included, scores 0.
    pub fn favicon_local(&self) -> FeatureResult {
        self.content()?;
        let Some(markup) = self.markup else {
            return Ok(0.0);
        };
        if markup.count(&HEAD) == 0 {
            return Ok(0.0);
        }

        let local = markup
            .select(&LINK_HREF)
            .filter_map(|link| link.value().attr("href"))
            .any(|href| {
                href.contains(self.url)
                    || href.matches('.').count() == 1
                    || (!self.domain.is_empty() && href.contains(self.domain))
            });

        Ok(if local { 1.0 } else { 0.0 })
    }

    /// Whitespace-separated tokens in the lower-cased page
    pub fn page_token_count(&self) -> FeatureResult {
        Ok(self.content()?.body.to_lowercase().split_whitespace().count() as f32)
    }
}

impl FeatureExtractor for ContentFeatures<'_> {
    fn features(&self) -> &'static [Feature] {
        &[
            Feature::ScriptToBodyRatio,
            Feature::HiddenTagsCount,
            Feature::TotalTagsCount,
            Feature::IframeCount,
            Feature::FaviconLocal,
            Feature::PageTokenCount,
        ]
    }

    fn extract(&self, vector: &mut FeatureVector) {
        vector.put(Feature::ScriptToBodyRatio, self.script_to_body_ratio());
        vector.put(Feature::HiddenTagsCount, self.hidden_tags_count());
        vector.put(Feature::TotalTagsCount, self.total_tags_count());
        vector.put(Feature::IframeCount, self.iframe_count());
        vector.put(Feature::FaviconLocal, self.favicon_local());
        vector.put(Feature::PageTokenCount, self.page_token_count());
    }
}
