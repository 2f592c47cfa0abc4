//! Markup Access
//!
//! Queryable DOM handle over fetched page content.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// Build a selector from a constant CSS string
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| {
        log::error!("Failed to parse '{}' selector: {}. This is a programming error.", css, e);
        // A known-valid selector that matches nothing
        Selector::parse("*:not(*)").expect("fallback selector '*:not(*)' always parses")
    })
}

static ALL: Lazy<Selector> = Lazy::new(|| selector("*"));

/// Parsed page
pub struct Markup {
    document: Html,
}

impl Markup {
    /// `None` when there is nothing to parse
    pub fn parse(body: &str) -> Option<Self> {
        if body.trim().is_empty() {
            return None;
        }
        Some(Self {
            document: Html::parse_document(body),
        })
    }

    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.document.select(selector)
    }

    pub fn count(&self, selector: &Selector) -> usize {
        self.document.select(selector).count()
    }

    /// Every element in the document
    pub fn element_count(&self) -> usize {
        self.count(&ALL)
    }
}

impl std::fmt::Debug for Markup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Markup")
            .field("elements", &self.element_count())
            .finish()
    }
}
