//! Structured data extraction from fetched documents
//!
//! Every function here parses markup synchronously and returns owned data,
//! so no parsed document is ever held across a fetch.

mod attributes;
mod listing;
mod match_page;
pub mod records;

pub use attributes::{digits_only, extract, Attribute, AttributeMap};
pub use listing::{parse_listing, ListingPage, ListingRow, TeamCell};
pub use match_page::{parse_match_page, MatchPage, RosterEntry, RosterSection};

use crate::ExtractionError;
use scraper::{ElementRef, Selector};
use url::Url;

/// Compiles a static CSS selector
pub(crate) fn css(selector: &'static str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector).map_err(|_| ExtractionError::Selector(selector))
}

/// Collects an element's text with whitespace collapsed
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves an `href` against the page address
///
/// Returns `None` for empty, fragment-only or non-HTTP links.
pub(crate) fn absolute_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
