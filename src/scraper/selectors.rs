//! Ordered selector fallbacks for markup whose class names drift between
//! site deployments. Every helper tries its list most-specific-first and
//! the first selector that matches wins.

use crate::scraper::ScraperError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::HtmlParse(format!("{css}: {e}")))
}

/// Parses a prioritized list once so per-fragment lookups don't re-parse.
pub fn selector_list(css: &[&str]) -> Result<Vec<Selector>, ScraperError> {
    css.iter().map(|c| selector(c)).collect()
}

/// Listing fragments of the first selector that finds any.
pub fn find_fragments<'a>(document: &'a Html, strategies: &[Selector]) -> Vec<ElementRef<'a>> {
    strategies
        .iter()
        .map(|s| document.select(s).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// Whitespace-collapsed text of an element.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first non-empty match under `fragment`.
pub fn first_text(fragment: ElementRef<'_>, strategies: &[Selector]) -> Option<String> {
    strategies.iter().find_map(|s| {
        fragment
            .select(s)
            .map(element_text)
            .find(|t| !t.is_empty())
    })
}

/// `href` of the first matching anchor that has one.
pub fn first_href(fragment: ElementRef<'_>, strategies: &[Selector]) -> Option<String> {
    strategies.iter().find_map(|s| {
        fragment
            .select(s)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .find(|h| !h.is_empty())
            .map(str::to_string)
    })
}

/// Resolves an href against the site origin. Script and fragment-only
/// links are dropped, so a returned URL is always absolute http(s).
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Whether the fragment mentions RERA anywhere in its text.
pub fn mentions_rera(fragment: ElementRef<'_>) -> bool {
    fragment
        .text()
        .any(|t| t.to_ascii_lowercase().contains("rera"))
}
