//! Anchor extraction for the crawl
//!
//! Works on the serialized output of a clone, so most `href` values are
//! already absolute by the time they get here.

use scraper::{Html, Selector};
use url::Url;

/// Schemes that never lead to another page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Collects `<a href>` targets in document order
///
/// # Link Extraction Rules
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (`#section`)
/// - Anything that is not HTTP(S) after resolution
///
/// Relative values are resolved against `base_url`. Duplicates are kept; the
/// frontier dedups against its visited set.
pub fn extract_anchor_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves one `href`, or `None` when it should not be followed
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    match base_url.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Skipping link '{}': {}", href, e);
            None
        }
    }
}
