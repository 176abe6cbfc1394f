use crate::{CloneError, UrlError};
use url::Url;

/// Tracking query parameters dropped from crawl keys
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
];

/// Normalizes user input into the URL of the page to clone
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Prepend `https://` unless the input already starts with `http://` or `https://`
/// 3. Parse; reject malformed input or input without a host
///
/// # Examples
///
/// ```
/// use pagelock::url::normalize_target_url;
///
/// let url = normalize_target_url("example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
///
/// let url = normalize_target_url("  http://example.com/a  ").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/a");
/// ```
pub fn normalize_target_url(input: &str) -> Result<Url, CloneError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CloneError::Validation("URL is required".to_string()));
    }

    let lowered = trimmed.to_ascii_lowercase();
    let with_scheme = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost.into());
    }

    Ok(url)
}

/// Produces the key a crawl uses to decide whether a page was already seen
///
/// # Canonicalization Steps
///
/// 1. Reject non-HTTP(S) URLs
/// 2. Remove fragment (everything after #)
/// 3. Remove tracking query parameters
/// 4. Sort remaining query parameters alphabetically
/// 5. Remove empty query string (trailing ?)
///
/// Host case is already normalized by the parser. Paths are kept as written:
/// `/docs` and `/docs/` may be different pages.
pub fn canonicalize(url: &Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    let mut canonical = url.clone();
    canonical.set_fragment(None);

    if canonical.query().is_some() {
        let params = filter_and_sort_query_params(&canonical);
        if params.is_empty() {
            canonical.set_query(None);
        } else {
            canonical
                .query_pairs_mut()
                .clear()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    Ok(canonical)
}

/// Filters out tracking parameters and sorts the rest by key
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    params
}
