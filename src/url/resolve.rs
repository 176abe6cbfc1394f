use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a possibly-relative reference against a base URL
///
/// Absolute references come back normalized; relative ones are joined onto
/// the base. Fragments are preserved.
///
/// # Arguments
///
/// * `reference` - The attribute value to resolve
/// * `base` - The base URL string
///
/// # Returns
///
/// * `Ok(Url)` - The absolute URL
/// * `Err(UrlError)` - `base` or `reference` cannot be parsed
///
/// # Examples
///
/// ```
/// use pagelock::url::resolve;
///
/// let url = resolve("/about", "https://x.com/blog/post").unwrap();
/// assert_eq!(url.as_str(), "https://x.com/about");
///
/// let url = resolve("img/a.png#frag", "https://x.com/blog/").unwrap();
/// assert_eq!(url.as_str(), "https://x.com/blog/img/a.png#frag");
/// ```
pub fn resolve(reference: &str, base: &str) -> UrlResult<Url> {
    let base_url = Url::parse(base).map_err(|source| UrlError::Resolve {
        reference: reference.to_string(),
        base: base.to_string(),
        source,
    })?;
    resolve_against(reference, &base_url)
}

/// Resolves a reference against an already parsed base URL
pub fn resolve_against(reference: &str, base: &Url) -> UrlResult<Url> {
    base.join(reference).map_err(|source| UrlError::Resolve {
        reference: reference.to_string(),
        base: base.to_string(),
        source,
    })
}

/// Returns true for same-document references such as `#top`
pub fn is_fragment_only(reference: &str) -> bool {
    reference.starts_with('#')
}

/// Rewrites every candidate URL of a `srcset` value to absolute form
///
/// Candidates are split on commas, the first whitespace-separated token of
/// each is resolved and any size descriptors are kept as they were. A candidate
/// that fails to resolve is kept unchanged.
///
/// # Examples
///
/// ```
/// use pagelock::url::absolutize_srcset;
/// use url::Url;
///
/// let base = Url::parse("https://x.com/gallery/").unwrap();
/// assert_eq!(
///     absolutize_srcset("a.jpg 480w, /b.jpg 2x", &base),
///     "https://x.com/gallery/a.jpg 480w, https://x.com/b.jpg 2x"
/// );
/// ```
pub fn absolutize_srcset(srcset: &str, base: &Url) -> String {
    srcset
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(|candidate| {
            let mut parts = candidate.split_whitespace();
            let Some(path) = parts.next() else {
                return candidate.to_string();
            };
            let descriptors: Vec<&str> = parts.collect();

            match resolve_against(path, base) {
                Ok(absolute) if descriptors.is_empty() => absolute.to_string(),
                Ok(absolute) => format!("{} {}", absolute, descriptors.join(" ")),
                Err(e) => {
                    tracing::debug!("Keeping srcset candidate '{}': {}", candidate, e);
                    candidate.to_string()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
