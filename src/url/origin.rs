use url::Url;

/// Returns true when both URLs share host and effective port
///
/// This mirrors the browser notion of `URL.host`, which is what decides
/// whether a script is fetched and inlined.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pagelock::url::same_host;
///
/// let page = Url::parse("https://example.com/").unwrap();
/// assert!(same_host(&page, &Url::parse("http://EXAMPLE.com:443/app.js").unwrap()));
/// assert!(!same_host(&page, &Url::parse("https://cdn.example.com/app.js").unwrap()));
/// ```
pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str().is_some()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

/// Returns true when both URLs share scheme, host and port
pub fn same_origin(a: &Url, b: &Url) -> bool {
    let origin = a.origin();
    origin.is_tuple() && origin == b.origin()
}

/// Returns `scheme://host[:port]` of a URL, used for the injected `<base>`
pub fn origin_root(url: &Url) -> String {
    url.origin().ascii_serialization()
}
