//! Head injections applied before the passes run

use crate::document::{get_node_attr, PageDocument};
use crate::url::{origin_root, resolve_against};
use url::Url;

/// Prepends the upgrade-insecure-requests policy and, when missing, a `<base>`
///
/// Both nodes are prepended, policy first, so an injected `<base>` ends up as
/// the first child of `<head>`.
pub(super) fn inject_head_nodes(doc: &PageDocument, page_url: &Url) {
    let csp = doc.create_element(
        "meta",
        &[
            ("http-equiv", "Content-Security-Policy"),
            ("content", "upgrade-insecure-requests"),
        ],
    );
    if !doc.prepend_to_head(csp) {
        tracing::debug!("Document has no <head>; skipping injected nodes");
        return;
    }

    if doc.elements("base").is_empty() {
        let href = format!("{}/", origin_root(page_url));
        let base = doc.create_element("base", &[("href", href.as_str())]);
        doc.prepend_to_head(base);
    }
}

/// URL that references in the document resolve against
///
/// A `<base href>` already present in the fetched page wins, resolved against
/// the page's own URL; otherwise the page URL is used.
pub(super) fn effective_base(doc: &PageDocument, page_url: &Url) -> Url {
    doc.elements("base")
        .iter()
        .filter_map(|base| get_node_attr(base, "href"))
        .find(|href| !href.trim().is_empty())
        .and_then(|href| match resolve_against(href.trim(), page_url) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!("Ignoring unusable <base href>: {}", e);
                None
            }
        })
        .unwrap_or_else(|| page_url.clone())
}
