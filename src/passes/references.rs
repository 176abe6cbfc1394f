//! Reference rewriter
//!
//! Runs last and never fetches anything. Whatever still points at a relative
//! location gets an absolute URL so the clone keeps working from disk.

use super::{absolutize_attr, PassReport};
use crate::document::{find_nodes, get_node_attr, PageDocument};
use crate::url::is_fragment_only;
use markup5ever_rcdom::Handle;
use url::Url;

/// Element/attribute pairs rewritten unconditionally
const REFERENCE_ATTRS: &[(&str, &str)] = &[
    ("form", "action"),
    ("iframe", "src"),
    ("video", "src"),
    ("audio", "src"),
    ("link", "href"),
];

/// Makes every navigational and embedded reference absolute
///
/// Anchors that only point at a fragment of the current page (`#top`) stay as
/// they are. Every `<link href>` still in the document is rewritten, which
/// includes stylesheets the CSS pass could not inline.
pub fn rewrite_references(doc: &PageDocument, base: &Url) -> PassReport {
    let mut report = PassReport::default();
    let mut rewrite = |node: &Handle, attr: &str| {
        if absolutize_attr(node, attr, base) {
            report.absolutized += 1;
        }
    };

    for anchor in doc.elements("a") {
        match get_node_attr(&anchor, "href") {
            Some(href) if is_fragment_only(href.trim()) => {}
            Some(_) => rewrite(&anchor, "href"),
            None => {}
        }
    }

    for &(element, attr) in REFERENCE_ATTRS {
        for node in doc.elements(element) {
            rewrite(&node, attr);
        }
    }

    for media in ["video", "audio"] {
        for player in doc.elements(media) {
            for source in find_nodes(&player, "source") {
                rewrite(&source, "src");
            }
        }
    }

    report
}
