//! Stylesheet inliner

use super::{fetch_all, PassContext, PassReport};
use crate::document::{get_node_attr, PageDocument};
use crate::fetch::FetchRequest;
use crate::url::resolve_against;
use markup5ever_rcdom::Handle;

/// Returns true if a `rel` value lists `stylesheet` (case-insensitive)
fn is_stylesheet_rel(rel: &str) -> bool {
    rel.split_whitespace()
        .any(|token| token.eq_ignore_ascii_case("stylesheet"))
}

/// Replaces each stylesheet `<link>` with a `<style>` holding its content
///
/// A stylesheet that cannot be fetched keeps its `<link>` element exactly as
/// it was; the reference pass absolutizes it later.
pub async fn inline_stylesheets(doc: &PageDocument, ctx: &PassContext<'_>) -> PassReport {
    let mut report = PassReport::default();
    let mut jobs: Vec<(Handle, FetchRequest)> = Vec::new();

    for link in doc.elements("link") {
        let is_stylesheet = get_node_attr(&link, "rel").is_some_and(|rel| is_stylesheet_rel(&rel));
        if !is_stylesheet {
            continue;
        }

        let Some(href) = get_node_attr(&link, "href").filter(|h| !h.trim().is_empty()) else {
            continue;
        };

        match resolve_against(&href, &ctx.base) {
            Ok(css_url) => jobs.push((
                link,
                FetchRequest::get(css_url.as_str(), ctx.config.resource_timeout()),
            )),
            Err(e) => tracing::debug!("Skipping stylesheet '{}': {}", href, e),
        }
    }

    for (link, outcome) in fetch_all(ctx, jobs).await {
        match outcome {
            Ok(response) => {
                let media = get_node_attr(&link, "media");
                let attrs: Vec<(&str, &str)> = media
                    .as_deref()
                    .map(|m| vec![("media", m)])
                    .unwrap_or_default();

                let style = doc.create_text_element("style", &attrs, &response.text());
                if doc.replace_node(&link, style) {
                    report.inlined += 1;
                }
            }
            Err(e) => {
                tracing::warn!("Failed to fetch CSS: {}", e);
                report.failed += 1;
            }
        }
    }

    report
}
