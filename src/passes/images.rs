//! Image embedder and image URL rewriter

use super::{
    absolutize_attr, apply_or_absolutize, fetch_all, PassContext, PassReport, ResourceFetchError,
};
use crate::document::{get_node_attr, remove_node_attr, set_node_attr, PageDocument};
use crate::fetch::FetchRequest;
use crate::url::{absolutize_srcset, resolve_against};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use markup5ever_rcdom::Handle;
use url::Url;

/// MIME type used when the server does not send one
const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Builds a `data:` URI for binary content
pub fn create_data_url(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

/// Embeds every `<img>` as a `data:` URI
///
/// All images of the page are fetched concurrently and the pass returns only
/// once each one has settled. An embedded image loses its `srcset`; an image
/// that cannot be fetched gets absolute `src` and `srcset` instead.
pub async fn embed_images(doc: &PageDocument, ctx: &PassContext<'_>) -> PassReport {
    let mut report = PassReport::default();
    let mut jobs: Vec<(Handle, FetchRequest)> = Vec::new();

    for img in doc.elements("img") {
        let src = get_node_attr(&img, "src").filter(|s| !s.trim().is_empty());

        let Some(src) = src.filter(|s| !s.starts_with("data:")) else {
            // Nothing to embed; still make any srcset usable offline
            if absolutize_srcset_attr(&img, &ctx.base) {
                report.absolutized += 1;
            }
            continue;
        };

        match resolve_against(&src, &ctx.base) {
            Ok(image_url) => jobs.push((
                img,
                FetchRequest::get(image_url.as_str(), ctx.config.image_timeout()).binary(),
            )),
            Err(e) => {
                tracing::debug!("Leaving image '{}' unchanged: {}", src, e);
                if absolutize_srcset_attr(&img, &ctx.base) {
                    report.absolutized += 1;
                }
            }
        }
    }

    tracing::debug!("Embedding {} images", jobs.len());

    for (img, outcome) in fetch_all(ctx, jobs).await {
        let embedded = |response: crate::fetch::FetchResult| {
            if response.bytes().is_empty() {
                return Err(ResourceFetchError::EmptyBody {
                    url: response.final_url.clone(),
                });
            }
            let mime = response.mime_type().unwrap_or(DEFAULT_IMAGE_MIME);
            let data_url = create_data_url(mime, response.bytes());
            set_node_attr(&img, "src", Some(data_url.as_str()));
            remove_node_attr(&img, "srcset");
            Ok(())
        };

        let failed_before = report.failed;
        apply_or_absolutize(&img, "src", &ctx.base, outcome, embedded, &mut report);
        if report.failed > failed_before {
            absolutize_srcset_attr(&img, &ctx.base);
        }
    }

    report
}

/// Rewrites every `<img>` `src` and `srcset` to absolute URLs without fetching
pub fn rewrite_image_urls(doc: &PageDocument, base: &Url) -> PassReport {
    let mut report = PassReport::default();

    for img in doc.elements("img") {
        if absolutize_attr(&img, "src", base) {
            report.absolutized += 1;
        }
        if absolutize_srcset_attr(&img, base) {
            report.absolutized += 1;
        }
    }

    report
}

fn absolutize_srcset_attr(node: &Handle, base: &Url) -> bool {
    let Some(srcset) = get_node_attr(node, "srcset").filter(|s| !s.trim().is_empty()) else {
        return false;
    };
    let rewritten = absolutize_srcset(&srcset, base);
    set_node_attr(node, "srcset", Some(rewritten.as_str()));
    true
}
