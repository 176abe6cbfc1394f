//! DOM transform passes
//!
//! Passes run in a fixed order over one `PageDocument`:
//! 1. `css` - inline stylesheets
//! 2. `images` - embed images as data URIs, or make their URLs absolute
//! 3. `scripts` - inline same-host scripts, absolutize the rest
//! 4. `references` - absolutize every remaining reference without fetching
//!
//! Later passes rely on earlier ones being fully settled, so every pass that
//! fetches joins all of its requests before returning. A failed sub-resource
//! never fails the pass: the element falls back to an absolute URL, or is left
//! as it was when even that is impossible.

mod css;
mod images;
mod references;
mod scripts;

pub use css::inline_stylesheets;
pub use images::{embed_images, rewrite_image_urls};
pub use references::rewrite_references;
pub use scripts::inline_scripts;

use crate::config::FetcherConfig;
use crate::document::{get_node_attr, set_node_attr, PageDocument};
use crate::fetch::{FetchRequest, FetchResult, Fetcher};
use crate::url::resolve_against;
use crate::{FetchError, UrlError};
use futures::stream::{self, StreamExt};
use markup5ever_rcdom::Handle;
use thiserror::Error;
use url::Url;

/// Why a single sub-resource could not be used
///
/// These never leave the pass that produced them; they are logged and the
/// element falls back to its absolute URL.
#[derive(Debug, Error)]
pub enum ResourceFetchError {
    #[error(transparent)]
    Network(#[from] FetchError),

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("empty body from {url}")]
    EmptyBody { url: String },

    #[error(transparent)]
    Resolution(#[from] UrlError),
}

/// Everything a pass needs besides the document
pub struct PassContext<'a> {
    /// URL references are resolved against
    pub base: Url,
    /// Source of sub-resources
    pub fetcher: &'a dyn Fetcher,
    /// Timeouts and concurrency limits
    pub config: &'a FetcherConfig,
}

/// Counts of what a pass did, mostly for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Elements whose content was embedded or inlined
    pub inlined: usize,
    /// Attributes rewritten to absolute URLs
    pub absolutized: usize,
    /// Sub-resources that could not be fetched
    pub failed: usize,
}

/// Runs all four passes in order
pub async fn run_all(doc: &PageDocument, ctx: &PassContext<'_>, embed: bool) -> PassReport {
    let css = inline_stylesheets(doc, ctx).await;
    tracing::debug!("CSS pass: {:?}", css);

    let images = if embed {
        embed_images(doc, ctx).await
    } else {
        rewrite_image_urls(doc, &ctx.base)
    };
    tracing::debug!("Image pass: {:?}", images);

    let scripts = inline_scripts(doc, ctx).await;
    tracing::debug!("Script pass: {:?}", scripts);

    let references = rewrite_references(doc, &ctx.base);
    tracing::debug!("Reference pass: {:?}", references);

    PassReport {
        inlined: css.inlined + images.inlined + scripts.inlined,
        absolutized: css.absolutized
            + images.absolutized
            + scripts.absolutized
            + references.absolutized,
        failed: css.failed + images.failed + scripts.failed,
    }
}

/// Rewrites `attr_name` of `node` to an absolute URL
///
/// Empty values are skipped and a value that cannot be resolved is left
/// untouched. Returns true when the attribute was rewritten.
pub fn absolutize_attr(node: &Handle, attr_name: &str, base: &Url) -> bool {
    let Some(value) = get_node_attr(node, attr_name) else {
        return false;
    };
    if value.trim().is_empty() {
        return false;
    }

    match resolve_against(&value, base) {
        Ok(absolute) => {
            set_node_attr(node, attr_name, Some(absolute.as_str()));
            true
        }
        Err(e) => {
            tracing::debug!("Leaving {}=\"{}\" unchanged: {}", attr_name, value, e);
            false
        }
    }
}

/// Applies a fetched sub-resource, or falls back to the absolute URL
///
/// This is the one place the "keep the element usable on failure" rule lives:
/// `apply` runs only for a usable response, otherwise the failure is logged
/// and `attr_name` is absolutized.
pub fn apply_or_absolutize<F>(
    node: &Handle,
    attr_name: &str,
    base: &Url,
    outcome: Result<FetchResult, ResourceFetchError>,
    apply: F,
    report: &mut PassReport,
) where
    F: FnOnce(FetchResult) -> Result<(), ResourceFetchError>,
{
    let error = match outcome.and_then(apply) {
        Ok(()) => {
            report.inlined += 1;
            return;
        }
        Err(e) => e,
    };

    tracing::warn!("Falling back to absolute URL: {}", error);
    report.failed += 1;
    if absolutize_attr(node, attr_name, base) {
        report.absolutized += 1;
    }
}

/// Fetches one sub-resource and checks the status
async fn fetch_checked(
    fetcher: &dyn Fetcher,
    request: FetchRequest,
) -> Result<FetchResult, ResourceFetchError> {
    let url = request.url.clone();
    let result = fetcher.fetch(request).await?;
    if !result.is_ok() {
        return Err(ResourceFetchError::Status {
            url,
            status: result.status_code,
        });
    }
    Ok(result)
}

/// Fetches a batch concurrently and waits for every request to settle
///
/// At most `max_concurrent_fetches` requests are in flight; results come back
/// in completion order, each paired with the item it was issued for.
async fn fetch_all<T>(
    ctx: &PassContext<'_>,
    jobs: Vec<(T, FetchRequest)>,
) -> Vec<(T, Result<FetchResult, ResourceFetchError>)> {
    let fetcher = ctx.fetcher;
    stream::iter(jobs)
        .map(|(item, request)| async move {
            let outcome = fetch_checked(fetcher, request).await;
            (item, outcome)
        })
        .buffer_unordered(ctx.config.max_concurrent_fetches.max(1))
        .collect()
        .await
}
