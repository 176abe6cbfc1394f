//! Page clone orchestration
//!
//! One call to [`clone_single_page`] owns its whole run: it fetches the page,
//! parses it into a fresh `PageDocument`, injects the head nodes, runs the
//! passes in order and serializes the result. Nothing is shared between runs.

mod head;

use crate::config::{CrawlConfig, FetcherConfig};
use crate::document::PageDocument;
use crate::fetch::{FetchRequest, Fetcher};
use crate::passes::{self, PassContext};
use crate::url::normalize_target_url;
use crate::{CloneError, Result};
use tracing::{debug, info};
use url::Url;

/// Title used when the page has none
pub const DEFAULT_TITLE: &str = "Cloned Website";

/// What to clone and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneOptions {
    /// URL as given by the caller; normalized when the clone starts
    pub target_url: String,
    /// Embed images as data URIs instead of pointing at their absolute URLs
    pub embed_images: bool,
    /// Page budget for a site clone
    pub max_pages: usize,
    /// Link depth limit for a site clone
    pub max_depth: u32,
}

impl CloneOptions {
    /// Options for `target_url` with images embedded and default crawl limits
    pub fn new(target_url: impl Into<String>) -> Self {
        let crawl = CrawlConfig::default();
        Self {
            target_url: target_url.into(),
            embed_images: true,
            max_pages: crawl.max_pages,
            max_depth: crawl.max_depth,
        }
    }

    pub fn with_embed_images(mut self, embed_images: bool) -> Self {
        self.embed_images = embed_images;
        self
    }

    pub fn with_limits(mut self, max_pages: usize, max_depth: u32) -> Self {
        self.max_pages = max_pages;
        self.max_depth = max_depth;
        self
    }
}

/// One cloned page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneResult {
    /// Serialized, self-contained HTML
    pub html: String,
    /// Page title or [`DEFAULT_TITLE`]
    pub title: String,
    /// UTF-8 byte length of `html`
    pub byte_size: usize,
    /// Normalized URL the page was cloned from
    pub source_url: String,
    /// URL the page was served from after redirects
    pub final_url: String,
}

/// Clones one page into a self-contained HTML document
///
/// # Errors
///
/// * `CloneError::Validation` - the target URL is empty
/// * `CloneError::Url` - the target URL cannot be parsed
/// * `CloneError::Fetch` - the page request failed in transport
/// * `CloneError::HttpStatus` - the page answered with a non-2xx status
///
/// Sub-resource failures never surface here; the affected element keeps an
/// absolute URL instead.
pub async fn clone_single_page(
    options: &CloneOptions,
    fetcher: &dyn Fetcher,
    config: &FetcherConfig,
) -> Result<CloneResult> {
    let page_url = normalize_target_url(&options.target_url)?;
    info!("Cloning {}", page_url);

    let response = fetcher
        .fetch(FetchRequest::get(page_url.as_str(), config.page_timeout()))
        .await?;
    if !response.is_success() {
        return Err(CloneError::HttpStatus {
            url: page_url.to_string(),
            status: response.status_code,
        });
    }

    // Redirects move the document; relative references follow it
    let fetched_url = Url::parse(&response.final_url).unwrap_or_else(|_| page_url.clone());
    if fetched_url != page_url {
        debug!("{} redirected to {}", page_url, fetched_url);
    }

    let doc = PageDocument::parse(&response.text());
    let title = doc.title().unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let base = head::effective_base(&doc, &fetched_url);
    head::inject_head_nodes(&doc, &fetched_url);

    let ctx = PassContext {
        base,
        fetcher,
        config,
    };
    let report = passes::run_all(&doc, &ctx, options.embed_images).await;

    let html = doc.serialize()?;
    info!(
        "Cloned {} ({} bytes, {} inlined, {} absolutized, {} failed)",
        page_url,
        html.len(),
        report.inlined,
        report.absolutized,
        report.failed
    );

    Ok(CloneResult {
        byte_size: html.len(),
        html,
        title,
        source_url: page_url.to_string(),
        final_url: fetched_url.to_string(),
    })
}
