//! Full-site crawl
//!
//! This module contains the site clone loop:
//! - `Frontier` decides what gets cloned next (bounded breadth-first)
//! - `links` pulls anchor targets out of each cloned page
//! - `clone_site` drives both and packages the pages into an archive
//!
//! Pages are cloned in waves of up to `crawl.concurrency` pages. A wave is
//! joined before its links are admitted, and results are handled in dequeue
//! order, so discovery order is the same for any concurrency setting.

mod frontier;
mod links;

pub use frontier::{CrawlState, Frontier, QueuedPage};
pub use links::extract_anchor_links;

use crate::archive;
use crate::cloner::{clone_single_page, CloneOptions, CloneResult};
use crate::config::Config;
use crate::fetch::Fetcher;
use crate::url::normalize_target_url;
use crate::{CloneError, Result};
use futures::future::join_all;
use std::time::Instant;
use tracing::{info, warn};
use url::Url;

/// A page the crawl had to skip
#[derive(Debug)]
pub struct CrawlFailure {
    pub url: String,
    pub error: CloneError,
}

/// Everything a site clone produced
#[derive(Debug)]
pub struct SiteCloneResult {
    /// Cloned pages in crawl order
    pub pages: Vec<CloneResult>,
    /// Pages that failed and were skipped
    pub failures: Vec<CrawlFailure>,
    /// Zip archive of `pages`
    pub archive: Vec<u8>,
}

/// Clones every same-origin page reachable from `options.target_url`
///
/// The crawl stops when the queue is empty or `options.max_pages` pages have
/// been dispatched. A page that fails to clone is recorded in `failures` and
/// the crawl moves on.
///
/// # Errors
///
/// * `CloneError::Validation` - empty URL or a page budget of zero
/// * the root page's own error, when not a single page could be cloned
/// * `CloneError::Archive` - packaging failed
pub async fn clone_site(
    options: &CloneOptions,
    fetcher: &dyn Fetcher,
    config: &Config,
) -> Result<SiteCloneResult> {
    let root = normalize_target_url(&options.target_url)?;
    if options.max_pages == 0 {
        return Err(CloneError::Validation(
            "maxPages must be at least 1".to_string(),
        ));
    }

    info!(
        "Starting site clone of {} (max pages: {}, max depth: {})",
        root, options.max_pages, options.max_depth
    );
    let start_time = Instant::now();

    let mut frontier = Frontier::new(&root, options.max_pages, options.max_depth)?;
    let mut pages = Vec::new();
    let mut failures: Vec<CrawlFailure> = Vec::new();

    while !frontier.is_done() {
        let wave = frontier.next_wave(config.crawl.concurrency);
        if wave.is_empty() {
            break;
        }

        let outcomes = join_all(wave.iter().map(|page| {
            let page_options = CloneOptions {
                target_url: page.url.to_string(),
                ..options.clone()
            };
            async move { clone_single_page(&page_options, fetcher, &config.fetcher).await }
        }))
        .await;

        for (page, outcome) in wave.into_iter().zip(outcomes) {
            match outcome {
                Ok(result) => {
                    // Links resolve against where the page was served from
                    let served_from =
                        Url::parse(&result.final_url).unwrap_or_else(|_| page.url.clone());
                    if page.depth == 0 {
                        frontier.rebase(&served_from)?;
                    }
                    let links = extract_anchor_links(&result.html, &served_from);
                    frontier.discover(&page, links);
                    pages.push(result);
                }
                Err(error) => {
                    warn!("Skipping {}: {}", page.url, error);
                    failures.push(CrawlFailure {
                        url: page.url.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            "Progress: {} pages cloned, {} failed, {} queued",
            pages.len(),
            failures.len(),
            frontier.state().queue.len()
        );
    }

    if pages.is_empty() && !failures.is_empty() {
        return Err(failures.swap_remove(0).error);
    }

    let archive = archive::pack(&pages)?;
    info!(
        "Site clone of {} finished: {} pages, {} failed, {} byte archive in {:.2}s",
        root,
        pages.len(),
        failures.len(),
        archive.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(SiteCloneResult {
        pages,
        failures,
        archive,
    })
}
