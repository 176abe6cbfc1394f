//! Bounded breadth-first crawl frontier

use crate::url::{canonicalize, same_origin};
use crate::UrlResult;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A page waiting to be cloned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedPage {
    /// Canonical URL of the page
    pub url: Url,
    /// Link distance from the root page
    pub depth: u32,
}

/// Mutable state of one crawl
///
/// Invariants:
/// - every queued URL is also in `visited`, so nothing is queued twice
/// - `visited` may also hold the root's redirect target, which takes no slot
/// - `pages_cloned <= max_pages`
/// - no queued depth exceeds `max_depth`
#[derive(Debug, Default)]
pub struct CrawlState {
    /// Canonical URLs admitted to the crawl, queued or already dispatched
    pub visited: HashSet<String>,
    /// Pages still to dispatch, in discovery order
    pub queue: VecDeque<QueuedPage>,
    /// Slots taken by dispatched pages, failed ones included
    pub pages_cloned: usize,
}

/// Owns the `CrawlState` and is the only thing that changes it
#[derive(Debug)]
pub struct Frontier {
    state: CrawlState,
    root: Url,
    max_pages: usize,
    max_depth: u32,
}

impl Frontier {
    /// Seeds the queue with `root` at depth 0
    pub fn new(root: &Url, max_pages: usize, max_depth: u32) -> UrlResult<Self> {
        let root = canonicalize(root)?;
        let mut state = CrawlState::default();
        state.visited.insert(root.to_string());
        state.queue.push_back(QueuedPage {
            url: root.clone(),
            depth: 0,
        });

        Ok(Self {
            state,
            root,
            max_pages,
            max_depth,
        })
    }

    /// Takes up to `size` pages off the queue and reserves their slots
    ///
    /// Slots are counted here, before any page is cloned, so pages in flight
    /// can never push the crawl past `max_pages`.
    pub fn next_wave(&mut self, size: usize) -> Vec<QueuedPage> {
        let mut wave = Vec::new();
        while wave.len() < size.max(1) && self.state.pages_cloned < self.max_pages {
            let Some(page) = self.state.queue.pop_front() else {
                break;
            };
            self.state.pages_cloned += 1;
            wave.push(page);
        }
        wave
    }

    /// Moves the crawl origin to where the root page was actually served
    ///
    /// Called with the root's final URL after a redirect. The final URL is
    /// marked visited so links back to it are not cloned a second time. It
    /// does not take a page slot: the root already holds one.
    pub fn rebase(&mut self, final_url: &Url) -> UrlResult<()> {
        let canonical = canonicalize(final_url)?;
        if canonical != self.root {
            tracing::debug!("Crawl origin moved from {} to {}", self.root, canonical);
            self.state.visited.insert(canonical.to_string());
            self.root = canonical;
        }
        Ok(())
    }

    /// Pages dispatched or still queued
    fn admitted(&self) -> usize {
        self.state.pages_cloned + self.state.queue.len()
    }

    /// Admits the links found on `page`
    ///
    /// Links are taken in the order given. A link is admitted only when it is
    /// same-origin with the root, not seen before and the page budget still
    /// has room counting everything already admitted. Nothing is admitted from
    /// a page at `max_depth`. Returns how many links were queued.
    pub fn discover<I>(&mut self, page: &QueuedPage, links: I) -> usize
    where
        I: IntoIterator<Item = Url>,
    {
        if page.depth >= self.max_depth {
            return 0;
        }

        let mut queued = 0;
        for link in links {
            if self.admitted() >= self.max_pages {
                break;
            }
            if !same_origin(&link, &self.root) {
                tracing::debug!("Not following cross-origin link {}", link);
                continue;
            }
            let Ok(canonical) = canonicalize(&link) else {
                continue;
            };
            if !self.state.visited.insert(canonical.to_string()) {
                continue;
            }

            tracing::debug!("Queued {} at depth {}", canonical, page.depth + 1);
            self.state.queue.push_back(QueuedPage {
                url: canonical,
                depth: page.depth + 1,
            });
            queued += 1;
        }
        queued
    }

    /// True once the queue is drained or the page budget is used up
    pub fn is_done(&self) -> bool {
        self.state.queue.is_empty() || self.state.pages_cloned >= self.max_pages
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }
}
