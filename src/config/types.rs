use crate::CloneError;
use serde::Deserialize;
use std::time::Duration;

/// Browser user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure for PageLock
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// HTTP fetching behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User agent header value
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for the top-level page fetch (seconds)
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,

    /// Timeout for stylesheet and script fetches (seconds)
    #[serde(rename = "resource-timeout-secs")]
    pub resource_timeout_secs: u64,

    /// Timeout for image fetches (seconds)
    #[serde(rename = "image-timeout-secs")]
    pub image_timeout_secs: u64,

    /// Maximum number of redirects followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// Maximum number of sub-resource fetches in flight for one page
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_timeout_secs: 30,
            resource_timeout_secs: 10,
            image_timeout_secs: 15,
            max_redirects: 5,
            max_concurrent_fetches: 16,
        }
    }
}

impl FetcherConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn resource_timeout(&self) -> Duration {
        Duration::from_secs(self.resource_timeout_secs)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }
}

/// Full-site crawl limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum number of pages cloned, root included
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum link depth from the root page
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of pages cloned concurrently
    pub concurrency: usize,

    /// Largest page budget an API request may ask for
    #[serde(rename = "page-limit")]
    pub page_limit: usize,

    /// Largest link depth an API request may ask for
    #[serde(rename = "depth-limit")]
    pub depth_limit: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            max_depth: 2,
            concurrency: 1,
            page_limit: 100,
            depth_limit: 5,
        }
    }
}

impl CrawlConfig {
    /// Crawl limits for a request, falling back to the configured defaults
    ///
    /// # Errors
    ///
    /// `CloneError::Validation` when a requested value is above
    /// `page_limit` / `depth_limit`, or the page budget is zero.
    pub fn request_limits(
        &self,
        max_pages: Option<usize>,
        max_depth: Option<u32>,
    ) -> crate::Result<(usize, u32)> {
        let max_pages = max_pages.unwrap_or(self.max_pages);
        let max_depth = max_depth.unwrap_or(self.max_depth);

        if max_pages == 0 {
            return Err(CloneError::Validation(
                "maxPages must be at least 1".to_string(),
            ));
        }
        if max_pages > self.page_limit {
            return Err(CloneError::Validation(format!(
                "maxPages must be at most {}",
                self.page_limit
            )));
        }
        if max_depth > self.depth_limit {
            return Err(CloneError::Validation(format!(
                "maxDepth must be at most {}",
                self.depth_limit
            )));
        }
        Ok((max_pages, max_depth))
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8888".to_string(),
        }
    }
}
