//! PageLock: offline page cloning
//!
//! This crate fetches a remote web page and rewrites it into a self-contained
//! HTML document: stylesheets inlined, images optionally embedded as data URIs,
//! same-host scripts inlined and every remaining reference made absolute.
//! A full-site mode crawls same-origin pages under a depth and page budget and
//! packages the results as a zip archive.

pub mod archive;
pub mod cloner;
pub mod config;
pub mod crawler;
pub mod document;
pub mod fetch;
pub mod passes;
pub mod server;
pub mod url;

use thiserror::Error;

/// Main error type for clone operations
#[derive(Debug, Error)]
pub enum CloneError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Request failed with status code {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Packaging error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CloneError {
    /// HTTP status code used when this error is surfaced to a caller
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            _ => 500,
        }
    }

    /// Short caller-visible message
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Fetch(e) => format!("Failed to fetch website: {}", e),
            Self::HttpStatus { status, .. } => {
                format!("Failed to fetch website: Request failed with status code {}", status)
            }
            other => format!("An error occurred: {}", other),
        }
    }
}

/// Transport-level failures raised by the fetch layer
///
/// A non-2xx response is not an error at this level; it comes back as a
/// regular `FetchResult` and the caller decides.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Failed to read response body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl FetchError {
    /// Classifies a reqwest error the same way for every request
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            Self::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::Http {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Cannot resolve '{reference}' against '{base}': {source}")]
    Resolve {
        reference: String,
        base: String,
        source: ::url::ParseError,
    },

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Archive packaging errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for clone operations
pub type Result<T> = std::result::Result<T, CloneError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use cloner::{clone_single_page, CloneOptions, CloneResult};
pub use config::Config;
pub use crawler::{clone_site, SiteCloneResult};
pub use fetch::{FetchRequest, FetchResult, Fetcher, HttpFetcher};
pub use url::{normalize_target_url, resolve};
