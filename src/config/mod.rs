//! Configuration module for PageLock
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every field has a default, so a missing file or a
//! missing section yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use pagelock::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagelock.toml")).unwrap();
//! println!("Crawl will stop after {} pages", config.crawl.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, FetcherConfig, ServerConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default};
pub use validation::validate;
