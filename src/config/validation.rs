use crate::config::types::{Config, CrawlConfig, FetcherConfig, ServerConfig};
use crate::ConfigError;
use std::net::SocketAddr;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_crawl_config(&config.crawl)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("page_timeout_secs", config.page_timeout_secs),
        ("resource_timeout_secs", config.resource_timeout_secs),
        ("image_timeout_secs", config.image_timeout_secs),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 256 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 256, got {}",
            config.max_concurrent_fetches
        )));
    }

    Ok(())
}

/// Validates crawl limits
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_pages > config.page_limit {
        return Err(ConfigError::Validation(format!(
            "max_pages ({}) cannot exceed page_limit ({})",
            config.max_pages, config.page_limit
        )));
    }

    if config.max_depth > config.depth_limit {
        return Err(ConfigError::Validation(format!(
            "max_depth ({}) cannot exceed depth_limit ({})",
            config.max_depth, config.depth_limit
        )));
    }

    if config.concurrency < 1 || config.concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 32, got {}",
            config.concurrency
        )));
    }

    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid bind address '{}': {}", config.bind, e))
    })?;
    Ok(())
}
