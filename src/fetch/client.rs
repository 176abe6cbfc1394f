//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for PageLock, including:
//! - Building HTTP clients with a browser-like header set
//! - Per-request timeouts (page vs. sub-resource)
//! - Text or binary body reading
//! - Error classification

use crate::config::FetcherConfig;
use crate::fetch::{Body, FetchRequest, FetchResult, Fetcher, Method, ResponseKind};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS};
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// Requests look like they come from a desktop browser, which keeps many
/// servers from answering with a bot wall. Timeouts are set per request, the
/// connect timeout here only bounds the TCP/TLS handshake.
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use pagelock::config::FetcherConfig;
/// use pagelock::fetch::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10).min(config.page_timeout()))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed `Fetcher`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResult, FetchError> {
        let url = request.url.as_str();

        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self
                .client
                .post(url)
                .body(request.body.clone().unwrap_or_default()),
        };

        let response = builder
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();

        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let content_type = headers.get("content-type").cloned().unwrap_or_default();

        let body = match request.kind {
            ResponseKind::Text => Body::Text(
                response
                    .text()
                    .await
                    .map_err(|e| body_error(url, e))?,
            ),
            ResponseKind::Binary => Body::Binary(
                response
                    .bytes()
                    .await
                    .map_err(|e| body_error(url, e))?
                    .to_vec(),
            ),
        };

        tracing::trace!("Fetched {} ({}, {})", url, status_code, content_type);

        Ok(FetchResult {
            status_code,
            body,
            content_type,
            headers,
            final_url,
        })
    }
}

/// Classifies a failure that happened while reading the body
fn body_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Body {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
