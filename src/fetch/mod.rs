//! Resource fetcher
//!
//! This module contains everything that touches the network:
//! - The `Fetcher` trait every pass and the orchestrator fetch through
//! - `HttpFetcher`, the reqwest-backed implementation
//! - Request and response types shared by all callers
//!
//! Alternate fetch paths (for example one that gets past bot protection) plug
//! in by implementing `Fetcher`.

mod client;

pub use client::{build_http_client, HttpFetcher};

use crate::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// HTTP method of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// How the response body should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Text,
    Binary,
}

/// A single outgoing request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub timeout: Duration,
    pub kind: ResponseKind,
    pub body: Option<String>,
}

impl FetchRequest {
    /// GET request reading the body as text
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            timeout,
            kind: ResponseKind::Text,
            body: None,
        }
    }

    /// POST request with a body, reading the response as text
    pub fn post(url: impl Into<String>, body: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            timeout,
            kind: ResponseKind::Text,
            body: Some(body.into()),
        }
    }

    /// Reads the response body as raw bytes instead of text
    pub fn binary(mut self) -> Self {
        self.kind = ResponseKind::Binary;
        self
    }
}

/// Response body, shaped by the request's `ResponseKind`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Binary(Vec<u8>),
}

/// Result of a completed request
///
/// Any status code is reported here, including 4xx/5xx. Only transport
/// failures are returned as `FetchError`.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// HTTP status code
    pub status_code: u16,
    /// Response body
    pub body: Body,
    /// Content-Type header value, empty when absent
    pub content_type: String,
    /// Response headers with lowercase names
    pub headers: HashMap<String, String>,
    /// URL after redirects
    pub final_url: String,
}

impl FetchResult {
    /// True only for HTTP 200
    ///
    /// Every pass uses this same check before using a response.
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }

    /// True for any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Body as text; binary bodies are decoded lossily
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        match &self.body {
            Body::Text(text) => std::borrow::Cow::Borrowed(text),
            Body::Binary(bytes) => String::from_utf8_lossy(bytes),
        }
    }

    /// Body as bytes
    pub fn bytes(&self) -> &[u8] {
        match &self.body {
            Body::Text(text) => text.as_bytes(),
            Body::Binary(bytes) => bytes,
        }
    }

    /// MIME type without parameters, e.g. `image/png` for `image/png; q=1`
    pub fn mime_type(&self) -> Option<&str> {
        self.content_type
            .split(';')
            .next()
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
    }
}

/// Anything that can execute a `FetchRequest`
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Executes the request
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResult)` - The server answered, whatever the status
    /// * `Err(FetchError)` - Timeout, DNS, connection or body read failure
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResult, FetchError>;
}
