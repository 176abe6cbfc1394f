//! Integration tests for the HTTP API
//!
//! A real server is bound on an ephemeral port and driven with reqwest; the
//! sites it clones are wiremock servers.

use pagelock::config::Config;
use pagelock::server::{serve_on, AppState};
use std::io::Cursor;
use std::sync::Arc;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::ZipArchive;

/// Starts the API and returns its base URL
async fn start_api() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    let state = Arc::new(AppState::new(Config::default()).expect("Failed to build state"));
    tokio::spawn(serve_on(listener, state));
    format!("http://{}", addr)
}

async fn post_json(url: &str, body: serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(url)
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .expect("API request failed")
}

async fn json_body(response: reqwest::Response) -> serde_json::Value {
    let text = response.text().await.expect("No body");
    serde_json::from_str(&text).expect("Body is not JSON")
}

async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>Landing</title></head><body><a href="/more">more</a></body></html>"#,
            "text/html",
        ))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/more"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>More</title></head><body></body></html>",
            "text/html",
        ))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clone_endpoint() {
    let site = MockServer::start().await;
    mount_site(&site).await;
    let api = start_api().await;

    let response = post_json(
        &format!("{}/api/clone", api),
        serde_json::json!({ "url": site.uri(), "embedImages": false }),
    )
    .await;

    assert_eq!(response.status(), 200);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["title"], "Landing");
    assert_eq!(body["url"], format!("{}/", site.uri()));
    let html = body["html"].as_str().expect("html is a string");
    assert_eq!(body["size"].as_u64(), Some(html.len() as u64));
    assert!(html.contains(&format!(r#"<a href="{}/more">"#, site.uri())));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clone_endpoint_errors() {
    let api = start_api().await;

    let response = post_json(&format!("{}/api/clone", api), serde_json::json!({})).await;
    assert_eq!(response.status(), 400);
    assert_eq!(json_body(response).await["error"], "URL is required");

    let response = post_json(
        &format!("{}/api/clone", api),
        serde_json::json!({ "url": "http://127.0.0.1:1/" }),
    )
    .await;
    assert_eq!(response.status(), 500);
    let error = json_body(response).await["error"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    assert!(error.starts_with("Failed to fetch website:"), "{}", error);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_preflight_is_allowed() {
    let api = start_api().await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/api/clone", api))
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .expect("Preflight failed");

    assert_eq!(response.status(), 200);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
    assert!(response.text().await.unwrap_or_default().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clone_site_endpoint_returns_archive() {
    let site = MockServer::start().await;
    mount_site(&site).await;
    let api = start_api().await;

    let response = post_json(
        &format!("{}/api/clone-site", api),
        serde_json::json!({ "url": site.uri(), "maxPages": 5, "maxDepth": 1 }),
    )
    .await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/zip")
    );
    assert_eq!(
        response
            .headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"127.0.0.1.zip\"")
    );

    let bytes = response.bytes().await.expect("No body");
    let mut archive = ZipArchive::new(Cursor::new(bytes.to_vec())).expect("Invalid archive");
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(names, vec!["index.html", "more.html"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clone_site_rejects_oversized_crawls() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&site)
        .await;
    let api = start_api().await;

    let response = post_json(
        &format!("{}/api/clone-site", api),
        serde_json::json!({ "url": site.uri(), "maxPages": 1_000_000 }),
    )
    .await;
    assert_eq!(response.status(), 400);
    assert_eq!(json_body(response).await["error"], "maxPages must be at most 100");

    let response = post_json(
        &format!("{}/api/clone-site", api),
        serde_json::json!({ "url": site.uri(), "maxDepth": 50 }),
    )
    .await;
    assert_eq!(response.status(), 400);
    assert_eq!(json_body(response).await["error"], "maxDepth must be at most 5");
}
