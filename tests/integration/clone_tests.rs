//! Integration tests for single-page cloning
//!
//! These tests use wiremock to serve a page and its sub-resources and run
//! the full clone through the real HTTP fetcher.

use pagelock::config::FetcherConfig;
use pagelock::{clone_single_page, CloneError, CloneOptions, HttpFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47];

async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

async fn clone(
    url: &str,
    embed_images: bool,
    config: &FetcherConfig,
) -> pagelock::Result<pagelock::CloneResult> {
    let fetcher = HttpFetcher::new(config).expect("Failed to build fetcher");
    let options = CloneOptions::new(url).with_embed_images(embed_images);
    clone_single_page(&options, &fetcher, config).await
}

#[tokio::test]
async fn test_full_clone_inlines_everything() {
    let site = MockServer::start().await;
    let cdn = MockServer::start().await;
    let base_url = site.uri();

    mount(
        &site,
        "/",
        html(&format!(
            r##"<!DOCTYPE html><html><head>
            <title>Home</title>
            <link rel="stylesheet" href="/css/site.css" media="screen">
            <script src="/js/app.js"></script>
            <script src="{}/lib.js"></script>
            </head><body>
            <a href="#main">skip</a>
            <a href="/about">About</a>
            <img src="/img/logo.png" srcset="/img/logo.png 1x, /img/logo-2x.png 2x">
            </body></html>"##,
            cdn.uri()
        )),
    )
    .await;
    mount(
        &site,
        "/css/site.css",
        ResponseTemplate::new(200).set_body_raw("body{color:red}", "text/css"),
    )
    .await;
    mount(
        &site,
        "/js/app.js",
        ResponseTemplate::new(200).set_body_raw("console.log('</script>')", "application/javascript"),
    )
    .await;
    mount(
        &site,
        "/img/logo.png",
        ResponseTemplate::new(200).set_body_raw(PNG_BYTES.to_vec(), "image/png"),
    )
    .await;

    // Cross-host scripts must never be requested
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&cdn)
        .await;

    let result = clone(&base_url, true, &FetcherConfig::default())
        .await
        .expect("Clone failed");

    assert_eq!(result.title, "Home");
    assert_eq!(result.source_url, format!("{}/", base_url));
    assert_eq!(result.byte_size, result.html.len());

    let page = &result.html;
    assert!(page.contains(&format!(r#"<base href="{}/">"#, base_url)));
    assert!(page.contains(r#"content="upgrade-insecure-requests""#));
    assert!(page.contains(r#"<style media="screen">body{color:red}</style>"#));
    assert!(page.contains(r#"<script>console.log('<\/script>')</script>"#));
    assert!(page.contains(&format!(r#"<script src="{}/lib.js"></script>"#, cdn.uri())));
    assert!(page.contains(r##"<a href="#main">"##));
    assert!(page.contains(&format!(r#"<a href="{}/about">"#, base_url)));
    assert!(page.contains(r#"<img src="data:image/png;base64,iVBORw==">"#));
}

#[tokio::test]
async fn test_failed_subresources_fall_back_to_absolute_urls() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount(
        &site,
        "/docs/",
        html(
            r#"<html><head>
            <link rel="stylesheet" href="missing.css">
            <script src="broken.js"></script>
            </head><body><img src="gone.png"></body></html>"#,
        ),
    )
    .await;
    mount(&site, "/docs/broken.js", ResponseTemplate::new(500)).await;
    mount(&site, "/docs/gone.png", ResponseTemplate::new(503)).await;

    let result = clone(&format!("{}/docs/", base_url), true, &FetcherConfig::default())
        .await
        .expect("A failed sub-resource must not fail the clone");

    let page = &result.html;
    assert!(page.contains(&format!(
        r#"<link rel="stylesheet" href="{}/docs/missing.css">"#,
        base_url
    )));
    assert!(page.contains(&format!(r#"<script src="{}/docs/broken.js">"#, base_url)));
    assert!(page.contains(&format!(r#"<img src="{}/docs/gone.png">"#, base_url)));
}

#[tokio::test]
async fn test_images_are_only_rewritten_when_embedding_is_off() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount(
        &site,
        "/gallery/",
        html(r#"<img src="a.jpg" srcset="a.jpg 480w, /b.jpg 800w">"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gallery/a.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&site)
        .await;

    let result = clone(&format!("{}/gallery/", base_url), false, &FetcherConfig::default())
        .await
        .expect("Clone failed");

    assert!(result.html.contains(&format!(
        r#"<img src="{0}/gallery/a.jpg" srcset="{0}/gallery/a.jpg 480w, {0}/b.jpg 800w">"#,
        base_url
    )));
}

#[tokio::test]
async fn test_slow_image_times_out_and_falls_back() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount(&site, "/", html(r#"<img src="/slow.png">"#)).await;
    mount(
        &site,
        "/slow.png",
        ResponseTemplate::new(200)
            .set_body_raw(PNG_BYTES.to_vec(), "image/png")
            .set_delay(std::time::Duration::from_secs(3)),
    )
    .await;

    let config = FetcherConfig {
        image_timeout_secs: 1,
        ..FetcherConfig::default()
    };
    let result = clone(&base_url, true, &config).await.expect("Clone failed");

    assert!(result
        .html
        .contains(&format!(r#"<img src="{}/slow.png">"#, base_url)));
}

#[tokio::test]
async fn test_configured_headers_are_sent() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "PageLockTest/1.0"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(html("<title>Agent</title>"))
        .expect(1)
        .mount(&site)
        .await;

    let config = FetcherConfig {
        user_agent: "PageLockTest/1.0".to_string(),
        ..FetcherConfig::default()
    };
    let result = clone(&site.uri(), true, &config)
        .await
        .expect("Request did not carry the configured headers");
    assert_eq!(result.title, "Agent");
}

#[tokio::test]
async fn test_redirected_page_resolves_against_final_url() {
    let site = MockServer::start().await;
    let base_url = site.uri();

    mount(
        &site,
        "/old",
        ResponseTemplate::new(301).insert_header("location", format!("{}/new/", base_url).as_str()),
    )
    .await;
    mount(&site, "/new/", html(r#"<a href="next">next</a>"#)).await;

    let result = clone(&format!("{}/old", base_url), true, &FetcherConfig::default())
        .await
        .expect("Clone failed");

    assert_eq!(result.source_url, format!("{}/old", base_url));
    assert!(result
        .html
        .contains(&format!(r#"<a href="{}/new/next">"#, base_url)));
}

#[tokio::test]
async fn test_page_errors() {
    let site = MockServer::start().await;
    mount(&site, "/missing", ResponseTemplate::new(404)).await;

    let err = clone(&format!("{}/missing", site.uri()), true, &FetcherConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CloneError::HttpStatus { status: 404, .. }));
    assert_eq!(err.status_code(), 500);

    let err = clone("http://127.0.0.1:1/", true, &FetcherConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CloneError::Fetch(_)));
    assert!(err.user_message().starts_with("Failed to fetch website:"));

    let err = clone("", true, &FetcherConfig::default()).await.unwrap_err();
    assert!(matches!(err, CloneError::Validation(_)));
    assert_eq!(err.user_message(), "URL is required");
}
