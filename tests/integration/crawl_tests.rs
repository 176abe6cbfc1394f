//! Integration tests for full-site cloning
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, archive included.

use pagelock::config::Config;
use pagelock::{clone_site, CloneError, CloneOptions, HttpFetcher};
use std::io::{Cursor, Read};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::ZipArchive;

/// Serves a page titled `title` linking to every entry of `links`
async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[String]) {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                "<html><head><title>{}</title></head><body>{}</body></html>",
                title, anchors
            ),
            "text/html",
        ))
        .mount(server)
        .await;
}

fn links(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn entry_names(archive: &[u8]) -> Vec<String> {
    let mut zip = ZipArchive::new(Cursor::new(archive)).expect("Invalid archive");
    (0..zip.len())
        .map(|i| zip.by_index(i).expect("Missing entry").name().to_string())
        .collect()
}

async fn crawl(
    url: &str,
    max_pages: usize,
    max_depth: u32,
) -> pagelock::Result<pagelock::SiteCloneResult> {
    let config = Config::default();
    let fetcher = HttpFetcher::new(&config.fetcher).expect("Failed to build fetcher");
    let options = CloneOptions::new(url)
        .with_embed_images(false)
        .with_limits(max_pages, max_depth);
    clone_site(&options, &fetcher, &config).await
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "Home",
        &[format!("{}/page1", base_url), "/page2".to_string(), "#top".to_string()],
    )
    .await;
    mount_page(&mock_server, "/page1", "Page 1", &links(&["/", "/page2"])).await;
    mount_page(&mock_server, "/page2", "Page 2", &[]).await;

    let result = crawl(&base_url, 10, 2).await.expect("Crawl failed");

    let titles: Vec<&str> = result.pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Home", "Page 1", "Page 2"]);
    assert!(result.failures.is_empty());

    assert_eq!(
        entry_names(&result.archive),
        vec!["index.html", "page1.html", "page2.html"]
    );

    let mut zip = ZipArchive::new(Cursor::new(result.archive.as_slice())).unwrap();
    let mut home = String::new();
    zip.by_name("index.html")
        .unwrap()
        .read_to_string(&mut home)
        .unwrap();
    assert!(home.contains("<title>Home</title>"));
    assert!(home.contains(&format!(r#"<a href="{}/page2">"#, base_url)));
}

#[tokio::test]
async fn test_page_budget_and_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let children: Vec<String> = (1..=10).map(|i| format!("/p{}", i)).collect();
    mount_page(&mock_server, "/", "Home", &children).await;
    for child in &children {
        mount_page(&mock_server, child, child, &[format!("{}/deeper", child)]).await;
    }

    let result = crawl(&base_url, 5, 1).await.expect("Crawl failed");

    assert_eq!(result.pages.len(), 5);
    let requested: Vec<String> = mock_server
        .received_requests()
        .await
        .expect("Request recording disabled")
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    assert_eq!(requested, vec!["/", "/p1", "/p2", "/p3", "/p4"]);
}

#[tokio::test]
async fn test_cross_origin_links_are_not_followed() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        "Home",
        &[format!("{}/elsewhere", other_server.uri()), "/local".to_string()],
    )
    .await;
    mount_page(&mock_server, "/local", "Local", &[]).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&other_server)
        .await;

    let result = crawl(&mock_server.uri(), 10, 3).await.expect("Crawl failed");
    assert_eq!(result.pages.len(), 2);
}

#[tokio::test]
async fn test_failed_page_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Home", &links(&["/broken", "/fine"])).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fine", "Fine", &[]).await;

    let result = crawl(&base_url, 10, 1).await.expect("Crawl failed");

    let titles: Vec<&str> = result.pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Home", "Fine"]);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].url, format!("{}/broken", base_url));
    assert!(matches!(
        result.failures[0].error,
        CloneError::HttpStatus { status: 500, .. }
    ));
    assert_eq!(entry_names(&result.archive), vec!["index.html", "fine.html"]);
}

#[tokio::test]
async fn test_crawl_follows_redirected_root() {
    let entry = MockServer::start().await;
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/", site.uri()).as_str()),
        )
        .mount(&entry)
        .await;
    mount_page(&site, "/", "Home", &links(&["/", "/a", "/b"])).await;
    mount_page(&site, "/a", "A", &[]).await;
    mount_page(&site, "/b", "B", &[]).await;

    let result = crawl(&entry.uri(), 10, 2).await.expect("Crawl failed");

    let titles: Vec<&str> = result.pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Home", "A", "B"]);
    assert_eq!(result.pages[0].final_url, format!("{}/", site.uri()));
    assert_eq!(
        entry_names(&result.archive),
        vec!["index.html", "a.html", "b.html"]
    );
}

#[tokio::test]
async fn test_unreachable_root_fails_the_crawl() {
    let err = crawl("http://127.0.0.1:1/", 10, 1).await.unwrap_err();
    assert!(matches!(err, CloneError::Fetch(_)));
}
