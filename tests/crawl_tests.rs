//! Integration tests for the ingestion crawl
//!
//! These tests use wiremock to serve synthetic catalog pages and run the
//! full fetch → extract → paginate → ingest cycle end-to-end.

use scava::config::{Config, OutputConfig, ScraperConfig, UserAgentConfig};
use scava::crawler::Coordinator;
use scava::storage::{DatasetStore, SqliteStore};
use scava::Termination;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the given start URL
fn create_test_config(start_url: &str, max_pages: u32) -> Config {
    Config {
        scraper: ScraperConfig {
            start_url: start_url.to_string(),
            max_pages,
            courtesy_delay_ms: 5, // Very short for testing
            request_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            // Unused: tests wire an in-memory store directly
            database_path: ":memory:".to_string(),
        },
    }
}

/// Builds one catalog page with the given items and optional next link
fn catalog_page(items: &[(&str, &str, &str)], next_href: Option<&str>) -> String {
    let mut body = String::from("<html><body><section>");
    for (title, href, price) in items {
        body.push_str(&format!(
            r#"<article class="product_pod">
                <h3><a href="{}" title="{}">{}</a></h3>
                <p class="price_color">{}</p>
            </article>"#,
            href, title, title, price
        ));
    }
    body.push_str("</section><ul class=\"pager\">");
    if let Some(href) = next_href {
        body.push_str(&format!(
            r#"<li class="next"><a href="{}">next</a></li>"#,
            href
        ));
    }
    body.push_str("</ul></body></html>");
    body
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_multi_page_crawl_and_ingest() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/catalogue/page-1.html",
        catalog_page(
            &[
                ("Book One", "book_1/index.html", "£10.00"),
                ("Book Two", "book_2/index.html", "£20.00"),
            ],
            Some("page-2.html"),
        ),
    )
    .await;
    mount_page(
        &server,
        "/catalogue/page-2.html",
        catalog_page(
            &[
                ("Book Three", "book_3/index.html", "£30.00"),
                ("Book Four", "book_4/index.html", "£40.00"),
            ],
            Some("page-3.html"),
        ),
    )
    .await;
    mount_page(
        &server,
        "/catalogue/page-3.html",
        catalog_page(&[("Book Five", "book_5/index.html", "£50.00")], None),
    )
    .await;

    let start_url = format!("{}/catalogue/page-1.html", server.uri());
    let config = create_test_config(&start_url, 50);
    let store = SqliteStore::open_in_memory().expect("Failed to open store");

    let mut coordinator =
        Coordinator::new(config, "testhash".to_string(), store).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.pages_scraped, 3);
    assert_eq!(report.total_found, 5);
    assert_eq!(report.newly_inserted, 5);
    assert_eq!(report.termination, Termination::Completed);

    // Relative item links become absolute URLs under the catalog path
    let store = coordinator.into_store();
    let stored = store
        .find_by_source_url(&format!("{}/catalogue/book_3/index.html", server.uri()))
        .await
        .unwrap()
        .expect("Book Three should be stored");
    assert_eq!(stored.title, "Book Three");
    assert_eq!(stored.description, "£30.00");
    assert_eq!(store.count_datasets().await.unwrap(), 5);
}

#[tokio::test]
async fn test_fetch_failure_keeps_partial_results() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/catalogue/page-1.html",
        catalog_page(
            &[("Book One", "book_1/index.html", "£10.00")],
            Some("page-2.html"),
        ),
    )
    .await;
    mount_page(
        &server,
        "/catalogue/page-2.html",
        catalog_page(
            &[("Book Two", "book_2/index.html", "£20.00")],
            Some("page-3.html"),
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/page-3.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let start_url = format!("{}/catalogue/page-1.html", server.uri());
    let config = create_test_config(&start_url, 50);
    let store = SqliteStore::open_in_memory().expect("Failed to open store");

    let mut coordinator =
        Coordinator::new(config, "testhash".to_string(), store).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Run should absorb the fetch failure");

    // Pages 1-2 contribute; the failing page ends the crawl without
    // discarding what was accumulated
    assert_eq!(report.pages_scraped, 2);
    assert_eq!(report.total_found, 2);
    assert_eq!(report.newly_inserted, 2);
    assert_eq!(report.termination, Termination::FetchFailed);
}

#[tokio::test]
async fn test_page_bound_stops_cyclic_pagination() {
    let server = MockServer::start().await;

    // page-1 and page-2 point at each other forever
    mount_page(
        &server,
        "/catalogue/page-1.html",
        catalog_page(
            &[("Book One", "book_1/index.html", "£10.00")],
            Some("page-2.html"),
        ),
    )
    .await;
    mount_page(
        &server,
        "/catalogue/page-2.html",
        catalog_page(
            &[("Book Two", "book_2/index.html", "£20.00")],
            Some("page-1.html"),
        ),
    )
    .await;

    let start_url = format!("{}/catalogue/page-1.html", server.uri());
    let config = create_test_config(&start_url, 4);
    let store = SqliteStore::open_in_memory().expect("Failed to open store");

    let mut coordinator =
        Coordinator::new(config, "testhash".to_string(), store).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    // Exactly the bound, not earlier or later
    assert_eq!(report.pages_scraped, 4);
    assert_eq!(report.termination, Termination::BoundReached);
    assert_eq!(report.total_found, 4);
    // The two distinct records survive deduplication
    assert_eq!(report.newly_inserted, 2);
}

#[tokio::test]
async fn test_reingestion_is_idempotent() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/catalogue/page-1.html",
        catalog_page(
            &[
                ("Book One", "book_1/index.html", "£10.00"),
                ("Book Two", "book_2/index.html", "£20.00"),
            ],
            None,
        ),
    )
    .await;

    let start_url = format!("{}/catalogue/page-1.html", server.uri());
    let store = SqliteStore::open_in_memory().expect("Failed to open store");

    let mut coordinator = Coordinator::new(
        create_test_config(&start_url, 50),
        "testhash".to_string(),
        store,
    )
    .expect("Failed to create coordinator");
    let first = coordinator.run().await.expect("First run failed");
    assert_eq!(first.total_found, 2);
    assert_eq!(first.newly_inserted, 2);

    // Second run over the same store and an unchanged target
    let store = coordinator.into_store();
    let mut coordinator = Coordinator::new(
        create_test_config(&start_url, 50),
        "testhash".to_string(),
        store,
    )
    .expect("Failed to create coordinator");
    let second = coordinator.run().await.expect("Second run failed");

    assert_eq!(second.total_found, 2);
    assert_eq!(second.newly_inserted, 0);

    let store = coordinator.into_store();
    assert_eq!(store.count_datasets().await.unwrap(), 2);

    // Both runs land in the ledger, newest first
    let runs = store.latest_runs(10).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].newly_inserted, 0);
    assert_eq!(runs[1].newly_inserted, 2);
    assert_eq!(runs[0].termination, "completed");
}

#[tokio::test]
async fn test_empty_target() {
    let server = MockServer::start().await;

    mount_page(&server, "/catalogue/page-1.html", catalog_page(&[], None)).await;

    let start_url = format!("{}/catalogue/page-1.html", server.uri());
    let config = create_test_config(&start_url, 50);
    let store = SqliteStore::open_in_memory().expect("Failed to open store");

    let mut coordinator =
        Coordinator::new(config, "testhash".to_string(), store).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.pages_scraped, 1);
    assert_eq!(report.total_found, 0);
    assert_eq!(report.newly_inserted, 0);
    assert_eq!(report.termination, Termination::Completed);
    assert!(report.message.contains("no records"));
}

#[tokio::test]
async fn test_unreachable_start_page_yields_empty_run() {
    // Nothing listening on this port
    let config = create_test_config("http://127.0.0.1:1/catalogue/page-1.html", 50);
    let store = SqliteStore::open_in_memory().expect("Failed to open store");

    let mut coordinator =
        Coordinator::new(config, "testhash".to_string(), store).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Transport failure should not be fatal");

    assert_eq!(report.pages_scraped, 0);
    assert_eq!(report.total_found, 0);
    assert_eq!(report.termination, Termination::FetchFailed);
}
