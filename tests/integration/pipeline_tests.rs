//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to serve search and listing pages and run the
//! phases end-to-end against temporary stores.

use immo_harvest::config::{
    Config, CrawlConfig, FetchConfig, OutputConfig, SelectorConfig, SiteConfig, UserAgentConfig,
};
use immo_harvest::crawler::Harvester;
use immo_harvest::output::normalize;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &Path, start: (u64, u64)) -> Config {
    let store = |name: &str| dir.join(name).to_string_lossy().into_owned();

    Config {
        site: SiteConfig {
            search_url: format!("{}/vendita-case/roma/", base_url),
            listing_prefix: format!("{}/annunci/", base_url),
            min_price_param: "prezzoMinimo".to_string(),
            max_price_param: "prezzoMassimo".to_string(),
            page_param: "pag".to_string(),
        },
        user_agent: UserAgentConfig {
            value: "TestHarvest/1.0".to_string(),
        },
        fetch: FetchConfig {
            timeout_secs: 5,
            connect_timeout_secs: 2,
            request_delay_ms: 0,
            max_pages_per_window: 20,
        },
        crawl: CrawlConfig {
            start_min_price: start.0,
            start_max_price: start.1,
        },
        selectors: SelectorConfig::default(),
        output: OutputConfig {
            checkpoint_path: store("checkpoint.txt"),
            urls_path: store("urls.txt"),
            deduplicated_urls_path: store("urls_dedup.txt"),
            dataset_path: store("dataset.json"),
            formatted_dataset_path: store("formatted.json"),
        },
    }
}

fn search_page(ids: &[&str]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<a class="in-listingCardTitle" href="/annunci/{}/" title="Appartamento {}">Card</a>"#,
                id, id
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="in-realEstateListHeader__title">{} risultati per: case in vendita Roma</div>{}</body></html>"#,
        ids.len(),
        cards
    )
}

fn listing_page(features: &[(&str, &str)]) -> String {
    let items: String = features
        .iter()
        .map(|(title, value)| {
            format!(
                r#"<dt class="re-featuresItem__title">{}</dt><dd class="re-featuresItem__description">{}</dd>"#,
                title, value
            )
        })
        .collect();
    format!("<html><body><dl>{}</dl></body></html>", items)
}

async fn mount_search_page(
    server: &MockServer,
    window: (u64, u64),
    page: u32,
    status: u16,
    body: String,
    expected: u64,
) {
    Mock::given(method("GET"))
        .and(path("/vendita-case/roma/"))
        .and(query_param("prezzoMinimo", window.0.to_string()))
        .and(query_param("prezzoMassimo", window.1.to_string()))
        .and(query_param("pag", page.to_string()))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, id: &str, status: u16, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/annunci/{}/", id)))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // First window: two pages, one auction card, one listing repeated across pages
    let mut first_page = search_page(&["1", "2"]);
    first_page = first_page.replace(
        "</body>",
        r#"<a class="in-listingCardTitle" href="/annunci/9/" title="Villa all'asta">Card</a></body>"#,
    );
    mount_search_page(&server, (1_000_000, 1_050_000), 1, 200, first_page, 1).await;
    mount_search_page(&server, (1_000_000, 1_050_000), 2, 200, search_page(&["2", "3"]), 1).await;

    // Second (last) window
    mount_search_page(&server, (1_000_000, 5_000_000), 1, 200, search_page(&["3", "4"]), 1).await;

    mount_listing(&server, "1", 200, listing_page(&[("Locali", "3"), ("Piano", "2")]), 1).await;
    mount_listing(&server, "2", 200, listing_page(&[("Locali", "1")]), 1).await;
    mount_listing(&server, "3", 500, String::new(), 1).await;
    mount_listing(&server, "4", 200, listing_page(&[("Superficie", "120 m²")]), 1).await;
    mount_listing(&server, "9", 200, listing_page(&[("Asta", "sì")]), 0).await;

    let config = create_test_config(&server.uri(), dir.path(), (1_000_000, 1_050_000));
    let mut harvester = Harvester::new(config).expect("Failed to create harvester");
    let summary = harvester.run().await.expect("Harvest failed");

    let discovery = summary.discovery.unwrap();
    assert_eq!(discovery.windows_crawled, 2);
    assert_eq!(discovery.pages_fetched, 3);
    assert_eq!(discovery.urls_found, 6);
    assert!(discovery.incomplete_windows.is_empty());

    let dedup = summary.dedup.unwrap();
    assert_eq!(dedup.raw_urls, 6);
    assert_eq!(dedup.unique_urls, 4);
    assert_eq!(dedup.duplicates, 2);

    let extraction = summary.extraction.unwrap();
    assert_eq!(extraction.saved, 3);
    assert_eq!(extraction.skipped, 1);
    assert_eq!(extraction.errors, 1);
    assert_eq!(summary.normalized_records, Some(3));

    let checkpoint = std::fs::read_to_string(dir.path().join("checkpoint.txt")).unwrap();
    assert_eq!(checkpoint, "done\n3\n");

    let unique = std::fs::read_to_string(dir.path().join("urls_dedup.txt")).unwrap();
    assert_eq!(unique.lines().count(), 4);
    assert!(unique
        .lines()
        .all(|line| line.starts_with(&format!("{}/annunci/", server.uri())) && line.ends_with('/')));

    let formatted = std::fs::read_to_string(dir.path().join("formatted.json")).unwrap();
    let records = normalize(&formatted).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["Piano"], "2");
    assert_eq!(records[2]["Superficie"], "120 m²");
}

#[tokio::test]
async fn test_discovery_resumes_from_checkpointed_window() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // The first window was finished by an earlier, interrupted run
    std::fs::write(dir.path().join("checkpoint.txt"), "1000000 5000000\n0\n").unwrap();
    mount_search_page(&server, (1_000_000, 1_050_000), 1, 200, search_page(&["1"]), 0).await;
    mount_search_page(&server, (1_000_000, 5_000_000), 1, 200, search_page(&["7"]), 1).await;

    let config = create_test_config(&server.uri(), dir.path(), (1_000_000, 1_050_000));
    let mut harvester = Harvester::new(config).unwrap();
    let report = harvester.discover().await.unwrap();

    assert_eq!(report.windows_crawled, 1);
    let urls = std::fs::read_to_string(dir.path().join("urls.txt")).unwrap();
    assert_eq!(urls, format!("{}/annunci/7/\n", server.uri()));

    // A finished walk crawls nothing on the next start
    let again = harvester.discover().await.unwrap();
    assert_eq!(again.windows_crawled, 0);
}

#[tokio::test]
async fn test_access_denied_ends_window_and_discovery_continues() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_search_page(&server, (1_000_000, 1_050_000), 1, 200, search_page(&["1", "2"]), 1).await;
    mount_search_page(&server, (1_000_000, 1_050_000), 2, 403, String::new(), 1).await;
    mount_search_page(&server, (1_000_000, 5_000_000), 1, 200, search_page(&["3"]), 1).await;

    let config = create_test_config(&server.uri(), dir.path(), (1_000_000, 1_050_000));
    let mut harvester = Harvester::new(config).unwrap();
    let report = harvester.discover().await.unwrap();

    assert_eq!(report.windows_crawled, 2);
    assert_eq!(report.urls_found, 3);
    assert_eq!(report.access_denied, 1);
    assert_eq!(report.incomplete_windows.len(), 1);

    let checkpoint = std::fs::read_to_string(dir.path().join("checkpoint.txt")).unwrap();
    assert_eq!(checkpoint, "done\n0\n");
}

#[tokio::test]
async fn test_unreachable_site_keeps_window_checkpointed() {
    let dir = TempDir::new().unwrap();

    // Nothing listens on the discard port
    let config = create_test_config("http://127.0.0.1:9", dir.path(), (900_000, 950_000));
    let mut harvester = Harvester::new(config).unwrap();
    let summary = harvester.run().await.unwrap();

    let discovery = summary.discovery.unwrap();
    assert_eq!(discovery.windows_crawled, 1);
    assert_eq!(discovery.transport_errors, 1);
    assert_eq!(
        discovery.interrupted_at,
        Some(immo_harvest::PriceWindow::new(900_000, 950_000))
    );
    assert!(summary.dedup.is_none());
    assert!(summary.extraction.is_none());
    assert!(!dir.path().join("urls_dedup.txt").exists());

    let checkpoint = std::fs::read_to_string(dir.path().join("checkpoint.txt")).unwrap();
    assert_eq!(checkpoint, "900000 950000\n0\n");
}

#[tokio::test]
async fn test_timeout_mid_window_recrawls_window_on_next_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_search_page(&server, (1_000_000, 1_050_000), 1, 200, search_page(&["1", "2"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/vendita-case/roma/"))
        .and(query_param("prezzoMinimo", "1000000"))
        .and(query_param("prezzoMassimo", "1050000"))
        .and(query_param("pag", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(search_page(&["3"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), dir.path(), (1_000_000, 1_050_000));
    config.fetch.timeout_secs = 1;
    let mut harvester = Harvester::new(config.clone()).unwrap();
    let report = harvester.discover().await.unwrap();

    assert_eq!(report.windows_crawled, 1);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.transport_errors, 1);
    assert!(report.is_interrupted());

    // Page 1 URLs are kept, the window is not
    let urls = std::fs::read_to_string(dir.path().join("urls.txt")).unwrap();
    assert_eq!(urls.lines().count(), 2);
    let checkpoint = std::fs::read_to_string(dir.path().join("checkpoint.txt")).unwrap();
    assert_eq!(checkpoint, "1000000 1050000\n0\n");

    // The site recovers: the same window is crawled again from page 1
    server.reset().await;
    mount_search_page(&server, (1_000_000, 1_050_000), 1, 200, search_page(&["1", "2"]), 1).await;
    mount_search_page(&server, (1_000_000, 1_050_000), 2, 200, search_page(&["3"]), 1).await;
    mount_search_page(&server, (1_000_000, 5_000_000), 1, 200, search_page(&["4"]), 1).await;

    let mut harvester = Harvester::new(config).unwrap();
    let report = harvester.discover().await.unwrap();

    assert_eq!(report.windows_crawled, 2);
    assert!(!report.is_interrupted());
    let checkpoint = std::fs::read_to_string(dir.path().join("checkpoint.txt")).unwrap();
    assert_eq!(checkpoint, "done\n0\n");

    let dedup = harvester.dedupe().unwrap();
    assert_eq!(dedup.raw_urls, 6);
    assert_eq!(dedup.unique_urls, 4);
}

#[tokio::test]
async fn test_extraction_resumes_and_dedupe_keeps_indexed_store() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let base = server.uri();

    std::fs::write(dir.path().join("checkpoint.txt"), "done\n1\n").unwrap();
    std::fs::write(
        dir.path().join("urls_dedup.txt"),
        format!("{0}/annunci/1/\n{0}/annunci/2/\n", base),
    )
    .unwrap();
    // A raw store that would dedupe to a different order
    std::fs::write(
        dir.path().join("urls.txt"),
        format!("{0}/annunci/2/\n{0}/annunci/1/\n{0}/annunci/5/\n", base),
    )
    .unwrap();
    std::fs::write(dir.path().join("dataset.json"), "{\n    \"Locali\": \"3\"\n},\n").unwrap();

    mount_listing(&server, "1", 200, listing_page(&[("Locali", "3")]), 0).await;
    mount_listing(&server, "2", 200, listing_page(&[("Locali", "4")]), 1).await;

    let config = create_test_config(&base, dir.path(), (0, 20_000));
    let mut harvester = Harvester::new(config).unwrap();

    let dedup = harvester.dedupe().unwrap();
    assert!(dedup.kept_existing);
    assert_eq!(dedup.unique_urls, 2);

    let extraction = harvester.extract().await.unwrap();
    assert_eq!(extraction.start_offset, 1);
    assert_eq!(extraction.saved, 1);
    assert_eq!(extraction.items_processed, 2);

    assert_eq!(harvester.normalize().unwrap(), Some(2));
    let formatted = std::fs::read_to_string(dir.path().join("formatted.json")).unwrap();
    let values: Vec<String> = normalize(&formatted)
        .unwrap()
        .iter()
        .map(|record| record["Locali"].clone())
        .collect();
    assert_eq!(values, vec!["3", "4"]);
}

#[tokio::test]
async fn test_normalize_reports_torn_dataset() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("dataset.json"),
        "{\n    \"Locali\": \"3\"\n},\n{\n    \"Loc",
    )
    .unwrap();

    let config = create_test_config(&server.uri(), dir.path(), (0, 20_000));
    let harvester = Harvester::new(config).unwrap();

    let result = harvester.normalize();
    assert!(matches!(result, Err(immo_harvest::HarvestError::Format(_))));
    assert!(!dir.path().join("formatted.json").exists());
}
