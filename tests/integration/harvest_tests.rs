//! Integration tests for the harvester
//!
//! These tests use wiremock to serve listing pages and run the full
//! fetch / extract / paginate / write cycle end-to-end.

use listing_harvest::config::{
    Config, HarvestConfig, IdentityConfig, OutputConfig, PacingConfig, SelectorConfig,
};
use listing_harvest::harvester::Harvester;
use listing_harvest::identity::{FixedIdentity, HeaderSet};
use listing_harvest::record::Record;
use listing_harvest::state::{AbortReason, HarvestState, StopReason};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const LISTING_PATH: &str = "/lawyers/civil-rights/south-carolina";

/// Matches requests without a `page` query parameter (page 1)
struct FirstPage;

impl Match for FirstPage {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "page")
    }
}

/// Creates a test configuration pointing at the given base URL
fn create_test_config(base_url: &str, max_pages: u32, output: &Path) -> Config {
    Config {
        harvest: HarvestConfig {
            base_url: base_url.to_string(),
            max_pages,
            jurisdiction: "South Carolina".to_string(),
            source: "Justia".to_string(),
            request_timeout_secs: 10,
            max_run_secs: None,
            expected_pages: None,
        },
        pacing: PacingConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
        },
        output: OutputConfig {
            path: output.display().to_string(),
        },
        selectors: SelectorConfig::default(),
        identity: IdentityConfig::default(),
    }
}

fn card(name: &str) -> String {
    let slug = name.to_lowercase().replace(' ', "-");
    format!(
        r#"<div class="jcard">
            <a href="/lawyers/{slug}"><strong class="name">{name}</strong></a>
            <span class="law-firm-name">{name} LLC</span>
            <a class="phone" href="tel:8035550100">(803) 555-0100</a>
            <span class="address">1 Main St<br>Columbia, SC 29201</span>
            <div class="practices"><a href="/civil-rights">Civil Rights</a></div>
        </div>"#
    )
}

fn malformed_card() -> String {
    r#"<div class="jcard"><a><strong class="name">Broken Link</strong></a></div>"#.to_string()
}

fn listing_page(cards: &[String]) -> String {
    format!(
        "<html><head><title>Lawyers</title></head><body><section>{}</section></body></html>",
        cards.join("\n")
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_first_page(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(FirstPage)
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: u32, response: ResponseTemplate, expected: u64) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(response)
        .expect(expected)
        .mount(server)
        .await;
}

fn read_output(path: &Path) -> Vec<Record> {
    let content = std::fs::read_to_string(path).expect("Output file should exist");
    serde_json::from_str(&content).expect("Output should be a JSON array of records")
}

fn names(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

fn setup() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("attorneys.json");
    (dir, output)
}

#[tokio::test]
async fn test_stops_on_non_success_status() {
    let mock_server = MockServer::start().await;
    let (_dir, output) = setup();

    mount_first_page(
        &mock_server,
        html(listing_page(&[card("Jane Roe"), card("John Doe")])),
    )
    .await;
    mount_page(&mock_server, 2, ResponseTemplate::new(404), 1).await;
    mount_page(&mock_server, 3, html(listing_page(&[card("Never")])), 0).await;

    let base_url = format!("{}{}", mock_server.uri(), LISTING_PATH);
    let config = create_test_config(&base_url, 3, &output);

    let harvester = Harvester::new(config).expect("Failed to create harvester");
    let report = harvester.run().await.expect("Harvest should write output");

    assert_eq!(report.records_written, 2);
    assert_eq!(report.pages_visited, 2);
    assert_eq!(
        report.outcome,
        HarvestState::Done(StopReason::NonSuccessStatus {
            page: 2,
            status: 404
        })
    );
    assert!(report
        .outcome
        .to_string()
        .starts_with("stopped, non-success status"));

    let records = read_output(&output);
    assert_eq!(names(&records), vec!["Jane Roe", "John Doe"]);
}

#[tokio::test]
async fn test_non_success_on_first_page_writes_empty_collection() {
    let mock_server = MockServer::start().await;
    let (_dir, output) = setup();

    mount_first_page(&mock_server, ResponseTemplate::new(503)).await;

    let base_url = format!("{}{}", mock_server.uri(), LISTING_PATH);
    let harvester = Harvester::new(create_test_config(&base_url, 5, &output)).unwrap();
    let report = harvester.run().await.unwrap();

    assert_eq!(report.records_written, 0);
    assert_eq!(report.pages_visited, 1);
    assert!(!report.is_aborted());
    assert!(read_output(&output).is_empty());
}

#[tokio::test]
async fn test_zero_cards_stops_and_keeps_prior_pages() {
    let mock_server = MockServer::start().await;
    let (_dir, output) = setup();

    mount_first_page(&mock_server, html(listing_page(&[card("Page One")]))).await;
    mount_page(
        &mock_server,
        2,
        html("<html><body><p>No results</p></body></html>".to_string()),
        1,
    )
    .await;
    mount_page(&mock_server, 3, html(listing_page(&[card("Never")])), 0).await;

    let base_url = format!("{}{}", mock_server.uri(), LISTING_PATH);
    let harvester = Harvester::new(create_test_config(&base_url, 10, &output)).unwrap();
    let report = harvester.run().await.unwrap();

    assert_eq!(
        report.outcome,
        HarvestState::Done(StopReason::PageExhausted { page: 2 })
    );
    assert_eq!(names(&read_output(&output)), vec!["Page One"]);
}

#[tokio::test]
async fn test_records_keep_page_order_up_to_page_limit() {
    let mock_server = MockServer::start().await;
    let (_dir, output) = setup();

    mount_first_page(&mock_server, html(listing_page(&[card("A1"), card("A2")]))).await;
    mount_page(&mock_server, 2, html(listing_page(&[card("B1")])), 1).await;
    mount_page(
        &mock_server,
        3,
        html(listing_page(&[card("C1"), card("C2"), card("A1")])),
        1,
    )
    .await;
    mount_page(&mock_server, 4, html(listing_page(&[card("D1")])), 0).await;

    let base_url = format!("{}{}", mock_server.uri(), LISTING_PATH);
    let harvester = Harvester::new(create_test_config(&base_url, 3, &output)).unwrap();
    let report = harvester.run().await.unwrap();

    assert_eq!(
        report.outcome,
        HarvestState::Done(StopReason::MaxPagesReached { max_pages: 3 })
    );
    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.records_written, 6);

    // Duplicates across pages are preserved in first-seen order
    let records = read_output(&output);
    assert_eq!(names(&records), vec!["A1", "A2", "B1", "C1", "C2", "A1"]);
}

#[tokio::test]
async fn test_malformed_cards_are_dropped() {
    let mock_server = MockServer::start().await;
    let (_dir, output) = setup();

    mount_first_page(
        &mock_server,
        html(listing_page(&[
            card("Good One"),
            malformed_card(),
            card("Good Two"),
            card("Good Three"),
        ])),
    )
    .await;
    mount_page(&mock_server, 2, ResponseTemplate::new(404), 1).await;

    let base_url = format!("{}{}", mock_server.uri(), LISTING_PATH);
    let harvester = Harvester::new(create_test_config(&base_url, 5, &output)).unwrap();
    let report = harvester.run().await.unwrap();

    assert_eq!(report.records_written, 3);
    assert_eq!(report.cards_skipped, 1);
    assert_eq!(
        names(&read_output(&output)),
        vec!["Good One", "Good Two", "Good Three"]
    );
}

#[tokio::test]
async fn test_records_are_fully_populated() {
    let mock_server = MockServer::start().await;
    let (_dir, output) = setup();

    let missing_name = r#"<div class="jcard">
            <span class="law-firm-name">Anonymous LLC</span>
            <a class="-phone">(864) 555-0123</a>
            <span class="address">22 Oak Ave, Greenville</span>
            <div class="practices"><a>Appeals</a><a>Civil Rights</a></div>
        </div>"#
        .to_string();
    let missing_address = r#"<div class="jcard">
            <a href="/lawyers/no-address"><strong class="name">No Address</strong></a>
        </div>"#
        .to_string();

    mount_first_page(
        &mock_server,
        html(listing_page(&[card("Jane Roe"), missing_name, missing_address])),
    )
    .await;

    let base_url = format!("{}{}", mock_server.uri(), LISTING_PATH);
    let harvester = Harvester::new(create_test_config(&base_url, 1, &output)).unwrap();
    harvester.run().await.unwrap();

    let records = read_output(&output);
    assert_eq!(records.len(), 3);

    assert_eq!(
        records[0],
        Record {
            name: "Jane Roe".to_string(),
            organization: Some("Jane Roe LLC".to_string()),
            phone: Some("(803) 555-0100".to_string()),
            address: "1 Main St Columbia, SC 29201".to_string(),
            profile_url: Some(format!("{}/lawyers/jane-roe", mock_server.uri())),
            tags: vec!["Civil Rights".to_string()],
            jurisdiction: "South Carolina".to_string(),
            source: "Justia".to_string(),
        }
    );

    assert_eq!(records[1].name, "Unknown");
    assert_eq!(records[1].organization.as_deref(), Some("Anonymous LLC"));
    assert_eq!(records[1].phone.as_deref(), Some("(864) 555-0123"));
    assert_eq!(records[1].address, "22 Oak Ave, Greenville");
    assert_eq!(records[1].tags, vec!["Appeals", "Civil Rights"]);

    assert_eq!(records[2].address, "South Carolina");
    assert_eq!(
        records[2].profile_url,
        Some(format!("{}/lawyers/no-address", mock_server.uri()))
    );
}

#[tokio::test]
async fn test_connection_failure_aborts_with_empty_output() {
    let (_dir, output) = setup();

    // Grab a free port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let base_url = format!("http://127.0.0.1:{}{}", port, LISTING_PATH);
    let harvester = Harvester::new(create_test_config(&base_url, 3, &output)).unwrap();
    let report = harvester.run().await.expect("Transport failures must not fail the run");

    assert!(report.is_aborted());
    assert!(matches!(
        report.outcome,
        HarvestState::Aborted(AbortReason::Transport { page: 1, .. })
    ));
    assert_eq!(report.pages_visited, 1);
    assert!(read_output(&output).is_empty());
}

#[tokio::test]
async fn test_timeout_keeps_partial_results() {
    let mock_server = MockServer::start().await;
    let (_dir, output) = setup();

    mount_first_page(&mock_server, html(listing_page(&[card("Before Timeout")]))).await;
    mount_page(
        &mock_server,
        2,
        html(listing_page(&[card("Too Slow")])).set_delay(Duration::from_secs(3)),
        1,
    )
    .await;

    let base_url = format!("{}{}", mock_server.uri(), LISTING_PATH);
    let mut config = create_test_config(&base_url, 5, &output);
    config.harvest.request_timeout_secs = 1;

    let harvester = Harvester::new(config).unwrap();
    let report = harvester.run().await.unwrap();

    assert!(matches!(
        report.outcome,
        HarvestState::Aborted(AbortReason::Transport { page: 2, .. })
    ));
    assert_eq!(report.records_written, 1);
    assert_eq!(names(&read_output(&output)), vec!["Before Timeout"]);
}

#[tokio::test]
async fn test_run_budget_aborts_before_next_page() {
    let mock_server = MockServer::start().await;
    let (_dir, output) = setup();

    mount_first_page(&mock_server, html(listing_page(&[card("Only Page")]))).await;
    mount_page(&mock_server, 2, html(listing_page(&[card("Never")])), 0).await;

    let base_url = format!("{}{}", mock_server.uri(), LISTING_PATH);
    let mut config = create_test_config(&base_url, 5, &output);
    config.harvest.max_run_secs = Some(1);
    config.pacing = PacingConfig {
        min_delay_ms: 1500,
        max_delay_ms: 1500,
    };

    let harvester = Harvester::new(config).unwrap();
    let report = harvester.run().await.unwrap();

    assert_eq!(
        report.outcome,
        HarvestState::Aborted(AbortReason::DeadlineExceeded {
            page: 2,
            budget_secs: 1
        })
    );
    assert_eq!(report.pages_visited, 1);
    assert_eq!(names(&read_output(&output)), vec!["Only Page"]);
}

#[tokio::test]
async fn test_identity_headers_are_sent() {
    let mock_server = MockServer::start().await;
    let (_dir, output) = setup();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(header("user-agent", "HarvestTest/1.0"))
        .and(header("referer", "https://search.example.com/"))
        .and(header("accept", "text/html"))
        .respond_with(html(listing_page(&[card("Seen")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base_url = format!("{}{}", mock_server.uri(), LISTING_PATH);
    let harvester = Harvester::new(create_test_config(&base_url, 1, &output))
        .unwrap()
        .with_identity(FixedIdentity(HeaderSet {
            user_agent: "HarvestTest/1.0".to_string(),
            accept: "text/html".to_string(),
            referer: "https://search.example.com/".to_string(),
        }));

    let report = harvester.run().await.unwrap();
    assert_eq!(report.records_written, 1);
}

#[tokio::test]
async fn test_output_replaces_previous_file() {
    let mock_server = MockServer::start().await;
    let (_dir, output) = setup();
    std::fs::write(&output, r#"[{"stale": true}]"#).unwrap();

    mount_first_page(&mock_server, html(listing_page(&[card("Fresh")]))).await;

    let base_url = format!("{}{}", mock_server.uri(), LISTING_PATH);
    let harvester = Harvester::new(create_test_config(&base_url, 1, &output)).unwrap();
    harvester.run().await.unwrap();

    assert_eq!(names(&read_output(&output)), vec!["Fresh"]);
}
