//! End-to-end session tests: mock feed, file-backed history

use photo_search_mcp::config::{Config, TransportKind};
use photo_search_mcp::types::{SessionStatus, SortMode, ViewPatch};
use photo_search_mcp::SearchSessionController;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED_PATH: &str = "/services/feeds/photos_public.gne";

fn fixture(titles: &[(&str, &str)]) -> Value {
    let items: Vec<Value> = titles
        .iter()
        .enumerate()
        .map(|(i, (title, published))| {
            json!({
                "title": title,
                "link": format!("https://www.flickr.com/photos/someone/{}/", 500 + i),
                "media": {"m": "https://live.staticflickr.com/x_m.jpg"},
                "published": published,
                "author": "nobody@flickr.com (\"Someone\")",
                "tags": ""
            })
        })
        .collect();
    json!({ "items": items })
}

fn config(server: &MockServer, history_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.feed.base_url = format!("{}{}", server.uri(), FEED_PATH);
    config.feed.transport = TransportKind::Direct;
    config.history.dir = history_dir.path().to_path_buf();
    config
}

#[tokio::test]
async fn test_search_persists_history_across_sessions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("tags", "cats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture(&[
            ("Old cat", "2024-01-01T00:00:00Z"),
            ("New cat", "2024-06-01T00:00:00Z"),
            ("Middle cat", "2024-03-01T00:00:00Z"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let history_dir = tempfile::tempdir().unwrap();
    let config = config(&server, &history_dir);

    let session = SearchSessionController::from_config(&config).unwrap();
    let snapshot = session.search("cats").await;
    assert_eq!(snapshot.status, SessionStatus::Ready);
    assert_eq!(snapshot.projected_view.items.len(), 3);
    assert_eq!(snapshot.history, vec!["cats"]);

    let sorted = session.change_view(ViewPatch {
        sort_mode: Some(SortMode::DateDesc),
        ..ViewPatch::default()
    });
    let titles: Vec<_> = sorted.projected_view.items.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["New cat", "Middle cat", "Old cat"]);

    // a fresh session sees the saved history but no results
    let restarted = SearchSessionController::from_config(&config).unwrap();
    let snapshot = restarted.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Idle);
    assert_eq!(snapshot.history, vec!["cats"]);
    assert_eq!(snapshot.result_count, 0);
}

#[tokio::test]
async fn test_failed_search_is_not_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let history_dir = tempfile::tempdir().unwrap();
    let session = SearchSessionController::from_config(&config(&server, &history_dir)).unwrap();

    let snapshot = session.search("cats").await;
    assert_eq!(snapshot.status, SessionStatus::Error);
    assert!(snapshot.error_message.is_some());
    assert!(snapshot.history.is_empty());
    assert!(!history_dir.path().join("flickr_search_history.json").exists());
}

#[tokio::test]
async fn test_clear_history_removes_slot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture(&[("Cat", "2024-01-01T00:00:00Z")])))
        .mount(&server)
        .await;

    let history_dir = tempfile::tempdir().unwrap();
    let session = SearchSessionController::from_config(&config(&server, &history_dir)).unwrap();
    session.search("cats").await;
    assert!(history_dir.path().join("flickr_search_history.json").exists());

    let snapshot = session.clear_history();
    assert!(snapshot.history.is_empty());
    assert_eq!(snapshot.result_count, 1);
    assert!(!history_dir.path().join("flickr_search_history.json").exists());
}
