//! Integration tests for full sweeps over HTTP
//!
//! These tests use wiremock to serve listing pages and run the crawler
//! end-to-end through `sweep`, the same path the binary takes.

use crate::common::{listing, Workspace};
use review_sweep::crawler::sweep;
use review_sweep::{RegionClassifier, SweepError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves an HTML listing page holding `reviews` at `route`
async fn mount_listing(server: &MockServer, route: &str, reviews: &[String]) {
    let body = format!(
        "<html><head><title>{}</title></head><body><div class=\"list\">{}</div></body></html>",
        route,
        reviews.concat()
    );

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_sweep_over_http() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    mount_listing(&server, "/ha-noi/pho-thin", &listing(3, 0)).await;
    mount_listing(&server, "/da-nang/banh-xeo", &listing(2, 0)).await;
    mount_listing(&server, "/ho-chi-minh/com-tam", &listing(1, 1)).await;
    mount_listing(&server, "/unknown-city/lau", &listing(2, 0)).await;
    mount_listing(&server, "/ha-noi/quan-vang", &listing(0, 0)).await;

    let urls: Vec<String> = [
        "/ha-noi/pho-thin",
        "/da-nang/banh-xeo",
        "/ho-chi-minh/com-tam",
        "/unknown-city/lau",
        "/ha-noi/quan-vang",
    ]
    .iter()
    .map(|route| format!("{}{}", server.uri(), route))
    .collect();
    workspace.write_url_list(&urls);

    let config = workspace.config(2);
    let report = sweep(&config, &workspace.url_list())
        .await
        .expect("Sweep failed");

    assert_eq!(report.universe, 5);
    assert_eq!(report.scheduled, 5);
    assert_eq!(report.workers.len(), 2);
    assert_eq!(report.persisted_reviews(), 8);
    assert_eq!(report.recorded(), 5);

    // Every URL is recorded, including the page without reviews
    let mut history = workspace.history_lines();
    history.sort();
    let mut expected = urls.clone();
    expected.sort();
    assert_eq!(history, expected);

    assert_eq!(workspace.shard("MienBac").len(), 3);
    assert_eq!(workspace.shard("MienTrung").len(), 2);
    assert_eq!(workspace.shard("MienNam").len(), 1);
    assert_eq!(workspace.shard("Other").len(), 2);

    let com_tam = &workspace.shard("MienNam")[0];
    assert_eq!(com_tam.locality, "ho-chi-minh");
    assert_eq!(com_tam.source_name, "com-tam");
    assert_eq!(com_tam.author, "Lan");
    assert_eq!(com_tam.score, 8.5);
    assert!(com_tam.review_id.starts_with("ho-chi-minh_"));

    let other = workspace.shard("Other");
    assert!(other.iter().all(|r| r.locality == "unknown-city"));
}

#[tokio::test]
async fn test_http_errors_leave_urls_pending() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    mount_listing(&server, "/hue/bun-bo", &listing(2, 0)).await;
    Mock::given(method("GET"))
        .and(path("/hue/closed"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hue/api"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;

    let good = format!("{}/hue/bun-bo", server.uri());
    let urls = vec![
        format!("{}/hue/closed", server.uri()),
        good.clone(),
        format!("{}/hue/api", server.uri()),
    ];
    workspace.write_url_list(&urls);

    let report = sweep(&workspace.config(1), &workspace.url_list())
        .await
        .expect("Sweep failed");

    assert_eq!(report.navigation_failures(), 2);
    assert_eq!(workspace.history_lines(), vec![good]);
    assert_eq!(workspace.shard("MienTrung").len(), 2);
}

#[tokio::test]
async fn test_rerun_only_retries_failed_urls() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();

    mount_listing(&server, "/can-tho/a", &listing(1, 0)).await;
    let flaky = format!("{}/can-tho/b", server.uri());
    let urls = vec![format!("{}/can-tho/a", server.uri()), flaky.clone()];
    workspace.write_url_list(&urls);
    let config = workspace.config(2);

    // First run: /can-tho/b is not served yet
    let first = sweep(&config, &workspace.url_list()).await.unwrap();
    assert_eq!(first.navigation_failures(), 1);
    assert_eq!(workspace.shard("MienNam").len(), 1);

    mount_listing(&server, "/can-tho/b", &listing(4, 0)).await;

    let second = sweep(&config, &workspace.url_list()).await.unwrap();
    assert_eq!(second.already_done, 1);
    assert_eq!(second.scheduled, 1);
    assert_eq!(second.persisted_reviews(), 4);
    assert_eq!(workspace.shard("MienNam").len(), 5);
    assert!(workspace.history_lines().contains(&flaky));
}

#[tokio::test]
async fn test_missing_url_list_fails_before_crawling() {
    let workspace = Workspace::new();
    let config = workspace.config(2);

    let result = sweep(&config, &workspace.url_list()).await;

    assert!(matches!(result, Err(SweepError::MissingUrlList { .. })));
    assert!(!workspace.dataset_dir().exists());
    assert!(!workspace.history_path().exists());
}

#[tokio::test]
async fn test_configured_region_table() {
    let server = MockServer::start().await;
    let workspace = Workspace::new();
    mount_listing(&server, "/hai-phong/banh-da", &listing(2, 0)).await;
    workspace.write_url_list(&[format!("{}/hai-phong/banh-da", server.uri())]);

    let mut config = workspace.config(1);
    config.regions = vec![review_sweep::config::RegionEntry {
        name: "Coast".to_string(),
        localities: vec!["hai-phong".to_string()],
    }];
    assert_eq!(
        RegionClassifier::from_config(&config).region_names(),
        vec!["Coast".to_string(), "Other".to_string()]
    );

    sweep(&config, &workspace.url_list()).await.unwrap();

    assert_eq!(workspace.shard("Coast").len(), 2);
    assert!(workspace.shard("MienBac").is_empty());
}
