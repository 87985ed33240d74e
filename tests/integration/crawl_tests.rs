//! End-to-end crawl scenarios against a mock catalog

use crate::common::*;
use catalog_crawler::crawler::{Coordinator, StopReason};
use catalog_crawler::{CrawlError, ItemType};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ids_of(report: &catalog_crawler::CrawlReport) -> Vec<String> {
    report.records.iter().map(|r| r.id.to_string()).collect()
}

#[tokio::test]
async fn test_links_deduplicated_across_pages() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[101, 102, 103]).await;
    mount_page(&server, 12, Some("vs-2"), &[103, 104]).await;
    mount_page(&server, 24, Some("vs-3"), &[104]).await;
    mount_items(&server, &[101, 102, 103, 104]).await;

    let report = Coordinator::new(test_config(&server))
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(ids_of(&report), vec!["101", "102", "103", "104"]);
    assert_eq!(report.links_discovered, 4);
    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.items_skipped, 0);
    assert_eq!(report.stop_reason, StopReason::Stalled);
}

#[tokio::test]
async fn test_records_carry_extracted_fields() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[101]).await;
    mount_page(&server, 12, Some("vs-2"), &[]).await;
    mount_items(&server, &[101]).await;

    let report = Coordinator::new(test_config(&server))
        .unwrap()
        .run()
        .await
        .unwrap();

    let record = &report.records[0];
    assert_eq!(record.title, "Cancun week 101");
    assert_eq!(record.description, "Seven nights all inclusive");
    assert_eq!(
        record.image_link.as_deref(),
        Some("https://cdn.example.com/101.jpg")
    );
    assert_eq!(record.price, Some(1101.0));
    assert_eq!(record.region, "Caribe");
    assert_eq!(record.item_type, ItemType::Package);
    assert_eq!(record.slug, "trip-101");
    assert_eq!(record.link, format!("{}{}", server.uri(), item_path(101)));
}

#[tokio::test]
async fn test_max_items_stops_before_next_item() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[101, 102, 103, 104, 105]).await;

    for id in [101, 102] {
        Mock::given(method("GET"))
            .and(path(item_path(id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(item_html(id)))
            .expect(1)
            .mount(&server)
            .await;
    }
    for id in [103, 104, 105] {
        Mock::given(method("GET"))
            .and(path(item_path(id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(item_html(id)))
            .expect(0)
            .mount(&server)
            .await;
    }

    let mut config = test_config(&server);
    config.crawler.max_items = 2;

    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(ids_of(&report), vec!["101", "102"]);
    assert_eq!(report.stop_reason, StopReason::MaxItems);
    assert_eq!(report.pages_visited, 1);
}

#[tokio::test]
async fn test_failed_items_are_skipped() {
    let server = MockServer::start().await;
    let ids: Vec<u32> = (1..=10).collect();
    mount_listing(&server, Some("vs-1"), &ids).await;
    mount_page(&server, 12, Some("vs-2"), &ids).await;

    let failing = [2, 5, 9];
    for id in failing {
        Mock::given(method("GET"))
            .and(path(item_path(id)))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
    }
    let working: Vec<u32> = ids.iter().copied().filter(|id| !failing.contains(id)).collect();
    mount_items(&server, &working).await;

    let report = Coordinator::new(test_config(&server))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.records.len(), 7);
    assert_eq!(report.items_skipped, 3);
    assert_eq!(report.stop_reason, StopReason::Stalled);
    assert!(!ids_of(&report).contains(&"5".to_string()));
}

#[tokio::test]
async fn test_transient_item_errors_are_retried() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[1]).await;
    mount_page(&server, 12, None, &[]).await;

    Mock::given(method("GET"))
        .and(path(item_path(1)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_items(&server, &[1]).await;

    let report = Coordinator::new(test_config(&server))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.items_skipped, 0);
}

#[tokio::test]
async fn test_rotated_token_is_forwarded() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[1, 2]).await;

    // Each page only answers when the latest token is presented
    let pages: [(u32, &str, Option<&str>, &[u32]); 3] = [
        (12, "vs-1", Some("vs-2"), &[3]),
        (24, "vs-2", None, &[4]),
        (36, "vs-2", Some("vs-3"), &[4]),
    ];
    for (offset, expected_token, next_token, ids) in pages {
        Mock::given(method("POST"))
            .and(path(LISTING_PATH))
            .and(body_string_contains(format!("ideasDataView_first={}&", offset)))
            .and(body_string_contains(format!(
                "javax.faces.ViewState={}",
                expected_token
            )))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(partial_response(next_token, ids)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }
    mount_items(&server, &[1, 2, 3, 4]).await;

    let report = Coordinator::new(test_config(&server))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(ids_of(&report), vec!["1", "2", "3", "4"]);
    assert_eq!(report.pages_visited, 4);
    assert_eq!(report.stop_reason, StopReason::Stalled);
}

#[tokio::test]
async fn test_page_requests_are_partial_updates() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[1]).await;
    mount_items(&server, &[1]).await;

    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .and(wiremock::matchers::header("faces-request", "partial/ajax"))
        .and(wiremock::matchers::header("x-requested-with", "XMLHttpRequest"))
        .and(body_string_contains("javax.faces.partial.ajax=true"))
        .and(body_string_contains("ideasDataView_rows=12"))
        .and(body_string_contains("form_SUBMIT=1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(partial_response(None, &[])))
        .expect(1)
        .mount(&server)
        .await;

    let report = Coordinator::new(test_config(&server))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(report.stop_reason, StopReason::Stalled);
}

#[tokio::test]
async fn test_empty_first_page_stalls() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[]).await;

    let report = Coordinator::new(test_config(&server))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(report.records.is_empty());
    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.stop_reason, StopReason::Stalled);
}

#[tokio::test]
async fn test_bootstrap_http_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let result = Coordinator::new(test_config(&server)).unwrap().run().await;
    assert!(matches!(result, Err(CrawlError::Bootstrap { .. })));
}

#[tokio::test]
async fn test_bootstrap_without_token_is_an_error() {
    let server = MockServer::start().await;
    mount_listing(&server, None, &[1, 2]).await;
    mount_items(&server, &[1, 2]).await;

    let result = Coordinator::new(test_config(&server)).unwrap().run().await;
    match result {
        Err(CrawlError::Bootstrap { reason, .. }) => {
            assert!(reason.contains("continuation token"));
        }
        other => panic!("expected bootstrap failure, got {:?}", other.map(|r| r.stop_reason)),
    }
}

#[tokio::test]
async fn test_later_page_failure_keeps_partial_results() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[1, 2]).await;
    mount_items(&server, &[1, 2]).await;
    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let report = Coordinator::new(test_config(&server))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(ids_of(&report), vec!["1", "2"]);
    assert!(matches!(report.stop_reason, StopReason::PageFetchFailed(_)));
    assert!(report.is_partial());
}

#[tokio::test]
async fn test_page_without_envelope_ends_discovery() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[1]).await;
    mount_items(&server, &[1]).await;
    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>View expired</body></html>"),
        )
        .mount(&server)
        .await;

    let report = Coordinator::new(test_config(&server))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.records.len(), 1);
    match report.stop_reason {
        StopReason::PageFetchFailed(detail) => assert!(detail.contains("partial update")),
        other => panic!("unexpected stop reason {:?}", other),
    }
}

#[tokio::test]
async fn test_cancellation_returns_partial_results() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[1, 2, 3, 4]).await;
    for id in [1, 2, 3, 4] {
        Mock::given(method("GET"))
            .and(path(item_path(id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(item_html(id))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
    }

    let cancel = CancellationToken::new();
    let coordinator = Coordinator::new(test_config(&server))
        .unwrap()
        .with_cancellation(cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(450)).await;
        trigger.cancel();
    });

    let report = coordinator.run().await.unwrap();
    assert_eq!(report.stop_reason, StopReason::Cancelled);
    assert!(report.records.len() < 4);
}

#[tokio::test]
async fn test_concurrent_extraction_keeps_discovery_order() {
    let server = MockServer::start().await;
    let ids: Vec<u32> = (1..=6).collect();
    mount_listing(&server, Some("vs-1"), &ids).await;
    mount_page(&server, 12, None, &[]).await;

    // Earlier items answer more slowly than later ones
    for id in &ids {
        Mock::given(method("GET"))
            .and(path(item_path(*id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(item_html(*id))
                    .set_delay(Duration::from_millis(20 * (7 - *id as u64))),
            )
            .mount(&server)
            .await;
    }

    let mut config = test_config(&server);
    config.crawler.max_concurrent_items = 3;

    let report = Coordinator::new(config).unwrap().run().await.unwrap();
    assert_eq!(ids_of(&report), vec!["1", "2", "3", "4", "5", "6"]);
}

#[tokio::test]
async fn test_page_delay_separates_rounds() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[1]).await;
    mount_page(&server, 12, Some("vs-2"), &[2]).await;
    mount_page(&server, 24, Some("vs-3"), &[]).await;
    mount_items(&server, &[1, 2]).await;

    let mut config = test_config(&server);
    config.crawler.page_delay_ms = 150;

    let started = Instant::now();
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(ids_of(&report), vec!["1", "2"]);
    assert_eq!(report.pages_visited, 3);
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_cancellation_during_page_delay() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[1, 2]).await;
    mount_items(&server, &[1, 2]).await;
    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(partial_response(None, &[3])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.crawler.page_delay_ms = 5_000;

    let cancel = CancellationToken::new();
    let coordinator = Coordinator::new(config)
        .unwrap()
        .with_cancellation(cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stop_reason, StopReason::Cancelled);
    assert_eq!(ids_of(&report), vec!["1", "2"]);
    assert_eq!(report.pages_visited, 1);
    assert!(started.elapsed() < Duration::from_secs(5));
}
