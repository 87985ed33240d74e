//! Transport, discoverer and extractor behavior against a mock origin

use crate::common::*;
use catalog_crawler::classify::Classifier;
use catalog_crawler::config::{CrawlerConfig, UserAgentConfig};
use catalog_crawler::crawler::{ItemExtractor, PageDiscoverer, Transport};
use catalog_crawler::item::{ItemId, ItemLink};
use catalog_crawler::state::ContinuationToken;
use catalog_crawler::url::ItemUrlPattern;
use catalog_crawler::{CrawlError, FetchError};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(max_retries: u32) -> Transport {
    let crawler = CrawlerConfig {
        max_retries,
        backoff_base_ms: 0,
        request_timeout_ms: 5000,
        ..CrawlerConfig::default()
    };
    Transport::new(&crawler, &UserAgentConfig::default()).expect("Failed to build transport")
}

#[tokio::test]
async fn test_retries_transient_status_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport(2)
        .get(&format!("{}/flaky", server.uri()))
        .await
        .expect("Fetch should succeed on the third attempt");

    assert_eq!(response.body, "ok");
    assert_eq!(response.status, 200);
    assert_eq!(response.attempts, 3);
}

#[tokio::test]
async fn test_non_retryable_status_fails_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let error = transport(3)
        .get(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_attempts_bounded_by_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&server)
        .await;

    let error = transport(3)
        .get(&format!("{}/down", server.uri()))
        .await
        .unwrap_err();

    match error {
        FetchError::Exhausted {
            attempts,
            last_error,
            ..
        } => {
            assert_eq!(attempts, 4);
            assert!(last_error.contains("429"));
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_backoff_waits_match_schedule() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/unavailable"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let crawler = CrawlerConfig {
        max_retries: 3,
        backoff_base_ms: 100,
        request_timeout_ms: 5000,
        ..CrawlerConfig::default()
    };
    let transport = Transport::new(&crawler, &UserAgentConfig::default()).unwrap();
    let expected = transport.policy().total_backoff();
    assert_eq!(expected, Duration::from_millis(700));

    let started = Instant::now();
    let error = transport
        .get(&format!("{}/unavailable", server.uri()))
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(error, FetchError::Exhausted { attempts: 4, .. }));
    assert!(elapsed >= expected, "waited {:?}, expected {:?}", elapsed, expected);
    // No wait after the final attempt, which would add another 800ms
    assert!(
        elapsed < expected + Duration::from_millis(500),
        "waited {:?}, expected {:?}",
        elapsed,
        expected
    );
}

#[tokio::test]
async fn test_connection_failure_is_exhausted() {
    // Nothing listens on port 9 of the loopback interface
    let error = transport(1).get("http://127.0.0.1:9/").await.unwrap_err();
    assert!(matches!(error, FetchError::Exhausted { attempts: 2, .. }));
}

#[tokio::test]
async fn test_uniform_headers_sent() {
    let server = MockServer::start().await;
    let user_agent = UserAgentConfig {
        value: "CatalogCrawlerTest/1.0".to_string(),
        accept_language: "es-ES".to_string(),
    };
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "CatalogCrawlerTest/1.0"))
        .and(header("accept-language", "es-ES"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Transport::new(&CrawlerConfig::default(), &user_agent)
        .unwrap()
        .get(&format!("{}/", server.uri()))
        .await
        .expect("Headers should match");
}

#[tokio::test]
async fn test_discoverer_walks_pages() {
    let server = MockServer::start().await;
    mount_listing(&server, Some("vs-1"), &[1]).await;
    mount_page(&server, 12, Some("vs-2"), &[2]).await;

    let config = test_config(&server);
    let discoverer = PageDiscoverer::new(
        transport(0),
        config.site.clone(),
        ItemUrlPattern::from_site(&config.site).unwrap(),
        config.crawler.page_size,
    );

    let first = discoverer.discover_page(0, None).await.unwrap();
    assert_eq!(first.token.as_ref().unwrap().as_str(), "vs-1");
    assert_eq!(first.links.len(), 1);

    let second = discoverer
        .discover_page(12, first.token.as_ref())
        .await
        .unwrap();
    assert_eq!(second.token.unwrap().as_str(), "vs-2");
    assert_eq!(second.links[0].id.as_str(), "2");
    assert_eq!(second.offset, 12);
}

#[tokio::test]
async fn test_later_page_requires_token() {
    let server = MockServer::start().await;
    let config = test_config(&server);
    let discoverer = PageDiscoverer::new(
        transport(0),
        config.site.clone(),
        ItemUrlPattern::from_site(&config.site).unwrap(),
        12,
    );

    let result = discoverer.discover_page(12, None).await;
    assert!(matches!(result, Err(CrawlError::Parse { .. })));

    let result = discoverer
        .discover_page(12, Some(&ContinuationToken::new("vs-1")))
        .await;
    assert!(matches!(
        result,
        Err(CrawlError::PageFetch {
            offset: 12,
            source: FetchError::Status { status: 404, .. }
        })
    ));
}

#[tokio::test]
async fn test_extractor_skips_failed_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(item_path(7)))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;
    mount_items(&server, &[8]).await;

    let extractor = ItemExtractor::new(transport(0), Classifier::default(), 50.0);
    let link = |id: u32| {
        ItemLink::new(
            ItemId::new(id.to_string()),
            format!("{}{}", server.uri(), item_path(id)),
        )
    };

    assert!(extractor.extract(&link(7)).await.is_none());
    assert!(matches!(
        extractor.try_extract(&link(7)).await,
        Err(CrawlError::ItemFetch { .. })
    ));

    let record = extractor.extract(&link(8)).await.expect("Item 8 should parse");
    assert_eq!(record.id.as_str(), "8");
    assert_eq!(record.price, Some(1008.0));
}
