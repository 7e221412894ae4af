//! Page fetching contract tests against a mock HTTP server.

use std::time::{Duration, Instant};

use websearch::{FetchError, PageFetcher, PageSource};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn serve(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn html_body_returned_with_client_identifier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .and(header("user-agent", "websearch-mcp/1.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>Hello</body></html>", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new().expect("fetcher");
    let body = fetcher
        .fetch(&format!("{}/article", server.uri()), TIMEOUT)
        .await
        .expect("body");
    assert_eq!(body, "<html><body>Hello</body></html>");
}

#[tokio::test]
async fn feed_content_type_accepted() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/feed",
        ResponseTemplate::new(200)
            .set_body_raw("<rss></rss>", "application/rss+xml; charset=utf-8"),
    )
    .await;

    let fetcher = PageFetcher::new().expect("fetcher");
    let body = fetcher.fetch(&format!("{}/feed", server.uri()), TIMEOUT).await;
    assert_eq!(body.expect("body"), "<rss></rss>");
}

#[tokio::test]
async fn binary_content_type_rejected() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/logo.png",
        ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"),
    )
    .await;

    let fetcher = PageFetcher::new().expect("fetcher");
    let err = fetcher
        .fetch(&format!("{}/logo.png", server.uri()), TIMEOUT)
        .await
        .unwrap_err();
    match err {
        FetchError::UnsupportedContentType(ct) => assert_eq!(ct, "image/png"),
        other => panic!("expected UnsupportedContentType, got {other:?}"),
    }
}

#[tokio::test]
async fn non_success_status_rejected() {
    let server = MockServer::start().await;
    serve(&server, "/missing", ResponseTemplate::new(404).set_body_string("gone")).await;

    let fetcher = PageFetcher::new().expect("fetcher");
    let err = fetcher
        .fetch(&format!("{}/missing", server.uri()), TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::BadStatus(404)));
}

#[tokio::test]
async fn status_checked_before_content_type() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/error.png",
        ResponseTemplate::new(503).set_body_raw(vec![0u8; 4], "image/png"),
    )
    .await;

    let fetcher = PageFetcher::new().expect("fetcher");
    let err = fetcher
        .fetch(&format!("{}/error.png", server.uri()), TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::BadStatus(503)));
}

#[tokio::test]
async fn slow_response_hits_deadline() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/slow",
        ResponseTemplate::new(200)
            .set_body_string("late")
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let fetcher = PageFetcher::new().expect("fetcher");
    let started = Instant::now();
    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()), Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::RequestFailed(_)));
    assert!(err.to_string().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn invalid_url_rejected_before_request() {
    let fetcher = PageFetcher::new().expect("fetcher");
    let err = fetcher.fetch("www.example.com/page", TIMEOUT).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl(_)));
}

#[tokio::test]
async fn connection_refused_is_request_failure() {
    let fetcher = PageFetcher::new().expect("fetcher");
    let err = fetcher
        .fetch("http://127.0.0.1:9/", Duration::from_secs(2))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::RequestFailed(_)));
}
