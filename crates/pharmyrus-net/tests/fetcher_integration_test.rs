//! Fetcher behavior against a mock HTTP server: retry, backoff, hard
//! timeouts, and credential rotation on quota exhaustion.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pharmyrus_core::Error;
use pharmyrus_net::{ApiKeyPool, Fetcher, FetcherConfig};

fn fast_config() -> FetcherConfig {
    FetcherConfig::default()
        .with_timeout(Duration::from_secs(2))
        .with_backoff_base(Duration::from_millis(10))
        .with_max_retries(3)
}

#[tokio::test]
async fn get_json_returns_parsed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(fast_config()).unwrap();
    let value = fetcher
        .get_json("test", &format!("{}/data", server.uri()), &[])
        .await
        .unwrap();

    assert_eq!(value["ok"], json!(true));
}

#[tokio::test]
async fn transient_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"attempt": 3})))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(fast_config()).unwrap();
    let value = fetcher
        .get_json("test", &format!("{}/flaky", server.uri()), &[])
        .await
        .unwrap();

    assert_eq!(value["attempt"], json!(3));
}

#[tokio::test]
async fn retries_exhausted_after_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(fast_config()).unwrap();
    let err = fetcher
        .get_json("test", &format!("{}/down", server.uri()), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RetriesExhausted(_)));
}

#[tokio::test]
async fn hard_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(fast_config()).unwrap();
    let err = fetcher
        .get_json("test", &format!("{}/missing", server.uri()), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Status(404)));
}

#[tokio::test]
async fn slow_response_hits_hard_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(
        fast_config()
            .with_timeout(Duration::from_millis(100))
            .with_max_retries(1),
    )
    .unwrap();
    let err = fetcher
        .get_json("test", &format!("{}/slow", server.uri()), &[])
        .await
        .unwrap_err();

    // Timeouts are transient; exhausting the budget reports the last cause.
    match err {
        Error::RetriesExhausted(cause) => assert!(cause.contains("timed out")),
        other => panic!("Expected RetriesExhausted, got: {other}"),
    }
}

#[tokio::test]
async fn quota_response_rotates_credential_without_spending_budget() {
    let server = MockServer::start().await;
    // First key answers 429 (quota); the rotated key succeeds.
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("api_key", "k1"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("api_key", "k2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "k2"})))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(fast_config().with_max_retries(1)).unwrap();
    let pool = ApiKeyPool::new(vec!["k1".into(), "k2".into()]).unwrap();

    // max_retries = 1, so success requires the quota retry to be free.
    let value = fetcher
        .get_json_keyed("test", &format!("{}/search", server.uri()), &[], &pool, "api_key")
        .await
        .unwrap();

    assert_eq!(value["key"], json!("k2"));
    // The exhausted key is cooling down.
    assert_eq!(pool.available().await, 1);
}

#[tokio::test]
async fn exhausted_pool_surfaces_as_retries_exhausted() {
    let server = MockServer::start().await;
    let fetcher = Fetcher::new(fast_config()).unwrap();
    let pool = ApiKeyPool::new(vec!["k1".into()]).unwrap();
    pool.report_exhausted("k1").await;

    let err = fetcher
        .get_json_keyed("test", &format!("{}/search", server.uri()), &[], &pool, "api_key")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RetriesExhausted(_)));
}

#[tokio::test]
async fn query_params_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "darolutamide patent WO"))
        .and(query_param("num", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(fast_config()).unwrap();
    let params = [
        ("q", "darolutamide patent WO".to_string()),
        ("num", "10".to_string()),
    ];
    let value = fetcher
        .get_json("test", &format!("{}/search", server.uri()), &params)
        .await
        .unwrap();

    assert_eq!(value["ok"], json!(true));
}
