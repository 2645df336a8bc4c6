//! Cross-cutting layers: security headers, CORS and the per-IP rate limit.

use reqwest::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use reqwest::{Method, StatusCode};
use vortex_api::config::Config;
use vortex_api_integration::{test_config, TestServer};

#[tokio::test]
async fn security_headers_on_every_response() {
    let server = TestServer::start().await;
    for path in ["/health", "/api/system/status", "/api/missing"] {
        let resp = reqwest::get(server.url(path)).await.unwrap();
        let headers = resp.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff", "{path}");
        assert_eq!(headers["x-frame-options"], "SAMEORIGIN", "{path}");
        assert_eq!(headers["referrer-policy"], "no-referrer", "{path}");
    }
}

#[tokio::test]
async fn cors_preflight_for_allowed_origin() {
    let server = TestServer::start().await;
    let resp = reqwest::Client::new()
        .request(Method::OPTIONS, server.url("/api/wallet/create"))
        .header(ORIGIN, "http://localhost:3000")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn cors_ignores_unknown_origin() {
    let server = TestServer::start().await;
    let resp = reqwest::Client::new()
        .get(server.url("/health"))
        .header(ORIGIN, "http://evil.example")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn rate_limit_returns_429_after_max() {
    let server = TestServer::with_config(Config {
        rate_limit_max: 3,
        ..test_config()
    })
    .await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let resp = client.get(server.url("/api/system/config")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = client.get(server.url("/api/system/config")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body["error"]["message"],
        "Too many requests from this IP, please try again later."
    );

    // Health checks are outside the limiter.
    let resp = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn published_rate_limit_matches_config() {
    let server = TestServer::with_config(Config {
        rate_limit_max: 7,
        rate_limit_window_secs: 60,
        ..test_config()
    })
    .await;
    let (_, body) = server.get_json("/api/system/config").await;
    let limits = &body["data"]["config"]["limits"];
    assert_eq!(limits["rateLimit"]["requests"], 7);
    assert_eq!(limits["rateLimit"]["window"], 60);
    assert_eq!(limits["maxSessionDuration"], 86_400);
    assert_eq!(limits["maxBatchSize"], 10);
}

#[tokio::test]
async fn wildcard_origin_is_ignored_not_fatal() {
    let server = TestServer::with_config(Config {
        cors_origins: vec!["*".to_string(), "http://localhost:3000".to_string()],
        ..test_config()
    })
    .await;

    let resp = reqwest::Client::new()
        .get(server.url("/health"))
        .header(ORIGIN, "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );

    let resp = reqwest::Client::new()
        .get(server.url("/health"))
        .header(ORIGIN, "http://evil.example")
        .send()
        .await
        .unwrap();
    assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
