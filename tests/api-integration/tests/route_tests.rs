//! Raw HTTP checks of response shapes, driven with reqwest.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use chrono::DateTime;
use serde_json::json;
use vortex_api::config::Config;
use vortex_api::AppState;
use vortex_api_integration::{test_config, TestServer};

async fn exploding() -> &'static str {
    panic!("ledger exploded")
}

fn exploding_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/explode", get(exploding))
}

#[tokio::test]
async fn health_is_bare_and_timestamped() {
    let server = TestServer::start().await;
    let (status, body) = server.get_json("/health").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["environment"], "development");
    assert!(body.get("success").is_none());
    let ts = body["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(ts).is_ok(), "not RFC 3339: {ts}");
}

#[tokio::test]
async fn smart_wallet_starts_undeployed() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post_json("/api/wallet/create", json!({"userId": "u1", "type": "smart"}))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    let wallet = &body["data"]["wallet"];
    assert_eq!(wallet["type"], "smart");
    assert_eq!(wallet["isDeployed"], false);
    assert_eq!(wallet["userId"], "u1");
    assert_eq!(wallet["balance"], "0");
    assert_eq!(wallet["address"].as_str().unwrap().len(), 42);
}

#[tokio::test]
async fn wallet_type_defaults_to_smart() {
    let server = TestServer::start().await;
    let (_, body) = server
        .post_json("/api/wallet/create", json!({"userId": "u2"}))
        .await;
    assert_eq!(body["data"]["wallet"]["type"], "smart");

    let (_, body) = server
        .post_json("/api/wallet/create", json!({"userId": "u2", "type": "eoa"}))
        .await;
    assert_eq!(body["data"]["wallet"]["isDeployed"], true);
}

#[tokio::test]
async fn invalid_tx_hash_is_exact_400() {
    let server = TestServer::start().await;
    let (status, body) = server.get_json("/api/transaction/status/0xdeadbeef").await;

    assert_eq!(status, 400);
    assert_eq!(
        body,
        json!({"success": false, "error": {"message": "Invalid transaction hash"}})
    );
}

#[tokio::test]
async fn missing_field_reports_route_message() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post_json("/api/wallet/create", json!({"type": "smart"}))
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["message"], "Failed to create wallet");
    assert!(body["error"]["details"].is_array());
}

#[tokio::test]
async fn empty_privy_token_rejected() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post_json("/api/auth/privy", json!({"privyToken": ""}))
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"]["message"], "Invalid authentication request");
    assert_eq!(body["error"]["details"][0]["path"], json!(["privyToken"]));
}

#[tokio::test]
async fn me_requires_bearer_token() {
    let server = TestServer::start().await;
    let (status, body) = server.get_json("/api/auth/me").await;

    assert_eq!(status, 401);
    assert_eq!(body["error"]["message"], "No authentication token provided");
}

#[tokio::test]
async fn session_create_echoes_request() {
    let server = TestServer::start().await;
    let rules = json!([{
        "trigger": "price_drop",
        "action": "buy",
        "parameters": {"symbol": "ETH", "threshold": 5}
    }]);
    let (status, body) = server
        .post_json(
            "/api/session/create",
            json!({
                "walletAddress": "0x1234567890123456789012345678901234567890",
                "permissions": ["transfer", "swap"],
                "automationRules": rules
            }),
        )
        .await;

    assert_eq!(status, 200);
    let session = &body["data"]["session"];
    assert_eq!(session["permissions"], json!(["transfer", "swap"]));
    assert_eq!(session["automationRules"], rules);
    assert_eq!(session["duration"], 3600);
    assert_eq!(session["status"], "active");
    assert_eq!(session["usageCount"], 0);
}

#[tokio::test]
async fn session_duration_limit_enforced() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post_json(
            "/api/session/create",
            json!({
                "walletAddress": "0x1234567890123456789012345678901234567890",
                "permissions": [],
                "duration": 86_401
            }),
        )
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"][0]["path"], json!(["duration"]));
}

#[tokio::test]
async fn unknown_route_reports_path() {
    let server = TestServer::start().await;
    let (status, body) = server.get_json("/api/nope?x=1").await;

    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["message"], "Endpoint not found");
    assert_eq!(body["error"]["path"], "/api/nope?x=1");
}

#[tokio::test]
async fn analytics_not_shadowed_by_id_route() {
    let server = TestServer::start().await;

    let (status, body) = server.get_json("/api/prediction/analytics").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["analytics"]["totalPredictions"], 247);

    let (status, body) = server.get_json("/api/prediction/pred_77").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["prediction"]["id"], "pred_77");
    assert_eq!(body["data"]["prediction"]["confidence"], 78);
}

#[tokio::test]
async fn history_pagination() {
    let server = TestServer::start().await;
    let address = "0x1234567890123456789012345678901234567890";

    let (_, body) = server
        .get_json(&format!("/api/transaction/history/{address}"))
        .await;
    assert_eq!(body["data"]["transactions"].as_array().unwrap().len(), 10);
    assert_eq!(body["data"]["pagination"]["total"], 50);

    let (_, body) = server
        .get_json(&format!("/api/transaction/history/{address}?limit=500&offset=20"))
        .await;
    assert_eq!(body["data"]["transactions"].as_array().unwrap().len(), 100);
    assert_eq!(body["data"]["pagination"]["offset"], 20);

    let (status, body) = server.get_json("/api/transaction/history/bogus").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["message"], "Invalid address");
}

#[tokio::test]
async fn invalid_log_level_rejected() {
    let server = TestServer::start().await;
    let (status, body) = server.get_json("/api/system/logs?level=loud").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["message"], "Invalid log level");

    let (status, body) = server.get_json("/api/system/logs?level=error&limit=20").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["level"], "error");
    let logs = body["data"]["logs"].as_array().unwrap();
    assert!(logs.len() <= 20);
    assert!(logs.iter().all(|l| l["level"] == "error"));
}

#[tokio::test]
async fn frozen_servers_agree() {
    let a = TestServer::frozen().await;
    let b = TestServer::frozen().await;
    let body = json!({"userId": "u1", "type": "smart"});

    let (_, first) = a.post_json("/api/wallet/create", body.clone()).await;
    let (_, second) = b.post_json("/api/wallet/create", body).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn panic_exposes_stack_in_development() {
    let server = TestServer::with_routes(test_config(), exploding_routes()).await;
    let (status, body) = server.get_json("/api/explode").await;

    assert_eq!(status, 500);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": {"message": "Internal Server Error", "stack": "ledger exploded"}
        })
    );
}

#[tokio::test]
async fn panic_hides_stack_in_production() {
    let config = Config {
        environment: "production".to_string(),
        ..test_config()
    };
    let server = TestServer::with_routes(config, exploding_routes()).await;
    let (status, body) = server.get_json("/api/explode").await;

    assert_eq!(status, 500);
    assert_eq!(
        body,
        json!({"success": false, "error": {"message": "Internal Server Error"}})
    );
    assert!(body["error"].get("stack").is_none());
}
