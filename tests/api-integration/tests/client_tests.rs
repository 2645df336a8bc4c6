//! The typed client against a live server.

use vortex_api_integration::TestServer;
use vortex_client::{ClientError, PredictionQuery};
use vortex_common::prediction::PredictionStatus;
use vortex_common::session::{CreateSessionRequest, SessionStatus};
use vortex_common::system::{LevelFilter, LogLevel};
use vortex_common::transaction::{BatchCall, BatchTransactionRequest, SendTransactionRequest};
use vortex_common::wallet::WalletType;

const ALICE: &str = "0x1234567890123456789012345678901234567890";
const BOB: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

#[tokio::test]
async fn login_then_me() {
    let server = TestServer::start().await;
    let mut client = server.client();

    let session = client.auth().privy("privy-abc", Some("user_9")).await.unwrap();
    assert_eq!(session.user.id, "user_9");
    assert_eq!(session.expires_in, "24h");
    assert!(session.token.starts_with("mock-jwt-token-"));

    let err = client.auth().me().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    client.set_token(session.token);
    let me = client.auth().me().await.unwrap();
    assert!(me.user.last_login.is_some());

    let message = client.auth().logout().await.unwrap();
    assert_eq!(message.as_deref(), Some("Logged out successfully"));
}

#[tokio::test]
async fn wallet_errors_surface_server_message() {
    let server = TestServer::start().await;
    let client = server.client();

    match client.wallet().balance("not-an-address").await {
        Err(ClientError::Api {
            status, message, ..
        }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid wallet address");
        }
        other => panic!("unexpected {other:?}"),
    }

    let balance = client.wallet().balance(ALICE).await.unwrap();
    assert_eq!(balance.address, ALICE);
    assert_eq!(balance.currency, "ETH");
}

#[tokio::test]
async fn wallet_lifecycle() {
    let server = TestServer::start().await;
    let client = server.client();

    let eoa = client.wallet().create("u1", WalletType::Eoa).await.unwrap();
    assert!(eoa.is_deployed);

    let imported = client.wallet().import("0xkey", "u1").await.unwrap();
    assert_eq!(imported.wallet_type, WalletType::Eoa);
    assert_eq!(imported.balance, "0.5");
    assert_eq!(imported.nonce, 5);

    let wallets = client.wallet().list("u1").await.unwrap();
    assert_eq!(wallets.len(), 2);
    assert!(wallets.iter().all(|w| w.user_id == "u1"));
}

#[tokio::test]
async fn send_and_batch() {
    let server = TestServer::start().await;
    let client = server.client();

    let tx = client
        .transaction()
        .send(&SendTransactionRequest {
            from: ALICE.to_string(),
            to: BOB.to_string(),
            value: None,
            data: None,
            gas_limit: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
            use_paymaster: true,
        })
        .await
        .unwrap();
    assert_eq!(tx.value, "0");
    assert_eq!(tx.gas_limit, "21000");
    assert_eq!(tx.fee, "0.0042");
    assert!(tx.paymaster_used);

    let call = |value: &str| BatchCall {
        to: BOB.to_string(),
        value: Some(value.to_string()),
        data: None,
    };
    let batch = client
        .transaction()
        .batch(&BatchTransactionRequest {
            from: ALICE.to_string(),
            transactions: vec![call("1"), call("2")],
            use_paymaster: true,
        })
        .await
        .unwrap();
    assert_eq!(batch.transactions.len(), 2);
    assert_eq!(batch.transactions[0].id, "tx_0");
    assert_eq!(batch.total_fee, "0.0084");
}

#[tokio::test]
async fn session_round() {
    let server = TestServer::start().await;
    let client = server.client();

    let session = client
        .session()
        .create(&CreateSessionRequest {
            wallet_address: ALICE.to_string(),
            permissions: vec!["transfer".to_string()],
            duration: 600,
            automation_rules: None,
        })
        .await
        .unwrap();
    assert_eq!(session.duration, 600);
    assert!(session.automation_rules.is_empty());
    assert_eq!(
        (session.expires_at - session.created_at).num_seconds(),
        600
    );

    let (message, revoked) = client.session().revoke(&session.id).await.unwrap();
    assert_eq!(
        message.unwrap(),
        format!("Session {} has been revoked", session.id)
    );
    assert_eq!(revoked.status, SessionStatus::Revoked);

    let sessions = client.session().list(ALICE).await.unwrap();
    assert_eq!(sessions.len(), 2);

    let automation = client.session().automation_status(&session.id).await.unwrap();
    assert_eq!(automation.session_id, session.id);
}

#[tokio::test]
async fn prediction_listing() {
    let server = TestServer::start().await;
    let client = server.client();

    let list = client
        .prediction()
        .list(&PredictionQuery {
            limit: Some(5),
            status: Some(PredictionStatus::Completed),
            ..PredictionQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(list.predictions.len(), 5);
    assert_eq!(list.pagination.total, 50);
    assert!(list
        .predictions
        .iter()
        .all(|p| p.status == PredictionStatus::Completed && p.accuracy.is_some()));

    let fixture = client.prediction().get("abc").await.unwrap();
    assert_eq!(fixture.symbol, "BTC");
    assert!(fixture.technical_indicators.is_some());
}

#[tokio::test]
async fn system_views() {
    let server = TestServer::start().await;
    let client = server.client();

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");

    let status = client.system().status().await.unwrap();
    assert_eq!(status.version, "1.0.0");

    let config = client.system().config().await.unwrap();
    assert_eq!(config.features.len(), 8);
    assert_eq!(config.networks["soneium"].chain_id, 1946);
    assert_eq!(config.supported_tokens.len(), 4);

    let all = client.system().logs(LevelFilter::All, Some(30)).await.unwrap();
    assert_eq!(all.logs.len(), 30);
    assert_eq!(all.level, "all");

    let warn = client
        .system()
        .logs(LevelFilter::Only(LogLevel::Warn), Some(30))
        .await
        .unwrap();
    assert!(warn.logs.iter().all(|l| l.level == LogLevel::Warn));
    assert_eq!(warn.total, warn.logs.len());
}
