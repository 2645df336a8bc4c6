//! Spawns the API on an ephemeral localhost port for end-to-end tests.

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use axum::Router;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use vortex_api::config::Config;
use vortex_api::source::SeededSource;
use vortex_api::AppState;
use vortex_client::ApiClient;

/// Seed used by [`test_config`].
pub const TEST_SEED: u64 = 42;

/// Clock the seeded source is frozen at in [`TestServer::frozen`].
pub fn frozen_clock() -> DateTime<Utc> {
    DateTime::from_timestamp(1_718_000_000, 0).unwrap()
}

/// Development config with deterministic data.
pub fn test_config() -> Config {
    Config {
        port: 0,
        seed: Some(TEST_SEED),
        ..Config::default()
    }
}

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A running server. The task is aborted on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        Self::with_state(Arc::new(AppState::new(config))).await
    }

    /// Seeded server whose clock never moves, for exact payload comparisons.
    pub async fn frozen() -> Self {
        let source = Arc::new(SeededSource::with_clock(TEST_SEED, frozen_clock()));
        Self::with_state(Arc::new(AppState::with_source(test_config(), source))).await
    }

    pub async fn with_state(state: Arc<AppState>) -> Self {
        Self::spawn(vortex_api::build_router(state)).await
    }

    /// Server with additional routes mounted inside the standard layers.
    pub async fn with_routes(config: Config, extra: Router<Arc<AppState>>) -> Self {
        let state = Arc::new(AppState::new(config));
        Self::spawn(vortex_api::build_router_with(state, extra)).await
    }

    async fn spawn(app: Router) -> Self {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("Failed to bind test listener: {e}"));
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            if let Err(e) = vortex_api::serve_router(listener, app).await {
                tracing::error!(error = %e, "test server stopped");
            }
        });
        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url())
            .unwrap_or_else(|e| panic!("Failed to build API client: {e}"))
    }

    pub async fn get_json(&self, path: &str) -> (u16, serde_json::Value) {
        let resp = reqwest::get(self.url(path)).await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> (u16, serde_json::Value) {
        let resp = reqwest::Client::new()
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
