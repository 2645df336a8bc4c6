use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::Router;
use chrono::TimeDelta;
use serde::Deserialize;
use vortex_common::chain::{chain_config, SONEIUM_CHAIN_ID};
use vortex_common::session::MAX_SESSION_DURATION;
use vortex_common::system::{
    ApiMetrics, BlockchainServices, ChainMetrics, ConfigEnvelope, ExternalApis, LevelFilter,
    Limits, LogEntry, LogLevel, LogMetadata, LogPage, MetricsEnvelope, NetworkInfo,
    PredictionMetrics, PublicConfig, RateLimitInfo, ServiceCheck, Services, SessionMetrics,
    SystemMetrics, SystemStatus, TokenInfo, UsageCounters, UserMetrics,
};
use vortex_common::transaction::MAX_BATCH_SIZE;

use super::{ok, page_size, query, ApiResult};
use crate::error::ApiError;
use crate::{AppState, VERSION};

const MAX_PREDICTIONS_PER_USER: u32 = 50;
const DEFAULT_LOG_LIMIT: usize = 50;
const LOG_SERVICES: [&str; 4] = ["api", "blockchain", "auth", "prediction"];
const LOG_ENDPOINTS: [&str; 3] = ["auth", "wallet", "transaction"];

const FEATURES: [&str; 8] = [
    "socialLogin",
    "smartWallets",
    "accountAbstraction",
    "paymaster",
    "sessionKeys",
    "batchTransactions",
    "cryptoPredictions",
    "aiAutomation",
];

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(status_handler))
        .route("/config", get(config_handler))
        .route("/metrics", get(metrics_handler))
        .route("/logs", get(logs_handler))
}

async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<SystemStatus> {
    let src = &state.source;
    let now = src.now();

    let mut soneium = ServiceCheck::new("connected", now);
    soneium.block_number = Some(src.below(1_000_000));
    soneium.gas_price = Some("20 gwei".to_string());

    let mut paymaster = ServiceCheck::new("operational", now);
    paymaster.balance = Some("10.5 ETH".to_string());

    let mut coingecko = ServiceCheck::new("operational", now);
    coingecko.rate_limit = Some("50/minute".to_string());
    coingecko.remaining = Some("47".to_string());

    ok(SystemStatus {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
        environment: state.config.environment.clone(),
        uptime: state.started.elapsed().as_secs_f64(),
        timestamp: now,
        services: Services {
            database: ServiceCheck::new("connected", now).response_time("12ms"),
            blockchain: BlockchainServices {
                soneium,
                bundler: ServiceCheck::new("operational", now).response_time("150ms"),
                paymaster,
            },
            external_apis: ExternalApis {
                privy: ServiceCheck::new("operational", now).response_time("85ms"),
                coingecko,
            },
        },
        metrics: UsageCounters {
            total_requests: src.below(10_000),
            active_users: src.below(100),
            active_wallets: src.below(500),
            active_sessions: src.below(50),
            total_transactions: src.below(5_000),
            avg_response_time: "125ms".to_string(),
        },
    })
}

/// Public platform settings. Limits reflect what the server enforces.
async fn config_handler(State(state): State<Arc<AppState>>) -> ApiResult<ConfigEnvelope> {
    let features = FEATURES
        .iter()
        .map(|f| (f.to_string(), true))
        .collect::<BTreeMap<_, _>>();

    let mut networks = BTreeMap::new();
    if let Ok(soneium) = chain_config(SONEIUM_CHAIN_ID) {
        networks.insert(
            "soneium".to_string(),
            NetworkInfo {
                name: soneium.name,
                chain_id: soneium.id,
                rpc_url: soneium.rpc_url,
                block_explorer: soneium.block_explorer,
                native_currency: soneium.native_currency,
            },
        );
    }

    let token = |symbol: &str, name: &str, decimals| TokenInfo {
        symbol: symbol.to_string(),
        name: name.to_string(),
        decimals,
    };

    ok(ConfigEnvelope {
        config: PublicConfig {
            features,
            networks,
            limits: Limits {
                max_session_duration: MAX_SESSION_DURATION,
                max_batch_size: MAX_BATCH_SIZE,
                max_predictions_per_user: MAX_PREDICTIONS_PER_USER,
                rate_limit: RateLimitInfo {
                    requests: state.config.rate_limit_max,
                    window: state.config.rate_limit_window_secs,
                },
            },
            supported_tokens: vec![
                token("ETH", "Ethereum", 18),
                token("USDC", "USD Coin", 6),
                token("USDT", "Tether", 6),
                token("DAI", "Dai Stablecoin", 18),
            ],
            api_version: VERSION.to_string(),
            documentation: "/api/docs".to_string(),
            last_updated: state.source.now(),
        },
    })
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> ApiResult<MetricsEnvelope> {
    let src = &state.source;

    ok(MetricsEnvelope {
        metrics: SystemMetrics {
            api: ApiMetrics {
                total_requests: src.below(100_000),
                requests_per_minute: src.below(1_000),
                avg_response_time: src.between(50, 249),
                error_rate: src.scaled(5.0, 2),
                uptime: 99.8,
            },
            blockchain: ChainMetrics {
                total_transactions: src.below(50_000),
                success_rate: 95.0 + src.scaled(5.0, 2),
                avg_gas_used: 21_000 + src.below(100_000),
                paymaster_savings: format!("{} ETH", src.fixed(1_000.0, 2)),
            },
            users: UserMetrics {
                total_users: src.below(10_000),
                active_users_24h: src.below(1_000),
                new_users_today: src.below(100),
                retention_rate: 80.0 + src.scaled(20.0, 2),
            },
            predictions: PredictionMetrics {
                total_predictions: src.below(10_000),
                accuracy_rate: 65.0 + src.scaled(25.0, 2),
                active_predictions: src.below(500),
                avg_confidence: 60.0 + src.scaled(30.0, 2),
            },
            sessions: SessionMetrics {
                active_sessions: src.below(200),
                automation_executions: src.below(1_000),
                avg_session_duration: 1_800 + src.below(3_600),
                success_rate: 90.0 + src.scaled(10.0, 2),
            },
            timestamp: src.now(),
        },
    })
}

#[derive(Debug, Deserialize)]
struct LogsQuery {
    level: Option<String>,
    limit: Option<usize>,
}

/// Recent log lines. `level=all` disables filtering; the filter is applied
/// after `limit` lines are drawn, so fewer may come back.
async fn logs_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LogsQuery>, QueryRejection>,
) -> ApiResult<LogPage> {
    let params = query(params, "Failed to get system logs")?;
    let filter = match params.level.as_deref() {
        None => LevelFilter::default(),
        Some(level) => level
            .parse::<LevelFilter>()
            .map_err(|_| ApiError::bad_request("Invalid log level"))?,
    };
    let limit = page_size(params.limit, DEFAULT_LOG_LIMIT);
    let src = &state.source;
    let now = src.now();

    let logs = (0..limit)
        .map(|i| LogEntry {
            id: format!("log_{}", i + 1),
            level: LogLevel::ALL[src.index(LogLevel::ALL.len())],
            message: format!("Sample log message {}", i + 1),
            service: LOG_SERVICES[src.index(LOG_SERVICES.len())].to_string(),
            timestamp: now - TimeDelta::minutes(i as i64),
            metadata: LogMetadata {
                user_id: format!("user_{}", src.below(1_000)),
                endpoint: format!("/api/{}", LOG_ENDPOINTS[src.index(LOG_ENDPOINTS.len())]),
                response_time: format!("{}ms", src.between(50, 249)),
            },
        })
        .filter(|entry| filter.matches(entry.level))
        .collect::<Vec<_>>();

    ok(LogPage {
        total: logs.len(),
        logs,
        level: filter.to_string(),
    })
}
