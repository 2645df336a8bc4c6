use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chain::NativeCurrency;

/// Body of `GET /health`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub environment: String,
}

/// Result of probing one dependency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
    pub last_check: DateTime<Utc>,
}

impl ServiceCheck {
    pub fn new(status: &str, last_check: DateTime<Utc>) -> Self {
        Self {
            status: status.to_string(),
            response_time: None,
            block_number: None,
            gas_price: None,
            balance: None,
            rate_limit: None,
            remaining: None,
            last_check,
        }
    }

    pub fn response_time(mut self, rt: &str) -> Self {
        self.response_time = Some(rt.to_string());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockchainServices {
    pub soneium: ServiceCheck,
    pub bundler: ServiceCheck,
    pub paymaster: ServiceCheck,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExternalApis {
    pub privy: ServiceCheck,
    pub coingecko: ServiceCheck,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Services {
    pub database: ServiceCheck,
    pub blockchain: BlockchainServices,
    pub external_apis: ExternalApis,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageCounters {
    pub total_requests: u64,
    pub active_users: u64,
    pub active_wallets: u64,
    pub active_sessions: u64,
    pub total_transactions: u64,
    pub avg_response_time: String,
}

/// `data` of `GET /api/system/status`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    pub version: String,
    pub environment: String,
    /// Seconds since the server started.
    pub uptime: f64,
    pub timestamp: DateTime<Utc>,
    pub services: Services,
    pub metrics: UsageCounters,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub block_explorer: String,
    pub native_currency: NativeCurrency,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub requests: u32,
    /// Seconds.
    pub window: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    pub max_session_duration: u64,
    pub max_batch_size: usize,
    pub max_predictions_per_user: u32,
    pub rate_limit: RateLimitInfo,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// Public (non-secret) platform settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub features: BTreeMap<String, bool>,
    pub networks: BTreeMap<String, NetworkInfo>,
    pub limits: Limits,
    pub supported_tokens: Vec<TokenInfo>,
    pub api_version: String,
    pub documentation: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigEnvelope {
    pub config: PublicConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetrics {
    pub total_requests: u64,
    pub requests_per_minute: u64,
    /// Milliseconds.
    pub avg_response_time: u64,
    /// Percent.
    pub error_rate: f64,
    pub uptime: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetrics {
    pub total_transactions: u64,
    pub success_rate: f64,
    pub avg_gas_used: u64,
    pub paymaster_savings: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetrics {
    pub total_users: u64,
    pub active_users_24h: u64,
    pub new_users_today: u64,
    pub retention_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionMetrics {
    pub total_predictions: u64,
    pub accuracy_rate: f64,
    pub active_predictions: u64,
    pub avg_confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub active_sessions: u64,
    pub automation_executions: u64,
    /// Seconds.
    pub avg_session_duration: u64,
    pub success_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub api: ApiMetrics,
    pub blockchain: ChainMetrics,
    pub users: UserMetrics,
    pub predictions: PredictionMetrics,
    pub sessions: SessionMetrics,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsEnvelope {
    pub metrics: SystemMetrics,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [LogLevel::Error, LogLevel::Warn, LogLevel::Info, LogLevel::Debug];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Log filter: one level, or `all`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelFilter {
    All,
    Only(LogLevel),
}

impl Default for LevelFilter {
    fn default() -> Self {
        LevelFilter::Only(LogLevel::Info)
    }
}

impl LevelFilter {
    pub fn only(level: LogLevel) -> Self {
        LevelFilter::Only(level)
    }

    pub fn matches(self, level: LogLevel) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Only(l) => l == level,
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelFilter::All => f.write_str("all"),
            LevelFilter::Only(l) => f.write_str(l.as_str()),
        }
    }
}

impl FromStr for LevelFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(LevelFilter::All);
        }
        LogLevel::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .map(LevelFilter::only)
            .ok_or_else(|| format!("unknown log level '{s}'"))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMetadata {
    pub user_id: String,
    pub endpoint: String,
    pub response_time: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub level: LogLevel,
    pub message: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: LogMetadata,
}

/// `data` of `GET /api/system/logs`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogPage {
    pub logs: Vec<LogEntry>,
    pub total: usize,
    pub level: String,
}
