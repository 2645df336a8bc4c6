use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::{Issue, Issues, Validate};

/// Default session lifetime in seconds.
pub const DEFAULT_SESSION_DURATION: u64 = 3600;

/// Longest session lifetime accepted, in seconds.
pub const MAX_SESSION_DURATION: u64 = 86_400;

/// Usage cap applied to new sessions.
pub const DEFAULT_MAX_USAGE: u64 = 100;

fn default_duration() -> u64 {
    DEFAULT_SESSION_DURATION
}

/// A trigger → action rule executed under a session key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub trigger: String,
    pub action: String,
    pub parameters: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Revoked,
    Expired,
}

/// A scoped session key granted by a smart account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub wallet_address: String,
    pub permissions: Vec<String>,
    pub duration: u64,
    pub automation_rules: Vec<AutomationRule>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub usage_count: u64,
    pub max_usage: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub wallet_address: String,
    pub permissions: Vec<String>,
    #[serde(default = "default_duration")]
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_rules: Option<Vec<AutomationRule>>,
}

impl Validate for CreateSessionRequest {
    fn validate(&self) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues.non_empty(&["walletAddress"], &self.wallet_address);
        if self.duration > MAX_SESSION_DURATION {
            issues.push(Issue::new(
                &["duration"],
                format!("Number must be less than or equal to {MAX_SESSION_DURATION}"),
            ));
        }
        issues.finish()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteSessionRequest {
    pub session_id: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

impl Validate for ExecuteSessionRequest {
    fn validate(&self) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues
            .non_empty(&["sessionId"], &self.session_id)
            .non_empty(&["action"], &self.action);
        issues.finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub tx_hash: String,
    pub gas_used: String,
    pub fee: String,
}

/// Outcome of running one action under a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExecution {
    pub id: String,
    pub session_id: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    pub status: ExecutionStatus,
    pub result: ExecutionResult,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedSession {
    pub session_id: String,
    pub status: SessionStatus,
    pub revoked_at: DateTime<Utc>,
}

/// One past automation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub id: String,
    pub rule: String,
    pub action: String,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationStatus {
    pub session_id: String,
    pub is_active: bool,
    pub rules_executed: u64,
    pub last_execution: DateTime<Utc>,
    pub next_scheduled_execution: DateTime<Utc>,
    pub execution_history: Vec<ExecutionRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionEnvelope {
    pub session: Session,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionEnvelope {
    pub execution: SessionExecution,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionList {
    pub sessions: Vec<Session>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutomationEnvelope {
    pub automation: AutomationStatus,
}
