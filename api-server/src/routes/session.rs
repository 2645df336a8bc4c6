use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::TimeDelta;
use serde_json::{Map, Value};
use vortex_common::address::is_valid_address;
use vortex_common::api::ApiResponse;
use vortex_common::session::{
    AutomationEnvelope, AutomationRule, AutomationStatus, CreateSessionRequest,
    ExecuteSessionRequest, ExecutionEnvelope, ExecutionRecord, ExecutionResult, ExecutionStatus,
    RevokedSession, Session, SessionEnvelope, SessionExecution, SessionList, SessionStatus,
    DEFAULT_MAX_USAGE,
};

use super::{fixture_time, ok, validated, ApiResult, HOUR, JAN_1_2024};
use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(create_handler))
        .route("/execute", post(execute_handler))
        .route("/list/{wallet_address}", get(list_handler))
        .route("/revoke/{session_id}", put(revoke_handler))
        .route("/automation-status/{session_id}", get(automation_handler))
}

/// Grant a session key. Permissions and rules are echoed back unchanged.
async fn create_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> ApiResult<SessionEnvelope> {
    let req = validated(payload, "Failed to create session")?;
    let src = &state.source;
    let now = src.now();

    let session = Session {
        id: src.id("session"),
        wallet_address: req.wallet_address,
        permissions: req.permissions,
        duration: req.duration,
        automation_rules: req.automation_rules.unwrap_or_default(),
        status: SessionStatus::Active,
        created_at: now,
        expires_at: now + TimeDelta::seconds(req.duration as i64),
        usage_count: 0,
        max_usage: DEFAULT_MAX_USAGE,
    };
    tracing::info!(
        session = %session.id,
        wallet = %session.wallet_address,
        rules = session.automation_rules.len(),
        "created session"
    );
    ok(SessionEnvelope { session })
}

async fn execute_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExecuteSessionRequest>, JsonRejection>,
) -> ApiResult<ExecutionEnvelope> {
    let req = validated(payload, "Failed to execute session action")?;
    let src = &state.source;

    ok(ExecutionEnvelope {
        execution: SessionExecution {
            id: src.id("execution"),
            session_id: req.session_id,
            action: req.action,
            parameters: req.parameters,
            status: ExecutionStatus::Completed,
            result: ExecutionResult {
                tx_hash: src.tx_hash(),
                gas_used: "21000".to_string(),
                fee: "0.0021".to_string(),
            },
            timestamp: src.now(),
        },
    })
}

fn price_drop_rule() -> AutomationRule {
    let mut parameters = Map::new();
    parameters.insert("token".into(), Value::from("ETH"));
    parameters.insert("threshold".into(), Value::from("2000"));
    AutomationRule {
        trigger: "price_drop".to_string(),
        action: "buy_token".to_string(),
        parameters,
    }
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Path(wallet_address): Path<String>,
) -> ApiResult<SessionList> {
    if !is_valid_address(&wallet_address) {
        return Err(ApiError::bad_request("Invalid wallet address"));
    }
    let now = state.source.now();

    let sessions = vec![
        Session {
            id: "session_1".to_string(),
            wallet_address: wallet_address.clone(),
            permissions: vec!["transfer".into(), "approve".into()],
            duration: 3600,
            automation_rules: vec![price_drop_rule()],
            status: SessionStatus::Active,
            created_at: fixture_time(JAN_1_2024),
            expires_at: now + TimeDelta::hours(1),
            usage_count: 5,
            max_usage: DEFAULT_MAX_USAGE,
        },
        Session {
            id: "session_2".to_string(),
            wallet_address,
            permissions: vec!["stake".into(), "unstake".into()],
            duration: 7200,
            automation_rules: Vec::new(),
            status: SessionStatus::Active,
            created_at: fixture_time(JAN_1_2024 + HOUR),
            expires_at: now + TimeDelta::hours(2),
            usage_count: 2,
            max_usage: 50,
        },
    ];
    ok(SessionList { sessions })
}

async fn revoke_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<RevokedSession> {
    tracing::info!(session = %session_id, "revoked session");
    let message = format!("Session {session_id} has been revoked");
    Ok(Json(ApiResponse::with_message(
        RevokedSession {
            session_id,
            status: SessionStatus::Revoked,
            revoked_at: state.source.now(),
        },
        message,
    )))
}

async fn automation_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<AutomationEnvelope> {
    let src = &state.source;
    let now = src.now();

    let execution_history = vec![
        ExecutionRecord {
            id: "exec_1".to_string(),
            rule: "price_drop".to_string(),
            action: "buy_token".to_string(),
            status: ExecutionStatus::Completed,
            tx_hash: Some(src.tx_hash()),
            error: None,
            timestamp: now - TimeDelta::hours(1),
        },
        ExecutionRecord {
            id: "exec_2".to_string(),
            rule: "price_drop".to_string(),
            action: "buy_token".to_string(),
            status: ExecutionStatus::Failed,
            tx_hash: None,
            error: Some("Insufficient balance".to_string()),
            timestamp: now - TimeDelta::minutes(30),
        },
    ];

    ok(AutomationEnvelope {
        automation: AutomationStatus {
            session_id,
            is_active: true,
            rules_executed: 3,
            last_execution: now - TimeDelta::minutes(5),
            next_scheduled_execution: now + TimeDelta::minutes(10),
            execution_history,
        },
    })
}
