use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::routing::{get, post};
use axum::{Json, Router};
use vortex_common::api::{ApiResponse, Empty};
use vortex_common::auth::{
    bearer_token, AuthSession, CurrentUser, PrivyAuthRequest, RefreshTokenRequest,
    RefreshedToken, User, TOKEN_LIFETIME,
};

use super::{fixture_time, ok, validated, ApiResult, JAN_1_2024};
use crate::error::ApiError;
use crate::AppState;

const DEMO_USER_ID: &str = "user_123";
const DEMO_WALLET: &str = "0x1234567890123456789012345678901234567890";
const DEMO_EMAIL: &str = "user@example.com";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/privy", post(privy_handler))
        .route("/refresh", post(refresh_handler))
        .route("/me", get(me_handler))
        .route("/logout", post(logout_handler))
}

/// Exchange a social-login token for a platform session.
///
/// The token is not verified; any non-empty value is accepted.
async fn privy_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PrivyAuthRequest>, JsonRejection>,
) -> ApiResult<AuthSession> {
    let req = validated(payload, "Invalid authentication request")?;
    let now = state.source.now();

    let user = User {
        id: req
            .user_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEMO_USER_ID.to_string()),
        wallet_address: DEMO_WALLET.to_string(),
        email: DEMO_EMAIL.to_string(),
        created_at: now,
        last_login: None,
    };
    tracing::info!(user = %user.id, "issued session token");

    ok(AuthSession {
        user,
        token: format!("mock-jwt-token-{}", now.timestamp_millis()),
        expires_in: TOKEN_LIFETIME.to_string(),
    })
}

async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> ApiResult<RefreshedToken> {
    validated(payload, "Invalid refresh token")?;
    ok(RefreshedToken {
        token: format!("refreshed-jwt-token-{}", state.source.now().timestamp_millis()),
        expires_in: TOKEN_LIFETIME.to_string(),
    })
}

async fn me_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<CurrentUser> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    bearer_token(authorization).ok_or(ApiError::Unauthorized)?;

    ok(CurrentUser {
        user: User {
            id: DEMO_USER_ID.to_string(),
            wallet_address: DEMO_WALLET.to_string(),
            email: DEMO_EMAIL.to_string(),
            created_at: fixture_time(JAN_1_2024),
            last_login: Some(state.source.now()),
        },
    })
}

async fn logout_handler() -> ApiResult<Empty> {
    Ok(Json(ApiResponse::with_message(
        Empty {},
        "Logged out successfully",
    )))
}
