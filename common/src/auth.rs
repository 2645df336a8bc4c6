use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{Issue, Issues, Validate};

/// Tokens are reported as valid for this long.
pub const TOKEN_LIFETIME: &str = "24h";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivyAuthRequest {
    pub privy_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Validate for PrivyAuthRequest {
    fn validate(&self) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues.non_empty(&["privyToken"], &self.privy_token);
        issues.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

impl Validate for RefreshTokenRequest {
    fn validate(&self) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues.non_empty(&["refreshToken"], &self.refresh_token);
        issues.finish()
    }
}

/// Authenticated platform user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub wallet_address: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

/// `data` of `POST /api/auth/privy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    pub token: String,
    pub expires_in: String,
}

/// `data` of `POST /api/auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedToken {
    pub token: String,
    pub expires_in: String,
}

/// `data` of `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user: User,
}

/// Extract the bearer token from an `Authorization` header value.
///
/// Returns `None` when the header is absent or the token is empty.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn test_privy_request_requires_token() {
        let req: PrivyAuthRequest = serde_json::from_str(r#"{"privyToken": ""}"#).unwrap();
        assert_eq!(req.validate().len(), 1);
        let req: PrivyAuthRequest =
            serde_json::from_str(r#"{"privyToken": "t", "userId": "u1"}"#).unwrap();
        assert!(req.validate().is_empty());
        assert_eq!(req.user_id.as_deref(), Some("u1"));
    }
}
