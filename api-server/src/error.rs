use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use vortex_common::api::{ErrorBody, ErrorDetail, Issue};

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// Every way a request can fail. Rendered as the `{success: false, error}` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<Vec<Issue>>,
    },

    #[error("No authentication token provided")]
    Unauthorized,

    #[error("Endpoint not found")]
    NotFound { path: String },

    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,

    #[error("{message}")]
    Internal {
        message: String,
        stack: Option<String>,
    },
}

impl ApiError {
    /// 400 with a message only.
    pub fn bad_request(message: &str) -> Self {
        ApiError::Validation {
            message: message.to_string(),
            details: None,
        }
    }

    /// 400 carrying the schema issues found in the request.
    pub fn invalid(message: &str, issues: Vec<Issue>) -> Self {
        ApiError::Validation {
            message: message.to_string(),
            details: Some(issues),
        }
    }

    /// 400 for a body that did not deserialize at all.
    pub fn from_json_rejection(message: &str, rejection: &JsonRejection) -> Self {
        Self::invalid(message, vec![Issue::new(&[], rejection.body_text())])
    }

    /// 400 for a query string that did not deserialize.
    pub fn from_query_rejection(message: &str, rejection: &QueryRejection) -> Self {
        Self::invalid(message, vec![Issue::new(&[], rejection.body_text())])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(self) -> ErrorDetail {
        let message = self.to_string();
        match self {
            ApiError::Validation { details, .. } => ErrorDetail {
                message,
                details: details.and_then(|issues| serde_json::to_value(issues).ok()),
                ..Default::default()
            },
            ApiError::NotFound { path } => ErrorDetail {
                message,
                path: Some(path),
                ..Default::default()
            },
            ApiError::Internal { stack, .. } => ErrorDetail {
                message,
                stack,
                ..Default::default()
            },
            ApiError::Unauthorized | ApiError::RateLimited => ErrorDetail {
                message,
                ..Default::default()
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::warn!(%status, error = %self, "request rejected");
        }
        (status, Json(ErrorBody::new(self.detail()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ApiError::NotFound { path: "/x".into() }.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validation_detail_carries_issues() {
        let err = ApiError::invalid(
            "Failed to create wallet",
            vec![Issue::new(&["userId"], "Required")],
        );
        let detail = err.detail();
        assert_eq!(detail.message, "Failed to create wallet");
        let details = detail.details.unwrap();
        assert_eq!(details[0]["path"][0], "userId");
    }

    #[test]
    fn test_not_found_keeps_path() {
        let detail = ApiError::NotFound {
            path: "/api/nope?x=1".into(),
        }
        .detail();
        assert_eq!(detail.message, "Endpoint not found");
        assert_eq!(detail.path.as_deref(), Some("/api/nope?x=1"));
        assert!(detail.details.is_none());
    }
}
