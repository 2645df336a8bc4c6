//! Response envelope and request validation shared by server and client.

use serde::{Deserialize, Serialize};

/// Largest page any list endpoint returns.
pub const MAX_PAGE_SIZE: usize = 100;

/// Successful response: `{"success": true, "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// Failed response: `{"success": false, "error": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Requested path, set on 404s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Diagnostic text, only outside production.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorBody {
    pub fn new(error: ErrorDetail) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

/// An empty `data` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Offset pagination block returned alongside list payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
    pub total: usize,
}

/// One schema violation, addressed by the path of the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    pub fn new(path: &[&str], message: impl Into<String>) -> Self {
        Self {
            path: path.iter().map(|p| p.to_string()).collect(),
            message: message.into(),
        }
    }
}

/// Semantic checks run after a request body has deserialized.
pub trait Validate {
    /// Every violation found; empty when the request is acceptable.
    fn validate(&self) -> Vec<Issue>;
}

/// Accumulates issues while walking a request.
#[derive(Debug, Default)]
pub struct Issues(Vec<Issue>);

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn non_empty(&mut self, path: &[&str], value: &str) -> &mut Self {
        if value.is_empty() {
            self.0
                .push(Issue::new(path, "String must contain at least 1 character(s)"));
        }
        self
    }

    pub fn range(&mut self, path: &[&str], value: f64, min: f64, max: f64) -> &mut Self {
        if value < min {
            self.0.push(Issue::new(
                path,
                format!("Number must be greater than or equal to {min}"),
            ));
        } else if value > max {
            self.0.push(Issue::new(
                path,
                format!("Number must be less than or equal to {max}"),
            ));
        }
        self
    }

    pub fn push(&mut self, issue: Issue) -> &mut Self {
        self.0.push(issue);
        self
    }

    pub fn finish(self) -> Vec<Issue> {
        self.0
    }
}
