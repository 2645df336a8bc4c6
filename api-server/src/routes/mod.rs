pub mod auth;
pub mod prediction;
pub mod session;
pub mod system;
pub mod transaction;
pub mod wallet;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;
use chrono::{DateTime, Utc};
use vortex_common::api::{ApiResponse, Validate, MAX_PAGE_SIZE};

use crate::error::ApiError;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

/// Unwrap a JSON body and run its semantic checks; `failure` is the route's
/// error message.
pub(crate) fn validated<T: Validate>(
    payload: Result<Json<T>, JsonRejection>,
    failure: &str,
) -> Result<T, ApiError> {
    let Json(body) = payload.map_err(|r| ApiError::from_json_rejection(failure, &r))?;
    let issues = body.validate();
    if !issues.is_empty() {
        return Err(ApiError::invalid(failure, issues));
    }
    Ok(body)
}

pub(crate) fn query<T>(
    query: Result<Query<T>, QueryRejection>,
    failure: &str,
) -> Result<T, ApiError> {
    query
        .map(|Query(q)| q)
        .map_err(|r| ApiError::from_query_rejection(failure, &r))
}

/// Requested page size, defaulted and capped at [`MAX_PAGE_SIZE`].
pub(crate) fn page_size(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).min(MAX_PAGE_SIZE)
}

/// Fixture timestamp `secs` after the Unix epoch.
pub(crate) fn fixture_time(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

pub(crate) const JAN_1_2024: i64 = 1_704_067_200;
pub(crate) const HOUR: i64 = 3600;
