//! VorteX mock REST API.
//!
//! Six route groups (auth, wallet, transaction, session, prediction, system)
//! behind CORS, security headers, request tracing and a per-IP rate limit.
//! Every payload is synthesized from a [`DataSource`]; nothing is persisted.

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod source;

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use vortex_common::system::HealthStatus;

use crate::config::Config;
use crate::error::ApiError;
use crate::rate_limit::RateLimiter;
use crate::source::{DataSource, RandomSource, SeededSource};

pub const VERSION: &str = "1.0.0";

/// Shared, read-mostly server state.
pub struct AppState {
    pub config: Config,
    pub source: Arc<dyn DataSource>,
    pub limiter: RateLimiter,
    pub started: Instant,
}

impl AppState {
    /// State for `config`, seeded when `config.seed` is set.
    pub fn new(config: Config) -> Self {
        let source: Arc<dyn DataSource> = match config.seed {
            Some(seed) => Arc::new(SeededSource::new(seed)),
            None => Arc::new(RandomSource),
        };
        Self::with_source(config, source)
    }

    pub fn with_source(config: Config, source: Arc<dyn DataSource>) -> Self {
        let limiter = RateLimiter::new(
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_secs),
        );
        Self {
            config,
            source,
            limiter,
            started: Instant::now(),
        }
    }
}

// ─── Handlers ───────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: state.source.now(),
        version: VERSION.to_string(),
        environment: state.config.environment.clone(),
    })
}

async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::NotFound {
        path: uri.to_string(),
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>, expose: bool) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal {
        message: "Internal Server Error".to_string(),
        stack: expose.then_some(detail),
    }
    .into_response()
}

// ─── Router ─────────────────────────────────────────────────────────────────

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .map(|origin| origin.trim())
        .filter_map(|origin| {
            // A literal `*` never equals a request's Origin, and tower-http
            // rejects it inside a list.
            if origin == "*" {
                tracing::warn!("ignoring wildcard CORS origin; list origins explicitly");
                return None;
            }
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-privy-token"),
        ])
}

/// The full application. `/health` sits outside the rate limit.
pub fn build_router(state: Arc<AppState>) -> Router {
    build_router_with(state, Router::new())
}

/// [`build_router`] with `extra` routes mounted behind the same error,
/// header and CORS layers (but not the rate limit).
pub fn build_router_with(state: Arc<AppState>, extra: Router<Arc<AppState>>) -> Router {
    let expose_panics = !state.config.is_production();

    let api = Router::new()
        .nest("/api/auth", routes::auth::router())
        .nest("/api/wallet", routes::wallet::router())
        .nest("/api/transaction", routes::transaction::router())
        .nest("/api/session", routes::session::router())
        .nest("/api/prediction", routes::prediction::router())
        .nest("/api/system", routes::system::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(api)
        .merge(extra)
        .fallback(not_found_handler)
        .layer(CatchPanicLayer::custom(
            move |err: Box<dyn Any + Send + 'static>| panic_response(err, expose_panics),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on `listener` until the task is dropped or the socket fails.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    serve_router(listener, build_router(state)).await
}

/// Serve an already assembled router, with peer addresses for the limiter.
pub async fn serve_router(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_maps_to_500() {
        let body = panic_response(Box::new("boom"), false);
        assert_eq!(body.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_wildcard_origin_is_dropped() {
        let config = Config {
            cors_origins: vec!["*".to_string(), " http://localhost:5173 ".to_string()],
            ..Config::default()
        };
        let _router = build_router(Arc::new(AppState::new(config)));
    }

    #[test]
    fn test_only_wildcard_origin_still_builds() {
        let config = Config {
            cors_origins: vec!["*".to_string()],
            ..Config::default()
        };
        let _router = build_router(Arc::new(AppState::new(config)));
    }

    #[test]
    fn test_seed_selects_source() {
        let config = Config {
            seed: Some(3),
            ..Config::default()
        };
        let a = AppState::new(config.clone());
        let b = AppState::new(config);
        assert_eq!(a.source.next_u64(), b.source.next_u64());
    }

    #[tokio::test]
    async fn test_not_found_reports_path() {
        let err = not_found_handler("/api/missing?x=1".parse().unwrap()).await;
        match err {
            ApiError::NotFound { path } => assert_eq!(path, "/api/missing?x=1"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
