use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client IP.
#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    clients: DashMap<IpAddr, Window>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            clients: DashMap::new(),
        }
    }

    /// Count one request from `ip`; `false` once the window's budget is spent.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut entry = self.clients.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        if entry.count >= self.max {
            return false;
        }
        entry.count += 1;
        true
    }

    /// Drop windows that have fully elapsed.
    pub fn prune(&self) {
        let now = Instant::now();
        self.clients
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
    }
}

/// Middleware applied to the `/api` routes.
pub async fn enforce(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !state.limiter.check(ip) {
        tracing::warn!(%ip, "rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }
    next.run(request).await
}
