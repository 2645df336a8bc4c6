//! Typed HTTP client for the VorteX API.
//!
//! Wraps `reqwest` with a request timeout and an optional bearer token, and
//! unwraps the `{success, data}` envelope. Route groups hang off [`ApiClient`]
//! as borrowed views: `client.wallet().balance(addr)`.

mod error;
mod groups;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use vortex_common::api::{ApiResponse, ErrorBody};
use vortex_common::system::HealthStatus;

pub use error::ClientError;
pub use groups::{
    AuthApi, PredictionApi, PredictionQuery, SessionApi, SystemApi, TransactionApi, WalletApi,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Client for `base_url` with the [`DEFAULT_TIMEOUT`].
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Client for [`DEFAULT_BASE_URL`].
    pub fn localhost() -> Result<Self, ClientError> {
        Self::new(DEFAULT_BASE_URL)
    }

    /// Fails only when the TLS backend cannot initialise.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach a bearer token to every subsequent request.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn wallet(&self) -> WalletApi<'_> {
        WalletApi::new(self)
    }

    pub fn transaction(&self) -> TransactionApi<'_> {
        TransactionApi::new(self)
    }

    pub fn session(&self) -> SessionApi<'_> {
        SessionApi::new(self)
    }

    pub fn prediction(&self) -> PredictionApi<'_> {
        PredictionApi::new(self)
    }

    pub fn system(&self) -> SystemApi<'_> {
        SystemApi::new(self)
    }

    /// `GET /health`. The one route that is not enveloped.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let resp = self.builder(Method::GET, "/health").send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        decode(status, &body)
    }

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<ApiResponse<T>, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        let decoded = decode(status, &body);
        if let Err(e) = &decoded {
            tracing::debug!(%status, error = %e, "API call failed");
        }
        decoded
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(self.builder(Method::GET, path)).await
    }

    pub(crate) async fn get_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(self.builder(Method::GET, path).query(query)).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(self.builder(Method::POST, path).json(body)).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(self.builder(Method::PUT, path)).await
    }
}

/// Map a raw response onto `T` or the server's error envelope.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ClientError> {
    if status.is_success() {
        return Ok(serde_json::from_slice(body)?);
    }
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(err) => Err(ClientError::Api {
            status: status.as_u16(),
            message: err.error.message,
            details: err.error.details,
        }),
        Err(_) => Err(ClientError::Api {
            status: status.as_u16(),
            message: format!("HTTP {}", status.as_u16()),
            details: None,
        }),
    }
}
