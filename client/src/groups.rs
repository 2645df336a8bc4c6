use serde::Serialize;
use vortex_common::api::{ApiResponse, Empty};
use vortex_common::auth::{
    AuthSession, CurrentUser, PrivyAuthRequest, RefreshTokenRequest, RefreshedToken,
};
use vortex_common::prediction::{
    AnalyticsEnvelope, CreatePredictionRequest, MarketData, MarketDataEnvelope,
    MarketDataRequest, Prediction, PredictionAnalytics, PredictionEnvelope, PredictionList,
    PredictionStatus,
};
use vortex_common::session::{
    AutomationEnvelope, AutomationStatus, CreateSessionRequest, ExecuteSessionRequest,
    ExecutionEnvelope, RevokedSession, Session, SessionEnvelope, SessionExecution, SessionList,
};
use vortex_common::system::{
    ConfigEnvelope, LevelFilter, LogPage, MetricsEnvelope, PublicConfig, SystemMetrics,
    SystemStatus,
};
use vortex_common::transaction::{
    BatchEnvelope, BatchTransaction, BatchTransactionRequest, SendTransactionRequest,
    StatusEnvelope, Transaction, TransactionEnvelope, TransactionHistory,
    TransactionStatusReport,
};
use vortex_common::wallet::{
    BalanceEnvelope, CreateWalletRequest, ImportWalletRequest, Wallet, WalletBalance,
    WalletEnvelope, WalletList, WalletType,
};

use crate::{ApiClient, ClientError};

// ─── Auth ────────────────────────────────────────────────────────────────────

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Exchange a social-login token for a platform session.
    pub async fn privy(
        &self,
        privy_token: &str,
        user_id: Option<&str>,
    ) -> Result<AuthSession, ClientError> {
        let req = PrivyAuthRequest {
            privy_token: privy_token.to_string(),
            user_id: user_id.map(str::to_string),
        };
        let resp: ApiResponse<AuthSession> = self.client.post("/api/auth/privy", &req).await?;
        Ok(resp.data)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, ClientError> {
        let req = RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        };
        let resp: ApiResponse<RefreshedToken> =
            self.client.post("/api/auth/refresh", &req).await?;
        Ok(resp.data)
    }

    /// Needs a token set on the client.
    pub async fn me(&self) -> Result<CurrentUser, ClientError> {
        let resp: ApiResponse<CurrentUser> = self.client.get("/api/auth/me").await?;
        Ok(resp.data)
    }

    /// Returns the server's confirmation message.
    pub async fn logout(&self) -> Result<Option<String>, ClientError> {
        let resp: ApiResponse<Empty> = self.client.post("/api/auth/logout", &Empty {}).await?;
        Ok(resp.message)
    }
}

// ─── Wallet ──────────────────────────────────────────────────────────────────

pub struct WalletApi<'a> {
    client: &'a ApiClient,
}

impl<'a> WalletApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        user_id: &str,
        wallet_type: WalletType,
    ) -> Result<Wallet, ClientError> {
        let req = CreateWalletRequest {
            user_id: user_id.to_string(),
            wallet_type,
        };
        let resp: ApiResponse<WalletEnvelope> =
            self.client.post("/api/wallet/create", &req).await?;
        Ok(resp.data.wallet)
    }

    pub async fn import(&self, private_key: &str, user_id: &str) -> Result<Wallet, ClientError> {
        let req = ImportWalletRequest {
            private_key: private_key.to_string(),
            user_id: user_id.to_string(),
        };
        let resp: ApiResponse<WalletEnvelope> =
            self.client.post("/api/wallet/import", &req).await?;
        Ok(resp.data.wallet)
    }

    pub async fn balance(&self, address: &str) -> Result<WalletBalance, ClientError> {
        let resp: ApiResponse<BalanceEnvelope> = self
            .client
            .get(&format!("/api/wallet/balance/{address}"))
            .await?;
        Ok(resp.data.balance)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Wallet>, ClientError> {
        let resp: ApiResponse<WalletList> = self
            .client
            .get(&format!("/api/wallet/list/{user_id}"))
            .await?;
        Ok(resp.data.wallets)
    }
}

// ─── Transaction ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
}

pub struct TransactionApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TransactionApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn send(&self, req: &SendTransactionRequest) -> Result<Transaction, ClientError> {
        let resp: ApiResponse<TransactionEnvelope> =
            self.client.post("/api/transaction/send", req).await?;
        Ok(resp.data.transaction)
    }

    pub async fn batch(
        &self,
        req: &BatchTransactionRequest,
    ) -> Result<BatchTransaction, ClientError> {
        let resp: ApiResponse<BatchEnvelope> =
            self.client.post("/api/transaction/batch", req).await?;
        Ok(resp.data.batch)
    }

    pub async fn status(&self, tx_hash: &str) -> Result<TransactionStatusReport, ClientError> {
        let resp: ApiResponse<StatusEnvelope> = self
            .client
            .get(&format!("/api/transaction/status/{tx_hash}"))
            .await?;
        Ok(resp.data.status)
    }

    pub async fn history(
        &self,
        address: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<TransactionHistory, ClientError> {
        let resp: ApiResponse<TransactionHistory> = self
            .client
            .get_query(
                &format!("/api/transaction/history/{address}"),
                &PageQuery { limit, offset },
            )
            .await?;
        Ok(resp.data)
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

pub struct SessionApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SessionApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, req: &CreateSessionRequest) -> Result<Session, ClientError> {
        let resp: ApiResponse<SessionEnvelope> =
            self.client.post("/api/session/create", req).await?;
        Ok(resp.data.session)
    }

    pub async fn execute(
        &self,
        req: &ExecuteSessionRequest,
    ) -> Result<SessionExecution, ClientError> {
        let resp: ApiResponse<ExecutionEnvelope> =
            self.client.post("/api/session/execute", req).await?;
        Ok(resp.data.execution)
    }

    pub async fn list(&self, wallet_address: &str) -> Result<Vec<Session>, ClientError> {
        let resp: ApiResponse<SessionList> = self
            .client
            .get(&format!("/api/session/list/{wallet_address}"))
            .await?;
        Ok(resp.data.sessions)
    }

    /// Revoke a session; the message is the server's confirmation text.
    pub async fn revoke(
        &self,
        session_id: &str,
    ) -> Result<(Option<String>, RevokedSession), ClientError> {
        let resp: ApiResponse<RevokedSession> = self
            .client
            .put(&format!("/api/session/revoke/{session_id}"))
            .await?;
        Ok((resp.message, resp.data))
    }

    pub async fn automation_status(
        &self,
        session_id: &str,
    ) -> Result<AutomationStatus, ClientError> {
        let resp: ApiResponse<AutomationEnvelope> = self
            .client
            .get(&format!("/api/session/automation-status/{session_id}"))
            .await?;
        Ok(resp.data.automation)
    }
}

// ─── Prediction ──────────────────────────────────────────────────────────────

/// Filters for `GET /api/prediction/list`.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PredictionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PredictionStatus>,
}

pub struct PredictionApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PredictionApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, req: &CreatePredictionRequest) -> Result<Prediction, ClientError> {
        let resp: ApiResponse<PredictionEnvelope> =
            self.client.post("/api/prediction/create", req).await?;
        Ok(resp.data.prediction)
    }

    pub async fn list(&self, query: &PredictionQuery) -> Result<PredictionList, ClientError> {
        let resp: ApiResponse<PredictionList> =
            self.client.get_query("/api/prediction/list", query).await?;
        Ok(resp.data)
    }

    pub async fn get(&self, id: &str) -> Result<Prediction, ClientError> {
        let resp: ApiResponse<PredictionEnvelope> = self
            .client
            .get(&format!("/api/prediction/{id}"))
            .await?;
        Ok(resp.data.prediction)
    }

    pub async fn market_data(
        &self,
        req: &MarketDataRequest,
    ) -> Result<Vec<MarketData>, ClientError> {
        let resp: ApiResponse<MarketDataEnvelope> =
            self.client.post("/api/prediction/market-data", req).await?;
        Ok(resp.data.market_data)
    }

    pub async fn analytics(&self) -> Result<PredictionAnalytics, ClientError> {
        let resp: ApiResponse<AnalyticsEnvelope> =
            self.client.get("/api/prediction/analytics").await?;
        Ok(resp.data.analytics)
    }
}

// ─── System ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LogsQuery {
    level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

pub struct SystemApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SystemApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn status(&self) -> Result<SystemStatus, ClientError> {
        let resp: ApiResponse<SystemStatus> = self.client.get("/api/system/status").await?;
        Ok(resp.data)
    }

    pub async fn config(&self) -> Result<PublicConfig, ClientError> {
        let resp: ApiResponse<ConfigEnvelope> = self.client.get("/api/system/config").await?;
        Ok(resp.data.config)
    }

    pub async fn metrics(&self) -> Result<SystemMetrics, ClientError> {
        let resp: ApiResponse<MetricsEnvelope> = self.client.get("/api/system/metrics").await?;
        Ok(resp.data.metrics)
    }

    pub async fn logs(
        &self,
        level: LevelFilter,
        limit: Option<usize>,
    ) -> Result<LogPage, ClientError> {
        let query = LogsQuery {
            level: level.to_string(),
            limit,
        };
        let resp: ApiResponse<LogPage> = self.client.get_query("/api/system/logs", &query).await?;
        Ok(resp.data)
    }
}
