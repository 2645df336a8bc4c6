use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use vortex_common::address::is_valid_address;
use vortex_common::wallet::{
    BalanceEnvelope, CreateWalletRequest, ImportWalletRequest, Wallet, WalletBalance,
    WalletEnvelope, WalletList, WalletType,
};

use super::{fixture_time, ok, validated, ApiResult, JAN_1_2024};
use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(create_handler))
        .route("/import", post(import_handler))
        .route("/balance/{address}", get(balance_handler))
        .route("/list/{user_id}", get(list_handler))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateWalletRequest>, JsonRejection>,
) -> ApiResult<WalletEnvelope> {
    let req = validated(payload, "Failed to create wallet")?;
    let src = &state.source;

    let wallet = Wallet {
        id: src.id("wallet"),
        address: src.address(),
        wallet_type: req.wallet_type,
        user_id: req.user_id,
        is_deployed: req.wallet_type.deployed_on_creation(),
        created_at: src.now(),
        balance: "0".to_string(),
        nonce: 0,
    };
    tracing::info!(user = %wallet.user_id, address = %wallet.address, "created wallet");
    ok(WalletEnvelope { wallet })
}

async fn import_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImportWalletRequest>, JsonRejection>,
) -> ApiResult<WalletEnvelope> {
    let req = validated(payload, "Failed to import wallet")?;
    let src = &state.source;

    ok(WalletEnvelope {
        wallet: Wallet {
            id: src.id("imported_wallet"),
            address: src.address(),
            wallet_type: WalletType::Eoa,
            user_id: req.user_id,
            is_deployed: true,
            created_at: src.now(),
            balance: "0.5".to_string(),
            nonce: 5,
        },
    })
}

async fn balance_handler(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<BalanceEnvelope> {
    if !is_valid_address(&address) {
        return Err(ApiError::bad_request("Invalid wallet address"));
    }
    let src = &state.source;
    ok(BalanceEnvelope {
        balance: WalletBalance {
            address,
            balance: src.fixed(10.0, 6),
            currency: "ETH".to_string(),
            usd_value: src.fixed(25_000.0, 2),
            last_updated: src.now(),
        },
    })
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<WalletList> {
    let src = &state.source;
    let wallets = vec![
        Wallet {
            id: "wallet_1".to_string(),
            address: src.address(),
            wallet_type: WalletType::Smart,
            user_id: user_id.clone(),
            is_deployed: true,
            created_at: fixture_time(JAN_1_2024),
            balance: "1.25".to_string(),
            nonce: 3,
        },
        Wallet {
            id: "wallet_2".to_string(),
            address: src.address(),
            wallet_type: WalletType::Eoa,
            user_id,
            is_deployed: true,
            created_at: fixture_time(JAN_1_2024 + 24 * super::HOUR),
            balance: "0.75".to_string(),
            nonce: 1,
        },
    ];
    ok(WalletList { wallets })
}
