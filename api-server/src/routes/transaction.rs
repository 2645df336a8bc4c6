use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::TimeDelta;
use serde::Deserialize;
use vortex_common::address::{is_valid_address, is_valid_tx_hash};
use vortex_common::api::Pagination;
use vortex_common::chain::{MOCK_GAS_PRICE, TRANSFER_GAS_LIMIT};
use vortex_common::transaction::{
    BatchCallResult, BatchEnvelope, BatchTransaction, BatchTransactionRequest, HistoryEntry,
    SendTransactionRequest, StatusEnvelope, Transaction, TransactionEnvelope,
    TransactionHistory, TransactionStatusReport, TxKind, TxStatus,
};

use super::{ok, page_size, query, validated, ApiResult};
use crate::error::ApiError;
use crate::AppState;

const SEND_FEE: &str = "0.0042";
const BATCH_FEE: &str = "0.0084";
const HISTORY_TOTAL: usize = 50;
const DEFAULT_HISTORY_LIMIT: usize = 10;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/send", post(send_handler))
        .route("/batch", post(batch_handler))
        .route("/status/{tx_hash}", get(status_handler))
        .route("/history/{address}", get(history_handler))
}

async fn send_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendTransactionRequest>, JsonRejection>,
) -> ApiResult<TransactionEnvelope> {
    let req = validated(payload, "Failed to send transaction")?;
    let src = &state.source;

    let transaction = Transaction {
        tx_hash: src.tx_hash(),
        user_op_hash: src.tx_hash(),
        status: TxStatus::Pending,
        from: req.from,
        to: req.to,
        value: req.value.unwrap_or_else(|| "0".to_string()),
        gas_limit: req
            .gas_limit
            .unwrap_or_else(|| TRANSFER_GAS_LIMIT.to_string()),
        gas_price: MOCK_GAS_PRICE.to_string(),
        nonce: src.below(100),
        block_number: None,
        timestamp: src.now(),
        fee: SEND_FEE.to_string(),
        paymaster_used: req.use_paymaster,
    };
    tracing::info!(
        from = %transaction.from,
        to = %transaction.to,
        sponsored = transaction.paymaster_used,
        "queued user operation"
    );
    ok(TransactionEnvelope { transaction })
}

async fn batch_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchTransactionRequest>, JsonRejection>,
) -> ApiResult<BatchEnvelope> {
    let req = validated(payload, "Failed to send batch transaction")?;
    let src = &state.source;

    let transactions = req
        .transactions
        .into_iter()
        .enumerate()
        .map(|(i, call)| BatchCallResult {
            id: format!("tx_{i}"),
            to: call.to,
            value: call.value.unwrap_or_else(|| "0".to_string()),
            data: call.data,
            status: TxStatus::Pending,
        })
        .collect();

    ok(BatchEnvelope {
        batch: BatchTransaction {
            batch_id: src.id("batch"),
            user_op_hash: src.tx_hash(),
            status: TxStatus::Pending,
            from: req.from,
            transactions,
            total_fee: BATCH_FEE.to_string(),
            paymaster_used: req.use_paymaster,
            timestamp: src.now(),
        },
    })
}

async fn status_handler(
    State(state): State<Arc<AppState>>,
    Path(tx_hash): Path<String>,
) -> ApiResult<StatusEnvelope> {
    if !is_valid_tx_hash(&tx_hash) {
        return Err(ApiError::bad_request("Invalid transaction hash"));
    }
    let src = &state.source;
    let status = TxStatus::ALL[src.index(TxStatus::ALL.len())];

    let report = if status == TxStatus::Confirmed {
        TransactionStatusReport {
            tx_hash,
            status,
            block_number: Some(src.below(1_000_000)),
            block_hash: Some(src.tx_hash()),
            gas_used: Some(TRANSFER_GAS_LIMIT.to_string()),
            effective_gas_price: Some(MOCK_GAS_PRICE.to_string()),
            confirmations: src.between(1, 10),
            timestamp: src.now(),
        }
    } else {
        TransactionStatusReport {
            tx_hash,
            status,
            block_number: None,
            block_hash: None,
            gas_used: None,
            effective_gas_price: None,
            confirmations: 0,
            timestamp: src.now(),
        }
    };
    ok(StatusEnvelope { status: report })
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

async fn history_handler(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    params: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<TransactionHistory> {
    if !is_valid_address(&address) {
        return Err(ApiError::bad_request("Invalid address"));
    }
    let params = query(params, "Failed to get transaction history")?;
    let limit = page_size(params.limit, DEFAULT_HISTORY_LIMIT);
    let src = &state.source;
    let now = src.now();

    let transactions = (0..limit)
        .map(|i| HistoryEntry {
            tx_hash: src.tx_hash(),
            from: if i % 2 == 0 { address.clone() } else { src.address() },
            to: if i % 2 == 1 { address.clone() } else { src.address() },
            value: src.fixed(5.0, 6),
            status: TxStatus::Confirmed,
            block_number: src.below(1_000_000),
            timestamp: now - TimeDelta::hours(i as i64),
            fee: src.fixed(0.01, 6),
            kind: TxKind::for_index(i),
        })
        .collect();

    ok(TransactionHistory {
        transactions,
        pagination: Pagination {
            limit,
            offset: params.offset.unwrap_or(0),
            total: HISTORY_TOTAL,
        },
    })
}
