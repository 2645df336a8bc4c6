use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{Issue, Issues, Pagination, Validate};

/// Most calls accepted in one batched UserOperation.
pub const MAX_BATCH_SIZE: usize = 10;

fn default_true() -> bool {
    true
}

/// Lifecycle of a submitted transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

impl TxStatus {
    pub const ALL: [TxStatus; 3] = [TxStatus::Pending, TxStatus::Confirmed, TxStatus::Failed];
}

/// Direction of a history entry relative to the queried address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Send,
    Receive,
    Contract,
}

impl TxKind {
    /// History entries cycle send → receive → contract.
    pub fn for_index(i: usize) -> Self {
        match i % 3 {
            0 => TxKind::Send,
            1 => TxKind::Receive,
            _ => TxKind::Contract,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionRequest {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<String>,
    #[serde(default = "default_true")]
    pub use_paymaster: bool,
}

impl Validate for SendTransactionRequest {
    fn validate(&self) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues
            .non_empty(&["from"], &self.from)
            .non_empty(&["to"], &self.to);
        issues.finish()
    }
}

/// One call inside a batch request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchCall {
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTransactionRequest {
    pub from: String,
    pub transactions: Vec<BatchCall>,
    #[serde(default = "default_true")]
    pub use_paymaster: bool,
}

impl Validate for BatchTransactionRequest {
    fn validate(&self) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues.non_empty(&["from"], &self.from);
        for (i, call) in self.transactions.iter().enumerate() {
            let index = i.to_string();
            issues.non_empty(&["transactions", &index, "to"], &call.to);
        }
        if self.transactions.len() > MAX_BATCH_SIZE {
            issues.push(Issue::new(
                &["transactions"],
                format!("Array must contain at most {MAX_BATCH_SIZE} element(s)"),
            ));
        }
        issues.finish()
    }
}

/// A submitted (sponsored) transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub tx_hash: String,
    pub user_op_hash: String,
    pub status: TxStatus,
    pub from: String,
    pub to: String,
    pub value: String,
    pub gas_limit: String,
    pub gas_price: String,
    pub nonce: u64,
    pub block_number: Option<u64>,
    pub timestamp: DateTime<Utc>,
    pub fee: String,
    pub paymaster_used: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchCallResult {
    pub id: String,
    pub to: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub status: TxStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTransaction {
    pub batch_id: String,
    pub user_op_hash: String,
    pub status: TxStatus,
    pub from: String,
    pub transactions: Vec<BatchCallResult>,
    pub total_fee: String,
    pub paymaster_used: bool,
    pub timestamp: DateTime<Utc>,
}

/// Receipt-level status of a transaction hash.
///
/// Block fields are only populated once the transaction is confirmed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatusReport {
    pub tx_hash: String,
    pub status: TxStatus,
    pub block_number: Option<u64>,
    pub block_hash: Option<String>,
    pub gas_used: Option<String>,
    pub effective_gas_price: Option<String>,
    pub confirmations: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub tx_hash: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub status: TxStatus,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
    pub fee: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    pub transaction: Transaction,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchEnvelope {
    pub batch: BatchTransaction,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusEnvelope {
    pub status: TransactionStatusReport,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionHistory {
    pub transactions: Vec<HistoryEntry>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_defaults_to_paymaster() {
        let req: SendTransactionRequest =
            serde_json::from_str(r#"{"from": "0xa", "to": "0xb"}"#).unwrap();
        assert!(req.use_paymaster);
        assert!(req.validate().is_empty());
    }

    #[test]
    fn test_batch_limits() {
        let calls: Vec<_> = (0..=MAX_BATCH_SIZE)
            .map(|_| serde_json::json!({"to": "0xb"}))
            .collect();
        let req: BatchTransactionRequest =
            serde_json::from_value(serde_json::json!({"from": "0xa", "transactions": calls}))
                .unwrap();
        let issues = req.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, vec!["transactions".to_string()]);
    }

    #[test]
    fn test_batch_reports_empty_call_target() {
        let req: BatchTransactionRequest = serde_json::from_value(serde_json::json!({
            "from": "0xa",
            "transactions": [{"to": "0xb"}, {"to": ""}]
        }))
        .unwrap();
        let issues = req.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, vec!["transactions", "1", "to"]);
    }

    #[test]
    fn test_history_kind_cycles() {
        assert_eq!(TxKind::for_index(0), TxKind::Send);
        assert_eq!(TxKind::for_index(4), TxKind::Receive);
        assert_eq!(TxKind::for_index(5), TxKind::Contract);
    }
}
