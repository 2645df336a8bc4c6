use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{Issue, Issues, Validate};

/// Kind of account backing a wallet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    /// Contract account (ERC-4337). Counterfactual until first use.
    #[default]
    Smart,
    /// Externally-owned account controlled by a private key.
    Eoa,
}

impl WalletType {
    /// Smart accounts are not deployed until their first UserOperation.
    pub fn deployed_on_creation(self) -> bool {
        match self {
            WalletType::Smart => false,
            WalletType::Eoa => true,
        }
    }
}

/// A wallet owned by a platform user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub address: String,
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    pub user_id: String,
    pub is_deployed: bool,
    pub created_at: DateTime<Utc>,
    /// Native balance in ETH, as a decimal string.
    pub balance: String,
    pub nonce: u64,
}

/// Native balance snapshot for an address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub address: String,
    pub balance: String,
    pub currency: String,
    pub usd_value: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest {
    pub user_id: String,
    #[serde(rename = "type", default)]
    pub wallet_type: WalletType,
}

impl Validate for CreateWalletRequest {
    fn validate(&self) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues.non_empty(&["userId"], &self.user_id);
        issues.finish()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportWalletRequest {
    pub private_key: String,
    pub user_id: String,
}

impl Validate for ImportWalletRequest {
    fn validate(&self) -> Vec<Issue> {
        let mut issues = Issues::new();
        issues
            .non_empty(&["privateKey"], &self.private_key)
            .non_empty(&["userId"], &self.user_id);
        issues.finish()
    }
}

/// `data` of wallet create/import.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletEnvelope {
    pub wallet: Wallet,
}

/// `data` of `GET /api/wallet/balance/:address`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BalanceEnvelope {
    pub balance: WalletBalance,
}

/// `data` of `GET /api/wallet/list/:userId`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletList {
    pub wallets: Vec<Wallet>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_type_defaults_to_smart() {
        let req: CreateWalletRequest = serde_json::from_str(r#"{"userId": "u1"}"#).unwrap();
        assert_eq!(req.wallet_type, WalletType::Smart);
        assert!(req.validate().is_empty());
    }

    #[test]
    fn test_unknown_wallet_type_rejected() {
        let res: Result<CreateWalletRequest, _> =
            serde_json::from_str(r#"{"userId": "u1", "type": "multisig"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_deployment_by_type() {
        assert!(!WalletType::Smart.deployed_on_creation());
        assert!(WalletType::Eoa.deployed_on_creation());
    }

    #[test]
    fn test_import_requires_both_fields() {
        let req: ImportWalletRequest =
            serde_json::from_str(r#"{"privateKey": "", "userId": ""}"#).unwrap();
        assert_eq!(req.validate().len(), 2);
    }
}
