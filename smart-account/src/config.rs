use serde::{Deserialize, Serialize};
use vortex_common::address::Address;
use vortex_common::chain::SONEIUM_CHAIN_ID;

pub const MINATO_RPC: &str = "https://rpc.minato.soneium.org";
pub const BUNDLER_URL: &str = "https://soneium-minato.dev.bundler.scs.startale.com?apikey=scsadmin";
pub const PAYMASTER_SERVICE_URL: &str =
    "https://dev.paymaster.scs.startale.com/v1?apikey=scsadmin-paymaster";
pub const PAYMASTER_ID: &str = "pm_test_self_funded";

pub const DICE_ROLL_LEDGER_ADDRESS: &str = "0x298D8873bA2B2879580105b992049201B60c1975";
pub const ACCOUNT_RECOVERY_MODULE_ADDRESS: &str = "0xA04D053b3C8021e8D5bF641816c42dAA75D8b597";
pub const SMART_SESSIONS_ADDRESS: &str = "0x00000000002B0eCfbD0496EE71e01257dA0E37DE";
pub const MOCK_ATTESTER_ADDRESS: &str = "0xaeD4d8bAa80948d54d33dE041513D30124e1Ae3f";

/// Endpoints and contract addresses for one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AaConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub bundler_url: String,
    pub paymaster_url: String,
    /// Sponsorship context sent with every paymaster request.
    pub paymaster_id: String,
    pub dice_roll_ledger: Address,
    pub recovery_module: Address,
    pub smart_sessions_validator: Address,
    pub attester: Address,
}

impl AaConfig {
    /// Soneium Minato testnet with the Startale dev bundler and paymaster.
    pub fn minato() -> Self {
        Self {
            chain_id: SONEIUM_CHAIN_ID,
            rpc_url: MINATO_RPC.to_string(),
            bundler_url: BUNDLER_URL.to_string(),
            paymaster_url: PAYMASTER_SERVICE_URL.to_string(),
            paymaster_id: PAYMASTER_ID.to_string(),
            dice_roll_ledger: known(DICE_ROLL_LEDGER_ADDRESS),
            recovery_module: known(ACCOUNT_RECOVERY_MODULE_ADDRESS),
            smart_sessions_validator: known(SMART_SESSIONS_ADDRESS),
            attester: known(MOCK_ATTESTER_ADDRESS),
        }
    }
}

impl Default for AaConfig {
    fn default() -> Self {
        Self::minato()
    }
}

// Only called with the constants above, all checked by `test_minato_defaults`.
fn known(addr: &'static str) -> Address {
    addr.parse().unwrap_or_else(|_| Address::zero())
}
