use serde::{Deserialize, Serialize};
use vortex_common::address::Address;

use crate::keys::SessionKey;
use crate::session::SessionData;
use crate::AaError;

/// An ERC-7579 validator module and the data it is installed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub address: Address,
    pub init_data: Vec<u8>,
}

impl Module {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            init_data: Vec::new(),
        }
    }

    pub fn with_init_data(address: Address, init_data: Vec<u8>) -> Self {
        Self { address, init_data }
    }
}

/// One call executed by the smart account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub to: Address,
    pub value: u128,
    pub data: Vec<u8>,
}

impl Call {
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self { to, value: 0, data }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub user_op_hash: String,
    pub transaction_hash: String,
    pub success: bool,
}

/// Allows a session key to call one function on one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPolicy {
    pub contract_address: Address,
    /// `0x`-prefixed four-byte selector.
    pub function_selector: String,
    pub sudo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub session_public_key: Address,
    pub action_policies: Vec<ActionPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    pub user_op_hash: String,
    pub permission_ids: Vec<String>,
}

/// The account-abstraction backend of one smart account: bundler, paymaster
/// and a public RPC node behind a single surface.
#[allow(async_fn_in_trait)]
pub trait AccountClient {
    /// The smart account this client operates.
    fn account(&self) -> &Address;

    async fn is_module_installed(&self, module: &Module) -> Result<bool, AaError>;

    /// Submit a sponsored install operation and return its hash.
    async fn install_module(&self, module: &Module) -> Result<String, AaError>;

    /// Submit a sponsored operation signed by the owner.
    async fn send_calls(&self, calls: &[Call]) -> Result<String, AaError>;

    async fn wait_for_receipt(&self, user_op_hash: &str) -> Result<Receipt, AaError>;

    async fn grant_permission(&self, request: &SessionRequest)
        -> Result<PermissionGrant, AaError>;

    async fn is_session_enabled(&self, permission_id: &str) -> Result<bool, AaError>;

    /// Submit an operation signed by a session key under `session`'s
    /// permission.
    async fn use_permission(
        &self,
        session: &SessionData,
        signer: &SessionKey,
        calls: &[Call],
    ) -> Result<String, AaError>;

    /// `eth_getCode`; empty when nothing is deployed at `address`.
    async fn code(&self, address: &Address) -> Result<Vec<u8>, AaError>;

    /// `eth_call` against `to` with raw calldata.
    async fn read_contract(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, AaError>;

    /// Native balance in wei.
    async fn balance(&self, address: &Address) -> Result<u128, AaError>;
}
