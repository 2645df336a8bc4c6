use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chain id of Soneium, the network the platform targets.
pub const SONEIUM_CHAIN_ID: u64 = 1946;

/// Native currency descriptor for a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Static description of a supported EVM chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
    pub rpc_url: String,
    pub block_explorer: String,
    #[serde(default)]
    pub testnet: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Unsupported chain ID: {0}")]
    Unsupported(u64),
}

fn chain(
    id: u64,
    name: &str,
    currency: (&str, &str),
    rpc_url: &str,
    block_explorer: &str,
) -> ChainConfig {
    ChainConfig {
        id,
        name: name.to_string(),
        native_currency: NativeCurrency {
            name: currency.0.to_string(),
            symbol: currency.1.to_string(),
            decimals: 18,
        },
        rpc_url: rpc_url.to_string(),
        block_explorer: block_explorer.to_string(),
        testnet: false,
    }
}

/// All chains the platform knows about, in display order.
pub fn supported_chains() -> Vec<ChainConfig> {
    vec![
        chain(
            1,
            "Ethereum",
            ("Ether", "ETH"),
            "https://eth-mainnet.g.alchemy.com/v2",
            "https://etherscan.io",
        ),
        chain(
            137,
            "Polygon",
            ("MATIC", "MATIC"),
            "https://polygon-rpc.com",
            "https://polygonscan.com",
        ),
        chain(
            42161,
            "Arbitrum One",
            ("Ether", "ETH"),
            "https://arb1.arbitrum.io/rpc",
            "https://arbiscan.io",
        ),
        chain(
            10,
            "Optimism",
            ("Ether", "ETH"),
            "https://mainnet.optimism.io",
            "https://optimistic.etherscan.io",
        ),
        chain(
            SONEIUM_CHAIN_ID,
            "Soneium",
            ("Ethereum", "ETH"),
            "https://rpc.startale.com/soneium",
            "https://explorer.startale.com/soneium",
        ),
    ]
}

pub fn chain_config(id: u64) -> Result<ChainConfig, ChainError> {
    supported_chains()
        .into_iter()
        .find(|c| c.id == id)
        .ok_or(ChainError::Unsupported(id))
}

pub fn is_chain_supported(id: u64) -> bool {
    supported_chains().iter().any(|c| c.id == id)
}

/// `0x`-prefixed hex chain id, as wallets expect in `wallet_switchEthereumChain`.
pub fn chain_id_hex(id: u64) -> String {
    format!("0x{id:x}")
}

// ─── Gas ────────────────────────────────────────────────────────────────────

pub const GWEI: u128 = 1_000_000_000;

/// Priority tip used for EIP-1559 fee suggestions.
pub const DEFAULT_PRIORITY_FEE: u128 = 2 * GWEI;

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Gas price used by mock transaction payloads (20 gwei).
pub const MOCK_GAS_PRICE: u128 = 20 * GWEI;

/// Fee suggestion for an EIP-1559 transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSuggestion {
    pub gas_price: u128,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// Pad a gas estimate by 20%.
pub fn buffered_gas_limit(estimate: u64) -> u64 {
    estimate.saturating_mul(120) / 100
}

/// `max_fee = 2 * base_fee + priority`, priority fixed at 2 gwei.
pub fn eip1559_fees(base_fee: u128, gas_price: u128) -> FeeSuggestion {
    FeeSuggestion {
        gas_price,
        max_fee_per_gas: base_fee.saturating_mul(2).saturating_add(DEFAULT_PRIORITY_FEE),
        max_priority_fee_per_gas: DEFAULT_PRIORITY_FEE,
    }
}

/// Render an integer amount of base units as a decimal string, trimming
/// trailing zeros (`1500000000000000000`, 18 → `"1.5"`).
pub fn format_units(value: u128, decimals: u8) -> String {
    // Past 10^38 the base no longer fits, and every u128 is a pure fraction.
    let (whole, frac) = match 10u128.checked_pow(u32::from(decimals)) {
        Some(base) => (value / base, value % base),
        None => (0, value),
    };
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

// ─── RPC error classification ───────────────────────────────────────────────

/// Coarse classification of wallet / JSON-RPC failures for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Web3ErrorKind {
    UserRejected,
    InternalError,
    InsufficientFunds,
    UnknownError,
}

impl Web3ErrorKind {
    pub fn classify(code: Option<i64>, message: &str) -> Self {
        match code {
            Some(4001) => Web3ErrorKind::UserRejected,
            Some(-32603) => Web3ErrorKind::InternalError,
            _ if message.contains("insufficient funds") => Web3ErrorKind::InsufficientFunds,
            _ => Web3ErrorKind::UnknownError,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Web3ErrorKind::UserRejected => "User rejected the request",
            Web3ErrorKind::InternalError => "Internal JSON-RPC error",
            Web3ErrorKind::InsufficientFunds => "Insufficient funds for transaction",
            Web3ErrorKind::UnknownError => "An unknown error occurred",
        }
    }
}
