use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Length in bytes of an EVM account address.
pub const ADDRESS_LEN: usize = 20;

/// Length in bytes of a transaction or UserOperation hash.
pub const HASH_LEN: usize = 32;

/// Errors raised when parsing hex identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid hash: {0}")]
    InvalidHash(String),
}

/// Returns true when `s` is `0x` followed by exactly `bytes * 2` hex digits.
fn is_prefixed_hex(s: &str, bytes: usize) -> bool {
    match s.strip_prefix("0x") {
        Some(digits) => digits.len() == bytes * 2 && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Matches `^0x[a-fA-F0-9]{40}$`.
pub fn is_valid_address(s: &str) -> bool {
    is_prefixed_hex(s, ADDRESS_LEN)
}

/// Matches `^0x[a-fA-F0-9]{64}$`.
pub fn is_valid_tx_hash(s: &str) -> bool {
    is_prefixed_hex(s, HASH_LEN)
}

/// An EVM address as supplied by the caller.
///
/// The original casing is preserved so responses echo exactly what was sent;
/// equality ignores case.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// The zero address.
    pub fn zero() -> Self {
        Address(format!("0x{}", "0".repeat(ADDRESS_LEN * 2)))
    }

    /// Build an address from raw bytes (lowercase hex).
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw 20-byte value.
    pub fn to_bytes(&self) -> [u8; ADDRESS_LEN] {
        let mut out = [0u8; ADDRESS_LEN];
        // Validated on construction, so decoding cannot fail.
        if let Ok(decoded) = hex::decode(&self.0[2..]) {
            out.copy_from_slice(&decoded);
        }
        out
    }

    /// Lowercase form used for comparisons and storage keys.
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn to_checksum(&self) -> String {
        let lower = self.0[2..].to_ascii_lowercase();
        let hash = Keccak256::digest(lower.as_bytes());
        let mut out = String::with_capacity(2 + ADDRESS_LEN * 2);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl std::hash::Hash for Address {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_lowercase().hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_valid_address(s) {
            Ok(Address(s.to_string()))
        } else {
            Err(AddressError::InvalidAddress(s.to_string()))
        }
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if is_valid_address(&s) {
            Ok(Address(s))
        } else {
            Err(AddressError::InvalidAddress(s))
        }
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

/// Case-insensitive address comparison on raw strings.
pub fn compare_addresses(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// A 32-byte transaction or UserOperation hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        TxHash(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TxHash {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_valid_tx_hash(s) {
            Ok(TxHash(s.to_string()))
        } else {
            Err(AddressError::InvalidHash(s.to_string()))
        }
    }
}

impl TryFrom<String> for TxHash {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TxHash> for String {
    fn from(h: TxHash) -> Self {
        h.0
    }
}
