use std::fmt;

use rand::rngs::OsRng;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};
use vortex_common::address::{Address, ADDRESS_LEN};

use crate::AaError;

thread_local! {
    static SECP: Secp256k1<secp256k1::All> = Secp256k1::new();
}

/// A session-owner key pair. The smart account grants this key a narrow
/// permission, so it can act without the owner signing each operation.
#[derive(Clone)]
pub struct SessionKey {
    secret: SecretKey,
    address: Address,
}

impl SessionKey {
    pub fn generate() -> Self {
        Self::from_secret(SecretKey::new(&mut OsRng))
    }

    /// Parse a `0x`-prefixed (or bare) 32-byte hex private key.
    pub fn from_hex(s: &str) -> Result<Self, AaError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| secp256k1::Error::InvalidSecretKey)?;
        Ok(Self::from_secret(SecretKey::from_slice(&bytes)?))
    }

    fn from_secret(secret: SecretKey) -> Self {
        let public = SECP.with(|secp| PublicKey::from_secret_key(secp, &secret));
        Self {
            secret,
            address: address_of(&public),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.secret.secret_bytes()))
    }

    /// The EVM address the key signs as.
    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Last 20 bytes of Keccak256 over the uncompressed key without its 0x04 tag.
pub fn address_of(public: &PublicKey) -> Address {
    let uncompressed = public.serialize_uncompressed();
    let hash = Keccak256::digest(&uncompressed[1..]);
    let mut raw = [0u8; ADDRESS_LEN];
    raw.copy_from_slice(&hash[12..]);
    Address::from_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_key_address() {
        let key = SessionKey::from_hex(&format!("0x{}01", "00".repeat(31))).unwrap();
        assert_eq!(
            key.address().to_checksum(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn test_hex_round_trip_keeps_address() {
        let key = SessionKey::generate();
        let hex = key.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 66);
        let restored = SessionKey::from_hex(&hex).unwrap();
        assert_eq!(restored.address(), key.address());
    }

    #[test]
    fn test_invalid_keys_rejected() {
        assert!(SessionKey::from_hex("0xnothex").is_err());
        assert!(SessionKey::from_hex(&format!("0x{}", "00".repeat(32))).is_err());
        assert!(SessionKey::from_hex("0x01").is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = SessionKey::generate();
        let debug = format!("{key:?}");
        assert!(debug.contains(key.address().as_str()));
        assert!(!debug.contains(&key.to_hex()[2..]));
    }
}
