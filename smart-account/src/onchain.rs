//! Read-only helpers over an [`AccountClient`]: deployment checks, ERC-20
//! balances and metadata, and counterfactual account addresses.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use vortex_common::address::Address;

use crate::abi::{self, AbiError, Token, WORD};
use crate::client::AccountClient;
use crate::AaError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Whether any code is deployed at `address`. A smart account reads as
/// undeployed until its first operation lands.
pub async fn is_deployed<C: AccountClient>(
    client: &C,
    address: &Address,
) -> Result<bool, AaError> {
    Ok(!client.code(address).await?.is_empty())
}

/// `balanceOf(holder)` on the ERC-20 at `token`, in base units.
pub async fn token_balance<C: AccountClient>(
    client: &C,
    token: &Address,
    holder: &Address,
) -> Result<u128, AaError> {
    let data = abi::encode_call(abi::BALANCE_OF, &[Token::Address(holder.clone())]);
    let raw = client
        .read_contract(token, &data)
        .await
        .inspect_err(|e| tracing::warn!(%token, %holder, error = %e, "balanceOf failed"))?;
    Ok(abi::uint_at(&raw, 0)?)
}

/// `name()`, `symbol()` and `decimals()` of the ERC-20 at `token`, read
/// concurrently.
pub async fn token_info<C: AccountClient>(
    client: &C,
    token: &Address,
) -> Result<TokenInfo, AaError> {
    let read = |signature: &'static str| async move {
        client
            .read_contract(token, &abi::encode_call(signature, &[]))
            .await
    };
    let (name, symbol, decimals) =
        tokio::try_join!(read(abi::NAME), read(abi::SYMBOL), read(abi::DECIMALS))
            .inspect_err(|e| tracing::warn!(%token, error = %e, "token metadata read failed"))?;

    Ok(TokenInfo {
        name: abi::decode_string(&name)?,
        symbol: abi::decode_string(&symbol)?,
        decimals: u8::try_from(abi::uint_at(&decimals, 0)?).map_err(|_| AbiError::Overflow)?,
    })
}

/// Address `factory` deploys `owner`'s account to via CREATE2, with salt
/// `keccak256(abi.encode(owner, salt_nonce))`.
pub fn predict_account_address(
    factory: &Address,
    owner: &Address,
    salt_nonce: u128,
    init_code_hash: [u8; WORD],
) -> Address {
    let encoded = abi::encode_args(&[Token::Address(owner.clone()), Token::Uint(salt_nonce)]);
    let mut salt = [0u8; WORD];
    salt.copy_from_slice(&Keccak256::digest(&encoded));
    abi::create2_address(factory, salt, init_code_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Module;
    use crate::config::AaConfig;
    use crate::mock::InMemoryChain;

    const TOKEN: &str = "0x5555555555555555555555555555555555555555";
    const HOLDER: &str = "0x6666666666666666666666666666666666666666";

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_account_deployed_after_first_operation() {
        let chain = InMemoryChain::new(10u128.pow(18));
        let account = chain.account().clone();
        assert!(!is_deployed(&chain, &account).await.unwrap());

        let config = AaConfig::minato();
        assert!(is_deployed(&chain, &config.dice_roll_ledger).await.unwrap());
        assert!(!is_deployed(&chain, &addr(HOLDER)).await.unwrap());

        let hash = chain
            .install_module(&Module::new(config.smart_sessions_validator))
            .await
            .unwrap();
        chain.wait_for_receipt(&hash).await.unwrap();
        assert!(is_deployed(&chain, &account).await.unwrap());
    }

    #[tokio::test]
    async fn test_token_balance_and_metadata() {
        let chain = InMemoryChain::new(0);
        let token = addr(TOKEN);
        chain.deploy_token(&token, "Vortex USD", "vUSD", 6);
        chain.mint(&token, &addr(HOLDER), 2_500_000);
        chain.mint(&token, &addr(HOLDER), 500_000);

        assert_eq!(token_balance(&chain, &token, &addr(HOLDER)).await.unwrap(), 3_000_000);
        assert_eq!(token_balance(&chain, &token, chain.account()).await.unwrap(), 0);
        assert!(is_deployed(&chain, &token).await.unwrap());

        let info = token_info(&chain, &token).await.unwrap();
        assert_eq!(
            info,
            TokenInfo {
                name: "Vortex USD".to_string(),
                symbol: "vUSD".to_string(),
                decimals: 6,
            }
        );
        assert_eq!(
            vortex_common::chain::format_units(3_000_000, info.decimals),
            "3"
        );
    }

    #[tokio::test]
    async fn test_reads_against_non_token_fail() {
        let chain = InMemoryChain::new(0);
        let missing = addr(TOKEN);
        assert!(token_balance(&chain, &missing, &addr(HOLDER)).await.is_err());
        assert!(token_info(&chain, &missing).await.is_err());
    }

    #[test]
    fn test_predicted_address_depends_on_owner_and_nonce() {
        let factory = addr("0x000000000000000000000000000000000000fac7");
        let owner = addr(HOLDER);
        let code_hash = [7u8; WORD];

        let first = predict_account_address(&factory, &owner, 0, code_hash);
        assert_eq!(first, predict_account_address(&factory, &owner, 0, code_hash));
        assert_ne!(first, predict_account_address(&factory, &owner, 1, code_hash));
        assert_ne!(first, predict_account_address(&factory, &addr(TOKEN), 0, code_hash));
        assert_ne!(first, predict_account_address(&owner, &owner, 0, code_hash));
    }
}
