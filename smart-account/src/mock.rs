//! Deterministic in-process stand-in for bundler, paymaster and chain.
//!
//! Every submitted operation is mined immediately and charged to the
//! account's own balance, as with a self-funded paymaster. The dice ledger
//! and the social-recovery validator are emulated closely enough to reject
//! the same calls the real contracts would. The account itself has no code
//! until its first operation is mined. ERC-20 tokens can be deployed for
//! read-only `balanceOf` / `name` / `symbol` / `decimals` calls.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use sha3::{Digest, Keccak256};
use vortex_common::address::{Address, ADDRESS_LEN};
use vortex_common::chain::MOCK_GAS_PRICE;

use crate::abi::{self, Token};
use crate::client::{
    AccountClient, ActionPolicy, Call, Module, PermissionGrant, Receipt, SessionRequest,
};
use crate::config::AaConfig;
use crate::keys::SessionKey;
use crate::recovery::SENTINEL_ADDRESS;
use crate::session::SessionData;
use crate::{lock, AaError};

/// Gas charged for every user operation.
pub const USER_OP_GAS: u128 = 150_000;

/// Returned by `code` for anything deployed.
const STUB_CODE: &[u8] = &[0x60, 0x80, 0x60, 0x40, 0x52];

#[derive(Debug, Clone)]
struct TokenContract {
    name: String,
    symbol: String,
    decimals: u8,
    /// Keyed by lowercase holder address.
    balances: BTreeMap<String, u128>,
}

impl TokenContract {
    fn call(&self, sel: [u8; 4], args: &[u8]) -> Result<Vec<u8>, AaError> {
        if sel == abi::selector(abi::BALANCE_OF) {
            let holder = abi::address_at(args, 0)?;
            let balance = self
                .balances
                .get(&holder.to_lowercase())
                .copied()
                .unwrap_or(0);
            Ok(abi::encode_uint(balance))
        } else if sel == abi::selector(abi::NAME) {
            Ok(abi::encode_string(&self.name))
        } else if sel == abi::selector(abi::SYMBOL) {
            Ok(abi::encode_string(&self.symbol))
        } else if sel == abi::selector(abi::DECIMALS) {
            Ok(abi::encode_uint(u128::from(self.decimals)))
        } else {
            Err(reverted("unknown token call"))
        }
    }
}

#[derive(Debug, Clone)]
struct Permission {
    session_key: Address,
    policies: Vec<ActionPolicy>,
    enabled: bool,
}

#[derive(Debug, Clone, Default)]
struct ChainState {
    balance: u128,
    nonce: u64,
    installed: Vec<Address>,
    install_count: usize,
    guardians: Vec<Address>,
    threshold: u128,
    permissions: BTreeMap<String, Permission>,
    rolls: Vec<u128>,
    receipts: BTreeMap<String, Receipt>,
    /// Keyed by lowercase token address.
    tokens: BTreeMap<String, TokenContract>,
    fail_next: Option<String>,
}

/// Clones share one chain.
#[derive(Debug, Clone)]
pub struct InMemoryChain {
    account: Address,
    config: AaConfig,
    state: Arc<Mutex<ChainState>>,
}

fn reverted(reason: &str) -> AaError {
    AaError::Client(format!("execution reverted: {reason}"))
}

fn keccak_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    format!("0x{}", hex::encode(hasher.finalize()))
}

impl InMemoryChain {
    /// A fresh account holding `balance` wei on the Minato deployment.
    pub fn new(balance: u128) -> Self {
        Self::with_account(Address::from_bytes([0xaa; ADDRESS_LEN]), balance)
    }

    pub fn with_account(account: Address, balance: u128) -> Self {
        Self {
            account,
            config: AaConfig::minato(),
            state: Arc::new(Mutex::new(ChainState {
                balance,
                ..ChainState::default()
            })),
        }
    }

    pub fn with_config(mut self, config: AaConfig) -> Self {
        self.config = config;
        self
    }

    /// Make the next submitted operation fail with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        lock(&self.state).fail_next = Some(message.into());
    }

    pub fn disable_permission(&self, permission_id: &str) {
        if let Some(p) = lock(&self.state).permissions.get_mut(permission_id) {
            p.enabled = false;
        }
    }

    pub fn install_count(&self) -> usize {
        lock(&self.state).install_count
    }

    pub fn guardians(&self) -> Vec<Address> {
        lock(&self.state).guardians.clone()
    }

    pub fn threshold(&self) -> u128 {
        lock(&self.state).threshold
    }

    pub fn rolls(&self) -> Vec<u128> {
        lock(&self.state).rolls.clone()
    }

    /// Append to the dice ledger directly, as another writer would.
    pub fn push_roll(&self, value: u128) {
        lock(&self.state).rolls.push(value);
    }

    /// Deploy an ERC-20 at `token` with no balances.
    pub fn deploy_token(&self, token: &Address, name: &str, symbol: &str, decimals: u8) {
        lock(&self.state).tokens.insert(
            token.to_lowercase(),
            TokenContract {
                name: name.to_string(),
                symbol: symbol.to_string(),
                decimals,
                balances: BTreeMap::new(),
            },
        );
    }

    /// Credit `amount` of `token` to `holder`. Unknown tokens are ignored.
    pub fn mint(&self, token: &Address, holder: &Address, amount: u128) {
        if let Some(contract) = lock(&self.state).tokens.get_mut(&token.to_lowercase()) {
            let balance = contract.balances.entry(holder.to_lowercase()).or_default();
            *balance = balance.saturating_add(amount);
        }
    }

    /// Consume an injected failure, if any.
    fn check_failure(state: &mut ChainState) -> Result<(), AaError> {
        match state.fail_next.take() {
            Some(message) => Err(AaError::Client(message)),
            None => Ok(()),
        }
    }

    /// Charge gas, mine, and record a successful receipt.
    fn mine(&self, state: &mut ChainState) -> String {
        state.balance = state
            .balance
            .saturating_sub(USER_OP_GAS * MOCK_GAS_PRICE);
        state.nonce += 1;
        let user_op_hash = keccak_hex(&[&self.account.to_bytes(), &state.nonce.to_be_bytes()]);
        let transaction_hash = keccak_hex(&[user_op_hash.as_bytes()]);
        state.receipts.insert(
            user_op_hash.clone(),
            Receipt {
                user_op_hash: user_op_hash.clone(),
                transaction_hash,
                success: true,
            },
        );
        user_op_hash
    }

    /// Apply `calls` all-or-nothing.
    fn execute(&self, state: &mut ChainState, calls: &[Call]) -> Result<(), AaError> {
        let mut next = state.clone();
        for call in calls {
            let (sel, args) = abi::split_call(&call.data)?;
            if call.to == self.config.dice_roll_ledger
                && sel == abi::selector(abi::WRITE_DICE_ROLL)
            {
                next.rolls.push(abi::uint_at(args, 0)?);
            } else if call.to == self.config.recovery_module {
                if !next.installed.contains(&self.config.recovery_module) {
                    return Err(reverted("recovery module not installed"));
                }
                if sel == abi::selector(abi::ADD_GUARDIAN) {
                    let guardian = abi::address_at(args, 0)?;
                    if next.guardians.contains(&guardian) {
                        return Err(reverted("guardian already added"));
                    }
                    next.guardians.push(guardian);
                } else if sel == abi::selector(abi::REMOVE_GUARDIAN) {
                    let prev = abi::address_at(args, 0)?;
                    let guardian = abi::address_at(args, 1)?;
                    let index = next
                        .guardians
                        .iter()
                        .position(|g| g == &guardian)
                        .ok_or_else(|| reverted("guardian not found"))?;
                    let expected = match index {
                        0 => SENTINEL_ADDRESS.to_string(),
                        i => next.guardians[i - 1].to_lowercase(),
                    };
                    if prev.to_lowercase() != expected {
                        return Err(reverted("invalid previous guardian"));
                    }
                    next.guardians.remove(index);
                } else {
                    return Err(reverted("unknown selector"));
                }
            } else {
                return Err(reverted("unknown call target"));
            }
        }
        *state = next;
        Ok(())
    }
}

fn allowed(policies: &[ActionPolicy], call: &Call) -> bool {
    let Ok((sel, _)) = abi::split_call(&call.data) else {
        return false;
    };
    let sel = format!("0x{}", hex::encode(sel));
    policies
        .iter()
        .any(|p| p.contract_address == call.to && p.function_selector.eq_ignore_ascii_case(&sel))
}

impl AccountClient for InMemoryChain {
    fn account(&self) -> &Address {
        &self.account
    }

    async fn is_module_installed(&self, module: &Module) -> Result<bool, AaError> {
        Ok(lock(&self.state).installed.contains(&module.address))
    }

    async fn install_module(&self, module: &Module) -> Result<String, AaError> {
        // Bundler round trip.
        tokio::task::yield_now().await;

        let mut state = lock(&self.state);
        Self::check_failure(&mut state)?;
        if state.installed.contains(&module.address) {
            return Err(reverted("module already installed"));
        }
        if module.address == self.config.recovery_module {
            let (threshold, guardians) = abi::decode_recovery_init(&module.init_data)?;
            state.threshold = threshold;
            state.guardians = guardians;
        }
        state.installed.push(module.address.clone());
        state.install_count += 1;
        Ok(self.mine(&mut state))
    }

    async fn send_calls(&self, calls: &[Call]) -> Result<String, AaError> {
        let mut state = lock(&self.state);
        Self::check_failure(&mut state)?;
        self.execute(&mut state, calls)?;
        Ok(self.mine(&mut state))
    }

    async fn wait_for_receipt(&self, user_op_hash: &str) -> Result<Receipt, AaError> {
        lock(&self.state)
            .receipts
            .get(user_op_hash)
            .cloned()
            .ok_or_else(|| AaError::Client(format!("unknown user operation {user_op_hash}")))
    }

    async fn grant_permission(
        &self,
        request: &SessionRequest,
    ) -> Result<PermissionGrant, AaError> {
        let mut state = lock(&self.state);
        if !state.installed.contains(&self.config.smart_sessions_validator) {
            return Err(reverted("Smart Sessions module not installed"));
        }
        Self::check_failure(&mut state)?;
        let permission_id = keccak_hex(&[
            &request.session_public_key.to_bytes(),
            &state.nonce.to_be_bytes(),
        ]);
        state.permissions.insert(
            permission_id.clone(),
            Permission {
                session_key: request.session_public_key.clone(),
                policies: request.action_policies.clone(),
                enabled: true,
            },
        );
        let user_op_hash = self.mine(&mut state);
        Ok(PermissionGrant {
            user_op_hash,
            permission_ids: vec![permission_id],
        })
    }

    async fn is_session_enabled(&self, permission_id: &str) -> Result<bool, AaError> {
        Ok(lock(&self.state)
            .permissions
            .get(permission_id)
            .is_some_and(|p| p.enabled))
    }

    async fn use_permission(
        &self,
        session: &SessionData,
        signer: &SessionKey,
        calls: &[Call],
    ) -> Result<String, AaError> {
        let mut state = lock(&self.state);
        if session.granter != self.account {
            return Err(reverted("session granted by another account"));
        }
        let permission = session
            .module_data
            .permission_ids
            .first()
            .and_then(|id| state.permissions.get(id))
            .filter(|p| p.enabled)
            .ok_or_else(|| reverted("permission not enabled"))?;
        if &permission.session_key != signer.address() {
            return Err(reverted("invalid session signature"));
        }
        if !calls.iter().all(|call| allowed(&permission.policies, call)) {
            return Err(reverted("call not permitted by session"));
        }
        Self::check_failure(&mut state)?;
        self.execute(&mut state, calls)?;
        Ok(self.mine(&mut state))
    }

    async fn code(&self, address: &Address) -> Result<Vec<u8>, AaError> {
        let state = lock(&self.state);
        let deployed = if address == &self.account {
            state.nonce > 0
        } else {
            state.tokens.contains_key(&address.to_lowercase())
                || [
                    &self.config.dice_roll_ledger,
                    &self.config.recovery_module,
                    &self.config.smart_sessions_validator,
                ]
                .contains(&address)
        };
        Ok(if deployed { STUB_CODE.to_vec() } else { Vec::new() })
    }

    async fn read_contract(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, AaError> {
        let state = lock(&self.state);
        let (sel, args) = abi::split_call(data)?;
        if let Some(token) = state.tokens.get(&to.to_lowercase()) {
            return token.call(sel, args);
        }
        let owner = abi::address_at(args, 0)?;
        let is_account = owner == self.account;

        if to == &self.config.dice_roll_ledger && sel == abi::selector(abi::GET_ALL_ROLLS) {
            let rolls: &[u128] = if is_account { state.rolls.as_slice() } else { &[] };
            return Ok(abi::encode_array(
                &rolls.iter().map(|r| Token::Uint(*r)).collect::<Vec<_>>(),
            ));
        }
        if to == &self.config.recovery_module && sel == abi::selector(abi::GET_GUARDIANS) {
            let guardians: &[Address] = if is_account { state.guardians.as_slice() } else { &[] };
            return Ok(abi::encode_array(
                &guardians
                    .iter()
                    .map(|g| Token::Address(g.clone()))
                    .collect::<Vec<_>>(),
            ));
        }
        Err(reverted("unknown view call"))
    }

    async fn balance(&self, address: &Address) -> Result<u128, AaError> {
        if address == &self.account {
            Ok(lock(&self.state).balance)
        } else {
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guardian(last: u8) -> Address {
        let mut raw = [0u8; ADDRESS_LEN];
        raw[0] = 0x0b;
        raw[ADDRESS_LEN - 1] = last;
        Address::from_bytes(raw)
    }

    fn recovery_module(chain: &InMemoryChain, guardians: &[Address]) -> Module {
        Module::with_init_data(
            chain.config.recovery_module.clone(),
            abi::encode_recovery_init(1, guardians),
        )
    }

    #[tokio::test]
    async fn test_operations_charge_gas() {
        let chain = InMemoryChain::new(1_000_000_000_000_000_000);
        let before = chain.balance(chain.account()).await.unwrap();
        let hash = chain
            .install_module(&Module::new(chain.config.smart_sessions_validator.clone()))
            .await
            .unwrap();
        let receipt = chain.wait_for_receipt(&hash).await.unwrap();
        assert!(receipt.success);
        assert_eq!(
            chain.balance(chain.account()).await.unwrap(),
            before - USER_OP_GAS * MOCK_GAS_PRICE
        );
        assert_eq!(chain.balance(&guardian(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_double_install_reverts() {
        let chain = InMemoryChain::new(0);
        let module = Module::new(chain.config.smart_sessions_validator.clone());
        chain.install_module(&module).await.unwrap();
        assert!(chain.install_module(&module).await.is_err());
        assert_eq!(chain.install_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_guardian_checks_prev() {
        let chain = InMemoryChain::new(0);
        chain
            .install_module(&recovery_module(&chain, &[guardian(1), guardian(2)]))
            .await
            .unwrap();
        assert_eq!(chain.threshold(), 1);
        let to = chain.config.recovery_module.clone();

        let wrong_prev = abi::encode_call(
            abi::REMOVE_GUARDIAN,
            &[Token::Address(guardian(9)), Token::Address(guardian(2))],
        );
        assert!(chain.send_calls(&[Call::new(to.clone(), wrong_prev)]).await.is_err());
        assert_eq!(chain.guardians(), vec![guardian(1), guardian(2)]);

        let right_prev = abi::encode_call(
            abi::REMOVE_GUARDIAN,
            &[Token::Address(guardian(1)), Token::Address(guardian(2))],
        );
        chain.send_calls(&[Call::new(to, right_prev)]).await.unwrap();
        assert_eq!(chain.guardians(), vec![guardian(1)]);
    }

    #[tokio::test]
    async fn test_failed_batch_is_atomic() {
        let chain = InMemoryChain::new(0);
        let ledger = chain.config.dice_roll_ledger.clone();
        let roll = Call::new(
            ledger.clone(),
            abi::encode_call(abi::WRITE_DICE_ROLL, &[Token::Uint(3)]),
        );
        let bogus = Call::new(ledger, vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(chain.send_calls(&[roll, bogus]).await.is_err());
        assert!(chain.rolls().is_empty());
    }

    #[tokio::test]
    async fn test_session_key_limited_to_policy() {
        let chain = InMemoryChain::new(0);
        let config = chain.config.clone();
        chain
            .install_module(&Module::new(config.smart_sessions_validator.clone()))
            .await
            .unwrap();
        let key = SessionKey::generate();
        let policy = ActionPolicy {
            contract_address: config.dice_roll_ledger.clone(),
            function_selector: abi::selector_hex(abi::WRITE_DICE_ROLL),
            sudo: true,
        };
        let grant = chain
            .grant_permission(&SessionRequest {
                session_public_key: key.address().clone(),
                action_policies: vec![policy.clone()],
            })
            .await
            .unwrap();
        let session = SessionData {
            granter: chain.account().clone(),
            description: String::new(),
            session_public_key: key.address().clone(),
            module_data: crate::session::ModuleData {
                permission_ids: grant.permission_ids,
                mode: Default::default(),
                action_policies: vec![policy],
            },
        };

        let add_guardian = Call::new(
            config.recovery_module.clone(),
            abi::encode_call(abi::ADD_GUARDIAN, &[Token::Address(guardian(1))]),
        );
        assert!(chain
            .use_permission(&session, &key, &[add_guardian])
            .await
            .is_err());

        let stranger = SessionKey::generate();
        let roll = Call::new(
            config.dice_roll_ledger.clone(),
            abi::encode_call(abi::WRITE_DICE_ROLL, &[Token::Uint(2)]),
        );
        assert!(chain
            .use_permission(&session, &stranger, &[roll.clone()])
            .await
            .is_err());
        chain.use_permission(&session, &key, &[roll]).await.unwrap();
        assert_eq!(chain.rolls(), vec![2]);
    }
}
