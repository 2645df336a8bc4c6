//! Smart-session flow: install the validator, grant a session key a
//! dice-ledger-only permission, then roll dice with that key.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use vortex_common::address::Address;

use crate::abi::{self, AbiError, Token};
use crate::client::{AccountClient, ActionPolicy, Call, Module, SessionRequest};
use crate::config::AaConfig;
use crate::keys::SessionKey;
use crate::log::ActivityLog;
use crate::store::{SessionStore, SESSION_DATA_KEY, SESSION_OWNER_KEY};
use crate::{lock, AaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    NotInstalled,
    Installing,
    Installed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionMode {
    #[default]
    Use,
    Enable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleData {
    pub permission_ids: Vec<String>,
    pub mode: SessionMode,
    pub action_policies: Vec<ActionPolicy>,
}

/// Everything needed to act under a granted permission. Persisted under
/// `smartSessionData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub granter: Address,
    pub description: String,
    pub session_public_key: Address,
    pub module_data: ModuleData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    pub rolls: Vec<u128>,
    pub total: u128,
}

/// Resets an interrupted install back to `NotInstalled`.
struct InstallGuard<'a> {
    state: &'a Mutex<ModuleState>,
    finished: bool,
}

impl InstallGuard<'_> {
    fn finish(mut self) {
        *lock(self.state) = ModuleState::Installed;
        self.finished = true;
    }
}

impl Drop for InstallGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *lock(self.state) = ModuleState::NotInstalled;
        }
    }
}

pub struct SessionManager<C, S> {
    client: C,
    store: S,
    config: AaConfig,
    log: ActivityLog,
    module: Mutex<ModuleState>,
    active: Mutex<Option<SessionData>>,
}

impl<C: AccountClient, S: SessionStore> SessionManager<C, S> {
    pub fn new(client: C, store: S, config: AaConfig, log: ActivityLog) -> Self {
        Self {
            client,
            store,
            config,
            log,
            module: Mutex::new(ModuleState::NotInstalled),
            active: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn module_state(&self) -> ModuleState {
        *lock(&self.module)
    }

    pub fn active_session(&self) -> Option<SessionData> {
        lock(&self.active).clone()
    }

    fn sessions_module(&self) -> Module {
        Module::new(self.config.smart_sessions_validator.clone())
    }

    async fn log_balance(&self) -> Result<(), AaError> {
        let wei = self.client.balance(self.client.account()).await?;
        self.log.important(format!("Smart account balance: {wei}"));
        Ok(())
    }

    // ─── Module ─────────────────────────────────────────────────────────────

    /// Read the module state from chain and pick up a cached session once
    /// the module is known to be installed.
    pub async fn refresh(&self) -> Result<ModuleState, AaError> {
        self.try_refresh()
            .await
            .inspect_err(|e| self.log.fail("Error checking Smart Sessions module", e))
    }

    async fn try_refresh(&self) -> Result<ModuleState, AaError> {
        let installed = self
            .client
            .is_module_installed(&self.sessions_module())
            .await?;
        if installed {
            self.log.add_line("Smart Sessions module already installed");
        } else {
            self.log.add_line("Smart Sessions module not installed");
        }

        let state = {
            let mut state = lock(&self.module);
            if *state != ModuleState::Installing {
                *state = if installed {
                    ModuleState::Installed
                } else {
                    ModuleState::NotInstalled
                };
            }
            *state
        };

        if state == ModuleState::Installed {
            if let Some(cached) = self.store.load(SESSION_DATA_KEY)? {
                let session: SessionData = serde_json::from_str(&cached)?;
                self.announce(&session);
                *lock(&self.active) = Some(session);
            }
        }
        Ok(state)
    }

    fn announce(&self, session: &SessionData) {
        self.log.add_line("Active session found");
        self.log.add_line(format!("Session owner: {}", session.granter));
        self.log.add_line(format!(
            "Session public key: {}",
            session.session_public_key
        ));
    }

    /// Install the smart-sessions validator. A no-op when installed; rejected
    /// with [`AaError::InstallInProgress`] while another install runs.
    pub async fn install_module(&self) -> Result<(), AaError> {
        self.try_install_module()
            .await
            .inspect_err(|e| self.log.fail("Error installing Smart Sessions module", e))
    }

    async fn try_install_module(&self) -> Result<(), AaError> {
        let guard = {
            let mut state = lock(&self.module);
            match *state {
                ModuleState::Installed => return Ok(()),
                ModuleState::Installing => return Err(AaError::InstallInProgress),
                ModuleState::NotInstalled => *state = ModuleState::Installing,
            }
            InstallGuard {
                state: &self.module,
                finished: false,
            }
        };

        self.log.set_loading("Installing Smart Sessions module");
        self.log_balance().await?;
        let hash = self.client.install_module(&self.sessions_module()).await?;
        tracing::info!(user_op_hash = %hash, "submitted module install");
        let receipt = self.client.wait_for_receipt(&hash).await?;
        if !receipt.success {
            return Err(AaError::Reverted(hash));
        }
        tracing::info!(tx = %receipt.transaction_hash, "module install mined");
        guard.finish();

        self.log.add_line("Smart Sessions module installed successfully");
        self.log_balance().await?;
        self.log.clear_loading();
        Ok(())
    }

    // ─── Session ────────────────────────────────────────────────────────────

    /// The persisted session owner key, created and saved on first use.
    fn session_key(&self) -> Result<SessionKey, AaError> {
        if let Some(hex) = self.store.load(SESSION_OWNER_KEY)? {
            return SessionKey::from_hex(&hex);
        }
        let key = SessionKey::generate();
        self.store.save(SESSION_OWNER_KEY, &key.to_hex())?;
        tracing::info!(address = %key.address(), "generated session owner key");
        Ok(key)
    }

    fn dice_policy(&self) -> ActionPolicy {
        ActionPolicy {
            contract_address: self.config.dice_roll_ledger.clone(),
            function_selector: abi::selector_hex(abi::WRITE_DICE_ROLL),
            sudo: true,
        }
    }

    /// Grant the session key permission to write dice rolls, installing the
    /// module first when needed.
    pub async fn create_session(&self) -> Result<SessionData, AaError> {
        self.try_create_session()
            .await
            .inspect_err(|e| self.log.fail("Error creating session", e))
    }

    async fn try_create_session(&self) -> Result<SessionData, AaError> {
        if self.module_state() != ModuleState::Installed {
            self.try_install_module().await?;
        }

        self.log.set_loading("Creating session");
        self.log_balance().await?;
        let key = self.session_key()?;

        let request = SessionRequest {
            session_public_key: key.address().clone(),
            action_policies: vec![self.dice_policy()],
        };
        let grant = self.client.grant_permission(&request).await?;
        let receipt = self.client.wait_for_receipt(&grant.user_op_hash).await?;
        if !receipt.success {
            return Err(AaError::Reverted(grant.user_op_hash));
        }

        let session = SessionData {
            granter: self.client.account().clone(),
            description: format!(
                "Session to increment a counter for {}",
                self.config.dice_roll_ledger
            ),
            session_public_key: key.address().clone(),
            module_data: ModuleData {
                permission_ids: grant.permission_ids,
                mode: SessionMode::Use,
                action_policies: request.action_policies,
            },
        };
        self.store
            .save(SESSION_DATA_KEY, &serde_json::to_string(&session)?)?;
        *lock(&self.active) = Some(session.clone());
        tracing::info!(tx = %receipt.transaction_hash, "session granted");

        self.log.add_line("Session created successfully");
        self.log_balance().await?;
        self.log.clear_loading();
        Ok(session)
    }

    // ─── Dice ───────────────────────────────────────────────────────────────

    /// Write `value` to the dice ledger with the session key and read back
    /// every roll recorded for the account.
    pub async fn roll_dice(&self, value: u8) -> Result<RollOutcome, AaError> {
        self.try_roll_dice(value)
            .await
            .inspect_err(|e| self.log.fail("Error rolling dice", e))
    }

    async fn try_roll_dice(&self, value: u8) -> Result<RollOutcome, AaError> {
        if !(1..=6).contains(&value) {
            return Err(AaError::InvalidRoll(value));
        }
        let session = self.active_session().ok_or(AaError::NoActiveSession)?;
        let permission_id = session
            .module_data
            .permission_ids
            .first()
            .ok_or(AaError::NoActiveSession)?;
        if !self.client.is_session_enabled(permission_id).await? {
            return Err(AaError::SessionDisabled(permission_id.clone()));
        }

        let hex = self
            .store
            .load(SESSION_OWNER_KEY)?
            .ok_or(AaError::MissingSessionKey)?;
        let signer = SessionKey::from_hex(&hex)?;

        let call = Call::new(
            self.config.dice_roll_ledger.clone(),
            abi::encode_call(abi::WRITE_DICE_ROLL, &[Token::Uint(value as u128)]),
        );
        self.log.add_line(format!("Your roll: {value}"));
        self.log.set_loading("Writing result to chain");
        self.log_balance().await?;

        let hash = self
            .client
            .use_permission(&session, &signer, &[call])
            .await?;
        let receipt = self.client.wait_for_receipt(&hash).await?;
        if !receipt.success {
            return Err(AaError::Reverted(hash));
        }
        tracing::info!(tx = %receipt.transaction_hash, value, "dice roll mined");

        let query = abi::encode_call(
            abi::GET_ALL_ROLLS,
            &[Token::Address(session.granter.clone())],
        );
        let raw = self
            .client
            .read_contract(&self.config.dice_roll_ledger, &query)
            .await?;
        let rolls = abi::decode_uint_array(&raw)?;
        let total = rolls
            .iter()
            .try_fold(0u128, |acc, r| acc.checked_add(*r))
            .ok_or(AbiError::Overflow)?;

        self.log.clear_loading();
        self.log.add_line("Result written to chain successfully");
        self.log_balance().await?;
        let joined = rolls
            .iter()
            .map(u128::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.log.add_line(format!("Your results so far: {joined}"));
        self.log.add_line(format!("Your score total: {total}"));
        Ok(RollOutcome { rolls, total })
    }
}
