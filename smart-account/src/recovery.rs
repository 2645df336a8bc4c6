//! Guardian management for the social-recovery validator.
//!
//! The validator stores guardians as a linked list, so removing one needs the
//! entry before it; the head's predecessor is the sentinel.

use vortex_common::address::{is_valid_address, Address};

use crate::abi::{self, Token};
use crate::client::{AccountClient, Call, Module};
use crate::config::AaConfig;
use crate::log::ActivityLog;
use crate::AaError;

pub const SENTINEL_ADDRESS: &str = "0x0000000000000000000000000000000000000001";

/// Guardians needed to approve a recovery.
pub const RECOVERY_THRESHOLD: u8 = 1;

pub struct GuardianManager<C> {
    client: C,
    config: AaConfig,
    log: ActivityLog,
    installed: bool,
    guardians: Vec<Address>,
}

impl<C: AccountClient> GuardianManager<C> {
    pub fn new(client: C, config: AaConfig, log: ActivityLog) -> Self {
        Self {
            client,
            config,
            log,
            installed: false,
            guardians: Vec::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Guardians as last read from chain.
    pub fn guardians(&self) -> &[Address] {
        &self.guardians
    }

    async fn log_balance(&self) -> Result<(), AaError> {
        let wei = self.client.balance(self.client.account()).await?;
        self.log.important(format!("Smart account balance: {wei}"));
        Ok(())
    }

    async fn reload_guardians(&mut self) -> Result<(), AaError> {
        let query = abi::encode_call(
            abi::GET_GUARDIANS,
            &[Token::Address(self.client.account().clone())],
        );
        let raw = self
            .client
            .read_contract(&self.config.recovery_module, &query)
            .await?;
        self.guardians = abi::decode_address_array(&raw)?;
        tracing::debug!(count = self.guardians.len(), "loaded guardians");
        Ok(())
    }

    async fn confirm(&self, user_op_hash: String) -> Result<(), AaError> {
        let receipt = self.client.wait_for_receipt(&user_op_hash).await?;
        if !receipt.success {
            return Err(AaError::Reverted(user_op_hash));
        }
        tracing::info!(tx = %receipt.transaction_hash, "recovery operation mined");
        Ok(())
    }

    /// Read install state and, when installed, the guardian list.
    pub async fn refresh(&mut self) -> Result<(), AaError> {
        let result = self.try_refresh().await;
        result.inspect_err(|e| self.log.fail("Error checking recovery module", e))
    }

    async fn try_refresh(&mut self) -> Result<(), AaError> {
        let module = Module::new(self.config.recovery_module.clone());
        self.installed = self.client.is_module_installed(&module).await?;
        if self.installed {
            self.reload_guardians().await?;
            self.log.add_line("Recovery Module already installed.");
        } else {
            self.guardians.clear();
        }
        Ok(())
    }

    /// Add `guardian`, installing the validator with it as the first guardian
    /// when the module is absent.
    pub async fn add_guardian(&mut self, guardian: &str) -> Result<(), AaError> {
        let guardian = self
            .new_guardian(guardian)
            .inspect_err(|e| self.log.fail("Error adding new guardian", e))?;
        if !self.installed {
            let result = self.install_with(guardian).await;
            return result.inspect_err(|e| self.log.fail("Error installing recovery module", e));
        }
        let result = self.try_add_guardian(guardian).await;
        result.inspect_err(|e| self.log.fail("Error adding new guardian", e))
    }

    fn new_guardian(&self, guardian: &str) -> Result<Address, AaError> {
        if !is_valid_address(guardian) {
            return Err(AaError::InvalidGuardian(guardian.to_string()));
        }
        let guardian: Address = guardian.parse()?;
        if self.guardians.contains(&guardian) {
            return Err(AaError::DuplicateGuardian(guardian));
        }
        Ok(guardian)
    }

    async fn try_add_guardian(&mut self, guardian: Address) -> Result<(), AaError> {
        self.log.set_loading("Adding guardian");
        self.log_balance().await?;
        let call = Call::new(
            self.config.recovery_module.clone(),
            abi::encode_call(abi::ADD_GUARDIAN, &[Token::Address(guardian)]),
        );
        let hash = self.client.send_calls(&[call]).await?;
        self.confirm(hash).await?;

        self.log.add_line("Guardian added successfully");
        self.log.clear_loading();
        self.reload_guardians().await?;
        self.log_balance().await?;
        Ok(())
    }

    async fn install_with(&mut self, guardian: Address) -> Result<(), AaError> {
        self.log
            .set_loading("Installing recovery module and adding guardian");
        let module = Module::with_init_data(
            self.config.recovery_module.clone(),
            abi::encode_recovery_init(RECOVERY_THRESHOLD, &[guardian]),
        );
        let hash = self.client.install_module(&module).await?;
        self.confirm(hash).await?;

        self.log.add_line("Recovery Module installed successfully");
        self.log.add_line("Guardian added successfully");
        self.installed = true;
        self.reload_guardians().await?;
        self.log.clear_loading();
        Ok(())
    }

    /// The `removeGuardian(prev, guardian)` call for a current guardian.
    pub fn removal_call(&self, guardian: &Address) -> Result<Call, AaError> {
        let index = self
            .guardians
            .iter()
            .position(|g| g == guardian)
            .ok_or_else(|| AaError::GuardianNotFound(guardian.clone()))?;
        let prev = match index {
            0 => SENTINEL_ADDRESS.parse::<Address>()?,
            i => self.guardians[i - 1].clone(),
        };
        Ok(Call::new(
            self.config.recovery_module.clone(),
            abi::encode_call(
                abi::REMOVE_GUARDIAN,
                &[Token::Address(prev), Token::Address(guardian.clone())],
            ),
        ))
    }

    /// Remove a current guardian. Non-members are rejected before anything
    /// is submitted.
    pub async fn remove_guardian(&mut self, guardian: &str) -> Result<(), AaError> {
        let result = self.try_remove_guardian(guardian).await;
        result.inspect_err(|e| self.log.fail("Error removing guardian", e))
    }

    async fn try_remove_guardian(&mut self, guardian: &str) -> Result<(), AaError> {
        if !is_valid_address(guardian) {
            return Err(AaError::InvalidGuardian(guardian.to_string()));
        }
        let call = self.removal_call(&guardian.parse()?)?;

        self.log.set_loading("Removing guardian");
        self.log_balance().await?;
        let hash = self.client.send_calls(&[call]).await?;
        self.confirm(hash).await?;

        self.log.add_line("Guardian removed successfully");
        self.log.clear_loading();
        self.log_balance().await?;
        self.reload_guardians().await?;
        Ok(())
    }
}
