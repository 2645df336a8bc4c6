//! Session-key and social-recovery orchestration for a smart account.
//!
//! The account-abstraction backend is the [`AccountClient`] trait. Two
//! managers drive it:
//!
//! - [`SessionManager`] installs the smart-sessions validator, grants a
//!   session key permission to call `writeDiceRoll(uint256)` on the dice
//!   ledger, and rolls dice with that key without the owner signing.
//! - [`GuardianManager`] installs the social-recovery validator and keeps the
//!   account's guardian list.
//!
//! [`onchain`] holds read-only helpers (deployment, ERC-20 balance and
//! metadata, counterfactual addresses). [`InMemoryChain`] is a deterministic
//! backend for tests and `aa-demo`.

pub mod abi;
pub mod client;
pub mod config;
pub mod keys;
pub mod log;
pub mod mock;
pub mod onchain;
pub mod recovery;
pub mod session;
pub mod store;

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use vortex_common::address::{Address, AddressError};

pub use client::{
    AccountClient, ActionPolicy, Call, Module, PermissionGrant, Receipt, SessionRequest,
};
pub use config::AaConfig;
pub use keys::SessionKey;
pub use log::{ActivityLog, LineLevel, LogLine};
pub use mock::InMemoryChain;
pub use onchain::TokenInfo;
pub use recovery::{GuardianManager, SENTINEL_ADDRESS};
pub use session::{ModuleState, RollOutcome, SessionData, SessionManager};
pub use store::{FileStore, MemoryStore, SessionStore};

#[derive(Debug, Error)]
pub enum AaError {
    #[error("Smart Sessions module installation already in progress")]
    InstallInProgress,
    #[error("No active session found")]
    NoActiveSession,
    #[error("Session key missing from store")]
    MissingSessionKey,
    #[error("Session permission {0} is not enabled")]
    SessionDisabled(String),
    #[error("Invalid dice roll: {0}")]
    InvalidRoll(u8),
    #[error("Invalid guardian address: {0}")]
    InvalidGuardian(String),
    #[error("Guardian not found in list: {0}")]
    GuardianNotFound(Address),
    #[error("Guardian already added: {0}")]
    DuplicateGuardian(Address),
    #[error("User operation {0} reverted")]
    Reverted(String),
    #[error("{0}")]
    Client(String),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Abi(#[from] abi::AbiError),
    #[error("invalid session key: {0}")]
    Key(#[from] secp256k1::Error),
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store data malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lock that shrugs off poisoning; every critical section leaves the data
/// consistent.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
