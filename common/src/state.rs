//! Reducer-backed state containers for the dashboard front-end.
//!
//! Each container is a plain struct with a pure `reduce` transition. The three
//! containers are independent; none validates against another.

use serde::{Deserialize, Serialize};

// ─── Module router ──────────────────────────────────────────────────────────

/// Screens the dashboard shell can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Module {
    Dashboard,
    Auth,
    Web3,
    ScsDemo,
    Predictions,
}

impl Module {
    const TABLE: [(&'static str, Module); 5] = [
        ("dashboard", Module::Dashboard),
        ("auth", Module::Auth),
        ("web3", Module::Web3),
        ("scs-demo", Module::ScsDemo),
        ("predictions", Module::Predictions),
    ];

    /// Look a module id up in the static table; anything unknown falls back
    /// to the dashboard.
    pub fn resolve(id: &str) -> Module {
        Self::TABLE
            .iter()
            .find(|(name, _)| *name == id)
            .map(|(_, m)| *m)
            .unwrap_or(Module::Dashboard)
    }

    pub fn id(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, m)| *m == self)
            .map(|(name, _)| *name)
            .unwrap_or("dashboard")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledModules {
    pub auth: bool,
    pub web3: bool,
    pub predictions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub version: String,
    pub modules: EnabledModules,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            version: "1.0.0".into(),
            modules: EnabledModules {
                auth: true,
                web3: true,
                predictions: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feature {
    SocialLogin,
    SmartAccounts,
    GaslessTransactions,
    MultiChain,
    CryptoPredictions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub social_login: bool,
    pub smart_accounts: bool,
    pub gasless_transactions: bool,
    pub multi_chain: bool,
    pub crypto_predictions: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            social_login: true,
            smart_accounts: true,
            gasless_transactions: true,
            multi_chain: true,
            crypto_predictions: true,
        }
    }
}

impl FeatureFlags {
    fn flag_mut(&mut self, feature: Feature) -> &mut bool {
        match feature {
            Feature::SocialLogin => &mut self.social_login,
            Feature::SmartAccounts => &mut self.smart_accounts,
            Feature::GaslessTransactions => &mut self.gasless_transactions,
            Feature::MultiChain => &mut self.multi_chain,
            Feature::CryptoPredictions => &mut self.crypto_predictions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Initialize { config: AppConfig },
    SetModule { module: String },
    UpdateFeature { feature: Feature, enabled: bool },
}

/// Shell state: which module is showing and which features are on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub is_initialized: bool,
    pub current_module: Option<String>,
    pub config: AppConfig,
    pub features: FeatureFlags,
}

impl AppState {
    pub fn reduce(mut self, action: AppAction) -> Self {
        match action {
            AppAction::Initialize { config } => {
                self.is_initialized = true;
                self.config = config;
            }
            AppAction::SetModule { module } => self.current_module = Some(module),
            AppAction::UpdateFeature { feature, enabled } => {
                *self.features.flag_mut(feature) = enabled;
            }
        }
        self
    }

    /// The screen to render for the current selection.
    pub fn active_module(&self) -> Module {
        self.current_module
            .as_deref()
            .map(Module::resolve)
            .unwrap_or(Module::Dashboard)
    }
}

// ─── Authentication ─────────────────────────────────────────────────────────

/// Identity returned by the social-login provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    pub verifier: String,
    pub verifier_id: String,
    pub type_of_login: String,
    #[serde(default)]
    pub is_mfa_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartAccountInfo {
    pub address: String,
    pub owner: String,
    pub is_deployed: bool,
    pub chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    InitStart,
    InitSuccess,
    InitError { error: String },
    LoginStart,
    LoginSuccess { user: SocialUser },
    LoginError { error: String },
    Logout,
    CreateSmartAccount { smart_account: SmartAccountInfo },
    SetError { error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub is_initialized: bool,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub user: Option<SocialUser>,
    pub smart_account: Option<SmartAccountInfo>,
    pub error: Option<String>,
}

impl AuthState {
    pub fn reduce(mut self, action: AuthAction) -> Self {
        match action {
            AuthAction::InitStart | AuthAction::LoginStart => {
                self.is_loading = true;
                self.error = None;
            }
            AuthAction::InitSuccess => {
                self.is_initialized = true;
                self.is_loading = false;
            }
            AuthAction::InitError { error } => {
                self.is_loading = false;
                self.error = Some(error);
            }
            AuthAction::LoginSuccess { user } => {
                self.is_authenticated = true;
                self.user = Some(user);
                self.is_loading = false;
                self.error = None;
            }
            AuthAction::LoginError { error } => {
                self.is_authenticated = false;
                self.user = None;
                self.is_loading = false;
                self.error = Some(error);
            }
            AuthAction::Logout => {
                return AuthState {
                    is_initialized: self.is_initialized,
                    ..AuthState::default()
                };
            }
            AuthAction::CreateSmartAccount { smart_account } => {
                self.smart_account = Some(smart_account);
            }
            AuthAction::SetError { error } => self.error = Some(error),
        }
        self
    }
}

// ─── Wallet connectivity ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Web3Action {
    ConnectStart,
    ConnectSuccess { address: String, chain_id: u64 },
    ConnectError { error: String },
    Disconnect,
    ChainChanged { chain_id: u64 },
    BalanceUpdated { balance: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Web3State {
    pub is_connected: bool,
    pub address: Option<String>,
    pub chain_id: u64,
    pub balance: String,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for Web3State {
    fn default() -> Self {
        Self {
            is_connected: false,
            address: None,
            chain_id: 1,
            balance: "0".into(),
            is_loading: false,
            error: None,
        }
    }
}

impl Web3State {
    pub fn reduce(mut self, action: Web3Action) -> Self {
        match action {
            Web3Action::ConnectStart => {
                self.is_loading = true;
                self.error = None;
            }
            Web3Action::ConnectSuccess { address, chain_id } => {
                self.is_connected = true;
                self.address = Some(address);
                self.chain_id = chain_id;
                self.is_loading = false;
                self.error = None;
            }
            Web3Action::ConnectError { error } => {
                self.is_connected = false;
                self.is_loading = false;
                self.error = Some(error);
            }
            Web3Action::Disconnect => return Web3State::default(),
            Web3Action::ChainChanged { chain_id } => self.chain_id = chain_id,
            Web3Action::BalanceUpdated { balance } => self.balance = balance,
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_lookup_falls_back_to_dashboard() {
        assert_eq!(Module::resolve("scs-demo"), Module::ScsDemo);
        assert_eq!(Module::resolve("nope"), Module::Dashboard);
        assert_eq!(Module::Predictions.id(), "predictions");

        let state = AppState::default().reduce(AppAction::SetModule {
            module: "unknown".into(),
        });
        // Assignment is unguarded; only rendering falls back.
        assert_eq!(state.current_module.as_deref(), Some("unknown"));
        assert_eq!(state.active_module(), Module::Dashboard);
    }

    #[test]
    fn test_feature_toggle() {
        let state = AppState::default().reduce(AppAction::UpdateFeature {
            feature: Feature::MultiChain,
            enabled: false,
        });
        assert!(!state.features.multi_chain);
        assert!(state.features.social_login);
    }

    #[test]
    fn test_initialize_replaces_config() {
        let config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };
        let state = AppState::default().reduce(AppAction::Initialize { config });
        assert!(state.is_initialized);
        assert_eq!(state.config.environment, Environment::Production);
    }

    #[test]
    fn test_login_lifecycle() {
        let user = SocialUser {
            id: "u1".into(),
            verifier: "google".into(),
            verifier_id: "u1@example.com".into(),
            type_of_login: "google".into(),
            ..SocialUser::default()
        };
        let state = AuthState::default()
            .reduce(AuthAction::InitStart)
            .reduce(AuthAction::InitSuccess)
            .reduce(AuthAction::LoginStart);
        assert!(state.is_loading);

        let state = state.reduce(AuthAction::LoginSuccess { user: user.clone() });
        assert!(state.is_authenticated);
        assert_eq!(state.user, Some(user));

        let state = state.reduce(AuthAction::LoginError {
            error: "popup closed".into(),
        });
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert_eq!(state.error.as_deref(), Some("popup closed"));
    }

    #[test]
    fn test_logout_keeps_initialized() {
        let state = AuthState::default()
            .reduce(AuthAction::InitSuccess)
            .reduce(AuthAction::CreateSmartAccount {
                smart_account: SmartAccountInfo {
                    address: "0x1".into(),
                    owner: "0x2".into(),
                    is_deployed: false,
                    chain_id: 1946,
                },
            })
            .reduce(AuthAction::Logout);
        assert!(state.is_initialized);
        assert!(state.smart_account.is_none());
    }

    #[test]
    fn test_web3_connect_and_disconnect() {
        let state = Web3State::default()
            .reduce(Web3Action::ConnectStart)
            .reduce(Web3Action::ConnectSuccess {
                address: "0xabc".into(),
                chain_id: 137,
            })
            .reduce(Web3Action::BalanceUpdated {
                balance: "1.5".into(),
            });
        assert!(state.is_connected);
        assert_eq!(state.chain_id, 137);
        assert_eq!(state.balance, "1.5");

        let state = state.reduce(Web3Action::Disconnect);
        assert_eq!(state, Web3State::default());
    }
}
