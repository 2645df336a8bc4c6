pub mod address;
pub mod api;
pub mod auth;
pub mod chain;
pub mod prediction;
pub mod session;
pub mod state;
pub mod system;
pub mod transaction;
pub mod wallet;
