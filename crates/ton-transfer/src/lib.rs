//! Transfer pipeline for TON wallets
//!
//! Ties the workspace together for one sending account:
//!
//! - **config**: [`TransferConfig`] loaded from TOML
//! - **account**: [`AccountContext`], the sending wallet passed explicitly
//! - **pipeline**: [`TransferPipeline`], which builds orders from the form,
//!   keeps the fee estimate current and produces unsigned external messages
//!
//! Signing and broadcasting are left to the embedding application.

pub mod account;
pub mod config;
pub mod error;
pub mod pipeline;

pub use account::AccountContext;
pub use config::{
    BackoffConfig, JettonFeesConfig, KnownWalletConfig, NetworkConfig, TransferConfig, V5Config, WalletCodesConfig,
};
pub use error::{ConfigError, TransferError, TransferResult};
pub use pipeline::{FormCheck, TransferPipeline};
