//! Error types for the transfer pipeline.

use thiserror::Error;

/// Errors loading a [`crate::TransferConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid wallet code: {0}")]
    WalletCode(#[from] ton_wallet::WalletError),

    #[error("Invalid config: {0}")]
    Validation(String),
}

/// Transfer pipeline error type
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cell error: {0}")]
    Cell(#[from] ton_cell::CellError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] ton_wallet::WalletError),

    #[error("Order error: {0}")]
    Order(#[from] ton_order::OrderError),

    #[error("Fee error: {0}")]
    Fee(#[from] ton_fees::FeeError),
}

/// Result type alias
pub type TransferResult<T> = Result<T, TransferError>;
