//! Error types for ton-wallet

use thiserror::Error;

use crate::version::WalletVersion;

/// Wallet error type
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Cell error: {0}")]
    Cell(#[from] ton_cell::CellError),

    #[error("Invalid public key: expected 32 bytes, got {0}")]
    InvalidPublicKey(usize),

    #[error("Too many messages: max {max}, got {got}")]
    TooManyMessages { max: usize, got: usize },

    #[error("Transfer has no messages")]
    NoMessages,

    #[error("Invalid wallet id: {0}")]
    InvalidWalletId(String),

    #[error("Invalid state init: {0}")]
    InvalidStateInit(String),

    #[error("Wallet code for {0} is not configured")]
    MissingCode(WalletVersion),
}

/// Result type alias
pub type WalletResult<T> = Result<T, WalletError>;
