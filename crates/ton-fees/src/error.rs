//! Error types for fee estimation.

use thiserror::Error;

/// Fee estimation error type
#[derive(Debug, Error)]
pub enum FeeError {
    #[error("Cell error: {0}")]
    Cell(#[from] ton_cell::CellError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] ton_wallet::WalletError),

    #[error("Order error: {0}")]
    Order(#[from] ton_order::OrderError),

    /// The gas table only covers transfers with 1 to 4 outbound messages.
    #[error("No gas estimate for {0} outbound messages")]
    UnsupportedMessageCount(usize),

    #[error("Invalid config param {param}: {reason}")]
    InvalidConfig { param: u32, reason: String },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Chain RPC failure, reported by the client implementation.
    #[error("Chain client error: {0}")]
    Client(String),
}

/// Result type alias
pub type FeeResult<T> = Result<T, FeeError>;
