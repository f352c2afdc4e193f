//! Error types for order construction.

use thiserror::Error;

/// Errors raised while assembling an order.
///
/// Form validation problems are not errors: the builder reports them as
/// `None` and the validators return typed issues.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Cell operation error.
    #[error("Cell error: {0}")]
    Cell(#[from] ton_cell::CellError),

    /// Wallet message encoding error.
    #[error("Wallet error: {0}")]
    Wallet(#[from] ton_wallet::WalletError),

    /// Address that passed no validation reached an order constructor.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Ledger payload kind that cannot be turned into a message body.
    #[error("Unsupported payload type: {0}")]
    UnsupportedPayload(String),
}

/// Result type for order operations.
pub type OrderResult<T> = Result<T, OrderError>;
