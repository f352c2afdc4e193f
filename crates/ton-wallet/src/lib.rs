//! TON wallet contracts for transfer construction
//!
//! This crate resolves wallet contracts from public keys and encodes the
//! messages they send:
//! - Wallet V4R2: subwallet id derived from the workchain
//! - Wallet V5R1: wallet ID packed from a context and the network global ID
//! - Relaxed internal and inbound external message encoding
//!
//! Signing stays outside: transfer bodies carry a zero signature placeholder,
//! which keeps their size identical to the signed request.

pub mod codes;
pub mod error;
pub mod message;
pub mod resolver;
pub mod transfer;
pub mod v4r2;
pub mod v5r1;
pub mod version;
pub mod wallet;
pub mod wallet_id;

// Re-exports
pub use codes::WalletCodes;
pub use error::{WalletError, WalletResult};
pub use message::{comment, read_comment, ExternalMessage, InternalMessage, StateInit};
pub use resolver::{resolve_contract, WalletContract};
pub use transfer::{SendMode, TransferRequest};
pub use v4r2::WalletV4R2;
pub use v5r1::WalletV5R1;
pub use version::{Network, WalletVersion};
pub use wallet::Wallet;
pub use wallet_id::{WalletIdContext, WalletIdV5};
