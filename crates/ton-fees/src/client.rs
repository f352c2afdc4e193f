//! Chain access needed by fee estimation.

use std::future::Future;

use serde::{Deserialize, Serialize};
use ton_cell::MsgAddress;

use crate::error::FeeResult;
use crate::storage::StorageStat;

/// Reference to a masterchain block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub seqno: u32,
    /// Generation time of the block.
    pub utime: u32,
}

/// Lifecycle state of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Uninit,
    Active,
    Frozen,
}

/// Account state at some block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub balance: u128,
    pub status: AccountStatus,
    /// `None` when the account does not exist.
    pub storage_stat: Option<StorageStat>,
}

/// Read access to the chain.
///
/// Implementations talk to a lite server or an HTTP API. Errors should be
/// reported as [`crate::FeeError::Client`]; callers retry them with backoff.
pub trait ChainClient: Send + Sync {
    /// Latest known masterchain block.
    fn last_block(&self) -> impl Future<Output = FeeResult<BlockRef>> + Send;

    /// State of `address` at masterchain block `block_seqno`.
    fn account(&self, block_seqno: u32, address: &MsgAddress) -> impl Future<Output = FeeResult<AccountSnapshot>> + Send;

    /// Current seqno of the wallet at `address`; 0 for undeployed wallets.
    fn seqno(&self, block_seqno: u32, address: &MsgAddress) -> impl Future<Output = FeeResult<u32>> + Send;
}
