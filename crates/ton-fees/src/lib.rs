//! Client-side fee estimation for TON wallet transfers
//!
//! - **config**: chain price parameters and their config param parsers
//! - **compute**: storage, forwarding, gas and import fee formulas
//! - **gas**: gas used by the wallet contract per outbound message count
//! - **estimate**: [`estimate_fee`] over a rebuilt transfer
//! - **client**: the [`ChainClient`] boundary for chain state
//! - **retry**: exponential [`backoff`] for chain requests
//! - **scheduler**: [`EstimationScheduler`], where newer requests supersede older ones
//!
//! Estimates are advisory: they follow the node's formulas but are not
//! reconciled with the fees actually charged.

pub mod client;
pub mod compute;
pub mod config;
pub mod error;
pub mod estimate;
pub mod gas;
pub mod retry;
pub mod scheduler;
pub mod storage;

pub use client::{AccountSnapshot, AccountStatus, BlockRef, ChainClient};
pub use compute::{
    compute_external_message_fees, compute_fwd_fees, compute_gas_prices, compute_message_forward_fees,
    compute_storage_fees, shr16ceil, ForwardFees,
};
pub use config::{
    parse_gas_prices, parse_msg_prices, parse_storage_prices, ChainConfigSnapshot, GasPrices, MsgPrices,
    StoragePrices, WorkchainPrices,
};
pub use error::{FeeError, FeeResult};
pub use estimate::{estimate_fee, reconstruct_messages, EstimateInput, FeeEstimate, PlannedTransfer};
pub use gas::gas_for_messages;
pub use retry::{backoff, BackoffPolicy};
pub use scheduler::{EstimationRequest, EstimationScheduler, EstimationTicket};
pub use storage::{StorageStat, StorageUsed};
