//! Fee estimation of a wallet transfer.
//!
//! The estimate is the sum of four components:
//!
//! 1. storage due on every involved account,
//! 2. the import fee of the external message carrying the transfer,
//! 3. gas of the wallet contract, looked up by outbound message count,
//! 4. the sender's share of the forward fee of each outbound message.
//!
//! Messages are rebuilt with zero value and no bounce, which gives the same
//! cell sizes as the real transfer without depending on amounts.

use std::sync::Arc;

use tracing::trace;

use ton_cell::{Cell, MsgAddress};
use ton_order::{Order, OrderMessage};
use ton_wallet::{comment, InternalMessage, SendMode, StateInit, TransferRequest, WalletContract};

use crate::compute::{
    compute_external_message_fees, compute_gas_prices, compute_message_forward_fees, compute_storage_fees,
};
use crate::config::{ChainConfigSnapshot, WorkchainPrices};
use crate::error::FeeResult;
use crate::gas::gas_for_messages;
use crate::storage::StorageStat;

/// Validity window of the estimated transfer, in seconds.
pub const TRANSFER_VALID_FOR: u32 = 60;

const MASTERCHAIN: i32 = -1;

/// Outbound messages of a transfer, rebuilt for estimation.
#[derive(Debug, Clone)]
pub struct PlannedTransfer {
    pub messages: Vec<InternalMessage>,
    pub send_mode: SendMode,
    /// Accounts whose storage is charged, sender first, without duplicates.
    pub accounts: Vec<MsgAddress>,
}

fn send_mode_for(amount_all: bool) -> SendMode {
    if amount_all {
        SendMode::CARRY_ALL_REMAINING_BALANCE
    } else {
        SendMode::PAY_GAS_SEPARATELY | SendMode::IGNORE_ERRORS
    }
}

fn load_init(cell: Option<&Arc<Cell>>) -> FeeResult<Option<StateInit>> {
    Ok(cell.map(|cell| StateInit::from_cell(cell)).transpose()?)
}

fn estimation_message(to: MsgAddress, init: Option<StateInit>, body: Option<Arc<Cell>>) -> InternalMessage {
    InternalMessage {
        to,
        value: 0,
        bounce: false,
        init,
        body,
    }
}

/// Rebuild the outbound messages of `order` as the wallet will send them.
///
/// Without an order the estimate covers a comment sent to the wallet itself,
/// deploying `state_init` when given. Ledger orders without a payload carry
/// `text` as a comment.
pub fn reconstruct_messages(
    order: Option<&Order>,
    own_address: &MsgAddress,
    text: &str,
    state_init: Option<&Arc<Cell>>,
) -> FeeResult<PlannedTransfer> {
    let mut accounts = vec![own_address.clone()];

    let Some(order) = order else {
        let body = Arc::new(comment(text)?);
        return Ok(PlannedTransfer {
            messages: vec![estimation_message(own_address.clone(), load_init(state_init)?, Some(body))],
            send_mode: send_mode_for(false),
            accounts,
        });
    };

    // Ledger payloads are resolved here; an unsupported one fails the estimate.
    let order_messages: Vec<OrderMessage> = order.messages()?;

    let mut messages = Vec::with_capacity(order_messages.len());
    for message in &order_messages {
        let to = MsgAddress::from_string(&message.target)?;
        if !accounts.contains(&to) {
            accounts.push(to.clone());
        }
        let body = match &message.payload {
            Some(payload) => Some(payload.clone()),
            None if order.is_ledger() => Some(Arc::new(comment(text)?)),
            None => None,
        };
        messages.push(estimation_message(to, load_init(message.state_init.as_ref())?, body));
    }

    Ok(PlannedTransfer {
        messages,
        send_mode: send_mode_for(order.is_amount_all()),
        accounts,
    })
}

/// Fee components of one estimate, in nanocoins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeEstimate {
    pub storage: u128,
    pub import: u128,
    pub gas: u128,
    pub forward: u128,
}

impl FeeEstimate {
    pub fn total(&self) -> u128 {
        self.storage + self.import + self.gas + self.forward
    }
}

/// Inputs of [`estimate_fee`].
#[derive(Debug, Clone, Copy)]
pub struct EstimateInput<'a> {
    pub contract: &'a WalletContract,
    pub transfer: &'a PlannedTransfer,
    /// Current wallet seqno; 0 means the wallet is not deployed yet.
    pub seqno: u32,
    pub config: &'a ChainConfigSnapshot,
    /// Storage stats of `transfer.accounts`; `None` for accounts that do not exist.
    pub storage: &'a [Option<StorageStat>],
    /// Unix time the estimate is made for.
    pub now: u32,
}

/// Estimate the fee of sending `input.transfer` from `input.contract`.
///
/// The result depends only on the input.
pub fn estimate_fee(input: &EstimateInput<'_>) -> FeeResult<FeeEstimate> {
    let masterchain = input.contract.workchain() == MASTERCHAIN;
    let prices: &WorkchainPrices = if masterchain {
        &input.config.masterchain
    } else {
        &input.config.workchain
    };

    // Each account pays storage at the prices of its own chain.
    let storage: u128 = input
        .storage
        .iter()
        .enumerate()
        .filter_map(|(i, stat)| stat.as_ref().map(|stat| (i, stat)))
        .map(|(i, stat)| {
            let account_masterchain = input
                .transfer
                .accounts
                .get(i)
                .map_or(masterchain, |account| account.workchain() == Some(MASTERCHAIN));
            compute_storage_fees(
                input.now,
                stat.last_paid,
                &input.config.storage,
                &stat.used,
                false,
                account_masterchain,
            )
        })
        .sum();

    let request = TransferRequest::new(
        input.seqno,
        input.transfer.send_mode,
        input.transfer.messages.clone(),
        input.now.saturating_add(TRANSFER_VALID_FOR),
    );
    let body = input.contract.create_transfer(&request)?;
    let external = input.contract.external_message(body, input.seqno == 0)?;
    let import = compute_external_message_fees(&prices.message, &external);

    let gas_used = gas_for_messages(input.transfer.messages.len())?;
    let gas = compute_gas_prices(gas_used, &prices.gas);

    let mut forward = 0;
    for message in &input.transfer.messages {
        forward += compute_message_forward_fees(&prices.message, &message.to_cell()?)?.fees;
    }

    let estimate = FeeEstimate {
        storage,
        import,
        gas,
        forward,
    };
    trace!(
        storage = estimate.storage,
        import = estimate.import,
        gas = estimate.gas,
        gas_used,
        forward = estimate.forward,
        total = estimate.total(),
        "estimated transfer fee"
    );
    Ok(estimate)
}
