//! From transfer form to unsigned external message.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use ton_cell::{BagOfCells, MsgAddress};
use ton_fees::{
    BackoffPolicy, ChainClient, ChainConfigSnapshot, EstimationRequest, EstimationScheduler, FeeEstimate,
};
use ton_order::{
    amount_issue, build_order, memo_issue, parse_amount, self_transfer_warning, AmountIssue, JettonFees,
    KnownWallets, MemoIssue, Order, OrderInput, TransferForm, TransferWarning,
};
use ton_wallet::{InternalMessage, SendMode, StateInit, TransferRequest, WalletContract};

use crate::account::AccountContext;
use crate::config::TransferConfig;
use crate::error::TransferResult;

/// Inline feedback for the transfer form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormCheck {
    pub amount: Option<AmountIssue>,
    pub memo: Option<MemoIssue>,
    pub warning: Option<TransferWarning>,
}

/// Transfer flow of one account.
pub struct TransferPipeline<C> {
    account: AccountContext,
    chain_config: Arc<ChainConfigSnapshot>,
    known: KnownWallets,
    fees: JettonFees,
    scheduler: EstimationScheduler<C>,
}

impl<C: ChainClient> TransferPipeline<C> {
    pub fn new(
        account: AccountContext,
        chain_config: ChainConfigSnapshot,
        known: KnownWallets,
        fees: JettonFees,
        client: C,
        policy: BackoffPolicy,
    ) -> Self {
        Self {
            account,
            chain_config: Arc::new(chain_config),
            known,
            fees,
            scheduler: EstimationScheduler::new(client, policy),
        }
    }

    /// Build a pipeline with known wallets, jetton amounts and backoff from `config`.
    pub fn from_config(
        config: &TransferConfig,
        account: AccountContext,
        chain_config: ChainConfigSnapshot,
        client: C,
    ) -> TransferResult<Self> {
        Ok(Self::new(
            account,
            chain_config,
            config.known_wallets()?,
            config.jetton_fees(),
            client,
            config.backoff_policy(),
        ))
    }

    pub fn account(&self) -> &AccountContext {
        &self.account
    }

    pub fn contract(&self) -> &WalletContract {
        self.account.contract()
    }

    pub fn set_balance(&mut self, balance: u128) {
        self.account.balance = Some(balance);
    }

    /// Replace the chain prices used by later estimates.
    pub fn set_chain_config(&mut self, chain_config: ChainConfigSnapshot) {
        self.chain_config = Arc::new(chain_config);
    }

    /// Inline issues of `form`. `asset_balance` is the balance of the selected asset.
    pub fn check_form(&self, form: &TransferForm, asset_balance: u128) -> FormCheck {
        let amount = parse_amount(&form.amount, form.asset.decimals());
        let known = self.known.lookup(&form.target);
        let warning = MsgAddress::from_string(&form.target)
            .ok()
            .and_then(|target| self_transfer_warning(&target, self.account.address()));
        FormCheck {
            amount: amount_issue(&form.amount, amount, asset_balance, form.asset.is_jetton()),
            memo: memo_issue(&form.comment, known),
            warning,
        }
    }

    /// Order for the current form, or `None` while the form is not ready.
    ///
    /// Jetton amounts include the latest fee estimate when one is known.
    pub fn build_order(&self, form: &TransferForm, ledger: bool) -> Option<Order> {
        build_order(&OrderInput {
            target: form.target.clone(),
            domain: form.domain.clone(),
            amount: form.amount.clone(),
            comment: form.comment.clone(),
            asset: form.asset.clone(),
            balance: self.account.balance,
            own_address: self.account.address().clone(),
            ledger,
            known: self.known.lookup(&form.target).cloned(),
            estimate: self.latest_estimate().map(|e| e.total()),
            testnet: self.account.network.is_testnet(),
            fees: self.fees,
            ..Default::default()
        })
    }

    /// Estimate the fee of `order`, superseding earlier requests.
    ///
    /// `Ok(None)` means a newer request took over.
    pub async fn request_estimate(&self, order: Option<Order>, comment: &str) -> TransferResult<Option<FeeEstimate>> {
        let request = EstimationRequest {
            contract: self.contract().clone(),
            config: self.chain_config.clone(),
            order,
            comment: comment.to_string(),
            state_init: None,
        };
        Ok(self.scheduler.estimate(request).await?)
    }

    pub fn latest_estimate(&self) -> Option<FeeEstimate> {
        self.scheduler.latest()
    }

    pub fn subscribe_estimates(&self) -> watch::Receiver<Option<FeeEstimate>> {
        self.scheduler.subscribe()
    }

    /// Unsigned external message of `order` as a BoC.
    ///
    /// The signature slot holds zeros; the signing collaborator replaces it.
    /// The wallet's state init is attached when `seqno` is 0.
    pub fn external_message(&self, order: &Order, seqno: u32, valid_until: u32) -> TransferResult<Vec<u8>> {
        let messages = order.messages()?;

        let mut internal = Vec::with_capacity(messages.len());
        for message in &messages {
            let (target, bounce) = parse_target(&message.target)?;
            let mut outbound = InternalMessage::new(target, message.amount).with_bounce(bounce);
            if let Some(payload) = &message.payload {
                outbound = outbound.with_body(payload.clone());
            }
            if let Some(init) = &message.state_init {
                outbound = outbound.with_init(StateInit::from_cell(init)?);
            }
            internal.push(outbound);
        }

        let send_mode = if order.is_amount_all() {
            SendMode::CARRY_ALL_REMAINING_BALANCE
        } else {
            SendMode::PAY_GAS_SEPARATELY | SendMode::IGNORE_ERRORS
        };
        let request = TransferRequest::new(seqno, send_mode, internal, valid_until);
        let body = self.contract().create_transfer(&request)?;
        let external = self.contract().external_message(body, seqno == 0)?;
        let boc = BagOfCells::from_root(external).serialize()?;

        debug!(
            seqno,
            messages = messages.len(),
            send_mode = send_mode.bits(),
            bytes = boc.len(),
            "built unsigned external message"
        );
        Ok(boc)
    }
}

/// Destination of an outbound message and its bounce flag.
///
/// Friendly addresses carry the flag; raw addresses bounce.
fn parse_target(target: &str) -> TransferResult<(MsgAddress, bool)> {
    let address = MsgAddress::from_string(target)?;
    let bounce = MsgAddress::parse_friendly(target.trim()).map_or(true, |friendly| friendly.bounceable);
    Ok((address, bounce))
}
