//! Superseding fee estimation.
//!
//! Form edits arrive faster than chain round-trips complete. Every request
//! takes a generation ticket; runs are serialized by a lock and check their
//! ticket after each await, including between retries of a chain request. A
//! run whose ticket is no longer the newest stops and its result is dropped,
//! so only the newest request updates the latest-estimate slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::debug;

use ton_cell::Cell;
use ton_order::Order;
use ton_wallet::WalletContract;

use crate::client::ChainClient;
use crate::config::ChainConfigSnapshot;
use crate::error::FeeResult;
use crate::estimate::{estimate_fee, reconstruct_messages, EstimateInput, FeeEstimate};
use crate::retry::{backoff, BackoffPolicy};

/// Everything an estimation run needs besides chain state.
#[derive(Debug, Clone)]
pub struct EstimationRequest {
    pub contract: WalletContract,
    pub config: Arc<ChainConfigSnapshot>,
    /// `None` estimates a comment sent to the wallet itself.
    pub order: Option<Order>,
    pub comment: String,
    pub state_init: Option<Arc<Cell>>,
}

/// Generation of one estimation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimationTicket(u64);

/// Runs estimations one at a time and publishes the newest result.
pub struct EstimationScheduler<C> {
    client: C,
    policy: BackoffPolicy,
    generation: AtomicU64,
    lock: Mutex<()>,
    latest: watch::Sender<Option<FeeEstimate>>,
}

impl<C: ChainClient> EstimationScheduler<C> {
    pub fn new(client: C, policy: BackoffPolicy) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            client,
            policy,
            generation: AtomicU64::new(0),
            lock: Mutex::new(()),
            latest,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Start a new request, superseding every earlier one.
    pub fn begin(&self) -> EstimationTicket {
        EstimationTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no request started after `ticket`.
    pub fn is_current(&self, ticket: EstimationTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Run the estimation for `ticket`.
    ///
    /// Returns `Ok(None)` when the request was superseded before it finished;
    /// the latest-estimate slot is then left to the newer request.
    pub async fn run(&self, ticket: EstimationTicket, request: EstimationRequest) -> FeeResult<Option<FeeEstimate>> {
        let _guard = self.lock.lock().await;
        if !self.is_current(ticket) {
            debug!(ticket = ticket.0, "estimation superseded before start");
            return Ok(None);
        }

        let own_address = request.contract.address();
        let planned = reconstruct_messages(
            request.order.as_ref(),
            own_address,
            &request.comment,
            request.state_init.as_ref(),
        )?;

        let client = &self.client;
        let is_live = || self.is_current(ticket);

        let Some(block) = backoff("last-block", &self.policy, is_live, move || client.last_block()).await? else {
            debug!(ticket = ticket.0, "estimation superseded while loading last block");
            return Ok(None);
        };
        if !is_live() {
            debug!(ticket = ticket.0, "estimation superseded after last block");
            return Ok(None);
        }

        let Some(seqno) = backoff("seqno", &self.policy, is_live, move || client.seqno(block.seqno, own_address)).await?
        else {
            debug!(ticket = ticket.0, "estimation superseded while loading seqno");
            return Ok(None);
        };
        if !is_live() {
            debug!(ticket = ticket.0, "estimation superseded after seqno");
            return Ok(None);
        }

        let mut storage = Vec::with_capacity(planned.accounts.len());
        for address in &planned.accounts {
            let account = backoff("account", &self.policy, is_live, move || client.account(block.seqno, address)).await?;
            let Some(account) = account.filter(|_| is_live()) else {
                debug!(ticket = ticket.0, "estimation superseded while loading accounts");
                return Ok(None);
            };
            storage.push(account.storage_stat);
        }

        let estimate = estimate_fee(&EstimateInput {
            contract: &request.contract,
            transfer: &planned,
            seqno,
            config: &request.config,
            storage: &storage,
            now: block.utime,
        })?;

        if !is_live() {
            debug!(ticket = ticket.0, "estimation superseded, result dropped");
            return Ok(None);
        }
        self.latest.send_replace(Some(estimate));
        debug!(ticket = ticket.0, seqno, total = estimate.total(), "fee estimate updated");
        Ok(Some(estimate))
    }

    /// Supersede earlier requests and estimate `request`.
    pub async fn estimate(&self, request: EstimationRequest) -> FeeResult<Option<FeeEstimate>> {
        let ticket = self.begin();
        self.run(ticket, request).await
    }

    /// Receiver of every published estimate.
    pub fn subscribe(&self) -> watch::Receiver<Option<FeeEstimate>> {
        self.latest.subscribe()
    }

    /// Most recently published estimate.
    pub fn latest(&self) -> Option<FeeEstimate> {
        *self.latest.borrow()
    }
}
