//! Build an [`Order`] from transfer form input.
//!
//! The builder never fails loudly: anything that keeps the form from being
//! ready (bad address, bad amount, missing memo) yields `None`, and the
//! validators in [`crate::validate`] explain why.

use std::sync::Arc;

use tracing::{debug, warn};

use ton_cell::{Cell, MsgAddress, FRIENDLY_ADDRESS_LEN};

use crate::amount::{parse_amount, NATIVE_DECIMALS};
use crate::error::OrderResult;
use crate::known::KnownWallet;
use crate::order::{
    create_jetton_order, create_ledger_jetton_order, create_simple_ledger_order, create_simple_order, AppInfo,
    JettonOrderArgs, Order, SimpleOrderArgs,
};

/// Asset being transferred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Asset {
    #[default]
    Native,
    /// A jetton, addressed through the sender's jetton wallet.
    Jetton { wallet: MsgAddress, decimals: u32 },
}

impl Asset {
    pub fn decimals(&self) -> u32 {
        match self {
            Asset::Native => NATIVE_DECIMALS,
            Asset::Jetton { decimals, .. } => *decimals,
        }
    }

    pub fn is_jetton(&self) -> bool {
        matches!(self, Asset::Jetton { .. })
    }
}

/// TON attached to jetton transfers, in nanocoins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JettonFees {
    /// Base amount for a plain jetton transfer.
    pub transfer_fee: u128,
    /// Base amount when a custom payload or state init travels along.
    pub transfer_fee_with_payload: u128,
    /// TON forwarded to the recipient with the notification.
    pub forward_amount: u128,
    /// Fee estimate assumed before the first estimation finished.
    pub default_estimate: u128,
}

impl Default for JettonFees {
    fn default() -> Self {
        Self {
            transfer_fee: 50_000_000,
            transfer_fee_with_payload: 100_000_000,
            forward_amount: 1,
            default_estimate: 100_000_000,
        }
    }
}

/// Everything the builder reads from the transfer form and account.
#[derive(Debug, Clone, Default)]
pub struct OrderInput {
    /// Friendly target address as typed or resolved.
    pub target: String,
    /// DNS domain the target was resolved from.
    pub domain: Option<String>,
    /// Amount as typed.
    pub amount: String,
    pub comment: String,
    pub asset: Asset,
    /// Native balance of the sending account, when known.
    pub balance: Option<u128>,
    /// Sender address; receives jetton excesses.
    pub own_address: MsgAddress,
    /// Sign on a Ledger device.
    pub ledger: bool,
    /// Known wallet entry of the target, if any.
    pub known: Option<KnownWallet>,
    /// Latest fee estimate.
    pub estimate: Option<u128>,
    /// Explicit TON amount for jetton transfers.
    pub fee_amount: Option<u128>,
    /// Explicit forward amount for jetton transfers.
    pub forward_amount: Option<u128>,
    /// Explicit message payload; replaces the comment.
    pub payload: Option<Arc<Cell>>,
    pub state_init: Option<Arc<Cell>>,
    pub jetton_custom_payload: Option<Arc<Cell>>,
    pub jetton_state_init: Option<Arc<Cell>>,
    pub app: Option<AppInfo>,
    pub testnet: bool,
    pub fees: JettonFees,
}

/// Whether `target` is a well-formed friendly address.
pub fn is_valid_target(target: &str) -> bool {
    target.len() <= FRIENDLY_ADDRESS_LEN && MsgAddress::parse_friendly(target).is_ok()
}

/// Build the order described by `input`, or `None` while the form is not ready.
pub fn build_order(input: &OrderInput) -> Option<Order> {
    let Some(amount) = parse_amount(&input.amount, input.asset.decimals()) else {
        debug!(amount = %input.amount, "order not ready: invalid amount");
        return None;
    };

    if !is_valid_target(&input.target) {
        debug!(target = %input.target, "order not ready: invalid target address");
        return None;
    }

    if input.known.as_ref().is_some_and(|k| k.require_memo) && input.comment.is_empty() {
        debug!(target = %input.target, "order not ready: memo required");
        return None;
    }

    match assemble(input, amount) {
        Ok(order) => Some(order),
        Err(err) => {
            warn!(%err, "failed to assemble order");
            None
        }
    }
}

fn assemble(input: &OrderInput, amount: u128) -> OrderResult<Order> {
    let estimate = input.estimate.unwrap_or(input.fees.default_estimate);
    let text = Some(input.comment.clone());
    // Sending exactly the balance switches to the carry-all send mode.
    let send_all = !input.asset.is_jetton() && input.balance == Some(amount);
    let native_amount = if send_all { 0 } else { amount };

    match (&input.asset, input.ledger) {
        (Asset::Jetton { wallet, .. }, true) => create_ledger_jetton_order(JettonOrderArgs {
            wallet: wallet.clone(),
            target: input.target.clone(),
            domain: input.domain.clone(),
            response_target: input.own_address.clone(),
            text,
            amount,
            ton_amount: input.fees.forward_amount,
            tx_amount: input.fees.transfer_fee + estimate,
            custom_payload: None,
            payload: None,
            state_init: None,
            testnet: input.testnet,
        }),
        (Asset::Jetton { wallet, .. }, false) => {
            let base = if input.jetton_custom_payload.is_some() || input.jetton_state_init.is_some() {
                input.fees.transfer_fee_with_payload
            } else {
                input.fees.transfer_fee
            };
            create_jetton_order(JettonOrderArgs {
                wallet: wallet.clone(),
                target: input.target.clone(),
                domain: input.domain.clone(),
                response_target: input.own_address.clone(),
                text,
                amount,
                ton_amount: input.forward_amount.unwrap_or(input.fees.forward_amount),
                tx_amount: input.fee_amount.unwrap_or(base + estimate),
                custom_payload: input.jetton_custom_payload.clone(),
                payload: input.payload.clone(),
                state_init: input.jetton_state_init.clone(),
                testnet: input.testnet,
            })
        }
        (Asset::Native, true) => Ok(create_simple_ledger_order(SimpleOrderArgs {
            target: input.target.clone(),
            domain: input.domain.clone(),
            text,
            amount: native_amount,
            amount_all: send_all,
            payload: None,
            state_init: input.state_init.clone(),
            app: None,
        })),
        (Asset::Native, false) => create_simple_order(SimpleOrderArgs {
            target: input.target.clone(),
            domain: input.domain.clone(),
            text,
            amount: native_amount,
            amount_all: send_all,
            payload: input.payload.clone(),
            state_init: input.state_init.clone(),
            app: input.app.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jetton::JettonTransfer;
    use crate::ledger::LedgerPayload;

    const TARGET: &str = "EQCt2mgAsbnGFKRhlLjiJvScCYbe4lqEHRMvIs-IR7T-1J6p";

    fn input(amount: &str) -> OrderInput {
        OrderInput {
            target: TARGET.into(),
            amount: amount.into(),
            ..Default::default()
        }
    }

    fn jetton_asset() -> Asset {
        Asset::Jetton {
            wallet: MsgAddress::Internal {
                workchain: 0,
                address: [0x44; 32],
            },
            decimals: 6,
        }
    }

    #[test]
    fn test_simple_order_scenario() {
        let order = build_order(&input("10.5")).unwrap();
        let Order::Simple(inner) = &order else {
            panic!("expected simple order");
        };
        assert_eq!(inner.messages.len(), 1);
        let message = &inner.messages[0];
        assert_eq!(message.amount, 10_500_000_000);
        assert!(!message.amount_all);
        assert_eq!(message.target, TARGET);
        assert!(message.payload.is_none());
    }

    #[test]
    fn test_send_all_zeroes_amount() {
        let mut form = input("2,5");
        form.balance = Some(2_500_000_000);
        let order = build_order(&form).unwrap();
        let message = &order.messages().unwrap()[0];
        assert!(message.amount_all);
        assert_eq!(message.amount, 0);

        form.balance = Some(3_000_000_000);
        let message = &build_order(&form).unwrap().messages().unwrap()[0];
        assert!(!message.amount_all);
        assert_eq!(message.amount, 2_500_000_000);
    }

    #[test]
    fn test_never_amount_and_flag_together() {
        for (amount, balance) in [("1", 1_000_000_000u128), ("0.5", 1_000_000_000), ("0", 0)] {
            let mut form = input(amount);
            form.balance = Some(balance);
            for message in build_order(&form).unwrap().messages().unwrap() {
                assert!(!(message.amount_all && message.amount != 0));
            }
        }
    }

    #[test]
    fn test_invalid_targets() {
        let mut too_long = input("1");
        too_long.target = format!("{}A", TARGET);
        assert!(build_order(&too_long).is_none());

        let mut corrupted = input("1");
        corrupted.target = TARGET.replacen('t', "u", 1);
        assert!(build_order(&corrupted).is_none());

        let mut raw = input("1");
        raw.target = MsgAddress::from_string(TARGET).unwrap().to_raw_string();
        assert!(build_order(&raw).is_none());

        for amount in ["1", "", "-1", "abc"] {
            let mut form = input(amount);
            form.target = "EQ-not-an-address".into();
            assert!(build_order(&form).is_none());
        }
    }

    #[test]
    fn test_invalid_amount() {
        assert!(build_order(&input("")).is_none());
        assert!(build_order(&input("1.2.3")).is_none());
        assert!(build_order(&input("-3")).is_none());
    }

    #[test]
    fn test_memo_gate() {
        let mut form = input("1");
        form.known = Some(KnownWallet {
            name: "Exchange".into(),
            require_memo: true,
        });
        assert!(build_order(&form).is_none());

        form.comment = "12345".into();
        assert!(build_order(&form).is_some());

        form.comment.clear();
        form.known = Some(KnownWallet {
            name: "Pool".into(),
            require_memo: false,
        });
        assert!(build_order(&form).is_some());
    }

    #[test]
    fn test_jetton_fee_defaults() {
        let mut form = input("1.5");
        form.asset = jetton_asset();
        form.own_address = MsgAddress::Internal {
            workchain: 0,
            address: [0x55; 32],
        };

        let order = build_order(&form).unwrap();
        assert!(matches!(order, Order::Jetton(_)));
        let message = &order.messages().unwrap()[0];
        // 0.05 TON + default 0.1 TON estimate
        assert_eq!(message.amount, 150_000_000);
        let transfer = JettonTransfer::from_cell(message.payload.as_ref().unwrap()).unwrap();
        assert_eq!(transfer.amount, 1_500_000);
        assert_eq!(transfer.forward_ton_amount, 1);
        assert_eq!(transfer.response_destination, form.own_address);

        form.estimate = Some(7);
        form.jetton_custom_payload = Some(Arc::new(Cell::empty()));
        let message = &build_order(&form).unwrap().messages().unwrap()[0];
        assert_eq!(message.amount, 100_000_007);

        form.fee_amount = Some(42);
        form.forward_amount = Some(9);
        let message = &build_order(&form).unwrap().messages().unwrap()[0];
        assert_eq!(message.amount, 42);
        let transfer = JettonTransfer::from_cell(message.payload.as_ref().unwrap()).unwrap();
        assert_eq!(transfer.forward_ton_amount, 9);
    }

    #[test]
    fn test_jetton_never_sends_all() {
        let mut form = input("1");
        form.asset = jetton_asset();
        form.balance = Some(1_000_000);
        let order = build_order(&form).unwrap();
        assert!(!order.is_amount_all());
    }

    #[test]
    fn test_ledger_orders() {
        let mut form = input("1");
        form.ledger = true;
        form.comment = "hi".into();
        form.balance = Some(1_000_000_000);
        let order = build_order(&form).unwrap();
        let Order::LedgerSimple(inner) = &order else {
            panic!("expected ledger order");
        };
        assert!(inner.amount_all);
        assert_eq!(inner.amount, 0);
        assert_eq!(inner.payload, Some(LedgerPayload::Comment { text: "hi".into() }));

        form.asset = jetton_asset();
        let order = build_order(&form).unwrap();
        let Order::LedgerJetton(inner) = &order else {
            panic!("expected ledger jetton order");
        };
        assert_eq!(inner.amount, 150_000_000);
        assert!(matches!(inner.payload, Some(LedgerPayload::Unsafe { .. })));
    }
}
