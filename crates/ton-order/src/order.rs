//! Transfer orders and their constructors.
//!
//! An [`Order`] describes what the wallet should send. Local orders carry
//! ready message bodies; Ledger orders carry a [`LedgerPayload`] descriptor
//! which the device flow turns into a body itself.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ton_cell::{Cell, MsgAddress};
use ton_wallet::comment;

use crate::error::{OrderError, OrderResult};
use crate::jetton::{jetton_transfer_body, JettonTransfer};
use crate::ledger::{resolve_ledger_payload, LedgerPayload};

/// dApp that requested the transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub domain: String,
    pub title: String,
}

/// One outbound message of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMessage {
    /// Friendly destination address, parsed when the message is encoded.
    pub target: String,
    /// Value in nanocoins; zero when `amount_all` is set.
    pub amount: u128,
    /// Send the whole balance through the send mode.
    pub amount_all: bool,
    pub payload: Option<Arc<Cell>>,
    pub state_init: Option<Arc<Cell>>,
}

/// Order with finished message bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOrder {
    pub domain: Option<String>,
    pub messages: Vec<OrderMessage>,
    pub app: Option<AppInfo>,
}

impl MessageOrder {
    /// Multi-message order, e.g. a dApp request.
    pub fn from_messages(messages: Vec<OrderMessage>, domain: Option<String>, app: Option<AppInfo>) -> Self {
        Self { domain, messages, app }
    }
}

/// Single-message order signed on a Ledger device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerOrder {
    pub target: String,
    pub domain: Option<String>,
    pub amount: u128,
    pub amount_all: bool,
    pub payload: Option<LedgerPayload>,
    pub state_init: Option<Arc<Cell>>,
    pub app: Option<AppInfo>,
}

/// A transfer ready for estimation and signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    Simple(MessageOrder),
    Jetton(MessageOrder),
    LedgerSimple(LedgerOrder),
    LedgerJetton(LedgerOrder),
}

impl Order {
    /// Outbound messages with Ledger payloads resolved into bodies.
    pub fn messages(&self) -> OrderResult<Vec<OrderMessage>> {
        match self {
            Order::Simple(order) | Order::Jetton(order) => Ok(order.messages.clone()),
            Order::LedgerSimple(order) | Order::LedgerJetton(order) => {
                let payload = order
                    .payload
                    .as_ref()
                    .map(resolve_ledger_payload)
                    .transpose()?
                    .map(Arc::new);
                Ok(vec![OrderMessage {
                    target: order.target.clone(),
                    amount: order.amount,
                    amount_all: order.amount_all,
                    payload,
                    state_init: order.state_init.clone(),
                }])
            }
        }
    }

    pub fn message_count(&self) -> usize {
        match self {
            Order::Simple(order) | Order::Jetton(order) => order.messages.len(),
            Order::LedgerSimple(_) | Order::LedgerJetton(_) => 1,
        }
    }

    pub fn domain(&self) -> Option<&str> {
        match self {
            Order::Simple(order) | Order::Jetton(order) => order.domain.as_deref(),
            Order::LedgerSimple(order) | Order::LedgerJetton(order) => order.domain.as_deref(),
        }
    }

    pub fn app(&self) -> Option<&AppInfo> {
        match self {
            Order::Simple(order) | Order::Jetton(order) => order.app.as_ref(),
            Order::LedgerSimple(order) | Order::LedgerJetton(order) => order.app.as_ref(),
        }
    }

    /// Whether any message sends the full balance.
    pub fn is_amount_all(&self) -> bool {
        match self {
            Order::Simple(order) | Order::Jetton(order) => order.messages.iter().any(|m| m.amount_all),
            Order::LedgerSimple(order) | Order::LedgerJetton(order) => order.amount_all,
        }
    }

    pub fn is_ledger(&self) -> bool {
        matches!(self, Order::LedgerSimple(_) | Order::LedgerJetton(_))
    }
}

/// Arguments of a plain coin transfer.
#[derive(Debug, Clone, Default)]
pub struct SimpleOrderArgs {
    pub target: String,
    pub domain: Option<String>,
    /// Comment used when no explicit payload is given.
    pub text: Option<String>,
    pub amount: u128,
    pub amount_all: bool,
    pub payload: Option<Arc<Cell>>,
    pub state_init: Option<Arc<Cell>>,
    pub app: Option<AppInfo>,
}

/// Arguments of a jetton transfer.
#[derive(Debug, Clone)]
pub struct JettonOrderArgs {
    /// Sender's jetton wallet; the message goes here.
    pub wallet: MsgAddress,
    /// Friendly address of the token recipient.
    pub target: String,
    pub domain: Option<String>,
    pub response_target: MsgAddress,
    pub text: Option<String>,
    /// Token amount.
    pub amount: u128,
    /// TON forwarded with the transfer notification.
    pub ton_amount: u128,
    /// TON attached to the message for the jetton wallet's fees.
    pub tx_amount: u128,
    pub custom_payload: Option<Arc<Cell>>,
    /// Forward payload; overrides `text`.
    pub payload: Option<Arc<Cell>>,
    /// State init of the jetton wallet, for wallets not deployed yet.
    pub state_init: Option<Arc<Cell>>,
    pub testnet: bool,
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.is_empty())
}

fn payload_or_comment(payload: &Option<Arc<Cell>>, text: &Option<String>) -> OrderResult<Option<Arc<Cell>>> {
    if let Some(payload) = payload {
        return Ok(Some(payload.clone()));
    }
    match non_empty(text) {
        Some(text) => Ok(Some(Arc::new(comment(text)?))),
        None => Ok(None),
    }
}

fn jetton_body(args: &JettonOrderArgs, forward_payload: Option<Arc<Cell>>) -> OrderResult<Cell> {
    let destination = MsgAddress::from_string(&args.target)
        .map_err(|e| OrderError::InvalidAddress(format!("{}: {}", args.target, e)))?;
    jetton_transfer_body(&JettonTransfer {
        query_id: 0,
        amount: args.amount,
        destination,
        response_destination: args.response_target.clone(),
        custom_payload: args.custom_payload.clone(),
        forward_ton_amount: args.ton_amount,
        forward_payload,
    })
}

fn jetton_wallet_target(args: &JettonOrderArgs) -> OrderResult<String> {
    args.wallet
        .to_user_friendly(true, args.testnet)
        .ok_or_else(|| OrderError::InvalidAddress(format!("jetton wallet {}", args.wallet)))
}

/// Single-message order from explicit parts.
pub fn create_order(message: OrderMessage, domain: Option<String>, app: Option<AppInfo>) -> MessageOrder {
    MessageOrder {
        domain,
        messages: vec![message],
        app,
    }
}

/// Plain transfer; `text` becomes a comment when no payload is given.
pub fn create_simple_order(args: SimpleOrderArgs) -> OrderResult<Order> {
    let payload = payload_or_comment(&args.payload, &args.text)?;
    Ok(Order::Simple(create_order(
        OrderMessage {
            target: args.target,
            amount: args.amount,
            amount_all: args.amount_all,
            payload,
            state_init: args.state_init,
        },
        args.domain,
        args.app,
    )))
}

/// Jetton transfer addressed to the sender's jetton wallet.
pub fn create_jetton_order(args: JettonOrderArgs) -> OrderResult<Order> {
    let forward_payload = payload_or_comment(&args.payload, &args.text)?;
    let body = jetton_body(&args, forward_payload)?;
    Ok(Order::Jetton(create_order(
        OrderMessage {
            target: jetton_wallet_target(&args)?,
            amount: args.tx_amount,
            amount_all: false,
            payload: Some(Arc::new(body)),
            state_init: args.state_init,
        },
        args.domain,
        None,
    )))
}

/// Plain transfer for Ledger: payloads are blind-signed, text is a comment.
pub fn create_simple_ledger_order(args: SimpleOrderArgs) -> Order {
    let payload = match (&args.payload, non_empty(&args.text)) {
        (Some(message), _) => Some(LedgerPayload::Unsafe {
            message: message.clone(),
        }),
        (None, Some(text)) => Some(LedgerPayload::Comment { text: text.to_string() }),
        (None, None) => None,
    };
    Order::LedgerSimple(LedgerOrder {
        target: args.target,
        domain: args.domain,
        amount: args.amount,
        amount_all: args.amount_all,
        payload,
        state_init: args.state_init,
        app: args.app,
    })
}

/// Jetton transfer for Ledger, shipped as an unsafe payload.
pub fn create_ledger_jetton_order(args: JettonOrderArgs) -> OrderResult<Order> {
    let forward_payload = payload_or_comment(&args.payload, &args.text)?;
    let body = jetton_body(&args, forward_payload)?;
    Ok(Order::LedgerJetton(LedgerOrder {
        target: jetton_wallet_target(&args)?,
        domain: args.domain,
        amount: args.tx_amount,
        amount_all: false,
        payload: Some(LedgerPayload::Unsafe {
            message: Arc::new(body),
        }),
        state_init: None,
        app: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ton_cell::CellSlice;
    use ton_wallet::read_comment;

    const TARGET: &str = "EQCt2mgAsbnGFKRhlLjiJvScCYbe4lqEHRMvIs-IR7T-1J6p";

    fn jetton_args() -> JettonOrderArgs {
        JettonOrderArgs {
            wallet: MsgAddress::Internal {
                workchain: 0,
                address: [0x11; 32],
            },
            target: TARGET.to_string(),
            domain: None,
            response_target: MsgAddress::Internal {
                workchain: 0,
                address: [0x22; 32],
            },
            text: Some("thanks".into()),
            amount: 42,
            ton_amount: 1,
            tx_amount: 150_000_000,
            custom_payload: None,
            payload: None,
            state_init: None,
            testnet: false,
        }
    }

    #[test]
    fn test_simple_order_comment() {
        let order = create_simple_order(SimpleOrderArgs {
            target: TARGET.into(),
            text: Some("hello".into()),
            amount: 5,
            ..Default::default()
        })
        .unwrap();
        let messages = order.messages().unwrap();
        assert_eq!(messages.len(), 1);
        let payload = messages[0].payload.clone().unwrap();
        assert_eq!(read_comment(&payload).as_deref(), Some("hello"));
    }

    #[test]
    fn test_simple_order_empty_text_has_no_payload() {
        let order = create_simple_order(SimpleOrderArgs {
            target: TARGET.into(),
            text: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert!(order.messages().unwrap()[0].payload.is_none());
    }

    #[test]
    fn test_jetton_order_targets_wallet() {
        let args = jetton_args();
        let wallet = args.wallet.clone();
        let order = create_jetton_order(args).unwrap();
        let Order::Jetton(inner) = &order else {
            panic!("expected jetton order");
        };
        let message = &inner.messages[0];
        assert_eq!(message.amount, 150_000_000);
        assert!(!message.amount_all);

        let parsed = MsgAddress::parse_friendly(&message.target).unwrap();
        assert_eq!(parsed.address, wallet);
        assert!(parsed.bounceable);

        let body = message.payload.clone().unwrap();
        let transfer = JettonTransfer::from_cell(&body).unwrap();
        assert_eq!(transfer.amount, 42);
        assert_eq!(transfer.destination, MsgAddress::from_string(TARGET).unwrap());
        let forward = transfer.forward_payload.unwrap();
        assert_eq!(read_comment(&forward).as_deref(), Some("thanks"));
    }

    #[test]
    fn test_jetton_order_testnet_flag() {
        let mut args = jetton_args();
        args.testnet = true;
        let order = create_jetton_order(args).unwrap();
        let target = &order.messages().unwrap()[0].target;
        assert!(MsgAddress::parse_friendly(target).unwrap().testnet);
    }

    #[test]
    fn test_ledger_simple_payload_kinds() {
        let with_text = create_simple_ledger_order(SimpleOrderArgs {
            target: TARGET.into(),
            text: Some("memo".into()),
            ..Default::default()
        });
        let Order::LedgerSimple(order) = &with_text else {
            panic!("expected ledger order");
        };
        assert_eq!(order.payload, Some(LedgerPayload::Comment { text: "memo".into() }));

        let body = Arc::new(comment("raw").unwrap());
        let with_payload = create_simple_ledger_order(SimpleOrderArgs {
            target: TARGET.into(),
            text: Some("ignored".into()),
            payload: Some(body.clone()),
            ..Default::default()
        });
        assert_eq!(with_payload.messages().unwrap()[0].payload, Some(body));
    }

    #[test]
    fn test_ledger_jetton_order() {
        let order = create_ledger_jetton_order(jetton_args()).unwrap();
        assert!(order.is_ledger());
        assert!(!order.is_amount_all());
        let messages = order.messages().unwrap();
        let body = messages[0].payload.clone().unwrap();
        let mut slice = CellSlice::new(&body);
        assert_eq!(slice.load_u32().unwrap(), crate::jetton::OP_TRANSFER);
    }

    #[test]
    fn test_multi_message_order() {
        let message = |amount| OrderMessage {
            target: TARGET.into(),
            amount,
            amount_all: false,
            payload: None,
            state_init: None,
        };
        let order = Order::Simple(MessageOrder::from_messages(
            vec![message(1), message(2)],
            Some("example.ton".into()),
            None,
        ));
        assert_eq!(order.message_count(), 2);
        assert_eq!(order.domain(), Some("example.ton"));
    }

    #[test]
    fn test_invalid_jetton_target() {
        let mut args = jetton_args();
        args.target = "nope".into();
        assert!(matches!(create_jetton_order(args), Err(OrderError::InvalidAddress(_))));
    }
}
