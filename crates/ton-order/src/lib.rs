//! Transfer order building for TON wallets
//!
//! This crate turns transfer form input into orders:
//!
//! - **amount**: decimal amount parsing with `,`/`.` separators
//! - **order**: the [`Order`] model and its constructors
//! - **jetton**: TEP-74 transfer bodies
//! - **ledger**: Ledger payload descriptors
//! - **known**: registry of well-known wallets and their memo policy
//! - **builder**: [`build_order`], which returns `None` until the form is ready
//! - **validate**: inline issues and pre-send warnings
//! - **form**: form state and its reducer
//!
//! # Example
//!
//! ```
//! use ton_order::{build_order, Order, OrderInput};
//!
//! let input = OrderInput {
//!     target: "EQCt2mgAsbnGFKRhlLjiJvScCYbe4lqEHRMvIs-IR7T-1J6p".into(),
//!     amount: "1,5".into(),
//!     ..Default::default()
//! };
//! let order = build_order(&input).unwrap();
//! assert!(matches!(order, Order::Simple(_)));
//! assert_eq!(order.messages().unwrap()[0].amount, 1_500_000_000);
//! ```

pub mod amount;
pub mod builder;
pub mod error;
pub mod form;
pub mod jetton;
pub mod known;
pub mod ledger;
pub mod order;
pub mod validate;

pub use amount::{format_amount, parse_amount, NATIVE_DECIMALS};
pub use builder::{build_order, is_valid_target, Asset, JettonFees, OrderInput};
pub use error::{OrderError, OrderResult};
pub use form::{reduce, FormAction, TransferForm};
pub use jetton::{jetton_transfer_body, JettonTransfer, OP_TRANSFER};
pub use known::{KnownWallet, KnownWallets};
pub use ledger::{resolve_ledger_payload, LedgerPayload};
pub use order::{
    create_jetton_order, create_ledger_jetton_order, create_order, create_simple_ledger_order, create_simple_order,
    AppInfo, JettonOrderArgs, LedgerOrder, MessageOrder, Order, OrderMessage, SimpleOrderArgs,
};
pub use validate::{amount_issue, memo_issue, pre_send_check, self_transfer_warning, AmountIssue, MemoIssue, TransferWarning};
