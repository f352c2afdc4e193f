//! Payload descriptors for transfers signed on a Ledger device.
//!
//! The device shows structured payloads to the user, so Ledger orders carry a
//! descriptor instead of a finished body. Kinds this crate cannot encode are
//! rejected with an error: dropping the payload would turn the request into a
//! plain transfer.

use std::sync::Arc;

use ton_cell::{Cell, MsgAddress};
use ton_wallet::comment;

use crate::error::{OrderError, OrderResult};
use crate::jetton::{jetton_transfer_body, JettonTransfer};

/// Payload of a Ledger transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerPayload {
    /// Text comment.
    Comment { text: String },
    /// TEP-74 jetton transfer.
    JettonTransfer(JettonTransfer),
    /// Raw body shown as blind-signed data.
    Unsafe { message: Arc<Cell> },
    /// TEP-62 NFT transfer.
    NftTransfer {
        query_id: u64,
        new_owner: MsgAddress,
        response_destination: MsgAddress,
        forward_amount: u128,
    },
}

impl LedgerPayload {
    /// Kind name as used by the device transport.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerPayload::Comment { .. } => "comment",
            LedgerPayload::JettonTransfer(_) => "jetton-transfer",
            LedgerPayload::Unsafe { .. } => "unsafe",
            LedgerPayload::NftTransfer { .. } => "nft-transfer",
        }
    }
}

/// Turn a descriptor into the body cell the wallet will send.
pub fn resolve_ledger_payload(payload: &LedgerPayload) -> OrderResult<Cell> {
    match payload {
        LedgerPayload::Comment { text } => Ok(comment(text)?),
        LedgerPayload::JettonTransfer(transfer) => jetton_transfer_body(transfer),
        LedgerPayload::Unsafe { message } => Ok(message.as_ref().clone()),
        LedgerPayload::NftTransfer { .. } => Err(OrderError::UnsupportedPayload(payload.kind().to_string())),
    }
}
