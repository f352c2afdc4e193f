//! TEP-74 jetton transfer body.
//!
//! ```text
//! transfer#0f8a7ea5 query_id:uint64 amount:(VarUInteger 16) destination:MsgAddress
//!                   response_destination:MsgAddress custom_payload:(Maybe ^Cell)
//!                   forward_ton_amount:(VarUInteger 16) forward_payload:(Either Cell ^Cell)
//!                   = InternalMsgBody;
//! ```

use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, CellSlice, MsgAddress};

use crate::error::{OrderError, OrderResult};

/// Transfer tokens to another owner.
pub const OP_TRANSFER: u32 = 0x0f8a7ea5;

/// Parameters of a jetton `transfer` message sent to the sender's jetton wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JettonTransfer {
    pub query_id: u64,
    /// Token amount in the jetton's smallest units.
    pub amount: u128,
    /// New owner of the tokens (not their jetton wallet).
    pub destination: MsgAddress,
    /// Receives the excess TON.
    pub response_destination: MsgAddress,
    pub custom_payload: Option<Arc<Cell>>,
    /// TON forwarded to the destination with the transfer notification.
    pub forward_ton_amount: u128,
    pub forward_payload: Option<Arc<Cell>>,
}

impl JettonTransfer {
    /// Read a transfer body back, e.g. to show what a payload does.
    pub fn from_cell(cell: &Cell) -> OrderResult<Self> {
        let mut slice = CellSlice::new(cell);
        let op = slice.load_u32()?;
        if op != OP_TRANSFER {
            return Err(OrderError::UnsupportedPayload(format!("op 0x{:08x}", op)));
        }
        let query_id = slice.load_u64()?;
        let amount = slice.load_coins()?;
        let destination = slice.load_address()?;
        let response_destination = slice.load_address()?;
        let custom_payload = slice.load_maybe_ref()?.cloned();
        let forward_ton_amount = slice.load_coins()?;
        let forward_payload = slice.load_maybe_ref()?.cloned();
        Ok(Self {
            query_id,
            amount,
            destination,
            response_destination,
            custom_payload,
            forward_ton_amount,
            forward_payload,
        })
    }
}

/// Build the transfer body; the forward payload always goes by reference.
pub fn jetton_transfer_body(transfer: &JettonTransfer) -> OrderResult<Cell> {
    let mut builder = CellBuilder::new();
    builder.store_u32(OP_TRANSFER)?;
    builder.store_u64(transfer.query_id)?;
    builder.store_coins(transfer.amount)?;
    builder.store_address(&transfer.destination)?;
    builder.store_address(&transfer.response_destination)?;
    builder.store_maybe_ref(transfer.custom_payload.clone())?;
    builder.store_coins(transfer.forward_ton_amount)?;
    builder.store_maybe_ref(transfer.forward_payload.clone())?;
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ton_wallet::comment;

    fn transfer() -> JettonTransfer {
        JettonTransfer {
            query_id: 0,
            amount: 1_000_000,
            destination: MsgAddress::Internal {
                workchain: 0,
                address: [0x34; 32],
            },
            response_destination: MsgAddress::Internal {
                workchain: 0,
                address: [0x12; 32],
            },
            custom_payload: None,
            forward_ton_amount: 1,
            forward_payload: Some(Arc::new(comment("Payment").unwrap())),
        }
    }

    #[test]
    fn test_transfer_body_layout() {
        let body = jetton_transfer_body(&transfer()).unwrap();
        let mut slice = CellSlice::new(&body);
        assert_eq!(slice.load_u32().unwrap(), OP_TRANSFER);
        assert_eq!(slice.load_u64().unwrap(), 0);
        assert_eq!(slice.load_coins().unwrap(), 1_000_000);
        slice.load_address().unwrap();
        slice.load_address().unwrap();
        assert!(!slice.load_bit().unwrap());
        assert_eq!(slice.load_coins().unwrap(), 1);
        assert!(slice.load_bit().unwrap());
        assert!(slice.is_empty());
        assert_eq!(body.reference_count(), 1);
    }

    #[test]
    fn test_from_cell() {
        let original = transfer();
        let body = jetton_transfer_body(&original).unwrap();
        assert_eq!(JettonTransfer::from_cell(&body).unwrap(), original);

        let not_transfer = comment("hi").unwrap();
        assert!(matches!(
            JettonTransfer::from_cell(&not_transfer),
            Err(OrderError::UnsupportedPayload(_))
        ));
    }
}
