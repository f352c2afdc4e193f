//! Wallet V5R1 (W5)
//!
//! Signed external request layout:
//!
//! ```text
//! op:"sign" wallet_id:int32 valid_until:32 seqno:32
//! out_actions:(Maybe ^OutList) has_other_actions:1 signature:512
//! ```
//!
//! Unlike V4 the signature trails the signed data.

use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, MsgAddress};

use crate::error::WalletResult;
use crate::message::{InternalMessage, StateInit};
use crate::transfer::{SendMode, TransferRequest};
use crate::version::WalletVersion;
use crate::wallet::{check_message_count, expiry_for, public_key_bytes, Wallet, PLACEHOLDER_SIGNATURE};
use crate::wallet_id::WalletIdV5;

/// `signed_external` request op ("sign" in ASCII).
pub const OP_AUTH_SIGNED_EXTERNAL: u32 = 0x7369676e;

/// `action_send_msg` tag.
pub const ACTION_SEND_MSG: u32 = 0x0ec3c86d;

/// Wallet V5 revision 1
#[derive(Debug, Clone)]
pub struct WalletV5R1 {
    public_key: [u8; 32],
    wallet_id: WalletIdV5,
    wallet_id_value: i32,
    init: StateInit,
    address: MsgAddress,
}

impl WalletV5R1 {
    /// Create the wallet; the workchain comes from the wallet ID context.
    pub fn new(public_key: &[u8], wallet_id: WalletIdV5, code: Arc<Cell>) -> WalletResult<Self> {
        let public_key = public_key_bytes(public_key)?;
        let wallet_id_value = wallet_id.serialize()?;

        // Data: is_signature_allowed:1 seqno:32 wallet_id:int32 public_key:256 extensions:(HashmapE 256 int1)
        let mut data = CellBuilder::new();
        data.store_bit(true)?;
        data.store_u32(0)?;
        data.store_i32(wallet_id_value)?;
        data.store_bytes(&public_key)?;
        data.store_bit(false)?;
        let init = StateInit::new(code, Arc::new(data.build()?));
        let address = init.address(wallet_id.workchain())?;

        Ok(Self {
            public_key,
            wallet_id,
            wallet_id_value,
            init,
            address,
        })
    }

    pub fn wallet_id(&self) -> &WalletIdV5 {
        &self.wallet_id
    }

    /// The serialized wallet ID stored in the contract data.
    pub fn wallet_id_value(&self) -> i32 {
        self.wallet_id_value
    }

    /// Pack send-message actions into an `OutList`.
    ///
    /// Each node is `prev:^OutList action_send_msg#0ec3c86d mode:8 out_msg:^MessageRelaxed`,
    /// starting from the empty cell, so the first message ends up deepest and is
    /// executed first.
    fn out_list(messages: &[InternalMessage], mode: SendMode) -> WalletResult<Cell> {
        let mut list = Cell::empty();
        for message in messages {
            let mut node = CellBuilder::new();
            node.store_ref(Arc::new(list))?;
            node.store_u32(ACTION_SEND_MSG)?;
            node.store_u8(mode.bits())?;
            node.store_ref(Arc::new(message.to_cell()?))?;
            list = node.build()?;
        }
        Ok(list)
    }
}

impl Wallet for WalletV5R1 {
    fn version(&self) -> WalletVersion {
        WalletVersion::V5R1
    }

    fn address(&self) -> &MsgAddress {
        &self.address
    }

    fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    fn workchain(&self) -> i32 {
        self.wallet_id.workchain()
    }

    fn state_init(&self) -> &StateInit {
        &self.init
    }

    fn create_transfer(&self, request: &TransferRequest) -> WalletResult<Cell> {
        check_message_count(WalletVersion::V5R1, request)?;

        let actions = Self::out_list(&request.messages, request.send_mode)?;

        let mut builder = CellBuilder::new();
        builder.store_u32(OP_AUTH_SIGNED_EXTERNAL)?;
        builder.store_i32(self.wallet_id_value)?;
        builder.store_u32(expiry_for(request))?;
        builder.store_u32(request.seqno)?;
        builder.store_maybe_ref(Some(Arc::new(actions)))?;
        builder.store_bit(false)?; // no extended actions
        builder.store_bytes(&PLACEHOLDER_SIGNATURE)?;

        Ok(builder.build()?)
    }
}
