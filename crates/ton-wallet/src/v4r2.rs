//! Wallet V4R2

use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, MsgAddress};

use crate::error::WalletResult;
use crate::message::StateInit;
use crate::transfer::TransferRequest;
use crate::version::WalletVersion;
use crate::wallet::{check_message_count, expiry_for, public_key_bytes, Wallet, PLACEHOLDER_SIGNATURE};

/// Default subwallet id; the workchain is added to it.
pub const DEFAULT_SUBWALLET_ID: u32 = 698983191;

/// Wallet V4 revision 2
#[derive(Debug, Clone)]
pub struct WalletV4R2 {
    public_key: [u8; 32],
    workchain: i32,
    subwallet_id: u32,
    init: StateInit,
    address: MsgAddress,
}

impl WalletV4R2 {
    /// Create wallet with the default subwallet id for `workchain`.
    pub fn new(public_key: &[u8], workchain: i32, code: Arc<Cell>) -> WalletResult<Self> {
        let subwallet_id = DEFAULT_SUBWALLET_ID.wrapping_add(workchain as u32);
        Self::with_subwallet(public_key, workchain, subwallet_id, code)
    }

    /// Create wallet with custom subwallet ID
    pub fn with_subwallet(
        public_key: &[u8],
        workchain: i32,
        subwallet_id: u32,
        code: Arc<Cell>,
    ) -> WalletResult<Self> {
        let public_key = public_key_bytes(public_key)?;

        // Data: seqno:32 subwallet_id:32 public_key:256 plugins:(HashmapE 267 ...)
        let mut data = CellBuilder::new();
        data.store_u32(0)?;
        data.store_u32(subwallet_id)?;
        data.store_bytes(&public_key)?;
        data.store_bit(false)?;
        let init = StateInit::new(code, Arc::new(data.build()?));
        let address = init.address(workchain)?;

        Ok(Self {
            public_key,
            workchain,
            subwallet_id,
            init,
            address,
        })
    }

    pub fn subwallet_id(&self) -> u32 {
        self.subwallet_id
    }
}

impl Wallet for WalletV4R2 {
    fn version(&self) -> WalletVersion {
        WalletVersion::V4R2
    }

    fn address(&self) -> &MsgAddress {
        &self.address
    }

    fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    fn workchain(&self) -> i32 {
        self.workchain
    }

    fn state_init(&self) -> &StateInit {
        &self.init
    }

    fn create_transfer(&self, request: &TransferRequest) -> WalletResult<Cell> {
        check_message_count(WalletVersion::V4R2, request)?;

        // signature:512 subwallet_id:32 valid_until:32 seqno:32 op:8 (mode:8 ^message)*
        let mut builder = CellBuilder::new();
        builder.store_bytes(&PLACEHOLDER_SIGNATURE)?;
        builder.store_u32(self.subwallet_id)?;
        builder.store_u32(expiry_for(request))?;
        builder.store_u32(request.seqno)?;
        builder.store_u8(0)?; // simple send

        for message in &request.messages {
            builder.store_u8(request.send_mode.bits())?;
            builder.store_ref(Arc::new(message.to_cell()?))?;
        }

        Ok(builder.build()?)
    }
}
