//! Message encoding shared by wallet contracts and the fee estimator.
//!
//! Both [`InternalMessage`] and [`ExternalMessage`] place their state init and
//! body inline when they fit in the root cell and fall back to references
//! otherwise. The fee estimator re-encodes the same messages, so the rule must
//! stay identical on both sides.

use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, CellSlice, MsgAddress, MAX_CELL_BITS, MAX_CELL_REFS};

use crate::error::{WalletError, WalletResult};

/// Comment op code (`text_comment#00000000`).
pub const COMMENT_OP: u32 = 0;

/// `StateInit` of a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateInit {
    pub split_depth: Option<u8>,
    /// `(tick, tock)` flags of special accounts.
    pub special: Option<(bool, bool)>,
    pub code: Option<Arc<Cell>>,
    pub data: Option<Arc<Cell>>,
    pub libraries: Option<Arc<Cell>>,
}

impl StateInit {
    pub fn new(code: Arc<Cell>, data: Arc<Cell>) -> Self {
        Self {
            code: Some(code),
            data: Some(data),
            ..Default::default()
        }
    }

    /// Append the StateInit fields to a builder.
    pub fn store(&self, builder: &mut CellBuilder) -> WalletResult<()> {
        match self.split_depth {
            Some(depth) => {
                builder.store_bit(true)?;
                builder.store_uint(depth as u64, 5)?;
            }
            None => {
                builder.store_bit(false)?;
            }
        }
        match self.special {
            Some((tick, tock)) => {
                builder.store_bit(true)?;
                builder.store_bit(tick)?;
                builder.store_bit(tock)?;
            }
            None => {
                builder.store_bit(false)?;
            }
        }
        builder.store_maybe_ref(self.code.clone())?;
        builder.store_maybe_ref(self.data.clone())?;
        builder.store_maybe_ref(self.libraries.clone())?;
        Ok(())
    }

    pub fn to_cell(&self) -> WalletResult<Cell> {
        let mut builder = CellBuilder::new();
        self.store(&mut builder)?;
        Ok(builder.build()?)
    }

    /// Read a StateInit from the start of a slice.
    pub fn load(slice: &mut CellSlice<'_>) -> WalletResult<Self> {
        let split_depth = if slice.load_bit()? {
            Some(slice.load_uint(5)? as u8)
        } else {
            None
        };
        let special = if slice.load_bit()? {
            Some((slice.load_bit()?, slice.load_bit()?))
        } else {
            None
        };
        let code = slice.load_maybe_ref()?.cloned();
        let data = slice.load_maybe_ref()?.cloned();
        let libraries = slice.load_maybe_ref()?.cloned();
        Ok(Self {
            split_depth,
            special,
            code,
            data,
            libraries,
        })
    }

    /// Parse a standalone StateInit cell; trailing data is rejected.
    pub fn from_cell(cell: &Cell) -> WalletResult<Self> {
        let mut slice = CellSlice::new(cell);
        let init = Self::load(&mut slice)?;
        if !slice.is_empty() || slice.refs_left() != 0 {
            return Err(WalletError::InvalidStateInit(
                "unexpected trailing data after StateInit".to_string(),
            ));
        }
        Ok(init)
    }

    /// Address of the contract deployed by this StateInit.
    pub fn address(&self, workchain: i32) -> WalletResult<MsgAddress> {
        Ok(MsgAddress::Internal {
            workchain,
            address: self.to_cell()?.hash(),
        })
    }
}

/// Relaxed internal message (`MessageRelaxed` with `int_msg_info`).
#[derive(Debug, Clone)]
pub struct InternalMessage {
    pub to: MsgAddress,
    pub value: u128,
    pub bounce: bool,
    pub init: Option<StateInit>,
    pub body: Option<Arc<Cell>>,
}

impl InternalMessage {
    pub fn new(to: MsgAddress, value: u128) -> Self {
        Self {
            to,
            value,
            bounce: true,
            init: None,
            body: None,
        }
    }

    pub fn with_bounce(mut self, bounce: bool) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn with_body(mut self, body: Arc<Cell>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_init(mut self, init: StateInit) -> Self {
        self.init = Some(init);
        self
    }

    pub fn to_cell(&self) -> WalletResult<Cell> {
        let mut builder = CellBuilder::new();

        // int_msg_info$0 ihr_disabled:Bool bounce:Bool bounced:Bool
        builder.store_bit(false)?;
        builder.store_bit(true)?;
        builder.store_bit(self.bounce)?;
        builder.store_bit(false)?;

        // src:addr_none dest value:CurrencyCollection
        builder.store_address(&MsgAddress::Null)?;
        builder.store_address(&self.to)?;
        builder.store_coins(self.value)?;
        builder.store_bit(false)?;

        // ihr_fee fwd_fee created_lt created_at
        builder.store_coins(0)?;
        builder.store_coins(0)?;
        builder.store_u64(0)?;
        builder.store_u32(0)?;

        store_init_and_body(&mut builder, self.init.as_ref(), self.body.as_deref())?;
        Ok(builder.build()?)
    }
}

/// Inbound external message (`ext_in_msg_info`).
#[derive(Debug, Clone)]
pub struct ExternalMessage {
    pub to: MsgAddress,
    pub init: Option<StateInit>,
    pub body: Arc<Cell>,
}

impl ExternalMessage {
    pub fn to_cell(&self) -> WalletResult<Cell> {
        let mut builder = CellBuilder::new();

        // ext_in_msg_info$10 src:addr_none dest import_fee:Coins
        builder.store_uint(0b10, 2)?;
        builder.store_address(&MsgAddress::Null)?;
        builder.store_address(&self.to)?;
        builder.store_coins(0)?;

        store_init_and_body(&mut builder, self.init.as_ref(), Some(&self.body))?;
        Ok(builder.build()?)
    }
}

fn store_init_and_body(
    builder: &mut CellBuilder,
    init: Option<&StateInit>,
    body: Option<&Cell>,
) -> WalletResult<()> {
    let empty = Cell::empty();
    let body = body.unwrap_or(&empty);

    match init {
        Some(init) => {
            builder.store_bit(true)?;
            let init_cell = init.to_cell()?;
            // Two bits stay reserved for the Either flags.
            let init_by_ref = builder.bits_left() < 2 + init_cell.bit_len() + body.bit_len();
            if init_by_ref {
                builder.store_bit(true)?;
                builder.store_ref(Arc::new(init_cell))?;
            } else {
                builder.store_bit(false)?;
                builder.store_cell_inline(&init_cell)?;
            }
        }
        None => {
            builder.store_bit(false)?;
        }
    }

    let used_refs = MAX_CELL_REFS - builder.refs_left();
    let body_by_ref = builder.bits_left() < 1 + body.bit_len()
        || used_refs + body.reference_count() > MAX_CELL_REFS;
    if body_by_ref {
        builder.store_bit(true)?;
        builder.store_ref(Arc::new(body.clone()))?;
    } else {
        builder.store_bit(false)?;
        builder.store_cell_inline(body)?;
    }
    Ok(())
}

/// Text comment body: op 0 followed by the UTF-8 bytes as a snake chain.
pub fn comment(text: &str) -> WalletResult<Cell> {
    let mut builder = CellBuilder::new();
    builder.store_u32(COMMENT_OP)?;
    store_snake_bytes(&mut builder, text.as_bytes())?;
    Ok(builder.build()?)
}

fn store_snake_bytes(builder: &mut CellBuilder, bytes: &[u8]) -> WalletResult<()> {
    let room = builder.bits_left() / 8;
    if bytes.len() <= room {
        builder.store_bytes(bytes)?;
        return Ok(());
    }

    let (head, tail) = bytes.split_at(room);
    builder.store_bytes(head)?;
    let mut next = CellBuilder::new();
    store_snake_bytes(&mut next, tail)?;
    builder.store_ref(Arc::new(next.build()?))?;
    Ok(())
}

/// Read back a comment body; `None` when the cell is not a text comment.
pub fn read_comment(cell: &Cell) -> Option<String> {
    let mut slice = CellSlice::new(cell);
    if slice.load_u32().ok()? != COMMENT_OP {
        return None;
    }

    let mut bytes = Vec::new();
    let mut current = cell;
    loop {
        let count = slice.bits_left() / 8;
        bytes.extend(slice.load_bytes(count).ok()?);
        match current.reference(0) {
            Some(next) => {
                current = next.as_ref();
                slice = CellSlice::new(current);
            }
            None => break,
        }
    }
    String::from_utf8(bytes).ok()
}

/// Bytes that fit after the 32-bit op in the first comment cell.
pub const COMMENT_FIRST_CELL_BYTES: usize = (MAX_CELL_BITS - 32) / 8;

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(value: u32) -> Arc<Cell> {
        let mut b = CellBuilder::new();
        b.store_u32(value).unwrap();
        Arc::new(b.build().unwrap())
    }

    fn target() -> MsgAddress {
        MsgAddress::Internal {
            workchain: 0,
            address: [7u8; 32],
        }
    }

    #[test]
    fn test_comment_short() {
        let cell = comment("hello").unwrap();
        assert_eq!(cell.bit_len(), 32 + 5 * 8);
        assert_eq!(cell.reference_count(), 0);
        assert_eq!(read_comment(&cell).as_deref(), Some("hello"));
    }

    #[test]
    fn test_comment_snake_layout() {
        let text = "x".repeat(COMMENT_FIRST_CELL_BYTES + 130);
        let cell = comment(&text).unwrap();
        assert_eq!(cell.bit_len(), 32 + COMMENT_FIRST_CELL_BYTES * 8);

        let second = cell.reference(0).unwrap();
        assert_eq!(second.bit_len(), 127 * 8);
        let third = second.reference(0).unwrap();
        assert_eq!(third.bit_len(), 3 * 8);
        assert_eq!(third.reference_count(), 0);

        assert_eq!(read_comment(&cell), Some(text));
    }

    #[test]
    fn test_read_comment_rejects_other_ops() {
        assert_eq!(read_comment(&leaf(0x0f8a7ea5)), None);
    }

    #[test]
    fn test_state_init_roundtrip() {
        let init = StateInit::new(leaf(1), leaf(2));
        let cell = init.to_cell().unwrap();
        // split_depth, special, code, data, libraries flags
        assert_eq!(cell.bit_len(), 5);
        assert_eq!(cell.reference_count(), 2);
        assert_eq!(StateInit::from_cell(&cell).unwrap(), init);
    }

    #[test]
    fn test_state_init_with_special() {
        let init = StateInit {
            split_depth: Some(3),
            special: Some((true, false)),
            ..Default::default()
        };
        let cell = init.to_cell().unwrap();
        assert_eq!(cell.bit_len(), 1 + 5 + 1 + 2 + 3);
        assert_eq!(StateInit::from_cell(&cell).unwrap(), init);
    }

    #[test]
    fn test_internal_message_small_body_inline() {
        let msg = InternalMessage::new(target(), 1_000).with_body(leaf(42));
        let cell = msg.to_cell().unwrap();
        assert_eq!(cell.reference_count(), 0);

        let mut slice = CellSlice::new(&cell);
        assert!(!slice.load_bit().unwrap());
        assert!(slice.load_bit().unwrap());
        assert!(slice.load_bit().unwrap());
    }

    #[test]
    fn test_internal_message_empty_body() {
        let cell = InternalMessage::new(target(), 0)
            .with_bounce(false)
            .to_cell()
            .unwrap();
        // 4 flags + 2 src + 267 dest + 4 coins + 1 extra + 4 + 4 + 64 + 32 + init + body
        assert_eq!(cell.bit_len(), 4 + 2 + 267 + 4 + 1 + 4 + 4 + 64 + 32 + 1 + 1);
    }

    #[test]
    fn test_internal_message_large_body_by_ref() {
        let mut big = CellBuilder::new();
        big.store_bytes(&[0xAB; 100]).unwrap();
        let big = Arc::new(big.build().unwrap());

        let cell = InternalMessage::new(target(), 0)
            .with_body(big.clone())
            .to_cell()
            .unwrap();
        assert_eq!(cell.reference_count(), 1);
        assert_eq!(cell.reference(0).unwrap().hash(), big.hash());
    }

    #[test]
    fn test_internal_message_init_inline() {
        let init = StateInit::new(leaf(1), leaf(2));
        let cell = InternalMessage::new(target(), 0)
            .with_init(init)
            .to_cell()
            .unwrap();
        // init inline keeps code and data as the two root references
        assert_eq!(cell.reference_count(), 2);
    }

    #[test]
    fn test_body_with_many_refs_goes_by_ref() {
        let init = StateInit::new(leaf(1), leaf(2));
        let mut body = CellBuilder::new();
        body.store_u8(1).unwrap();
        body.store_ref(leaf(3)).unwrap();
        body.store_ref(leaf(4)).unwrap();
        body.store_ref(leaf(5)).unwrap();
        let body = Arc::new(body.build().unwrap());

        let cell = InternalMessage::new(target(), 0)
            .with_init(init)
            .with_body(body.clone())
            .to_cell()
            .unwrap();
        assert_eq!(cell.reference_count(), 3);
        assert_eq!(cell.reference(2).unwrap().hash(), body.hash());
    }

    #[test]
    fn test_external_message_header() {
        let cell = ExternalMessage {
            to: target(),
            init: None,
            body: leaf(9),
        }
        .to_cell()
        .unwrap();
        let mut slice = CellSlice::new(&cell);
        assert_eq!(slice.load_uint(2).unwrap(), 0b10);
        assert_eq!(slice.load_address().unwrap(), MsgAddress::Null);
        assert_eq!(slice.load_address().unwrap(), target());
        assert_eq!(slice.load_coins().unwrap(), 0);
        assert!(!slice.load_bit().unwrap());
        assert!(!slice.load_bit().unwrap());
        assert_eq!(slice.load_u32().unwrap(), 9);
    }
}
