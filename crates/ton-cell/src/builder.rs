//! CellBuilder for constructing TON cells.

use std::sync::Arc;

use crate::{Cell, CellError, CellResult, CellSlice, CellType, MsgAddress, MAX_CELL_BITS, MAX_CELL_REFS};

/// Builder for constructing TON cells.
///
/// # Example
///
/// ```
/// use ton_cell::CellBuilder;
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(0x12345678).unwrap();
/// builder.store_coins(1_000_000_000).unwrap();
/// let cell = builder.build().unwrap();
/// assert_eq!(cell.bit_len(), 32 + 4 + 32);
/// ```
#[derive(Debug, Clone)]
pub struct CellBuilder {
    data: Vec<u8>,
    bit_len: usize,
    references: Vec<Arc<Cell>>,
}

impl CellBuilder {
    /// Create a new empty CellBuilder.
    pub fn new() -> Self {
        CellBuilder {
            data: Vec::with_capacity(128),
            bit_len: 0,
            references: Vec::new(),
        }
    }

    /// Store a single bit.
    pub fn store_bit(&mut self, bit: bool) -> CellResult<&mut Self> {
        if self.bit_len >= MAX_CELL_BITS {
            return Err(CellError::DataTooLong(self.bit_len + 1));
        }

        let byte_index = self.bit_len / 8;
        if byte_index >= self.data.len() {
            self.data.push(0);
        }
        if bit {
            self.data[byte_index] |= 1 << (7 - self.bit_len % 8);
        }

        self.bit_len += 1;
        Ok(self)
    }

    /// Store an unsigned 8-bit integer.
    pub fn store_u8(&mut self, value: u8) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 8)
    }

    /// Store an unsigned 16-bit integer (big-endian).
    pub fn store_u16(&mut self, value: u16) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 16)
    }

    /// Store an unsigned 32-bit integer (big-endian).
    pub fn store_u32(&mut self, value: u32) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 32)
    }

    /// Store an unsigned 64-bit integer (big-endian).
    pub fn store_u64(&mut self, value: u64) -> CellResult<&mut Self> {
        self.store_uint(value, 64)
    }

    /// Store a signed 32-bit integer (big-endian).
    pub fn store_i32(&mut self, value: i32) -> CellResult<&mut Self> {
        self.store_int(value as i64, 32)
    }

    /// Store an unsigned integer with a specific bit width, big-endian.
    pub fn store_uint(&mut self, value: u64, bits: usize) -> CellResult<&mut Self> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        self.ensure_bits(bits)?;

        for i in (0..bits).rev() {
            self.store_bit((value >> i) & 1 == 1)?;
        }
        Ok(self)
    }

    /// Store a signed integer in two's complement with a specific bit width.
    pub fn store_int(&mut self, value: i64, bits: usize) -> CellResult<&mut Self> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        self.store_uint(value as u64, bits)
    }

    /// Store a byte array.
    pub fn store_bytes(&mut self, bytes: &[u8]) -> CellResult<&mut Self> {
        self.ensure_bits(bytes.len() * 8)?;
        for &byte in bytes {
            self.store_u8(byte)?;
        }
        Ok(self)
    }

    /// Store the remaining bits and references of a slice.
    pub fn store_slice(&mut self, slice: &CellSlice) -> CellResult<&mut Self> {
        self.ensure_bits(slice.bits_left())?;
        for i in 0..slice.bits_left() {
            self.store_bit(slice.get_bit_at(slice.bit_offset + i))?;
        }
        for i in slice.ref_offset..slice.cell.reference_count() {
            if let Some(reference) = slice.cell.reference(i) {
                self.store_ref(reference.clone())?;
            }
        }
        Ok(self)
    }

    /// Append a cell's bits and references to this builder.
    pub fn store_cell_inline(&mut self, cell: &Cell) -> CellResult<&mut Self> {
        self.store_slice(&CellSlice::new(cell))
    }

    /// Store a reference to another cell.
    pub fn store_ref(&mut self, cell: Arc<Cell>) -> CellResult<&mut Self> {
        if self.references.len() >= MAX_CELL_REFS {
            return Err(CellError::TooManyRefs(self.references.len() + 1));
        }
        self.references.push(cell);
        Ok(self)
    }

    /// Store `Maybe ^Cell`.
    pub fn store_maybe_ref(&mut self, cell: Option<Arc<Cell>>) -> CellResult<&mut Self> {
        match cell {
            Some(cell) => {
                self.store_bit(true)?;
                self.store_ref(cell)
            }
            None => self.store_bit(false),
        }
    }

    /// Store coins (VarUInteger 16): 4-bit byte length, then the value.
    pub fn store_coins(&mut self, nanotons: u128) -> CellResult<&mut Self> {
        let bytes_needed = (128 - nanotons.leading_zeros()).div_ceil(8) as usize;
        if bytes_needed > 15 {
            return Err(CellError::CoinsOverflow(nanotons));
        }

        self.store_uint(bytes_needed as u64, 4)?;
        let be = nanotons.to_be_bytes();
        self.store_bytes(&be[16 - bytes_needed..])
    }

    /// Store a message address.
    pub fn store_address(&mut self, addr: &MsgAddress) -> CellResult<&mut Self> {
        match addr {
            // addr_none$00
            MsgAddress::Null => self.store_uint(0b00, 2),
            // addr_extern$01 len:(## 9) external_address:(bits len)
            MsgAddress::External { len, data } => {
                self.store_uint(0b01, 2)?;
                self.store_uint(*len as u64, 9)?;
                for i in 0..(*len as usize) {
                    let bit = data.get(i / 8).is_some_and(|b| (b >> (7 - i % 8)) & 1 == 1);
                    self.store_bit(bit)?;
                }
                Ok(self)
            }
            // addr_std$10 anycast:(Maybe Anycast) workchain_id:int8 address:bits256
            MsgAddress::Internal { workchain, address } => {
                self.store_uint(0b10, 2)?;
                self.store_bit(false)?;
                self.store_int(*workchain as i64, 8)?;
                self.store_bytes(address)
            }
        }
    }

    /// Get the number of bits that can still be stored.
    pub fn bits_left(&self) -> usize {
        MAX_CELL_BITS - self.bit_len
    }

    /// Get the number of references that can still be added.
    pub fn refs_left(&self) -> usize {
        MAX_CELL_REFS - self.references.len()
    }

    /// Get the current number of bits stored.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Build the cell.
    pub fn build(self) -> CellResult<Cell> {
        Ok(Cell::new(self.data, self.bit_len, self.references, CellType::Ordinary))
    }

    fn ensure_bits(&self, bits: usize) -> CellResult<()> {
        if self.bit_len + bits > MAX_CELL_BITS {
            return Err(CellError::DataTooLong(self.bit_len + bits));
        }
        Ok(())
    }
}

impl Default for CellBuilder {
    fn default() -> Self {
        Self::new()
    }
}
