//! CellSlice for reading data from TON cells.

use std::sync::Arc;

use crate::{Cell, CellError, CellResult, MsgAddress};

/// A read cursor over a Cell's bits and references.
///
/// # Example
///
/// ```
/// use ton_cell::{CellBuilder, CellSlice};
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(0x12345678).unwrap();
/// let cell = builder.build().unwrap();
///
/// let mut slice = CellSlice::new(&cell);
/// assert_eq!(slice.load_u32().unwrap(), 0x12345678);
/// ```
#[derive(Debug, Clone)]
pub struct CellSlice<'a> {
    pub(crate) cell: &'a Cell,
    pub(crate) bit_offset: usize,
    bit_len: usize,
    pub(crate) ref_offset: usize,
}

impl<'a> CellSlice<'a> {
    /// Create a new slice from a cell.
    pub fn new(cell: &'a Cell) -> Self {
        CellSlice {
            cell,
            bit_offset: 0,
            bit_len: cell.bit_len(),
            ref_offset: 0,
        }
    }

    /// Load a single bit.
    pub fn load_bit(&mut self) -> CellResult<bool> {
        if self.bit_len == 0 {
            return Err(CellError::NotEnoughBits { need: 1, have: 0 });
        }
        let bit = self.get_bit_at(self.bit_offset);
        self.bit_offset += 1;
        self.bit_len -= 1;
        Ok(bit)
    }

    /// Load an unsigned 8-bit integer.
    pub fn load_u8(&mut self) -> CellResult<u8> {
        self.load_uint(8).map(|v| v as u8)
    }

    /// Load an unsigned 16-bit integer (big-endian).
    pub fn load_u16(&mut self) -> CellResult<u16> {
        self.load_uint(16).map(|v| v as u16)
    }

    /// Load an unsigned 32-bit integer (big-endian).
    pub fn load_u32(&mut self) -> CellResult<u32> {
        self.load_uint(32).map(|v| v as u32)
    }

    /// Load an unsigned 64-bit integer (big-endian).
    pub fn load_u64(&mut self) -> CellResult<u64> {
        self.load_uint(64)
    }

    /// Load a signed 32-bit integer (big-endian).
    pub fn load_i32(&mut self) -> CellResult<i32> {
        self.load_int(32).map(|v| v as i32)
    }

    /// Load an unsigned integer with a specific bit width.
    pub fn load_uint(&mut self, bits: usize) -> CellResult<u64> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        self.ensure_bits(bits)?;

        let mut result: u64 = 0;
        for _ in 0..bits {
            result = (result << 1) | (self.load_bit()? as u64);
        }
        Ok(result)
    }

    /// Load a signed integer with a specific bit width (two's complement).
    pub fn load_int(&mut self, bits: usize) -> CellResult<i64> {
        if bits == 0 {
            return Ok(0);
        }
        let unsigned = self.load_uint(bits)?;
        if bits < 64 && unsigned & (1u64 << (bits - 1)) != 0 {
            Ok((unsigned | !((1u64 << bits) - 1)) as i64)
        } else {
            Ok(unsigned as i64)
        }
    }

    /// Load a byte array.
    pub fn load_bytes(&mut self, count: usize) -> CellResult<Vec<u8>> {
        self.ensure_bits(count * 8)?;
        (0..count).map(|_| self.load_u8()).collect()
    }

    /// Load a reference to another cell.
    pub fn load_ref(&mut self) -> CellResult<&'a Arc<Cell>> {
        let reference = self
            .cell
            .reference(self.ref_offset)
            .ok_or(CellError::NotEnoughRefs { need: 1, have: 0 })?;
        self.ref_offset += 1;
        Ok(reference)
    }

    /// Load `Maybe ^Cell`.
    pub fn load_maybe_ref(&mut self) -> CellResult<Option<&'a Arc<Cell>>> {
        if self.load_bit()? {
            self.load_ref().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Load coins (VarUInteger 16).
    pub fn load_coins(&mut self) -> CellResult<u128> {
        let byte_len = self.load_uint(4)? as usize;
        let mut result: u128 = 0;
        for _ in 0..byte_len {
            result = (result << 8) | (self.load_u8()? as u128);
        }
        Ok(result)
    }

    /// Load a message address (`addr_none`, `addr_extern` or `addr_std`).
    pub fn load_address(&mut self) -> CellResult<MsgAddress> {
        match self.load_uint(2)? {
            0b00 => Ok(MsgAddress::Null),
            0b01 => {
                let len = self.load_uint(9)? as u16;
                let mut data = vec![0u8; (len as usize).div_ceil(8)];
                for i in 0..(len as usize) {
                    if self.load_bit()? {
                        data[i / 8] |= 1 << (7 - i % 8);
                    }
                }
                Ok(MsgAddress::External { len, data })
            }
            0b10 => {
                if self.load_bit()? {
                    // anycast depth:(#<= 30) rewrite_pfx:(bits depth)
                    let depth = self.load_uint(5)?;
                    self.skip_bits(depth as usize)?;
                }
                let workchain = self.load_int(8)? as i32;
                let mut address = [0u8; 32];
                address.copy_from_slice(&self.load_bytes(32)?);
                Ok(MsgAddress::Internal { workchain, address })
            }
            other => Err(CellError::InvalidAddress(format!(
                "Unsupported address tag: {:02b}",
                other
            ))),
        }
    }

    /// Get the number of bits remaining.
    pub fn bits_left(&self) -> usize {
        self.bit_len
    }

    /// Get the number of references remaining.
    pub fn refs_left(&self) -> usize {
        self.cell.reference_count() - self.ref_offset
    }

    /// Skip a number of bits.
    pub fn skip_bits(&mut self, count: usize) -> CellResult<()> {
        self.ensure_bits(count)?;
        self.bit_offset += count;
        self.bit_len -= count;
        Ok(())
    }

    /// Check if the slice is empty (no bits or refs left).
    pub fn is_empty(&self) -> bool {
        self.bit_len == 0 && self.refs_left() == 0
    }

    pub(crate) fn get_bit_at(&self, index: usize) -> bool {
        self.cell
            .data()
            .get(index / 8)
            .is_some_and(|b| (b >> (7 - index % 8)) & 1 == 1)
    }

    fn ensure_bits(&self, need: usize) -> CellResult<()> {
        if need > self.bit_len {
            return Err(CellError::NotEnoughBits {
                need,
                have: self.bit_len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellBuilder;

    #[test]
    fn test_load_int_negative() {
        let mut builder = CellBuilder::new();
        builder.store_int(-15, 8).unwrap();
        let cell = builder.build().unwrap();

        let mut slice = CellSlice::new(&cell);
        assert_eq!(slice.load_int(8).unwrap(), -15);
    }

    #[test]
    fn test_coins_and_address() {
        let addr = MsgAddress::Internal {
            workchain: -1,
            address: [0x5A; 32],
        };
        let mut builder = CellBuilder::new();
        builder.store_coins(10_500_000_000).unwrap();
        builder.store_address(&addr).unwrap();
        builder.store_address(&MsgAddress::Null).unwrap();
        let cell = builder.build().unwrap();

        let mut slice = CellSlice::new(&cell);
        assert_eq!(slice.load_coins().unwrap(), 10_500_000_000);
        assert_eq!(slice.load_address().unwrap(), addr);
        assert_eq!(slice.load_address().unwrap(), MsgAddress::Null);
        assert!(slice.is_empty());
    }

    #[test]
    fn test_load_maybe_ref() {
        let mut builder = CellBuilder::new();
        builder.store_maybe_ref(None).unwrap();
        builder
            .store_maybe_ref(Some(Arc::new(Cell::empty())))
            .unwrap();
        let cell = builder.build().unwrap();

        let mut slice = CellSlice::new(&cell);
        assert!(slice.load_maybe_ref().unwrap().is_none());
        assert!(slice.load_maybe_ref().unwrap().is_some());
        assert!(slice.load_bit().is_err());
    }
}
