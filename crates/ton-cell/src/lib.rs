//! TON Cell and Bag of Cells (BoC) Library
//!
//! This crate provides the data structures every transfer message is made of:
//!
//! - **Cell**: The basic unit of data storage in TON
//! - **CellBuilder**: Builder for creating cells
//! - **CellSlice**: Reader for extracting data from cells
//! - **BagOfCells**: Serialization format for cells
//! - **MsgAddress**: TON address representation (raw and user-friendly)
//! - **CellStats**: Unique bit/cell counters used by fee formulas
//!
//! # Example
//!
//! ```
//! use ton_cell::{BagOfCells, CellBuilder};
//!
//! let mut builder = CellBuilder::new();
//! builder.store_u32(0x12345678).unwrap();
//! builder.store_bytes(&[1, 2, 3, 4]).unwrap();
//! let cell = builder.build().unwrap();
//!
//! let bytes = BagOfCells::from_root(cell.clone()).serialize().unwrap();
//! let restored = BagOfCells::deserialize(&bytes).unwrap();
//! assert_eq!(restored.single_root().unwrap().hash(), cell.hash());
//! ```

use sha2::{Digest, Sha256};
use thiserror::Error;

mod address;
mod boc;
mod builder;
mod cell;
mod slice;
mod stats;

pub use address::{FriendlyAddress, MsgAddress, FRIENDLY_ADDRESS_LEN};
pub use boc::BagOfCells;
pub use builder::CellBuilder;
pub use cell::{Cell, HASH_BYTES};
pub use slice::CellSlice;
pub use stats::CellStats;

/// Errors that can occur during Cell/BoC operations.
#[derive(Debug, Error)]
pub enum CellError {
    /// The cell data exceeds the maximum of 1023 bits.
    #[error("Cell data too long: {0} bits (max 1023)")]
    DataTooLong(usize),

    /// The cell has too many references (max 4).
    #[error("Too many cell references: {0} (max 4)")]
    TooManyRefs(usize),

    /// Invalid BoC format.
    #[error("Invalid BoC format: {0}")]
    InvalidBoc(String),

    /// Cell not found in BoC.
    #[error("Cell not found: index {0}")]
    CellNotFound(usize),

    /// CRC32 checksum mismatch.
    #[error("CRC32 mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    CrcMismatch { expected: u32, actual: u32 },

    /// Unexpected end of data.
    #[error("Unexpected end of data")]
    UnexpectedEof,

    /// Not enough bits available.
    #[error("Not enough bits: need {need}, have {have}")]
    NotEnoughBits { need: usize, have: usize },

    /// Not enough references available.
    #[error("Not enough refs: need {need}, have {have}")]
    NotEnoughRefs { need: usize, have: usize },

    /// Invalid address format.
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    /// Invalid base64 encoding.
    #[error("Invalid base64: {0}")]
    InvalidBase64(String),

    /// Expected single root but found multiple or none.
    #[error("Expected single root, found {0}")]
    NotSingleRoot(usize),

    /// Exotic cell types other than library cells are not supported.
    #[error("Unsupported cell type: {0}")]
    InvalidCellType(u8),

    /// Invalid bit length.
    #[error("Invalid bit length: {0}")]
    InvalidBitLength(usize),

    /// Coins value does not fit into VarUInteger 16.
    #[error("Coins value out of range: {0}")]
    CoinsOverflow(u128),
}

/// Result type for Cell/BoC operations.
pub type CellResult<T> = Result<T, CellError>;

/// Maximum number of bits in a cell's data.
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of references a cell can have.
pub const MAX_CELL_REFS: usize = 4;

/// BoC magic number for generic BoC.
pub const BOC_GENERIC_MAGIC: u32 = 0xb5ee9c72;

/// BoC magic number for indexed BoC.
pub const BOC_INDEXED_MAGIC: u32 = 0x68ff65f3;

/// BoC magic number for indexed CRC32 BoC.
pub const BOC_INDEXED_CRC32_MAGIC: u32 = 0xacc3a728;

/// Cell type indicator.
///
/// Transfer messages only ever contain ordinary cells; library cells can show
/// up inside wallet code and keep a level-0 hash, so they are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CellType {
    /// Ordinary data cell.
    Ordinary = 0,
    /// Library reference.
    Library = 2,
}

impl CellType {
    /// Check if this is an exotic (non-ordinary) cell type.
    pub fn is_exotic(&self) -> bool {
        *self != CellType::Ordinary
    }

    /// Resolve the exotic type tag stored in the first data byte.
    pub fn from_exotic_tag(tag: u8) -> CellResult<Self> {
        match tag {
            2 => Ok(CellType::Library),
            other => Err(CellError::InvalidCellType(other)),
        }
    }
}

fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// CRC32-C (Castagnoli), used by the BoC trailer.
fn crc32c(data: &[u8]) -> u32 {
    const CRC32C: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);
    CRC32C.checksum(data)
}
