//! Cell implementation for TON.
//!
//! A Cell holds up to 1023 bits of data and up to 4 references to other
//! cells. Only level-0 cells appear in transfer messages, so the
//! representation hash and depth are computed once, when the cell is built.

use std::sync::Arc;

use crate::{sha256, CellType, MAX_CELL_BITS, MAX_CELL_REFS};

/// Hash size in bytes (SHA256).
pub const HASH_BYTES: usize = 32;

/// A TON Cell - the basic unit of data storage.
///
/// Cells form a DAG where each cell can reference up to 4 other cells.
/// Two cells are equal when their representation hashes are equal.
#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) data: Vec<u8>,
    pub(crate) bit_len: usize,
    pub(crate) references: Vec<Arc<Cell>>,
    pub(crate) cell_type: CellType,
    hash: [u8; HASH_BYTES],
    depth: u16,
}

impl Cell {
    /// Create a new cell; called by `CellBuilder::build()` and the BoC parser.
    pub(crate) fn new(
        data: Vec<u8>,
        bit_len: usize,
        references: Vec<Arc<Cell>>,
        cell_type: CellType,
    ) -> Self {
        debug_assert!(bit_len <= MAX_CELL_BITS);
        debug_assert!(references.len() <= MAX_CELL_REFS);

        let depth = references
            .iter()
            .map(|r| r.depth.saturating_add(1))
            .max()
            .unwrap_or(0);

        let mut cell = Cell {
            data,
            bit_len,
            references,
            cell_type,
            hash: [0u8; HASH_BYTES],
            depth,
        };
        cell.hash = sha256(&cell.representation());
        cell
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, Vec::new(), CellType::Ordinary)
    }

    /// Representation used for hashing:
    /// `d1 d2 data+tag depth(ref)* hash(ref)*`.
    fn representation(&self) -> Vec<u8> {
        let mut repr =
            Vec::with_capacity(2 + self.byte_len() + self.references.len() * (2 + HASH_BYTES));

        let (d1, d2) = self.descriptors();
        repr.push(d1);
        repr.push(d2);
        repr.extend_from_slice(&self.data_with_completion_tag());

        for reference in &self.references {
            repr.extend_from_slice(&reference.depth.to_be_bytes());
        }
        for reference in &self.references {
            repr.extend_from_slice(&reference.hash);
        }
        repr
    }

    /// Descriptor bytes.
    ///
    /// d1 = refs_count + 8 * is_exotic (level is always 0 here)
    /// d2 = ceil(bit_len / 8) + floor(bit_len / 8)
    pub fn descriptors(&self) -> (u8, u8) {
        let exotic = if self.cell_type.is_exotic() { 8 } else { 0 };
        let d1 = self.references.len() as u8 + exotic;
        let d2 = (self.bit_len.div_ceil(8) + self.bit_len / 8) as u8;
        (d1, d2)
    }

    /// Data bytes with the completion tag appended when not byte-aligned.
    pub fn data_with_completion_tag(&self) -> Vec<u8> {
        let mut result = self.data[..self.byte_len()].to_vec();
        let remainder = self.bit_len % 8;
        if remainder != 0
            && let Some(last) = result.last_mut()
        {
            *last |= 1 << (7 - remainder);
        }
        result
    }

    /// Representation hash of this cell.
    pub fn hash(&self) -> [u8; HASH_BYTES] {
        self.hash
    }

    /// Depth: 0 for a leaf, otherwise 1 + max depth of the references.
    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// Get the raw data bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the number of bits in this cell.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Get the number of bytes needed to store the data (rounded up).
    pub fn byte_len(&self) -> usize {
        self.bit_len.div_ceil(8)
    }

    /// Get all references to child cells.
    pub fn references(&self) -> &[Arc<Cell>] {
        &self.references
    }

    /// Get a reference by index.
    pub fn reference(&self, index: usize) -> Option<&Arc<Cell>> {
        self.references.get(index)
    }

    /// Get the number of references.
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Get the cell type.
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    /// Check if this is an exotic cell.
    pub fn is_exotic(&self) -> bool {
        self.cell_type.is_exotic()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}
