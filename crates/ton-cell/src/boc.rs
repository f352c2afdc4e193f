//! Bag of Cells (BoC) serialization format.
//!
//! Wallet code, jetton custom payloads and state-init blobs reach this crate
//! as base64 BoCs; finished external messages leave it the same way.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{
    crc32c, Cell, CellError, CellResult, CellType, BOC_GENERIC_MAGIC, BOC_INDEXED_CRC32_MAGIC,
    BOC_INDEXED_MAGIC, HASH_BYTES, MAX_CELL_BITS, MAX_CELL_REFS,
};

/// Bag of Cells - a serialized collection of cells.
#[derive(Debug, Clone)]
pub struct BagOfCells {
    roots: Vec<Arc<Cell>>,
}

/// Cursor over the raw BoC bytes.
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> CellResult<&'a [u8]> {
        let end = self.offset.checked_add(len).ok_or(CellError::UnexpectedEof)?;
        let bytes = self.data.get(self.offset..end).ok_or(CellError::UnexpectedEof)?;
        self.offset = end;
        Ok(bytes)
    }

    fn u8(&mut self) -> CellResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn uint(&mut self, len: usize) -> CellResult<usize> {
        if len > 8 {
            return Err(CellError::InvalidBoc(format!("integer width {} too large", len)));
        }
        Ok(self
            .take(len)?
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize))
    }
}

/// A cell as read from the BoC, before its references are linked.
struct RawCell {
    cell_type: CellType,
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<usize>,
}

impl BagOfCells {
    /// Create a BoC with the given root cells.
    pub fn new(roots: Vec<Arc<Cell>>) -> Self {
        BagOfCells { roots }
    }

    /// Create a BoC with a single root cell.
    pub fn from_root(root: Cell) -> Self {
        BagOfCells {
            roots: vec![Arc::new(root)],
        }
    }

    /// Get all root cells.
    pub fn roots(&self) -> &[Arc<Cell>] {
        &self.roots
    }

    /// Get the single root cell (errors if not exactly one root).
    pub fn single_root(&self) -> CellResult<&Arc<Cell>> {
        match self.roots.as_slice() {
            [root] => Ok(root),
            roots => Err(CellError::NotSingleRoot(roots.len())),
        }
    }

    /// Serialize using the generic format with a CRC32-C trailer.
    pub fn serialize(&self) -> CellResult<Vec<u8>> {
        if self.roots.is_empty() {
            return Err(CellError::InvalidBoc("No root cells".to_string()));
        }

        let cells = self.collect_cells();
        let index: HashMap<[u8; HASH_BYTES], usize> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| (c.hash(), i))
            .collect();

        let size_bytes = bytes_needed(cells.len());

        let mut body = Vec::new();
        for cell in &cells {
            let (d1, d2) = cell.descriptors();
            body.push(d1);
            body.push(d2);
            body.extend_from_slice(&cell.data_with_completion_tag());
            for reference in cell.references() {
                let idx = index
                    .get(&reference.hash())
                    .copied()
                    .ok_or(CellError::CellNotFound(cells.len()))?;
                write_uint(&mut body, idx, size_bytes);
            }
        }
        let off_bytes = bytes_needed(body.len());

        let mut out = Vec::with_capacity(body.len() + 32);
        out.extend_from_slice(&BOC_GENERIC_MAGIC.to_be_bytes());
        // has_idx = 0, has_crc32c = 1, has_cache_bits = 0, flags = 0
        out.push(0x40 | size_bytes as u8);
        out.push(off_bytes as u8);
        write_uint(&mut out, cells.len(), size_bytes);
        write_uint(&mut out, self.roots.len(), size_bytes);
        write_uint(&mut out, 0, size_bytes);
        write_uint(&mut out, body.len(), off_bytes);
        for root in &self.roots {
            let idx = index
                .get(&root.hash())
                .copied()
                .ok_or(CellError::CellNotFound(0))?;
            write_uint(&mut out, idx, size_bytes);
        }
        out.extend_from_slice(&body);

        let crc = crc32c(&out);
        out.extend_from_slice(&crc.to_le_bytes());
        Ok(out)
    }

    /// Serialize to a base64 string.
    pub fn serialize_to_base64(&self) -> CellResult<String> {
        Ok(STANDARD.encode(self.serialize()?))
    }

    /// Deserialize from bytes (generic and both indexed formats).
    pub fn deserialize(data: &[u8]) -> CellResult<Self> {
        let mut reader = Reader { data, offset: 0 };

        let magic_bytes = reader.take(4)?;
        let magic = u32::from_be_bytes([magic_bytes[0], magic_bytes[1], magic_bytes[2], magic_bytes[3]]);

        let (has_idx, has_crc, size_bytes) = match magic {
            BOC_GENERIC_MAGIC => {
                let flags = reader.u8()?;
                (flags & 0x80 != 0, flags & 0x40 != 0, (flags & 0x07) as usize)
            }
            BOC_INDEXED_MAGIC => (true, false, reader.u8()? as usize),
            BOC_INDEXED_CRC32_MAGIC => (true, true, reader.u8()? as usize),
            other => {
                return Err(CellError::InvalidBoc(format!("Invalid magic: {:08x}", other)));
            }
        };

        if has_crc {
            if data.len() < 4 {
                return Err(CellError::UnexpectedEof);
            }
            let end = data.len() - 4;
            let expected = u32::from_le_bytes([data[end], data[end + 1], data[end + 2], data[end + 3]]);
            let actual = crc32c(&data[..end]);
            if expected != actual {
                return Err(CellError::CrcMismatch { expected, actual });
            }
        }

        let off_bytes = reader.u8()? as usize;
        let cells_count = reader.uint(size_bytes)?;
        let roots_count = reader.uint(size_bytes)?;
        let _absent = reader.uint(size_bytes)?;
        let total_cells_size = reader.uint(off_bytes)?;

        let root_indices = (0..roots_count)
            .map(|_| reader.uint(size_bytes))
            .collect::<CellResult<Vec<_>>>()?;

        if has_idx {
            let index_len = cells_count
                .checked_mul(off_bytes)
                .ok_or_else(|| CellError::InvalidBoc(format!("index of {} cells overflows", cells_count)))?;
            reader.take(index_len)?;
        }

        let mut cells_reader = Reader {
            data: reader.take(total_cells_size)?,
            offset: 0,
        };
        let raw = (0..cells_count)
            .map(|_| parse_raw_cell(&mut cells_reader, size_bytes))
            .collect::<CellResult<Vec<_>>>()?;

        // References always point forward, so build from the last cell backwards.
        let mut built: Vec<Option<Arc<Cell>>> = vec![None; cells_count];
        for (i, raw_cell) in raw.into_iter().enumerate().rev() {
            let mut refs = Vec::with_capacity(raw_cell.refs.len());
            for r in raw_cell.refs {
                if r <= i {
                    return Err(CellError::InvalidBoc(format!("cell {} references backwards to {}", i, r)));
                }
                let child = built
                    .get(r)
                    .and_then(|c| c.clone())
                    .ok_or(CellError::CellNotFound(r))?;
                refs.push(child);
            }
            built[i] = Some(Arc::new(Cell::new(
                raw_cell.data,
                raw_cell.bit_len,
                refs,
                raw_cell.cell_type,
            )));
        }

        let roots = root_indices
            .into_iter()
            .map(|idx| {
                built
                    .get(idx)
                    .and_then(|c| c.clone())
                    .ok_or(CellError::CellNotFound(idx))
            })
            .collect::<CellResult<Vec<_>>>()?;

        Ok(BagOfCells { roots })
    }

    /// Deserialize from a base64 string (standard or URL-safe alphabet).
    pub fn deserialize_from_base64(base64_str: &str) -> CellResult<Self> {
        let normalized: String = base64_str
            .trim()
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                c => c,
            })
            .collect();
        let bytes = STANDARD
            .decode(normalized)
            .map_err(|e| CellError::InvalidBase64(e.to_string()))?;
        Self::deserialize(&bytes)
    }

    /// Parse a base64 BoC and return its single root.
    pub fn single_root_from_base64(base64_str: &str) -> CellResult<Arc<Cell>> {
        Self::deserialize_from_base64(base64_str)?
            .single_root()
            .cloned()
    }

    /// Cells ordered so that every cell precedes the cells it references.
    fn collect_cells(&self) -> Vec<Arc<Cell>> {
        let mut post_order = Vec::new();
        let mut visited = std::collections::HashSet::new();
        for root in &self.roots {
            visit(root, &mut visited, &mut post_order);
        }
        post_order.reverse();
        post_order
    }
}

fn visit(
    cell: &Arc<Cell>,
    visited: &mut std::collections::HashSet<[u8; HASH_BYTES]>,
    out: &mut Vec<Arc<Cell>>,
) {
    if !visited.insert(cell.hash()) {
        return;
    }
    // Reverse so that after the final reversal refs keep their natural order.
    for reference in cell.references().iter().rev() {
        visit(reference, visited, out);
    }
    out.push(cell.clone());
}

fn parse_raw_cell(reader: &mut Reader<'_>, size_bytes: usize) -> CellResult<RawCell> {
    let d1 = reader.u8()?;
    let d2 = reader.u8()?;

    let ref_count = (d1 & 0x07) as usize;
    let is_exotic = d1 & 0x08 != 0;
    let level_mask = d1 >> 5;
    let with_hashes = d1 & 0x10 != 0;

    if ref_count > MAX_CELL_REFS {
        return Err(CellError::TooManyRefs(ref_count));
    }
    if level_mask != 0 {
        return Err(CellError::InvalidBoc(format!("unsupported level mask {}", level_mask)));
    }
    if with_hashes {
        // Stored hash + depth for level 0.
        reader.take(HASH_BYTES + 2)?;
    }

    let byte_len = (d2 as usize).div_ceil(2);
    let mut data = reader.take(byte_len)?.to_vec();

    let bit_len = if d2 % 2 == 0 {
        byte_len * 8
    } else {
        // Strip the completion tag from the last byte.
        let last = data.last_mut().ok_or(CellError::UnexpectedEof)?;
        if *last == 0 {
            return Err(CellError::InvalidBoc("missing completion tag".to_string()));
        }
        let trailing = last.trailing_zeros() as usize;
        *last &= !(1u8 << trailing);
        byte_len * 8 - trailing - 1
    };

    if bit_len > MAX_CELL_BITS {
        return Err(CellError::DataTooLong(bit_len));
    }

    let cell_type = if is_exotic {
        CellType::from_exotic_tag(data.first().copied().unwrap_or(0xFF))?
    } else {
        CellType::Ordinary
    };

    let refs = (0..ref_count)
        .map(|_| reader.uint(size_bytes))
        .collect::<CellResult<Vec<_>>>()?;

    Ok(RawCell {
        cell_type,
        data,
        bit_len,
        refs,
    })
}

fn bytes_needed(value: usize) -> usize {
    let bits = usize::BITS - value.leading_zeros();
    (bits as usize).div_ceil(8).max(1)
}

fn write_uint(out: &mut Vec<u8>, value: usize, len: usize) {
    let be = (value as u64).to_be_bytes();
    out.extend_from_slice(&be[8 - len..]);
}
