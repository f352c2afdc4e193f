//! Unique bit and cell counters over a cell tree.

use std::collections::HashSet;

use crate::{Cell, HASH_BYTES};

/// Number of unique cells and their total data bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStats {
    pub bits: u64,
    pub cells: u64,
}

impl CellStats {
    /// Count every distinct cell reachable from `root`.
    ///
    /// With `skip_root` the root cell itself is not counted, which is how
    /// message fees are charged: the root travels inside the message header.
    pub fn collect(root: &Cell, skip_root: bool) -> Self {
        let mut visited = HashSet::new();
        let mut stats = CellStats::default();
        if skip_root {
            visited.insert(root.hash());
            for reference in root.references() {
                stats.walk(reference, &mut visited);
            }
        } else {
            stats.walk(root, &mut visited);
        }
        stats
    }

    fn walk(&mut self, cell: &Cell, visited: &mut HashSet<[u8; HASH_BYTES]>) {
        if !visited.insert(cell.hash()) {
            return;
        }
        self.bits += cell.bit_len() as u64;
        self.cells += 1;
        for reference in cell.references() {
            self.walk(reference, visited);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellBuilder;
    use std::sync::Arc;

    #[test]
    fn test_collect_counts_shared_cells_once() {
        let mut leaf = CellBuilder::new();
        leaf.store_u16(1).unwrap();
        let leaf = Arc::new(leaf.build().unwrap());

        let mut root = CellBuilder::new();
        root.store_u8(0xFF).unwrap();
        root.store_ref(leaf.clone()).unwrap();
        root.store_ref(leaf).unwrap();
        let root = root.build().unwrap();

        assert_eq!(CellStats::collect(&root, false), CellStats { bits: 24, cells: 2 });
        assert_eq!(CellStats::collect(&root, true), CellStats { bits: 16, cells: 1 });
    }

    #[test]
    fn test_collect_leaf_skip_root() {
        let cell = CellBuilder::new().build().unwrap();
        assert_eq!(CellStats::collect(&cell, true), CellStats::default());
    }
}
