//! Wallet contract code cells.
//!
//! Code is supplied by the embedding application as base64 BoCs; nothing here
//! embeds contract bytecode.

use std::sync::Arc;

use ton_cell::{BagOfCells, Cell};

use crate::error::WalletResult;
use crate::version::WalletVersion;

/// Code cells for every supported wallet version.
#[derive(Debug, Clone)]
pub struct WalletCodes {
    pub v4r2: Arc<Cell>,
    pub v5r1: Arc<Cell>,
}

impl WalletCodes {
    pub fn new(v4r2: Arc<Cell>, v5r1: Arc<Cell>) -> Self {
        Self { v4r2, v5r1 }
    }

    /// Decode both codes from single-root base64 BoCs.
    pub fn from_base64(v4r2: &str, v5r1: &str) -> WalletResult<Self> {
        Ok(Self {
            v4r2: BagOfCells::single_root_from_base64(v4r2)?,
            v5r1: BagOfCells::single_root_from_base64(v5r1)?,
        })
    }

    pub fn code(&self, version: WalletVersion) -> Arc<Cell> {
        match version {
            WalletVersion::V4R2 => self.v4r2.clone(),
            WalletVersion::V5R1 => self.v5r1.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ton_cell::CellBuilder;

    #[test]
    fn test_from_base64() {
        let mut b = CellBuilder::new();
        b.store_u32(0xFF00F4A4).unwrap();
        let code = b.build().unwrap();
        let boc = BagOfCells::from_root(code.clone()).serialize_to_base64().unwrap();

        let codes = WalletCodes::from_base64(&boc, &boc).unwrap();
        assert_eq!(codes.code(WalletVersion::V4R2).hash(), code.hash());
        assert_eq!(codes.code(WalletVersion::V5R1).hash(), code.hash());

        assert!(WalletCodes::from_base64("not a boc", &boc).is_err());
    }
}
