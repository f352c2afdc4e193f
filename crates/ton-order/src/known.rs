//! Registry of well-known wallets (exchanges, services).
//!
//! Some custodial services credit deposits by memo, so sending to them
//! without a comment loses funds. Those entries carry `require_memo`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ton_cell::{CellResult, MsgAddress};

/// A known wallet entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownWallet {
    pub name: String,
    #[serde(default)]
    pub require_memo: bool,
}

/// Known wallets keyed by workchain and account id, so every address form
/// (raw, bounceable, non-bounceable) resolves to the same entry.
#[derive(Debug, Clone, Default)]
pub struct KnownWallets {
    wallets: HashMap<(i32, [u8; 32]), KnownWallet>,
}

impl KnownWallets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a wallet by its address string.
    pub fn insert(&mut self, address: &str, wallet: KnownWallet) -> CellResult<()> {
        if let MsgAddress::Internal { workchain, address } = MsgAddress::from_string(address)? {
            self.wallets.insert((workchain, address), wallet);
        }
        Ok(())
    }

    pub fn get(&self, address: &MsgAddress) -> Option<&KnownWallet> {
        match address {
            MsgAddress::Internal { workchain, address } => self.wallets.get(&(*workchain, *address)),
            _ => None,
        }
    }

    /// Look up by any address string; unparsable input is simply unknown.
    pub fn lookup(&self, address: &str) -> Option<&KnownWallet> {
        MsgAddress::from_string(address).ok().and_then(|a| self.get(&a))
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}
