//! Account storage statistics as reported by the chain.

use serde::{Deserialize, Serialize};

/// Storage used by an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsed {
    pub bits: u64,
    pub cells: u64,
    pub public_cells: u64,
}

/// Storage state of an account at some block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStat {
    /// Unix time storage was last paid for.
    pub last_paid: u32,
    /// Outstanding storage debt in nanocoins, as a decimal string.
    #[serde(default)]
    pub due_payment: Option<String>,
    pub used: StorageUsed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_rpc_shape() {
        let json = r#"{"lastPaid": 1700000000, "duePayment": null,
                       "used": {"bits": 1234, "cells": 5, "publicCells": 0}}"#;
        let stat: StorageStat = serde_json::from_str(json).unwrap();
        assert_eq!(stat.last_paid, 1_700_000_000);
        assert_eq!(stat.due_payment, None);
        assert_eq!(stat.used.cells, 5);
    }
}
