//! Wallet versions and networks.

use serde::{Deserialize, Serialize};

/// Wallet contract version of an account.
///
/// Fixed for the lifetime of an account: the version decides both the
/// address derivation and the layout of the signed transfer body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletVersion {
    #[serde(rename = "v4R2")]
    V4R2,
    #[serde(rename = "v5R1")]
    V5R1,
}

impl WalletVersion {
    /// Maximum number of outbound messages a single transfer may carry.
    pub fn max_messages(&self) -> usize {
        match self {
            WalletVersion::V4R2 => 4,
            WalletVersion::V5R1 => 255,
        }
    }
}

impl std::fmt::Display for WalletVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletVersion::V4R2 => write!(f, "v4r2"),
            WalletVersion::V5R1 => write!(f, "v5r1"),
        }
    }
}

/// Global network ID of mainnet.
pub const NETWORK_MAINNET: i32 = -239;
/// Global network ID of testnet.
pub const NETWORK_TESTNET: i32 = -3;

/// TON network selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn from_testnet_flag(is_testnet: bool) -> Self {
        if is_testnet { Network::Testnet } else { Network::Mainnet }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::Testnet)
    }

    /// Global ID mixed into v5 wallet IDs.
    pub fn global_id(&self) -> i32 {
        match self {
            Network::Mainnet => NETWORK_MAINNET,
            Network::Testnet => NETWORK_TESTNET,
        }
    }
}
