//! Wallet ID derivation for V5R1 wallets.
//!
//! The 32-bit context is packed MSB first:
//!
//! ```text
//! client context:  1 | workchain:int8 | wallet_version:uint8 | subwallet_number:uint15
//! legacy context:  0 | subwallet_id:uint31
//! ```
//!
//! and the stored wallet ID is `network_global_id XOR context`.

use serde::{Deserialize, Serialize};

use crate::error::{WalletError, WalletResult};
use crate::version::Network;

const CLIENT_CONTEXT_FLAG: u32 = 1 << 31;
const SUBWALLET_NUMBER_MASK: u32 = 0x7FFF;
const LEGACY_MASK: u32 = 0x7FFF_FFFF;

/// Wallet version tag of V5R1 inside a client context.
pub const WALLET_VERSION_V5R1: u8 = 0;

/// Context part of a V5 wallet ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalletIdContext {
    /// Structured client context.
    Client {
        workchain: i8,
        wallet_version: u8,
        subwallet_number: u16,
    },
    /// Plain 31-bit subwallet id.
    Legacy { subwallet_id: u32 },
}

impl WalletIdContext {
    /// Client context on the given workchain and subwallet.
    pub fn client(workchain: i8, subwallet_number: u16) -> Self {
        WalletIdContext::Client {
            workchain,
            wallet_version: WALLET_VERSION_V5R1,
            subwallet_number,
        }
    }

    /// Pack into the 32-bit context value.
    pub fn pack(&self) -> WalletResult<u32> {
        match *self {
            WalletIdContext::Client {
                workchain,
                wallet_version,
                subwallet_number,
            } => {
                if subwallet_number as u32 > SUBWALLET_NUMBER_MASK {
                    return Err(WalletError::InvalidWalletId(format!(
                        "subwallet number {} does not fit 15 bits",
                        subwallet_number
                    )));
                }
                // Cast through u8 keeps the two's complement byte of the workchain.
                Ok(CLIENT_CONTEXT_FLAG
                    | ((workchain as u8 as u32) << 23)
                    | ((wallet_version as u32) << 15)
                    | subwallet_number as u32)
            }
            WalletIdContext::Legacy { subwallet_id } => {
                if subwallet_id > LEGACY_MASK {
                    return Err(WalletError::InvalidWalletId(format!(
                        "legacy subwallet id {} does not fit 31 bits",
                        subwallet_id
                    )));
                }
                Ok(subwallet_id)
            }
        }
    }

    /// Unpack a 32-bit context value.
    pub fn unpack(context: u32) -> Self {
        if context & CLIENT_CONTEXT_FLAG != 0 {
            WalletIdContext::Client {
                workchain: ((context >> 23) & 0xFF) as u8 as i8,
                wallet_version: ((context >> 15) & 0xFF) as u8,
                subwallet_number: (context & SUBWALLET_NUMBER_MASK) as u16,
            }
        } else {
            WalletIdContext::Legacy {
                subwallet_id: context & LEGACY_MASK,
            }
        }
    }

    /// Workchain of the context; a legacy context lives on workchain 0.
    pub fn workchain(&self) -> i32 {
        match self {
            WalletIdContext::Client { workchain, .. } => *workchain as i32,
            WalletIdContext::Legacy { .. } => 0,
        }
    }
}

impl Default for WalletIdContext {
    fn default() -> Self {
        WalletIdContext::client(0, 0)
    }
}

/// Full V5R1 wallet ID: network plus context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletIdV5 {
    pub network_global_id: i32,
    pub context: WalletIdContext,
}

impl WalletIdV5 {
    pub fn new(network: Network, context: WalletIdContext) -> Self {
        Self {
            network_global_id: network.global_id(),
            context,
        }
    }

    /// The signed 32-bit value stored in the wallet data and signed requests.
    pub fn serialize(&self) -> WalletResult<i32> {
        let context = self.context.pack()?;
        Ok(self.network_global_id ^ context as i32)
    }

    /// Recover the context from a stored wallet ID.
    pub fn deserialize(wallet_id: i32, network_global_id: i32) -> Self {
        let context = (wallet_id ^ network_global_id) as u32;
        Self {
            network_global_id,
            context: WalletIdContext::unpack(context),
        }
    }

    pub fn workchain(&self) -> i32 {
        self.context.workchain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mainnet_wallet_id() {
        // 0x80000000 ^ -239 as seen on every default W5 deployment.
        let id = WalletIdV5::new(Network::Mainnet, WalletIdContext::default())
            .serialize()
            .unwrap();
        assert_eq!(id, 2147483409);
    }

    #[test]
    fn test_networks_differ() {
        let ctx = WalletIdContext::client(0, 7);
        let main = WalletIdV5::new(Network::Mainnet, ctx).serialize().unwrap();
        let test = WalletIdV5::new(Network::Testnet, ctx).serialize().unwrap();
        assert_ne!(main, test);
        // Deterministic.
        assert_eq!(main, WalletIdV5::new(Network::Mainnet, ctx).serialize().unwrap());
    }

    #[test]
    fn test_negative_workchain_byte() {
        let id = WalletIdV5::new(Network::Mainnet, WalletIdContext::client(-1, 0))
            .serialize()
            .unwrap();
        let context = (id ^ -239) as u32;
        assert_eq!((context >> 23) & 0xFF, 0xFF);
        assert_eq!(context >> 31, 1);
    }

    #[test]
    fn test_legacy_context() {
        let ctx = WalletIdContext::Legacy { subwallet_id: 698983191 };
        assert_eq!(ctx.pack().unwrap() >> 31, 0);
        assert_eq!(ctx.workchain(), 0);

        let too_big = WalletIdContext::Legacy { subwallet_id: 1 << 31 };
        assert!(too_big.pack().is_err());
    }

    #[test]
    fn test_roundtrip_context() {
        for ctx in [
            WalletIdContext::client(-1, 12345),
            WalletIdContext::Legacy { subwallet_id: 42 },
        ] {
            let wallet_id = WalletIdV5::new(Network::Testnet, ctx);
            let stored = wallet_id.serialize().unwrap();
            assert_eq!(WalletIdV5::deserialize(stored, -3), wallet_id);
        }
    }

    #[test]
    fn test_subwallet_number_limit() {
        assert!(WalletIdContext::client(0, 0x8000).pack().is_err());
    }
}
