//! Deterministic wallet contract resolution from a public key.

use tracing::debug;

use ton_cell::{Cell, MsgAddress};

use crate::codes::WalletCodes;
use crate::error::WalletResult;
use crate::message::StateInit;
use crate::transfer::TransferRequest;
use crate::v4r2::WalletV4R2;
use crate::v5r1::WalletV5R1;
use crate::version::{Network, WalletVersion};
use crate::wallet::Wallet;
use crate::wallet_id::{WalletIdContext, WalletIdV5};

/// Workchain used for every resolved wallet unless a v5 context says otherwise.
pub const BASECHAIN: i32 = 0;

/// A resolved wallet contract of either supported version.
#[derive(Debug, Clone)]
pub enum WalletContract {
    V4R2(WalletV4R2),
    V5R1(WalletV5R1),
}

impl WalletContract {
    fn inner(&self) -> &dyn Wallet {
        match self {
            WalletContract::V4R2(wallet) => wallet,
            WalletContract::V5R1(wallet) => wallet,
        }
    }

    pub fn version(&self) -> WalletVersion {
        self.inner().version()
    }

    pub fn address(&self) -> &MsgAddress {
        self.inner().address()
    }

    pub fn workchain(&self) -> i32 {
        self.inner().workchain()
    }

    /// Initial code and data of the contract.
    pub fn init(&self) -> &StateInit {
        self.inner().state_init()
    }

    /// The v5 wallet ID, `None` for v4 wallets.
    pub fn wallet_id(&self) -> Option<i32> {
        match self {
            WalletContract::V4R2(_) => None,
            WalletContract::V5R1(wallet) => Some(wallet.wallet_id_value()),
        }
    }

    pub fn create_transfer(&self, request: &TransferRequest) -> WalletResult<Cell> {
        self.inner().create_transfer(request)
    }

    pub fn external_message(&self, body: Cell, include_init: bool) -> WalletResult<Cell> {
        self.inner().external_message(body, include_init)
    }
}

/// Resolve the wallet contract owned by `public_key`.
///
/// V4 wallets live on the basechain with the default subwallet id. V5 wallets
/// derive their wallet ID from `v5_context` (the default client context when
/// absent) mixed with the network global ID. Key length errors surface from
/// contract construction.
pub fn resolve_contract(
    public_key: &[u8],
    version: WalletVersion,
    is_testnet: bool,
    codes: &WalletCodes,
    v5_context: Option<WalletIdContext>,
) -> WalletResult<WalletContract> {
    let contract = match version {
        WalletVersion::V4R2 => {
            WalletContract::V4R2(WalletV4R2::new(public_key, BASECHAIN, codes.code(version))?)
        }
        WalletVersion::V5R1 => {
            let network = Network::from_testnet_flag(is_testnet);
            let wallet_id = WalletIdV5::new(network, v5_context.unwrap_or_default());
            WalletContract::V5R1(WalletV5R1::new(public_key, wallet_id, codes.code(version))?)
        }
    };

    debug!(
        version = %version,
        testnet = is_testnet,
        address = %contract.address(),
        "resolved wallet contract"
    );
    Ok(contract)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WalletError;
    use std::sync::Arc;
    use ton_cell::CellBuilder;

    fn codes() -> WalletCodes {
        let mut v4 = CellBuilder::new();
        v4.store_u32(4).unwrap();
        let mut v5 = CellBuilder::new();
        v5.store_u32(5).unwrap();
        WalletCodes::new(Arc::new(v4.build().unwrap()), Arc::new(v5.build().unwrap()))
    }

    #[test]
    fn test_versions_yield_distinct_addresses() {
        let key = [7u8; 32];
        let v4 = resolve_contract(&key, WalletVersion::V4R2, false, &codes(), None).unwrap();
        let v5 = resolve_contract(&key, WalletVersion::V5R1, false, &codes(), None).unwrap();
        assert_ne!(v4.address(), v5.address());
        assert_eq!(v4.version(), WalletVersion::V4R2);
        assert_eq!(v4.wallet_id(), None);
        assert!(v5.wallet_id().is_some());
    }

    #[test]
    fn test_v4_ignores_network() {
        let key = [7u8; 32];
        let main = resolve_contract(&key, WalletVersion::V4R2, false, &codes(), None).unwrap();
        let test = resolve_contract(&key, WalletVersion::V4R2, true, &codes(), None).unwrap();
        assert_eq!(main.address(), test.address());
        assert_eq!(main.workchain(), 0);
    }

    #[test]
    fn test_v5_network_and_context() {
        let key = [7u8; 32];
        let main = resolve_contract(&key, WalletVersion::V5R1, false, &codes(), None).unwrap();
        let test = resolve_contract(&key, WalletVersion::V5R1, true, &codes(), None).unwrap();
        assert_ne!(main.wallet_id(), test.wallet_id());
        assert_ne!(main.address(), test.address());

        let legacy = resolve_contract(
            &key,
            WalletVersion::V5R1,
            false,
            &codes(),
            Some(WalletIdContext::Legacy { subwallet_id: 1 }),
        )
        .unwrap();
        assert_eq!(legacy.workchain(), 0);
        assert_ne!(legacy.address(), main.address());
    }

    #[test]
    fn test_deterministic() {
        let key = [7u8; 32];
        let a = resolve_contract(&key, WalletVersion::V5R1, true, &codes(), None).unwrap();
        let b = resolve_contract(&key, WalletVersion::V5R1, true, &codes(), None).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn test_bad_key_propagates() {
        let err = resolve_contract(&[1u8; 33], WalletVersion::V5R1, false, &codes(), None).unwrap_err();
        assert!(matches!(err, WalletError::InvalidPublicKey(33)));
    }
}
