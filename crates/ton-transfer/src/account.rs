//! The account a transfer is sent from.

use ton_cell::MsgAddress;
use ton_wallet::{resolve_contract, Network, WalletCodes, WalletContract, WalletIdContext, WalletVersion};

use crate::error::TransferResult;

/// Sending account, passed explicitly to everything that needs it.
#[derive(Debug, Clone)]
pub struct AccountContext {
    pub public_key: [u8; 32],
    pub version: WalletVersion,
    pub network: Network,
    /// Native balance in nanocoins, once loaded.
    pub balance: Option<u128>,
    contract: WalletContract,
}

impl AccountContext {
    /// Resolve the wallet contract of `public_key`.
    pub fn new(
        public_key: [u8; 32],
        version: WalletVersion,
        network: Network,
        codes: &WalletCodes,
        v5_context: Option<WalletIdContext>,
    ) -> TransferResult<Self> {
        let contract = resolve_contract(&public_key, version, network.is_testnet(), codes, v5_context)?;
        Ok(Self {
            public_key,
            version,
            network,
            balance: None,
            contract,
        })
    }

    pub fn with_balance(mut self, balance: u128) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn address(&self) -> &MsgAddress {
        self.contract.address()
    }

    /// Friendly form of the wallet address, non-bounceable as for receiving.
    pub fn friendly_address(&self) -> Option<String> {
        self.address().to_user_friendly(false, self.network.is_testnet())
    }

    pub fn contract(&self) -> &WalletContract {
        &self.contract
    }
}
