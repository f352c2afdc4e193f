//! Wallet trait definition

use std::sync::Arc;

use ton_cell::{Cell, MsgAddress};

use crate::error::{WalletError, WalletResult};
use crate::message::{ExternalMessage, StateInit};
use crate::transfer::TransferRequest;
use crate::version::WalletVersion;

/// Length of an Ed25519 signature.
pub const SIGNATURE_BYTES: usize = 64;

/// Signature written in place of the real one; signing happens outside this crate.
pub const PLACEHOLDER_SIGNATURE: [u8; SIGNATURE_BYTES] = [0u8; SIGNATURE_BYTES];

/// Common wallet interface
pub trait Wallet: Send + Sync {
    /// Get wallet version
    fn version(&self) -> WalletVersion;

    /// Get wallet address
    fn address(&self) -> &MsgAddress;

    /// Get public key
    fn public_key(&self) -> &[u8; 32];

    /// Get workchain
    fn workchain(&self) -> i32;

    /// State init used to deploy the wallet
    fn state_init(&self) -> &StateInit;

    /// Build the transfer body with [`PLACEHOLDER_SIGNATURE`] in the signature slot.
    fn create_transfer(&self, request: &TransferRequest) -> WalletResult<Cell>;

    /// Wrap a transfer body into an external message addressed to this wallet.
    ///
    /// `include_init` is set for the first transfer of a wallet that is not
    /// deployed yet (seqno 0).
    fn external_message(&self, body: Cell, include_init: bool) -> WalletResult<Cell> {
        ExternalMessage {
            to: self.address().clone(),
            init: include_init.then(|| self.state_init().clone()),
            body: Arc::new(body),
        }
        .to_cell()
    }
}

/// Convert an untrusted public key slice into a fixed-size key.
pub(crate) fn public_key_bytes(public_key: &[u8]) -> WalletResult<[u8; 32]> {
    public_key
        .try_into()
        .map_err(|_| WalletError::InvalidPublicKey(public_key.len()))
}

/// Reject requests the contract would refuse.
pub(crate) fn check_message_count(version: WalletVersion, request: &TransferRequest) -> WalletResult<()> {
    let max = version.max_messages();
    if request.messages.is_empty() {
        return Err(WalletError::NoMessages);
    }
    if request.messages.len() > max {
        return Err(WalletError::TooManyMessages {
            max,
            got: request.messages.len(),
        });
    }
    Ok(())
}

/// Contracts treat an all-ones expiry as "no expiry" for the deploying transfer.
pub(crate) fn expiry_for(request: &TransferRequest) -> u32 {
    if request.seqno == 0 { u32::MAX } else { request.valid_until }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_bytes() {
        assert!(public_key_bytes(&[1u8; 32]).is_ok());
        assert!(matches!(
            public_key_bytes(&[1u8; 31]),
            Err(WalletError::InvalidPublicKey(31))
        ));
    }

    #[test]
    fn test_expiry_for_first_transfer() {
        let request = TransferRequest::new(0, Default::default(), Vec::new(), 1_700_000_060);
        assert_eq!(expiry_for(&request), u32::MAX);

        let request = TransferRequest::new(5, Default::default(), Vec::new(), 1_700_000_060);
        assert_eq!(expiry_for(&request), 1_700_000_060);
    }
}
