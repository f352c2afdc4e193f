//! Transfer parameters: send mode flags and the signing request.

use std::ops::BitOr;

use crate::message::InternalMessage;

/// Outbound message send mode (`mode:uint8` of `action_send_msg`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SendMode(u8);

impl SendMode {
    pub const NONE: SendMode = SendMode(0);
    pub const PAY_GAS_SEPARATELY: SendMode = SendMode(1);
    pub const IGNORE_ERRORS: SendMode = SendMode(2);
    pub const DESTROY_ACCOUNT_IF_ZERO: SendMode = SendMode(32);
    pub const CARRY_ALL_REMAINING_INCOMING_VALUE: SendMode = SendMode(64);
    pub const CARRY_ALL_REMAINING_BALANCE: SendMode = SendMode(128);

    pub const fn from_bits(bits: u8) -> Self {
        SendMode(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn contains(&self, other: SendMode) -> bool {
        self.0 & other.0 == other.0
    }

    /// Mode used by regular wallet transfers.
    pub const fn default_transfer() -> Self {
        SendMode(Self::PAY_GAS_SEPARATELY.0 | Self::IGNORE_ERRORS.0)
    }
}

impl BitOr for SendMode {
    type Output = SendMode;

    fn bitor(self, rhs: SendMode) -> SendMode {
        SendMode(self.0 | rhs.0)
    }
}

/// Everything a wallet needs to encode one signed transfer request.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub seqno: u32,
    pub send_mode: SendMode,
    pub messages: Vec<InternalMessage>,
    /// Unix time after which the request is rejected by the contract.
    pub valid_until: u32,
}

impl TransferRequest {
    pub fn new(seqno: u32, send_mode: SendMode, messages: Vec<InternalMessage>, valid_until: u32) -> Self {
        Self {
            seqno,
            send_mode,
            messages,
            valid_until,
        }
    }
}
