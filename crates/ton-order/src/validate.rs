//! Inline validation of the transfer form.
//!
//! These checks produce typed issues for display next to the inputs. None of
//! them is an error: the user fixes the input and the form re-validates.

use ton_cell::MsgAddress;

use crate::known::KnownWallet;

/// Problem with the amount field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountIssue {
    /// Nothing typed yet.
    Empty,
    /// Not a number, negative, or too many decimals.
    Invalid,
    /// More than the balance.
    NotEnoughCoins,
    /// Jetton transfers of zero tokens are pointless.
    ZeroJetton,
}

/// Problem with the comment field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoIssue {
    /// The target credits deposits by memo.
    Required,
}

/// Condition the user must confirm before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferWarning {
    SendingToSelf,
    /// A zero-value native transfer, e.g. to deliver only a comment.
    ZeroAmount,
}

/// Check the amount field. `amount` is the parsed value of `text`.
pub fn amount_issue(text: &str, amount: Option<u128>, balance: u128, is_jetton: bool) -> Option<AmountIssue> {
    if text.is_empty() {
        return Some(AmountIssue::Empty);
    }
    let amount = match amount {
        Some(amount) => amount,
        None => return Some(AmountIssue::Invalid),
    };
    if amount > balance {
        return Some(AmountIssue::NotEnoughCoins);
    }
    if amount == 0 && is_jetton {
        return Some(AmountIssue::ZeroJetton);
    }
    None
}

/// Check the comment field against the target's known wallet entry.
pub fn memo_issue(comment: &str, known: Option<&KnownWallet>) -> Option<MemoIssue> {
    if comment.is_empty() && known.is_some_and(|k| k.require_memo) {
        return Some(MemoIssue::Required);
    }
    None
}

pub fn self_transfer_warning(target: &MsgAddress, own: &MsgAddress) -> Option<TransferWarning> {
    (target == own).then_some(TransferWarning::SendingToSelf)
}

/// Final checks right before handing the order to signing.
///
/// Hard failures come back as `Err`; the warnings in `Ok` must each be
/// confirmed by the user.
pub fn pre_send_check(
    amount: u128,
    balance: u128,
    is_jetton: bool,
    target: &MsgAddress,
    own: &MsgAddress,
) -> Result<Vec<TransferWarning>, AmountIssue> {
    if balance < amount || balance == 0 {
        return Err(AmountIssue::NotEnoughCoins);
    }

    let mut warnings = Vec::new();
    warnings.extend(self_transfer_warning(target, own));
    if amount == 0 {
        if is_jetton {
            return Err(AmountIssue::ZeroJetton);
        }
        warnings.push(TransferWarning::ZeroAmount);
    }
    Ok(warnings)
}
