//! Transfer form state and its transition function.
//!
//! The form is a plain value; every edit is a [`FormAction`] applied by
//! [`reduce`], which keeps the state transitions testable without any UI.

use crate::amount::format_amount;
use crate::builder::Asset;
use ton_cell::FRIENDLY_ADDRESS_LEN;

/// Transfer form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    /// Raw text of the address field.
    pub input: String,
    /// Resolved friendly target; empty until the input resolves.
    pub target: String,
    /// Domain the target was resolved from.
    pub domain: Option<String>,
    pub amount: String,
    pub comment: String,
    pub asset: Asset,
}

/// Edits to the transfer form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    /// User typed into the address field.
    Input(String),
    /// Target resolved out of band (contact, QR code).
    Target(String),
    Domain(Option<String>),
    /// DNS resolution finished.
    DomainTarget { domain: Option<String>, target: String },
    InputTarget { input: String, target: String },
    Amount(String),
    Comment(String),
    SelectAsset(Asset),
    /// Fill the amount with the whole balance of the selected asset.
    Max { balance: u128 },
    Clear,
}

/// Apply `action` to `state`.
pub fn reduce(state: &TransferForm, action: FormAction) -> TransferForm {
    match action {
        FormAction::Input(input) => {
            if input == state.input {
                return state.clone();
            }
            // A full-length input is taken as an address; anything else
            // waits for domain resolution.
            let target = if input.len() == FRIENDLY_ADDRESS_LEN {
                input.clone()
            } else {
                String::new()
            };
            TransferForm {
                input,
                target,
                domain: None,
                ..state.clone()
            }
        }
        FormAction::Target(target) => TransferForm {
            target,
            ..state.clone()
        },
        FormAction::Domain(domain) => TransferForm {
            domain,
            ..state.clone()
        },
        FormAction::DomainTarget { domain, target } => TransferForm {
            domain,
            target,
            ..state.clone()
        },
        FormAction::InputTarget { input, target } => TransferForm {
            input,
            target,
            ..state.clone()
        },
        FormAction::Amount(amount) => TransferForm {
            amount,
            ..state.clone()
        },
        FormAction::Comment(comment) => TransferForm {
            comment,
            ..state.clone()
        },
        FormAction::SelectAsset(asset) => TransferForm {
            asset,
            ..state.clone()
        },
        FormAction::Max { balance } => TransferForm {
            amount: format_amount(balance, state.asset.decimals()),
            ..state.clone()
        },
        FormAction::Clear => TransferForm {
            input: String::new(),
            target: String::new(),
            domain: None,
            ..state.clone()
        },
    }
}
