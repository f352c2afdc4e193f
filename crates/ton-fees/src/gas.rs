//! Gas consumed by a wallet transfer, by number of outbound messages.
//!
//! These are measured approximations of the wallet contract's execution and
//! do not depend on message contents.

use crate::error::{FeeError, FeeResult};

const GAS_BY_MESSAGES: [u64; 4] = [3308, 3950, 4592, 5234];

/// Gas units of a transfer sending `count` messages.
///
/// Only 1 to 4 messages are measured; other counts are rejected rather than
/// priced at zero.
pub fn gas_for_messages(count: usize) -> FeeResult<u64> {
    count
        .checked_sub(1)
        .and_then(|i| GAS_BY_MESSAGES.get(i))
        .copied()
        .ok_or(FeeError::UnsupportedMessageCount(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table() {
        assert_eq!(gas_for_messages(1).unwrap(), 3308);
        assert_eq!(gas_for_messages(2).unwrap(), 3950);
        assert_eq!(gas_for_messages(3).unwrap(), 4592);
        assert_eq!(gas_for_messages(4).unwrap(), 5234);
    }

    #[test]
    fn test_unmeasured_counts() {
        assert!(matches!(gas_for_messages(0), Err(FeeError::UnsupportedMessageCount(0))));
        assert!(matches!(gas_for_messages(5), Err(FeeError::UnsupportedMessageCount(5))));
    }
}
