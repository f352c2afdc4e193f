//! Decimal amount parsing and formatting.
//!
//! Users type amounts with either `,` or `.` as the decimal separator and
//! often paste them with grouping spaces (`"1 000,5"`). Parsing normalizes
//! both and converts to the smallest unit of the asset.

/// Decimals of the native coin.
pub const NATIVE_DECIMALS: u32 = 9;

/// One coin in nanocoins.
pub const ONE_COIN: u128 = 1_000_000_000;

/// Parse a user-entered amount into smallest units.
///
/// Returns `None` for empty, negative or malformed input, and for input with
/// more fractional digits than `decimals`.
pub fn parse_amount(text: &str, decimals: u32) -> Option<u128> {
    let normalized: String = text
        .replacen(',', ".", 1)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if normalized.is_empty() {
        return None;
    }

    let (whole, fraction) = match normalized.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (normalized.as_str(), ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if fraction.len() > decimals as usize {
        return None;
    }

    let scale = 10u128.checked_pow(decimals)?;
    let mut value = 0u128;
    for digit in whole.bytes() {
        value = value.checked_mul(10)?.checked_add((digit - b'0') as u128)?;
    }
    value = value.checked_mul(scale)?;

    let mut fraction_value = 0u128;
    for digit in fraction.bytes() {
        fraction_value = fraction_value * 10 + (digit - b'0') as u128;
    }
    let padding = 10u128.checked_pow(decimals - fraction.len() as u32)?;
    value.checked_add(fraction_value * padding)
}

/// Format smallest units as a decimal string without trailing zeros.
pub fn format_amount(value: u128, decimals: u32) -> String {
    let Some(scale) = 10u128.checked_pow(decimals) else {
        return value.to_string();
    };
    let whole = value / scale;
    let fraction = value % scale;
    if fraction == 0 {
        return whole.to_string();
    }

    let digits = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
