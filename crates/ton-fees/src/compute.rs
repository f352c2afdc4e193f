//! Fee formulas of the TON node, evaluated client-side.
//!
//! All prices are fixed-point with 16 fractional bits; intermediate products
//! are kept in `u128`.

use std::sync::Arc;

use ton_cell::{Cell, CellBuilder, CellSlice, CellStats};
use ton_wallet::StateInit;

use crate::config::{GasPrices, MsgPrices, StoragePrices};
use crate::error::{FeeError, FeeResult};
use crate::storage::StorageUsed;

/// `ceil(value / 2^16)`.
pub fn shr16ceil(value: u128) -> u128 {
    let result = value >> 16;
    if value & 0xffff != 0 { result + 1 } else { result }
}

/// Storage due for `used` between `last_paid` and `now`.
///
/// The interval is split across the price periods it overlaps. Nothing is
/// due for special accounts, for a non-advancing clock, or before the first
/// price period starts.
pub fn compute_storage_fees(
    now: u32,
    last_paid: u32,
    prices: &[StoragePrices],
    used: &StorageUsed,
    special: bool,
    masterchain: bool,
) -> u128 {
    let Some(first) = prices.first() else {
        return 0;
    };
    if now <= last_paid || now < first.utime_since || special {
        return 0;
    }

    let mut upto = last_paid.max(first.utime_since);
    let mut total: u128 = 0;
    for (i, period) in prices.iter().enumerate() {
        if upto >= now {
            break;
        }
        let valid_until = match prices.get(i + 1) {
            Some(next) => now.min(next.utime_since),
            None => now,
        };
        if upto < valid_until {
            let (bit_price, cell_price) = if masterchain {
                (period.mc_bit_price_ps, period.mc_cell_price_ps)
            } else {
                (period.bit_price_ps, period.cell_price_ps)
            };
            let per_second = used.cells as u128 * cell_price as u128 + used.bits as u128 * bit_price as u128;
            total += per_second * (valid_until - upto) as u128;
        }
        upto = upto.max(valid_until);
    }
    shr16ceil(total)
}

/// Forwarding price of `cells` cells holding `bits` bits.
pub fn compute_fwd_fees(prices: &MsgPrices, cells: u64, bits: u64) -> u128 {
    prices.lump_price as u128
        + shr16ceil(prices.bit_price as u128 * bits as u128 + prices.cell_price as u128 * cells as u128)
}

/// Price of `gas_used` gas units.
pub fn compute_gas_prices(gas_used: u64, prices: &GasPrices) -> u128 {
    if gas_used <= prices.flat_limit {
        return prices.flat_price as u128;
    }
    prices.flat_price as u128 + ((prices.price as u128 * (gas_used - prices.flat_limit) as u128) >> 16)
}

/// Import fee of an inbound external message.
///
/// The root cell is carried in the message header and not charged.
pub fn compute_external_message_fees(prices: &MsgPrices, message: &Cell) -> u128 {
    let stats = CellStats::collect(message, true);
    compute_fwd_fees(prices, stats.cells, stats.bits)
}

/// Forward fee of one outbound message split into the part charged at the
/// source and the part left for the next hops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardFees {
    /// Charged to the sender (`first_frac` share).
    pub fees: u128,
    pub remaining: u128,
}

/// Forward fee of a serialized `MessageRelaxed`.
///
/// The header is not charged. The state init and the body are charged in
/// full, with their root cells included.
pub fn compute_message_forward_fees(prices: &MsgPrices, message: &Cell) -> FeeResult<ForwardFees> {
    let (init, body) = split_message_relaxed(message)?;

    let mut stats = CellStats::default();
    for cell in init.iter().chain(std::iter::once(&body)) {
        let part = CellStats::collect(cell, false);
        stats.bits += part.bits;
        stats.cells += part.cells;
    }

    let total = compute_fwd_fees(prices, stats.cells, stats.bits);
    let fees = (total * prices.first_frac as u128) >> 16;
    Ok(ForwardFees {
        fees,
        remaining: total - fees,
    })
}

/// Extract the state init cell and the body cell of an internal message.
fn split_message_relaxed(message: &Cell) -> FeeResult<(Option<Arc<Cell>>, Arc<Cell>)> {
    let mut slice = CellSlice::new(message);

    // int_msg_info$0 ihr_disabled bounce bounced
    if slice.load_bit()? {
        return Err(FeeError::InvalidMessage("not an internal message".to_string()));
    }
    slice.skip_bits(3)?;
    slice.load_address()?;
    slice.load_address()?;
    slice.load_coins()?;
    slice.load_maybe_ref()?;
    slice.load_coins()?;
    slice.load_coins()?;
    slice.skip_bits(64 + 32)?;

    let init = if slice.load_bit()? {
        if slice.load_bit()? {
            Some(slice.load_ref()?.clone())
        } else {
            let init = StateInit::load(&mut slice)?;
            Some(Arc::new(init.to_cell()?))
        }
    } else {
        None
    };

    let body = if slice.load_bit()? {
        slice.load_ref()?.clone()
    } else {
        let mut builder = CellBuilder::new();
        builder.store_slice(&slice)?;
        Arc::new(builder.build()?)
    };
    Ok((init, body))
}
