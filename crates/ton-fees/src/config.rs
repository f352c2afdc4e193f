//! Chain price parameters used by fee formulas.
//!
//! A [`ChainConfigSnapshot`] is fetched by the caller and is read-only input
//! for one estimation pass. The parsers below read the raw config param cells:
//!
//! ```tlb
//! storage_prices#cc utime_since:uint32 bit_price_ps:uint64 cell_price_ps:uint64
//!   mc_bit_price_ps:uint64 mc_cell_price_ps:uint64 = StoragePrices;        // param 18 entry
//! gas_flat_pfx#d1 flat_gas_limit:uint64 flat_gas_price:uint64
//!   other:GasLimitsPrices = GasLimitsPrices;                                // params 20, 21
//! msg_forward_prices#ea lump_price:uint64 bit_price:uint64 cell_price:uint64
//!   ihr_price_factor:uint32 first_frac:uint16 next_frac:uint16 = MsgForwardPrices; // params 24, 25
//! ```

use serde::{Deserialize, Serialize};
use ton_cell::{Cell, CellSlice};

use crate::error::{FeeError, FeeResult};

const TAG_STORAGE_PRICES: u8 = 0xcc;
const TAG_GAS_FLAT_PFX: u8 = 0xd1;
const TAG_GAS_PRICES: u8 = 0xdd;
const TAG_GAS_PRICES_EXT: u8 = 0xde;
const TAG_MSG_FORWARD_PRICES: u8 = 0xea;

/// Storage prices valid since `utime_since` (per bit/cell per second, 2^-16 units).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoragePrices {
    pub utime_since: u32,
    pub bit_price_ps: u64,
    pub cell_price_ps: u64,
    pub mc_bit_price_ps: u64,
    pub mc_cell_price_ps: u64,
}

/// Gas prices of one chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPrices {
    /// Gas covered by `flat_price`.
    pub flat_limit: u64,
    pub flat_price: u64,
    /// Price of gas above the flat limit, in 2^-16 nanocoins per unit.
    pub price: u64,
    #[serde(default)]
    pub gas_limit: u64,
    #[serde(default)]
    pub gas_credit: u64,
}

/// Forwarding prices of one chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgPrices {
    pub lump_price: u64,
    pub bit_price: u64,
    pub cell_price: u64,
    #[serde(default)]
    pub ihr_price_factor: u32,
    /// Share of the forward fee charged at the source, in 2^-16 units.
    pub first_frac: u16,
    #[serde(default)]
    pub next_frac: u16,
}

/// Gas and message prices of a chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkchainPrices {
    pub gas: GasPrices,
    pub message: MsgPrices,
}

/// Price parameters needed for one estimation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfigSnapshot {
    /// Storage price periods, ordered by `utime_since`.
    pub storage: Vec<StoragePrices>,
    pub masterchain: WorkchainPrices,
    pub workchain: WorkchainPrices,
}

fn invalid(param: u32, reason: impl Into<String>) -> FeeError {
    FeeError::InvalidConfig {
        param,
        reason: reason.into(),
    }
}

/// Parse one entry of config param 18.
pub fn parse_storage_prices(cell: &Cell) -> FeeResult<StoragePrices> {
    let mut slice = CellSlice::new(cell);
    let tag = slice.load_u8()?;
    if tag != TAG_STORAGE_PRICES {
        return Err(invalid(18, format!("unexpected tag 0x{:02x}", tag)));
    }
    Ok(StoragePrices {
        utime_since: slice.load_u32()?,
        bit_price_ps: slice.load_u64()?,
        cell_price_ps: slice.load_u64()?,
        mc_bit_price_ps: slice.load_u64()?,
        mc_cell_price_ps: slice.load_u64()?,
    })
}

/// Parse config param 20 (masterchain) or 21 (workchain).
pub fn parse_gas_prices(param: u32, cell: &Cell) -> FeeResult<GasPrices> {
    let mut slice = CellSlice::new(cell);
    let mut tag = slice.load_u8()?;

    let mut prices = GasPrices::default();
    if tag == TAG_GAS_FLAT_PFX {
        prices.flat_limit = slice.load_u64()?;
        prices.flat_price = slice.load_u64()?;
        tag = slice.load_u8()?;
    }

    match tag {
        TAG_GAS_PRICES_EXT => {
            prices.price = slice.load_u64()?;
            prices.gas_limit = slice.load_u64()?;
            let _special_gas_limit = slice.load_u64()?;
            prices.gas_credit = slice.load_u64()?;
        }
        TAG_GAS_PRICES => {
            prices.price = slice.load_u64()?;
            prices.gas_limit = slice.load_u64()?;
            prices.gas_credit = slice.load_u64()?;
        }
        other => return Err(invalid(param, format!("unexpected tag 0x{:02x}", other))),
    }
    Ok(prices)
}

/// Parse config param 24 (masterchain) or 25 (workchain).
pub fn parse_msg_prices(param: u32, cell: &Cell) -> FeeResult<MsgPrices> {
    let mut slice = CellSlice::new(cell);
    let tag = slice.load_u8()?;
    if tag != TAG_MSG_FORWARD_PRICES {
        return Err(invalid(param, format!("unexpected tag 0x{:02x}", tag)));
    }
    Ok(MsgPrices {
        lump_price: slice.load_u64()?,
        bit_price: slice.load_u64()?,
        cell_price: slice.load_u64()?,
        ihr_price_factor: slice.load_u32()?,
        first_frac: slice.load_u16()?,
        next_frac: slice.load_u16()?,
    })
}
