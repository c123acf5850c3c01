//! Dutch auction pricing
//!
//! The premium starts at `bid_start` when the grace period ends and is
//! multiplied by `decay` once per elapsed `bid_period`. The power is computed
//! with [`pow_wad`], which rounds each step down; the premium can therefore
//! undershoot the exact value by a few wei-scale units. That error is
//! accepted; prices are never rounded back up.

use crate::config::NameConfig;
use idreg_core::math::{checked_add, mul_wad_down, pow_wad};
use idreg_core::{LedgerError, Timestamp, Wei};

/// Premium plus `prorated_fee` for a bid at `now` on an auction that opened
/// at `auction_start`
pub fn bid_price(
    config: &NameConfig,
    auction_start: Timestamp,
    now: Timestamp,
    prorated_fee: Wei,
) -> Result<Wei, LedgerError> {
    let periods = match config.bid_period {
        0 => 0,
        period => now.saturating_sub(auction_start) / period,
    };
    let factor = pow_wad(config.bid_decay, periods)?;
    let premium = mul_wad_down(config.bid_start_price, factor, "bid premium")?;
    checked_add(premium, prorated_fee, "bid price")
}
