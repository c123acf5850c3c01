//! Registry configuration

use idreg_core::config::{parse_value, ConfigError, ConfigValidator};
use idreg_core::math::WAD;
use idreg_core::Wei;
use serde::{Deserialize, Serialize};

const DAY: u64 = 24 * 60 * 60;

/// Name registry parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameConfig {
    /// Yearly fee in wei (default: 0.01 ether)
    pub fee: Wei,
    /// Seconds between commit and reveal (default: 60)
    pub reveal_delay: u64,
    /// Seconds before the same commit may be made again (default: 10 minutes)
    pub commit_replay_delay: u64,
    /// Grace period after expiry during which the owner may renew (default: 30 days)
    pub renewal_period: u64,
    /// Auction premium when bidding opens (default: 1000 ether)
    pub bid_start_price: Wei,
    /// Seconds per auction decay step (default: 8 hours)
    pub bid_period: u64,
    /// Per-period decay factor, WAD scaled (default: 0.9)
    pub bid_decay: u128,
    /// Name recovery escrow in seconds (default: 3 days)
    pub escrow_period: u64,
    /// First calendar year leases can be priced in
    pub first_year: i32,
    /// Last calendar year leases can be priced in
    pub last_year: i32,
}

impl Default for NameConfig {
    fn default() -> Self {
        Self {
            fee: WAD / 100,
            reveal_delay: 60,
            commit_replay_delay: 10 * 60,
            renewal_period: 30 * DAY,
            bid_start_price: 1_000 * WAD,
            bid_period: 8 * 60 * 60,
            bid_decay: WAD / 10 * 9,
            escrow_period: idreg_recovery::ESCROW_PERIOD,
            first_year: 2021,
            last_year: 2121,
        }
    }
}

impl NameConfig {
    /// Set one field from a string override
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        let key = format!("names.{field}");
        match field {
            "fee" => self.fee = parse_value(&key, value)?,
            "reveal_delay" => self.reveal_delay = parse_value(&key, value)?,
            "commit_replay_delay" => self.commit_replay_delay = parse_value(&key, value)?,
            "renewal_period" => self.renewal_period = parse_value(&key, value)?,
            "bid_start_price" => self.bid_start_price = parse_value(&key, value)?,
            "bid_period" => self.bid_period = parse_value(&key, value)?,
            "bid_decay" => self.bid_decay = parse_value(&key, value)?,
            "escrow_period" => self.escrow_period = parse_value(&key, value)?,
            "first_year" => self.first_year = parse_value(&key, value)?,
            "last_year" => self.last_year = parse_value(&key, value)?,
            _ => return Err(ConfigError::UnknownKey { key }),
        }
        Ok(())
    }

    /// Validation rules for this section
    pub fn validator(&self) -> ConfigValidator {
        let mut v = ConfigValidator::for_section("names");
        v.positive("bid_period", self.bid_period)
            .range("bid_decay", self.bid_decay, Some(1), Some(WAD))
            .custom(
                "commit_replay_delay",
                self.commit_replay_delay > self.reveal_delay,
                "must exceed reveal_delay",
            )
            .custom("last_year", self.last_year >= self.first_year, "must not precede first_year");
        v
    }
}
