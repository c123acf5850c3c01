//! ETH/USD price cache with staleness and liveness checks

use crate::config::OracleConfig;
use crate::error::{FeedKind, OracleError, OracleResult};
use crate::events::OracleEvent;
use idreg_core::math::div_wad_up;
use idreg_core::{Block, EventEnvelope, Journal, LedgerError, PriceFeed, RoundData, Wei};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Decimals of feed answers and USD prices
pub const PRICE_DECIMALS: u32 = 8;

/// Outcome of a successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// Price before the refresh
    pub previous: u128,
    /// Price after the refresh
    pub current: u128,
    /// Block the refresh happened in
    pub block: Block,
}

/// Wei price of `units` at `usd_per_unit` (8 decimals) and `eth_usd` (8 decimals).
///
/// Rounds up so truncation can never let a caller underpay.
pub fn quote(units: u64, usd_per_unit: u128, eth_usd: u128) -> Result<Wei, LedgerError> {
    let usd = u128::from(units)
        .checked_mul(usd_per_unit)
        .ok_or_else(|| LedgerError::overflow("quote"))?;
    div_wad_up(usd, eth_usd, "quote")
}

/// Cached ETH/USD price backed by an aggregated feed.
#[derive(Clone)]
pub struct PriceOracle {
    config: OracleConfig,
    price_feed: Arc<dyn PriceFeed>,
    uptime_feed: Option<Arc<dyn PriceFeed>>,
    eth_usd_price: u128,
    prev_eth_usd_price: u128,
    last_update_block: u64,
    last_update_time: u64,
    journal: Journal<OracleEvent>,
}

impl fmt::Debug for PriceOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceOracle")
            .field("config", &self.config)
            .field("eth_usd_price", &self.eth_usd_price)
            .field("prev_eth_usd_price", &self.prev_eth_usd_price)
            .field("last_update_block", &self.last_update_block)
            .field("last_update_time", &self.last_update_time)
            .field("has_uptime_feed", &self.uptime_feed.is_some())
            .finish_non_exhaustive()
    }
}

impl PriceOracle {
    /// Create the oracle and take an initial reading.
    ///
    /// With a fixed price configured the feeds are never read.
    pub fn new(
        config: OracleConfig,
        price_feed: Arc<dyn PriceFeed>,
        uptime_feed: Option<Arc<dyn PriceFeed>>,
        block: Block,
    ) -> OracleResult<Self> {
        let mut oracle = Self {
            config,
            price_feed,
            uptime_feed,
            eth_usd_price: 0,
            prev_eth_usd_price: 0,
            last_update_block: 0,
            last_update_time: 0,
            journal: Journal::new(),
        };
        if oracle.config.fixed_eth_usd_price == 0 {
            oracle.refresh_price(block)?;
        }
        Ok(oracle)
    }

    /// Read both feeds and replace the cached price.
    pub fn refresh_price(&mut self, block: Block) -> OracleResult<PriceUpdate> {
        let now = block.timestamp;
        if let Some(uptime_feed) = &self.uptime_feed {
            let round = uptime_feed.latest_round().map_err(|source| {
                tracing::warn!(%source, "uptime feed read failed");
                OracleError::Feed {
                    feed: FeedKind::Uptime,
                    source,
                }
            })?;
            self.check_uptime(&round, now)?;
        }

        let round = self.price_feed.latest_round().map_err(|source| {
            tracing::warn!(%source, "price feed read failed");
            OracleError::Feed {
                feed: FeedKind::Price,
                source,
            }
        })?;
        let price = self.check_price(&round, now)?;

        let previous = if self.eth_usd_price == 0 {
            price
        } else {
            self.eth_usd_price
        };
        self.prev_eth_usd_price = previous;
        self.eth_usd_price = price;
        self.last_update_block = block.number;
        self.last_update_time = now;
        self.journal.record(
            block,
            OracleEvent::PriceRefreshed {
                previous,
                current: price,
            },
        );
        tracing::info!(previous, current = price, block = block.number, "eth/usd price refreshed");

        Ok(PriceUpdate {
            previous,
            current: price,
            block,
        })
    }

    fn check_uptime(&self, round: &RoundData, now: u64) -> OracleResult<()> {
        if round.answer != 0 {
            return Err(OracleError::SequencerDown);
        }
        if round.round_id == 0 || round.updated_at == 0 {
            return Err(OracleError::IncompleteRound {
                feed: FeedKind::Uptime,
            });
        }
        if round.answered_in_round < round.round_id {
            return Err(OracleError::StaleAnswer {
                feed: FeedKind::Uptime,
            });
        }
        if round.updated_at > now {
            return Err(OracleError::InvalidRoundTimestamp {
                feed: FeedKind::Uptime,
                updated_at: round.updated_at,
            });
        }
        if now.saturating_sub(round.started_at) < self.config.uptime_grace_period {
            return Err(OracleError::GracePeriodNotOver {
                restarted_at: round.started_at,
                grace_ends: round
                    .started_at
                    .saturating_add(self.config.uptime_grace_period),
            });
        }
        Ok(())
    }

    fn check_price(&self, round: &RoundData, now: u64) -> OracleResult<u128> {
        if round.answer <= 0 {
            return Err(OracleError::InvalidPrice {
                answer: round.answer,
            });
        }
        if round.round_id == 0 || round.updated_at == 0 {
            return Err(OracleError::IncompleteRound {
                feed: FeedKind::Price,
            });
        }
        if round.updated_at > now {
            return Err(OracleError::InvalidRoundTimestamp {
                feed: FeedKind::Price,
                updated_at: round.updated_at,
            });
        }
        if round.answered_in_round < round.round_id
            || now - round.updated_at > self.config.max_age
        {
            return Err(OracleError::StaleAnswer {
                feed: FeedKind::Price,
            });
        }
        // answer > 0 was checked above
        let price = round.answer.unsigned_abs();
        if price < self.config.min_answer || price > self.config.max_answer {
            return Err(OracleError::PriceOutOfBounds {
                price,
                min: self.config.min_answer,
                max: self.config.max_answer,
            });
        }
        Ok(price)
    }

    /// Price to charge in `block`, refreshing first if the cache has expired.
    ///
    /// If the cache was refreshed in this very block the pre-refresh price is
    /// returned.
    pub fn current_price(&mut self, block: Block) -> OracleResult<u128> {
        if self.config.fixed_eth_usd_price != 0 {
            return Ok(self.config.fixed_eth_usd_price);
        }
        if block.timestamp.saturating_sub(self.last_update_time) > self.config.cache_duration {
            self.refresh_price(block)?;
        }
        Ok(self.cached_price(block))
    }

    /// Price a view would report in `block`; never refreshes.
    pub fn cached_price(&self, block: Block) -> u128 {
        if self.config.fixed_eth_usd_price != 0 {
            self.config.fixed_eth_usd_price
        } else if self.last_update_block == block.number {
            self.prev_eth_usd_price
        } else {
            self.eth_usd_price
        }
    }

    /// Latest cached feed price
    pub fn eth_usd_price(&self) -> u128 {
        self.eth_usd_price
    }

    /// Cached feed price before the latest refresh
    pub fn prev_eth_usd_price(&self) -> u128 {
        self.prev_eth_usd_price
    }

    /// Block of the latest refresh
    pub fn last_update_block(&self) -> u64 {
        self.last_update_block
    }

    /// Timestamp of the latest refresh
    pub fn last_update_time(&self) -> u64 {
        self.last_update_time
    }

    /// Active configuration
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Oracle events
    pub fn journal(&self) -> &Journal<OracleEvent> {
        &self.journal
    }

    /// Hand off held oracle events
    pub fn drain_envelopes(&mut self) -> Result<Vec<EventEnvelope>, serde_json::Error> {
        self.journal.drain_envelopes()
    }

    /// Set or clear (with 0) the emergency fixed price; returns the old value
    pub fn set_fixed_price(&mut self, price: u128) -> OracleResult<u128> {
        if price != 0 && (price < self.config.min_answer || price > self.config.max_answer) {
            return Err(OracleError::InvalidFixedPrice { price });
        }
        Ok(std::mem::replace(&mut self.config.fixed_eth_usd_price, price))
    }

    /// Set the lower answer bound; returns the old value
    pub fn set_min_answer(&mut self, min: u128) -> OracleResult<u128> {
        if min >= self.config.max_answer {
            return Err(OracleError::InvalidMinAnswer {
                min,
                max: self.config.max_answer,
            });
        }
        Ok(std::mem::replace(&mut self.config.min_answer, min))
    }

    /// Set the upper answer bound; returns the old value
    pub fn set_max_answer(&mut self, max: u128) -> OracleResult<u128> {
        if max <= self.config.min_answer {
            return Err(OracleError::InvalidMaxAnswer {
                min: self.config.min_answer,
                max,
            });
        }
        Ok(std::mem::replace(&mut self.config.max_answer, max))
    }

    /// Set the cache duration; returns the old value
    pub fn set_cache_duration(&mut self, seconds: u64) -> u64 {
        std::mem::replace(&mut self.config.cache_duration, seconds)
    }

    /// Set the maximum answer age; returns the old value
    pub fn set_max_age(&mut self, seconds: u64) -> u64 {
        std::mem::replace(&mut self.config.max_age, seconds)
    }

    /// Set the liveness grace period; returns the old value
    pub fn set_uptime_grace_period(&mut self, seconds: u64) -> u64 {
        std::mem::replace(&mut self.config.uptime_grace_period, seconds)
    }
}
