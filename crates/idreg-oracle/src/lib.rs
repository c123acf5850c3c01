//! # idreg Oracle - Domain Layer
//!
//! Produces a trustworthy ETH/USD figure for storage and name pricing.
//!
//! The oracle caches the latest answer of an aggregated price feed, guarded by
//! an optional liveness (sequencer uptime) feed. A refresh is refused when the
//! liveness feed reports down or restarted recently, when a round is
//! incomplete or stamped in the future, when the answer is non-positive,
//! stale, or outside configured bounds. Reads inside the block that refreshed
//! the cache see the price from before the refresh, so one block cannot both
//! move and consume the price.

#![forbid(unsafe_code)]

/// Oracle configuration
pub mod config;

/// Oracle errors
pub mod error;

/// Oracle events
pub mod events;

/// The price cache and refresh logic
pub mod oracle;

pub use config::OracleConfig;
pub use error::{FeedKind, OracleError, OracleResult};
pub use events::OracleEvent;
pub use oracle::{quote, PriceOracle, PriceUpdate, PRICE_DECIMALS};
