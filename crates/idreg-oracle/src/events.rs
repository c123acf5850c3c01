//! Oracle events

use idreg_core::DomainEvent;
use serde::{Deserialize, Serialize};

/// Type identifier for oracle events
pub const ORACLE_EVENT_TYPE_ID: &str = "oracle";

/// Events emitted by the price oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleEvent {
    /// The cached ETH/USD price was refreshed from the feed
    PriceRefreshed {
        /// Price before the refresh
        previous: u128,
        /// Price after the refresh
        current: u128,
    },
}

impl DomainEvent for OracleEvent {
    fn type_id(&self) -> &'static str {
        ORACLE_EVENT_TYPE_ID
    }

    fn sub_type(&self) -> &'static str {
        match self {
            OracleEvent::PriceRefreshed { .. } => "price-refreshed",
        }
    }
}
