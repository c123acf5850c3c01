//! Oracle errors

use idreg_core::{Categorized, ErrorCategory, FeedError, LedgerError};
use serde::{Deserialize, Serialize};

/// Which upstream feed a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedKind {
    /// ETH/USD price feed
    Price,
    /// Sequencer liveness feed
    Uptime,
}

/// Oracle failure causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum OracleError {
    /// Liveness feed reports the sequencer down
    #[error("sequencer down")]
    SequencerDown,
    /// Liveness feed restarted too recently
    #[error("uptime grace period not over (restarted at {restarted_at}, ends at {grace_ends})")]
    GracePeriodNotOver {
        /// When the feed last changed status
        restarted_at: u64,
        /// When the grace period ends
        grace_ends: u64,
    },
    /// Round has no id or no update timestamp
    #[error("incomplete round on {feed:?} feed")]
    IncompleteRound {
        /// Feed that reported the round
        feed: FeedKind,
    },
    /// Round is stamped in the future
    #[error("round timestamp {updated_at} is in the future on {feed:?} feed")]
    InvalidRoundTimestamp {
        /// Feed that reported the round
        feed: FeedKind,
        /// Reported update time
        updated_at: u64,
    },
    /// Price answer is zero or negative
    #[error("invalid price {answer}")]
    InvalidPrice {
        /// Reported answer
        answer: i128,
    },
    /// Answer carried over from an earlier round or older than the max age
    #[error("stale answer on {feed:?} feed")]
    StaleAnswer {
        /// Feed that reported the round
        feed: FeedKind,
    },
    /// Answer outside the configured bounds
    #[error("price {price} outside [{min}, {max}]")]
    PriceOutOfBounds {
        /// Reported price
        price: u128,
        /// Configured lower bound
        min: u128,
        /// Configured upper bound
        max: u128,
    },
    /// The feed itself could not be read
    #[error("{feed:?} feed failed: {source}")]
    Feed {
        /// Feed that failed
        feed: FeedKind,
        /// Underlying failure
        source: FeedError,
    },
    /// Fixed price outside the configured bounds
    #[error("fixed price {price} outside configured bounds")]
    InvalidFixedPrice {
        /// Rejected price
        price: u128,
    },
    /// New lower bound not below the upper bound
    #[error("min answer {min} must be below max answer {max}")]
    InvalidMinAnswer {
        /// Rejected lower bound
        min: u128,
        /// Current upper bound
        max: u128,
    },
    /// New upper bound not above the lower bound
    #[error("max answer {max} must be above min answer {min}")]
    InvalidMaxAnswer {
        /// Current lower bound
        min: u128,
        /// Rejected upper bound
        max: u128,
    },
    /// Arithmetic failure while pricing
    #[error(transparent)]
    Math(#[from] LedgerError),
}

/// Oracle result type
pub type OracleResult<T> = Result<T, OracleError>;

impl Categorized for OracleError {
    fn category(&self) -> ErrorCategory {
        match self {
            OracleError::SequencerDown
            | OracleError::GracePeriodNotOver { .. }
            | OracleError::IncompleteRound { .. }
            | OracleError::InvalidRoundTimestamp { .. }
            | OracleError::InvalidPrice { .. }
            | OracleError::StaleAnswer { .. }
            | OracleError::PriceOutOfBounds { .. }
            | OracleError::Feed { .. } => ErrorCategory::ExternalDependency,
            OracleError::InvalidFixedPrice { .. }
            | OracleError::InvalidMinAnswer { .. }
            | OracleError::InvalidMaxAnswer { .. } => ErrorCategory::InvalidInput,
            OracleError::Math(err) => err.category(),
        }
    }
}
