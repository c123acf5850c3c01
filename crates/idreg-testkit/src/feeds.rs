//! Scripted aggregator feeds

use idreg_core::{FeedError, PriceFeed, RoundData, Timestamp};
use parking_lot::Mutex;
use std::sync::Arc;

/// A feed whose next answer is set by the test.
#[derive(Debug)]
pub struct FakePriceFeed {
    round: Mutex<Result<RoundData, FeedError>>,
}

impl FakePriceFeed {
    /// Healthy price feed answering `answer` as of `updated_at`
    pub fn price(answer: i128, updated_at: Timestamp) -> Arc<Self> {
        Arc::new(Self {
            round: Mutex::new(Ok(Self::round(1, answer, updated_at))),
        })
    }

    /// Liveness feed reporting up since `since`
    pub fn uptime(since: Timestamp) -> Arc<Self> {
        Self::price(0, since)
    }

    /// Well-formed round `round_id` answering `answer`
    pub fn round(round_id: u128, answer: i128, updated_at: Timestamp) -> RoundData {
        RoundData {
            round_id,
            answer,
            started_at: updated_at,
            updated_at,
            answered_in_round: round_id,
        }
    }

    /// Publish a new answer as the next round
    pub fn answer(&self, answer: i128, updated_at: Timestamp) {
        let mut slot = self.round.lock();
        let next_id = slot.as_ref().map(|r| r.round_id + 1).unwrap_or(1);
        *slot = Ok(Self::round(next_id, answer, updated_at));
    }

    /// Replace the next round verbatim
    pub fn set_round(&self, round: RoundData) {
        *self.round.lock() = Ok(round);
    }

    /// Make the next read fail
    pub fn fail(&self, reason: &str) {
        *self.round.lock() = Err(FeedError::Unavailable {
            reason: reason.to_string(),
        });
    }
}

impl PriceFeed for FakePriceFeed {
    fn latest_round(&self) -> Result<RoundData, FeedError> {
        self.round.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_advance_round_ids() {
        let feed = FakePriceFeed::price(5, 10);
        feed.answer(6, 20);
        let round = feed.latest_round().unwrap();
        assert_eq!(round.round_id, 2);
        assert_eq!(round.answered_in_round, 2);
        assert_eq!(round.answer, 6);

        feed.fail("down");
        assert!(feed.latest_round().is_err());
    }
}
