//! Controllable block clock

use idreg_core::{Address, Block, CallContext, Timestamp, Wei};
use parking_lot::Mutex;

/// Seconds between blocks produced by [`TestChain::mine`]
pub const BLOCK_TIME: u64 = 12;

/// A block clock that only moves when told to.
#[derive(Debug)]
pub struct TestChain {
    head: Mutex<Block>,
}

impl TestChain {
    /// Chain whose head is block 1 at `timestamp`
    pub fn starting_at(timestamp: Timestamp) -> Self {
        Self {
            head: Mutex::new(Block::new(1, timestamp)),
        }
    }

    /// Current head block
    pub fn block(&self) -> Block {
        *self.head.lock()
    }

    /// Current head timestamp
    pub fn now(&self) -> Timestamp {
        self.head.lock().timestamp
    }

    /// Produce the next block after [`BLOCK_TIME`] seconds
    pub fn mine(&self) -> Block {
        self.advance(BLOCK_TIME)
    }

    /// Produce one block `seconds` after the head
    pub fn advance(&self, seconds: u64) -> Block {
        let mut head = self.head.lock();
        head.number += 1;
        head.timestamp += seconds;
        *head
    }

    /// Produce one block at exactly `timestamp`
    pub fn warp_to(&self, timestamp: Timestamp) -> Block {
        let mut head = self.head.lock();
        assert!(timestamp >= head.timestamp, "time cannot go backwards");
        head.number += 1;
        head.timestamp = timestamp;
        *head
    }

    /// Call context for `caller` in the head block
    pub fn call(&self, caller: Address) -> CallContext {
        CallContext::new(caller, self.block())
    }

    /// Paid call context for `caller` in the head block
    pub fn pay(&self, caller: Address, value: Wei) -> CallContext {
        self.call(caller).with_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mine_advances_number_and_time() {
        let chain = TestChain::starting_at(1_000);
        let block = chain.mine();
        assert_eq!(block, Block::new(2, 1_012));
        assert_eq!(chain.advance(100).timestamp, 1_112);
        assert_eq!(chain.warp_to(5_000), Block::new(4, 5_000));
    }
}
