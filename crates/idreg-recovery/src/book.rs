//! Recovery slots and escrowed requests

use crate::error::{RecoveryError, RecoveryResult};
use idreg_core::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seconds a request must wait before it can complete (3 days)
pub const ESCROW_PERIOD: u64 = 3 * 24 * 60 * 60;

/// A pending move to `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRequest {
    /// Where the key will move
    pub destination: Address,
    /// When the request was made
    pub requested_at: Timestamp,
}

/// Observable recovery state of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryStatus {
    /// Nothing pending
    Null,
    /// Waiting out the escrow
    Requested {
        /// Where the key will move
        destination: Address,
        /// When the request was made
        requested_at: Timestamp,
        /// First timestamp at which it can complete
        ready_at: Timestamp,
    },
}

/// Recovery addresses and pending requests keyed by `K`.
///
/// A request only ever exists for a key that has a recovery address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryBook<K: Ord> {
    escrow_period: u64,
    recovery: BTreeMap<K, Address>,
    requests: BTreeMap<K, RecoveryRequest>,
}

impl<K: Ord> Default for RecoveryBook<K> {
    fn default() -> Self {
        Self {
            escrow_period: ESCROW_PERIOD,
            recovery: BTreeMap::new(),
            requests: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy + std::fmt::Debug> RecoveryBook<K> {
    /// Book with a custom escrow period
    pub fn new(escrow_period: u64) -> Self {
        Self {
            escrow_period,
            recovery: BTreeMap::new(),
            requests: BTreeMap::new(),
        }
    }

    /// Escrow period in seconds
    pub fn escrow_period(&self) -> u64 {
        self.escrow_period
    }

    /// Recovery address of `key`, if any
    pub fn recovery_of(&self, key: &K) -> Option<Address> {
        self.recovery.get(key).copied()
    }

    /// Pending request of `key`, if any
    pub fn request_of(&self, key: &K) -> Option<RecoveryRequest> {
        self.requests.get(key).copied()
    }

    /// Recovery state of `key`
    pub fn status(&self, key: &K) -> RecoveryStatus {
        match self.requests.get(key) {
            None => RecoveryStatus::Null,
            Some(request) => RecoveryStatus::Requested {
                destination: request.destination,
                requested_at: request.requested_at,
                ready_at: request.requested_at.saturating_add(self.escrow_period),
            },
        }
    }

    /// Replace the recovery address; the zero address removes it.
    ///
    /// Any pending request is dropped and returned.
    pub fn set_recovery(&mut self, key: K, recovery: Address) -> Option<RecoveryRequest> {
        if recovery.is_zero() {
            self.recovery.remove(&key);
        } else {
            self.recovery.insert(key, recovery);
        }
        let dropped = self.requests.remove(&key);
        if dropped.is_some() {
            tracing::debug!(key = ?key, "pending recovery dropped by recovery change");
        }
        dropped
    }

    /// Fail unless `caller` is the recovery address of `key`
    pub fn authorize(&self, key: &K, caller: &Address) -> RecoveryResult<()> {
        match self.recovery.get(key) {
            Some(recovery) if recovery == caller => Ok(()),
            _ => Err(RecoveryError::Unauthorized { caller: *caller }),
        }
    }

    /// Start (or restart) an escrowed move of `key` to `destination`
    pub fn request(
        &mut self,
        key: K,
        caller: &Address,
        destination: Address,
        now: Timestamp,
    ) -> RecoveryResult<RecoveryRequest> {
        self.authorize(&key, caller)?;
        if destination.is_zero() {
            return Err(RecoveryError::InvalidDestination);
        }
        let request = RecoveryRequest {
            destination,
            requested_at: now,
        };
        self.requests.insert(key, request);
        tracing::debug!(key = ?key, destination = %destination, requested_at = now, "recovery requested");
        Ok(request)
    }

    /// Destination of a request whose escrow has elapsed.
    ///
    /// Does not change state; the caller moves ownership and then calls
    /// [`RecoveryBook::clear`].
    pub fn ready(&self, key: &K, caller: &Address, now: Timestamp) -> RecoveryResult<Address> {
        self.authorize(key, caller)?;
        let request = self.requests.get(key).ok_or(RecoveryError::NoRecovery)?;
        let ready_at = request.requested_at.saturating_add(self.escrow_period);
        if now < ready_at {
            return Err(RecoveryError::Escrow { ready_at });
        }
        Ok(request.destination)
    }

    /// Drop the pending request of `key`
    pub fn cancel(&mut self, key: &K) -> RecoveryResult<RecoveryRequest> {
        self.requests.remove(key).ok_or(RecoveryError::NoRecovery)
    }

    /// Drop both the recovery address and any request of `key`
    pub fn clear(&mut self, key: &K) {
        self.recovery.remove(key);
        self.requests.remove(key);
    }

    /// Keys with a pending request
    pub fn pending(&self) -> impl Iterator<Item = (&K, &RecoveryRequest)> {
        self.requests.iter()
    }
}
