//! External collaborator interfaces
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: supplied by the embedding environment; test doubles
//!   live in `idreg-testkit`
//! - **Usage**: registries call these synchronously inside a transaction
//!
//! Registries hold collaborators as `Arc<dyn Trait>` so state stays `Clone`
//! for the staged-copy transaction boundary.

use crate::crypto::hash::Hash32;
use crate::errors::TransferError;
use crate::types::{Address, Fid, Timestamp, Wei};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One round reported by an aggregated feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundData {
    /// Round identifier; 0 means the round never completed
    pub round_id: u128,
    /// Reported answer (price in 8 decimals, or 0 = up / 1 = down for liveness feeds)
    pub answer: i128,
    /// When the round started (for liveness feeds: when the status last changed)
    pub started_at: Timestamp,
    /// When the answer was last updated; 0 means incomplete
    pub updated_at: Timestamp,
    /// Round in which the answer was computed
    pub answered_in_round: u128,
}

/// Transport-level feed failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FeedError {
    /// The feed could not be reached
    #[error("feed unavailable: {reason}")]
    Unavailable {
        /// Why the read failed
        reason: String,
    },
}

/// Aggregated price or liveness feed.
pub trait PriceFeed: Send + Sync {
    /// Latest round reported by the feed
    fn latest_round(&self) -> Result<RoundData, FeedError>;
}

/// Sends native value to arbitrary addresses.
pub trait NativeTransfer: Send + Sync {
    /// Send `amount` wei to `to`
    fn send_value(&self, to: Address, amount: Wei) -> Result<(), TransferError>;
}

/// Verifies signatures over typed-data digests.
pub trait SignatureVerifier: Send + Sync {
    /// Whether `signature` is a valid signature of `digest` by `signer`
    fn is_valid_signature(&self, signer: &Address, digest: &Hash32, signature: &[u8]) -> bool;
}

/// Validates opaque key metadata for one `(key_type, metadata_type)` pair.
pub trait MetadataValidator: Send + Sync {
    /// Whether `metadata` is acceptable for adding `key` to `fid`
    fn validate(&self, fid: Fid, key: &[u8], metadata: &[u8]) -> bool;
}

impl<T: PriceFeed + ?Sized> PriceFeed for Arc<T> {
    fn latest_round(&self) -> Result<RoundData, FeedError> {
        (**self).latest_round()
    }
}

impl<T: NativeTransfer + ?Sized> NativeTransfer for Arc<T> {
    fn send_value(&self, to: Address, amount: Wei) -> Result<(), TransferError> {
        (**self).send_value(to, amount)
    }
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for Arc<T> {
    fn is_valid_signature(&self, signer: &Address, digest: &Hash32, signature: &[u8]) -> bool {
        (**self).is_valid_signature(signer, digest, signature)
    }
}
