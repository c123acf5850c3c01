//! # idreg Core - Foundation Layer
//!
//! Shared vocabulary for the identity, storage and name registries.
//!
//! ## What Belongs Here
//!
//! - Identifier and value types (`Address`, `Fid`, `Wei`, `Block`, `CallContext`)
//! - Error categories and the leaf errors shared by every registry
//! - Effect traits for external collaborators (price feeds, value transfer,
//!   signature verification, key metadata validation)
//! - Typed-data digests, nonces and signature checking
//! - Role-based access control
//! - The event journal and the transaction boundary (`Ledger`)
//!
//! ## What Does NOT Belong Here
//!
//! - Registry state machines (belong in the feature crates)
//! - Test doubles (belong in `idreg-testkit`)
//!
//! ## Design Principles
//!
//! - Registries are synchronous state machines; time only enters through the
//!   `Block` carried by each `CallContext`
//! - Every state transition is journaled as a typed event
//! - All mutation happens inside one `Ledger::transact` call so a failure
//!   anywhere leaves no partial effects

#![forbid(unsafe_code)]

/// Role-based access control
pub mod access;

/// Configuration traits and validation
pub mod config;

/// Hashing and typed-data signatures
pub mod crypto;

/// External collaborator interfaces
pub mod effects;

/// Error categories and shared leaf errors
pub mod errors;

/// Append-only typed event journal
pub mod journal;

/// Transaction boundary over registry state
pub mod ledger;

/// Checked fixed-point arithmetic
pub mod math;

/// Per-signer replay nonces
pub mod nonces;

/// Identifier and value types
pub mod types;

pub use access::{AccessControl, Role};
pub use crypto::hash::{hash, hasher, Hash32};
pub use crypto::typed_data::{typed_data_digest, SigningDomain, TypedMessage};
pub use effects::{
    FeedError, MetadataValidator, NativeTransfer, PriceFeed, RoundData, SignatureVerifier,
};
pub use errors::{
    AccessError, Categorized, ErrorCategory, LedgerError, SignatureError, TransferError,
};
pub use journal::{DomainEvent, EventEnvelope, Journal, Recorded};
pub use ledger::Ledger;
pub use nonces::{Nonces, SignatureGuard};
pub use types::{Address, Block, CallContext, Fid, Timestamp, Wei};
