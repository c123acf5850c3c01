//! # idreg Recovery - Domain Layer
//!
//! A per-key recovery slot with an escrowed request.
//!
//! The designated recovery address of a key may request that the key move to
//! a new destination. The move can only complete once the escrow period has
//! elapsed, giving the current owner time to cancel. Every ownership change
//! clears both the recovery address and any pending request.
//!
//! ```text
//! Null --request--> Requested --ready + move--> Null
//!                      |
//!                      +--cancel / clear / set_recovery--> Null
//! ```
//!
//! The book is generic over the key so the identity registry keys it by fid
//! and the name registry by token id. Callers own the ownership move and the
//! authorization of cancellation.

#![forbid(unsafe_code)]

/// Recovery book
pub mod book;

/// Recovery errors
pub mod error;

pub use book::{RecoveryBook, RecoveryRequest, RecoveryStatus, ESCROW_PERIOD};
pub use error::{RecoveryError, RecoveryResult};
