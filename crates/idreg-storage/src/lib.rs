//! # idreg Storage - Domain Layer
//!
//! Gates and accounts for paid storage capacity. Units are rented against an
//! fid at a USD price converted through the [`idreg_oracle::PriceOracle`];
//! operators may credit units without payment. Total rented units can never
//! exceed the configured capacity and never decrease.
//!
//! Every paid entry point refunds overpayment to the caller as its final
//! step. A refund that fails is an error, and callers run operations inside an
//! [`idreg_core::Ledger`] so the whole call is discarded.

#![forbid(unsafe_code)]

/// Storage configuration
pub mod config;

/// Storage errors
pub mod error;

/// Storage events
pub mod events;

/// The rent ledger
pub mod ledger;

pub use config::StorageConfig;
pub use error::{StorageError, StorageResult};
pub use events::{StorageEvent, STORAGE_EVENT_TYPE_ID};
pub use ledger::StorageRentLedger;
