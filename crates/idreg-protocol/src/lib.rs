//! # idreg Protocol - Composition Layer
//!
//! Wires the oracle, storage rent ledger, id registry, key registry and name
//! registry into one [`ProtocolState`] guarded by a single
//! [`idreg_core::Ledger`]. Every entry point is one transaction: a call that
//! touches several registries either applies everywhere or nowhere.
//!
//! ```rust,ignore
//! let protocol = Protocol::new(&ProtocolConfig::default(), collaborators, access, genesis)?;
//! let fid = protocol.register(&ctx, to, recovery, 1)?;
//! ```

#![forbid(unsafe_code)]

/// Unified configuration
pub mod config;

/// Composition errors
pub mod error;

/// The composed protocol
pub mod protocol;

pub use config::ProtocolConfig;
pub use error::{ProtocolError, ProtocolResult};
pub use protocol::{Collaborators, Protocol, ProtocolState};
