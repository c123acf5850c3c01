//! idreg Testing Infrastructure
//!
//! Deterministic fakes for the effect traits the registries depend on, plus a
//! controllable block clock and seeded signers.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! idreg-testkit = { path = "../idreg-testkit" }
//! ```
//!
//! ```rust,no_run
//! use idreg_testkit::*;
//!
//! let chain = TestChain::starting_at(1_700_000_000);
//! let alice = TestSigner::from_seed(1);
//! let ctx = chain.call(alice.address());
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod bank;
pub mod chain;
pub mod feeds;
pub mod logging;
pub mod signers;
pub mod validators;

pub use bank::{Payment, RecordingBank};
pub use chain::TestChain;
pub use feeds::FakePriceFeed;
pub use logging::init_tracing;
pub use signers::{address, TestSigner};
pub use validators::StaticValidator;

pub use idreg_core::{Address, Block, CallContext, Fid, Wei};

/// One ether in wei
pub const ETHER: Wei = 1_000_000_000_000_000_000;

/// One US dollar at feed precision (8 decimals)
pub const USD: u128 = 100_000_000;

/// One day in seconds
pub const DAY: u64 = 24 * 60 * 60;
