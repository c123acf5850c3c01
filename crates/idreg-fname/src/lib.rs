//! # idreg Fname - Feature Layer
//!
//! Short human-readable names leased by calendar year.
//!
//! A name moves through four phases:
//!
//! ```text
//! Registrable --register--> Registered --Jan 1--> Renewable --grace--> Biddable
//!                               ^                    |                    |
//!                               +-------renew--------+--------bid---------+
//! ```
//!
//! Registration is commit-reveal: a caller first stores a hash of the name,
//! owner, secret and recovery address, then reveals it after a short delay.
//! Leases end on the next January 1st; the first year is prorated. A name
//! that is not renewed within the grace period goes to a dutch auction whose
//! premium decays by a fixed factor every period. While between expiry and
//! the end of the grace period the owner's control is suspended: ownership
//! queries and transfers fail with `Expired` until the name is renewed.

#![forbid(unsafe_code)]

/// Dutch auction pricing
pub mod auction;

/// Calendar-year accounting
pub mod calendar;

/// Commit hashes
pub mod commit;

/// Registry configuration
pub mod config;

/// Name errors
pub mod error;

/// Name events
pub mod events;

/// Name encoding
pub mod name;

/// The name registry
pub mod registry;

pub use auction::bid_price;
pub use calendar::YearCalendar;
pub use commit::{commit_hash, generate_commit};
pub use config::NameConfig;
pub use error::{NameError, NameResult};
pub use events::{NameEvent, NAME_EVENT_TYPE_ID};
pub use name::{Fname, TokenId, MAX_NAME_LEN};
pub use registry::{NameRecord, NameRegistry, NameStatus, ReclaimAction};
