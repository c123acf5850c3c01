//! # idreg Identity - Feature Layer
//!
//! Issues sequential numeric ids (fids) to custody addresses and binds
//! signing keys to them.
//!
//! - [`IdRegistry`] keeps the one-to-one address/fid mapping. Transfers need a
//!   typed-data signature from the recipient, and every ownership change
//!   clears the fid's recovery address and pending recovery request.
//!   Recovery is either immediate (with the recipient's signature) or
//!   escrowed for three days.
//! - [`KeyRegistry`] stores keys per fid with an `Added` / `Removed`
//!   lifecycle, checking metadata through pluggable validators.
//!
//! Signed variants (`*_for`) let a relayer submit calls on behalf of the
//! signer; each signature consumes the signer's nonce.

#![forbid(unsafe_code)]

/// Registry configuration
pub mod config;

/// Identity and key errors
pub mod error;

/// Identity and key events
pub mod events;

/// Key registry
pub mod keys;

/// Typed messages signed for registry calls
pub mod messages;

/// Id registry
pub mod registry;

pub use config::{IdentityConfig, KeyRegistryConfig};
pub use error::{IdentityError, IdentityResult, KeyError, KeyResult};
pub use events::{IdentityEvent, KeyEvent, IDENTITY_EVENT_TYPE_ID, KEY_EVENT_TYPE_ID};
pub use keys::{KeyData, KeyRegistry, KeyState};
pub use registry::IdRegistry;
