//! Hashing and signature primitives

/// Ed25519 signer addresses and verification
pub mod ed25519;
/// SHA-256 hashing
pub mod hash;
/// Typed structured-data digests
pub mod typed_data;

pub use ed25519::{address_of, sign_digest, Ed25519Verifier};
