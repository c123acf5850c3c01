//! Ed25519 signature verification for registry authorizations
//!
//! Addresses are derived from verifying keys as the last 20 bytes of the key
//! hash. A signature blob carries the verifying key followed by the 64-byte
//! signature so the verifier can both check the signature and confirm the
//! key hashes to the expected signer address.

use super::hash::{hash, Hash32};
use crate::effects::SignatureVerifier;
use crate::types::Address;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

/// Length of a signature blob: verifying key ‖ signature
pub const SIGNATURE_BLOB_LEN: usize = 32 + 64;

/// Address controlled by a verifying key
pub fn address_of(key: &VerifyingKey) -> Address {
    let digest = hash(key.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest.as_bytes()[12..]);
    Address(bytes)
}

/// Sign a digest, producing a blob [`Ed25519Verifier`] accepts
pub fn sign_digest(key: &SigningKey, digest: &Hash32) -> Vec<u8> {
    let signature = key.sign(digest.as_bytes());
    let mut blob = Vec::with_capacity(SIGNATURE_BLOB_LEN);
    blob.extend_from_slice(key.verifying_key().as_bytes());
    blob.extend_from_slice(&signature.to_bytes());
    blob
}

/// Verifies `verifying key ‖ signature` blobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn is_valid_signature(&self, signer: &Address, digest: &Hash32, signature: &[u8]) -> bool {
        if signature.len() != SIGNATURE_BLOB_LEN {
            return false;
        }
        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(&signature[..32]);
        let mut sig_bytes = [0u8; 64];
        sig_bytes.copy_from_slice(&signature[32..]);

        let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
            return false;
        };
        if address_of(&key) != *signer {
            return false;
        }
        key.verify_strict(digest.as_bytes(), &Signature::from_bytes(&sig_bytes))
            .is_ok()
    }
}
