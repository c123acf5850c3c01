//! Pure synchronous hashing
//!
//! Commit hashes, typed-data digests and signer addresses all go through this
//! module, so the algorithm is chosen in exactly one place.
//!
//! Current algorithm: **SHA-256** (32-byte output)
//!
//! ```ignore
//! use idreg_core::hash;
//!
//! let digest = hash(b"hello world");
//! assert_eq!(digest.as_bytes().len(), 32);
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// 32-byte digest
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({self})")
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Incremental hasher
pub struct Hasher(Sha256);

impl Hasher {
    /// Feed more data
    pub fn update(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.0.update(data.as_ref());
        self
    }

    /// Finish and return the digest
    pub fn finalize(self) -> Hash32 {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.0.finalize());
        Hash32(out)
    }
}

/// Hash arbitrary bytes
pub fn hash(data: impl AsRef<[u8]>) -> Hash32 {
    let mut h = hasher();
    h.update(data);
    h.finalize()
}

/// Start an incremental hash
pub fn hasher() -> Hasher {
    Hasher(Sha256::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_matches_one_shot() {
        let mut h = hasher();
        h.update(b"hello").update(b" ").update(b"world");
        assert_eq!(h.finalize(), hash(b"hello world"));
    }

    #[test]
    fn different_inputs_differ() {
        assert_ne!(hash(b"a"), hash(b"b"));
        assert!(!hash(b"").is_zero());
    }
}
