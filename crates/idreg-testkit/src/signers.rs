//! Seeded Ed25519 signers

use ed25519_dalek::SigningKey;
use idreg_core::crypto::{address_of, sign_digest};
use idreg_core::{Address, Hash32, SignatureGuard, TypedMessage};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Plain address for tests that never sign
pub fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// A deterministic key pair and its registry address.
#[derive(Debug, Clone)]
pub struct TestSigner {
    key: SigningKey,
}

impl TestSigner {
    /// Signer derived from `seed`
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        Self {
            key: SigningKey::generate(&mut rng),
        }
    }

    /// Address controlled by this signer
    pub fn address(&self) -> Address {
        address_of(&self.key.verifying_key())
    }

    /// Sign a raw digest
    pub fn sign_digest(&self, digest: &Hash32) -> Vec<u8> {
        sign_digest(&self.key, digest)
    }

    /// Sign `message` under the domain of `guard`
    pub fn sign(&self, guard: &SignatureGuard, message: &impl TypedMessage) -> Vec<u8> {
        self.sign_digest(&guard.digest(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_are_deterministic_and_distinct() {
        assert_eq!(TestSigner::from_seed(1).address(), TestSigner::from_seed(1).address());
        assert_ne!(TestSigner::from_seed(1).address(), TestSigner::from_seed(2).address());
    }
}
