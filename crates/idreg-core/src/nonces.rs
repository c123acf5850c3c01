//! Per-signer replay nonces and signed-authorization checks

use crate::crypto::hash::Hash32;
use crate::crypto::typed_data::{typed_data_digest, SigningDomain, TypedMessage};
use crate::effects::SignatureVerifier;
use crate::errors::SignatureError;
use crate::types::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Monotonic nonce per signer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nonces {
    next: BTreeMap<Address, u64>,
}

impl Nonces {
    /// Empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Nonce the next signature from `signer` must carry
    pub fn nonce(&self, signer: &Address) -> u64 {
        self.next.get(signer).copied().unwrap_or(0)
    }

    /// Consume and return the current nonce of `signer`
    pub fn use_nonce(&mut self, signer: &Address) -> u64 {
        let slot = self.next.entry(*signer).or_insert(0);
        let current = *slot;
        *slot = slot.saturating_add(1);
        current
    }
}

/// Checks deadline, signature and nonce for signed registry calls.
#[derive(Clone)]
pub struct SignatureGuard {
    domain: SigningDomain,
    verifier: Arc<dyn SignatureVerifier>,
    nonces: Nonces,
}

impl std::fmt::Debug for SignatureGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureGuard")
            .field("domain", &self.domain)
            .field("nonces", &self.nonces)
            .finish_non_exhaustive()
    }
}

impl SignatureGuard {
    /// Create a guard for `domain`
    pub fn new(domain: SigningDomain, verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self {
            domain,
            verifier,
            nonces: Nonces::new(),
        }
    }

    /// Signing domain
    pub fn domain(&self) -> &SigningDomain {
        &self.domain
    }

    /// Current nonce of `signer`
    pub fn nonce(&self, signer: &Address) -> u64 {
        self.nonces.nonce(signer)
    }

    /// Burn the current nonce of `signer`, invalidating outstanding signatures
    pub fn use_nonce(&mut self, signer: &Address) -> u64 {
        self.nonces.use_nonce(signer)
    }

    /// Digest of `message` under this guard's domain
    pub fn digest(&self, message: &impl TypedMessage) -> Hash32 {
        typed_data_digest(&self.domain, message)
    }

    /// Whether `signature` verifies for `signer` without consuming anything
    pub fn is_valid(&self, signer: &Address, digest: &Hash32, signature: &[u8]) -> bool {
        self.verifier.is_valid_signature(signer, digest, signature)
    }

    /// Verify a signed message and consume the signer's nonce.
    ///
    /// `build` receives the signer's current nonce and returns the message the
    /// signer is expected to have signed.
    pub fn verify<M, F>(
        &mut self,
        now: Timestamp,
        signer: &Address,
        deadline: Timestamp,
        signature: &[u8],
        build: F,
    ) -> Result<(), SignatureError>
    where
        M: TypedMessage,
        F: FnOnce(u64) -> M,
    {
        self.check(now, signer, self.nonce(signer), deadline, signature, build)?;
        self.nonces.use_nonce(signer);
        Ok(())
    }

    /// Verify a message signed over `nonce` without consuming anything.
    ///
    /// Calls carrying several signatures check each of them first and then
    /// consume the nonces with [`SignatureGuard::use_nonce`].
    pub fn check<M, F>(
        &self,
        now: Timestamp,
        signer: &Address,
        nonce: u64,
        deadline: Timestamp,
        signature: &[u8],
        build: F,
    ) -> Result<(), SignatureError>
    where
        M: TypedMessage,
        F: FnOnce(u64) -> M,
    {
        if now > deadline {
            return Err(SignatureError::SignatureExpired { deadline });
        }
        let digest = self.digest(&build(nonce));
        if !self.verifier.is_valid_signature(signer, &digest, signature) {
            tracing::debug!(signer = %signer, nonce, "signature rejected");
            return Err(SignatureError::InvalidSignature { signer: *signer });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::typed_data::encode_u64;
    use crate::crypto::{address_of, sign_digest, Ed25519Verifier};
    use assert_matches::assert_matches;
    use ed25519_dalek::SigningKey;

    struct Nonce(u64);

    impl TypedMessage for Nonce {
        fn type_string(&self) -> &'static str {
            "Nonce(uint256 nonce)"
        }

        fn encode_fields(&self, out: &mut Vec<u8>) {
            out.extend_from_slice(&encode_u64(self.0));
        }
    }

    fn guard() -> SignatureGuard {
        SignatureGuard::new(
            SigningDomain::new("Test", "1", 10, Address::repeat_byte(3)),
            Arc::new(Ed25519Verifier),
        )
    }

    #[test]
    fn nonces_increment() {
        let mut nonces = Nonces::new();
        let a = Address::repeat_byte(1);
        assert_eq!(nonces.use_nonce(&a), 0);
        assert_eq!(nonces.use_nonce(&a), 1);
        assert_eq!(nonces.nonce(&a), 2);
        assert_eq!(nonces.nonce(&Address::repeat_byte(2)), 0);
    }

    #[test]
    fn verify_consumes_nonce_and_rejects_replay() {
        let key = SigningKey::from_bytes(&[4; 32]);
        let signer = address_of(&key.verifying_key());
        let mut guard = guard();
        let sig = sign_digest(&key, &guard.digest(&Nonce(0)));

        guard.verify(5, &signer, 10, &sig, Nonce).unwrap();
        assert_eq!(guard.nonce(&signer), 1);
        assert_matches!(
            guard.verify(5, &signer, 10, &sig, Nonce),
            Err(SignatureError::InvalidSignature { .. })
        );
    }

    #[test]
    fn verify_rejects_past_deadline() {
        let key = SigningKey::from_bytes(&[4; 32]);
        let signer = address_of(&key.verifying_key());
        let mut guard = guard();
        let sig = sign_digest(&key, &guard.digest(&Nonce(0)));
        assert_matches!(
            guard.verify(11, &signer, 10, &sig, Nonce),
            Err(SignatureError::SignatureExpired { deadline: 10 })
        );
        assert_eq!(guard.nonce(&signer), 0);
    }

    #[test]
    fn check_leaves_nonce_alone() {
        let key = SigningKey::from_bytes(&[4; 32]);
        let signer = address_of(&key.verifying_key());
        let guard = guard();
        let ahead = sign_digest(&key, &guard.digest(&Nonce(1)));

        guard.check(5, &signer, 1, 10, &ahead, Nonce).unwrap();
        assert_matches!(
            guard.check(5, &signer, 0, 10, &ahead, Nonce),
            Err(SignatureError::InvalidSignature { .. })
        );
        assert_eq!(guard.nonce(&signer), 0);
    }
}
