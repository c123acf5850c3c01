//! Fid issuance, custody transfer and recovery

use crate::config::IdentityConfig;
use crate::error::{IdentityError, IdentityResult};
use crate::events::IdentityEvent;
use crate::messages::{ChangeRecoveryAddress, Recover, Register, Transfer, TransferAndChangeRecovery};
use idreg_core::{
    AccessControl, Address, CallContext, EventEnvelope, Fid, Hash32, Journal, Role, SignatureGuard,
    SignatureVerifier, SigningDomain, Timestamp,
};
use idreg_recovery::{RecoveryBook, RecoveryRequest};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One-to-one mapping of custody addresses to fids.
#[derive(Debug, Clone)]
pub struct IdRegistry {
    access: AccessControl,
    guard: SignatureGuard,
    id_counter: u64,
    id_of: BTreeMap<Address, Fid>,
    custody_of: BTreeMap<Fid, Address>,
    recovery: RecoveryBook<Fid>,
    paused: bool,
    journal: Journal<IdentityEvent>,
}

impl IdRegistry {
    /// Create an empty registry deployed at `address`
    pub fn new(
        config: &IdentityConfig,
        access: AccessControl,
        verifier: Arc<dyn SignatureVerifier>,
        address: Address,
    ) -> Self {
        let domain = SigningDomain::new(
            config.domain_name.clone(),
            config.domain_version.clone(),
            config.chain_id,
            address,
        );
        Self {
            access,
            guard: SignatureGuard::new(domain, verifier),
            id_counter: 0,
            id_of: BTreeMap::new(),
            custody_of: BTreeMap::new(),
            recovery: RecoveryBook::new(config.escrow_period),
            paused: config.start_paused,
            journal: Journal::new(),
        }
    }

    // ---- registration ----------------------------------------------------

    /// Issue the next fid to `to`
    pub fn register(
        &mut self,
        ctx: &CallContext,
        to: Address,
        recovery: Address,
    ) -> IdentityResult<Fid> {
        self.ensure_unpaused()?;
        self.issue(ctx, to, recovery)
    }

    /// Issue the next fid to `to` with `to`'s signed consent
    pub fn register_for(
        &mut self,
        ctx: &CallContext,
        to: Address,
        recovery: Address,
        deadline: Timestamp,
        signature: &[u8],
    ) -> IdentityResult<Fid> {
        self.ensure_unpaused()?;
        self.guard
            .verify(ctx.now(), &to, deadline, signature, |nonce| Register {
                to,
                recovery,
                nonce,
                deadline,
            })?;
        self.issue(ctx, to, recovery)
    }

    fn issue(&mut self, ctx: &CallContext, to: Address, recovery: Address) -> IdentityResult<Fid> {
        if to.is_zero() {
            return Err(IdentityError::InvalidAddress);
        }
        self.ensure_no_id(&to)?;
        let fid = Fid(self.id_counter)
            .next()
            .ok_or(IdentityError::CounterExhausted)?;
        self.id_counter = fid.value();
        self.id_of.insert(to, fid);
        self.custody_of.insert(fid, to);
        self.recovery.set_recovery(fid, recovery);
        self.journal
            .record(ctx.block, IdentityEvent::Register { to, fid, recovery });
        tracing::info!(fid = %fid, to = %to, recovery = %recovery, "fid registered");
        Ok(fid)
    }

    // ---- transfer --------------------------------------------------------

    /// Move the caller's fid to `to`, who must sign the transfer
    pub fn transfer(
        &mut self,
        ctx: &CallContext,
        to: Address,
        deadline: Timestamp,
        signature: &[u8],
    ) -> IdentityResult<()> {
        self.ensure_unpaused()?;
        let from = ctx.caller;
        let fid = self.require_id(&from)?;
        self.ensure_no_id(&to)?;
        self.verify_transfer(ctx, fid, to, deadline, signature)?;
        self.move_fid(ctx, fid, from, to);
        self.journal
            .record(ctx.block, IdentityEvent::Transfer { from, to, fid });
        tracing::info!(fid = %fid, from = %from, to = %to, "fid transferred");
        Ok(())
    }

    /// Relayed transfer signed by both `from` and `to`
    pub fn transfer_for(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        from_deadline: Timestamp,
        from_signature: &[u8],
        to_deadline: Timestamp,
        to_signature: &[u8],
    ) -> IdentityResult<()> {
        self.ensure_unpaused()?;
        let fid = self.require_id(&from)?;
        self.ensure_no_id(&to)?;
        self.guard.check(
            ctx.now(),
            &from,
            self.guard.nonce(&from),
            from_deadline,
            from_signature,
            |nonce| Transfer {
                fid,
                to,
                nonce,
                deadline: from_deadline,
            },
        )?;
        self.check_transfer(ctx, fid, to, self.guard.nonce(&to), to_deadline, to_signature)?;
        self.guard.use_nonce(&from);
        self.guard.use_nonce(&to);
        self.move_fid(ctx, fid, from, to);
        self.journal
            .record(ctx.block, IdentityEvent::Transfer { from, to, fid });
        tracing::info!(fid = %fid, from = %from, to = %to, relayer = %ctx.caller, "fid transferred");
        Ok(())
    }

    /// Move the caller's fid to `to` and install `recovery` in one step
    pub fn transfer_and_change_recovery(
        &mut self,
        ctx: &CallContext,
        to: Address,
        recovery: Address,
        deadline: Timestamp,
        signature: &[u8],
    ) -> IdentityResult<()> {
        self.ensure_unpaused()?;
        let from = ctx.caller;
        let fid = self.require_id(&from)?;
        self.ensure_no_id(&to)?;
        self.guard
            .verify(ctx.now(), &to, deadline, signature, |nonce| {
                TransferAndChangeRecovery {
                    fid,
                    to,
                    recovery,
                    nonce,
                    deadline,
                }
            })?;
        self.move_fid(ctx, fid, from, to);
        self.recovery.set_recovery(fid, recovery);
        self.journal
            .record(ctx.block, IdentityEvent::Transfer { from, to, fid });
        self.journal
            .record(ctx.block, IdentityEvent::ChangeRecoveryAddress { fid, recovery });
        tracing::info!(fid = %fid, from = %from, to = %to, recovery = %recovery, "fid transferred with new recovery");
        Ok(())
    }

    fn verify_transfer(
        &mut self,
        ctx: &CallContext,
        fid: Fid,
        to: Address,
        deadline: Timestamp,
        signature: &[u8],
    ) -> IdentityResult<()> {
        self.check_transfer(ctx, fid, to, self.guard.nonce(&to), deadline, signature)?;
        self.guard.use_nonce(&to);
        Ok(())
    }

    fn check_transfer(
        &self,
        ctx: &CallContext,
        fid: Fid,
        to: Address,
        nonce: u64,
        deadline: Timestamp,
        signature: &[u8],
    ) -> IdentityResult<()> {
        self.guard
            .check(ctx.now(), &to, nonce, deadline, signature, |nonce| Transfer {
                fid,
                to,
                nonce,
                deadline,
            })?;
        Ok(())
    }

    // ---- recovery address ------------------------------------------------

    /// Replace the caller's recovery address; drops any pending request
    pub fn change_recovery_address(
        &mut self,
        ctx: &CallContext,
        recovery: Address,
    ) -> IdentityResult<()> {
        self.ensure_unpaused()?;
        let fid = self.require_id(&ctx.caller)?;
        self.set_recovery(ctx, fid, recovery);
        Ok(())
    }

    /// Relayed recovery change signed by `owner`
    pub fn change_recovery_address_for(
        &mut self,
        ctx: &CallContext,
        owner: Address,
        recovery: Address,
        deadline: Timestamp,
        signature: &[u8],
    ) -> IdentityResult<()> {
        self.ensure_unpaused()?;
        let fid = self.require_id(&owner)?;
        let current = self.recovery.recovery_of(&fid).unwrap_or(Address::ZERO);
        self.guard
            .verify(ctx.now(), &owner, deadline, signature, |nonce| {
                ChangeRecoveryAddress {
                    fid,
                    from: current,
                    to: recovery,
                    nonce,
                    deadline,
                }
            })?;
        self.set_recovery(ctx, fid, recovery);
        Ok(())
    }

    fn set_recovery(&mut self, ctx: &CallContext, fid: Fid, recovery: Address) {
        if self.recovery.set_recovery(fid, recovery).is_some() {
            self.journal.record(
                ctx.block,
                IdentityEvent::CancelRecovery {
                    by: ctx.caller,
                    fid,
                },
            );
        }
        self.journal
            .record(ctx.block, IdentityEvent::ChangeRecoveryAddress { fid, recovery });
        tracing::info!(fid = %fid, recovery = %recovery, "recovery address changed");
    }

    // ---- immediate recovery ----------------------------------------------

    /// Move `from`'s fid to `to`; the caller must be the recovery address and
    /// `to` must sign the transfer
    pub fn recover(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        deadline: Timestamp,
        signature: &[u8],
    ) -> IdentityResult<()> {
        self.ensure_unpaused()?;
        let fid = self.require_id(&from)?;
        self.recovery.authorize(&fid, &ctx.caller)?;
        self.ensure_no_id(&to)?;
        self.verify_transfer(ctx, fid, to, deadline, signature)?;
        self.move_fid(ctx, fid, from, to);
        self.journal
            .record(ctx.block, IdentityEvent::Recover { from, to, fid });
        tracing::info!(fid = %fid, from = %from, to = %to, "fid recovered");
        Ok(())
    }

    /// Relayed recovery signed by the recovery address and by `to`
    pub fn recover_for(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        recovery_deadline: Timestamp,
        recovery_signature: &[u8],
        to_deadline: Timestamp,
        to_signature: &[u8],
    ) -> IdentityResult<()> {
        self.ensure_unpaused()?;
        let fid = self.require_id(&from)?;
        let recovery = self
            .recovery
            .recovery_of(&fid)
            .ok_or(IdentityError::Unauthorized { caller: ctx.caller })?;
        self.ensure_no_id(&to)?;
        self.guard.check(
            ctx.now(),
            &recovery,
            self.guard.nonce(&recovery),
            recovery_deadline,
            recovery_signature,
            |nonce| Recover {
                fid,
                to,
                nonce,
                deadline: recovery_deadline,
            },
        )?;
        // a recovery address recovering to itself signs twice in sequence
        let to_nonce = self.guard.nonce(&to).saturating_add(u64::from(to == recovery));
        self.check_transfer(ctx, fid, to, to_nonce, to_deadline, to_signature)?;
        self.guard.use_nonce(&recovery);
        self.guard.use_nonce(&to);
        self.move_fid(ctx, fid, from, to);
        self.journal
            .record(ctx.block, IdentityEvent::Recover { from, to, fid });
        tracing::info!(fid = %fid, from = %from, to = %to, relayer = %ctx.caller, "fid recovered");
        Ok(())
    }

    // ---- escrowed recovery -----------------------------------------------

    /// Start an escrowed move of `from`'s fid to `to`
    pub fn request_recovery(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
    ) -> IdentityResult<RecoveryRequest> {
        self.ensure_unpaused()?;
        let fid = self.require_id(&from)?;
        self.recovery.authorize(&fid, &ctx.caller)?;
        self.ensure_no_id(&to)?;
        let request = self.recovery.request(fid, &ctx.caller, to, ctx.now())?;
        self.journal
            .record(ctx.block, IdentityEvent::RequestRecovery { from, to, fid });
        tracing::info!(fid = %fid, from = %from, to = %to, "recovery requested");
        Ok(request)
    }

    /// Complete an escrowed recovery once the escrow has elapsed
    pub fn complete_recovery(&mut self, ctx: &CallContext, from: Address) -> IdentityResult<Address> {
        self.ensure_unpaused()?;
        let fid = self.require_id(&from)?;
        let to = self.recovery.ready(&fid, &ctx.caller, ctx.now())?;
        self.ensure_no_id(&to)?;
        self.move_fid(ctx, fid, from, to);
        self.journal
            .record(ctx.block, IdentityEvent::Recover { from, to, fid });
        tracing::info!(fid = %fid, from = %from, to = %to, "escrowed recovery completed");
        Ok(to)
    }

    /// Cancel a pending recovery; the owner or the recovery address may call
    pub fn cancel_recovery(&mut self, ctx: &CallContext, from: Address) -> IdentityResult<()> {
        let fid = self.require_id(&from)?;
        if ctx.caller != from {
            self.recovery.authorize(&fid, &ctx.caller)?;
        }
        self.recovery.cancel(&fid)?;
        self.journal.record(
            ctx.block,
            IdentityEvent::CancelRecovery {
                by: ctx.caller,
                fid,
            },
        );
        tracing::info!(fid = %fid, by = %ctx.caller, "recovery cancelled");
        Ok(())
    }

    // ---- signatures and nonces -------------------------------------------

    /// Whether `signature` over `digest` is valid and `custody` holds `fid`
    pub fn verify_fid_signature(
        &self,
        custody: &Address,
        fid: Fid,
        digest: &Hash32,
        signature: &[u8],
    ) -> bool {
        self.custody_of.get(&fid) == Some(custody) && self.guard.is_valid(custody, digest, signature)
    }

    /// Burn the caller's nonce, invalidating its outstanding signatures
    pub fn use_nonce(&mut self, ctx: &CallContext) -> u64 {
        self.guard.use_nonce(&ctx.caller)
    }

    /// Current nonce of `signer`
    pub fn nonce(&self, signer: &Address) -> u64 {
        self.guard.nonce(signer)
    }

    /// Signature guard, for building signed messages
    pub fn guard(&self) -> &SignatureGuard {
        &self.guard
    }

    // ---- owner -----------------------------------------------------------

    /// Stop state-changing calls
    pub fn pause(&mut self, ctx: &CallContext) -> IdentityResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        self.paused = true;
        self.journal
            .record(ctx.block, IdentityEvent::Paused { by: ctx.caller });
        tracing::warn!(by = %ctx.caller, "id registry paused");
        Ok(())
    }

    /// Resume state-changing calls
    pub fn unpause(&mut self, ctx: &CallContext) -> IdentityResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        self.paused = false;
        self.journal
            .record(ctx.block, IdentityEvent::Unpaused { by: ctx.caller });
        tracing::info!(by = %ctx.caller, "id registry unpaused");
        Ok(())
    }

    // ---- views -----------------------------------------------------------

    /// Fid held by `address`
    pub fn id_of(&self, address: &Address) -> Option<Fid> {
        self.id_of.get(address).copied()
    }

    /// Custody address of `fid`
    pub fn custody_of(&self, fid: Fid) -> Option<Address> {
        self.custody_of.get(&fid).copied()
    }

    /// Recovery address of `fid`
    pub fn recovery_of(&self, fid: Fid) -> Option<Address> {
        self.recovery.recovery_of(&fid)
    }

    /// Pending recovery request of `fid`
    pub fn recovery_request_of(&self, fid: Fid) -> Option<RecoveryRequest> {
        self.recovery.request_of(&fid)
    }

    /// Number of fids issued
    pub fn id_counter(&self) -> u64 {
        self.id_counter
    }

    /// Whether the registry is paused
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Identity events
    pub fn journal(&self) -> &Journal<IdentityEvent> {
        &self.journal
    }

    /// Hand off held identity events
    pub fn drain_envelopes(&mut self) -> Result<Vec<EventEnvelope>, serde_json::Error> {
        self.journal.drain_envelopes()
    }

    /// Role table
    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    // ---- internals -------------------------------------------------------

    fn ensure_unpaused(&self) -> IdentityResult<()> {
        if self.paused {
            return Err(IdentityError::Paused);
        }
        Ok(())
    }

    fn require_id(&self, address: &Address) -> IdentityResult<Fid> {
        self.id_of(address)
            .ok_or(IdentityError::HasNoId { address: *address })
    }

    fn ensure_no_id(&self, address: &Address) -> IdentityResult<()> {
        if self.id_of.contains_key(address) {
            return Err(IdentityError::HasId { address: *address });
        }
        Ok(())
    }

    /// Reassign custody and reset recovery state
    fn move_fid(&mut self, ctx: &CallContext, fid: Fid, from: Address, to: Address) {
        self.id_of.remove(&from);
        self.id_of.insert(to, fid);
        self.custody_of.insert(fid, to);
        if self.recovery.request_of(&fid).is_some() {
            tracing::debug!(fid = %fid, block = ctx.block.number, "pending recovery cleared by custody change");
        }
        self.recovery.clear(&fid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use idreg_core::{Block, SignatureError};

    /// Accepts a signature equal to the signer's address bytes
    struct AddressEcho;

    impl SignatureVerifier for AddressEcho {
        fn is_valid_signature(&self, signer: &Address, _digest: &Hash32, signature: &[u8]) -> bool {
            signature == signer.as_bytes()
        }
    }

    fn registry() -> IdRegistry {
        IdRegistry::new(
            &IdentityConfig::default(),
            AccessControl::with_owner(Address::repeat_byte(0xaa)),
            Arc::new(AddressEcho),
            Address::repeat_byte(0x11),
        )
    }

    fn at(caller: Address, timestamp: u64) -> CallContext {
        CallContext::new(caller, Block::new(timestamp, timestamp))
    }

    fn alice() -> Address {
        Address::repeat_byte(1)
    }

    fn bob() -> Address {
        Address::repeat_byte(2)
    }

    #[test]
    fn ids_are_sequential_and_unique_per_address() {
        let mut ids = registry();
        assert_eq!(ids.register(&at(alice(), 1), alice(), Address::ZERO).unwrap(), Fid(1));
        assert_eq!(ids.register(&at(bob(), 1), bob(), Address::ZERO).unwrap(), Fid(2));
        assert_matches!(
            ids.register(&at(alice(), 1), alice(), Address::ZERO),
            Err(IdentityError::HasId { .. })
        );
        assert_eq!(ids.id_counter(), 2);
    }

    #[test]
    fn transfer_requires_recipient_signature() {
        let mut ids = registry();
        ids.register(&at(alice(), 1), alice(), Address::repeat_byte(9)).unwrap();

        assert_matches!(
            ids.transfer(&at(alice(), 2), bob(), 100, b"nope"),
            Err(IdentityError::Signature(SignatureError::InvalidSignature { .. }))
        );
        assert_matches!(
            ids.transfer(&at(alice(), 200), bob(), 100, bob().as_bytes()),
            Err(IdentityError::Signature(SignatureError::SignatureExpired { deadline: 100 }))
        );
        ids.transfer(&at(alice(), 2), bob(), 100, bob().as_bytes()).unwrap();
        assert_eq!(ids.id_of(&bob()), Some(Fid(1)));
        assert_eq!(ids.id_of(&alice()), None);
        assert_eq!(ids.recovery_of(Fid(1)), None);
        assert_eq!(ids.nonce(&bob()), 1);
    }

    #[test]
    fn transfer_from_unowned_or_to_owner_fails() {
        let mut ids = registry();
        ids.register(&at(alice(), 1), alice(), Address::ZERO).unwrap();
        ids.register(&at(bob(), 1), bob(), Address::ZERO).unwrap();
        let carol = Address::repeat_byte(3);
        assert_matches!(
            ids.transfer(&at(carol, 2), bob(), 100, bob().as_bytes()),
            Err(IdentityError::HasNoId { .. })
        );
        assert_matches!(
            ids.transfer(&at(alice(), 2), bob(), 100, bob().as_bytes()),
            Err(IdentityError::HasId { .. })
        );
    }

    #[test]
    fn change_recovery_drops_pending_request() {
        let mut ids = registry();
        let recovery = Address::repeat_byte(9);
        ids.register(&at(alice(), 1), alice(), recovery).unwrap();
        ids.request_recovery(&at(recovery, 2), alice(), bob()).unwrap();

        ids.change_recovery_address(&at(alice(), 3), Address::repeat_byte(8))
            .unwrap();
        assert_eq!(ids.recovery_request_of(Fid(1)), None);
        assert_eq!(ids.recovery_of(Fid(1)), Some(Address::repeat_byte(8)));
    }

    #[test]
    fn cancel_by_stranger_is_unauthorized() {
        let mut ids = registry();
        let recovery = Address::repeat_byte(9);
        ids.register(&at(alice(), 1), alice(), recovery).unwrap();
        ids.request_recovery(&at(recovery, 2), alice(), bob()).unwrap();
        assert_matches!(
            ids.cancel_recovery(&at(Address::repeat_byte(7), 3), alice()),
            Err(IdentityError::Unauthorized { .. })
        );
        ids.cancel_recovery(&at(alice(), 3), alice()).unwrap();
        assert_matches!(
            ids.cancel_recovery(&at(recovery, 4), alice()),
            Err(IdentityError::NoRecovery)
        );
    }

    #[test]
    fn paused_registry_refuses_registration() {
        let mut ids = registry();
        let owner = Address::repeat_byte(0xaa);
        assert_matches!(ids.pause(&at(alice(), 1)), Err(IdentityError::Access(_)));
        ids.pause(&at(owner, 1)).unwrap();
        assert_matches!(
            ids.register(&at(alice(), 2), alice(), Address::ZERO),
            Err(IdentityError::Paused)
        );
        ids.unpause(&at(owner, 3)).unwrap();
        ids.register(&at(alice(), 4), alice(), Address::ZERO).unwrap();
    }

    #[test]
    fn fid_signature_checks_custody() {
        let mut ids = registry();
        ids.register(&at(alice(), 1), alice(), Address::ZERO).unwrap();
        let digest = idreg_core::hash(b"message");
        assert!(ids.verify_fid_signature(&alice(), Fid(1), &digest, alice().as_bytes()));
        assert!(!ids.verify_fid_signature(&bob(), Fid(1), &digest, bob().as_bytes()));
        assert!(!ids.verify_fid_signature(&alice(), Fid(2), &digest, alice().as_bytes()));
    }
}
