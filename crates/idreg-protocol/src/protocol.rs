//! The composed protocol

use crate::config::ProtocolConfig;
use crate::error::ProtocolResult;
use idreg_core::config::RegistryConfig;
use idreg_core::{
    AccessControl, Address, Block, CallContext, EventEnvelope, Fid, Hash32, Ledger,
    NativeTransfer, PriceFeed, SignatureVerifier, Timestamp, Wei,
};
use idreg_fname::{NameRegistry, TokenId};
use idreg_identity::{IdRegistry, KeyRegistry};
use idreg_oracle::PriceOracle;
use idreg_storage::StorageRentLedger;
use std::sync::Arc;

/// External services the registries depend on.
#[derive(Clone)]
pub struct Collaborators {
    /// ETH/USD feed
    pub price_feed: Arc<dyn PriceFeed>,
    /// Optional sequencer liveness feed
    pub uptime_feed: Option<Arc<dyn PriceFeed>>,
    /// Native value transfers for refunds and withdrawals
    pub bank: Arc<dyn NativeTransfer>,
    /// Signature verification for signed id operations
    pub verifier: Arc<dyn SignatureVerifier>,
    /// Address signatures are bound to
    pub id_registry_address: Address,
    /// Destination of withdrawn fees
    pub vault: Address,
}

/// State of every registry.
#[derive(Debug, Clone)]
pub struct ProtocolState {
    /// Storage rent and the price oracle
    pub storage: StorageRentLedger,
    /// Fid custody and recovery
    pub ids: IdRegistry,
    /// Keys bound to fids
    pub keys: KeyRegistry,
    /// Name leases
    pub names: NameRegistry,
}

/// All registries behind one transaction boundary.
#[derive(Debug)]
pub struct Protocol {
    ledger: Ledger<ProtocolState>,
}

impl Protocol {
    /// Validate `config` and build every registry at `genesis`.
    ///
    /// `access` is cloned into each registry, so one role table governs all of
    /// them.
    pub fn new(
        config: &ProtocolConfig,
        collaborators: Collaborators,
        access: AccessControl,
        genesis: Block,
    ) -> ProtocolResult<Self> {
        config.validate()?;
        let Collaborators {
            price_feed,
            uptime_feed,
            bank,
            verifier,
            id_registry_address,
            vault,
        } = collaborators;

        let oracle = PriceOracle::new(config.oracle.clone(), price_feed, uptime_feed, genesis)?;
        let storage = StorageRentLedger::new(
            &config.storage,
            oracle,
            access.clone(),
            bank.clone(),
            vault,
            genesis,
        )?;
        let ids = IdRegistry::new(&config.identity, access.clone(), verifier, id_registry_address);
        let keys = KeyRegistry::new(&config.keys, access.clone());
        let names = NameRegistry::new(&config.names, access, bank, vault)?;

        tracing::info!(
            block = genesis.number,
            timestamp = genesis.timestamp,
            vault = %vault,
            "protocol initialized"
        );
        Ok(Self {
            ledger: Ledger::new(ProtocolState {
                storage,
                ids,
                keys,
                names,
            }),
        })
    }

    /// Run `op` as one atomic transaction over every registry
    pub fn transact<T, E>(&self, op: impl FnOnce(&mut ProtocolState) -> Result<T, E>) -> Result<T, E> {
        self.ledger.transact(op)
    }

    /// Read committed state
    pub fn read<T>(&self, view: impl FnOnce(&ProtocolState) -> T) -> T {
        self.ledger.read(view)
    }

    // ---- bundled calls ---------------------------------------------------

    /// Register an fid for `to` and rent `units` for it with the attached value.
    ///
    /// With `units == 0` no storage is rented and the call is free.
    pub fn register(
        &self,
        ctx: &CallContext,
        to: Address,
        recovery: Address,
        units: u64,
    ) -> ProtocolResult<Fid> {
        self.transact(|state| {
            let fid = state.ids.register(ctx, to, recovery)?;
            if units > 0 {
                state.storage.rent(ctx, fid, units)?;
            }
            Ok(fid)
        })
    }

    /// Rent `units` for `fid`, returning the price charged
    pub fn rent(&self, ctx: &CallContext, fid: Fid, units: u64) -> ProtocolResult<Wei> {
        self.transact(|state| Ok(state.storage.rent(ctx, fid, units)?))
    }

    /// Add a key to the caller's fid
    pub fn add_key(
        &self,
        ctx: &CallContext,
        key_type: u32,
        key: &[u8],
        metadata_type: u8,
        metadata: &[u8],
    ) -> ProtocolResult<()> {
        self.transact(|state| {
            Ok(state
                .keys
                .add(ctx, &state.ids, key_type, key, metadata_type, metadata)?)
        })
    }

    /// Remove a key from the caller's fid
    pub fn remove_key(&self, ctx: &CallContext, key: &[u8]) -> ProtocolResult<()> {
        self.transact(|state| Ok(state.keys.remove(ctx, &state.ids, key)?))
    }

    /// Store a name commit
    pub fn make_commit(&self, ctx: &CallContext, commit: Hash32) -> ProtocolResult<()> {
        self.transact(|state| Ok(state.names.make_commit(ctx, commit)?))
    }

    /// Reveal a commit and mint the name
    pub fn register_name(
        &self,
        ctx: &CallContext,
        name: &str,
        to: Address,
        secret: &[u8; 32],
        recovery: Address,
    ) -> ProtocolResult<TokenId> {
        self.transact(|state| Ok(state.names.register(ctx, name, to, secret, recovery)?))
    }

    /// Renew a lapsed name
    pub fn renew_name(&self, ctx: &CallContext, token: TokenId) -> ProtocolResult<Timestamp> {
        self.transact(|state| Ok(state.names.renew(ctx, token)?))
    }

    /// Bid on a name in auction
    pub fn bid_name(
        &self,
        ctx: &CallContext,
        to: Address,
        token: TokenId,
        recovery: Address,
    ) -> ProtocolResult<Wei> {
        self.transact(|state| Ok(state.names.bid(ctx, to, token, recovery)?))
    }

    // ---- views -----------------------------------------------------------

    /// Every held event across all registries, in emission order
    pub fn envelopes(&self) -> ProtocolResult<Vec<EventEnvelope>> {
        self.read(|state| {
            let mut all = state.storage.oracle().journal().envelopes()?;
            all.extend(state.storage.journal().envelopes()?);
            all.extend(state.ids.journal().envelopes()?);
            all.extend(state.keys.journal().envelopes()?);
            all.extend(state.names.journal().envelopes()?);
            all.sort_by_key(|envelope| envelope.emission);
            Ok(all)
        })
    }

    /// Hand every held event to the caller, in emission order, and empty the
    /// journals.
    ///
    /// Each transaction copies the journals, so a long-running protocol should
    /// drain them regularly.
    pub fn drain_envelopes(&self) -> ProtocolResult<Vec<EventEnvelope>> {
        self.transact(|state| {
            let mut all = state.storage.drain_envelopes()?;
            all.extend(state.ids.drain_envelopes()?);
            all.extend(state.keys.drain_envelopes()?);
            all.extend(state.names.drain_envelopes()?);
            all.sort_by_key(|envelope| envelope.emission);
            tracing::debug!(events = all.len(), "journals drained");
            Ok(all)
        })
    }
}
