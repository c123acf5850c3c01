//! Commit-reveal registration, renewal, auctions and name recovery

use crate::auction::bid_price;
use crate::calendar::YearCalendar;
use crate::commit::commit_hash;
use crate::config::NameConfig;
use crate::error::{NameError, NameResult};
use crate::events::NameEvent;
use crate::name::{Fname, TokenId};
use idreg_core::math::checked_add;
use idreg_core::{
    AccessControl, Address, CallContext, EventEnvelope, Fid, Hash32, Journal, NativeTransfer, Role,
    Timestamp, Wei,
};
use idreg_recovery::{RecoveryBook, RecoveryRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Lifecycle phase of a name at some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameStatus {
    /// Never minted
    Registrable,
    /// Lease running
    Registered,
    /// Lease lapsed, owner may still renew
    Renewable,
    /// Grace period over, open to bids
    Biddable,
}

/// Ownership record of a minted name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    /// Current owner
    pub owner: Address,
    /// End of the lease
    pub expiry: Timestamp,
}

/// One moderator reassignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclaimAction {
    /// Name to move
    pub token: TokenId,
    /// New owner
    pub destination: Address,
}

/// Name leases, commits, auctions and recovery.
#[derive(Clone)]
pub struct NameRegistry {
    config: NameConfig,
    access: AccessControl,
    bank: Arc<dyn NativeTransfer>,
    calendar: YearCalendar,
    commits: BTreeMap<Hash32, Timestamp>,
    records: BTreeMap<TokenId, NameRecord>,
    recovery: RecoveryBook<TokenId>,
    trusted_only: bool,
    paused: bool,
    vault: Address,
    balance: Wei,
    journal: Journal<NameEvent>,
}

impl fmt::Debug for NameRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameRegistry")
            .field("fee", &self.config.fee)
            .field("names", &self.records.len())
            .field("commits", &self.commits.len())
            .field("trusted_only", &self.trusted_only)
            .field("paused", &self.paused)
            .field("balance", &self.balance)
            .finish_non_exhaustive()
    }
}

impl NameRegistry {
    /// Registry in the trusted-only phase; withdrawals go to `vault`
    pub fn new(
        config: &NameConfig,
        access: AccessControl,
        bank: Arc<dyn NativeTransfer>,
        vault: Address,
    ) -> NameResult<Self> {
        if vault.is_zero() {
            return Err(NameError::InvalidAddress);
        }
        Ok(Self {
            config: config.clone(),
            access,
            bank,
            calendar: YearCalendar::new(config.first_year, config.last_year)?,
            commits: BTreeMap::new(),
            records: BTreeMap::new(),
            recovery: RecoveryBook::new(config.escrow_period),
            trusted_only: true,
            paused: false,
            vault,
            balance: 0,
            journal: Journal::new(),
        })
    }

    // ---- registration ----------------------------------------------------

    /// Store a commit hash, starting its reveal delay
    pub fn make_commit(&mut self, ctx: &CallContext, commit: Hash32) -> NameResult<()> {
        self.ensure_unpaused()?;
        if self.trusted_only {
            return Err(NameError::Invitable);
        }
        if let Some(&made_at) = self.commits.get(&commit) {
            // the window is inclusive of its last second
            let ready_at = made_at
                .saturating_add(self.config.commit_replay_delay)
                .saturating_add(1);
            if ctx.now() < ready_at {
                return Err(NameError::CommitReplay { ready_at });
            }
        }
        self.commits.insert(commit, ctx.now());
        tracing::debug!(commit = %commit, at = ctx.now(), "name commit stored");
        Ok(())
    }

    /// Reveal a commit and mint the name to `to`
    pub fn register(
        &mut self,
        ctx: &CallContext,
        name: &str,
        to: Address,
        secret: &[u8; 32],
        recovery: Address,
    ) -> NameResult<TokenId> {
        self.ensure_unpaused()?;
        let fname = Fname::parse(name)?;
        let commit = commit_hash(&fname, &to, secret, &recovery);
        let now = ctx.now();
        match self.commits.get(&commit) {
            Some(&made_at) if now >= made_at.saturating_add(self.config.reveal_delay) => {}
            _ => return Err(NameError::InvalidCommit),
        }
        let token = fname.token_id();
        match self.status(token, now) {
            NameStatus::Registrable => {}
            NameStatus::Biddable => return Err(NameError::NotRegistrable),
            NameStatus::Registered | NameStatus::Renewable => return Err(NameError::Registered),
        }
        if to.is_zero() {
            return Err(NameError::InvalidAddress);
        }

        self.calendar.current_year(now)?;
        let price = self.calendar.prorated_fee(self.config.fee, now)?;
        self.ensure_payment(ctx, price)?;
        let expiry = self.calendar.next_year_start(now)?;

        self.commits.remove(&commit);
        self.mint(ctx, token, to, expiry, recovery);
        tracing::info!(name = %fname, to = %to, expiry, price, "name registered");
        self.settle(ctx, price)?;
        Ok(token)
    }

    /// Mint without a commit during the trusted-only phase
    pub fn trusted_register(
        &mut self,
        ctx: &CallContext,
        to: Address,
        name: &str,
        recovery: Address,
        inviter: Fid,
        invitee: Fid,
    ) -> NameResult<TokenId> {
        self.ensure_unpaused()?;
        if !self.trusted_only {
            return Err(NameError::NotInvitable);
        }
        self.access.require(&ctx.caller, Role::Trusted)?;
        let fname = Fname::parse(name)?;
        let token = fname.token_id();
        if self.records.contains_key(&token) {
            return Err(NameError::Registered);
        }
        if to.is_zero() {
            return Err(NameError::InvalidAddress);
        }
        let now = ctx.now();
        self.calendar.current_year(now)?;
        let expiry = self.calendar.next_year_start(now)?;

        self.mint(ctx, token, to, expiry, recovery);
        self.journal.record(
            ctx.block,
            NameEvent::Invite {
                inviter,
                invitee,
                name: fname,
            },
        );
        tracing::info!(name = %fname, to = %to, inviter = %inviter, invitee = %invitee, "name registered by trusted caller");
        Ok(token)
    }

    /// Extend a lapsed lease to the end of the current year
    pub fn renew(&mut self, ctx: &CallContext, token: TokenId) -> NameResult<Timestamp> {
        self.ensure_unpaused()?;
        let now = ctx.now();
        match self.status(token, now) {
            NameStatus::Renewable => {}
            NameStatus::Registrable => return Err(NameError::Registrable),
            NameStatus::Registered => return Err(NameError::Registered),
            NameStatus::Biddable => return Err(NameError::NotRenewable),
        }
        let price = self.config.fee;
        self.ensure_payment(ctx, price)?;
        self.calendar.current_year(now)?;
        let expiry = self.calendar.next_year_start(now)?;

        if let Some(record) = self.records.get_mut(&token) {
            record.expiry = expiry;
        }
        self.journal
            .record(ctx.block, NameEvent::Renew { token, expiry });
        tracing::info!(token = %token, expiry, price, "name renewed");
        self.settle(ctx, price)?;
        Ok(expiry)
    }

    /// Buy a name in auction, returning the price paid
    pub fn bid(
        &mut self,
        ctx: &CallContext,
        to: Address,
        token: TokenId,
        recovery: Address,
    ) -> NameResult<Wei> {
        self.ensure_unpaused()?;
        let now = ctx.now();
        let record = self.record_of(token).ok_or(NameError::Registrable)?;
        let auction_start = record
            .expiry
            .checked_add(self.config.renewal_period)
            .ok_or(NameError::NotBiddable)?;
        if now < auction_start {
            return Err(NameError::NotBiddable);
        }
        if to.is_zero() {
            return Err(NameError::InvalidAddress);
        }
        self.calendar.current_year(now)?;
        let fee = self.calendar.prorated_fee(self.config.fee, now)?;
        let price = bid_price(&self.config, auction_start, now, fee)?;
        self.ensure_payment(ctx, price)?;
        let expiry = self.calendar.next_year_start(now)?;

        self.move_name(ctx, token, to);
        if let Some(record) = self.records.get_mut(&token) {
            record.expiry = expiry;
        }
        self.journal
            .record(ctx.block, NameEvent::Renew { token, expiry });
        self.set_recovery(ctx, token, recovery);
        tracing::info!(token = %token, from = %record.owner, to = %to, price, "name won at auction");
        self.settle(ctx, price)?;
        Ok(price)
    }

    // ---- ownership -------------------------------------------------------

    /// Owner of a name whose lease is running
    pub fn owner_of(&self, token: TokenId, now: Timestamp) -> NameResult<Address> {
        let record = self.record_of(token).ok_or(NameError::Registrable)?;
        if now >= record.expiry {
            return Err(NameError::Expired {
                expiry: record.expiry,
            });
        }
        Ok(record.owner)
    }

    /// Move a name from `from` to `to`; the caller must be the owner
    pub fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        token: TokenId,
    ) -> NameResult<()> {
        self.ensure_unpaused()?;
        let owner = self.owner_of(token, ctx.now())?;
        if ctx.caller != owner || from != owner {
            return Err(NameError::Unauthorized { caller: ctx.caller });
        }
        if to.is_zero() {
            return Err(NameError::InvalidAddress);
        }
        self.move_name(ctx, token, to);
        tracing::info!(token = %token, from = %from, to = %to, "name transferred");
        Ok(())
    }

    // ---- recovery --------------------------------------------------------

    /// Replace the recovery address of a name the caller owns
    pub fn change_recovery_address(
        &mut self,
        ctx: &CallContext,
        token: TokenId,
        recovery: Address,
    ) -> NameResult<()> {
        self.ensure_unpaused()?;
        let owner = self.owner_of(token, ctx.now())?;
        if ctx.caller != owner {
            return Err(NameError::Unauthorized { caller: ctx.caller });
        }
        self.set_recovery(ctx, token, recovery);
        Ok(())
    }

    /// Start an escrowed move of a name to `to`
    pub fn request_recovery(
        &mut self,
        ctx: &CallContext,
        token: TokenId,
        to: Address,
    ) -> NameResult<()> {
        self.ensure_unpaused()?;
        let record = self.record_of(token).ok_or(NameError::Registrable)?;
        self.recovery.request(token, &ctx.caller, to, ctx.now())?;
        self.journal.record(
            ctx.block,
            NameEvent::RequestRecovery {
                from: record.owner,
                to,
                token,
            },
        );
        tracing::info!(token = %token, to = %to, "name recovery requested");
        Ok(())
    }

    /// Finish a request whose escrow elapsed; the lease must still be running
    pub fn complete_recovery(&mut self, ctx: &CallContext, token: TokenId) -> NameResult<Address> {
        self.ensure_unpaused()?;
        let record = self.record_of(token).ok_or(NameError::Registrable)?;
        let destination = self.recovery.ready(&token, &ctx.caller, ctx.now())?;
        if ctx.now() >= record.expiry {
            return Err(NameError::Expired {
                expiry: record.expiry,
            });
        }
        self.move_name(ctx, token, destination);
        tracing::info!(token = %token, from = %record.owner, to = %destination, "name recovered");
        Ok(destination)
    }

    /// Drop a pending request; callable by the owner or the recovery address
    pub fn cancel_recovery(&mut self, ctx: &CallContext, token: TokenId) -> NameResult<()> {
        let record = self.record_of(token).ok_or(NameError::Registrable)?;
        if ctx.caller != record.owner {
            self.recovery.authorize(&token, &ctx.caller)?;
        }
        self.recovery.cancel(&token)?;
        self.journal.record(
            ctx.block,
            NameEvent::CancelRecovery {
                by: ctx.caller,
                token,
            },
        );
        tracing::info!(token = %token, by = %ctx.caller, "name recovery cancelled");
        Ok(())
    }

    // ---- privileged ------------------------------------------------------

    /// Open registration to everyone
    pub fn disable_trusted_only(&mut self, ctx: &CallContext) -> NameResult<()> {
        self.access.require(&ctx.caller, Role::Admin)?;
        self.trusted_only = false;
        self.journal.record(ctx.block, NameEvent::DisableTrustedOnly);
        tracing::info!(by = %ctx.caller, "name registration opened");
        Ok(())
    }

    /// Move names to moderator-chosen owners
    pub fn reclaim(&mut self, ctx: &CallContext, actions: &[ReclaimAction]) -> NameResult<()> {
        self.access.require(&ctx.caller, Role::Moderator)?;
        let now = ctx.now();
        let mut expiries = Vec::with_capacity(actions.len());
        for action in actions {
            let record = self.record_of(action.token).ok_or(NameError::Registrable)?;
            if action.destination.is_zero() {
                return Err(NameError::InvalidAddress);
            }
            expiries.push(record.expiry);
        }
        let renewed = if expiries.iter().any(|&expiry| now >= expiry) {
            self.calendar.current_year(now)?;
            Some(self.calendar.next_year_start(now)?)
        } else {
            None
        };

        for (action, expiry) in actions.iter().zip(expiries) {
            self.move_name(ctx, action.token, action.destination);
            if let Some(renewed) = renewed.filter(|_| now >= expiry) {
                if let Some(record) = self.records.get_mut(&action.token) {
                    record.expiry = renewed;
                }
                self.journal.record(
                    ctx.block,
                    NameEvent::Renew {
                        token: action.token,
                        expiry: renewed,
                    },
                );
            }
            tracing::warn!(token = %action.token, to = %action.destination, by = %ctx.caller, "name reclaimed");
        }
        Ok(())
    }

    /// Change the yearly fee
    pub fn set_fee(&mut self, ctx: &CallContext, fee: Wei) -> NameResult<()> {
        self.access.require(&ctx.caller, Role::Admin)?;
        self.config.fee = fee;
        self.journal.record(ctx.block, NameEvent::ChangeFee { fee });
        tracing::info!(fee, "name fee set");
        Ok(())
    }

    /// Send `amount` of the collected fees to the vault
    pub fn withdraw(&mut self, ctx: &CallContext, amount: Wei) -> NameResult<()> {
        self.access.require(&ctx.caller, Role::Treasurer)?;
        if amount > self.balance {
            return Err(NameError::InsufficientBalance {
                requested: amount,
                balance: self.balance,
            });
        }
        self.balance -= amount;
        self.journal.record(
            ctx.block,
            NameEvent::Withdraw {
                to: self.vault,
                amount,
            },
        );
        tracing::info!(vault = %self.vault, amount, "name fees withdrawn");
        self.bank.send_value(self.vault, amount)?;
        Ok(())
    }

    /// Stop state-changing calls
    pub fn pause(&mut self, ctx: &CallContext) -> NameResult<()> {
        self.access.require(&ctx.caller, Role::Admin)?;
        self.paused = true;
        self.journal
            .record(ctx.block, NameEvent::Paused { by: ctx.caller });
        tracing::warn!(by = %ctx.caller, "name registry paused");
        Ok(())
    }

    /// Resume state-changing calls
    pub fn unpause(&mut self, ctx: &CallContext) -> NameResult<()> {
        self.access.require(&ctx.caller, Role::Admin)?;
        self.paused = false;
        self.journal
            .record(ctx.block, NameEvent::Unpaused { by: ctx.caller });
        tracing::info!(by = %ctx.caller, "name registry unpaused");
        Ok(())
    }

    // ---- views -----------------------------------------------------------

    /// Phase of `token` at `now`
    pub fn status(&self, token: TokenId, now: Timestamp) -> NameStatus {
        match self.records.get(&token) {
            None => NameStatus::Registrable,
            Some(record) if now < record.expiry => NameStatus::Registered,
            Some(record) if now < record.expiry.saturating_add(self.config.renewal_period) => {
                NameStatus::Renewable
            }
            Some(_) => NameStatus::Biddable,
        }
    }

    /// Stored record, regardless of expiry
    pub fn record_of(&self, token: TokenId) -> Option<NameRecord> {
        self.records.get(&token).copied()
    }

    /// Recovery address of `token`
    pub fn recovery_of(&self, token: TokenId) -> Option<Address> {
        self.recovery.recovery_of(&token)
    }

    /// Pending recovery request of `token`
    pub fn recovery_request_of(&self, token: TokenId) -> Option<RecoveryRequest> {
        self.recovery.request_of(&token)
    }

    /// When `commit` was stored
    pub fn commit_of(&self, commit: &Hash32) -> Option<Timestamp> {
        self.commits.get(commit).copied()
    }

    /// Price of a fresh registration at `now`
    pub fn registration_price(&self, now: Timestamp) -> NameResult<Wei> {
        self.calendar.prorated_fee(self.config.fee, now)
    }

    /// Price of a bid on `token` at `now`
    pub fn bid_price(&self, token: TokenId, now: Timestamp) -> NameResult<Wei> {
        let record = self.record_of(token).ok_or(NameError::Registrable)?;
        let auction_start = record.expiry.saturating_add(self.config.renewal_period);
        if now < auction_start {
            return Err(NameError::NotBiddable);
        }
        let fee = self.calendar.prorated_fee(self.config.fee, now)?;
        Ok(bid_price(&self.config, auction_start, now, fee)?)
    }

    /// Yearly fee
    pub fn fee(&self) -> Wei {
        self.config.fee
    }

    /// Whether only the trusted caller may register
    pub fn trusted_only(&self) -> bool {
        self.trusted_only
    }

    /// Whether the registry is paused
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Collected fees
    pub fn balance(&self) -> Wei {
        self.balance
    }

    /// Year table
    pub fn calendar(&self) -> &YearCalendar {
        &self.calendar
    }

    /// Name events
    pub fn journal(&self) -> &Journal<NameEvent> {
        &self.journal
    }

    /// Hand off held name events
    pub fn drain_envelopes(&mut self) -> Result<Vec<EventEnvelope>, serde_json::Error> {
        self.journal.drain_envelopes()
    }

    /// Role table
    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    // ---- internals -------------------------------------------------------

    fn ensure_unpaused(&self) -> NameResult<()> {
        if self.paused {
            return Err(NameError::Paused);
        }
        Ok(())
    }

    fn ensure_payment(&self, ctx: &CallContext, price: Wei) -> NameResult<()> {
        if ctx.value < price {
            tracing::debug!(required = price, provided = ctx.value, "name payment short");
            return Err(NameError::InsufficientFunds {
                required: price,
                provided: ctx.value,
            });
        }
        Ok(())
    }

    /// Keep `price` of the attached value and send the rest back
    fn settle(&mut self, ctx: &CallContext, price: Wei) -> NameResult<()> {
        self.balance = checked_add(self.balance, price, "name balance")?;
        let overpaid = ctx.value - price;
        if overpaid > 0 {
            self.bank.send_value(ctx.caller, overpaid)?;
        }
        Ok(())
    }

    fn mint(
        &mut self,
        ctx: &CallContext,
        token: TokenId,
        to: Address,
        expiry: Timestamp,
        recovery: Address,
    ) {
        self.records.insert(token, NameRecord { owner: to, expiry });
        self.journal.record(
            ctx.block,
            NameEvent::Transfer {
                from: Address::ZERO,
                to,
                token,
            },
        );
        self.journal
            .record(ctx.block, NameEvent::Renew { token, expiry });
        self.recovery.set_recovery(token, recovery);
    }

    /// Reassign ownership and reset recovery state
    fn move_name(&mut self, ctx: &CallContext, token: TokenId, to: Address) {
        let Some(record) = self.records.get_mut(&token) else {
            return;
        };
        let from = std::mem::replace(&mut record.owner, to);
        self.recovery.clear(&token);
        self.journal
            .record(ctx.block, NameEvent::Transfer { from, to, token });
    }

    fn set_recovery(&mut self, ctx: &CallContext, token: TokenId, recovery: Address) {
        if self.recovery.set_recovery(token, recovery).is_some() {
            self.journal.record(
                ctx.block,
                NameEvent::CancelRecovery {
                    by: ctx.caller,
                    token,
                },
            );
        }
        self.journal
            .record(ctx.block, NameEvent::ChangeRecoveryAddress { token, recovery });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::generate_commit;
    use assert_matches::assert_matches;
    use idreg_core::{Block, TransferError};

    struct Sink;

    impl NativeTransfer for Sink {
        fn send_value(&self, _to: Address, _amount: Wei) -> Result<(), TransferError> {
            Ok(())
        }
    }

    const JAN_1_2024: Timestamp = 1_704_067_200;
    const JAN_1_2025: Timestamp = 1_735_689_600;
    const SECRET: [u8; 32] = [9; 32];

    fn admin() -> Address {
        Address::repeat_byte(0xad)
    }

    fn alice() -> Address {
        Address::repeat_byte(1)
    }

    fn at(caller: Address, timestamp: Timestamp) -> CallContext {
        CallContext::new(caller, Block::new(timestamp / 12, timestamp))
    }

    fn open_registry() -> NameRegistry {
        let access = AccessControl::with_owner(admin())
            .granting(Role::Admin, admin())
            .granting(Role::Moderator, admin())
            .granting(Role::Trusted, admin());
        let mut names =
            NameRegistry::new(&NameConfig::default(), access, Arc::new(Sink), admin()).unwrap();
        names.disable_trusted_only(&at(admin(), JAN_1_2024)).unwrap();
        names
    }

    fn commit_and_register(names: &mut NameRegistry, name: &str, t0: Timestamp) -> TokenId {
        let commit = generate_commit(name, &alice(), &SECRET, &Address::ZERO).unwrap();
        names.make_commit(&at(alice(), t0), commit).unwrap();
        names
            .register(
                &at(alice(), t0 + 60).with_value(names.fee()),
                name,
                alice(),
                &SECRET,
                Address::ZERO,
            )
            .unwrap()
    }

    #[test]
    fn trusted_phase_gates_commits() {
        let access = AccessControl::with_owner(admin())
            .granting(Role::Admin, admin())
            .granting(Role::Trusted, admin());
        let mut names =
            NameRegistry::new(&NameConfig::default(), access, Arc::new(Sink), admin()).unwrap();
        assert_matches!(
            names.make_commit(&at(alice(), JAN_1_2024), Hash32::default()),
            Err(NameError::Invitable)
        );
        let token = names
            .trusted_register(&at(admin(), JAN_1_2024), alice(), "alice", Address::ZERO, Fid(1), Fid(2))
            .unwrap();
        assert_eq!(names.owner_of(token, JAN_1_2024).unwrap(), alice());
        assert_matches!(names.journal().last(), Some(NameEvent::Invite { .. }));

        names.disable_trusted_only(&at(admin(), JAN_1_2024)).unwrap();
        assert_matches!(
            names.trusted_register(&at(admin(), JAN_1_2024), alice(), "bob", Address::ZERO, Fid(1), Fid(3)),
            Err(NameError::NotInvitable)
        );
    }

    #[test]
    fn commit_replay_window() {
        let mut names = open_registry();
        let commit = Hash32::from([1; 32]);
        names.make_commit(&at(alice(), JAN_1_2024), commit).unwrap();
        assert_matches!(
            names.make_commit(&at(alice(), JAN_1_2024 + 599), commit),
            Err(NameError::CommitReplay { ready_at }) if ready_at == JAN_1_2024 + 601
        );
        assert_matches!(
            names.make_commit(&at(alice(), JAN_1_2024 + 600), commit),
            Err(NameError::CommitReplay { .. })
        );
        assert_eq!(names.commit_of(&commit), Some(JAN_1_2024));
        names.make_commit(&at(alice(), JAN_1_2024 + 601), commit).unwrap();
        assert_eq!(names.commit_of(&commit), Some(JAN_1_2024 + 601));
    }

    #[test]
    fn lifecycle_phases_follow_the_clock() {
        let mut names = open_registry();
        let token = commit_and_register(&mut names, "alice", JAN_1_2024);
        assert_eq!(names.record_of(token).unwrap().expiry, JAN_1_2025);
        assert_eq!(names.status(token, JAN_1_2025 - 1), NameStatus::Registered);
        assert_eq!(names.status(token, JAN_1_2025), NameStatus::Renewable);
        assert_eq!(names.status(token, JAN_1_2025 + 30 * 86_400), NameStatus::Biddable);
        assert_matches!(
            names.owner_of(token, JAN_1_2025),
            Err(NameError::Expired { expiry }) if expiry == JAN_1_2025
        );
    }

    #[test]
    fn renewal_phase_errors() {
        let mut names = open_registry();
        let unminted = Fname::parse("nobody").unwrap().token_id();
        let fee = names.fee();
        assert_matches!(
            names.renew(&at(alice(), JAN_1_2024).with_value(fee), unminted),
            Err(NameError::Registrable)
        );
        let token = commit_and_register(&mut names, "alice", JAN_1_2024);
        assert_matches!(
            names.renew(&at(alice(), JAN_1_2024 + 120).with_value(fee), token),
            Err(NameError::Registered)
        );
        assert_matches!(
            names.renew(&at(alice(), JAN_1_2025 + 10).with_value(fee - 1), token),
            Err(NameError::InsufficientFunds { .. })
        );
        let expiry = names
            .renew(&at(alice(), JAN_1_2025 + 10).with_value(fee), token)
            .unwrap();
        assert_eq!(expiry, 1_767_225_600);
        assert_eq!(names.owner_of(token, JAN_1_2025 + 10).unwrap(), alice());
    }

    #[test]
    fn minted_names_cannot_be_registered_again() {
        let mut names = open_registry();
        let token = commit_and_register(&mut names, "alice", JAN_1_2024);
        let bob = Address::repeat_byte(2);
        let commit = generate_commit("alice", &bob, &SECRET, &Address::ZERO).unwrap();
        names.make_commit(&at(bob, JAN_1_2024 + 100), commit).unwrap();
        assert_matches!(
            names.register(&at(bob, JAN_1_2024 + 200).with_value(names.fee()), "alice", bob, &SECRET, Address::ZERO),
            Err(NameError::Registered)
        );

        let late = JAN_1_2025 + 31 * 86_400;
        assert_eq!(names.status(token, late), NameStatus::Biddable);
        names.make_commit(&at(bob, late), commit).unwrap();
        assert_matches!(
            names.register(&at(bob, late + 60).with_value(names.fee()), "alice", bob, &SECRET, Address::ZERO),
            Err(NameError::NotRegistrable)
        );
    }

    #[test]
    fn transfer_requires_owner_and_clears_recovery() {
        let mut names = open_registry();
        let token = commit_and_register(&mut names, "alice", JAN_1_2024);
        let recovery = Address::repeat_byte(0xee);
        let bob = Address::repeat_byte(2);
        let now = JAN_1_2024 + 1_000;
        names.change_recovery_address(&at(alice(), now), token, recovery).unwrap();
        names.request_recovery(&at(recovery, now), token, bob).unwrap();

        assert_matches!(
            names.transfer_from(&at(bob, now), alice(), bob, token),
            Err(NameError::Unauthorized { .. })
        );
        assert_matches!(
            names.transfer_from(&at(alice(), now), alice(), Address::ZERO, token),
            Err(NameError::InvalidAddress)
        );
        names.transfer_from(&at(alice(), now), alice(), bob, token).unwrap();
        assert_eq!(names.owner_of(token, now).unwrap(), bob);
        assert_eq!(names.recovery_of(token), None);
        assert_eq!(names.recovery_request_of(token), None);
    }

    #[test]
    fn admin_calls_require_roles() {
        let mut names = open_registry();
        assert_matches!(names.set_fee(&at(alice(), JAN_1_2024), 1), Err(NameError::Access(_)));
        assert_matches!(names.pause(&at(alice(), JAN_1_2024)), Err(NameError::Access(_)));
        names.pause(&at(admin(), JAN_1_2024)).unwrap();
        assert_matches!(
            names.make_commit(&at(alice(), JAN_1_2024), Hash32::default()),
            Err(NameError::Paused)
        );
        names.unpause(&at(admin(), JAN_1_2024)).unwrap();
        names.set_fee(&at(admin(), JAN_1_2024), 5).unwrap();
        assert_eq!(names.fee(), 5);
    }

    #[test]
    fn reclaim_checks_every_action_before_moving() {
        let mut names = open_registry();
        let token = commit_and_register(&mut names, "alice", JAN_1_2024);
        let other = commit_and_register(&mut names, "bob", JAN_1_2024 + 1_000);
        let events = names.journal().len();
        let actions = [
            ReclaimAction {
                token,
                destination: Address::repeat_byte(4),
            },
            ReclaimAction {
                token: other,
                destination: Address::ZERO,
            },
        ];
        assert_matches!(
            names.reclaim(&at(admin(), JAN_1_2024 + 2_000), &actions),
            Err(NameError::InvalidAddress)
        );
        assert_eq!(names.owner_of(token, JAN_1_2024 + 2_000).unwrap(), alice());
        assert_eq!(names.journal().len(), events);
    }
}
