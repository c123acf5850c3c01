//! Storage rent accounting

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};
use crate::events::StorageEvent;
use idreg_core::math::checked_add;
use idreg_core::{
    AccessControl, Address, Block, CallContext, EventEnvelope, Fid, Journal, LedgerError,
    NativeTransfer, Role, Timestamp, Wei,
};
use idreg_oracle::{quote, PriceOracle, PriceUpdate};
use std::fmt;
use std::sync::Arc;

/// Rented capacity, pricing and collected funds.
#[derive(Clone)]
pub struct StorageRentLedger {
    oracle: PriceOracle,
    access: AccessControl,
    bank: Arc<dyn NativeTransfer>,
    rented_units: u64,
    max_units: u64,
    usd_unit_price: u128,
    deprecation_timestamp: Timestamp,
    vault: Address,
    balance: Wei,
    journal: Journal<StorageEvent>,
}

impl fmt::Debug for StorageRentLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageRentLedger")
            .field("oracle", &self.oracle)
            .field("rented_units", &self.rented_units)
            .field("max_units", &self.max_units)
            .field("usd_unit_price", &self.usd_unit_price)
            .field("deprecation_timestamp", &self.deprecation_timestamp)
            .field("vault", &self.vault)
            .field("balance", &self.balance)
            .finish_non_exhaustive()
    }
}

impl StorageRentLedger {
    /// Create a ledger at `genesis`; paid rent stops `deprecation_period` later.
    pub fn new(
        config: &StorageConfig,
        oracle: PriceOracle,
        access: AccessControl,
        bank: Arc<dyn NativeTransfer>,
        vault: Address,
        genesis: Block,
    ) -> StorageResult<Self> {
        if vault.is_zero() {
            return Err(StorageError::InvalidAddress);
        }
        let deprecation_timestamp = genesis
            .timestamp
            .checked_add(config.deprecation_period)
            .ok_or_else(|| LedgerError::overflow("deprecation_timestamp"))?;
        Ok(Self {
            oracle,
            access,
            bank,
            rented_units: 0,
            max_units: config.max_units,
            usd_unit_price: config.usd_unit_price,
            deprecation_timestamp,
            vault,
            balance: 0,
            journal: Journal::new(),
        })
    }

    // ---- paid rent -------------------------------------------------------

    /// Rent `units` for `fid`, returning the price charged.
    pub fn rent(&mut self, ctx: &CallContext, fid: Fid, units: u64) -> StorageResult<Wei> {
        self.ensure_active(ctx.now())?;
        if units == 0 {
            return Err(StorageError::InvalidAmount);
        }
        self.ensure_capacity(units)?;
        let price = self.charge(ctx, units)?;

        self.receive(ctx)?;
        self.allocate(ctx, fid, units)?;
        tracing::info!(payer = %ctx.caller, fid = %fid, units, price, "storage rented");
        self.refund(ctx, price)?;
        Ok(price)
    }

    /// Rent for several fids at once, priced on the total.
    ///
    /// Zero-unit entries are skipped.
    pub fn batch_rent(
        &mut self,
        ctx: &CallContext,
        fids: &[Fid],
        units: &[u64],
    ) -> StorageResult<Wei> {
        self.ensure_active(ctx.now())?;
        if fids.is_empty() || fids.len() != units.len() {
            return Err(StorageError::InvalidBatchInput);
        }
        let total = units.iter().try_fold(0u64, |acc, &n| {
            acc.checked_add(n)
                .ok_or_else(|| LedgerError::overflow("batch_rent"))
        })?;
        if total == 0 {
            return Err(StorageError::InvalidAmount);
        }
        self.ensure_capacity(total)?;
        let price = self.charge(ctx, total)?;

        self.receive(ctx)?;
        for (&fid, &n) in fids.iter().zip(units) {
            if n > 0 {
                self.allocate(ctx, fid, n)?;
            }
        }
        tracing::info!(payer = %ctx.caller, fids = fids.len(), units = total, price, "storage batch rented");
        self.refund(ctx, price)?;
        Ok(price)
    }

    // ---- operator credits ------------------------------------------------

    /// Allocate units to `fid` without payment
    pub fn credit(&mut self, ctx: &CallContext, fid: Fid, units: u64) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Operator)?;
        self.ensure_active(ctx.now())?;
        if units == 0 {
            return Err(StorageError::InvalidAmount);
        }
        self.ensure_capacity(units)?;
        self.allocate(ctx, fid, units)?;
        tracing::info!(operator = %ctx.caller, fid = %fid, units, "storage credited");
        Ok(())
    }

    /// Allocate the same number of units to each of `fids`
    pub fn batch_credit(&mut self, ctx: &CallContext, fids: &[Fid], units: u64) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Operator)?;
        self.ensure_active(ctx.now())?;
        if units == 0 {
            return Err(StorageError::InvalidAmount);
        }
        if fids.is_empty() {
            return Err(StorageError::InvalidBatchInput);
        }
        let count = u64::try_from(fids.len()).map_err(|_| LedgerError::overflow("batch_credit"))?;
        self.ensure_capacity(
            units
                .checked_mul(count)
                .ok_or_else(|| LedgerError::overflow("batch_credit"))?,
        )?;
        for &fid in fids {
            self.allocate(ctx, fid, units)?;
        }
        tracing::info!(operator = %ctx.caller, fids = fids.len(), units, "storage batch credited");
        Ok(())
    }

    /// Allocate `units` to every fid in `start..=end`
    pub fn continuous_credit(
        &mut self,
        ctx: &CallContext,
        start: Fid,
        end: Fid,
        units: u64,
    ) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Operator)?;
        self.ensure_active(ctx.now())?;
        if end < start {
            return Err(StorageError::InvalidRangeInput {
                start: start.value(),
                end: end.value(),
            });
        }
        if units == 0 {
            return Err(StorageError::InvalidAmount);
        }
        let count = (end.value() - start.value())
            .checked_add(1)
            .ok_or_else(|| LedgerError::overflow("continuous_credit"))?;
        self.ensure_capacity(
            units
                .checked_mul(count)
                .ok_or_else(|| LedgerError::overflow("continuous_credit"))?,
        )?;
        for fid in start.value()..=end.value() {
            self.allocate(ctx, Fid(fid), units)?;
        }
        tracing::info!(operator = %ctx.caller, start = %start, end = %end, units, "storage range credited");
        Ok(())
    }

    // ---- views -----------------------------------------------------------

    /// Wei price of one unit as seen in `block`
    pub fn unit_price(&self, block: Block) -> StorageResult<Wei> {
        self.price(block, 1)
    }

    /// Wei price of `units` as seen in `block`; never refreshes the oracle
    pub fn price(&self, block: Block, units: u64) -> StorageResult<Wei> {
        let eth_usd = self.oracle.cached_price(block);
        Ok(quote(units, self.usd_unit_price, eth_usd)?)
    }

    /// Units rented or credited so far
    pub fn rented_units(&self) -> u64 {
        self.rented_units
    }

    /// Capacity in units
    pub fn max_units(&self) -> u64 {
        self.max_units
    }

    /// Units still available
    pub fn available_units(&self) -> u64 {
        self.max_units.saturating_sub(self.rented_units)
    }

    /// USD price of one unit
    pub fn usd_unit_price(&self) -> u128 {
        self.usd_unit_price
    }

    /// When paid rent stops
    pub fn deprecation_timestamp(&self) -> Timestamp {
        self.deprecation_timestamp
    }

    /// Withdrawal destination
    pub fn vault(&self) -> Address {
        self.vault
    }

    /// Funds held
    pub fn balance(&self) -> Wei {
        self.balance
    }

    /// Price oracle
    pub fn oracle(&self) -> &PriceOracle {
        &self.oracle
    }

    /// Role table
    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Storage events
    pub fn journal(&self) -> &Journal<StorageEvent> {
        &self.journal
    }

    /// Hand off held oracle and storage events, in emission order
    pub fn drain_envelopes(&mut self) -> Result<Vec<EventEnvelope>, serde_json::Error> {
        let mut envelopes = self.oracle.drain_envelopes()?;
        envelopes.extend(self.journal.drain_envelopes()?);
        envelopes.sort_by_key(|envelope| envelope.emission);
        Ok(envelopes)
    }

    // ---- owner -----------------------------------------------------------

    /// Change the USD unit price
    pub fn set_usd_unit_price(&mut self, ctx: &CallContext, price: u128) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        let old = std::mem::replace(&mut self.usd_unit_price, price);
        self.journal.record(ctx.block, StorageEvent::SetPrice { old, new: price });
        tracing::info!(old, new = price, "storage unit price set");
        Ok(())
    }

    /// Change capacity
    pub fn set_max_units(&mut self, ctx: &CallContext, max_units: u64) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        let old = std::mem::replace(&mut self.max_units, max_units);
        self.journal
            .record(ctx.block, StorageEvent::SetMaxUnits { old, new: max_units });
        tracing::info!(old, new = max_units, "storage capacity set");
        Ok(())
    }

    /// Move the deprecation timestamp; it can never be set in the past
    pub fn set_deprecation_timestamp(
        &mut self,
        ctx: &CallContext,
        timestamp: Timestamp,
    ) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        if timestamp < ctx.now() {
            return Err(StorageError::InvalidDeprecationTimestamp {
                timestamp,
                now: ctx.now(),
            });
        }
        let old = std::mem::replace(&mut self.deprecation_timestamp, timestamp);
        self.journal.record(
            ctx.block,
            StorageEvent::SetDeprecationTimestamp {
                old,
                new: timestamp,
            },
        );
        Ok(())
    }

    /// Change the withdrawal destination
    pub fn set_vault(&mut self, ctx: &CallContext, vault: Address) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        if vault.is_zero() {
            return Err(StorageError::InvalidAddress);
        }
        let old = std::mem::replace(&mut self.vault, vault);
        self.journal
            .record(ctx.block, StorageEvent::SetVault { old, new: vault });
        Ok(())
    }

    /// Change how long a cached price stays fresh
    pub fn set_cache_duration(&mut self, ctx: &CallContext, seconds: u64) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        let old = self.oracle.set_cache_duration(seconds);
        self.oracle_parameter_set(ctx, "cache_duration", old.into(), seconds.into());
        Ok(())
    }

    /// Change the maximum feed answer age
    pub fn set_max_age(&mut self, ctx: &CallContext, seconds: u64) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        let old = self.oracle.set_max_age(seconds);
        self.oracle_parameter_set(ctx, "max_age", old.into(), seconds.into());
        Ok(())
    }

    /// Change the liveness grace period
    pub fn set_uptime_grace_period(&mut self, ctx: &CallContext, seconds: u64) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        let old = self.oracle.set_uptime_grace_period(seconds);
        self.oracle_parameter_set(ctx, "uptime_grace_period", old.into(), seconds.into());
        Ok(())
    }

    /// Change the lowest accepted feed answer
    pub fn set_min_answer(&mut self, ctx: &CallContext, min: u128) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        let old = self.oracle.set_min_answer(min)?;
        self.oracle_parameter_set(ctx, "min_answer", old, min);
        Ok(())
    }

    /// Change the highest accepted feed answer
    pub fn set_max_answer(&mut self, ctx: &CallContext, max: u128) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        let old = self.oracle.set_max_answer(max)?;
        self.oracle_parameter_set(ctx, "max_answer", old, max);
        Ok(())
    }

    /// Pin (or with 0, unpin) the ETH/USD price
    pub fn set_fixed_eth_usd_price(&mut self, ctx: &CallContext, price: u128) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        let old = self.oracle.set_fixed_price(price)?;
        self.oracle_parameter_set(ctx, "fixed_eth_usd_price", old, price);
        Ok(())
    }

    // ---- treasurer -------------------------------------------------------

    /// Force an oracle refresh
    pub fn refresh_price(&mut self, ctx: &CallContext) -> StorageResult<PriceUpdate> {
        self.access
            .require_any(&ctx.caller, &[Role::Owner, Role::Treasurer])?;
        Ok(self.oracle.refresh_price(ctx.block)?)
    }

    /// Send `amount` of the held funds to the vault
    pub fn withdraw(&mut self, ctx: &CallContext, amount: Wei) -> StorageResult<()> {
        self.access.require(&ctx.caller, Role::Treasurer)?;
        if amount > self.balance {
            return Err(StorageError::InsufficientFunds {
                requested: amount,
                balance: self.balance,
            });
        }
        self.balance -= amount;
        self.journal.record(
            ctx.block,
            StorageEvent::Withdraw {
                to: self.vault,
                amount,
            },
        );
        tracing::info!(vault = %self.vault, amount, "storage funds withdrawn");
        self.bank.send_value(self.vault, amount)?;
        Ok(())
    }

    // ---- internals -------------------------------------------------------

    fn receive(&mut self, ctx: &CallContext) -> StorageResult<()> {
        self.balance = checked_add(self.balance, ctx.value, "storage balance")?;
        Ok(())
    }

    fn ensure_active(&self, now: Timestamp) -> StorageResult<()> {
        if now >= self.deprecation_timestamp {
            return Err(StorageError::ContractDeprecated {
                deprecated_at: self.deprecation_timestamp,
            });
        }
        Ok(())
    }

    fn ensure_capacity(&self, units: u64) -> StorageResult<()> {
        let available = self.available_units();
        if units > available {
            tracing::debug!(requested = units, available, "storage capacity exceeded");
            return Err(StorageError::ExceedsCapacity {
                requested: units,
                available,
            });
        }
        Ok(())
    }

    /// Price `units` at the current oracle price and check the attached value
    fn charge(&mut self, ctx: &CallContext, units: u64) -> StorageResult<Wei> {
        let eth_usd = self.oracle.current_price(ctx.block)?;
        let price = quote(units, self.usd_unit_price, eth_usd)?;
        if ctx.value < price {
            return Err(StorageError::InvalidPayment {
                required: price,
                provided: ctx.value,
            });
        }
        Ok(price)
    }

    fn allocate(&mut self, ctx: &CallContext, fid: Fid, units: u64) -> StorageResult<()> {
        self.rented_units = self
            .rented_units
            .checked_add(units)
            .ok_or_else(|| LedgerError::overflow("rented_units"))?;
        self.journal.record(
            ctx.block,
            StorageEvent::Rent {
                payer: ctx.caller,
                fid,
                units,
            },
        );
        Ok(())
    }

    fn refund(&mut self, ctx: &CallContext, price: Wei) -> StorageResult<()> {
        let overpaid = ctx.value - price;
        if overpaid > 0 {
            self.balance -= overpaid;
            self.bank.send_value(ctx.caller, overpaid)?;
        }
        Ok(())
    }

    fn oracle_parameter_set(&mut self, ctx: &CallContext, parameter: &str, old: u128, new: u128) {
        tracing::info!(parameter, old, new, "oracle parameter set");
        self.journal.record(
            ctx.block,
            StorageEvent::SetOracleParameter {
                parameter: parameter.to_string(),
                old,
                new,
            },
        );
    }
}
