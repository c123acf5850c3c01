//! Storage events

use idreg_core::{Address, DomainEvent, Fid, Timestamp, Wei};
use serde::{Deserialize, Serialize};

/// Type identifier for storage events
pub const STORAGE_EVENT_TYPE_ID: &str = "storage";

/// Events emitted by the rent ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageEvent {
    /// Units allocated to an fid, paid or credited
    Rent {
        /// Caller that paid or credited
        payer: Address,
        /// Receiving fid
        fid: Fid,
        /// Units allocated
        units: u64,
    },
    /// USD unit price changed
    SetPrice {
        /// Previous price
        old: u128,
        /// New price
        new: u128,
    },
    /// Capacity changed
    SetMaxUnits {
        /// Previous capacity
        old: u64,
        /// New capacity
        new: u64,
    },
    /// Deprecation moved
    SetDeprecationTimestamp {
        /// Previous timestamp
        old: Timestamp,
        /// New timestamp
        new: Timestamp,
    },
    /// An oracle parameter changed
    SetOracleParameter {
        /// Parameter name
        parameter: String,
        /// Previous value
        old: u128,
        /// New value
        new: u128,
    },
    /// Vault changed
    SetVault {
        /// Previous vault
        old: Address,
        /// New vault
        new: Address,
    },
    /// Funds sent to the vault
    Withdraw {
        /// Vault address
        to: Address,
        /// Amount sent
        amount: Wei,
    },
}

impl DomainEvent for StorageEvent {
    fn type_id(&self) -> &'static str {
        STORAGE_EVENT_TYPE_ID
    }

    fn sub_type(&self) -> &'static str {
        match self {
            StorageEvent::Rent { .. } => "rent",
            StorageEvent::SetPrice { .. } => "set-price",
            StorageEvent::SetMaxUnits { .. } => "set-max-units",
            StorageEvent::SetDeprecationTimestamp { .. } => "set-deprecation-timestamp",
            StorageEvent::SetOracleParameter { .. } => "set-oracle-parameter",
            StorageEvent::SetVault { .. } => "set-vault",
            StorageEvent::Withdraw { .. } => "withdraw",
        }
    }
}
