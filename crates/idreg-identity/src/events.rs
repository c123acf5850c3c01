//! Identity and key events
//!
//! Replaying [`IdentityEvent`]s in order reconstructs custody of every fid.

use idreg_core::{Address, DomainEvent, Fid};
use serde::{Deserialize, Serialize};

/// Type identifier for id registry events
pub const IDENTITY_EVENT_TYPE_ID: &str = "identity";

/// Type identifier for key registry events
pub const KEY_EVENT_TYPE_ID: &str = "keys";

/// Events emitted by the id registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityEvent {
    /// A new fid was issued
    Register {
        /// Custody address
        to: Address,
        /// Issued fid
        fid: Fid,
        /// Initial recovery address (zero for none)
        recovery: Address,
    },
    /// Custody moved by the owner
    Transfer {
        /// Previous custody
        from: Address,
        /// New custody
        to: Address,
        /// Moved fid
        fid: Fid,
    },
    /// Recovery address replaced
    ChangeRecoveryAddress {
        /// Affected fid
        fid: Fid,
        /// New recovery address (zero for none)
        recovery: Address,
    },
    /// Custody moved by the recovery address
    Recover {
        /// Previous custody
        from: Address,
        /// New custody
        to: Address,
        /// Moved fid
        fid: Fid,
    },
    /// Escrowed recovery started
    RequestRecovery {
        /// Current custody
        from: Address,
        /// Requested destination
        to: Address,
        /// Affected fid
        fid: Fid,
    },
    /// Escrowed recovery cancelled
    CancelRecovery {
        /// Caller that cancelled
        by: Address,
        /// Affected fid
        fid: Fid,
    },
    /// Registry paused
    Paused {
        /// Caller
        by: Address,
    },
    /// Registry unpaused
    Unpaused {
        /// Caller
        by: Address,
    },
}

impl DomainEvent for IdentityEvent {
    fn type_id(&self) -> &'static str {
        IDENTITY_EVENT_TYPE_ID
    }

    fn sub_type(&self) -> &'static str {
        match self {
            IdentityEvent::Register { .. } => "register",
            IdentityEvent::Transfer { .. } => "transfer",
            IdentityEvent::ChangeRecoveryAddress { .. } => "change-recovery-address",
            IdentityEvent::Recover { .. } => "recover",
            IdentityEvent::RequestRecovery { .. } => "request-recovery",
            IdentityEvent::CancelRecovery { .. } => "cancel-recovery",
            IdentityEvent::Paused { .. } => "paused",
            IdentityEvent::Unpaused { .. } => "unpaused",
        }
    }
}

/// Events emitted by the key registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    /// Key bound to an fid
    Add {
        /// Owning fid
        fid: Fid,
        /// Key type
        key_type: u32,
        /// Key bytes
        key: Vec<u8>,
        /// Metadata type
        metadata_type: u8,
        /// Metadata bytes
        metadata: Vec<u8>,
    },
    /// Key retired
    Remove {
        /// Owning fid
        fid: Fid,
        /// Key bytes
        key: Vec<u8>,
    },
    /// Validator installed or removed
    SetValidator {
        /// Key type
        key_type: u32,
        /// Metadata type
        metadata_type: u8,
        /// Whether a validator is now installed
        installed: bool,
    },
    /// Key limit raised
    SetMaxKeysPerFid {
        /// Previous limit
        old: u32,
        /// New limit
        new: u32,
    },
}

impl DomainEvent for KeyEvent {
    fn type_id(&self) -> &'static str {
        KEY_EVENT_TYPE_ID
    }

    fn sub_type(&self) -> &'static str {
        match self {
            KeyEvent::Add { .. } => "add",
            KeyEvent::Remove { .. } => "remove",
            KeyEvent::SetValidator { .. } => "set-validator",
            KeyEvent::SetMaxKeysPerFid { .. } => "set-max-keys-per-fid",
        }
    }
}
