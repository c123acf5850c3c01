//! Name events

use crate::name::{Fname, TokenId};
use idreg_core::{Address, DomainEvent, Fid, Timestamp, Wei};
use serde::{Deserialize, Serialize};

/// Type identifier for name events
pub const NAME_EVENT_TYPE_ID: &str = "names";

/// Events emitted by the name registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameEvent {
    /// Ownership moved; `from` is zero on mint
    Transfer {
        /// Previous owner
        from: Address,
        /// New owner
        to: Address,
        /// Name token
        token: TokenId,
    },
    /// Lease extended
    Renew {
        /// Name token
        token: TokenId,
        /// New expiry
        expiry: Timestamp,
    },
    /// Trusted registration
    Invite {
        /// Inviting fid
        inviter: Fid,
        /// Invited fid
        invitee: Fid,
        /// Registered name
        name: Fname,
    },
    /// Recovery address replaced
    ChangeRecoveryAddress {
        /// Name token
        token: TokenId,
        /// New recovery address (zero when removed)
        recovery: Address,
    },
    /// Escrowed recovery started
    RequestRecovery {
        /// Current owner
        from: Address,
        /// Destination
        to: Address,
        /// Name token
        token: TokenId,
    },
    /// Pending recovery dropped
    CancelRecovery {
        /// Caller that cancelled
        by: Address,
        /// Name token
        token: TokenId,
    },
    /// Trusted-only phase ended
    DisableTrustedOnly,
    /// Yearly fee changed
    ChangeFee {
        /// New fee
        fee: Wei,
    },
    /// Funds sent to the vault
    Withdraw {
        /// Vault address
        to: Address,
        /// Amount sent
        amount: Wei,
    },
    /// Registry paused
    Paused {
        /// Admin that paused
        by: Address,
    },
    /// Registry unpaused
    Unpaused {
        /// Admin that unpaused
        by: Address,
    },
}

impl DomainEvent for NameEvent {
    fn type_id(&self) -> &'static str {
        NAME_EVENT_TYPE_ID
    }

    fn sub_type(&self) -> &'static str {
        match self {
            NameEvent::Transfer { .. } => "transfer",
            NameEvent::Renew { .. } => "renew",
            NameEvent::Invite { .. } => "invite",
            NameEvent::ChangeRecoveryAddress { .. } => "change-recovery-address",
            NameEvent::RequestRecovery { .. } => "request-recovery",
            NameEvent::CancelRecovery { .. } => "cancel-recovery",
            NameEvent::DisableTrustedOnly => "disable-trusted-only",
            NameEvent::ChangeFee { .. } => "change-fee",
            NameEvent::Withdraw { .. } => "withdraw",
            NameEvent::Paused { .. } => "paused",
            NameEvent::Unpaused { .. } => "unpaused",
        }
    }
}
