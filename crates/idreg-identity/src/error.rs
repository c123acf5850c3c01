//! Identity and key errors

use crate::keys::KeyState;
use idreg_core::{AccessError, Address, Categorized, ErrorCategory, SignatureError, Timestamp};
use idreg_recovery::RecoveryError;
use serde::{Deserialize, Serialize};

/// Id registry failure causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum IdentityError {
    /// Address already holds an fid
    #[error("{address} already has an id")]
    HasId {
        /// Address that holds an fid
        address: Address,
    },
    /// Address holds no fid
    #[error("{address} has no id")]
    HasNoId {
        /// Address without an fid
        address: Address,
    },
    /// Caller is not the recovery address (or the owner, for cancellation)
    #[error("{caller} is not authorized")]
    Unauthorized {
        /// Rejected caller
        caller: Address,
    },
    /// No recovery request pending
    #[error("no recovery pending")]
    NoRecovery,
    /// Escrow period not over
    #[error("recovery escrowed until {ready_at}")]
    Escrow {
        /// First timestamp the request can complete
        ready_at: Timestamp,
    },
    /// Zero address where a real one is required
    #[error("address must be non-zero")]
    InvalidAddress,
    /// Registry is paused
    #[error("registry is paused")]
    Paused,
    /// A signed authorization failed
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// Caller lacks a role
    #[error(transparent)]
    Access(#[from] AccessError),
    /// The fid counter is exhausted
    #[error("id counter exhausted")]
    CounterExhausted,
}

impl From<RecoveryError> for IdentityError {
    fn from(err: RecoveryError) -> Self {
        match err {
            RecoveryError::Unauthorized { caller } => IdentityError::Unauthorized { caller },
            RecoveryError::NoRecovery => IdentityError::NoRecovery,
            RecoveryError::Escrow { ready_at } => IdentityError::Escrow { ready_at },
            RecoveryError::InvalidDestination => IdentityError::InvalidAddress,
        }
    }
}

/// Id registry result type
pub type IdentityResult<T> = Result<T, IdentityError>;

impl Categorized for IdentityError {
    fn category(&self) -> ErrorCategory {
        match self {
            IdentityError::Unauthorized { .. } => ErrorCategory::Authorization,
            IdentityError::HasId { .. }
            | IdentityError::HasNoId { .. }
            | IdentityError::NoRecovery
            | IdentityError::Paused => ErrorCategory::StatePrecondition,
            IdentityError::Escrow { .. } => ErrorCategory::Timing,
            IdentityError::InvalidAddress => ErrorCategory::InvalidInput,
            IdentityError::Signature(err) => err.category(),
            IdentityError::Access(err) => err.category(),
            IdentityError::CounterExhausted => ErrorCategory::Internal,
        }
    }
}

/// Key registry failure causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum KeyError {
    /// Caller holds no fid
    #[error("{address} has no id")]
    HasNoId {
        /// Caller address
        address: Address,
    },
    /// No validator for the key and metadata type pair
    #[error("no validator for key type {key_type}, metadata type {metadata_type}")]
    ValidatorNotFound {
        /// Key type
        key_type: u32,
        /// Metadata type
        metadata_type: u8,
    },
    /// Validator rejected the metadata
    #[error("invalid key metadata")]
    InvalidMetadata,
    /// Key is in the wrong lifecycle state
    #[error("key is {actual:?}, expected {expected:?}")]
    InvalidState {
        /// Required state
        expected: KeyState,
        /// Current state
        actual: KeyState,
    },
    /// Fid already holds the maximum number of keys
    #[error("fid already holds the maximum of {max} keys")]
    ExceedsMaximum {
        /// Configured limit
        max: u32,
    },
    /// Key limit can only grow
    #[error("max keys per fid can only increase (current {current}, requested {requested})")]
    InvalidMaxKeys {
        /// Current limit
        current: u32,
        /// Rejected limit
        requested: u32,
    },
    /// Caller lacks a role
    #[error(transparent)]
    Access(#[from] AccessError),
}

/// Key registry result type
pub type KeyResult<T> = Result<T, KeyError>;

impl Categorized for KeyError {
    fn category(&self) -> ErrorCategory {
        match self {
            KeyError::HasNoId { .. }
            | KeyError::InvalidState { .. }
            | KeyError::ExceedsMaximum { .. } => ErrorCategory::StatePrecondition,
            KeyError::ValidatorNotFound { .. }
            | KeyError::InvalidMetadata
            | KeyError::InvalidMaxKeys { .. } => ErrorCategory::InvalidInput,
            KeyError::Access(err) => err.category(),
        }
    }
}
