//! Typed messages signed for registry calls

use idreg_core::crypto::typed_data::{encode_address, encode_fid, encode_u64};
use idreg_core::{Address, Fid, Timestamp, TypedMessage};

/// Consent of `to` to receive a newly registered fid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    /// Custody address of the new fid
    pub to: Address,
    /// Initial recovery address
    pub recovery: Address,
    /// Signer nonce
    pub nonce: u64,
    /// Signature deadline
    pub deadline: Timestamp,
}

impl TypedMessage for Register {
    fn type_string(&self) -> &'static str {
        "Register(address to,address recovery,uint256 nonce,uint256 deadline)"
    }

    fn encode_fields(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&encode_address(&self.to));
        out.extend_from_slice(&encode_address(&self.recovery));
        out.extend_from_slice(&encode_u64(self.nonce));
        out.extend_from_slice(&encode_u64(self.deadline));
    }
}

/// Consent to move `fid` to `to`, signed by the recipient (and by the sender
/// in the relayed variant)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// Fid being moved
    pub fid: Fid,
    /// Destination custody address
    pub to: Address,
    /// Signer nonce
    pub nonce: u64,
    /// Signature deadline
    pub deadline: Timestamp,
}

impl TypedMessage for Transfer {
    fn type_string(&self) -> &'static str {
        "Transfer(uint256 fid,address to,uint256 nonce,uint256 deadline)"
    }

    fn encode_fields(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&encode_fid(self.fid));
        out.extend_from_slice(&encode_address(&self.to));
        out.extend_from_slice(&encode_u64(self.nonce));
        out.extend_from_slice(&encode_u64(self.deadline));
    }
}

/// Consent to receive `fid` with a new recovery address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferAndChangeRecovery {
    /// Fid being moved
    pub fid: Fid,
    /// Destination custody address
    pub to: Address,
    /// Recovery address after the move
    pub recovery: Address,
    /// Signer nonce
    pub nonce: u64,
    /// Signature deadline
    pub deadline: Timestamp,
}

impl TypedMessage for TransferAndChangeRecovery {
    fn type_string(&self) -> &'static str {
        "TransferAndChangeRecovery(uint256 fid,address to,address recovery,uint256 nonce,uint256 deadline)"
    }

    fn encode_fields(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&encode_fid(self.fid));
        out.extend_from_slice(&encode_address(&self.to));
        out.extend_from_slice(&encode_address(&self.recovery));
        out.extend_from_slice(&encode_u64(self.nonce));
        out.extend_from_slice(&encode_u64(self.deadline));
    }
}

/// Owner consent to replace the recovery address `from` with `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRecoveryAddress {
    /// Fid whose recovery changes
    pub fid: Fid,
    /// Current recovery address
    pub from: Address,
    /// New recovery address
    pub to: Address,
    /// Signer nonce
    pub nonce: u64,
    /// Signature deadline
    pub deadline: Timestamp,
}

impl TypedMessage for ChangeRecoveryAddress {
    fn type_string(&self) -> &'static str {
        "ChangeRecoveryAddress(uint256 fid,address from,address to,uint256 nonce,uint256 deadline)"
    }

    fn encode_fields(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&encode_fid(self.fid));
        out.extend_from_slice(&encode_address(&self.from));
        out.extend_from_slice(&encode_address(&self.to));
        out.extend_from_slice(&encode_u64(self.nonce));
        out.extend_from_slice(&encode_u64(self.deadline));
    }
}

/// Recovery address consent to move `fid` to `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recover {
    /// Fid being recovered
    pub fid: Fid,
    /// Destination custody address
    pub to: Address,
    /// Signer nonce
    pub nonce: u64,
    /// Signature deadline
    pub deadline: Timestamp,
}

impl TypedMessage for Recover {
    fn type_string(&self) -> &'static str {
        "Recover(uint256 fid,address to,uint256 nonce,uint256 deadline)"
    }

    fn encode_fields(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&encode_fid(self.fid));
        out.extend_from_slice(&encode_address(&self.to));
        out.extend_from_slice(&encode_u64(self.nonce));
        out.extend_from_slice(&encode_u64(self.deadline));
    }
}
