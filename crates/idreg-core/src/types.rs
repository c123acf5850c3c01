//! Core identifier and value types used across the registries

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Native currency amount in wei (18 decimals).
pub type Wei = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// 20-byte account address.
///
/// The all-zero address is the null address: it never owns an fid or a name
/// and is never a valid recovery address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The null address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create from raw bytes
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Whether this is the null address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Address with every byte set to `byte`, handy for fixtures
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

/// Numeric account identifier issued by the identity registry.
///
/// Fids start at 1 and increase by one per registration; 0 is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fid(pub u64);

impl Fid {
    /// Get the inner value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id following this one
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Fid {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Block the current call executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    /// Block height
    pub number: u64,
    /// Block timestamp (seconds)
    pub timestamp: Timestamp,
}

impl Block {
    /// Create a block reference
    pub fn new(number: u64, timestamp: Timestamp) -> Self {
        Self { number, timestamp }
    }
}

/// Execution context of one top-level call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Address that issued the call
    pub caller: Address,
    /// Native value attached to the call
    pub value: Wei,
    /// Block the call executes in
    pub block: Block,
}

impl CallContext {
    /// Context without attached value
    pub fn new(caller: Address, block: Block) -> Self {
        Self {
            caller,
            value: 0,
            block,
        }
    }

    /// Attach native value
    pub fn with_value(mut self, value: Wei) -> Self {
        self.value = value;
        self
    }

    /// Block timestamp
    pub fn now(&self) -> Timestamp {
        self.block.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_hex_round_trip() {
        let address = Address::repeat_byte(0xab);
        let rendered = address.to_string();
        assert!(rendered.starts_with("0xabab"));
        assert_eq!(rendered.parse::<Address>().unwrap(), address);
    }

    #[test]
    fn address_parse_rejects_short_input() {
        assert!("0x1234".parse::<Address>().is_err());
    }

    #[test]
    fn zero_address_is_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::repeat_byte(1).is_zero());
    }

    #[test]
    fn fid_next_stops_at_max() {
        assert_eq!(Fid(1).next(), Some(Fid(2)));
        assert_eq!(Fid(u64::MAX).next(), None);
    }
}
