//! Name encoding
//!
//! A name is packed into 16 bytes, left-aligned and null padded. Allowed
//! bytes are `a-z`, `0-9` and `-`; the first byte may not be a hyphen and
//! once a null appears every later byte must also be null.

use crate::error::{NameError, NameResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest name in bytes
pub const MAX_NAME_LEN: usize = 16;

/// A validated, packed name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fname([u8; MAX_NAME_LEN]);

/// Numeric id of a name: its packed bytes read big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u128);

impl Fname {
    /// Validate packed bytes
    pub fn from_packed(bytes: [u8; MAX_NAME_LEN]) -> NameResult<Self> {
        if bytes[0] == 0 || bytes[0] == b'-' {
            return Err(NameError::InvalidName);
        }
        let mut terminated = false;
        for &byte in &bytes {
            if terminated {
                if byte != 0 {
                    return Err(NameError::InvalidName);
                }
            } else if byte == 0 {
                terminated = true;
            } else if !(byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-') {
                return Err(NameError::InvalidName);
            }
        }
        Ok(Self(bytes))
    }

    /// Validate and pack a string
    pub fn parse(name: &str) -> NameResult<Self> {
        let raw = name.as_bytes();
        if raw.is_empty() || raw.len() > MAX_NAME_LEN || raw.contains(&0) {
            return Err(NameError::InvalidName);
        }
        let mut bytes = [0u8; MAX_NAME_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Self::from_packed(bytes)
    }

    /// Packed bytes
    pub fn packed(&self) -> &[u8; MAX_NAME_LEN] {
        &self.0
    }

    /// Name without padding
    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(MAX_NAME_LEN);
        // validated bytes are ASCII
        std::str::from_utf8(&self.0[..len]).unwrap_or_default()
    }

    /// Token id of this name
    pub fn token_id(&self) -> TokenId {
        TokenId(u128::from_be_bytes(self.0))
    }
}

impl TokenId {
    /// Name this token id encodes, if it encodes a valid one
    pub fn name(&self) -> NameResult<Fname> {
        Fname::from_packed(self.0.to_be_bytes())
    }
}

impl fmt::Display for Fname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Fname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fname({})", self.as_str())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Ok(name) => write!(f, "{name}"),
            Err(_) => write!(f, "{:#034x}", self.0),
        }
    }
}

impl FromStr for Fname {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_charset() {
        for name in ["alice", "a", "bob-99", "0x", "sixteen-chars-xx"] {
            assert_eq!(Fname::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn rejects_bad_names() {
        for name in ["", "-alice", "Alice", "al ice", "a_b", "seventeen-chars-x", "é"] {
            assert!(Fname::parse(name).is_err(), "{name} accepted");
        }
    }

    #[test]
    fn bytes_after_terminator_must_be_null() {
        let mut bytes = [0u8; MAX_NAME_LEN];
        bytes[..3].copy_from_slice(b"abc");
        assert!(Fname::from_packed(bytes).is_ok());
        bytes[5] = b'x';
        assert!(Fname::from_packed(bytes).is_err());
    }

    #[test]
    fn token_id_round_trips_to_name() {
        let name = Fname::parse("farcaster").unwrap();
        assert_eq!(name.token_id().name().unwrap(), name);
        assert_eq!(name.token_id().to_string(), "farcaster");
        assert!(TokenId(1).name().is_err());
    }
}
