//! Account address type, rendered as `0x`-prefixed hex.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// An X1Coin account address.
///
/// The all-zero address is the null/burn address: it can never receive a
/// transfer and is never a caller.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null address.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// The standard textual prefix.
    pub const PREFIX: &'static str = "0x";

    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address whose trailing eight bytes hold `n` (big-endian).
    ///
    /// Handy for deterministic fixtures; `from_low_u64(0)` is the null address.
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 8..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

/// Failure to parse an [`Address`] from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("address must be {expected} hex characters, got {actual}")]
    BadLength { expected: usize, actual: usize },

    #[error("invalid hex in address: {0}")]
    InvalidHex(String),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(Self::PREFIX)
            .ok_or(AddressParseError::MissingPrefix)?;
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(AddressParseError::BadLength {
                expected: ADDRESS_LEN * 2,
                actual: digits.len(),
            });
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{}..)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, hex::encode(self.0))
    }
}

/// Serialized as its `0x` text form so config files and JSON stay readable.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_address_is_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(Address::from_low_u64(0).is_zero());
        assert!(!Address::from_low_u64(1).is_zero());
    }

    #[test]
    fn display_and_parse_agree() {
        let addr = Address::from_low_u64(0xdead_beef);
        let text = addr.to_string();
        assert_eq!(text, "0x00000000000000000000000000000000deadbeef");
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        let err = "00000000000000000000000000000000deadbeef"
            .parse::<Address>()
            .unwrap_err();
        assert_eq!(err, AddressParseError::MissingPrefix);
    }

    #[test]
    fn parse_rejects_short_input() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            AddressParseError::BadLength {
                expected: 40,
                actual: 4
            }
        );
    }

    #[test]
    fn parse_rejects_non_hex() {
        let err = "0xzz000000000000000000000000000000deadbeef"
            .parse::<Address>()
            .unwrap_err();
        assert!(matches!(err, AddressParseError::InvalidHex(_)));
    }
}
