//! Token amount type for X1C.
//!
//! Amounts are represented as fixed-point integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 base unit; one whole X1C is 10^18 base units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// An X1C amount in base units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    /// Number of fractional decimal digits.
    pub const DECIMALS: u8 = 18;

    /// Base units per whole token (10^18).
    pub const UNIT: u128 = 1_000_000_000_000_000_000;

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole tokens to base units.
    ///
    /// # Panics
    /// Panics on overflow; only meant for constants and fixtures.
    pub const fn from_tokens(whole: u128) -> Self {
        Self(whole * Self::UNIT)
    }

    /// Whole tokens, truncating the fractional part.
    pub fn to_tokens(&self) -> u128 {
        self.0 / Self::UNIT
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for TokenAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TokenAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl From<u128> for TokenAmount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} X1C", self.0)
    }
}
