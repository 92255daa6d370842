use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::{Error, Result};

/// A non-negative amount of money in whole cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn from_cents(cents: i64) -> Result<Self> {
        if cents < 0 {
            return Err(Error::InvalidFormat {
                field: "amount",
                value: cents.to_string(),
            });
        }
        Ok(Self(cents))
    }

    /// Parse a decimal amount such as `8.50`, `8.5` or `8`.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || Error::InvalidFormat {
            field: "amount",
            value: raw.to_string(),
        };
        let trimmed = raw.trim();
        let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if whole.is_empty()
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || frac.len() > 2
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };
        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .map(Self)
            .ok_or_else(invalid)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtraction that returns `None` instead of going negative.
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).filter(|c| *c >= 0).map(Self)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Self;

    /// Saturates at zero.
    fn sub(self, rhs: Self) -> Self {
        Self((self.0 - rhs.0).max(0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_parse() {
        assert_eq!(Money::parse("8.50").unwrap().cents(), 850);
        assert_eq!(Money::parse("8.5").unwrap().cents(), 850);
        assert_eq!(Money::parse("8").unwrap().cents(), 800);
        assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
    }

    #[test]
    fn test_money_parse_rejects() {
        for bad in ["", "-1.00", "1.234", "abc", ".50", "1.x"] {
            assert!(Money::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::parse("5.00").unwrap().to_string(), "5.00");
        assert_eq!(Money::from_cents(1205).unwrap().to_string(), "12.05");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::parse("5.00").unwrap();
        let b = Money::parse("3.50").unwrap();
        assert_eq!((a + b).to_string(), "8.50");
        assert_eq!(a.checked_sub(b), Some(Money::from_cents(150).unwrap()));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(b - a, Money::ZERO);
    }

    #[test]
    fn test_money_rejects_negative_cents() {
        assert!(Money::from_cents(-1).is_err());
    }
}
