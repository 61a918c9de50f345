//! Money type for representing currency amounts
//!
//! Amounts are fixed-point values stored as integer cents. Ledger arithmetic
//! (balance increments, labor shrinking) stays in cents; comparisons against
//! loosely typed input go through [`Money::to_f64`] and the amount normalizer.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use super::amount::AmountLike;

/// A monetary amount stored as cents (hundredths of the currency unit)
///
/// Serialized as a decimal number of currency units (`10.5`); deserialized
/// from a number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use expense_ledger::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// assert_eq!(amount.to_f64(), 10.5);
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole units
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Largest magnitude a single ledger amount may have (one trillion units)
    pub const LIMIT: Money = Money::from_units(1_000_000_000_000);

    /// Convert a plain floating value, rounding half away from zero to the cent
    ///
    /// Non-finite input yields zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::zero();
        }
        Self((value * 100.0).round() as i64)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole units portion (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Decimal-to-number conversion
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Whether the magnitude is at most [`Money::LIMIT`]
    pub const fn is_within_limit(&self) -> bool {
        self.0.unsigned_abs() <= Self::LIMIT.0 as u64
    }

    /// Addition that reports overflow instead of wrapping
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyOverflow> {
        self.0.checked_add(other.0).map(Self).ok_or(MoneyOverflow)
    }

    /// Clamp negative amounts to zero
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Self(0)
        } else {
            *self
        }
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "$10.50", "1,250.00", "10"
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();

        let (negative, s) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, s),
        };

        let s = s.strip_prefix('$').unwrap_or(s);
        let cleaned: String = s.chars().filter(|c| *c != ',').collect();

        let cents = if let Some((whole, frac)) = cleaned.split_once('.') {
            let units: i64 = if whole.is_empty() {
                0
            } else {
                whole
                    .parse()
                    .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?
            };

            if !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(MoneyParseError::InvalidFormat(s.to_string()));
            }

            // Pad or truncate to 2 digits
            let cents: i64 = match frac.len() {
                0 => 0,
                1 => frac.parse::<i64>().unwrap_or(0) * 10,
                _ => frac[..2].parse().unwrap_or(0),
            };

            units
                .checked_mul(100)
                .and_then(|c| c.checked_add(cents))
                .ok_or_else(|| MoneyParseError::InvalidFormat(s.to_string()))?
        } else {
            cleaned
                .parse::<i64>()
                .ok()
                .and_then(|units| units.checked_mul(100))
                .ok_or_else(|| MoneyParseError::InvalidFormat(s.to_string()))?
        };

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        value
            .as_amount()
            .map(Money::from_f64)
            .ok_or_else(|| de::Error::custom(format!("invalid amount: {}", value)))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "{}.{:02}", self.units(), self.cents_part())
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

/// A running total left the range of `i64` cents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoneyOverflow;

impl fmt::Display for MoneyOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "amount out of range")
    }
}

impl std::error::Error for MoneyOverflow {}
