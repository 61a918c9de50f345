//! Amount normalization
//!
//! Monetary values reach the ledger in several shapes: the fixed-point
//! [`Money`] type, numeric strings from forms, JSON numbers, JSON nulls, or
//! nothing at all. [`to_number`] collapses all of them into a plain `f64`
//! with a caller-supplied fallback, and never fails.

use serde_json::Value;

use super::money::Money;

/// A value that may be interpreted as a monetary number
pub trait AmountLike {
    /// The numeric reading of this value, or `None` if it has none
    fn as_amount(&self) -> Option<f64>;
}

impl AmountLike for Money {
    fn as_amount(&self) -> Option<f64> {
        Some(self.to_f64())
    }
}

impl AmountLike for f64 {
    fn as_amount(&self) -> Option<f64> {
        self.is_finite().then_some(*self)
    }
}

impl AmountLike for i64 {
    fn as_amount(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl AmountLike for str {
    fn as_amount(&self) -> Option<f64> {
        let trimmed = self.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return None;
        }
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl AmountLike for String {
    fn as_amount(&self) -> Option<f64> {
        self.as_str().as_amount()
    }
}

impl AmountLike for Value {
    fn as_amount(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => s.as_amount(),
            _ => None,
        }
    }
}

impl<T: AmountLike> AmountLike for Option<T> {
    fn as_amount(&self) -> Option<f64> {
        self.as_ref().and_then(AmountLike::as_amount)
    }
}

impl<T: AmountLike + ?Sized> AmountLike for &T {
    fn as_amount(&self) -> Option<f64> {
        (**self).as_amount()
    }
}

/// Convert a loosely typed amount into a plain number
///
/// Absent values, nulls and anything that does not read as a finite number
/// produce `fallback`.
pub fn to_number<T: AmountLike + ?Sized>(value: Option<&T>, fallback: f64) -> f64 {
    value.and_then(|v| v.as_amount()).unwrap_or(fallback)
}

/// [`to_number`] rounded to the cent
pub fn to_money<T: AmountLike + ?Sized>(value: Option<&T>, fallback: Money) -> Money {
    match value.and_then(|v| v.as_amount()) {
        Some(number) => Money::from_f64(number),
        None => fallback,
    }
}
