//! Amount type for monetary values with fixed two-decimal precision.
//!
//! This module provides the `Amount` type which wraps `Decimal` and keeps every
//! value normalized to currency precision (two decimal places). All money math
//! in the crate goes through this type; floating point is only touched at the
//! display edge.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Represents a monetary value.
///
/// The wrapped `Decimal` is always held at a scale of two decimal places;
/// construction rounds midpoints away from zero. Equality and ordering are
/// therefore plain value comparisons.
///
/// # Examples
///
/// ```
/// # use splitbill::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,250.00").unwrap();
/// assert_eq!(amount.to_string(), "1250.00");
/// assert_eq!(amount.minor_units(), 125000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero, at currency precision.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount, rounding to two decimal places (midpoint away
    /// from zero). This is the single place where computed raw values, e.g.
    /// `amount * percent / 100`, get snapped to currency precision.
    pub fn new(value: Decimal) -> Self {
        Self(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Creates an Amount from integer minor units (cents).
    pub fn from_minor_units(units: i64) -> Self {
        Self(Decimal::new(units, 2))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the value in integer minor units (cents).
    pub fn minor_units(&self) -> i64 {
        (self.0 * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or_default()
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Formats the value with thousands separators for human-facing output,
    /// e.g. `-1,250.00`. The canonical (storage and serde) form has no commas.
    pub fn display_pretty(&self) -> String {
        format_num::format_num!(",.2", self.0.to_f64().unwrap_or_default())
    }
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, thiserror::Error)]
#[error("invalid amount: {0}")]
pub struct AmountError(#[source] rust_decimal::Error);

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // Accept a currency sign after an optional minus, e.g. "-$50.00".
        let without_sign = if let Some(after_minus) = trimmed.strip_prefix('-') {
            if let Some(after_symbol) = after_minus.strip_prefix('$') {
                format!("-{after_symbol}")
            } else {
                trimmed.to_string()
            }
        } else if let Some(after_symbol) = trimmed.strip_prefix('$') {
            after_symbol.to_string()
        } else {
            trimmed.to_string()
        };

        // Remove commas (thousands separators)
        let without_commas = without_sign.replace(',', "");

        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount::new(value))
    }
}

impl Display for Amount {
    /// Canonical form: no commas, no currency sign, always two decimals.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let normalized = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{:.2}", normalized)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("50.00").unwrap());
    }

    #[test]
    fn test_parse_with_currency_sign() {
        let amount = Amount::from_str("$50.00").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("50.00").unwrap());
    }

    #[test]
    fn test_parse_negative_with_currency_sign() {
        let amount = Amount::from_str("-$50.00").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("-50.00").unwrap());
    }

    #[test]
    fn test_parse_with_commas() {
        let amount = Amount::from_str("1,234,567.89").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1234567.89").unwrap());
    }

    #[test]
    fn test_parse_empty_string() {
        let amount = Amount::from_str("").unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_parse_whitespace() {
        let amount = Amount::from_str("  $50.00  ").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("50.00").unwrap());
    }

    #[test]
    fn test_parse_rounds_to_two_decimals() {
        let amount = Amount::from_str("3.333").unwrap();
        assert_eq!(amount, Amount::from_minor_units(333));

        let up = Amount::from_str("3.335").unwrap();
        assert_eq!(up, Amount::from_minor_units(334));
    }

    #[test]
    fn test_display_canonical() {
        assert_eq!(Amount::from_minor_units(5000).to_string(), "50.00");
        assert_eq!(Amount::from_minor_units(-5000).to_string(), "-50.00");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
        assert_eq!(Amount::from_minor_units(123456789).to_string(), "1234567.89");
    }

    #[test]
    fn test_display_pretty() {
        assert_eq!(Amount::from_minor_units(123450).display_pretty(), "1,234.50");
        assert_eq!(Amount::from_minor_units(-600000).display_pretty(), "-6,000.00");
    }

    #[test]
    fn test_minor_units_round_trip() {
        let amount = Amount::from_minor_units(1234);
        assert_eq!(amount.minor_units(), 1234);
        assert_eq!(Amount::from_str("12.34").unwrap().minor_units(), 1234);
    }

    #[test]
    fn test_serialize() {
        let amount = Amount::from_minor_units(5000);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"50.00\"");
    }

    #[test]
    fn test_deserialize() {
        let amount: Amount = serde_json::from_str("\"50.00\"").unwrap();
        assert_eq!(amount, Amount::from_minor_units(5000));

        let with_sign: Amount = serde_json::from_str("\"-$1,000.00\"").unwrap();
        assert_eq!(with_sign, Amount::from_minor_units(-100000));
    }

    #[test]
    fn test_arithmetic() {
        let a = Amount::from_minor_units(1050);
        let b = Amount::from_minor_units(450);
        assert_eq!(a + b, Amount::from_minor_units(1500));
        assert_eq!(a - b, Amount::from_minor_units(600));
        assert_eq!(-a, Amount::from_minor_units(-1050));

        let mut c = a;
        c += b;
        c -= Amount::from_minor_units(500);
        assert_eq!(c, Amount::from_minor_units(1000));
    }

    #[test]
    fn test_sum() {
        let total: Amount = [100, 250, 650]
            .into_iter()
            .map(Amount::from_minor_units)
            .sum();
        assert_eq!(total, Amount::from_minor_units(1000));
    }

    #[test]
    fn test_ordering() {
        assert!(Amount::from_minor_units(3000) < Amount::from_minor_units(5000));
    }

    #[test]
    fn test_zero_is_not_positive_or_negative() {
        assert!(Amount::ZERO.is_zero());
        assert!(!Amount::ZERO.is_positive());
        assert!(!Amount::ZERO.is_negative());
    }

    #[test]
    fn test_sign_helpers() {
        assert!(Amount::from_minor_units(1).is_positive());
        assert!(Amount::from_minor_units(-1).is_negative());
        assert!(!Amount::from_minor_units(-1).is_positive());
    }
}
