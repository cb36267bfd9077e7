//! Positive two-decimal money amounts.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Serialize, Serializer};

/// Errors that can occur when building a [`Money`] amount.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum MoneyError {
    /// The input is NaN or infinite.
    #[error("amount must be a finite number")]
    NotFinite,
    /// The input is zero or negative.
    #[error("amount must be greater than zero, got {0}")]
    NotPositive(f64),
    /// The input does not fit in a decimal.
    #[error("amount {0} is out of range")]
    OutOfRange(f64),
}

/// A positive amount rounded to two decimal places.
///
/// Serializes as a string with exactly two decimals (`"1250.00"`), which is
/// the shape Shopify expects for custom line item prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    /// Build an amount from a calculator-supplied float.
    ///
    /// # Errors
    ///
    /// Returns an error for NaN, infinities, zero, negatives, or values a
    /// `Decimal` cannot hold.
    pub fn from_f64(value: f64) -> Result<Self, MoneyError> {
        if !value.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        if value <= 0.0 {
            return Err(MoneyError::NotPositive(value));
        }

        let mut amount = Decimal::from_f64(value)
            .ok_or(MoneyError::OutOfRange(value))?
            .round_dp(2);
        amount.rescale(2);

        // Sub-cent inputs round down to zero.
        if amount.is_zero() {
            return Err(MoneyError::NotPositive(value));
        }

        Ok(Self(amount))
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_number_gets_two_decimals() {
        assert_eq!(Money::from_f64(1250.0).unwrap().to_string(), "1250.00");
    }

    #[test]
    fn test_rounds_to_cents() {
        assert_eq!(Money::from_f64(19.999).unwrap().to_string(), "20.00");
        assert_eq!(Money::from_f64(0.1 + 0.2).unwrap().to_string(), "0.30");
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(Money::from_f64(-5.0), Err(MoneyError::NotPositive(-5.0)));
        assert_eq!(Money::from_f64(0.0), Err(MoneyError::NotPositive(0.0)));
        assert!(Money::from_f64(0.001).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(Money::from_f64(f64::NAN), Err(MoneyError::NotFinite));
        assert_eq!(Money::from_f64(f64::INFINITY), Err(MoneyError::NotFinite));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Money::from_f64(42.5).unwrap()).unwrap();
        assert_eq!(json, "\"42.50\"");
    }
}
