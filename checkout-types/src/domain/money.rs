//! Currency and two-decimal amounts.
//!
//! Amounts travel as JSON numbers and are persisted as `i64` minor units
//! (poisha / cents). Percentages use the same two-decimal scale.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Number of decimal places kept for stored amounts.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Currencies a gateway or transaction may be denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    BDT,
    USD,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::str::FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BDT" => Ok(Currency::BDT),
            "USD" => Ok(Currency::USD),
            other => Err(DomainError::ValidationError(format!(
                "Unsupported currency: {}",
                other
            ))),
        }
    }
}

/// A non-negative decimal with at most two fractional digits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
#[schema(value_type = f64)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Validates and wraps a decimal value.
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::NegativeAmount);
        }
        let value = value.normalize();
        if value.scale() > MINOR_UNIT_SCALE {
            return Err(DomainError::TooPrecise(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Builds an amount from whole units, e.g. `Amount::whole(2200)`.
    pub fn whole(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// Rebuilds an amount from its stored minor-unit representation.
    pub fn from_minor_units(units: i64) -> Result<Self, DomainError> {
        Self::new(Decimal::new(units, MINOR_UNIT_SCALE))
    }

    /// Returns the value in minor units for storage.
    pub fn to_minor_units(&self) -> Result<i64, DomainError> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|units| units.to_i64())
            .ok_or_else(|| DomainError::ValidationError(format!("Amount out of range: {}", self.0)))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::str::FromStr for Amount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str_exact(s.trim())
            .map_err(|_| DomainError::ValidationError(format!("Invalid amount: {}", s)))?;
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_amount_parses_from_text() {
        assert_eq!(Amount::from_str("2200").unwrap(), Amount::whole(2200));
        assert!(Amount::from_str("-5").is_err());
        assert!(Amount::from_str("1.005").is_err());
        assert!(Amount::from_str("abc").is_err());
    }

    #[test]
    fn test_amount_round_trips_through_minor_units() {
        let amount = Amount::new(Decimal::from_str("2200.50").unwrap()).unwrap();
        assert_eq!(amount.to_minor_units().unwrap(), 220050);
        assert_eq!(Amount::from_minor_units(220050).unwrap(), amount);
    }

    #[test]
    fn test_huge_amount_is_out_of_range() {
        let amount = Amount::from_str("70000000000000000000000000000").unwrap();
        assert!(matches!(
            amount.to_minor_units(),
            Err(DomainError::ValidationError(_))
        ));

        let above_i64 = Amount::from_str("100000000000000000").unwrap();
        assert!(above_i64.to_minor_units().is_err());
    }

    #[test]
    fn test_negative_amount_fails() {
        let result = Amount::new(Decimal::from(-5));
        assert!(matches!(result, Err(DomainError::NegativeAmount)));
    }

    #[test]
    fn test_three_decimal_places_fail() {
        let result = Amount::new(Decimal::from_str("1.005").unwrap());
        assert!(matches!(result, Err(DomainError::TooPrecise(_))));
    }

    #[test]
    fn test_trailing_zeros_are_not_precision() {
        let amount = Amount::new(Decimal::from_str("1.8500").unwrap()).unwrap();
        assert_eq!(amount.to_minor_units().unwrap(), 185);
    }

    #[test]
    fn test_amount_deserializes_from_json_number() {
        let amount: Amount = serde_json::from_str("2200").unwrap();
        assert_eq!(amount, Amount::whole(2200));

        let bad: Result<Amount, _> = serde_json::from_str("-1");
        assert!(bad.is_err());
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::whole(15).to_string(), "15.00");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("bdt".parse::<Currency>().unwrap(), Currency::BDT);
        assert!("XYZ".parse::<Currency>().is_err());
    }
}
