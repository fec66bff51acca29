//! Type-safe price representation using decimal arithmetic.
//!
//! Stripe reports totals in minor currency units (cents); Sanity stores
//! product prices in major units. [`Price`] keeps both paths exact by using
//! `rust_decimal` instead of floats.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: Currency,
}

impl Price {
    /// Create a new price from a major-unit amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a price from an amount in the smallest currency unit
    /// (e.g., cents for USD).
    #[must_use]
    pub fn from_minor_units(minor: i64, currency: Currency) -> Self {
        Self {
            amount: Decimal::new(minor, 2),
            currency,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl Currency {
    /// The display symbol for this currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }

    /// The uppercase ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Parse a currency code case-insensitively.
    ///
    /// Stripe reports currencies lowercase ("usd"); orders store them
    /// uppercase. Unknown codes fall back to `None`.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "USD" => Some(Self::USD),
            "EUR" => Some(Self::EUR),
            "GBP" => Some(Self::GBP),
            "CAD" => Some(Self::CAD),
            "AUD" => Some(Self::AUD),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_units() {
        let price = Price::from_minor_units(4000, Currency::USD);
        assert_eq!(price.amount, Decimal::new(40, 0));
        assert_eq!(price.to_string(), "$40.00");
    }

    #[test]
    fn test_from_minor_units_fractional() {
        let price = Price::from_minor_units(1999, Currency::USD);
        assert_eq!(price.amount, Decimal::new(1999, 2));
        assert_eq!(price.to_string(), "$19.99");
    }

    #[test]
    fn test_zero() {
        let price = Price::zero(Currency::EUR);
        assert_eq!(price.amount, Decimal::ZERO);
        assert_eq!(price.to_string(), "\u{20ac}0.00");
    }

    #[test]
    fn test_currency_parse_case_insensitive() {
        assert_eq!(Currency::parse("usd"), Some(Currency::USD));
        assert_eq!(Currency::parse("GBP"), Some(Currency::GBP));
        assert_eq!(Currency::parse("yen"), None);
    }

    #[test]
    fn test_currency_code_uppercase() {
        assert_eq!(Currency::parse("cad").map(Currency::code), Some("CAD"));
    }
}
