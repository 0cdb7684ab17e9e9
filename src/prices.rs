//! Prices

use std::ops::Deref;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// Errors raised while converting external amounts into prices.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// Prices can never be negative.
    #[error("price {0} is negative")]
    Negative(Decimal),

    /// The amount does not fit into minor units.
    #[error("price {0} is out of range")]
    OutOfRange(Decimal),

    /// The price string is not in the `AMOUNT CURRENCY` form.
    #[error("invalid price format: {0}")]
    InvalidFormat(String),

    /// The currency code is not one the storefront trades in.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Represents a non-negative price in the minor units of its currency (paisa, pence, cents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    value: u64,
}

impl Price {
    /// A zero price.
    pub const ZERO: Price = Price { value: 0 };

    /// Creates a new price from minor units.
    #[must_use]
    pub const fn from_minor(value: u64) -> Self {
        Price { value }
    }

    /// Converts a decimal amount in major units (e.g. `150.50`) into a price.
    ///
    /// Amounts with more precision than the currency supports are rounded
    /// to the nearest minor unit.
    ///
    /// # Errors
    ///
    /// - [`PriceError::Negative`]: the amount is below zero.
    /// - [`PriceError::OutOfRange`]: the amount does not fit in minor units.
    pub fn from_decimal(amount: Decimal, currency: &Currency) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }

        let value = amount
            .checked_mul(minor_scale(currency))
            .map(|scaled| scaled.round_dp(0))
            .and_then(|scaled| scaled.to_u64())
            .ok_or(PriceError::OutOfRange(amount))?;

        Ok(Price { value })
    }

    /// Converts the price back into a decimal amount in major units.
    #[must_use]
    pub fn to_decimal(self, currency: &Currency) -> Decimal {
        Decimal::from(self.value) / minor_scale(currency)
    }

    /// Returns the price as money in the given currency.
    #[must_use]
    pub fn to_money(self, currency: &'static Currency) -> Money<'static, Currency> {
        Money::from_minor(i64::try_from(self.value).unwrap_or(i64::MAX), currency)
    }

    /// Price of `quantity` units, saturating at the maximum representable price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Price {
        Price {
            value: self.value.saturating_mul(u64::from(quantity)),
        }
    }

    /// Sum of two prices, saturating at the maximum representable price.
    #[must_use]
    pub fn saturating_add(self, other: Price) -> Price {
        Price {
            value: self.value.saturating_add(other.value),
        }
    }
}

impl Deref for Price {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

/// Looks up one of the supported currencies by ISO code.
///
/// # Errors
///
/// Returns [`PriceError::UnknownCurrency`] for codes outside the supported set.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, PriceError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "NPR" => Ok(iso::NPR),
        "INR" => Ok(iso::INR),
        "USD" => Ok(iso::USD),
        "GBP" => Ok(iso::GBP),
        "EUR" => Ok(iso::EUR),
        other => Err(PriceError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a price string (e.g. `"150 NPR"`) into a price and its currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format `AMOUNT CURRENCY`,
/// the amount is not a valid non-negative decimal, or the currency is unknown.
pub fn parse_price(s: &str) -> Result<(Price, &'static Currency), PriceError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PriceError::InvalidFormat(s.to_string()));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| PriceError::InvalidFormat(s.to_string()))?;

    let currency = currency_from_code(code)?;

    Ok((Price::from_decimal(amount, currency)?, currency))
}

fn minor_scale(currency: &Currency) -> Decimal {
    Decimal::from(10_u64.pow(currency.exponent))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, NPR};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn price_derefs_to_u64() {
        let price = Price::from_minor(100);

        assert_eq!(*price, 100);
    }

    #[test]
    fn from_decimal_scales_to_minor_units() -> TestResult {
        let price = Price::from_decimal(Decimal::new(15050, 2), NPR)?;

        assert_eq!(*price, 15_050);
        assert_eq!(price.to_decimal(NPR), Decimal::new(15050, 2));

        Ok(())
    }

    #[test]
    fn from_decimal_rejects_negative_amounts() {
        let result = Price::from_decimal(Decimal::new(-1, 0), GBP);

        assert_eq!(result, Err(PriceError::Negative(Decimal::new(-1, 0))));
    }

    #[test]
    fn from_decimal_accepts_zero() -> TestResult {
        let price = Price::from_decimal(Decimal::ZERO, GBP)?;

        assert_eq!(price, Price::ZERO);

        Ok(())
    }

    #[test]
    fn times_saturates() {
        assert_eq!(Price::from_minor(u64::MAX).times(2), Price::from_minor(u64::MAX));
        assert_eq!(Price::from_minor(150).times(3), Price::from_minor(450));
    }

    #[test]
    fn parse_price_reads_amount_and_currency() -> TestResult {
        let (price, currency) = parse_price("120 NPR")?;

        assert_eq!(*price, 12_000);
        assert_eq!(currency, NPR);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_malformed_input() {
        assert!(matches!(
            parse_price("120"),
            Err(PriceError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_price("120 NPR extra"),
            Err(PriceError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_price("120 XYZ"),
            Err(PriceError::UnknownCurrency(_))
        ));
    }
}
