//! Conversion of expense amounts into the trip's settlement currency.
//!
//! The settlement engine only ever sees amounts in one currency. Everything
//! here runs before the engine (trip currency) or after it (display
//! currency) and never feeds display conversions back into settlement math.

use crate::error::ConversionError;
use crewledger_domain::Money;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use std::{fmt, str::FromStr};

/// ISO 4217 alphabetic code, stored upper-case.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn parse(code: &str) -> Result<Self, ConversionError> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConversionError::InvalidCurrencyCode(code.to_owned()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of converting one amount into the trip currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertedAmount {
    pub amount: Money,
    /// `None` when no conversion took place.
    pub applied_rate: Option<Decimal>,
}

/// Convert an amount recorded in `original` into `trip` minor units.
///
/// Same-currency amounts pass through unchanged and any supplied rate is
/// ignored. Cross-currency amounts require a positive rate and are rounded
/// half away from zero.
pub fn convert_to_trip_currency(
    amount: Money,
    original: &CurrencyCode,
    trip: &CurrencyCode,
    exchange_rate: Option<Decimal>,
) -> Result<ConvertedAmount, ConversionError> {
    if original == trip {
        return Ok(ConvertedAmount {
            amount,
            applied_rate: None,
        });
    }

    let rate = exchange_rate.ok_or_else(|| ConversionError::MissingExchangeRate {
        from: original.clone(),
        to: trip.clone(),
    })?;

    Ok(ConvertedAmount {
        amount: apply_rate(amount, rate)?,
        applied_rate: Some(rate),
    })
}

/// Cosmetic conversion of a settled amount into a display currency.
pub fn convert_for_display(amount: Money, rate: Decimal) -> Result<Money, ConversionError> {
    apply_rate(amount, rate)
}

fn apply_rate(amount: Money, rate: Decimal) -> Result<Money, ConversionError> {
    if rate <= Decimal::ZERO {
        return Err(ConversionError::NonPositiveExchangeRate(rate));
    }

    Decimal::from(amount.amount())
        .checked_mul(rate)
        .map(|converted| converted.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .map(Money::from_i64)
        .ok_or(ConversionError::OutOfRange)
}
