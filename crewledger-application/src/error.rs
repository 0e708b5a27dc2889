use crate::currency::CurrencyCode;
use crewledger_domain::{BalanceError, ExpenseId};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),
    #[error("An exchange rate is required to convert {from} to {to}")]
    MissingExchangeRate { from: CurrencyCode, to: CurrencyCode },
    #[error("Exchange rate must be positive, got {0}")]
    NonPositiveExchangeRate(Decimal),
    #[error("Converted amount is out of range")]
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettleTripError {
    #[error("Expense {expense_id} could not be converted to the trip currency: {source}")]
    Conversion {
        expense_id: ExpenseId,
        #[source]
        source: ConversionError,
    },
    #[error(transparent)]
    Balance(#[from] BalanceError),
}
