#![warn(clippy::uninlined_format_args)]

pub mod currency;
pub mod error;
pub mod model;
pub mod settlement_service;

pub use currency::{
    ConvertedAmount, CurrencyCode, convert_for_display, convert_to_trip_currency,
};
pub use error::{ConversionError, SettleTripError};
pub use model::{DisplayBalance, DisplaySettlement, TripExpense, TripSettlement, TripSnapshot};
pub use settlement_service::SettlementService;
