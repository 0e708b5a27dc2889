//! Trip export file format (`crewledger-*.json`).

use crewledger_application::{ConversionError, CurrencyCode, TripExpense, TripSnapshot};
use crewledger_domain::{ExpenseId, ExpenseSplit, Money, Participant, ShareError, ShareType};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::{borrow::Cow, str::FromStr};

const DEFAULT_TRIP_CURRENCY: &str = "USD";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripExport {
    #[serde(default)]
    pub trip: Option<TripRecord>,
    #[serde(default)]
    pub participants: Vec<ParticipantRecord>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub expense_splits: Vec<SplitRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: String,
    pub amount: i64,
    pub paid_by: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exchange_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRecord {
    pub expense_id: String,
    pub participant_id: String,
    pub share_type: String,
    #[serde(default)]
    pub share: f64,
    #[serde(default)]
    pub amount: Option<i64>,
}

/// A split row the engine cannot represent, kept so its expense can be
/// reported on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedSplit {
    pub expense_id: ExpenseId,
    pub reason: ShareError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTrip {
    pub snapshot: TripSnapshot,
    pub rejected_splits: Vec<RejectedSplit>,
}

impl TripExport {
    pub fn from_json(source: &str) -> Result<Self, Cow<'static, str>> {
        serde_json::from_str(source).map_err(|err| format!("Invalid export JSON: {err}").into())
    }

    pub fn trip_name(&self) -> Option<&str> {
        self.trip.as_ref().and_then(|trip| trip.name.as_deref())
    }

    /// Build the engine-facing snapshot.
    ///
    /// Malformed currencies and rates fail the whole file. Splits with an
    /// unknown share type are set aside in [`LoadedTrip::rejected_splits`].
    pub fn load(&self) -> Result<LoadedTrip, Cow<'static, str>> {
        let trip_currency = self
            .trip
            .as_ref()
            .and_then(|trip| trip.currency.as_deref())
            .unwrap_or(DEFAULT_TRIP_CURRENCY);
        let currency = CurrencyCode::parse(trip_currency).map_err(describe_conversion)?;

        let participants = self
            .participants
            .iter()
            .map(|record| Participant::new(record.id.as_str(), record.name.as_str()))
            .collect();

        let expenses = self
            .expenses
            .iter()
            .map(|record| record.to_trip_expense(&currency))
            .collect::<Result<Vec<_>, _>>()?;

        let mut splits = Vec::with_capacity(self.expense_splits.len());
        let mut rejected_splits = Vec::new();
        for record in &self.expense_splits {
            match record.to_split() {
                Ok(split) => splits.push(split),
                Err(reason) => {
                    tracing::debug!(
                        expense_id = %record.expense_id,
                        participant_id = %record.participant_id,
                        reject_reason = %reason,
                        "Split set aside"
                    );
                    rejected_splits.push(RejectedSplit {
                        expense_id: record.expense_id.as_str().into(),
                        reason,
                    });
                }
            }
        }

        Ok(LoadedTrip {
            snapshot: TripSnapshot {
                currency,
                participants,
                expenses,
                splits,
            },
            rejected_splits,
        })
    }
}

impl ExpenseRecord {
    fn to_trip_expense(&self, trip_currency: &CurrencyCode) -> Result<TripExpense, Cow<'static, str>> {
        let currency = match self.currency.as_deref() {
            Some(code) => CurrencyCode::parse(code).map_err(describe_conversion)?,
            None => trip_currency.clone(),
        };
        let exchange_rate = self
            .exchange_rate
            .map(|rate| {
                Decimal::from_str(&rate.to_string()).map_err(|err| {
                    Cow::Owned(format!(
                        "Expense {}: invalid exchange rate {rate}: {err}",
                        self.id
                    ))
                })
            })
            .transpose()?;

        Ok(TripExpense {
            id: self.id.as_str().into(),
            paid_by: self.paid_by.as_str().into(),
            amount: Money::from_i64(self.amount),
            currency,
            exchange_rate,
        })
    }
}

impl SplitRecord {
    fn to_split(&self) -> Result<ExpenseSplit, ShareError> {
        let share_type = ShareType::from_str(&self.share_type)?;

        Ok(ExpenseSplit {
            expense_id: self.expense_id.as_str().into(),
            participant_id: self.participant_id.as_str().into(),
            share_type,
            share: self.share,
            amount: self.amount.map(Money::from_i64),
        })
    }
}

fn describe_conversion(err: ConversionError) -> Cow<'static, str> {
    Cow::Owned(err.to_string())
}
