use crate::{
    currency::{CurrencyCode, convert_for_display},
    error::ConversionError,
};
use crewledger_domain::{
    ExpenseId, ExpenseSplit, Money, Participant, ParticipantBalance, ParticipantId, Settlement,
};
use rust_decimal::Decimal;

/// An expense as recorded, possibly in a currency other than the trip's.
#[derive(Clone, Debug, PartialEq)]
pub struct TripExpense {
    pub id: ExpenseId,
    pub paid_by: ParticipantId,
    pub amount: Money,
    pub currency: CurrencyCode,
    /// Units of trip currency per unit of `currency`.
    pub exchange_rate: Option<Decimal>,
}

/// Everything loaded for one trip before settlement.
#[derive(Clone, Debug, PartialEq)]
pub struct TripSnapshot {
    pub currency: CurrencyCode,
    pub participants: Vec<Participant>,
    pub expenses: Vec<TripExpense>,
    pub splits: Vec<ExpenseSplit>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripSettlement {
    pub currency: CurrencyCode,
    pub balances: Vec<ParticipantBalance>,
    pub settlements: Vec<Settlement>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayBalance {
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub net_position: Money,
}

/// Read-only projection of a [`TripSettlement`] into another currency.
///
/// Amounts are converted one by one, so they need not sum to zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplaySettlement {
    pub currency: CurrencyCode,
    pub balances: Vec<DisplayBalance>,
    pub settlements: Vec<Settlement>,
}

impl TripSettlement {
    /// Project balances and settlements into `currency`.
    ///
    /// `rate` is units of display currency per unit of trip currency and is
    /// ignored when `currency` is the trip currency.
    pub fn display_in(
        &self,
        currency: CurrencyCode,
        rate: Option<Decimal>,
    ) -> Result<DisplaySettlement, ConversionError> {
        let convert = |amount: Money| -> Result<Money, ConversionError> {
            if currency == self.currency {
                return Ok(amount);
            }
            let rate = rate.ok_or_else(|| ConversionError::MissingExchangeRate {
                from: self.currency.clone(),
                to: currency.clone(),
            })?;
            convert_for_display(amount, rate)
        };

        let balances = self
            .balances
            .iter()
            .map(|balance| {
                Ok(DisplayBalance {
                    participant_id: balance.participant_id.clone(),
                    participant_name: balance.participant_name.clone(),
                    net_position: convert(balance.net_position)?,
                })
            })
            .collect::<Result<Vec<_>, ConversionError>>()?;
        let settlements = self
            .settlements
            .iter()
            .map(|settlement| {
                Ok(Settlement {
                    from: settlement.from.clone(),
                    to: settlement.to.clone(),
                    amount: convert(settlement.amount)?,
                })
            })
            .collect::<Result<Vec<_>, ConversionError>>()?;

        Ok(DisplaySettlement {
            currency,
            balances,
            settlements,
        })
    }
}
