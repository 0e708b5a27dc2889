use crate::{
    currency::convert_to_trip_currency,
    error::SettleTripError,
    model::{TripExpense, TripSettlement, TripSnapshot},
};
use crewledger_domain::{
    BalanceCalculator, BalanceError, Expense, ExpenseSplit, Money, SettlementOptimizer,
    ShareNormalizer, ShareType,
};

/// Runs the settlement engine over a loaded trip.
pub struct SettlementService;

impl SettlementService {
    /// Convert every expense into the trip currency, then compute balances
    /// and the settlement plan.
    ///
    /// Explicit split amounts are recorded in the expense's own currency. For
    /// converted expenses they are validated against the original total and
    /// then re-apportioned over the converted total as weights, so the
    /// converted splits still sum exactly.
    pub fn settle(&self, trip: &TripSnapshot) -> Result<TripSettlement, SettleTripError> {
        let mut expenses = Vec::with_capacity(trip.expenses.len());
        let mut splits = trip.splits.clone();
        let mut converted_count = 0usize;

        for trip_expense in &trip.expenses {
            let converted = convert_to_trip_currency(
                trip_expense.amount,
                &trip_expense.currency,
                &trip.currency,
                trip_expense.exchange_rate,
            )
            .map_err(|source| SettleTripError::Conversion {
                expense_id: trip_expense.id.clone(),
                source,
            })?;

            if converted.applied_rate.is_some() {
                converted_count += 1;
                reweight_explicit_amounts(trip_expense, &mut splits)?;
            }

            expenses.push(Expense {
                id: trip_expense.id.clone(),
                paid_by: trip_expense.paid_by.clone(),
                amount: converted.amount,
            });
        }

        let balances = BalanceCalculator.calculate(&expenses, &splits, &trip.participants)?;
        let settlements = SettlementOptimizer.optimize(&balances);

        tracing::debug!(
            trip_currency = %trip.currency,
            expense_count = expenses.len(),
            converted_count,
            participant_count = balances.len(),
            settlement_count = settlements.len(),
            "Trip settled"
        );

        Ok(TripSettlement {
            currency: trip.currency.clone(),
            balances,
            settlements,
        })
    }
}

fn reweight_explicit_amounts(
    expense: &TripExpense,
    splits: &mut [ExpenseSplit],
) -> Result<(), SettleTripError> {
    let indices: Vec<usize> = splits
        .iter()
        .enumerate()
        .filter(|(_, split)| split.expense_id == expense.id && split.share_type == ShareType::Amount)
        .map(|(idx, _)| idx)
        .collect();
    if indices.is_empty() {
        return Ok(());
    }

    let expense_splits: Vec<ExpenseSplit> = splits
        .iter()
        .filter(|split| split.expense_id == expense.id)
        .cloned()
        .collect();
    ShareNormalizer
        .normalize(&expense_splits, expense.amount)
        .map_err(|source| BalanceError::InvalidSplit {
            expense_id: expense.id.clone(),
            source,
        })?;

    for idx in indices {
        let split = &mut splits[idx];
        let original = split.amount.take().unwrap_or(Money::ZERO);
        split.share_type = ShareType::Weight;
        split.share = original.amount() as f64;
    }
    Ok(())
}
