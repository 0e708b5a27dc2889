use crate::{
    error::BalanceError,
    model::{Expense, ExpenseId, ExpenseSplit, Money, Participant, ParticipantBalance, ParticipantId},
    services::ShareNormalizer,
};
use fxhash::FxHashMap;
use std::collections::BTreeSet;

/// Balance aggregation service
pub struct BalanceCalculator;

#[derive(Clone, Copy, Default)]
struct Totals {
    paid: Money,
    owed: Money,
}

impl BalanceCalculator {
    /// Aggregate what every participant paid and owes across a trip.
    ///
    /// Expenses without splits are skipped: an expense that has not been
    /// apportioned yet affects nobody. A split or payer that references a
    /// participant outside `participants` fails the whole computation.
    ///
    /// # Returns
    /// One balance per distinct participant, sorted by participant ID
    pub fn calculate(
        &self,
        expenses: &[Expense],
        splits: &[ExpenseSplit],
        participants: &[Participant],
    ) -> Result<Vec<ParticipantBalance>, BalanceError> {
        let mut roster: Vec<&Participant> = participants.iter().collect();
        roster.sort_by(|a, b| a.id.cmp(&b.id));
        roster.dedup_by(|later, earlier| later.id == earlier.id);

        let mut totals: FxHashMap<&ParticipantId, Totals> = roster
            .iter()
            .map(|&participant| (&participant.id, Totals::default()))
            .collect();

        ensure_known_participants(&totals, expenses, splits)?;

        let mut splits_by_expense: FxHashMap<&ExpenseId, Vec<ExpenseSplit>> =
            FxHashMap::default();
        for split in splits {
            splits_by_expense
                .entry(&split.expense_id)
                .or_default()
                .push(split.clone());
        }

        let normalizer = ShareNormalizer;
        let mut skipped_expenses = 0usize;
        for expense in expenses {
            let Some(expense_splits) = splits_by_expense.get(&expense.id) else {
                skipped_expenses += 1;
                continue;
            };

            let shares = normalizer
                .normalize(expense_splits, expense.amount)
                .map_err(|source| BalanceError::InvalidSplit {
                    expense_id: expense.id.clone(),
                    source,
                })?;

            accumulate(&mut totals, &expense.paid_by, |entry| {
                entry.paid.checked_add(expense.amount).map(|paid| entry.paid = paid)
            })?;
            for (split, share) in expense_splits.iter().zip(shares) {
                accumulate(&mut totals, &split.participant_id, |entry| {
                    entry.owed.checked_add(share).map(|owed| entry.owed = owed)
                })?;
            }
        }

        tracing::debug!(
            expense_count = expenses.len(),
            split_count = splits.len(),
            participant_count = roster.len(),
            skipped_expenses,
            "Participant balances calculated"
        );

        roster
            .into_iter()
            .map(|participant| {
                let entry = totals.get(&participant.id).copied().unwrap_or_default();
                let net_position = entry.paid.checked_sub(entry.owed).ok_or_else(|| {
                    BalanceError::Overflow {
                        participant_id: participant.id.clone(),
                    }
                })?;
                Ok(ParticipantBalance {
                    participant_id: participant.id.clone(),
                    participant_name: participant.name.clone(),
                    total_paid: entry.paid,
                    total_owed: entry.owed,
                    net_position,
                })
            })
            .collect()
    }
}

fn ensure_known_participants(
    totals: &FxHashMap<&ParticipantId, Totals>,
    expenses: &[Expense],
    splits: &[ExpenseSplit],
) -> Result<(), BalanceError> {
    let unknown: BTreeSet<&ParticipantId> = splits
        .iter()
        .map(|split| &split.participant_id)
        .chain(expenses.iter().map(|expense| &expense.paid_by))
        .filter(|id| !totals.contains_key(id))
        .collect();

    if unknown.is_empty() {
        return Ok(());
    }

    tracing::error!(
        reject_reason = "unknown_participant",
        unknown_count = unknown.len(),
        unknown_ids = ?unknown,
        "Balance calculation rejected due to unknown participant reference"
    );
    Err(BalanceError::UnknownParticipant {
        participant_ids: unknown.into_iter().cloned().collect(),
    })
}

fn accumulate<F>(
    totals: &mut FxHashMap<&ParticipantId, Totals>,
    participant_id: &ParticipantId,
    apply: F,
) -> Result<(), BalanceError>
where
    F: FnOnce(&mut Totals) -> Option<()>,
{
    totals
        .get_mut(participant_id)
        .and_then(apply)
        .ok_or_else(|| BalanceError::Overflow {
            participant_id: participant_id.clone(),
        })
}
