use crate::model::{ExpenseId, Money, ParticipantId, ShareType};
use thiserror::Error;

/// Rejections from [`crate::ShareNormalizer`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShareError {
    #[error("All splits for an expense must have the same share type (found {first} and {other})")]
    MixedShareTypes { first: ShareType, other: ShareType },
    #[error("Percentages must sum to 100, got {total}")]
    InvalidPercentageSum { total: f64 },
    #[error("Percentage for participant {participant_id} must be a non-negative finite number, got {value}")]
    InvalidPercentage {
        participant_id: ParticipantId,
        value: f64,
    },
    #[error("Weight for participant {participant_id} must be a non-negative finite number, got {weight}")]
    InvalidWeight {
        participant_id: ParticipantId,
        weight: f64,
    },
    #[error("Total weight must be positive and finite, got {total}")]
    InvalidTotalWeight { total: f64 },
    #[error("Split amounts must sum to expense total. Expected {expected}, got {actual}")]
    AmountMismatch { expected: Money, actual: i128 },
    #[error("All splits must have explicit amounts; found {missing} missing amount(s)")]
    MissingAmount { missing: usize },
    #[error("Split amount for participant {participant_id} must not be negative, got {amount}")]
    NegativeSplitAmount {
        participant_id: ParticipantId,
        amount: Money,
    },
    #[error("Expense amount must not be negative, got {0}")]
    NegativeExpenseAmount(Money),
    #[error("Unknown share type: {0}")]
    UnknownShareType(String),
}

/// Rejections from [`crate::BalanceCalculator`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BalanceError {
    #[error("Unknown participant(s) referenced: {}", join_ids(.participant_ids))]
    UnknownParticipant { participant_ids: Vec<ParticipantId> },
    #[error("Splits of expense {expense_id} are invalid: {source}")]
    InvalidSplit {
        expense_id: ExpenseId,
        #[source]
        source: ShareError,
    },
    #[error("Balance of participant {participant_id} overflowed")]
    Overflow { participant_id: ParticipantId },
}

fn join_ids(ids: &[ParticipantId]) -> String {
    ids.iter()
        .map(ParticipantId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
