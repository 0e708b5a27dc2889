#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod services;

pub use error::{BalanceError, ShareError};
pub use model::{
    Expense, ExpenseId, ExpenseSplit, Money, Participant, ParticipantBalance, ParticipantId,
    Settlement, ShareType,
};
pub use services::{BalanceCalculator, SettlementOptimizer, ShareNormalizer};
