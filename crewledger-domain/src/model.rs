use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use crate::error::ShareError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ExpenseId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Amount in minor currency units (e.g. cents).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn amount(self) -> i64 {
        self.0
    }

    /// Magnitude, clamped to `i64::MAX` for `i64::MIN`.
    pub fn saturating_abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn signum(self) -> i64 {
        self.0.signum()
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// How one expense is apportioned among its splits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShareType {
    Equal,
    Percentage,
    Weight,
    Amount,
}

impl ShareType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Percentage => "percentage",
            Self::Weight => "weight",
            Self::Amount => "amount",
        }
    }
}

impl fmt::Display for ShareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareType {
    type Err = ShareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equal" => Ok(Self::Equal),
            "percentage" => Ok(Self::Percentage),
            "weight" => Ok(Self::Weight),
            "amount" => Ok(Self::Amount),
            other => Err(ShareError::UnknownShareType(other.to_owned())),
        }
    }
}

/// One participant's portion of an expense.
///
/// `share` holds the percentage for [`ShareType::Percentage`], the weight for
/// [`ShareType::Weight`], and is ignored otherwise. `amount` is only read for
/// [`ShareType::Amount`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseSplit {
    pub expense_id: ExpenseId,
    pub participant_id: ParticipantId,
    pub share_type: ShareType,
    pub share: f64,
    pub amount: Option<Money>,
}

impl ExpenseSplit {
    pub fn equal(expense_id: impl Into<ExpenseId>, participant_id: impl Into<ParticipantId>) -> Self {
        Self {
            expense_id: expense_id.into(),
            participant_id: participant_id.into(),
            share_type: ShareType::Equal,
            share: 0.0,
            amount: None,
        }
    }

    pub fn percentage(
        expense_id: impl Into<ExpenseId>,
        participant_id: impl Into<ParticipantId>,
        percentage: f64,
    ) -> Self {
        Self {
            expense_id: expense_id.into(),
            participant_id: participant_id.into(),
            share_type: ShareType::Percentage,
            share: percentage,
            amount: None,
        }
    }

    pub fn weight(
        expense_id: impl Into<ExpenseId>,
        participant_id: impl Into<ParticipantId>,
        weight: f64,
    ) -> Self {
        Self {
            expense_id: expense_id.into(),
            participant_id: participant_id.into(),
            share_type: ShareType::Weight,
            share: weight,
            amount: None,
        }
    }

    pub fn amount(
        expense_id: impl Into<ExpenseId>,
        participant_id: impl Into<ParticipantId>,
        amount: Money,
    ) -> Self {
        Self {
            expense_id: expense_id.into(),
            participant_id: participant_id.into(),
            share_type: ShareType::Amount,
            share: 0.0,
            amount: Some(amount),
        }
    }
}

/// An expense already expressed in the trip's settlement currency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub paid_by: ParticipantId,
    pub amount: Money,
}

impl Expense {
    pub fn new(
        id: impl Into<ExpenseId>,
        paid_by: impl Into<ParticipantId>,
        amount: Money,
    ) -> Self {
        Self {
            id: id.into(),
            paid_by: paid_by.into(),
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantBalance {
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub total_paid: Money,
    pub total_owed: Money,
    /// `total_paid - total_owed`; positive means the participant is owed money.
    pub net_position: Money,
}

/// `from` pays `to`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}
