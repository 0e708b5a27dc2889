use crate::export::{LoadedTrip, TripExport};
use crewledger_application::{
    SettleTripError, SettlementService, TripSettlement, TripSnapshot, convert_to_trip_currency,
};
use crewledger_domain::{Money, ParticipantId, ShareType};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseStatus {
    Ok,
    Unsplit,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseCheck {
    pub date: String,
    pub description: String,
    pub share_type: Option<ShareType>,
    /// Amount in trip currency, when the expense could be converted.
    pub converted: Option<Money>,
    pub status: ExpenseStatus,
}

/// Verification result for one export file.
#[derive(Debug)]
pub struct TripReport {
    pub title: String,
    pub currency_symbol: String,
    pub checks: Vec<ExpenseCheck>,
    pub settlement: Result<TripSettlement, SettleTripError>,
}

impl TripReport {
    /// Check every expense on its own, then settle the trip over the
    /// expenses that passed.
    pub fn verify(
        title: impl Into<String>,
        currency_symbol: impl Into<String>,
        export: &TripExport,
        loaded: &LoadedTrip,
    ) -> Self {
        let snapshot = &loaded.snapshot;
        let mut checks = Vec::with_capacity(snapshot.expenses.len());
        let mut failed_ids = Vec::new();

        for (idx, expense) in snapshot.expenses.iter().enumerate() {
            let record = export.expenses.get(idx);
            let splits: Vec<_> = snapshot
                .splits
                .iter()
                .filter(|split| split.expense_id == expense.id)
                .cloned()
                .collect();
            let share_type = splits.first().map(|split| split.share_type);

            let single = TripSnapshot {
                currency: snapshot.currency.clone(),
                participants: snapshot.participants.clone(),
                expenses: vec![expense.clone()],
                splits,
            };
            let converted = convert_to_trip_currency(
                expense.amount,
                &expense.currency,
                &snapshot.currency,
                expense.exchange_rate,
            )
            .ok()
            .map(|converted| converted.amount);
            let rejected = loaded
                .rejected_splits
                .iter()
                .find(|rejected| rejected.expense_id == expense.id);
            let outcome = match rejected {
                Some(rejected) => Err(rejected.reason.to_string()),
                None => SettlementService.settle(&single).map_err(|err| {
                    tracing::debug!(
                        expense_id = %expense.id,
                        reject_reason = %err,
                        "Expense failed verification"
                    );
                    describe(&err)
                }),
            };
            let status = match outcome {
                Ok(_) if share_type.is_none() => ExpenseStatus::Unsplit,
                Ok(_) => ExpenseStatus::Ok,
                Err(reason) => {
                    failed_ids.push(expense.id.clone());
                    ExpenseStatus::Failed(reason)
                }
            };

            checks.push(ExpenseCheck {
                date: record
                    .and_then(|record| record.date.as_deref())
                    .map(short_date)
                    .unwrap_or_default(),
                description: record
                    .and_then(|record| record.description.clone())
                    .unwrap_or_else(|| expense.id.to_string()),
                share_type,
                converted,
                status,
            });
        }

        let accepted = TripSnapshot {
            currency: snapshot.currency.clone(),
            participants: snapshot.participants.clone(),
            expenses: snapshot
                .expenses
                .iter()
                .filter(|expense| !failed_ids.contains(&expense.id))
                .cloned()
                .collect(),
            splits: snapshot
                .splits
                .iter()
                .filter(|split| !failed_ids.contains(&split.expense_id))
                .cloned()
                .collect(),
        };

        Self {
            title: title.into(),
            currency_symbol: currency_symbol.into(),
            checks,
            settlement: SettlementService.settle(&accepted),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.settlement.is_err()
            || self
                .checks
                .iter()
                .any(|check| matches!(check.status, ExpenseStatus::Failed(_)))
    }

    fn money(&self, amount: Money) -> String {
        format_money(amount, &self.currency_symbol)
    }

    fn name_of<'a>(settled: &'a TripSettlement, id: &'a ParticipantId) -> &'a str {
        settled
            .balances
            .iter()
            .find(|balance| &balance.participant_id == id)
            .map_or(id.as_str(), |balance| balance.participant_name.as_str())
    }
}

impl fmt::Display for TripReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        writeln!(f, "Expenses")?;
        for check in &self.checks {
            let share_type = check.share_type.map_or("-", ShareType::as_str);
            let amount = check
                .converted
                .map_or_else(|| "?".to_owned(), |amount| self.money(amount));
            let status = match &check.status {
                ExpenseStatus::Ok => "OK".to_owned(),
                ExpenseStatus::Unsplit => "unsplit".to_owned(),
                ExpenseStatus::Failed(reason) => format!("FAILED: {reason}"),
            };
            writeln!(
                f,
                "  {:<10} | {:<24} | {:<10} | {:>12} | {status}",
                check.date, check.description, share_type, amount
            )?;
        }
        let total: Money = self.checks.iter().filter_map(|check| check.converted).sum();
        writeln!(f, "Total: {}", self.money(total))?;

        let settled = match &self.settlement {
            Ok(settled) => settled,
            Err(err) => return writeln!(f, "Balance sheet failed: {}", describe(err)),
        };

        writeln!(f, "Balances ({})", settled.currency)?;
        for balance in &settled.balances {
            writeln!(
                f,
                "  {:<16} paid {:>12}  owed {:>12}  net {:>12}",
                balance.participant_name,
                self.money(balance.total_paid),
                self.money(balance.total_owed),
                self.money(balance.net_position)
            )?;
        }

        writeln!(f, "Settlement plan")?;
        if settled.settlements.is_empty() {
            return writeln!(f, "  Everyone is settled up.");
        }
        for settlement in &settled.settlements {
            writeln!(
                f,
                "  {} pays {} {}",
                Self::name_of(settled, &settlement.from),
                Self::name_of(settled, &settlement.to),
                self.money(settlement.amount)
            )?;
        }
        Ok(())
    }
}

/// Render minor units as `-$12.34`.
pub fn format_money(amount: Money, symbol: &str) -> String {
    let minor = amount.amount().unsigned_abs();
    let sign = if amount.is_negative() { "-" } else { "" };
    format!("{sign}{symbol}{}.{:02}", minor / 100, minor % 100)
}

fn short_date(date: &str) -> String {
    date.chars().take(10).collect()
}

fn describe(err: &SettleTripError) -> String {
    use std::error::Error as _;

    match err.source() {
        Some(source) if matches!(err, SettleTripError::Balance(_)) => source.to_string(),
        _ => err.to_string(),
    }
}
