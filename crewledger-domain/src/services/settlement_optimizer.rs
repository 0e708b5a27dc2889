use crate::model::{Money, ParticipantBalance, ParticipantId, Settlement};
use std::cmp::Ordering;

/// Debt-minimization service
///
/// Greedy matching of the largest remaining creditor with the largest
/// remaining debtor. Every step settles at least one side completely, so a
/// balanced input with `n` non-zero positions yields at most `n - 1`
/// settlements.
pub struct SettlementOptimizer;

struct Position<'a> {
    id: &'a ParticipantId,
    remaining: Money,
}

impl SettlementOptimizer {
    /// Compute the payments that zero every net position.
    ///
    /// Never fails: an input that does not sum to zero (a caller-side
    /// conservation bug) is settled as far as possible and the residual is
    /// logged.
    pub fn optimize(&self, balances: &[ParticipantBalance]) -> Vec<Settlement> {
        let mut creditors: Vec<Position> = Vec::new();
        let mut debtors: Vec<Position> = Vec::new();
        for balance in balances {
            let position = Position {
                id: &balance.participant_id,
                remaining: balance.net_position.saturating_abs(),
            };
            match balance.net_position.signum() {
                1 => creditors.push(position),
                -1 => debtors.push(position),
                _ => {}
            }
        }

        creditors.sort_by(largest_first);
        debtors.sort_by(largest_first);

        let mut settlements = Vec::with_capacity(creditors.len() + debtors.len());
        let (mut c_idx, mut d_idx) = (0, 0);
        while let (Some(creditor), Some(debtor)) = (creditors.get(c_idx), debtors.get(d_idx)) {
            let amount = creditor.remaining.min(debtor.remaining);
            settlements.push(Settlement {
                from: debtor.id.clone(),
                to: creditor.id.clone(),
                amount,
            });

            creditors[c_idx].remaining -= amount;
            debtors[d_idx].remaining -= amount;
            if creditors[c_idx].remaining.is_zero() {
                c_idx += 1;
            }
            if debtors[d_idx].remaining.is_zero() {
                d_idx += 1;
            }
        }

        let unsettled_credit = unsettled(&creditors[c_idx..]);
        let unsettled_debt = unsettled(&debtors[d_idx..]);
        if unsettled_credit != 0 || unsettled_debt != 0 {
            tracing::warn!(
                participant_count = balances.len(),
                settlement_count = settlements.len(),
                unsettled_credit = %unsettled_credit,
                unsettled_debt = %unsettled_debt,
                "Net positions do not sum to zero; settlement plan is partial"
            );
        }

        settlements
    }
}

fn unsettled(positions: &[Position]) -> i128 {
    positions
        .iter()
        .map(|position| i128::from(position.remaining.amount()))
        .sum()
}

fn largest_first(a: &Position, b: &Position) -> Ordering {
    b.remaining.cmp(&a.remaining).then(a.id.cmp(b.id))
}
