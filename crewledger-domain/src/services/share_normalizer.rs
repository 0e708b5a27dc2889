//! Apportions one expense across its splits in integer minor units.
//!
//! Every successful call returns amounts that sum exactly to the expense
//! total. Fractional share types (percentage, weight) are computed in `f64`,
//! floored, and the leftover units are handed out with the largest remainder
//! method, so floating-point error never reaches the result.
//!
//! Splits are processed in participant-ID order (ties by input index) and the
//! result is mapped back to the caller's order, which makes the output
//! independent of the order rows were loaded in.

use crate::{
    error::ShareError,
    model::{ExpenseSplit, Money, ShareType},
};

/// Accepted deviation of a percentage sum from 100.
///
/// Absorbs inputs such as `33.33 + 33.33 + 33.34` whose `f64` sum is not
/// exactly 100.
pub const PERCENTAGE_TOLERANCE: f64 = 0.01 + f64::EPSILON * 100.0;

/// Share normalization service
pub struct ShareNormalizer;

impl ShareNormalizer {
    /// Normalize the splits of a single expense into minor-unit amounts.
    ///
    /// # Arguments
    /// * `splits` - Splits of one expense, in any order
    /// * `expense_amount` - Expense total in minor units, post-conversion
    ///
    /// # Returns
    /// One amount per split, in the same order as `splits`
    pub fn normalize(
        &self,
        splits: &[ExpenseSplit],
        expense_amount: Money,
    ) -> Result<Vec<Money>, ShareError> {
        if splits.is_empty() {
            return Ok(Vec::new());
        }
        if expense_amount.is_negative() {
            return Err(ShareError::NegativeExpenseAmount(expense_amount));
        }
        if expense_amount.is_zero() {
            return Ok(vec![Money::ZERO; splits.len()]);
        }

        let share_type = single_share_type(splits)?;

        let mut order: Vec<usize> = (0..splits.len()).collect();
        order.sort_by(|&a, &b| {
            splits[a]
                .participant_id
                .cmp(&splits[b].participant_id)
                .then(a.cmp(&b))
        });
        let stable: Vec<&ExpenseSplit> = order.iter().map(|&idx| &splits[idx]).collect();

        let total = expense_amount.amount();
        let stable_amounts = match share_type {
            ShareType::Equal => split_equally(stable.len(), total),
            ShareType::Percentage => split_by_percentage(&stable, total)?,
            ShareType::Weight => split_by_weight(&stable, total)?,
            ShareType::Amount => split_by_amount(&stable, total)?,
        };

        let mut normalized = vec![Money::ZERO; splits.len()];
        for (stable_index, amount) in stable_amounts.into_iter().enumerate() {
            normalized[order[stable_index]] = Money::from_i64(amount);
        }

        debug_assert_eq!(normalized.iter().sum::<Money>(), expense_amount);
        tracing::trace!(
            share_type = %share_type,
            split_count = splits.len(),
            expense_amount = total,
            "Expense shares normalized"
        );

        Ok(normalized)
    }
}

fn single_share_type(splits: &[ExpenseSplit]) -> Result<ShareType, ShareError> {
    let first = splits[0].share_type;
    match splits.iter().find(|split| split.share_type != first) {
        Some(split) => Err(ShareError::MixedShareTypes {
            first,
            other: split.share_type,
        }),
        None => Ok(first),
    }
}

fn split_equally(count: usize, total: i64) -> Vec<i64> {
    let count_i64 = count as i64;
    let base = total / count_i64;
    let remainder = (total - base * count_i64) as usize;

    (0..count)
        .map(|idx| if idx < remainder { base + 1 } else { base })
        .collect()
}

fn split_by_percentage(splits: &[&ExpenseSplit], total: i64) -> Result<Vec<i64>, ShareError> {
    for split in splits {
        if !split.share.is_finite() || split.share < 0.0 {
            return Err(ShareError::InvalidPercentage {
                participant_id: split.participant_id.clone(),
                value: split.share,
            });
        }
    }

    let total_percentage: f64 = splits.iter().map(|split| split.share).sum();
    if (total_percentage - 100.0).abs() > PERCENTAGE_TOLERANCE {
        return Err(ShareError::InvalidPercentageSum {
            total: total_percentage,
        });
    }

    let exact: Vec<f64> = splits
        .iter()
        .map(|split| (split.share / 100.0) * total as f64)
        .collect();
    Ok(largest_remainder(&exact, total))
}

fn split_by_weight(splits: &[&ExpenseSplit], total: i64) -> Result<Vec<i64>, ShareError> {
    for split in splits {
        if !split.share.is_finite() || split.share < 0.0 {
            return Err(ShareError::InvalidWeight {
                participant_id: split.participant_id.clone(),
                weight: split.share,
            });
        }
    }

    let total_weight: f64 = splits.iter().map(|split| split.share).sum();
    if !total_weight.is_finite() || total_weight <= 0.0 {
        return Err(ShareError::InvalidTotalWeight {
            total: total_weight,
        });
    }

    let exact: Vec<f64> = splits
        .iter()
        .map(|split| (split.share / total_weight) * total as f64)
        .collect();
    Ok(largest_remainder(&exact, total))
}

fn split_by_amount(splits: &[&ExpenseSplit], total: i64) -> Result<Vec<i64>, ShareError> {
    let missing = splits.iter().filter(|split| split.amount.is_none()).count();
    if missing > 0 {
        return Err(ShareError::MissingAmount { missing });
    }

    let amounts: Vec<Money> = splits.iter().filter_map(|split| split.amount).collect();
    if let Some((split, amount)) = splits
        .iter()
        .zip(&amounts)
        .find(|(_, amount)| amount.is_negative())
    {
        return Err(ShareError::NegativeSplitAmount {
            participant_id: split.participant_id.clone(),
            amount: *amount,
        });
    }

    let sum: i128 = amounts.iter().map(|amount| i128::from(amount.amount())).sum();
    if sum != i128::from(total) {
        return Err(ShareError::AmountMismatch {
            expected: Money::from_i64(total),
            actual: sum,
        });
    }

    Ok(amounts.into_iter().map(Money::amount).collect())
}

/// Floors every exact share and hands the leftover units out by largest
/// fractional remainder, ties broken by index.
///
/// The leftover is normally in `0..len`. Float error around a tolerated
/// percentage sum can push it outside that range: a surplus keeps cycling
/// through the ranking, a deficit is taken back evenly across non-zero
/// amounts, smallest remainders first, without driving any amount below zero.
fn largest_remainder(exact: &[f64], total: i64) -> Vec<i64> {
    let mut amounts: Vec<i64> = exact.iter().map(|value| value.floor() as i64).collect();
    let fractions: Vec<f64> = exact
        .iter()
        .zip(&amounts)
        .map(|(value, base)| value - *base as f64)
        .collect();

    let mut ranked: Vec<usize> = (0..exact.len()).collect();
    ranked.sort_by(|&a, &b| fractions[b].total_cmp(&fractions[a]).then(a.cmp(&b)));

    // Floors of totals near i64::MAX can sum past it.
    let floored: i128 = amounts.iter().map(|&amount| i128::from(amount)).sum();
    let remainder = i128::from(total) - floored;
    if remainder > 0 {
        let count = ranked.len() as i128;
        let rounds = remainder / count;
        let extra = (remainder % count) as usize;
        for (position, &idx) in ranked.iter().enumerate() {
            // Every floor is non-negative, so each share stays within the total.
            amounts[idx] += (rounds + i128::from(position < extra)) as i64;
        }
    } else if remainder < 0 {
        let mut excess = -remainder;
        tracing::debug!(
            excess = %excess,
            total,
            "Floored shares exceed expense total; withdrawing surplus units"
        );
        while excess > 0 {
            let holders = amounts.iter().filter(|&&amount| amount > 0).count() as i128;
            let per_holder = (excess / holders).max(1);
            for &idx in ranked.iter().rev() {
                if excess == 0 {
                    break;
                }
                let taken = per_holder.min(excess).min(i128::from(amounts[idx]));
                amounts[idx] -= taken as i64;
                excess -= taken;
            }
        }
    }

    amounts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn normalizer() -> ShareNormalizer {
        ShareNormalizer
    }

    fn equal(ids: &[&str]) -> Vec<ExpenseSplit> {
        ids.iter().map(|id| ExpenseSplit::equal("e1", *id)).collect()
    }

    fn percentages(shares: &[(&str, f64)]) -> Vec<ExpenseSplit> {
        shares
            .iter()
            .map(|(id, share)| ExpenseSplit::percentage("e1", *id, *share))
            .collect()
    }

    fn weights(shares: &[(&str, f64)]) -> Vec<ExpenseSplit> {
        shares
            .iter()
            .map(|(id, share)| ExpenseSplit::weight("e1", *id, *share))
            .collect()
    }

    fn amounts(shares: &[(&str, i64)]) -> Vec<ExpenseSplit> {
        shares
            .iter()
            .map(|(id, amount)| ExpenseSplit::amount("e1", *id, Money::from_i64(*amount)))
            .collect()
    }

    fn to_i64(amounts: Vec<Money>) -> Vec<i64> {
        amounts.into_iter().map(Money::amount).collect()
    }

    #[rstest]
    #[case::even(equal(&["a", "b", "c"]), 300, vec![100, 100, 100])]
    #[case::remainder_to_lowest_id(equal(&["a", "b", "c"]), 100, vec![34, 33, 33])]
    #[case::remainder_follows_id_not_position(equal(&["c", "a", "b"]), 100, vec![33, 34, 33])]
    #[case::two_remainder_units(equal(&["b", "a", "c"]), 101, vec![34, 34, 33])]
    #[case::single_split(equal(&["a"]), 12345, vec![12345])]
    #[case::fewer_units_than_splits(equal(&["d", "c", "b", "a"]), 2, vec![0, 0, 1, 1])]
    #[case::percentage_thirds(
        percentages(&[("a", 33.33), ("b", 33.33), ("c", 33.34)]),
        10000,
        vec![3333, 3333, 3334]
    )]
    #[case::percentage_short_of_hundred_within_tolerance(
        percentages(&[("a", 33.33), ("b", 33.33), ("c", 33.33)]),
        10000,
        vec![3334, 3333, 3333]
    )]
    #[case::percentage_largest_fraction_wins(
        percentages(&[("a", 60.0), ("b", 40.0)]),
        999,
        vec![599, 400]
    )]
    #[case::percentage_tie_goes_to_lowest_id(
        percentages(&[("a", 50.0), ("b", 25.0), ("c", 25.0)]),
        1001,
        vec![501, 250, 250]
    )]
    #[case::weight_two_to_one(weights(&[("a", 2.0), ("b", 1.0)]), 9000, vec![6000, 3000])]
    #[case::weight_fractional(
        weights(&[("a", 1.5), ("b", 2.5), ("c", 1.0)]),
        1000,
        vec![300, 500, 200]
    )]
    #[case::weight_zero_individual(weights(&[("a", 0.0), ("b", 1.0)]), 1000, vec![0, 1000])]
    #[case::weight_equal_tie_by_id(
        weights(&[("b", 1.0), ("a", 1.0), ("c", 1.0)]),
        100,
        vec![33, 34, 33]
    )]
    #[case::amount_pass_through(amounts(&[("a", 700), ("b", 300)]), 1000, vec![700, 300])]
    #[case::percentage_at_i64_max(
        percentages(&[("a", 50.0), ("b", 50.0)]),
        i64::MAX,
        vec![4_611_686_018_427_387_904, 4_611_686_018_427_387_903]
    )]
    #[case::weight_at_i64_max(
        weights(&[("a", 1.0), ("b", 1.0)]),
        i64::MAX,
        vec![4_611_686_018_427_387_904, 4_611_686_018_427_387_903]
    )]
    #[case::equal_at_i64_max(
        equal(&["a", "b"]),
        i64::MAX,
        vec![4_611_686_018_427_387_904, 4_611_686_018_427_387_903]
    )]
    fn normalizes_by_share_type(
        normalizer: ShareNormalizer,
        #[case] splits: Vec<ExpenseSplit>,
        #[case] total: i64,
        #[case] expected: Vec<i64>,
    ) {
        let result = normalizer
            .normalize(&splits, Money::from_i64(total))
            .expect("normalization should succeed");

        assert_eq!(to_i64(result), expected);
        assert_eq!(expected.iter().map(|&amount| i128::from(amount)).sum::<i128>(), i128::from(total));
    }

    #[rstest]
    #[case::equal(equal(&["a", "b"]))]
    #[case::percentage(percentages(&[("a", 50.0), ("b", 50.0)]))]
    #[case::invalid_weights_are_not_inspected(weights(&[("a", -1.0), ("b", 0.0)]))]
    #[case::missing_amounts_are_not_inspected(vec![
        ExpenseSplit { amount: None, ..ExpenseSplit::amount("e1", "a", Money::ZERO) },
    ])]
    fn zero_total_yields_zero_amounts(normalizer: ShareNormalizer, #[case] splits: Vec<ExpenseSplit>) {
        let result = normalizer
            .normalize(&splits, Money::ZERO)
            .expect("zero total should normalize");

        assert_eq!(result, vec![Money::ZERO; splits.len()]);
    }

    #[rstest]
    fn empty_splits_yield_empty_result(normalizer: ShareNormalizer) {
        let result = normalizer
            .normalize(&[], Money::from_i64(500))
            .expect("empty splits should normalize");
        assert!(result.is_empty());
    }

    #[rstest]
    fn percentage_surplus_within_tolerance_is_withdrawn(normalizer: ShareNormalizer) {
        // 50.005 + 50.005 = 100.01 is accepted, but the floors overshoot the total.
        let splits = percentages(&[("a", 50.005), ("b", 50.005)]);

        let result = normalizer
            .normalize(&splits, Money::from_i64(1_000_000))
            .expect("sum within tolerance should normalize");

        assert_eq!(to_i64(result), vec![500_000, 500_000]);
    }

    #[rstest]
    #[case::mixed(
        vec![ExpenseSplit::equal("e1", "a"), ExpenseSplit::weight("e1", "b", 1.0)],
        100,
        ShareError::MixedShareTypes { first: ShareType::Equal, other: ShareType::Weight }
    )]
    #[case::percentage_sum_low(
        percentages(&[("a", 50.0), ("b", 49.0)]),
        100,
        ShareError::InvalidPercentageSum { total: 99.0 }
    )]
    #[case::percentage_sum_high(
        percentages(&[("a", 50.0), ("b", 50.5)]),
        100,
        ShareError::InvalidPercentageSum { total: 100.5 }
    )]
    #[case::percentage_negative(
        percentages(&[("a", 110.0), ("b", -10.0)]),
        100,
        ShareError::InvalidPercentage { participant_id: "b".into(), value: -10.0 }
    )]
    #[case::weight_negative(
        weights(&[("a", 2.0), ("b", -1.0)]),
        100,
        ShareError::InvalidWeight { participant_id: "b".into(), weight: -1.0 }
    )]
    #[case::weight_infinite(
        weights(&[("a", f64::INFINITY)]),
        100,
        ShareError::InvalidWeight { participant_id: "a".into(), weight: f64::INFINITY }
    )]
    #[case::weight_total_zero(
        weights(&[("a", 0.0), ("b", 0.0)]),
        100,
        ShareError::InvalidTotalWeight { total: 0.0 }
    )]
    #[case::amount_mismatch(
        amounts(&[("a", 600), ("b", 300)]),
        1000,
        ShareError::AmountMismatch { expected: Money::from_i64(1000), actual: 900 }
    )]
    #[case::amount_missing(
        vec![
            ExpenseSplit::amount("e1", "a", Money::from_i64(1000)),
            ExpenseSplit { amount: None, ..ExpenseSplit::amount("e1", "b", Money::ZERO) },
        ],
        1000,
        ShareError::MissingAmount { missing: 1 }
    )]
    #[case::amount_negative(
        amounts(&[("a", 1100), ("b", -100)]),
        1000,
        ShareError::NegativeSplitAmount { participant_id: "b".into(), amount: Money::from_i64(-100) }
    )]
    #[case::negative_total(
        equal(&["a"]),
        -1,
        ShareError::NegativeExpenseAmount(Money::from_i64(-1))
    )]
    fn rejects_invalid_splits(
        normalizer: ShareNormalizer,
        #[case] splits: Vec<ExpenseSplit>,
        #[case] total: i64,
        #[case] expected: ShareError,
    ) {
        let result = normalizer.normalize(&splits, Money::from_i64(total));
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    fn output_follows_input_order_but_not_input_permutation(normalizer: ShareNormalizer) {
        let forward = percentages(&[("a", 33.33), ("b", 33.33), ("c", 33.34)]);
        let reversed: Vec<ExpenseSplit> = forward.iter().rev().cloned().collect();

        let forward_result = normalizer
            .normalize(&forward, Money::from_i64(10001))
            .expect("forward order should normalize");
        let mut reversed_result = normalizer
            .normalize(&reversed, Money::from_i64(10001))
            .expect("reversed order should normalize");
        reversed_result.reverse();

        assert_eq!(forward_result, reversed_result);
    }

    #[test]
    fn largest_remainder_cycles_large_surplus() {
        // Only reachable through float error; exercised directly.
        let result = largest_remainder(&[0.2, 0.5], 5);
        assert_eq!(result, vec![2, 3]);
    }

    #[test]
    fn largest_remainder_withdraws_large_excess_in_bulk() {
        let result = largest_remainder(&[600.0, 500.0], 1000);
        assert_eq!(result, vec![550, 450]);
    }
}
