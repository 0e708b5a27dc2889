use crewledger_domain::{
    BalanceCalculator, BalanceError, Expense, ExpenseSplit, Money, Participant,
    SettlementOptimizer, ShareNormalizer,
};
use rstest::{fixture, rstest};

#[fixture]
fn crew() -> Vec<Participant> {
    vec![
        Participant::new("a", "Ana"),
        Participant::new("b", "Ben"),
        Participant::new("c", "Cleo"),
    ]
}

#[rstest]
fn equal_dinner_paid_by_one(crew: Vec<Participant>) {
    let expenses = [Expense::new("dinner", "a", Money::from_i64(30000))];
    let splits = [
        ExpenseSplit::equal("dinner", "c"),
        ExpenseSplit::equal("dinner", "a"),
        ExpenseSplit::equal("dinner", "b"),
    ];

    let balances = BalanceCalculator
        .calculate(&expenses, &splits, &crew)
        .expect("trip should balance");
    let nets: Vec<i64> = balances.iter().map(|b| b.net_position.amount()).collect();
    assert_eq!(nets, vec![20000, -10000, -10000]);

    let settlements = SettlementOptimizer.optimize(&balances);
    assert_eq!(settlements.len(), 2);
    assert!(settlements.iter().all(|s| s.to.as_str() == "a"));
    assert_eq!(
        settlements.iter().map(|s| s.amount).sum::<Money>(),
        Money::from_i64(20000)
    );
}

#[rstest]
#[case::percentage_thirds(
    vec![
        ExpenseSplit::percentage("x", "a", 33.33),
        ExpenseSplit::percentage("x", "b", 33.33),
        ExpenseSplit::percentage("x", "c", 33.34),
    ],
    10000,
    vec![3333, 3333, 3334]
)]
#[case::weight_two_to_one(
    vec![ExpenseSplit::weight("x", "a", 2.0), ExpenseSplit::weight("x", "b", 1.0)],
    9000,
    vec![6000, 3000]
)]
fn reference_normalizations(
    #[case] splits: Vec<ExpenseSplit>,
    #[case] total: i64,
    #[case] expected: Vec<i64>,
) {
    let shares = ShareNormalizer
        .normalize(&splits, Money::from_i64(total))
        .expect("reference splits are valid");
    let shares: Vec<i64> = shares.into_iter().map(Money::amount).collect();
    assert_eq!(shares, expected);
}

#[rstest]
fn split_for_missing_participant_returns_no_balances(crew: Vec<Participant>) {
    let expenses = [Expense::new("taxi", "b", Money::from_i64(4500))];
    let splits = [
        ExpenseSplit::equal("taxi", "b"),
        ExpenseSplit::equal("taxi", "d"),
    ];

    let result = BalanceCalculator.calculate(&expenses, &splits, &crew);

    assert_eq!(
        result,
        Err(BalanceError::UnknownParticipant {
            participant_ids: vec!["d".into()],
        })
    );
}

#[rstest]
fn mixed_trip_settles_completely(crew: Vec<Participant>) {
    let expenses = [
        Expense::new("hotel", "a", Money::from_i64(45_001)),
        Expense::new("fuel", "b", Money::from_i64(8_000)),
        Expense::new("museum", "c", Money::from_i64(3_000)),
        Expense::new("pending", "c", Money::from_i64(99_999)),
    ];
    let splits = [
        ExpenseSplit::equal("hotel", "a"),
        ExpenseSplit::equal("hotel", "b"),
        ExpenseSplit::equal("hotel", "c"),
        ExpenseSplit::weight("fuel", "a", 1.0),
        ExpenseSplit::weight("fuel", "b", 3.0),
        ExpenseSplit::amount("museum", "a", Money::from_i64(1_000)),
        ExpenseSplit::amount("museum", "c", Money::from_i64(2_000)),
    ];

    let balances = BalanceCalculator
        .calculate(&expenses, &splits, &crew)
        .expect("trip should balance");

    // hotel: 15001/15000/15000, fuel: 2000/6000, museum: 1000/0/2000; "pending" is unsplit.
    let summary: Vec<(i64, i64, i64)> = balances
        .iter()
        .map(|b| (b.total_paid.amount(), b.total_owed.amount(), b.net_position.amount()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (45_001, 18_001, 27_000),
            (8_000, 21_000, -13_000),
            (3_000, 17_000, -14_000),
        ]
    );

    let settlements = SettlementOptimizer.optimize(&balances);
    let plan: Vec<(&str, &str, i64)> = settlements
        .iter()
        .map(|s| (s.from.as_str(), s.to.as_str(), s.amount.amount()))
        .collect();
    assert_eq!(plan, vec![("c", "a", 14_000), ("b", "a", 13_000)]);
}
