pub mod balance_calculator;
pub mod settlement_optimizer;
pub mod share_normalizer;

pub use balance_calculator::BalanceCalculator;
pub use settlement_optimizer::SettlementOptimizer;
pub use share_normalizer::{PERCENTAGE_TOLERANCE, ShareNormalizer};
