pub mod balance_accumulator;
pub mod member_set_resolver;
pub mod settlement_calculator;
pub mod settlement_context;

pub use balance_accumulator::{BalanceAccumulator, apportion};
pub use member_set_resolver::MemberSetResolver;
pub use settlement_calculator::SettlementCalculator;
pub use settlement_context::{AtomicUnitConversionError, SettlementContext};
