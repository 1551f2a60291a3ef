#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod services;
pub mod trip;

pub use error::{InvalidExpense, TripError};
pub use model::{
    Expense, MemberBalances, MemberSetExpr, MemberSetOp, Money, Participant, ParticipantGroup,
    ParticipantId, ParticipantRegistry, PersonBalance, Settlement, Transfer, sorted_balances,
};
pub use services::{
    AtomicUnitConversionError, BalanceAccumulator, MemberSetResolver, SettlementCalculator,
    SettlementContext, apportion,
};
pub use trip::Trip;
