use thiserror::Error;

use crate::{
    model::{Money, ParticipantId},
    services::AtomicUnitConversionError,
};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidExpense {
    #[error("expense has no beneficiaries")]
    EmptyBeneficiaries,
    #[error("expense amount must be positive (found {0})")]
    NonPositiveAmount(Money),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TripError {
    #[error(transparent)]
    InvalidExpense(#[from] InvalidExpense),
    #[error("participant '{name}' is already registered")]
    DuplicateParticipant { name: String },
    #[error("participant {0} is not part of this trip")]
    UnknownParticipant(ParticipantId),
    #[error("amount {amount} cannot be split in units of scale {scale}")]
    UnsupportedPrecision {
        amount: Money,
        scale: u32,
        #[source]
        source: AtomicUnitConversionError,
    },
    /// Settlement left a non-zero balance behind. Indicates a bug, never bad input.
    #[error("participant {participant} still holds {balance} after settlement")]
    NumericDrift {
        participant: ParticipantId,
        balance: Money,
    },
}
