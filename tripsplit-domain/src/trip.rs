use std::iter;

use crate::{
    error::TripError,
    model::{
        Expense, MemberBalances, Money, ParticipantGroup, ParticipantId, ParticipantRegistry,
        PersonBalance, Settlement, sorted_balances,
    },
    services::{BalanceAccumulator, SettlementCalculator, SettlementContext},
};

/// A single trip: who took part, what was spent, and the resulting balances.
///
/// All expenses are applied when the trip is built; the trip is immutable
/// afterwards. [`Trip::settle`] works on a copy of the balances.
#[derive(Debug)]
pub struct Trip {
    label: String,
    year: i32,
    registry: ParticipantRegistry,
    participants: ParticipantGroup,
    expenses: Vec<Expense>,
    balances: MemberBalances,
}

impl Trip {
    pub fn try_new(
        label: impl Into<String>,
        year: i32,
        registry: ParticipantRegistry,
        participants: ParticipantGroup,
        expenses: Vec<Expense>,
    ) -> Result<Self, TripError> {
        Self::try_with_context(
            label,
            year,
            registry,
            participants,
            expenses,
            SettlementContext::default(),
        )
    }

    pub fn try_with_context(
        label: impl Into<String>,
        year: i32,
        registry: ParticipantRegistry,
        participants: ParticipantGroup,
        expenses: Vec<Expense>,
        context: SettlementContext,
    ) -> Result<Self, TripError> {
        if let Some(stranger) = participants.iter().find(|member| !registry.contains(*member)) {
            return Err(TripError::UnknownParticipant(stranger));
        }

        let mut accumulator = BalanceAccumulator::new_with_members(participants.iter(), context);
        for expense in &expenses {
            if let Some(stranger) = iter::once(expense.payer())
                .chain(expense.beneficiaries().iter())
                .find(|member| !participants.contains(*member))
            {
                return Err(TripError::UnknownParticipant(stranger));
            }
            accumulator.apply(expense)?;
        }

        let label = label.into();
        tracing::info!(
            trip = %label,
            year,
            participant_count = participants.len(),
            expense_count = expenses.len(),
            "Trip balances computed"
        );

        Ok(Self {
            label,
            year,
            registry,
            participants,
            expenses,
            balances: accumulator.into_balances(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn participants(&self) -> &ParticipantGroup {
        &self.participants
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn member_balances(&self) -> &MemberBalances {
        &self.balances
    }

    pub fn balance(&self, member: ParticipantId) -> Option<Money> {
        self.balances.get(&member).copied()
    }

    /// Balances before settlement, ascending.
    pub fn balances(&self) -> Vec<PersonBalance> {
        sorted_balances(&self.balances)
    }

    pub fn debtors(&self) -> ParticipantGroup {
        self.members_where(Money::is_negative)
    }

    pub fn lenders(&self) -> ParticipantGroup {
        self.members_where(Money::is_positive)
    }

    /// Computes the transfers that bring every balance to zero.
    pub fn settle(&self) -> Result<Settlement, TripError> {
        let settlement = SettlementCalculator.calculate(self.balances.clone());

        if let Some((&participant, &balance)) = settlement
            .new_balances
            .iter()
            .find(|(_, balance)| !balance.is_zero())
        {
            tracing::error!(
                trip = %self.label,
                participant = %participant,
                balance = %balance,
                "Balance left open after settlement"
            );
            return Err(TripError::NumericDrift {
                participant,
                balance,
            });
        }

        tracing::info!(
            trip = %self.label,
            transfer_count = settlement.transfers.len(),
            "Trip settled"
        );
        Ok(settlement)
    }

    fn members_where(&self, predicate: fn(Money) -> bool) -> ParticipantGroup {
        self.balances
            .iter()
            .filter(|(_, balance)| predicate(**balance))
            .map(|(member, _)| *member)
            .collect()
    }
}
