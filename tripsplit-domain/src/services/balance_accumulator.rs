use crate::{
    error::{InvalidExpense, TripError},
    model::{Expense, MemberBalances, Money, ParticipantGroup, ParticipantId},
    services::SettlementContext,
};

/// Applies expenses to a balance table, one at a time.
pub struct BalanceAccumulator {
    balances: MemberBalances,
    context: SettlementContext,
}

impl BalanceAccumulator {
    pub fn new_with_members<I>(members: I, context: SettlementContext) -> Self
    where
        I: IntoIterator<Item = ParticipantId>,
    {
        Self {
            balances: members
                .into_iter()
                .map(|member| (member, Money::ZERO))
                .collect(),
            context,
        }
    }

    /// Credits the payer with the full amount and debits every beneficiary
    /// with its share. Nothing is touched when the split fails.
    pub fn apply(&mut self, expense: &Expense) -> Result<(), TripError> {
        let shares = apportion(expense.amount(), expense.beneficiaries(), self.context)?;

        *self
            .balances
            .entry(expense.payer())
            .or_insert(Money::ZERO) += expense.amount();
        for (member, share) in shares {
            *self.balances.entry(member).or_insert(Money::ZERO) -= share;
        }

        tracing::debug!(
            payer = %expense.payer(),
            amount = %expense.amount(),
            beneficiary_count = expense.beneficiaries().len(),
            "Applied expense"
        );
        Ok(())
    }

    pub fn into_balances(self) -> MemberBalances {
        self.balances
    }
}

/// Splits `amount` evenly over `beneficiaries` in whole atomic units.
///
/// Leftover units go one each to the first beneficiaries in id order, so the
/// shares always add up to `amount` exactly.
pub fn apportion(
    amount: Money,
    beneficiaries: &ParticipantGroup,
    context: SettlementContext,
) -> Result<Vec<(ParticipantId, Money)>, TripError> {
    if beneficiaries.is_empty() {
        return Err(InvalidExpense::EmptyBeneficiaries.into());
    }

    let units = context
        .to_atomic_units_i64(amount)
        .map_err(|source| TripError::UnsupportedPrecision {
            amount,
            scale: context.scale,
            source,
        })?;
    let member_count = beneficiaries.len() as i64;
    let base = units / member_count;
    let remainder = (units % member_count).unsigned_abs() as usize;

    Ok(beneficiaries
        .iter()
        .enumerate()
        .map(|(idx, member)| {
            let mut share = base;
            if idx < remainder {
                share += units.signum();
            }
            (member, context.from_atomic_units(share))
        })
        .collect())
}
