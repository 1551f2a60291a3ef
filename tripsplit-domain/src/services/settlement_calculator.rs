use crate::model::{MemberBalances, Money, ParticipantId, Settlement, Transfer};

/// Greedy debtor/lender matching.
pub struct SettlementCalculator;

impl SettlementCalculator {
    /// Calculate settlement for all members
    ///
    /// Takes ownership of balances and returns new state.
    ///
    /// Debtors and lenders are each ranked by descending magnitude, ties by
    /// id. Every debtor is matched against every lender in that order and pays
    /// `min(debt, credit)` whenever both are still open, so one pass settles a
    /// zero-sum table completely.
    ///
    /// # Returns
    /// New balances after settlement and the transfers in generation order
    pub fn calculate(&self, balances: MemberBalances) -> Settlement {
        let mut working_balances = balances;
        let debtors = ranked(&working_balances, Money::is_negative);
        let lenders = ranked(&working_balances, Money::is_positive);
        let mut transfers = Vec::with_capacity(debtors.len() + lenders.len());

        for &debtor in &debtors {
            for &lender in &lenders {
                let owed = open_amount(&working_balances, debtor);
                let credit = open_amount(&working_balances, lender);
                let amount = owed.min(credit);
                if amount.is_zero() {
                    continue;
                }

                if let Some(balance) = working_balances.get_mut(&debtor) {
                    *balance += amount;
                }
                if let Some(balance) = working_balances.get_mut(&lender) {
                    *balance -= amount;
                }
                tracing::debug!(from = %debtor, to = %lender, amount = %amount, "Generated transfer");
                transfers.push(Transfer {
                    from: debtor,
                    to: lender,
                    amount,
                });
            }
        }

        Settlement {
            new_balances: working_balances,
            transfers,
        }
    }
}

fn open_amount(balances: &MemberBalances, member: ParticipantId) -> Money {
    balances
        .get(&member)
        .copied()
        .map_or(Money::ZERO, Money::abs)
}

fn ranked(balances: &MemberBalances, select: fn(Money) -> bool) -> Vec<ParticipantId> {
    let mut selected: Vec<(ParticipantId, Money)> = balances
        .iter()
        .filter(|(_, balance)| select(**balance))
        .map(|(member, balance)| (*member, balance.abs()))
        .collect();
    selected.sort_by(|(lhs_id, lhs_amount), (rhs_id, rhs_amount)| {
        rhs_amount.cmp(lhs_amount).then_with(|| lhs_id.cmp(rhs_id))
    });
    selected.into_iter().map(|(member, _)| member).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn calculator() -> SettlementCalculator {
        SettlementCalculator
    }

    fn id(raw: u32) -> ParticipantId {
        ParticipantId(raw)
    }

    #[rstest]
    #[case::two_people(
        MemberBalances::from_iter([
            (id(0), Money::from_i64(50)),
            (id(1), Money::from_i64(-50)),
        ]),
        vec![(1, 0, 50)]
    )]
    #[case::largest_debtor_first(
        MemberBalances::from_iter([
            (id(0), Money::from_i64(60)),
            (id(1), Money::from_i64(-15)),
            (id(2), Money::from_i64(-45)),
        ]),
        vec![(2, 0, 45), (1, 0, 15)]
    )]
    #[case::debtor_split_across_lenders(
        MemberBalances::from_iter([
            (id(0), Money::from_i64(30)),
            (id(1), Money::from_i64(70)),
            (id(2), Money::from_i64(-100)),
        ]),
        vec![(2, 1, 70), (2, 0, 30)]
    )]
    #[case::ties_break_by_id(
        MemberBalances::from_iter([
            (id(0), Money::from_i64(-10)),
            (id(1), Money::from_i64(-10)),
            (id(2), Money::from_i64(10)),
            (id(3), Money::from_i64(10)),
        ]),
        vec![(0, 2, 10), (1, 3, 10)]
    )]
    #[case::settled_members_skipped(
        MemberBalances::from_iter([
            (id(0), Money::ZERO),
            (id(1), Money::from_i64(25)),
            (id(2), Money::from_i64(-25)),
        ]),
        vec![(2, 1, 25)]
    )]
    #[case::all_zero(
        MemberBalances::from_iter([(id(0), Money::ZERO), (id(1), Money::ZERO)]),
        vec![]
    )]
    #[case::empty(MemberBalances::new(), vec![])]
    fn settlement_calculator_cases(
        calculator: SettlementCalculator,
        #[case] balances: MemberBalances,
        #[case] expected_transfers: Vec<(u32, u32, i64)>,
    ) {
        let members: Vec<ParticipantId> = balances.keys().copied().collect();
        let result = calculator.calculate(balances);

        let expected: Vec<Transfer> = expected_transfers
            .into_iter()
            .map(|(from, to, amount)| Transfer {
                from: id(from),
                to: id(to),
                amount: Money::from_i64(amount),
            })
            .collect();
        assert_eq!(result.transfers, expected);
        for member in members {
            assert_eq!(result.new_balances[&member], Money::ZERO);
        }
    }

    #[rstest]
    fn fractional_balances_settle_exactly(calculator: SettlementCalculator) {
        let balances = MemberBalances::from_iter([
            (id(0), Money::new(6667, 2)),
            (id(1), Money::new(-3333, 2)),
            (id(2), Money::new(-3334, 2)),
        ]);

        let result = calculator.calculate(balances);

        assert_eq!(result.transfers.len(), 2);
        assert_eq!(result.transfers[0].from, id(2));
        assert_eq!(result.transfers[0].amount, Money::new(3334, 2));
        assert!(result.new_balances.values().all(|balance| balance.is_zero()));
    }

    #[rstest]
    fn transfer_count_bounded_by_participants(calculator: SettlementCalculator) {
        let balances = MemberBalances::from_iter([
            (id(0), Money::from_i64(40)),
            (id(1), Money::from_i64(35)),
            (id(2), Money::from_i64(-25)),
            (id(3), Money::from_i64(-25)),
            (id(4), Money::from_i64(-25)),
        ]);

        let result = calculator.calculate(balances);

        assert!(result.transfers.len() <= 4);
        let volume: Money = result.transfers.iter().map(|t| t.amount).sum();
        assert_eq!(volume, Money::from_i64(75));
    }
}
