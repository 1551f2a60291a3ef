use crate::{error::TripParseError, model::SettlementResult, ports::TripParser};
use tripsplit_domain::{SettlementContext, Trip, TripError, sorted_balances};

#[derive(Clone, Copy)]
pub struct TripProcessor<'a> {
    parser: &'a dyn TripParser,
    context: SettlementContext,
}

impl<'a> TripProcessor<'a> {
    pub fn new(parser: &'a dyn TripParser, context: SettlementContext) -> Self {
        Self { parser, context }
    }

    pub fn load_trip(&self, content: &str) -> Result<Trip, TripParseError> {
        let trip = self
            .parser
            .parse(content, self.context)
            .inspect_err(|err| tracing::debug!(error = %err, "Failed to load trip"))?;

        tracing::info!(
            trip = trip.label(),
            year = trip.year(),
            participant_count = trip.participants().len(),
            expense_count = trip.expenses().len(),
            scale = self.context.scale,
            "Trip loaded"
        );
        Ok(trip)
    }

    pub fn build_settlement_result(&self, trip: &Trip) -> Result<SettlementResult, TripError> {
        let balances_before = trip.balances();
        let settlement = trip.settle()?;
        let balances_after = sorted_balances(&settlement.new_balances);

        Ok(SettlementResult {
            balances_before,
            transfers: settlement.transfers,
            balances_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tripsplit_domain::{
        Expense, Money, ParticipantGroup, ParticipantId, ParticipantRegistry, Transfer,
    };

    /// Builds the two-person trip regardless of input.
    struct FixedTripParser;

    impl TripParser for FixedTripParser {
        fn parse(&self, _content: &str, context: SettlementContext) -> Result<Trip, TripParseError> {
            let registry = ParticipantRegistry::try_from_names(["A", "B"])?;
            let everyone = registry.everyone();
            let expense = Expense::try_new(Money::from_i64(100), ParticipantId(0), everyone.clone())
                .map_err(|source| TripParseError::InvalidExpense { line: 1, source })?;
            Ok(Trip::try_with_context(
                "Fixed",
                2024,
                registry,
                everyone,
                vec![expense],
                context,
            )?)
        }
    }

    struct FailingParser;

    impl TripParser for FailingParser {
        fn parse(&self, _content: &str, _context: SettlementContext) -> Result<Trip, TripParseError> {
            Err(TripParseError::MissingHeader)
        }
    }

    static FIXED_PARSER: FixedTripParser = FixedTripParser;
    static FAILING_PARSER: FailingParser = FailingParser;

    #[fixture]
    fn processor() -> TripProcessor<'static> {
        TripProcessor::new(&FIXED_PARSER, SettlementContext::cents())
    }

    #[rstest]
    fn builds_before_and_after_snapshots(processor: TripProcessor<'static>) {
        let trip = processor.load_trip("ignored").expect("loads");
        let result = processor.build_settlement_result(&trip).expect("settles");

        assert_eq!(result.balances_before[0].id, ParticipantId(1));
        assert_eq!(result.balances_before[0].balance, Money::from_i64(-50));
        assert_eq!(
            result.transfers,
            vec![Transfer {
                from: ParticipantId(1),
                to: ParticipantId(0),
                amount: Money::from_i64(50),
            }]
        );
        assert!(result.is_settled());
        assert_eq!(result.balances_after.len(), 2);
    }

    #[test]
    fn parser_errors_are_propagated() {
        let processor = TripProcessor::new(&FAILING_PARSER, SettlementContext::cents());
        assert_eq!(
            processor.load_trip("").expect_err("fails"),
            TripParseError::MissingHeader
        );
    }

    #[test]
    fn trip_without_expenses_is_already_settled() {
        let registry = ParticipantRegistry::try_from_names(["A"]).expect("registry");
        let everyone: ParticipantGroup = registry.everyone();
        let trip = Trip::try_new("Solo", 2024, registry, everyone, Vec::new()).expect("trip");

        let result = TripProcessor::new(&FIXED_PARSER, SettlementContext::cents())
            .build_settlement_result(&trip)
            .expect("settles");
        assert!(result.transfers.is_empty());
        assert!(result.is_settled());
    }
}
