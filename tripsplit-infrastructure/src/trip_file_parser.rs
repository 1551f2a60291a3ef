use tripsplit_application::{TripParseError, TripParser};
use tripsplit_domain::{
    Expense, MemberSetExpr, MemberSetOp, MemberSetResolver, Money, ParticipantRegistry,
    SettlementContext, Trip,
};
use tripsplit_parser::{
    ParseError, SetExpr, SetOp, Statement as ParserStatement, StatementWithLine, TripFile,
    parse_trip_file,
};

/// Group that every trip file defines implicitly through `MEMBERS := ...`.
const MEMBERS_GROUP: &str = "MEMBERS";

#[derive(Default)]
pub struct TripFileParser;

impl TripParser for TripFileParser {
    fn parse(&self, content: &str, context: SettlementContext) -> Result<Trip, TripParseError> {
        let TripFile {
            header,
            members,
            statements,
        } = parse_trip_file(content).map_err(map_parse_error)?;

        if members.names.contains(&MEMBERS_GROUP) {
            return Err(TripParseError::NameConflict {
                name: MEMBERS_GROUP.to_string(),
                line: members.line,
            });
        }
        let registry = ParticipantRegistry::try_from_names(members.names.iter().copied())
            .map_err(|source| TripParseError::Participants {
                line: members.line,
                source,
            })?;
        let everyone = registry.everyone();

        let mut resolver = MemberSetResolver::new();
        resolver.register_group(MEMBERS_GROUP, everyone.clone());

        let mut expenses = Vec::with_capacity(statements.len());
        for StatementWithLine { line, statement } in statements {
            match statement {
                ParserStatement::Declaration(decl) => {
                    if registry.find(decl.name).is_some() || resolver.is_group_defined(decl.name) {
                        return Err(TripParseError::NameConflict {
                            name: decl.name.to_string(),
                            line,
                        });
                    }
                    let expression =
                        to_member_set_expr(&decl.expression, &registry, &resolver, line)?;
                    let group = resolver
                        .evaluate_and_register_group(decl.name, &expression)
                        .ok_or_else(|| malformed_expression(line))?;
                    tracing::debug!(
                        line,
                        group = decl.name,
                        member_count = group.len(),
                        "Declared group"
                    );
                }
                ParserStatement::Expense(parsed) => {
                    let payer = registry.find(parsed.payer).ok_or_else(|| {
                        if resolver.is_group_defined(parsed.payer) {
                            TripParseError::PayerIsNotParticipant {
                                name: parsed.payer.to_string(),
                                line,
                            }
                        } else {
                            TripParseError::UndefinedName {
                                name: parsed.payer.to_string(),
                                line,
                            }
                        }
                    })?;
                    let expression =
                        to_member_set_expr(&parsed.beneficiaries, &registry, &resolver, line)?;
                    let beneficiaries = resolver
                        .evaluate_members(&expression)
                        .ok_or_else(|| malformed_expression(line))?;

                    let amount = Money::from_decimal(parsed.amount);
                    context
                        .to_atomic_units_i64(amount)
                        .map_err(|source| TripParseError::Precision { line, source })?;
                    let expense = Expense::try_new(amount, payer, beneficiaries)
                        .map_err(|source| TripParseError::InvalidExpense { line, source })?;

                    tracing::debug!(
                        line,
                        payer = parsed.payer,
                        amount = %amount,
                        beneficiary_count = expense.beneficiaries().len(),
                        "Parsed expense"
                    );
                    expenses.push(expense);
                }
            }
        }

        Ok(Trip::try_with_context(
            header.label,
            header.year,
            registry,
            everyone,
            expenses,
            context,
        )?)
    }
}

/// Participant names win over group names; anything else is undefined.
fn to_member_set_expr<'a>(
    expr: &SetExpr<'a>,
    registry: &ParticipantRegistry,
    resolver: &MemberSetResolver<'_>,
    line: usize,
) -> Result<MemberSetExpr<'a>, TripParseError> {
    let ops = expr
        .ops()
        .iter()
        .map(|op| match op {
            SetOp::Push(name) => match registry.find(name) {
                Some(id) => Ok(MemberSetOp::Push(id)),
                None if resolver.is_group_defined(name) => Ok(MemberSetOp::PushGroup(name)),
                None => Err(TripParseError::UndefinedName {
                    name: (*name).to_string(),
                    line,
                }),
            },
            SetOp::Union => Ok(MemberSetOp::Union),
            SetOp::Difference => Ok(MemberSetOp::Difference),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MemberSetExpr::new(ops))
}

fn malformed_expression(line: usize) -> TripParseError {
    TripParseError::Syntax {
        line,
        detail: "malformed group expression".to_string(),
    }
}

fn map_parse_error(err: ParseError) -> TripParseError {
    match err {
        ParseError::SyntaxError { line, detail } => TripParseError::Syntax { line, detail },
        ParseError::MissingHeader => TripParseError::MissingHeader,
        ParseError::MissingMembersDeclaration => TripParseError::MissingMembersDeclaration,
        ParseError::DuplicateDeclaration { keyword, line } => {
            TripParseError::DuplicateDeclaration { keyword, line }
        }
        ParseError::MembersNotDeclared { line } => TripParseError::MembersNotDeclared { line },
    }
}
