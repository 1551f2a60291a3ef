#![warn(clippy::uninlined_format_args)]

use std::str::FromStr;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till, take_while1},
    character::complete::{char, digit1, space1},
    combinator::{all_consuming, map_opt, map_res, opt, recognize},
    error::{Error, ErrorKind},
    multi::{many0, separated_list1},
    sequence::terminated,
};
use rust_decimal::Decimal;

/// Deepest parenthesis nesting accepted in a group expression.
pub const MAX_GROUP_NESTING: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum SetOp<'a> {
    Push(&'a str), // participant or group name
    Union,
    Difference,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SetExpr<'a> {
    ops: Vec<SetOp<'a>>,
}

impl<'a> SetExpr<'a> {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    fn push(&mut self, op: SetOp<'a>) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[SetOp<'a>] {
        &self.ops
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripHeader<'a> {
    pub label: &'a str,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MembersDeclaration<'a> {
    pub line: usize,
    pub names: Vec<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration<'a> {
    pub name: &'a str,
    pub expression: SetExpr<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense<'a> {
    pub payer: &'a str,
    pub amount: Decimal,
    pub beneficiaries: SetExpr<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'a> {
    Declaration(Declaration<'a>),
    Expense(Expense<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementWithLine<'a> {
    pub line: usize,
    pub statement: Statement<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripFile<'a> {
    pub header: TripHeader<'a>,
    pub members: MembersDeclaration<'a>,
    pub statements: Vec<StatementWithLine<'a>>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
    #[error("Missing `TRIP <label> <year>` header.")]
    MissingHeader,
    #[error("Missing `MEMBERS := ...` declaration.")]
    MissingMembersDeclaration,
    #[error("`{keyword}` declared a second time at line {line}.")]
    DuplicateDeclaration { keyword: &'static str, line: usize },
    #[error("Line {line} comes before the `MEMBERS := ...` declaration.")]
    MembersNotDeclared { line: usize },
}

enum Line<'a> {
    Header(TripHeader<'a>),
    Members(Vec<&'a str>),
    Statement(Statement<'a>),
}

fn sp(input: &str) -> IResult<&str, &str> {
    fn line_comment(input: &str) -> IResult<&str, &str> {
        recognize((tag("//"), take_till(|c| c == '\n'))).parse(input)
    }

    recognize(many0(alt((space1, line_comment)))).parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '\'').parse(input)
}

fn number(input: &str) -> IResult<&str, Decimal> {
    map_res(
        recognize((digit1, opt((char('.'), digit1)))),
        Decimal::from_str,
    )
    .parse(input)
}

// 97.68 * 5
fn amount(input: &str) -> IResult<&str, Decimal> {
    map_opt(
        (number, many0((sp, char('*'), sp, number))),
        |(first, factors)| {
            factors
                .into_iter()
                .try_fold(first, |acc, (_, _, _, factor)| acc.checked_mul(factor))
        },
    )
    .parse(input)
}

fn set_primary(input: &str, depth: usize) -> IResult<&str, SetExpr<'_>> {
    if input.starts_with('(') && depth >= MAX_GROUP_NESTING {
        return Err(nom::Err::Failure(Error::new(input, ErrorKind::TooLarge)));
    }

    alt((
        (char('('), sp, |i| set_expr_at(i, depth + 1), sp, char(')'))
            .map(|(_, _, expr, _, _)| expr),
        identifier.map(|name| {
            let mut expr = SetExpr::new();
            expr.push(SetOp::Push(name));
            expr
        }),
    ))
    .parse(input)
}

fn set_difference(input: &str, depth: usize) -> IResult<&str, SetExpr<'_>> {
    let primary = |i| set_primary(i, depth);
    (primary, many0((sp, char('-'), sp, primary)))
        .map(|(first, ops)| {
            ops.into_iter().fold(first, |mut acc, (_, _, _, right)| {
                acc.ops.extend(right.ops);
                acc.push(SetOp::Difference);
                acc
            })
        })
        .parse(input)
}

fn set_expr(input: &str) -> IResult<&str, SetExpr<'_>> {
    set_expr_at(input, 0)
}

// Parse union operations (lowest precedence)
fn set_expr_at(input: &str, depth: usize) -> IResult<&str, SetExpr<'_>> {
    let difference = |i| set_difference(i, depth);
    (difference, many0((sp, char(','), sp, difference)))
        .map(|(first, ops)| {
            ops.into_iter().fold(first, |mut acc, (_, _, _, right)| {
                acc.ops.extend(right.ops);
                acc.push(SetOp::Union);
                acc
            })
        })
        .parse(input)
}

// TRIP Lake Tahoe 2024
fn header(input: &str) -> IResult<&str, TripHeader<'_>> {
    (
        tag_no_case("TRIP"),
        space1,
        map_opt(
            recognize(separated_list1(space1, identifier)),
            split_label_and_year,
        ),
    )
        .map(|(_, _, header)| header)
        .parse(input)
}

// The last word is the year; everything before it is the label.
fn split_label_and_year(words: &str) -> Option<TripHeader<'_>> {
    let (label, year) = words.rsplit_once(|c: char| c == ' ' || c == '\t')?;
    Some(TripHeader {
        label: label.trim_end(),
        year: year.parse().ok()?,
    })
}

// MEMBERS := Ben, Elliot, Slava
fn members(input: &str) -> IResult<&str, Vec<&str>> {
    (
        tag("MEMBERS"),
        sp,
        tag(":="),
        sp,
        separated_list1((sp, char(','), sp), identifier),
    )
        .map(|(_, _, _, _, names)| names)
        .parse(input)
}

// crew := MEMBERS - (Slava, Greg)
fn declaration(input: &str) -> IResult<&str, Declaration<'_>> {
    (identifier, sp, tag(":="), sp, set_expr)
        .map(|(name, _, _, _, expression)| Declaration { name, expression })
        .parse(input)
}

// Ben paid 69.22 for crew
fn expense(input: &str) -> IResult<&str, Expense<'_>> {
    (
        identifier, // payer
        space1,
        tag_no_case("paid"),
        space1,
        amount,
        space1,
        tag_no_case("for"),
        space1,
        set_expr, // beneficiaries
    )
        .map(|(payer, _, _, _, amount, _, _, _, beneficiaries)| Expense {
            payer,
            amount,
            beneficiaries,
        })
        .parse(input)
}

fn line_item(input: &str) -> IResult<&str, Line<'_>> {
    alt((
        all_consuming(terminated(header, sp)).map(Line::Header),
        all_consuming(terminated(members, sp)).map(Line::Members),
        all_consuming(terminated(declaration, sp))
            .map(|decl| Line::Statement(Statement::Declaration(decl))),
        all_consuming(terminated(expense, sp))
            .map(|expense| Line::Statement(Statement::Expense(expense))),
    ))
    .parse(input)
}

fn syntax_error(line: usize, err: nom::Err<nom::error::Error<&str>>) -> ParseError {
    let detail = match err {
        nom::Err::Failure(e) if e.code == ErrorKind::TooLarge => {
            format!("group expression nested deeper than {MAX_GROUP_NESTING} levels")
        }
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let rest = e.input.trim();
            if rest.is_empty() {
                "unexpected end of line".to_string()
            } else {
                format!("unexpected input '{rest}'")
            }
        }
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    };
    ParseError::SyntaxError { line, detail }
}

/// Parses a whole trip file. Line numbers are 1-based.
pub fn parse_trip_file(input: &str) -> Result<TripFile<'_>, ParseError> {
    let mut header = None;
    let mut members_decl = None;
    let mut statements = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let (rest, _) = sp(raw).map_err(|e| syntax_error(line, e))?;
        if rest.is_empty() {
            continue;
        }

        let (_, item) = line_item(rest).map_err(|e| syntax_error(line, e))?;
        match item {
            Line::Header(parsed) => {
                if header.is_some() {
                    return Err(ParseError::DuplicateDeclaration {
                        keyword: "TRIP",
                        line,
                    });
                }
                header = Some(parsed);
            }
            Line::Members(names) => {
                if members_decl.is_some() {
                    return Err(ParseError::DuplicateDeclaration {
                        keyword: "MEMBERS",
                        line,
                    });
                }
                members_decl = Some(MembersDeclaration { line, names });
            }
            Line::Statement(statement) => {
                if members_decl.is_none() {
                    return Err(ParseError::MembersNotDeclared { line });
                }
                statements.push(StatementWithLine { line, statement });
            }
        }
    }

    Ok(TripFile {
        header: header.ok_or(ParseError::MissingHeader)?,
        members: members_decl.ok_or(ParseError::MissingMembersDeclaration)?,
        statements,
    })
}
