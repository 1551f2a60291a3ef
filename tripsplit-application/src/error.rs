use thiserror::Error;
use tripsplit_domain::{AtomicUnitConversionError, InvalidExpense, TripError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TripParseError {
    #[error("Syntax error at line {line}: {detail}")]
    Syntax { line: usize, detail: String },
    #[error("Missing `TRIP <label> <year>` header")]
    MissingHeader,
    #[error("Missing `MEMBERS := ...` declaration")]
    MissingMembersDeclaration,
    #[error("Line {line} comes before the `MEMBERS := ...` declaration")]
    MembersNotDeclared { line: usize },
    #[error("`{keyword}` declared a second time at line {line}")]
    DuplicateDeclaration { keyword: &'static str, line: usize },
    #[error("Undefined name '{name}' at line {line}")]
    UndefinedName { name: String, line: usize },
    #[error("Name '{name}' at line {line} is already taken")]
    NameConflict { name: String, line: usize },
    #[error("Payer '{name}' at line {line} is not a participant")]
    PayerIsNotParticipant { name: String, line: usize },
    #[error("Invalid expense at line {line}: {source}")]
    InvalidExpense {
        line: usize,
        #[source]
        source: InvalidExpense,
    },
    #[error("Amount at line {line} cannot be split: {source}")]
    Precision {
        line: usize,
        #[source]
        source: AtomicUnitConversionError,
    },
    #[error("Invalid participants at line {line}: {source}")]
    Participants {
        line: usize,
        #[source]
        source: TripError,
    },
    #[error(transparent)]
    Trip(#[from] TripError),
}
