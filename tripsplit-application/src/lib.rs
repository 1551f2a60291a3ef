#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod trip_processor;

pub use error::TripParseError;
pub use model::SettlementResult;
pub use ports::{MemberDirectory, TripParser};
pub use trip_processor::TripProcessor;
