#![warn(clippy::uninlined_format_args)]

pub mod trip_file_parser;

pub use trip_file_parser::TripFileParser;
