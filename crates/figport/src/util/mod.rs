//! Utility modules for figport.

pub mod datetime;

pub use datetime::{DateTimeParseError, format_datetime_iso8601, parse_datetime_iso8601};
