//! Utility modules.

pub mod datetime;

pub use datetime::{parse_timestamp, DateTimeParseError, Timestamp};
