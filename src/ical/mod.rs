//! This module handles conversion between iCal files and [`Task`](crate::Task)s
//!
//! Parsing and generating both go through the `ical` crate, so that the properties and components this crate does not know about are kept as is when a task is saved back.

mod parser;
pub use parser::parse;
mod builder;
pub use builder::build_completed;

use chrono::{DateTime, Utc};

/// Format a timestamp the way iCal expects UTC date-times
pub fn format_date_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}
