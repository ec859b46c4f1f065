//! Error types for recurrence-engine operations.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Structural problems found while validating a [`RecurrenceRule`](crate::RecurrenceRule).
///
/// A rule carries at most one of these: validation stops at the first failed check.
/// Variants hold the offending value, or `None` when it was absent or not an integer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Recurrence is required.")]
    MissingRule,

    #[error("Invalid recurrence type.")]
    InvalidType(Option<i64>),

    #[error("Interval is required for this type.")]
    IntervalRequired,

    #[error("Invalid \"Interval\" value - it must be an integer in the range from 1 to 10000")]
    IntervalRange(Option<i64>),

    #[error("Invalid \"Day\" value - it must be an integer in the range from 0 to 6")]
    DayRangeWeek(Option<i64>),

    #[error("Invalid \"Day\" value - it must be an integer in the range from 1 to 31")]
    DayRangeMonth(Option<i64>),
}

/// Failures of occurrence resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Cannot calculate next on an invalid recurrence. {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Cannot calculate next time for: {rule} with start date {start}")]
    Unschedulable { rule: String, start: NaiveDateTime },

    #[error("cannot schedule a once execution in the past")]
    PastOnceSchedule,

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid end type: {0}")]
    InvalidEndType(i64),
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;
