//! Recurrence rules.
//!
//! A [`RecurrenceRule`] is an immutable value object: a [`RecurrenceType`], an
//! optional interval and an optional day. Rules travel over the wire as JSON objects
//! with PascalCase keys and the type as its integer ordinal:
//!
//! ```
//! use recurrence_engine::{RecurrenceRule, RecurrenceType};
//!
//! let rule = RecurrenceRule::from_json(r#"{"Type": 4, "Interval": 6, "Day": 3}"#).unwrap();
//! assert_eq!(rule.kind(), RecurrenceType::Weeks);
//! assert_eq!(rule.interval(), Some(6));
//! assert_eq!(rule.day(), Some(3));
//! ```
//!
//! Constructing a rule performs no checks; see [`crate::validate`].

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::RuleError;

// ── RecurrenceType ──────────────────────────────────────────────────────────

/// How often a job recurs. The ordinals are part of the external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum RecurrenceType {
    /// A single execution, no interval.
    Once = 0,
    Minutes = 1,
    Hours = 2,
    Days = 3,
    Weeks = 4,
    Months = 5,
}

impl RecurrenceType {
    /// Every recurrence type, in ordinal order.
    pub const ALL: [RecurrenceType; 6] = [
        RecurrenceType::Once,
        RecurrenceType::Minutes,
        RecurrenceType::Hours,
        RecurrenceType::Days,
        RecurrenceType::Weeks,
        RecurrenceType::Months,
    ];

    /// The integer this type is serialized as.
    pub fn ordinal(self) -> i64 {
        self as i64
    }

    /// Display name, e.g. `"Minutes"`.
    pub fn name(self) -> &'static str {
        match self {
            RecurrenceType::Once => "Once",
            RecurrenceType::Minutes => "Minutes",
            RecurrenceType::Hours => "Hours",
            RecurrenceType::Days => "Days",
            RecurrenceType::Weeks => "Weeks",
            RecurrenceType::Months => "Months",
        }
    }

    /// The calendar unit one interval is counted in. `Once` has none.
    pub fn unit(self) -> Option<TimeUnit> {
        match self {
            RecurrenceType::Once => None,
            RecurrenceType::Minutes => Some(TimeUnit::Minute),
            RecurrenceType::Hours => Some(TimeUnit::Hour),
            RecurrenceType::Days => Some(TimeUnit::Day),
            RecurrenceType::Weeks => Some(TimeUnit::Week),
            RecurrenceType::Months => Some(TimeUnit::Month),
        }
    }
}

impl TryFrom<i64> for RecurrenceType {
    type Error = RuleError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RecurrenceType::Once),
            1 => Ok(RecurrenceType::Minutes),
            2 => Ok(RecurrenceType::Hours),
            3 => Ok(RecurrenceType::Days),
            4 => Ok(RecurrenceType::Weeks),
            5 => Ok(RecurrenceType::Months),
            other => Err(RuleError::InvalidType(Some(other))),
        }
    }
}

impl From<RecurrenceType> for i64 {
    fn from(kind: RecurrenceType) -> i64 {
        kind.ordinal()
    }
}

impl fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── TimeUnit ────────────────────────────────────────────────────────────────

/// Calendar unit an interval is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl TimeUnit {
    /// Exact length of one unit on a local calendar clock. Months vary, so `None`.
    pub fn fixed_width(self) -> Option<Duration> {
        match self {
            TimeUnit::Minute => Some(Duration::minutes(1)),
            TimeUnit::Hour => Some(Duration::hours(1)),
            TimeUnit::Day => Some(Duration::days(1)),
            TimeUnit::Week => Some(Duration::weeks(1)),
            TimeUnit::Month => None,
        }
    }
}

// ── RecurrenceRule ──────────────────────────────────────────────────────────

/// A declarative recurrence rule such as "every 6 weeks on Wednesday".
///
/// `interval` and `day` are kept as raw integers so out-of-range input survives
/// until validation can report on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecurrenceRule {
    #[serde(rename = "Type")]
    kind: RecurrenceType,
    #[serde(rename = "Interval", default, skip_serializing_if = "Option::is_none")]
    interval: Option<i64>,
    #[serde(rename = "Day", default, skip_serializing_if = "Option::is_none")]
    day: Option<i64>,
}

impl RecurrenceRule {
    /// Build a rule from its parts without checking them.
    pub fn new(kind: RecurrenceType, interval: Option<i64>, day: Option<i64>) -> Self {
        Self {
            kind,
            interval,
            day,
        }
    }

    /// A single execution.
    pub fn once() -> Self {
        Self::new(RecurrenceType::Once, None, None)
    }

    /// Every `interval` minutes, hours or days (or weeks/months with no day set).
    pub fn every(kind: RecurrenceType, interval: i64) -> Self {
        Self::new(kind, Some(interval), None)
    }

    /// Every `interval` weeks on day `day` of the week (0 = first day of the week).
    pub fn weekly(interval: i64, day: i64) -> Self {
        Self::new(RecurrenceType::Weeks, Some(interval), Some(day))
    }

    /// Every `interval` months on day-of-month `day`.
    pub fn monthly(interval: i64, day: i64) -> Self {
        Self::new(RecurrenceType::Months, Some(interval), Some(day))
    }

    /// Parse a rule from its JSON wire form.
    ///
    /// An out-of-range `Type` is rejected here with the [`RuleError::InvalidType`]
    /// message; every other check is left to [`RecurrenceRule::validate`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn kind(&self) -> RecurrenceType {
        self.kind
    }

    pub fn interval(&self) -> Option<i64> {
        self.interval
    }

    pub fn day(&self) -> Option<i64> {
        self.day
    }
}

/// Renders the JSON wire form.
impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
