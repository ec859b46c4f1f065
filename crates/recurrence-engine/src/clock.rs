//! Sources of "now".
//!
//! Resolution reads the current time exactly once per call through a [`Clock`].
//! Production code uses [`SystemClock`]; tests freeze time with [`FixedClock`] or
//! pass any `Fn() -> NaiveDateTime` closure.

use chrono::{Local, NaiveDateTime};

use crate::error::{RecurrenceError, Result};

/// Formats accepted by [`parse_datetime`], tried in order.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A readable source of the current local calendar time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The machine's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDateTime + Send + Sync,
{
    fn now(&self) -> NaiveDateTime {
        self()
    }
}

/// Parse a local calendar time such as `2015-09-23T10:30` or `2015-09-23 10:30:00`.
///
/// # Errors
///
/// Returns [`RecurrenceError::InvalidDatetime`] if no accepted format matches.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .ok_or_else(|| RecurrenceError::InvalidDatetime(format!("'{s}'")))
}
