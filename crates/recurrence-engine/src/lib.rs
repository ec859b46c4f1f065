//! # recurrence-engine
//!
//! Deterministic next-occurrence computation for recurring jobs.
//!
//! Given a simple recurrence rule ("every 3 hours", "every 6 weeks on Wednesday",
//! "every month on the 31st", "once"), a reference "now" and an anchor, the engine
//! computes when the rule fires next, handling month-end overflow, weekday and
//! day-of-month matching, past-date catch-up and single executions. It never runs
//! jobs and holds no state beyond an injectable clock.
//!
//! ## Modules
//!
//! - [`rule`]: Recurrence types, their calendar units, and the rule value object
//! - [`validate`]: Structural rule validation
//! - [`resolve`]: First- and next-occurrence resolution, resolver options
//! - [`clock`]: Injectable sources of "now"
//! - [`describe`]: Human-readable job descriptions
//! - [`error`]: Error types

pub mod clock;
pub mod describe;
pub mod error;
pub mod resolve;
pub mod rule;
pub mod validate;

pub use clock::{parse_datetime, Clock, FixedClock, SystemClock};
pub use describe::{describe, DayNames, EndType, EndValue, English, Job};
pub use error::{RecurrenceError, RuleError};
pub use resolve::{
    resolve_first, resolve_next, truncate_to_minute, Resolver, ResolverOptions, WeekStartDay,
    DAY_SCAN_LIMIT, STEP_LIMIT,
};
pub use rule::{RecurrenceRule, RecurrenceType, TimeUnit};
pub use validate::{validate, validate_json, ValidationOutcome};
