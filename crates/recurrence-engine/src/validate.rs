//! Structural validation of recurrence rules.
//!
//! Validation runs before any date math. Checks run in a fixed order (presence,
//! type, interval, day) and stop at the first failure, so an invalid rule carries
//! exactly one [`RuleError`].

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RuleError;
use crate::rule::{RecurrenceRule, RecurrenceType};

/// Accepted interval values for every type.
pub const INTERVAL_RANGE: RangeInclusive<i64> = 1..=10_000;

/// Accepted `Day` values for [`RecurrenceType::Weeks`] (0 = first day of the week).
pub const WEEK_DAY_RANGE: RangeInclusive<i64> = 0..=6;

/// Accepted `Day` values for [`RecurrenceType::Months`].
pub const MONTH_DAY_RANGE: RangeInclusive<i64> = 1..=31;

/// Wire-shaped validation report: `{"Success": bool, "ErrorMessage"?: string}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    #[serde(rename = "Success")]
    pub success: bool,
    #[serde(
        rename = "ErrorMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
}

impl From<Result<(), RuleError>> for ValidationOutcome {
    fn from(result: Result<(), RuleError>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                error_message: None,
            },
            Err(e) => Self {
                success: false,
                error_message: Some(e.to_string()),
            },
        }
    }
}

/// Validate a possibly-absent rule and report the outcome as data.
///
/// # Examples
///
/// ```
/// use recurrence_engine::{validate, RecurrenceRule, RecurrenceType};
///
/// assert!(validate(Some(&RecurrenceRule::every(RecurrenceType::Hours, 3))).success);
///
/// let outcome = validate(None);
/// assert!(!outcome.success);
/// assert_eq!(outcome.error_message.as_deref(), Some("Recurrence is required."));
/// ```
pub fn validate(rule: Option<&RecurrenceRule>) -> ValidationOutcome {
    rule.map_or(Err(RuleError::MissingRule), RecurrenceRule::validate)
        .into()
}

/// Validate a rule in its JSON wire form.
///
/// The rule is checked field by field before any typing, so every well-formed JSON
/// document yields an outcome:
///
/// - `null` is an absent rule.
/// - A missing or non-integer `Type` is an invalid type; so is a document that is
///   not an object.
/// - A non-integer `Interval` is out of range. A missing or `null` one is absent.
/// - A non-integer `Day` counts as absent, which weekly and monthly rules reject.
///
/// Integral floats such as `3.0` count as integers.
///
/// # Errors
///
/// Returns the parse error only if `json` is not valid JSON.
pub fn validate_json(json: &str) -> Result<ValidationOutcome, serde_json::Error> {
    let value: Value = serde_json::from_str(json)?;
    Ok(check_wire(&value).into())
}

fn check_wire(value: &Value) -> Result<(), RuleError> {
    if value.is_null() {
        return Err(RuleError::MissingRule);
    }
    let kind = field(value, "Type")
        .and_then(as_integer)
        .ok_or(RuleError::InvalidType(None))?;
    RecurrenceType::try_from(kind)?;
    let interval = field(value, "Interval")
        .map(|v| as_integer(v).ok_or(RuleError::IntervalRange(None)))
        .transpose()?;
    let day = field(value, "Day").and_then(as_integer);

    RecurrenceRule::from_parts(kind, interval, day).map(|_| ())
}

/// A present, non-null member of `value`.
fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.get(name).filter(|v| !v.is_null())
}

/// The integer a JSON value denotes, if any.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    // 2^63 is exact as an f64; anything at or past it does not fit.
    let fits = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && fits).then_some(f as i64)
}

impl RecurrenceRule {
    /// Check the rule's structural invariants.
    ///
    /// # Errors
    ///
    /// - [`RuleError::IntervalRequired`] if the interval is absent on anything but `Once`.
    /// - [`RuleError::IntervalRange`] if a present interval is outside [`INTERVAL_RANGE`].
    /// - [`RuleError::DayRangeWeek`] / [`RuleError::DayRangeMonth`] if a weekly or
    ///   monthly rule has no day or one outside its range. Other types ignore `Day`.
    pub fn validate(&self) -> Result<(), RuleError> {
        match self.interval() {
            None if self.kind() != RecurrenceType::Once => {
                return Err(RuleError::IntervalRequired);
            }
            Some(interval) if !INTERVAL_RANGE.contains(&interval) => {
                return Err(RuleError::IntervalRange(Some(interval)));
            }
            _ => {}
        }

        let day = self.day();
        match self.kind() {
            RecurrenceType::Weeks if !day.is_some_and(|d| WEEK_DAY_RANGE.contains(&d)) => {
                Err(RuleError::DayRangeWeek(day))
            }
            RecurrenceType::Months if !day.is_some_and(|d| MONTH_DAY_RANGE.contains(&d)) => {
                Err(RuleError::DayRangeMonth(day))
            }
            _ => Ok(()),
        }
    }

    /// Build a checked rule from raw wire integers.
    ///
    /// # Errors
    ///
    /// [`RuleError::InvalidType`] unless `kind` is in `0..6`, then anything
    /// [`RecurrenceRule::validate`] reports.
    pub fn from_parts(kind: i64, interval: Option<i64>, day: Option<i64>) -> Result<Self, RuleError> {
        let kind = RecurrenceType::try_from(kind)?;
        let rule = Self::new(kind, interval, day);
        rule.validate()?;
        Ok(rule)
    }
}
