//! Human-readable job descriptions.
//!
//! Renders a [`Job`] (rule, start, end condition) as a sentence such as
//! `"Every 5 minutes from Today, 8:20, until 8/9/2015"` or
//! `"Single execution scheduled for Today 9:29"`. Dates use `D/M/YYYY`, times a
//! 12-hour `h:mm` clock. Weekday and ordinal names come from a [`DayNames`]
//! implementation so other locales can be plugged in.

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::RecurrenceError;
use crate::resolve::WeekStartDay;
use crate::rule::{RecurrenceRule, RecurrenceType};

const NOT_SET: &str = "Not set";
const DATE_FORMAT: &str = "%-d/%-m/%Y";
const TIME_FORMAT: &str = "%-I:%M";

// ── Job ─────────────────────────────────────────────────────────────────────

/// How a job's schedule ends. Serialized as its ordinal (1–3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum EndType {
    #[default]
    Unlimited = 1,
    NumberOfOccurrences = 2,
    EndDate = 3,
}

impl TryFrom<i64> for EndType {
    type Error = RecurrenceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EndType::Unlimited),
            2 => Ok(EndType::NumberOfOccurrences),
            3 => Ok(EndType::EndDate),
            other => Err(RecurrenceError::InvalidEndType(other)),
        }
    }
}

impl From<EndType> for i64 {
    fn from(end_type: EndType) -> i64 {
        end_type as i64
    }
}

/// The value paired with an [`EndType`]: a count or a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndValue {
    Occurrences(u32),
    Date(NaiveDateTime),
}

/// A scheduled job as seen by the description renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "Recurrence")]
    pub recurrence: RecurrenceRule,
    #[serde(rename = "StartDate", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(rename = "EndType", default)]
    pub end_type: EndType,
    #[serde(rename = "EndValue", default, skip_serializing_if = "Option::is_none")]
    pub end_value: Option<EndValue>,
}

impl Job {
    /// A job starting at `start_date` with no end.
    pub fn new(recurrence: RecurrenceRule, start_date: Option<NaiveDateTime>) -> Self {
        Self {
            recurrence,
            start_date,
            end_type: EndType::Unlimited,
            end_value: None,
        }
    }

    /// End the job on `date`.
    pub fn until(mut self, date: NaiveDateTime) -> Self {
        self.end_type = EndType::EndDate;
        self.end_value = Some(EndValue::Date(date));
        self
    }

    /// End the job after `count` executions.
    pub fn occurrences(mut self, count: u32) -> Self {
        self.end_type = EndType::NumberOfOccurrences;
        self.end_value = Some(EndValue::Occurrences(count));
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ── Day names ───────────────────────────────────────────────────────────────

/// Locale-specific names used in descriptions.
pub trait DayNames {
    /// Abbreviated weekday name, e.g. `"Wed"`.
    fn weekday_short(&self, weekday: Weekday) -> String;

    /// Day of month as an ordinal, e.g. `"31st"`.
    fn ordinal(&self, day: u32) -> String;
}

/// English day names.
#[derive(Debug, Clone, Copy, Default)]
pub struct English;

impl DayNames for English {
    fn weekday_short(&self, weekday: Weekday) -> String {
        let name = match weekday {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        };
        name.to_string()
    }

    fn ordinal(&self, day: u32) -> String {
        let suffix = match (day % 100, day % 10) {
            (11..=13, _) => "th",
            (_, 1) => "st",
            (_, 2) => "nd",
            (_, 3) => "rd",
            _ => "th",
        };
        format!("{day}{suffix}")
    }
}

// ── describe ────────────────────────────────────────────────────────────────

/// Describe `job` as a sentence.
///
/// `today` decides whether the start renders as `Today` plus a time or as a date;
/// `week_start` maps a weekly rule's `Day` to a weekday.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use recurrence_engine::{describe, English, Job, RecurrenceRule, RecurrenceType, WeekStartDay};
///
/// let today = NaiveDate::from_ymd_opt(2015, 9, 23).unwrap();
/// let job = Job::new(
///     RecurrenceRule::every(RecurrenceType::Minutes, 5),
///     Some(today.and_hms_opt(8, 20, 0).unwrap()),
/// )
/// .until(NaiveDate::from_ymd_opt(2015, 9, 8).unwrap().and_hms_opt(0, 0, 0).unwrap());
///
/// assert_eq!(
///     describe(&job, today, WeekStartDay::Sunday, &English),
///     "Every 5 minutes from Today, 8:20, until 8/9/2015"
/// );
/// ```
pub fn describe(
    job: &Job,
    today: NaiveDate,
    week_start: WeekStartDay,
    names: &dyn DayNames,
) -> String {
    let rule = &job.recurrence;
    let mut words: Vec<String> = Vec::new();

    match rule.kind() {
        RecurrenceType::Once => {
            words.push("Single execution scheduled for".to_string());
            push_start(&mut words, job.start_date, today, false);
        }
        kind => {
            words.push("Every".to_string());
            words.push(
                rule.interval()
                    .map_or_else(|| NOT_SET.to_string(), |i| i.to_string()),
            );
            words.push(kind.name().to_lowercase());
            words.push("from".to_string());
            push_start(&mut words, job.start_date, today, true);

            if job.start_date.is_some()
                && matches!(kind, RecurrenceType::Weeks | RecurrenceType::Months)
            {
                words.push("on".to_string());
                words.push(format!("{},", day_name(rule, week_start, names)));
            }

            words.push(end_clause(job));
        }
    }

    words.join(" ")
}

/// `Today, 8:20,` (recurring) / `Today 9:29` (once) / `D/M/YYYY` / `Not set`.
fn push_start(
    words: &mut Vec<String>,
    start: Option<NaiveDateTime>,
    today: NaiveDate,
    commas: bool,
) {
    let Some(start) = start else {
        words.push(NOT_SET.to_string());
        return;
    };

    if start.date() == today {
        let comma = if commas { "," } else { "" };
        words.push(format!("Today{comma}"));
        words.push(format!("{}{comma}", start.format(TIME_FORMAT)));
    } else {
        words.push(start.format(DATE_FORMAT).to_string());
    }
}

fn day_name(rule: &RecurrenceRule, week_start: WeekStartDay, names: &dyn DayNames) -> String {
    let Some(day) = rule.day().and_then(|d| u32::try_from(d).ok()) else {
        return NOT_SET.to_string();
    };
    match rule.kind() {
        RecurrenceType::Months => names.ordinal(day),
        _ => names.weekday_short(week_start.weekday(day)),
    }
}

fn end_clause(job: &Job) -> String {
    match (job.end_type, job.end_value) {
        (EndType::EndDate, Some(EndValue::Date(end))) => {
            format!("until {}", end.format(DATE_FORMAT))
        }
        (EndType::NumberOfOccurrences, Some(EndValue::Occurrences(count))) => {
            format!(
                "for {} occurrence{}",
                count,
                if count == 1 { "" } else { "s" }
            )
        }
        _ => format!("until {NOT_SET}"),
    }
}
