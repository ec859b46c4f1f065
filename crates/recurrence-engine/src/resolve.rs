//! Occurrence resolution.
//!
//! Given a validated [`RecurrenceRule`] and a reference "now", computes when the
//! rule fires next. All times are naive local calendar times; the caller owns the
//! clock and any timezone interpretation.
//!
//! Two entry points, each available as a pure function taking `now` explicitly and
//! as a method on [`Resolver`], which reads `now` from an injected [`Clock`]:
//!
//! - [`resolve_first`]: anchor a new schedule: start of the anchor's day plus a
//!   minute offset, then scan day by day for the rule's weekday or day-of-month.
//! - [`resolve_next`]: advance a previous fire time by whole intervals until it
//!   is no longer in the past.
//!
//! Every returned instant is truncated to the minute.
//!
//! # Search bounds
//!
//! Both searches are bounded. The day scan gives up after
//! [`ResolverOptions::day_scan_limit`] day-steps and interval stepping after
//! [`ResolverOptions::step_limit`] intervals, failing with
//! [`RecurrenceError::Unschedulable`]. Under the default options only an anchor or
//! previous fire time far in the past reaches either bound.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::clock::{Clock, SystemClock};
use crate::describe::{describe, DayNames, English, Job};
use crate::error::{RecurrenceError, Result, RuleError};
use crate::rule::{RecurrenceRule, RecurrenceType};

/// Default number of day-steps [`resolve_first`] may take.
pub const DAY_SCAN_LIMIT: u32 = 5_000;

/// Default number of intervals [`resolve_next`] may step. Covers centuries of
/// one-minute stepping.
pub const STEP_LIMIT: u64 = 100_000_000;

// ── Configurable week start ─────────────────────────────────────────────────

/// Which weekday a weekly rule's `Day = 0` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekStartDay {
    /// US convention: 0 = Sunday, 3 = Wednesday.
    #[default]
    Sunday,
    /// ISO 8601: 0 = Monday.
    Monday,
}

impl WeekStartDay {
    /// How many days `weekday` is from the week-start day.
    pub fn days_from_start(self, weekday: Weekday) -> u32 {
        match self {
            WeekStartDay::Monday => weekday.num_days_from_monday(),
            WeekStartDay::Sunday => weekday.num_days_from_sunday(),
        }
    }

    /// The weekday numbered `day` in a week starting on `self` (taken modulo 7).
    pub fn weekday(self, day: u32) -> Weekday {
        let first = match self {
            WeekStartDay::Monday => Weekday::Mon,
            WeekStartDay::Sunday => Weekday::Sun,
        };
        (0..day % 7).fold(first, |weekday, _| weekday.succ())
    }
}

/// Options for [`resolve_first`], [`resolve_next`] and [`Resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Which weekday `Day = 0` denotes for weekly rules.
    pub week_start: WeekStartDay,
    /// Day-steps allowed while anchoring a weekly or monthly rule.
    pub day_scan_limit: u32,
    /// Interval steps allowed while advancing past "now".
    pub step_limit: u64,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            week_start: WeekStartDay::default(),
            day_scan_limit: DAY_SCAN_LIMIT,
            step_limit: STEP_LIMIT,
        }
    }
}

// ── resolve_first ───────────────────────────────────────────────────────────

/// Compute the first occurrence of `rule` for a schedule anchored on `anchor`'s day.
///
/// The candidate is midnight of `anchor`'s calendar day plus `minute_of_day`
/// minutes. Weekly rules then move forward a day at a time until the weekday equals
/// `Day` and the candidate is not before `now`; monthly rules do the same with the
/// day of month, so a `Day` a month lacks (31 in April) skips that month entirely.
/// Minute, hour and day rules accept the candidate as is, even when it is past.
///
/// # Errors
///
/// - [`RecurrenceError::InvalidRule`] if the rule fails validation.
/// - [`RecurrenceError::PastOnceSchedule`] if a `Once` rule's candidate is not
///   strictly after `now`.
/// - [`RecurrenceError::Unschedulable`] if the day scan exceeds
///   [`ResolverOptions::day_scan_limit`].
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use recurrence_engine::{resolve_first, RecurrenceRule, ResolverOptions};
///
/// let now = NaiveDate::from_ymd_opt(2015, 9, 23).unwrap().and_hms_opt(10, 30, 0).unwrap();
/// let anchor = NaiveDate::from_ymd_opt(2015, 10, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// // Every month on the 31st, at 08:00
/// let rule = RecurrenceRule::monthly(1, 31);
/// let first = resolve_first(&rule, anchor, 8 * 60, now, &ResolverOptions::default()).unwrap();
/// assert_eq!(first.to_string(), "2015-10-31 08:00:00");
/// ```
pub fn resolve_first(
    rule: &RecurrenceRule,
    anchor: NaiveDateTime,
    minute_of_day: u32,
    now: NaiveDateTime,
    options: &ResolverOptions,
) -> Result<NaiveDateTime> {
    rule.validate()?;

    let start = anchor
        .date()
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::minutes(i64::from(minute_of_day)))
        .map(truncate_to_minute)
        .ok_or_else(|| unschedulable(rule, anchor))?;

    match rule.kind() {
        RecurrenceType::Once if start <= now => Err(RecurrenceError::PastOnceSchedule),
        RecurrenceType::Once
        | RecurrenceType::Minutes
        | RecurrenceType::Hours
        | RecurrenceType::Days => Ok(start),
        RecurrenceType::Weeks => {
            let day = target_day(rule)?;
            scan_days(rule, start, now, options.day_scan_limit, |candidate| {
                options.week_start.days_from_start(candidate.weekday()) == day
            })
        }
        RecurrenceType::Months => {
            let day = target_day(rule)?;
            scan_days(rule, start, now, options.day_scan_limit, |candidate| {
                candidate.day() == day
            })
        }
    }
}

/// Step forward one day at a time until `is_match` holds on a candidate not before `now`.
fn scan_days(
    rule: &RecurrenceRule,
    start: NaiveDateTime,
    now: NaiveDateTime,
    limit: u32,
    is_match: impl Fn(&NaiveDateTime) -> bool,
) -> Result<NaiveDateTime> {
    let mut candidate = start;
    let mut steps = 0;
    loop {
        if candidate >= now && is_match(&candidate) {
            return Ok(candidate);
        }
        if steps == limit {
            return Err(unschedulable(rule, start));
        }
        candidate = candidate
            .checked_add_signed(Duration::days(1))
            .ok_or_else(|| unschedulable(rule, start))?;
        steps += 1;
    }
}

// ── resolve_next ────────────────────────────────────────────────────────────

/// Compute the occurrence following `previous`.
///
/// `previous` is first truncated to the minute. A `Once` rule never advances: it
/// returns `previous`, or `now` when `previous` is overdue. Every other rule returns
/// `previous + k × Interval` for the smallest `k ≥ 1` that is not before `now`, so a
/// previous fire time equal to `now` moves one full interval ahead.
///
/// Month steps add `Interval` calendar months and land on the rule's `Day`, clamped
/// to the last day of the resulting month: the 31st runs Oct 31, Nov 30, Dec 31.
///
/// # Errors
///
/// - [`RecurrenceError::InvalidRule`] if the rule fails validation.
/// - [`RecurrenceError::Unschedulable`] if more than [`ResolverOptions::step_limit`]
///   intervals are needed, or the result leaves the representable calendar.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use recurrence_engine::{resolve_next, RecurrenceRule, RecurrenceType, ResolverOptions};
///
/// let day = NaiveDate::from_ymd_opt(2015, 9, 23).unwrap();
/// let now = day.and_hms_opt(10, 30, 0).unwrap();
/// let rule = RecurrenceRule::every(RecurrenceType::Hours, 3);
///
/// let next = resolve_next(&rule, day.and_hms_opt(18, 25, 0).unwrap(), now, &ResolverOptions::default()).unwrap();
/// assert_eq!(next, day.and_hms_opt(21, 25, 0).unwrap());
/// ```
pub fn resolve_next(
    rule: &RecurrenceRule,
    previous: NaiveDateTime,
    now: NaiveDateTime,
    options: &ResolverOptions,
) -> Result<NaiveDateTime> {
    rule.validate()?;

    let previous = truncate_to_minute(previous);
    let Some(unit) = rule.kind().unit() else {
        return Ok(if previous < now {
            truncate_to_minute(now)
        } else {
            previous
        });
    };

    let interval = rule.interval().ok_or(RuleError::IntervalRequired)?;
    match unit.fixed_width() {
        Some(width) => {
            let step = width * interval_i32(interval)?;
            advance_fixed(rule, previous, now, step, options.step_limit)
        }
        None => {
            let months =
                u32::try_from(interval).map_err(|_| RuleError::IntervalRange(Some(interval)))?;
            let day = target_day(rule)?;
            advance_months(rule, previous, now, months, day, options.step_limit)
        }
    }
}

/// Fixed-width stepping: the step count is computed directly instead of iterated.
fn advance_fixed(
    rule: &RecurrenceRule,
    previous: NaiveDateTime,
    now: NaiveDateTime,
    step: Duration,
    limit: u64,
) -> Result<NaiveDateTime> {
    let step_seconds = step.num_seconds();
    let behind = now.signed_duration_since(previous).num_seconds();

    // `behind` is truncated toward zero, so this undershoots by at most one step.
    let mut steps = (behind / step_seconds).max(1);
    let at = |steps| {
        offset(previous, step_seconds, steps).ok_or_else(|| unschedulable(rule, previous))
    };
    let mut candidate = at(steps)?;
    if candidate < now {
        steps += 1;
        candidate = at(steps)?;
    }

    if steps.unsigned_abs() > limit {
        return Err(unschedulable(rule, previous));
    }
    Ok(candidate)
}

fn offset(start: NaiveDateTime, step_seconds: i64, steps: i64) -> Option<NaiveDateTime> {
    let seconds = step_seconds.checked_mul(steps)?;
    start.checked_add_signed(Duration::try_seconds(seconds)?)
}

fn advance_months(
    rule: &RecurrenceRule,
    previous: NaiveDateTime,
    now: NaiveDateTime,
    months: u32,
    day: u32,
    limit: u64,
) -> Result<NaiveDateTime> {
    let mut candidate = previous;
    for _ in 0..limit {
        candidate = add_months_on_day(candidate, months, day)
            .ok_or_else(|| unschedulable(rule, previous))?;
        if candidate >= now {
            return Ok(candidate);
        }
    }
    Err(unschedulable(rule, previous))
}

/// Add `months` calendar months and land on `day`, clamped to the month's length.
fn add_months_on_day(dt: NaiveDateTime, months: u32, day: u32) -> Option<NaiveDateTime> {
    let first = dt
        .date()
        .with_day(1)?
        .checked_add_months(Months::new(months))?;
    let date = first.with_day(day.min(days_in_month(first)?))?;
    Some(date.and_time(dt.time()))
}

/// Length of the month starting on `first`.
fn days_in_month(first: NaiveDate) -> Option<u32> {
    let first_next = first.checked_add_months(Months::new(1))?;
    Some(first_next.pred_opt()?.day())
}

// ── Resolver ────────────────────────────────────────────────────────────────

/// Occurrence resolver bound to a clock.
///
/// Stateless apart from the clock, which is read once per call. Share it freely
/// across threads.
///
/// ```
/// use chrono::NaiveDate;
/// use recurrence_engine::{FixedClock, RecurrenceRule, Resolver};
///
/// let now = NaiveDate::from_ymd_opt(2015, 9, 23).unwrap().and_hms_opt(10, 30, 0).unwrap();
/// let resolver = Resolver::with_clock(FixedClock::new(now));
///
/// let past = NaiveDate::from_ymd_opt(2015, 9, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
/// assert_eq!(resolver.next_occurrence(&RecurrenceRule::once(), past).unwrap(), now);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Resolver<C = SystemClock> {
    clock: C,
    options: ResolverOptions,
}

impl Resolver {
    /// A resolver reading the system clock, with default options.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> Resolver<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            options: ResolverOptions::default(),
        }
    }

    /// Replace the resolver's options.
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// [`resolve_first`] against the resolver's clock.
    pub fn first_occurrence(
        &self,
        rule: &RecurrenceRule,
        anchor: NaiveDateTime,
        minute_of_day: u32,
    ) -> Result<NaiveDateTime> {
        resolve_first(rule, anchor, minute_of_day, self.clock.now(), &self.options)
    }

    /// [`resolve_next`] against the resolver's clock.
    pub fn next_occurrence(
        &self,
        rule: &RecurrenceRule,
        previous: NaiveDateTime,
    ) -> Result<NaiveDateTime> {
        resolve_next(rule, previous, self.clock.now(), &self.options)
    }

    /// Describe `job` in English, with "today" taken from the resolver's clock.
    pub fn describe(&self, job: &Job) -> String {
        self.describe_with(job, &English)
    }

    /// Describe `job` using the given day names.
    pub fn describe_with(&self, job: &Job, names: &dyn DayNames) -> String {
        describe(job, self.clock.now().date(), self.options.week_start, names)
    }
}

// ── Internal helpers ────────────────────────────────────────────────────────

/// Drop seconds and sub-second precision, the resolution every occurrence has.
pub fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(dt)
}

/// The validated `Day` of a weekly or monthly rule.
fn target_day(rule: &RecurrenceRule) -> Result<u32> {
    let missing = match rule.kind() {
        RecurrenceType::Weeks => RuleError::DayRangeWeek(rule.day()),
        _ => RuleError::DayRangeMonth(rule.day()),
    };
    rule.day()
        .and_then(|day| u32::try_from(day).ok())
        .ok_or_else(|| missing.into())
}

fn interval_i32(interval: i64) -> Result<i32> {
    i32::try_from(interval).map_err(|_| RuleError::IntervalRange(Some(interval)).into())
}

fn unschedulable(rule: &RecurrenceRule, start: NaiveDateTime) -> RecurrenceError {
    RecurrenceError::Unschedulable {
        rule: rule.to_string(),
        start,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn now() -> NaiveDateTime {
        at(2015, 9, 23, 10, 30)
    }

    fn defaults() -> ResolverOptions {
        ResolverOptions::default()
    }

    // ── week start ──────────────────────────────────────────────────────

    #[test]
    fn test_sunday_week_numbering() {
        let ws = WeekStartDay::Sunday;
        assert_eq!(ws.weekday(0), Weekday::Sun);
        assert_eq!(ws.weekday(3), Weekday::Wed);
        assert_eq!(ws.weekday(6), Weekday::Sat);
        assert_eq!(ws.days_from_start(Weekday::Wed), 3);
    }

    #[test]
    fn test_monday_week_numbering() {
        let ws = WeekStartDay::Monday;
        assert_eq!(ws.weekday(0), Weekday::Mon);
        assert_eq!(ws.weekday(6), Weekday::Sun);
        assert_eq!(ws.days_from_start(Weekday::Sun), 6);
    }

    // ── resolve_first ───────────────────────────────────────────────────

    #[test]
    fn test_first_strips_anchor_time_of_day() {
        let rule = RecurrenceRule::every(RecurrenceType::Minutes, 45);
        let first = resolve_first(&rule, at(2015, 9, 23, 17, 59), 641, now(), &defaults()).unwrap();
        assert_eq!(first, at(2015, 9, 23, 10, 41));
    }

    #[test]
    fn test_first_minute_offset_can_cross_midnight() {
        let rule = RecurrenceRule::every(RecurrenceType::Days, 1);
        let first = resolve_first(&rule, at(2015, 9, 23, 0, 0), 24 * 60 + 5, now(), &defaults()).unwrap();
        assert_eq!(first, at(2015, 9, 24, 0, 5));
    }

    #[test]
    fn test_first_fixed_units_accept_past_candidate() {
        let rule = RecurrenceRule::every(RecurrenceType::Hours, 2);
        let first = resolve_first(&rule, at(2015, 9, 1, 0, 0), 60, now(), &defaults()).unwrap();
        assert_eq!(first, at(2015, 9, 1, 1, 0));
    }

    #[test]
    fn test_first_weekly_skips_matching_day_in_the_past() {
        // 2015-09-23 is a Wednesday, but 09:00 is already past at 10:30.
        let rule = RecurrenceRule::weekly(6, 3);
        let first = resolve_first(&rule, at(2015, 9, 23, 0, 0), 9 * 60, now(), &defaults()).unwrap();
        assert_eq!(first, at(2015, 9, 30, 9, 0));
    }

    #[test]
    fn test_first_weekly_honours_monday_week_start() {
        let options = ResolverOptions {
            week_start: WeekStartDay::Monday,
            ..defaults()
        };
        // Day 3 counted from Monday is Thursday.
        let rule = RecurrenceRule::weekly(1, 3);
        let first = resolve_first(&rule, at(2015, 9, 23, 0, 0), 12 * 60, now(), &options).unwrap();
        assert_eq!(first, at(2015, 9, 24, 12, 0));
        assert_eq!(first.weekday(), Weekday::Thu);
    }

    #[test]
    fn test_first_monthly_skips_short_months() {
        let rule = RecurrenceRule::monthly(1, 31);
        let first = resolve_first(&rule, at(2015, 11, 1, 0, 0), 0, now(), &defaults()).unwrap();
        assert_eq!(first, at(2015, 12, 31, 0, 0));
    }

    #[test]
    fn test_first_once_in_future() {
        let first = resolve_first(&RecurrenceRule::once(), now(), 10 * 60 + 45, now(), &defaults()).unwrap();
        assert_eq!(first, at(2015, 9, 23, 10, 45));
    }

    #[test]
    fn test_first_once_at_now_is_past() {
        let result = resolve_first(&RecurrenceRule::once(), now(), 10 * 60 + 30, now(), &defaults());
        assert_eq!(result, Err(RecurrenceError::PastOnceSchedule));
    }

    #[test]
    fn test_first_rejects_invalid_rule() {
        let rule = RecurrenceRule::every(RecurrenceType::Weeks, 1);
        let result = resolve_first(&rule, now(), 0, now(), &defaults());
        assert_eq!(
            result,
            Err(RecurrenceError::InvalidRule(RuleError::DayRangeWeek(None)))
        );
        let err = result.unwrap_err().to_string();
        assert!(err.starts_with("Cannot calculate next on an invalid recurrence."), "got: {err}");
    }

    #[test]
    fn test_first_day_scan_limit_is_enforced() {
        let options = ResolverOptions {
            day_scan_limit: 3,
            ..defaults()
        };
        // The next 31st is eight days after 2015-10-23.
        let rule = RecurrenceRule::monthly(1, 31);
        let result = resolve_first(&rule, at(2015, 10, 23, 0, 0), 0, now(), &options);
        assert!(matches!(result, Err(RecurrenceError::Unschedulable { .. })), "got: {result:?}");
    }

    #[test]
    fn test_first_day_scan_limit_is_inclusive() {
        let options = ResolverOptions {
            day_scan_limit: 8,
            ..defaults()
        };
        let rule = RecurrenceRule::monthly(1, 31);
        let first = resolve_first(&rule, at(2015, 10, 23, 0, 0), 0, now(), &options).unwrap();
        assert_eq!(first, at(2015, 10, 31, 0, 0));
    }

    #[test]
    fn test_first_default_day_scan_limit_monthly() {
        // Day-of-month matches before `now` are passed over; 2015-10-01 is the first usable one.
        let rule = RecurrenceRule::monthly(1, 1);
        let target = at(2015, 10, 1, 0, 0);
        let edge = target - Duration::days(i64::from(DAY_SCAN_LIMIT));

        assert_eq!(resolve_first(&rule, edge, 0, now(), &defaults()), Ok(target));

        let result = resolve_first(&rule, edge - Duration::days(1), 0, now(), &defaults());
        assert!(matches!(result, Err(RecurrenceError::Unschedulable { .. })), "got: {result:?}");
    }

    #[test]
    fn test_first_default_day_scan_limit_weekly() {
        // Wednesday 2015-09-23 00:00 is before `now`, so the scan must reach the 30th.
        let rule = RecurrenceRule::weekly(1, 3);
        let target = at(2015, 9, 30, 0, 0);
        let edge = target - Duration::days(i64::from(DAY_SCAN_LIMIT));

        assert_eq!(resolve_first(&rule, edge, 0, now(), &defaults()), Ok(target));

        let result = resolve_first(&rule, edge - Duration::days(1), 0, now(), &defaults());
        assert!(matches!(result, Err(RecurrenceError::Unschedulable { .. })), "got: {result:?}");
    }

    #[test]
    fn test_default_limits() {
        assert_eq!(defaults().day_scan_limit, 5_000);
        assert_eq!(defaults().step_limit, 100_000_000);
        assert_eq!(defaults().week_start, WeekStartDay::Sunday);
    }

    // ── resolve_next ────────────────────────────────────────────────────

    #[test]
    fn test_next_once_keeps_future_fire_time() {
        let next = resolve_next(&RecurrenceRule::once(), at(2015, 12, 31, 23, 59), now(), &defaults()).unwrap();
        assert_eq!(next, at(2015, 12, 31, 23, 59));
    }

    #[test]
    fn test_next_once_catches_up_to_now() {
        let now = now() + Duration::seconds(42);
        let next = resolve_next(&RecurrenceRule::once(), at(2015, 1, 1, 0, 0), now, &defaults()).unwrap();
        assert_eq!(next, at(2015, 9, 23, 10, 30));
    }

    #[test]
    fn test_next_at_now_advances_one_interval() {
        let rule = RecurrenceRule::every(RecurrenceType::Minutes, 45);
        let next = resolve_next(&rule, now(), now(), &defaults()).unwrap();
        assert_eq!(next, at(2015, 9, 23, 11, 15));
    }

    #[test]
    fn test_next_catches_up_on_interval_grid() {
        let rule = RecurrenceRule::every(RecurrenceType::Minutes, 45);
        // 08:00 + 3 × 45min = 10:15 < 10:30, + 4 × 45min = 11:00
        let next = resolve_next(&rule, at(2015, 9, 23, 8, 0), now(), &defaults()).unwrap();
        assert_eq!(next, at(2015, 9, 23, 11, 0));
    }

    #[test]
    fn test_next_may_land_exactly_on_now_when_catching_up() {
        let rule = RecurrenceRule::every(RecurrenceType::Minutes, 45);
        let next = resolve_next(&rule, at(2015, 9, 23, 9, 45), now(), &defaults()).unwrap();
        assert_eq!(next, now());
    }

    #[test]
    fn test_next_stays_on_grid_when_now_has_seconds() {
        let rule = RecurrenceRule::every(RecurrenceType::Minutes, 1);
        let now = now() + Duration::seconds(20);
        let next = resolve_next(&rule, at(2015, 9, 23, 10, 0), now, &defaults()).unwrap();
        assert_eq!(next, at(2015, 9, 23, 10, 31));
    }

    #[test]
    fn test_next_truncates_previous_seconds() {
        let rule = RecurrenceRule::every(RecurrenceType::Hours, 1);
        let previous = at(2015, 9, 23, 18, 25) + Duration::seconds(59);
        let next = resolve_next(&rule, previous, now(), &defaults()).unwrap();
        assert_eq!(next, at(2015, 9, 23, 19, 25));
        assert_eq!(next.second(), 0);
    }

    #[test]
    fn test_next_weekly_keeps_weekday() {
        let rule = RecurrenceRule::weekly(2, 3);
        let next = resolve_next(&rule, at(2015, 9, 23, 12, 0), now(), &defaults()).unwrap();
        assert_eq!(next, at(2015, 10, 7, 12, 0));
    }

    #[test]
    fn test_next_monthly_clamps_and_recovers() {
        let rule = RecurrenceRule::monthly(1, 31);
        let feb = resolve_next(&rule, at(2016, 1, 31, 9, 0), now(), &defaults()).unwrap();
        assert_eq!(feb, at(2016, 2, 29, 9, 0));
        let mar = resolve_next(&rule, feb, now(), &defaults()).unwrap();
        assert_eq!(mar, at(2016, 3, 31, 9, 0));
    }

    #[test]
    fn test_next_monthly_catches_up_from_far_past() {
        let rule = RecurrenceRule::monthly(7, 7);
        let next = resolve_next(&rule, at(2010, 1, 7, 0, 0), now(), &defaults()).unwrap();
        // 2010-01 + 7k months: ..., 2014-09, 2015-04, 2015-11
        assert_eq!(next, at(2015, 11, 7, 0, 0));
    }

    #[test]
    fn test_next_step_limit_is_enforced_for_fixed_units() {
        let options = ResolverOptions {
            step_limit: 10,
            ..defaults()
        };
        let rule = RecurrenceRule::every(RecurrenceType::Minutes, 1);
        let result = resolve_next(&rule, at(2015, 9, 23, 10, 0), now(), &options);
        assert!(matches!(result, Err(RecurrenceError::Unschedulable { .. })), "got: {result:?}");

        let within = resolve_next(&rule, at(2015, 9, 23, 10, 20), now(), &options).unwrap();
        assert_eq!(within, now());
    }

    #[test]
    fn test_next_step_limit_is_enforced_for_months() {
        let options = ResolverOptions {
            step_limit: 2,
            ..defaults()
        };
        let rule = RecurrenceRule::monthly(1, 1);
        let result = resolve_next(&rule, at(2015, 1, 1, 0, 0), now(), &options);
        let err = result.unwrap_err().to_string();
        assert!(err.contains(r#"{"Type":5,"Interval":1,"Day":1}"#), "got: {err}");
    }

    #[test]
    fn test_next_rejects_invalid_rule() {
        let rule = RecurrenceRule::new(RecurrenceType::Hours, None, None);
        assert_eq!(
            resolve_next(&rule, now(), now(), &defaults()),
            Err(RecurrenceError::InvalidRule(RuleError::IntervalRequired))
        );
    }

    #[test]
    fn test_next_overflow_is_unschedulable() {
        let rule = RecurrenceRule::weekly(10_000, 0);
        let result = resolve_next(&rule, NaiveDateTime::MAX, NaiveDateTime::MAX, &defaults());
        assert!(matches!(result, Err(RecurrenceError::Unschedulable { .. })), "got: {result:?}");
    }

    // ── Resolver ────────────────────────────────────────────────────────

    #[test]
    fn test_resolver_reads_injected_clock() {
        let resolver = Resolver::with_clock(FixedClock::new(now()));
        let rule = RecurrenceRule::every(RecurrenceType::Hours, 3);
        let next = resolver.next_occurrence(&rule, at(2015, 9, 23, 18, 25)).unwrap();
        assert_eq!(next, at(2015, 9, 23, 21, 25));
    }

    #[test]
    fn test_resolver_accepts_closure_clock() {
        let resolver = Resolver::with_clock(|| at(2015, 9, 23, 10, 30));
        let first = resolver.first_occurrence(&RecurrenceRule::once(), now(), 11 * 60);
        assert_eq!(first, Ok(at(2015, 9, 23, 11, 0)));
    }

    #[test]
    fn test_resolver_is_shareable_across_threads() {
        let resolver = std::sync::Arc::new(Resolver::with_clock(FixedClock::new(now())));
        let handles: Vec<_> = (1..=4)
            .map(|hours| {
                let resolver = resolver.clone();
                std::thread::spawn(move || {
                    let rule = RecurrenceRule::every(RecurrenceType::Hours, hours);
                    resolver.next_occurrence(&rule, at(2015, 9, 23, 10, 30))
                })
            })
            .collect();
        for (hours, handle) in (1..=4).zip(handles) {
            let next = handle.join().unwrap().unwrap();
            assert_eq!(next, now() + Duration::hours(hours));
        }
    }

    #[test]
    fn test_truncate_to_minute() {
        let dt = at(2015, 9, 23, 10, 30) + Duration::milliseconds(59_999);
        assert_eq!(truncate_to_minute(dt), at(2015, 9, 23, 10, 30));
    }
}
