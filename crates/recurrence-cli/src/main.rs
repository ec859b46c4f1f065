//! `recur`: command-line access to the recurrence engine.
//!
//! Rules and jobs are passed as JSON in their wire form, e.g.
//! `{"Type":4,"Interval":6,"Day":3}`. Datetimes are local calendar times such as
//! `2015-09-23T10:30`. Results go to stdout; logs go to stderr and are filtered
//! by `RUST_LOG` (default `warn`).

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use recurrence_engine::{
    parse_datetime, truncate_to_minute, validate_json, Clock, FixedClock, Job, RecurrenceRule,
    RecurrenceType, Resolver, ResolverOptions, SystemClock, WeekStartDay, DAY_SCAN_LIMIT,
    STEP_LIMIT,
};
use serde_json::json;
use tracing::{debug, info, warn};

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "recur", version, about = "Recurring job schedule calculator", long_about = None)]
struct Cli {
    #[command(flatten)]
    resolver: ResolverArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ResolverArgs {
    /// Reference "now" (defaults to the local wall clock)
    #[arg(long, global = true, env = "RECUR_NOW", value_parser = parse_datetime)]
    now: Option<NaiveDateTime>,

    /// Weekday that weekly rules number as day 0
    #[arg(long, global = true, env = "RECUR_WEEK_START", value_enum, default_value_t = WeekStart::Sunday)]
    week_start: WeekStart,

    /// Days scanned while anchoring a weekly or monthly rule
    #[arg(long, global = true, env = "RECUR_DAY_SCAN_LIMIT", default_value_t = DAY_SCAN_LIMIT)]
    day_scan_limit: u32,

    /// Interval steps allowed while catching up to now
    #[arg(long, global = true, env = "RECUR_STEP_LIMIT", default_value_t = STEP_LIMIT)]
    step_limit: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a rule and print {"Success": ..., "ErrorMessage": ...}
    Validate {
        /// Rule JSON, or `null` for an absent rule
        #[arg(long)]
        rule: String,
    },
    /// Compute the first occurrence of a newly created schedule
    First {
        /// Rule JSON
        #[arg(long, value_parser = RecurrenceRule::from_json)]
        rule: RecurrenceRule,

        /// Date the schedule starts from (its time of day is ignored)
        #[arg(long, value_parser = parse_datetime)]
        anchor: NaiveDateTime,

        /// Minutes after midnight at which the job runs
        #[arg(long, default_value_t = 0)]
        minute: u32,
    },
    /// Compute the occurrences following a previous fire time
    Next {
        /// Rule JSON
        #[arg(long, value_parser = RecurrenceRule::from_json)]
        rule: RecurrenceRule,

        /// When the job last fired
        #[arg(long, value_parser = parse_datetime)]
        previous: NaiveDateTime,

        /// How many successive occurrences to print
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
    /// Render a job as an English sentence
    Describe {
        /// Job JSON: {"Recurrence", "StartDate", "EndType", "EndValue"}
        #[arg(long, value_parser = Job::from_json)]
        job: Job,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum WeekStart {
    Sunday,
    Monday,
}

impl From<WeekStart> for WeekStartDay {
    fn from(week_start: WeekStart) -> Self {
        match week_start {
            WeekStart::Sunday => WeekStartDay::Sunday,
            WeekStart::Monday => WeekStartDay::Monday,
        }
    }
}

impl ResolverArgs {
    fn options(&self) -> ResolverOptions {
        ResolverOptions {
            week_start: self.week_start.into(),
            day_scan_limit: self.day_scan_limit,
            step_limit: self.step_limit,
        }
    }
}

// ── Commands ────────────────────────────────────────────────────────

fn run(cli: Cli) -> Result<String> {
    let options = cli.resolver.options();
    match cli.resolver.now {
        Some(now) => {
            let resolver = Resolver::with_clock(FixedClock::new(now)).with_options(options);
            execute(cli.command, resolver)
        }
        None => execute(cli.command, Resolver::with_clock(SystemClock).with_options(options)),
    }
}

fn execute<C: Clock>(command: Command, resolver: Resolver<C>) -> Result<String> {
    let now = resolver.clock().now();
    debug!(options = ?resolver.options(), %now, "resolver configured");

    match command {
        Command::Validate { rule } => {
            let outcome = validate_json(&rule).context("rule is not valid JSON")?;
            if let Some(message) = &outcome.error_message {
                info!(%message, "rule rejected");
            }
            Ok(serde_json::to_string(&outcome)?)
        }
        Command::First {
            rule,
            anchor,
            minute,
        } => {
            let first = resolver
                .first_occurrence(&rule, anchor, minute)
                .with_context(|| format!("no first occurrence for {rule}"))?;
            info!(%rule, %first, "first occurrence");
            Ok(json!({ "occurrence": first }).to_string())
        }
        Command::Next {
            rule,
            previous,
            count,
        } => {
            let mut occurrences = Vec::new();
            let mut current = previous;
            for _ in 0..count {
                current = resolver
                    .next_occurrence(&rule, current)
                    .with_context(|| format!("no occurrence of {rule} after {current}"))?;
                debug!(%rule, %current, "next occurrence");
                occurrences.push(current);
            }
            // Same test the resolver applies: a once rule whose minute has passed runs now.
            let overdue =
                rule.kind() == RecurrenceType::Once && truncate_to_minute(previous) < now;
            if overdue {
                warn!(%rule, %previous, "single execution was overdue and runs now");
            }
            Ok(json!({ "occurrences": occurrences }).to_string())
        }
        Command::Describe { job } => Ok(resolver.describe(&job)),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
