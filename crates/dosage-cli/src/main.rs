mod commands;
mod config;
mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use dosage_engine::{
    parse_duration, InMemoryRepo, Location, ScheduleDraft, ScheduleId, SchedulePeriod, UserId,
};
use serde::Serialize;

use crate::commands::Request;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "dosage",
    version,
    about = "Medication schedules: active schedules, day timetables and upcoming doses"
)]
struct Cli {
    /// YAML config file
    #[arg(long, global = true, env = "DOSAGE_CONFIG")]
    config: Option<PathBuf>,

    /// JSON schedule store
    #[arg(long, global = true, env = "DOSAGE_STORE", default_value = "schedules.json")]
    store: PathBuf,

    /// Caller timezone: an offset like +10:00 or an IANA name
    #[arg(long, global = true, env = "DOSAGE_TZ", default_value = "UTC", value_parser = parse_location)]
    tz: Location,

    /// Reference instant (RFC 3339); defaults to the system clock
    #[arg(long, global = true, value_parser = parse_now)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a schedule
    Create {
        #[arg(long)]
        user: i64,
        /// Medicine name
        #[arg(long)]
        name: String,
        /// Spacing between doses, e.g. 8h or 1h30m
        #[arg(long, value_parser = parse_period)]
        period: SchedulePeriod,
        /// Days the schedule runs for (0 = no end)
        #[arg(long, default_value_t = 0)]
        duration: u32,
    },
    /// List ids of the user's active schedules
    Active {
        #[arg(long)]
        user: i64,
    },
    /// Show one schedule with its timetable for today
    Timetable {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        id: u64,
    },
    /// List upcoming doses across the user's schedules
    Next {
        #[arg(long)]
        user: i64,
        /// Lookahead; defaults to the configured next_taking_period
        #[arg(long, value_parser = parse_horizon)]
        horizon: Option<TimeDelta>,
    },
}

fn parse_location(s: &str) -> Result<Location, String> {
    s.parse().map_err(|e: dosage_engine::DosageError| e.to_string())
}

fn parse_now(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("'{s}': {e}"))
}

fn parse_period(s: &str) -> Result<SchedulePeriod, String> {
    parse_duration(s)
        .and_then(SchedulePeriod::new)
        .map_err(|e| e.to_string())
}

fn parse_horizon(s: &str) -> Result<TimeDelta, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

fn load_store(path: &Path) -> Result<InMemoryRepo> {
    if !path.exists() {
        return Ok(InMemoryRepo::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read store {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(InMemoryRepo::default());
    }
    serde_json::from_str(&raw).with_context(|| format!("failed to parse store {}", path.display()))
}

fn write_store(path: &Path, repo: &InMemoryRepo) -> Result<()> {
    let raw = serde_json::to_string_pretty(repo)?;
    fs::write(path, raw).with_context(|| format!("failed to write store {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = AppConfig::load(cli.config.as_deref())?;
    logging::init(&cfg.log)?;
    cfg.log_summary();

    let location = cli.tz;
    let now = cli.now.unwrap_or_else(Utc::now).with_timezone(&location);
    tracing::debug!(%location, %now, "request resolved");

    let req = Request {
        config: cfg.schedule,
        location,
        now,
    };

    let mut repo = load_store(&cli.store)?;

    match cli.command {
        Command::Create {
            user,
            name,
            period,
            duration,
        } => {
            let draft = ScheduleDraft {
                user_id: UserId(user),
                name,
                duration_days: duration,
                period,
            };
            let created = commands::create(&mut repo, &req, draft)?;
            write_store(&cli.store, &repo)?;
            print_json(&created)
        }
        Command::Active { user } => print_json(&commands::active(&repo, &req, UserId(user))?),
        Command::Timetable { user, id } => print_json(&commands::timetable(
            &repo,
            &req,
            UserId(user),
            ScheduleId(id),
        )?),
        Command::Next { user, horizon } => {
            print_json(&commands::next(&repo, &req, UserId(user), horizon)?)
        }
    }
}
