//! # dosage-engine
//!
//! Deterministic medication schedule computation.
//!
//! Given a user's recurring schedules, a per-user day window and a
//! caller-resolved "now", the engine answers three questions without any I/O
//! or shared state: which schedules are still running, when the doses of one
//! schedule fall on a given day, and which doses are coming up across every
//! schedule within a lookahead horizon.
//!
//! ## Modules
//!
//! - [`active`] — Schedules still running at an instant
//! - [`timetable`] — Dose instants of one schedule within one day window
//! - [`next_taking`] — Upcoming doses across schedules and days, time-ordered
//! - [`schedule`] — Schedules, end-hour resolution, drafts and derived values
//! - [`value`] — Identifiers, periods, date-only expirations, timetable items
//! - [`config`] — Day-window parameters
//! - [`location`] — Fixed-offset or IANA timezone supplied by the caller
//! - [`duration`] — Duration strings (`"1h2m"`, `"15m"`)
//! - [`repo`] — Schedule repository trait and an in-memory store
//! - [`error`] — Error types

pub mod active;
mod clock;
pub mod config;
pub mod duration;
pub mod error;
pub mod location;
pub mod next_taking;
pub mod repo;
pub mod schedule;
pub mod timetable;
pub mod value;

pub use active::active_ids;
pub use config::DayWindowConfig;
pub use duration::{format_duration, parse_duration};
pub use error::DosageError;
pub use location::Location;
pub use next_taking::next_takings;
pub use repo::{InMemoryRepo, ScheduleRepo};
pub use schedule::{
    resolve_all, Occurrence, ResolvedSchedule, Schedule, ScheduleDraft, ScheduleTimetable,
};
pub use timetable::{day_timetable, schedule_timetable};
pub use value::{ScheduleEndAt, ScheduleId, SchedulePeriod, TimetableItem, UserId};
