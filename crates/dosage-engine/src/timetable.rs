//! Day timetables: the dosage instants of one schedule within one day window.
//!
//! Dose `i` of a day is `begin_day_hour + i * period`, rounded to
//! `time_round`. The walk ends at the first dose that lands after
//! `end_day_hour`; a dose rounded exactly onto `end_day_hour` is kept.

use chrono::{DateTime, DurationRound, NaiveDate, TimeDelta, TimeZone};
use tracing::debug;

use crate::clock::{at_hour, round_to};
use crate::config::DayWindowConfig;
use crate::error::{DosageError, Result};
use crate::schedule::{ResolvedSchedule, Schedule, ScheduleTimetable};
use crate::value::{SchedulePeriod, TimetableItem};

/// The `i`-th rounded dose after `begin`.
pub(crate) fn nth_dose<Tz: TimeZone>(
    begin: &DateTime<Tz>,
    period: SchedulePeriod,
    i: i32,
    round: TimeDelta,
) -> Result<DateTime<Tz>> {
    let offset = period
        .as_delta()
        .checked_mul(i)
        .ok_or_else(|| DosageError::InvalidDatetime(format!("dose {i} out of range")))?;
    let raw = begin
        .clone()
        .checked_add_signed(offset)
        .ok_or_else(|| DosageError::InvalidDatetime(format!("dose {i} out of range")))?;
    round_to(raw, round)
}

/// Every dosage instant of `schedule` on `day` in `location`, ascending.
///
/// Expiration is not consulted; callers decide whether the day is reachable.
///
/// # Errors
///
/// Returns [`DosageError::InvalidConfig`] if `config` fails validation.
pub fn day_timetable<Tz: TimeZone>(
    schedule: &Schedule,
    day: NaiveDate,
    location: &Tz,
    config: &DayWindowConfig,
) -> Result<Vec<TimetableItem>> {
    config.validate()?;

    let begin_of_day = at_hour(location, day, config.begin_day_hour)?;
    let end_of_day = at_hour(location, day, config.end_day_hour)?;

    let mut timetable = Vec::new();
    for i in 0.. {
        let timestamp = nth_dose(&begin_of_day, schedule.period, i, config.time_round)?;
        if timestamp > end_of_day {
            debug!(schedule = %schedule.id, timestamp = %timestamp.fixed_offset(), "day end");
            break;
        }
        timetable.push(TimetableItem(timestamp.fixed_offset()));
    }

    Ok(timetable)
}

/// The detail view of one schedule as seen at `now`.
///
/// Late in the evening (when the local wall clock, rounded to the hour, is past
/// today's `end_day_hour`) the timetable is for the next day. A schedule that has
/// expired by then gets an empty timetable.
pub fn schedule_timetable<Tz: TimeZone>(
    schedule: &ResolvedSchedule,
    now: &DateTime<Tz>,
    config: &DayWindowConfig,
) -> Result<ScheduleTimetable> {
    config.validate()?;

    let location = now.timezone();
    let mut day = now.date_naive();
    let mut reference = now.clone();

    let end_of_today = at_hour(&location, day, config.end_day_hour)?;
    let wall_clock = now.naive_local().duration_round(TimeDelta::hours(1))?;
    if wall_clock > end_of_today.naive_local() {
        debug!(schedule = %schedule.id(), "calculate for next day");
        day = day
            .succ_opt()
            .ok_or_else(|| DosageError::InvalidDatetime(format!("no day after {day}")))?;
        // a fixed 24h on the instant, so a DST gap on the next local day is harmless
        reference = reference
            .checked_add_signed(TimeDelta::days(1))
            .ok_or_else(|| DosageError::InvalidDatetime("no day after now".to_string()))?;
    }

    let mut result = ScheduleTimetable {
        id: schedule.id(),
        name: schedule.name().to_string(),
        end_at: schedule.expires_at,
        period: schedule.period(),
        timetable: Vec::new(),
    };

    if let Some(expires_at) = &schedule.expires_at {
        if expires_at < &reference {
            debug!(schedule = %schedule.id(), %expires_at, "schedule expired");
            return Ok(result);
        }
    }

    result.timetable = day_timetable(&schedule.schedule, day, &location, config)?;
    debug!(schedule = %schedule.id(), doses = result.timetable.len(), "timetable");

    Ok(result)
}
