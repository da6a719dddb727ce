//! Upcoming dosage events across all of a user's schedules.
//!
//! Each schedule is walked day by day from the current local day, and dose by
//! dose within a day. A schedule's walk ends for good at the first dose past
//! its expiration or past the horizon, both of which only grow later with each
//! step. A dose whose local hour leaves the day window ends the current day.

use chrono::{DateTime, Days, TimeDelta, TimeZone, Timelike};
use tracing::{debug, trace};

use crate::clock::at_hour;
use crate::config::DayWindowConfig;
use crate::error::{DosageError, Result};
use crate::schedule::{Occurrence, ResolvedSchedule};
use crate::timetable::nth_dose;

/// Every dose after `now` and no later than `now + horizon`, ascending by
/// timestamp.
///
/// Equal timestamps keep discovery order: schedule input order, then day, then
/// dose index. The result is an empty `Vec` when nothing is due.
///
/// # Errors
///
/// Returns [`DosageError::InvalidConfig`] if `config` fails validation.
pub fn next_takings<Tz: TimeZone>(
    schedules: &[ResolvedSchedule],
    now: &DateTime<Tz>,
    horizon: TimeDelta,
    config: &DayWindowConfig,
) -> Result<Vec<Occurrence>> {
    config.validate()?;

    let location = now.timezone();
    let today = now.date_naive();
    let horizon_end = now
        .clone()
        .checked_add_signed(horizon)
        .ok_or_else(|| DosageError::InvalidDatetime("horizon out of range".to_string()))?;

    let mut next_takings = Vec::new();

    for schedule in schedules {
        debug!(schedule = %schedule.id(), "finding takings");

        'days: for days in 0u64.. {
            let day = today
                .checked_add_days(Days::new(days))
                .ok_or_else(|| DosageError::InvalidDatetime(format!("{today} + {days} days")))?;
            let begin_of_day = at_hour(&location, day, config.begin_day_hour)?;
            trace!(schedule = %schedule.id(), %day, "finding for day");

            for i in 0.. {
                let timestamp = nth_dose(&begin_of_day, schedule.period(), i, config.time_round)?;
                trace!(timestamp = %timestamp.fixed_offset(), "checking timestamp");

                if let Some(expires_at) = &schedule.expires_at {
                    if &timestamp > expires_at {
                        debug!(schedule = %schedule.id(), %expires_at, "schedule expired");
                        break 'days;
                    }
                }

                if timestamp > horizon_end {
                    debug!(schedule = %schedule.id(), timestamp = %timestamp.fixed_offset(), "out of period");
                    break 'days;
                }

                let hour = timestamp.hour();
                if hour < config.begin_day_hour || hour >= config.end_day_hour {
                    trace!(schedule = %schedule.id(), timestamp = %timestamp.fixed_offset(), "night");
                    break;
                }

                if &timestamp > now {
                    let occurrence = Occurrence::new(schedule, timestamp.fixed_offset());
                    debug!(schedule = %schedule.id(), next_taking = %occurrence.timestamp, "found next taking");
                    next_takings.push(occurrence);
                }
            }
        }
    }

    // stable: equal timestamps stay in discovery order
    next_takings.sort_by_key(|o| o.timestamp);

    Ok(next_takings)
}
