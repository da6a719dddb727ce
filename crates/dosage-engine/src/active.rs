//! Active-schedule filtering.

use chrono::{DateTime, TimeZone};
use tracing::debug;

use crate::schedule::ResolvedSchedule;
use crate::value::ScheduleId;

/// Ids of the schedules still running at `now`, in input order.
///
/// A schedule is active when it never expires or its resolved expiration is
/// strictly after `now`.
pub fn active_ids<Tz: TimeZone>(schedules: &[ResolvedSchedule], now: &DateTime<Tz>) -> Vec<ScheduleId> {
    schedules
        .iter()
        .filter(|schedule| {
            let active = schedule.is_active_at(now);
            if active {
                debug!(schedule = %schedule.id(), "add schedule");
            } else {
                debug!(schedule = %schedule.id(), expires_at = ?schedule.expires_at, "schedule expired");
            }
            active
        })
        .map(ResolvedSchedule::id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DayWindowConfig;
    use crate::location::Location;
    use crate::schedule::{resolve_all, Schedule};
    use crate::value::{ScheduleEndAt, SchedulePeriod, UserId};
    use chrono::{Days, NaiveDate, TimeDelta, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn schedule(id: u64, end_at: Option<NaiveDate>) -> Schedule {
        Schedule {
            id: ScheduleId(id),
            user_id: UserId(1234567890123456),
            name: format!("Test Schedule {id}"),
            period: SchedulePeriod::new(TimeDelta::hours(1)).unwrap(),
            end_at: end_at.into(),
        }
    }

    fn fixtures() -> Vec<Schedule> {
        vec![
            schedule(1, today().checked_add_days(Days::new(1))),
            schedule(2, Some(today())),
            schedule(3, today().checked_sub_days(Days::new(1))),
            schedule(4, None),
            schedule(5, today().checked_add_days(Days::new(1))),
        ]
    }

    fn ids_at(tz: &str) -> Vec<u64> {
        let loc: Location = tz.parse().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap().with_timezone(&loc);
        let resolved = resolve_all(&fixtures(), &loc, &DayWindowConfig::default()).unwrap();
        active_ids(&resolved, &now).into_iter().map(|id| id.0).collect()
    }

    #[test]
    fn test_active_in_utc() {
        assert_eq!(ids_at("+00:00"), [1, 2, 4, 5]);
    }

    #[test]
    fn test_schedule_expiring_exactly_now_is_inactive() {
        // 22:00 local, schedule 2 ends today at 22:00
        assert_eq!(ids_at("+10:00"), [1, 4, 5]);
    }

    #[test]
    fn test_previous_local_day_keeps_yesterday_schedule() {
        // 13:00 on Dec 31 local, schedule 3 ends Dec 31 at 22:00
        assert_eq!(ids_at("-23:00"), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert!(active_ids(&[], &now).is_empty());
    }

    #[test]
    fn test_never_expiring_schedule_always_active() {
        let resolved = resolve_all(&[schedule(9, None)], &Utc, &DayWindowConfig::default()).unwrap();
        let far = Utc.with_ymd_and_hms(2999, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(active_ids(&resolved, &far), [ScheduleId(9)]);
    }

    #[test]
    fn test_input_order_is_preserved() {
        let schedules = [schedule(5, None), schedule(2, None), schedule(8, None)];
        let resolved = resolve_all(&schedules, &Utc, &DayWindowConfig::default()).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            active_ids(&resolved, &now),
            [ScheduleId(5), ScheduleId(2), ScheduleId(8)]
        );
    }
}
