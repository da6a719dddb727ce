//! Request orchestration: fetch from the repository, resolve expirations
//! against the request location, and call the engine.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta};
use dosage_engine::{
    active_ids, next_takings, resolve_all, schedule_timetable, DayWindowConfig, Location,
    Occurrence, ScheduleDraft, ScheduleId, ScheduleRepo, ScheduleTimetable, UserId,
};
use serde::Serialize;
use tracing::debug;

/// Everything pinned once per invocation.
#[derive(Debug, Clone)]
pub struct Request {
    pub config: DayWindowConfig,
    pub location: Location,
    pub now: DateTime<Location>,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: ScheduleId,
}

pub fn create(repo: &mut impl ScheduleRepo, req: &Request, draft: ScheduleDraft) -> Result<Created> {
    let schedule = draft.into_schedule(&req.now)?;
    let id = repo.save(schedule).context("create schedule")?;
    debug!(schedule = %id, "create schedule");
    Ok(Created { id })
}

pub fn active(repo: &impl ScheduleRepo, req: &Request, user_id: UserId) -> Result<Vec<ScheduleId>> {
    let schedules = repo.get_by_user(user_id).context("get schedules by user")?;
    debug!(now = %req.now, "user time");

    let resolved = resolve_all(&schedules, &req.location, &req.config)?;
    Ok(active_ids(&resolved, &req.now))
}

pub fn timetable(
    repo: &impl ScheduleRepo,
    req: &Request,
    user_id: UserId,
    schedule_id: ScheduleId,
) -> Result<ScheduleTimetable> {
    let schedule = repo
        .get_by_id(user_id, schedule_id)
        .with_context(|| format!("get schedule {schedule_id}"))?;
    debug!(now = %req.now, "user time");

    let resolved = schedule.resolve_end_at(&req.location, &req.config)?;
    Ok(schedule_timetable(&resolved, &req.now, &req.config)?)
}

pub fn next(
    repo: &impl ScheduleRepo,
    req: &Request,
    user_id: UserId,
    horizon: Option<TimeDelta>,
) -> Result<Vec<Occurrence>> {
    let schedules = repo.get_by_user(user_id).context("get schedules by user")?;
    debug!(now = %req.now, "user time");

    let horizon = horizon.unwrap_or(req.config.next_taking_period);
    let resolved = resolve_all(&schedules, &req.location, &req.config)?;
    Ok(next_takings(&resolved, &req.now, horizon, &req.config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use dosage_engine::{InMemoryRepo, Schedule, ScheduleEndAt, SchedulePeriod};

    const USER: UserId = UserId(1000000000000000);

    fn request(tz: &str) -> Request {
        let location: Location = tz.parse().unwrap();
        let now = Utc
            .with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
            .unwrap()
            .with_timezone(&location);
        Request {
            config: DayWindowConfig::default(),
            location,
            now,
        }
    }

    fn repo() -> InMemoryRepo {
        let jan = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        let schedule = |id, minutes, end_at| Schedule {
            id: ScheduleId(id),
            user_id: USER,
            name: format!("Test get_next_taking name{id}"),
            period: SchedulePeriod::new(TimeDelta::minutes(minutes)).unwrap(),
            end_at,
        };
        InMemoryRepo::new(vec![
            schedule(1, 60, ScheduleEndAt::on(jan(1))),
            schedule(2, 70, ScheduleEndAt::never()),
            schedule(3, 300, ScheduleEndAt::on(jan(2))),
        ])
    }

    #[test]
    fn test_next_merges_schedules() {
        let out = next(&repo(), &request("UTC"), USER, None).unwrap();
        let got: Vec<(u64, String)> = out
            .iter()
            .map(|o| (o.schedule_id.0, o.timestamp.format("%H:%M").to_string()))
            .collect();
        assert_eq!(
            got,
            [
                (2, "12:45".to_string()),
                (1, "13:00".to_string()),
                (3, "13:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_next_for_unknown_user_is_empty() {
        assert!(next(&repo(), &request("UTC"), UserId(5), None).unwrap().is_empty());
    }

    #[test]
    fn test_active_after_end_of_day() {
        // 23:00 local: schedule 1 ended at 22:00
        let ids = active(&repo(), &request("+11:00"), USER).unwrap();
        assert_eq!(ids, [ScheduleId(2), ScheduleId(3)]);
    }

    #[test]
    fn test_timetable_not_found() {
        let err = timetable(&repo(), &request("UTC"), USER, ScheduleId(42)).unwrap_err();
        assert!(format!("{err:#}").contains("not found"), "got: {err:#}");
    }

    #[test]
    fn test_create_then_list() {
        let mut repo = repo();
        let req = request("UTC");
        let draft = ScheduleDraft {
            user_id: USER,
            name: "Aspirin".to_string(),
            duration_days: 2,
            period: SchedulePeriod::new(TimeDelta::hours(8)).unwrap(),
        };
        let created = create(&mut repo, &req, draft).unwrap();
        assert_eq!(created.id, ScheduleId(4));

        let stored = repo.get_by_id(USER, created.id).unwrap();
        assert_eq!(stored.end_at.date(), NaiveDate::from_ymd_opt(2025, 1, 3));
        assert!(active(&repo, &req, USER).unwrap().contains(&created.id));
    }
}
