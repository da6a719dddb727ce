//! The schedule repository collaborator and an in-memory implementation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DosageError, Result};
use crate::schedule::Schedule;
use crate::value::{ScheduleId, UserId};

/// Read/write access to stored schedules.
pub trait ScheduleRepo {
    /// Store `schedule`, allocating an id when it is [`ScheduleId::UNASSIGNED`].
    /// A schedule with a known id replaces the stored one.
    fn save(&mut self, schedule: Schedule) -> Result<ScheduleId>;

    /// All schedules of `user_id` in stored order.
    fn get_by_user(&self, user_id: UserId) -> Result<Vec<Schedule>>;

    /// One schedule of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DosageError::NotFound`] when no such schedule belongs to the user.
    fn get_by_id(&self, user_id: UserId, schedule_id: ScheduleId) -> Result<Schedule>;
}

/// A `Vec`-backed repository. Serializes as a plain JSON array of schedules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryRepo {
    schedules: Vec<Schedule>,
}

impl InMemoryRepo {
    pub fn new(schedules: Vec<Schedule>) -> Self {
        Self { schedules }
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    fn next_id(&self) -> ScheduleId {
        let max = self.schedules.iter().map(|s| s.id.0).max().unwrap_or(0);
        ScheduleId(max + 1)
    }
}

impl ScheduleRepo for InMemoryRepo {
    fn save(&mut self, mut schedule: Schedule) -> Result<ScheduleId> {
        if schedule.id == ScheduleId::UNASSIGNED {
            schedule.id = self.next_id();
        }
        let id = schedule.id;

        match self.schedules.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = schedule,
            None => self.schedules.push(schedule),
        }
        debug!(schedule = %id, "saved schedule");

        Ok(id)
    }

    fn get_by_user(&self, user_id: UserId) -> Result<Vec<Schedule>> {
        Ok(self
            .schedules
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    fn get_by_id(&self, user_id: UserId, schedule_id: ScheduleId) -> Result<Schedule> {
        self.schedules
            .iter()
            .find(|s| s.id == schedule_id && s.user_id == user_id)
            .cloned()
            .ok_or_else(|| DosageError::NotFound(format!("schedule {schedule_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ScheduleEndAt, SchedulePeriod};
    use chrono::TimeDelta;

    fn schedule(user: i64, name: &str) -> Schedule {
        Schedule {
            id: ScheduleId::UNASSIGNED,
            user_id: UserId(user),
            name: name.to_string(),
            period: SchedulePeriod::new(TimeDelta::hours(8)).unwrap(),
            end_at: ScheduleEndAt::never(),
        }
    }

    #[test]
    fn test_save_allocates_sequential_ids() {
        let mut repo = InMemoryRepo::default();
        assert_eq!(repo.save(schedule(1, "a")).unwrap(), ScheduleId(1));
        assert_eq!(repo.save(schedule(2, "b")).unwrap(), ScheduleId(2));
        assert_eq!(repo.save(schedule(1, "c")).unwrap(), ScheduleId(3));
    }

    #[test]
    fn test_save_with_known_id_replaces() {
        let mut repo = InMemoryRepo::default();
        let id = repo.save(schedule(1, "a")).unwrap();
        let mut updated = repo.get_by_id(UserId(1), id).unwrap();
        updated.name = "renamed".to_string();
        assert_eq!(repo.save(updated).unwrap(), id);
        assert_eq!(repo.schedules().len(), 1);
        assert_eq!(repo.get_by_id(UserId(1), id).unwrap().name, "renamed");
    }

    #[test]
    fn test_get_by_user_filters_and_keeps_order() {
        let mut repo = InMemoryRepo::default();
        repo.save(schedule(1, "a")).unwrap();
        repo.save(schedule(2, "b")).unwrap();
        repo.save(schedule(1, "c")).unwrap();
        let names: Vec<String> = repo
            .get_by_user(UserId(1))
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["a", "c"]);
        assert!(repo.get_by_user(UserId(3)).unwrap().is_empty());
    }

    #[test]
    fn test_get_by_id_of_another_user_is_not_found() {
        let mut repo = InMemoryRepo::default();
        let id = repo.save(schedule(1, "a")).unwrap();
        let err = repo.get_by_id(UserId(2), id).unwrap_err();
        assert!(matches!(err, DosageError::NotFound(_)));
        assert!(repo.get_by_id(UserId(1), ScheduleId(99)).is_err());
    }

    #[test]
    fn test_json_store_roundtrip() {
        let json = r#"[{"id":4,"user_id":7,"name":"a","period":"1h2m","end_at":null}]"#;
        let repo: InMemoryRepo = serde_json::from_str(json).unwrap();
        let s = repo.get_by_id(UserId(7), ScheduleId(4)).unwrap();
        assert_eq!(s.period.as_delta(), TimeDelta::minutes(62));
        assert_eq!(
            serde_json::to_string(&repo).unwrap(),
            r#"[{"id":4,"user_id":7,"name":"a","period":"1h2m0s","end_at":null}]"#
        );
    }
}
