//! Schedules, their end-hour resolution, and the values derived from them.

use chrono::{DateTime, Days, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::config::DayWindowConfig;
use crate::error::{DosageError, Result};
use crate::value::{ScheduleEndAt, ScheduleId, SchedulePeriod, TimetableItem, UserId};

/// Longest accepted medicine name, in bytes.
pub const MAX_MEDICINE_NAME_LEN: usize = 255;

/// A recurring medication-taking plan as stored by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub user_id: UserId,
    pub name: String,
    pub period: SchedulePeriod,
    #[serde(default)]
    pub end_at: ScheduleEndAt,
}

impl Schedule {
    /// Combine the date-only `end_at` with `config.end_day_hour` in `location`.
    ///
    /// The stored date is never rewritten, so resolving again (in the same
    /// location, with the same config) yields the same instant.
    pub fn resolve_end_at<Tz: TimeZone>(
        &self,
        location: &Tz,
        config: &DayWindowConfig,
    ) -> Result<ResolvedSchedule> {
        let expires_at = self.end_at.resolve(location, config.end_day_hour)?;
        Ok(ResolvedSchedule {
            schedule: self.clone(),
            expires_at,
        })
    }
}

/// Resolve every schedule of a request against one location.
pub fn resolve_all<Tz: TimeZone>(
    schedules: &[Schedule],
    location: &Tz,
    config: &DayWindowConfig,
) -> Result<Vec<ResolvedSchedule>> {
    schedules
        .iter()
        .map(|s| s.resolve_end_at(location, config))
        .collect()
}

/// A schedule whose expiration has been pinned to an instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchedule {
    pub schedule: Schedule,
    /// `None` when the schedule never expires.
    pub expires_at: Option<DateTime<FixedOffset>>,
}

impl ResolvedSchedule {
    pub fn id(&self) -> ScheduleId {
        self.schedule.id
    }

    pub fn name(&self) -> &str {
        &self.schedule.name
    }

    pub fn period(&self) -> SchedulePeriod {
        self.schedule.period
    }

    /// Re-resolve from the stored date.
    pub fn resolve_end_at<Tz: TimeZone>(
        &self,
        location: &Tz,
        config: &DayWindowConfig,
    ) -> Result<ResolvedSchedule> {
        self.schedule.resolve_end_at(location, config)
    }

    /// Whether the schedule is still running at `now` (expiry is exclusive).
    pub fn is_active_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        match &self.expires_at {
            None => true,
            Some(expires_at) => expires_at > now,
        }
    }
}

/// A single upcoming dosage event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    #[serde(rename = "id")]
    pub schedule_id: ScheduleId,
    #[serde(rename = "name")]
    pub schedule_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<FixedOffset>>,
    pub period: SchedulePeriod,
    #[serde(rename = "next_taking")]
    pub timestamp: DateTime<FixedOffset>,
}

impl Occurrence {
    pub(crate) fn new(schedule: &ResolvedSchedule, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            schedule_id: schedule.id(),
            schedule_name: schedule.name().to_string(),
            end_at: schedule.expires_at,
            period: schedule.period(),
            timestamp,
        }
    }
}

/// A schedule together with the dosage instants of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleTimetable {
    pub id: ScheduleId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<FixedOffset>>,
    pub period: SchedulePeriod,
    pub timetable: Vec<TimetableItem>,
}

// ── Drafts ──────────────────────────────────────────────────────────────────

/// A schedule as requested by a user, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleDraft {
    pub user_id: UserId,
    pub name: String,
    /// Number of days the schedule runs for; `0` never expires.
    #[serde(default)]
    pub duration_days: u32,
    pub period: SchedulePeriod,
}

impl ScheduleDraft {
    /// # Errors
    ///
    /// Returns [`DosageError::InvalidSchedule`] for a zero user id, an empty
    /// name, or a name longer than [`MAX_MEDICINE_NAME_LEN`].
    pub fn validate(&self) -> Result<()> {
        if self.user_id.0 == 0 {
            return Err(DosageError::InvalidSchedule("user id is required".to_string()));
        }
        if self.name.is_empty() {
            return Err(DosageError::InvalidSchedule("name is required".to_string()));
        }
        if self.name.len() > MAX_MEDICINE_NAME_LEN {
            return Err(DosageError::InvalidSchedule(
                "medicine name is too long".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the schedule to store. The expiration date is the local date of
    /// `now + duration_days`; the id is left unassigned for the repository.
    pub fn into_schedule<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Result<Schedule> {
        self.validate()?;

        let end_at = if self.duration_days > 0 {
            let date = now
                .date_naive()
                .checked_add_days(Days::new(u64::from(self.duration_days)))
                .ok_or_else(|| {
                    DosageError::InvalidSchedule(format!(
                        "duration of {} days is out of range",
                        self.duration_days
                    ))
                })?;
            ScheduleEndAt::on(date)
        } else {
            ScheduleEndAt::never()
        };

        Ok(Schedule {
            id: ScheduleId::UNASSIGNED,
            user_id: self.user_id,
            name: self.name,
            period: self.period,
            end_at,
        })
    }
}
