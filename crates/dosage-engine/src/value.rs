//! Temporal and identifier value types for schedules.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::clock::at_hour;
use crate::duration::{format_duration, serde_duration};
use crate::error::{DosageError, Result};

// ── Identifiers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub u64);

impl ScheduleId {
    /// Placeholder for a schedule the repository has not stored yet.
    pub const UNASSIGNED: ScheduleId = ScheduleId(0);
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner of a schedule (a 16-digit medical policy number).
///
/// `Debug` never reveals the number so it stays out of logs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserId(hidden)")
    }
}

// ── Period ──────────────────────────────────────────────────────────────────

/// Spacing between consecutive doses within a day, always in `[1h, 24h]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SchedulePeriod(TimeDelta);

impl SchedulePeriod {
    pub const MIN: TimeDelta = TimeDelta::hours(1);
    pub const MAX: TimeDelta = TimeDelta::hours(24);

    /// # Errors
    ///
    /// Returns [`DosageError::InvalidPeriod`] when `period` is shorter than one
    /// hour or longer than 24 hours.
    pub fn new(period: TimeDelta) -> Result<Self> {
        if period < Self::MIN {
            return Err(DosageError::InvalidPeriod(format!(
                "period is too short: {}",
                format_duration(period)
            )));
        }
        if period > Self::MAX {
            return Err(DosageError::InvalidPeriod(format!(
                "period is too long: {}",
                format_duration(period)
            )));
        }
        Ok(Self(period))
    }

    pub fn as_delta(&self) -> TimeDelta {
        self.0
    }
}

impl fmt::Display for SchedulePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl Serialize for SchedulePeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serde_duration::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for SchedulePeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let delta = serde_duration::deserialize(deserializer)?;
        SchedulePeriod::new(delta).map_err(serde::de::Error::custom)
    }
}

// ── Expiration ──────────────────────────────────────────────────────────────

/// Date-only expiration as persisted. `None` never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleEndAt(Option<NaiveDate>);

impl ScheduleEndAt {
    pub fn never() -> Self {
        Self(None)
    }

    pub fn on(date: NaiveDate) -> Self {
        Self(Some(date))
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.0
    }

    pub fn is_never(&self) -> bool {
        self.0.is_none()
    }

    /// The expiration instant: the stored date at `end_day_hour:00:00` in
    /// `location`.
    pub fn resolve<Tz: TimeZone>(
        &self,
        location: &Tz,
        end_day_hour: u32,
    ) -> Result<Option<DateTime<FixedOffset>>> {
        self.0
            .map(|date| at_hour(location, date, end_day_hour).map(|t| t.fixed_offset()))
            .transpose()
    }
}

impl From<Option<NaiveDate>> for ScheduleEndAt {
    fn from(date: Option<NaiveDate>) -> Self {
        Self(date)
    }
}

// ── Timetable ───────────────────────────────────────────────────────────────

/// A single rounded dosage instant within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimetableItem(pub DateTime<FixedOffset>);

impl TimetableItem {
    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Wall-clock form, e.g. `08:15:00`.
impl fmt::Display for TimetableItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_period_bounds() {
        assert!(SchedulePeriod::new(TimeDelta::hours(1)).is_ok());
        assert!(SchedulePeriod::new(TimeDelta::hours(24)).is_ok());
        assert!(SchedulePeriod::new(TimeDelta::minutes(62)).is_ok());

        let err = SchedulePeriod::new(TimeDelta::minutes(59)).unwrap_err().to_string();
        assert!(err.contains("too short"), "got: {err}");
        let err = SchedulePeriod::new(TimeDelta::hours(25)).unwrap_err().to_string();
        assert!(err.contains("too long"), "got: {err}");
        assert!(SchedulePeriod::new(TimeDelta::zero()).is_err());
        assert!(SchedulePeriod::new(TimeDelta::hours(-2)).is_err());
    }

    #[test]
    fn test_period_serde_enforces_bounds() {
        let p: SchedulePeriod = serde_json::from_str(r#""1h2m""#).unwrap();
        assert_eq!(p.as_delta(), TimeDelta::minutes(62));
        assert_eq!(serde_json::to_string(&p).unwrap(), r#""1h2m0s""#);

        let p: SchedulePeriod = serde_json::from_str("3600").unwrap();
        assert_eq!(p.to_string(), "1h0m0s");

        assert!(serde_json::from_str::<SchedulePeriod>(r#""30m""#).is_err());
    }

    #[test]
    fn test_user_id_debug_is_hidden() {
        let id = UserId(1234567890123456);
        assert_eq!(format!("{id:?}"), "UserId(hidden)");
        assert_eq!(serde_json::to_string(&id).unwrap(), "1234567890123456");
    }

    #[test]
    fn test_end_at_resolves_to_end_hour_in_location() {
        let end = ScheduleEndAt::on(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        let at = end.resolve(&Utc, 22).unwrap().unwrap();
        assert_eq!(at.to_rfc3339(), "2025-01-02T22:00:00+00:00");

        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let at = end.resolve(&tokyo, 22).unwrap().unwrap();
        assert_eq!(at.to_rfc3339(), "2025-01-02T22:00:00+09:00");
    }

    #[test]
    fn test_end_at_never_resolves_to_none() {
        assert!(ScheduleEndAt::never().resolve(&Utc, 22).unwrap().is_none());
        assert!(ScheduleEndAt::never().is_never());
    }

    #[test]
    fn test_end_at_serde_is_plain_date_or_null() {
        let end: ScheduleEndAt = serde_json::from_str(r#""2025-01-02""#).unwrap();
        assert_eq!(end.date(), NaiveDate::from_ymd_opt(2025, 1, 2));
        let end: ScheduleEndAt = serde_json::from_str("null").unwrap();
        assert!(end.is_never());
    }

    #[test]
    fn test_timetable_item_display_is_time_only() {
        let t = Utc
            .with_ymd_and_hms(2025, 1, 1, 8, 15, 0)
            .unwrap()
            .fixed_offset();
        assert_eq!(TimetableItem(t).to_string(), "08:15:00");
    }
}
