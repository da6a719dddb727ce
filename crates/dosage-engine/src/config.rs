//! Day-window parameters shared by every engine operation.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::duration::serde_duration;
use crate::error::{DosageError, Result};

/// The daylight window, rounding granularity and default lookahead.
///
/// Hours are local clock hours in the caller-resolved location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayWindowConfig {
    /// First hour of the day at which doses may be taken.
    pub begin_day_hour: u32,
    /// Hour at which the day window closes (`24` means midnight).
    pub end_day_hour: u32,
    /// Granularity every dosage timestamp is rounded to. Zero disables rounding.
    #[serde(with = "serde_duration")]
    pub time_round: TimeDelta,
    /// Default lookahead for upcoming dosage events.
    #[serde(with = "serde_duration")]
    pub next_taking_period: TimeDelta,
}

impl Default for DayWindowConfig {
    fn default() -> Self {
        Self {
            begin_day_hour: 8,
            end_day_hour: 22,
            time_round: TimeDelta::minutes(15),
            next_taking_period: TimeDelta::hours(1),
        }
    }
}

impl DayWindowConfig {
    /// Check `begin_day_hour < end_day_hour <= 24` and that both durations are
    /// non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`DosageError::InvalidConfig`] naming the violated bound.
    pub fn validate(&self) -> Result<()> {
        if self.end_day_hour > 24 {
            return Err(DosageError::InvalidConfig(format!(
                "end_day_hour must be at most 24, got {}",
                self.end_day_hour
            )));
        }
        if self.begin_day_hour >= self.end_day_hour {
            return Err(DosageError::InvalidConfig(format!(
                "begin_day_hour ({}) must be before end_day_hour ({})",
                self.begin_day_hour, self.end_day_hour
            )));
        }
        if self.time_round < TimeDelta::zero() {
            return Err(DosageError::InvalidConfig(
                "time_round must not be negative".to_string(),
            ));
        }
        if self.next_taking_period < TimeDelta::zero() {
            return Err(DosageError::InvalidConfig(
                "next_taking_period must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Length of the day window.
    pub fn window_length(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.end_day_hour) - i64::from(self.begin_day_hour))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_service_defaults() {
        let cfg = DayWindowConfig::default();
        assert_eq!(cfg.begin_day_hour, 8);
        assert_eq!(cfg.end_day_hour, 22);
        assert_eq!(cfg.time_round, TimeDelta::minutes(15));
        assert_eq!(cfg.next_taking_period, TimeDelta::hours(1));
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.window_length(), TimeDelta::hours(14));
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let cfg = DayWindowConfig {
            begin_day_hour: 22,
            end_day_hour: 8,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("Invalid config"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_empty_window() {
        let cfg = DayWindowConfig {
            begin_day_hour: 10,
            end_day_hour: 10,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_end_past_midnight() {
        let cfg = DayWindowConfig {
            end_day_hour: 25,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_full_day() {
        let cfg = DayWindowConfig {
            begin_day_hour: 0,
            end_day_hour: 24,
            time_round: TimeDelta::zero(),
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_durations() {
        let cfg = DayWindowConfig {
            time_round: TimeDelta::minutes(-15),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = DayWindowConfig {
            next_taking_period: TimeDelta::hours(-1),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let cfg: DayWindowConfig =
            serde_json::from_str(r#"{"end_day_hour":20,"time_round":"5m"}"#).unwrap();
        assert_eq!(cfg.begin_day_hour, 8);
        assert_eq!(cfg.end_day_hour, 20);
        assert_eq!(cfg.time_round, TimeDelta::minutes(5));
        assert_eq!(cfg.next_taking_period, TimeDelta::hours(1));
    }
}
