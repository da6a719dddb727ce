//! Duration strings used by configuration and schedule periods.
//!
//! Accepted input is one or more `<number><unit>` components (`w`, `d`, `h`,
//! `m`, `s`), e.g. `"1h2m"`, `"90m"`, `"1d"`, or a bare integer meaning
//! seconds. Output uses the canonical `"1h2m0s"` form.

use chrono::TimeDelta;

use crate::error::{DosageError, Result};

/// Parse a duration string such as `"1h"`, `"15m"`, `"1h2m"` or `"3600"`.
///
/// # Errors
///
/// Returns [`DosageError::InvalidDuration`] for empty input, unknown units,
/// a unit without a number, or a trailing number without a unit (other than
/// the bare-integer form).
pub fn parse_duration(s: &str) -> Result<TimeDelta> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DosageError::InvalidDuration("empty duration".to_string()));
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = s
            .parse()
            .map_err(|_| DosageError::InvalidDuration(format!("invalid number in '{s}'")))?;
        return TimeDelta::try_seconds(secs)
            .ok_or_else(|| DosageError::InvalidDuration(format!("out of range: '{s}'")));
    }

    let mut total_seconds: i64 = 0;
    let mut num_buf = String::new();

    for ch in s.chars() {
        if ch.is_ascii_digit() {
            num_buf.push(ch);
            continue;
        }
        if num_buf.is_empty() {
            return Err(DosageError::InvalidDuration(format!(
                "expected number before '{ch}' in '{s}'"
            )));
        }
        let n: i64 = num_buf
            .parse()
            .map_err(|_| DosageError::InvalidDuration(format!("invalid number in '{s}'")))?;
        num_buf.clear();

        let unit_seconds = match ch {
            'w' | 'W' => 7 * 86_400,
            'd' | 'D' => 86_400,
            'h' | 'H' => 3_600,
            'm' | 'M' => 60,
            's' | 'S' => 1,
            _ => {
                return Err(DosageError::InvalidDuration(format!(
                    "unknown unit '{ch}' in '{s}'"
                )));
            }
        };
        total_seconds = n
            .checked_mul(unit_seconds)
            .and_then(|v| total_seconds.checked_add(v))
            .ok_or_else(|| DosageError::InvalidDuration(format!("out of range: '{s}'")))?;
    }

    if !num_buf.is_empty() {
        return Err(DosageError::InvalidDuration(format!(
            "number without unit at end of '{s}'"
        )));
    }

    TimeDelta::try_seconds(total_seconds)
        .ok_or_else(|| DosageError::InvalidDuration(format!("out of range: '{s}'")))
}

/// Format a duration as `"1h2m0s"`, `"15m0s"` or `"30s"`.
pub fn format_duration(d: TimeDelta) -> String {
    let total = d.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let abs = total.unsigned_abs();

    let hours = abs / 3600;
    let minutes = (abs % 3600) / 60;
    let seconds = abs % 60;

    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}

/// Serde adapter: serializes as a duration string, deserializes from either a
/// duration string or an integer number of seconds.
pub mod serde_duration {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(d: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => TimeDelta::try_seconds(secs)
                .ok_or_else(|| serde::de::Error::custom(format!("duration out of range: {secs}"))),
            Raw::Text(s) => super::parse_duration(&s).map_err(serde::de::Error::custom),
        }
    }
}
