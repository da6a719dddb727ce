//! Local-clock helpers: pinning a calendar day and hour to an instant, and
//! rounding instants to a granularity.

use chrono::{DateTime, LocalResult, NaiveDate, Offset, TimeDelta, TimeZone};

use crate::error::{DosageError, Result};

/// The instant `day @ hour:00:00` in `location`.
///
/// `hour == 24` is the following day's midnight. A local time skipped by a DST
/// transition uses the offset in force before the transition; a repeated local
/// time resolves to the earlier instant.
pub(crate) fn at_hour<Tz: TimeZone>(location: &Tz, day: NaiveDate, hour: u32) -> Result<DateTime<Tz>> {
    let (day, hour) = if hour >= 24 {
        let next = day
            .succ_opt()
            .ok_or_else(|| DosageError::InvalidDatetime(format!("no day after {day}")))?;
        (next, hour - 24)
    } else {
        (day, hour)
    };
    let naive = day
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| DosageError::InvalidDatetime(format!("{day} at hour {hour}")))?;

    match location.from_local_datetime(&naive) {
        LocalResult::Single(t) => Ok(t),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => {
            let before = naive
                .checked_sub_signed(TimeDelta::days(1))
                .ok_or_else(|| DosageError::InvalidDatetime(format!("{naive} out of range")))?;
            let offset = location.offset_from_utc_datetime(&before).fix();
            let utc = naive
                .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
                .ok_or_else(|| DosageError::InvalidDatetime(format!("{naive} out of range")))?;
            Ok(location.from_utc_datetime(&utc))
        }
    }
}

/// Seconds from 0001-01-01T00:00:00Z to the Unix epoch.
const ZERO_INSTANT_TO_UNIX_SECS: i128 = 62_135_596_800;

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Round `t` to the nearest multiple of `round` counted from
/// 0001-01-01T00:00:00Z. Halfway values round up. A zero granularity returns
/// `t` unchanged.
pub(crate) fn round_to<Tz: TimeZone>(t: DateTime<Tz>, round: TimeDelta) -> Result<DateTime<Tz>> {
    if round <= TimeDelta::zero() {
        return Ok(t);
    }
    let step = round
        .num_nanoseconds()
        .map(i128::from)
        .ok_or_else(|| DosageError::InvalidDuration(format!("rounding step {round} too large")))?;

    let since_zero = (i128::from(t.timestamp()) + ZERO_INSTANT_TO_UNIX_SECS) * NANOS_PER_SEC
        + i128::from(t.timestamp_subsec_nanos());
    let remainder = since_zero.rem_euclid(step);
    let shift = if remainder * 2 < step {
        -remainder
    } else {
        step - remainder
    };

    // |shift| <= step, which came from an i64
    let shift = i64::try_from(shift)
        .map(TimeDelta::nanoseconds)
        .map_err(|_| DosageError::InvalidDuration(format!("rounding step {round} too large")))?;
    t.clone().checked_add_signed(shift).ok_or_else(|| {
        DosageError::InvalidDatetime(format!("{} rounded out of range", t.fixed_offset()))
    })
}
