//! Caller-resolved location: a fixed UTC offset or an IANA timezone.
//!
//! [`Location`] implements [`chrono::TimeZone`], so a `DateTime<Location>`
//! can be handed to any engine operation exactly like `DateTime<Utc>` or
//! `DateTime<chrono_tz::Tz>`.

use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone};
use chrono_tz::{Tz, TzOffset};

use crate::error::DosageError;

/// A timezone supplied by the caller, defaulting to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// A fixed offset such as `+10:00` or `-23:00`.
    Fixed(FixedOffset),
    /// A named IANA zone such as `Europe/Berlin`.
    Zone(Tz),
}

impl Default for Location {
    fn default() -> Self {
        Location::Fixed(chrono::Utc.fix())
    }
}

impl Location {
    pub fn utc() -> Self {
        Self::default()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Fixed(offset) => write!(f, "{offset}"),
            Location::Zone(tz) => f.write_str(tz.name()),
        }
    }
}

impl FromStr for Location {
    type Err = DosageError;

    /// Parse `"Z"`, `"UTC"`, an offset (`"+10:00"`, `"-0330"`, `"+05"`) or an
    /// IANA zone name. An empty string is UTC.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
            return Ok(Location::utc());
        }
        if s.starts_with('+') || s.starts_with('-') {
            return parse_offset(s).map(Location::Fixed);
        }
        s.parse::<Tz>()
            .map(Location::Zone)
            .map_err(|_| DosageError::InvalidTimezone(format!("'{s}'")))
    }
}

fn parse_offset(s: &str) -> Result<FixedOffset, DosageError> {
    let invalid = || DosageError::InvalidTimezone(format!("'{s}'"));

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    if !rest.is_ascii() {
        return Err(invalid());
    }
    let (hours, minutes) = match rest.len() {
        2 => (rest, "00"),
        4 => (&rest[..2], &rest[2..]),
        5 if rest.as_bytes()[2] == b':' => (&rest[..2], &rest[3..]),
        _ => return Err(invalid()),
    };
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// The offset of a [`Location`] at a particular instant.
#[derive(Debug, Clone)]
pub enum LocationOffset {
    Fixed(FixedOffset),
    Zone(TzOffset),
}

impl Offset for LocationOffset {
    fn fix(&self) -> FixedOffset {
        match self {
            LocationOffset::Fixed(offset) => *offset,
            LocationOffset::Zone(offset) => offset.fix(),
        }
    }
}

impl fmt::Display for LocationOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fix())
    }
}

impl TimeZone for Location {
    type Offset = LocationOffset;

    fn from_offset(offset: &LocationOffset) -> Self {
        match offset {
            LocationOffset::Fixed(offset) => Location::Fixed(*offset),
            LocationOffset::Zone(offset) => Location::Zone(<Tz as TimeZone>::from_offset(offset)),
        }
    }

    #[allow(deprecated)]
    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<LocationOffset> {
        match self {
            Location::Fixed(offset) => offset
                .offset_from_local_date(local)
                .map(LocationOffset::Fixed),
            Location::Zone(tz) => tz.offset_from_local_date(local).map(LocationOffset::Zone),
        }
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<LocationOffset> {
        match self {
            Location::Fixed(offset) => offset
                .offset_from_local_datetime(local)
                .map(LocationOffset::Fixed),
            Location::Zone(tz) => tz
                .offset_from_local_datetime(local)
                .map(LocationOffset::Zone),
        }
    }

    #[allow(deprecated)]
    fn offset_from_utc_date(&self, utc: &NaiveDate) -> LocationOffset {
        match self {
            Location::Fixed(offset) => LocationOffset::Fixed(offset.offset_from_utc_date(utc)),
            Location::Zone(tz) => LocationOffset::Zone(tz.offset_from_utc_date(utc)),
        }
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> LocationOffset {
        match self {
            Location::Fixed(offset) => LocationOffset::Fixed(offset.offset_from_utc_datetime(utc)),
            Location::Zone(tz) => LocationOffset::Zone(tz.offset_from_utc_datetime(utc)),
        }
    }
}
