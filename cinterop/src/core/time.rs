//! Time stamps crossing the boundary
//!
//! A [`Timestamp`] is a plain six-integer value with a resolution of one
//! second and no time zone. It owns nothing, so it is copied freely and never
//! goes through the disposal registry.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{InteropError, Result};

/// Date and time of day to the second, laid out as six C `int`s
///
/// The fields are public because hosts write them directly. Use
/// [`Timestamp::new`] or a conversion from [`NaiveDateTime`] when the values
/// must be checked against the calendar.
///
/// # Example
/// ```
/// use cinterop::Timestamp;
///
/// let t = Timestamp::new(2001, 1, 2, 3, 4, 5).unwrap();
/// assert_eq!(t.year, 2001);
/// assert_eq!(t.to_string(), "2001-01-02T03:04:05");
///
/// assert!(Timestamp::new(2001, 2, 29, 0, 0, 0).is_err());
/// ```
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl Timestamp {
    /// Create a timestamp, rejecting fields that are not a real calendar instant
    ///
    /// # Errors
    /// [`InteropError::MalformedTimestamp`] for e.g. month 13, February 30th
    /// or second 60.
    pub fn new(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> Result<Self> {
        let t = Self::from_parts(year, month, day, hour, minute, second);
        t.to_naive()?;
        Ok(t)
    }

    /// Create a timestamp without any calendar check
    ///
    /// This mirrors a host writing the six fields itself; validity is only
    /// checked when the value is converted with [`Timestamp::to_naive`].
    pub const fn from_parts(
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: i32,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Copy the fields of a native date-time
    pub fn from_naive(dt: &NaiveDateTime) -> Self {
        Self::from_parts(
            dt.year(),
            dt.month() as i32,
            dt.day() as i32,
            dt.hour() as i32,
            dt.minute() as i32,
            dt.second() as i32,
        )
    }

    /// Convert to a native date-time
    ///
    /// # Errors
    /// [`InteropError::MalformedTimestamp`] if any field is out of range.
    pub fn to_naive(&self) -> Result<NaiveDateTime> {
        let field = |v: i32| u32::try_from(v).map_err(|_| InteropError::MalformedTimestamp(*self));
        let (month, day) = (field(self.month)?, field(self.day)?);
        let (hour, minute, second) = (field(self.hour)?, field(self.minute)?, field(self.second)?);
        NaiveDate::from_ymd_opt(self.year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .ok_or(InteropError::MalformedTimestamp(*self))
    }

    /// Whether the fields describe a real calendar instant
    pub fn is_valid(&self) -> bool {
        self.to_naive().is_ok()
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::from_naive(&dt)
    }
}

impl TryFrom<Timestamp> for NaiveDateTime {
    type Error = InteropError;

    fn try_from(t: Timestamp) -> Result<Self> {
        t.to_naive()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

impl FromStr for Timestamp {
    type Err = InteropError;

    /// Parse a naive date or date-time; any trailing offset is an error
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        DATE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(Self::from)
            .ok_or_else(|| InteropError::UnparsableTimestamp {
                input: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_fields() {
        assert!(Timestamp::new(2001, 13, 1, 0, 0, 0).is_err());
        assert!(Timestamp::new(2001, 1, 0, 0, 0, 0).is_err());
        assert!(Timestamp::new(2001, 1, 1, 24, 0, 0).is_err());
        assert!(Timestamp::new(2001, 1, 1, 0, 0, 60).is_err());
        assert!(Timestamp::new(2001, 1, 1, -1, 0, 0).is_err());
    }

    #[test]
    fn test_default_is_not_a_valid_instant() {
        assert!(!Timestamp::default().is_valid());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a = Timestamp::new(2000, 12, 31, 23, 59, 59).unwrap();
        let b = Timestamp::new(2001, 1, 1, 0, 0, 0).unwrap();
        assert!(a < b);
    }
}
