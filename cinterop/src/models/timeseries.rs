//! Time-series flat structs
//!
//! [`TimeSeriesGeometry`] is a pure value type. [`MultiRegularTimeSeriesData`]
//! owns a jagged array: `ensemble_size` rows, each heap-allocated on its own
//! and each `time_series_geometry.length` long.

use std::os::raw::c_char;
use std::ptr;

use chrono::{Datelike, Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::declared_len;
use crate::core::time::Timestamp;
use crate::error::{InteropError, Result};

/// `time_step_seconds` value carried by monthly geometries
pub const MONTHLY_STEP_SECONDS: i32 = -1;

/// Kind of time stepping of a geometry
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeStepCode {
    /// Every step has the same length, `time_step_seconds`
    StrictlyRegular = 0,
    /// Calendar months; overrides `time_step_seconds`
    MonthlyStep = 1,
}

impl TryFrom<i32> for TimeStepCode {
    type Error = InteropError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::StrictlyRegular),
            1 => Ok(Self::MonthlyStep),
            other => Err(InteropError::InvalidTimeStepCode(other)),
        }
    }
}

/// Temporal definition of a regular time series
///
/// The step kind is stored as a plain `int` rather than a Rust enum so that
/// an unexpected value written by a host is an error, not undefined behavior.
///
/// # Example
/// ```
/// use cinterop::{Timestamp, TimeSeriesGeometry};
///
/// let start = Timestamp::new(2000, 1, 2, 3, 4, 5).unwrap();
/// let geom = TimeSeriesGeometry::regular(start, 3600, 7);
/// let index = geom.time_index().unwrap();
/// assert_eq!(index.len(), 7);
/// assert_eq!(geom.end().unwrap(), Timestamp::new(2000, 1, 2, 9, 4, 5).unwrap());
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesGeometry {
    /// First instant of the series
    pub start: Timestamp,
    /// Step length, e.g. 3600 for hourly; -1 for monthly series
    pub time_step_seconds: i32,
    /// Number of time steps
    pub length: i32,
    /// A [`TimeStepCode`] discriminant
    pub time_step_code: i32,
}

impl TimeSeriesGeometry {
    /// Geometry with a fixed step length
    pub fn regular(start: Timestamp, time_step_seconds: i32, length: i32) -> Self {
        Self {
            start,
            time_step_seconds,
            length,
            time_step_code: TimeStepCode::StrictlyRegular as i32,
        }
    }

    /// Geometry stepping by calendar month
    pub fn monthly(start: Timestamp, length: i32) -> Self {
        Self {
            start,
            time_step_seconds: MONTHLY_STEP_SECONDS,
            length,
            time_step_code: TimeStepCode::MonthlyStep as i32,
        }
    }

    /// Decoded step kind
    pub fn step_code(&self) -> Result<TimeStepCode> {
        TimeStepCode::try_from(self.time_step_code)
    }

    /// Number of time steps as a length
    ///
    /// # Panics
    /// If `length` is negative.
    pub fn len(&self) -> usize {
        declared_len(self.length, "time series geometry")
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Instant of the `i`-th step
    ///
    /// # Errors
    /// [`InteropError::TimeIndexOutOfRange`] when the instant falls outside
    /// the calendar range chrono can represent.
    pub fn instant(&self, i: usize) -> Result<NaiveDateTime> {
        let start = self.start.to_naive()?;
        let out_of_range = || InteropError::TimeIndexOutOfRange { index: i };
        match self.step_code()? {
            TimeStepCode::StrictlyRegular => {
                let offset = i64::try_from(i)
                    .ok()
                    .and_then(|i| i64::from(self.time_step_seconds).checked_mul(i))
                    .and_then(Duration::try_seconds)
                    .ok_or_else(out_of_range)?;
                start.checked_add_signed(offset).ok_or_else(out_of_range)
            }
            TimeStepCode::MonthlyStep => {
                if start.day() > 28 {
                    return Err(InteropError::UnsupportedMonthlyStart { day: start.day() });
                }
                let months = u32::try_from(i).map_err(|_| out_of_range())?;
                // Day of month <= 28 means adding months never clamps.
                start
                    .checked_add_months(Months::new(months))
                    .ok_or_else(out_of_range)
            }
        }
    }

    /// All the instants of the series, in order
    ///
    /// # Errors
    /// Malformed start, unknown step code, a monthly series starting after
    /// the 28th of a month, or a step past the representable calendar range.
    pub fn time_index(&self) -> Result<Vec<NaiveDateTime>> {
        (0..self.len()).map(|i| self.instant(i)).collect()
    }

    /// Last instant of the series; the start for an empty series
    pub fn end(&self) -> Result<Timestamp> {
        let last = self.len().saturating_sub(1);
        self.instant(last).map(Timestamp::from)
    }
}

/// Multivariate (ensemble) time series with a regular geometry
#[repr(C)]
#[derive(Debug)]
pub struct MultiRegularTimeSeriesData {
    /// Temporal definition shared by every row. Its `length` sizes the release
    /// of each row, so it must not change while `numeric_data` is populated.
    pub time_series_geometry: TimeSeriesGeometry,
    /// Number of rows in `numeric_data`
    pub ensemble_size: i32,
    /// Owned array of `ensemble_size` owned rows of `length` values
    pub numeric_data: *mut *mut f64,
}

impl MultiRegularTimeSeriesData {
    pub const fn empty(geometry: TimeSeriesGeometry) -> Self {
        Self {
            time_series_geometry: geometry,
            ensemble_size: 0,
            numeric_data: ptr::null_mut(),
        }
    }
}

/// One dimension of a multidimensional time series
#[repr(C)]
#[derive(Debug)]
pub struct TimeSeriesDimensionDescription {
    /// Owned name of the dimension, e.g. "ensemble"
    pub dimension_type: *mut c_char,
    pub size: usize,
}

/// Dimensions of a multidimensional time series
#[repr(C)]
#[derive(Debug)]
pub struct TimeSeriesDimensionsDescription {
    /// Owned array of `num_dimensions` descriptions
    pub dimensions: *mut TimeSeriesDimensionDescription,
    pub num_dimensions: i32,
}

impl TimeSeriesDimensionsDescription {
    pub const fn empty() -> Self {
        Self {
            dimensions: ptr::null_mut(),
            num_dimensions: 0,
        }
    }
}
