//! Time series: ensembles of rows sharing a regular geometry

use serde::{Deserialize, Serialize};

use super::read::{borrow_slice, read_jagged_array, read_string};
use super::{FromFlat, ToFlat};
use crate::core::time::Timestamp;
use crate::disposal::raw::{into_raw_array, to_c_string, to_raw_jagged_array};
use crate::disposal::Owned;
use crate::error::{InteropError, Result};
use crate::models::{
    declared_len, MultiRegularTimeSeriesData, TimeSeriesDimensionDescription,
    TimeSeriesDimensionsDescription, TimeSeriesGeometry,
};

/// Native counterpart of [`MultiRegularTimeSeriesData`]
///
/// Each row of `data` is one ensemble member of `geometry.length` values.
///
/// # Example
/// ```
/// use cinterop::{MultiTimeSeries, Timestamp, TimeSeriesGeometry, ToFlat};
///
/// let start = Timestamp::new(2001, 1, 2, 3, 4, 5).unwrap();
/// let geom = TimeSeriesGeometry::regular(start, 86400, 3);
/// let series = MultiTimeSeries::new(geom, vec![vec![1.0, 2.0, 3.0]]).unwrap();
/// let flat = series.to_flat().unwrap();
/// assert_eq!(flat.ensemble_size, 1);
/// ```
///
/// Deserialization goes through the same row-length check as [`Self::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMultiTimeSeries")]
pub struct MultiTimeSeries {
    pub geometry: TimeSeriesGeometry,
    pub data: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct RawMultiTimeSeries {
    geometry: TimeSeriesGeometry,
    data: Vec<Vec<f64>>,
}

impl TryFrom<RawMultiTimeSeries> for MultiTimeSeries {
    type Error = InteropError;

    fn try_from(raw: RawMultiTimeSeries) -> Result<Self> {
        if raw.geometry.length < 0 {
            return Err(InteropError::NegativeLength {
                what: "time series geometry",
                len: raw.geometry.length,
            });
        }
        Self::new(raw.geometry, raw.data)
    }
}

impl MultiTimeSeries {
    /// Check that every row is as long as the geometry
    ///
    /// # Errors
    /// [`InteropError::LengthMismatch`] for the first row of the wrong length.
    ///
    /// # Panics
    /// If the geometry declares a negative length.
    pub fn new(geometry: TimeSeriesGeometry, data: Vec<Vec<f64>>) -> Result<Self> {
        let series = Self { geometry, data };
        series.validate()?;
        Ok(series)
    }

    /// Number of ensemble members
    pub fn ensemble_size(&self) -> usize {
        self.data.len()
    }

    fn validate(&self) -> Result<()> {
        let expected = self.geometry.len();
        match self.data.iter().find(|row| row.len() != expected) {
            Some(row) => Err(InteropError::LengthMismatch {
                what: "time series row",
                expected,
                actual: row.len(),
            }),
            None => Ok(()),
        }
    }

    /// Sub-series whose instants lie within `[from, to]`
    ///
    /// `None` bounds are open. The geometry of the result starts at the
    /// first retained instant; an empty selection keeps the original start.
    ///
    /// # Errors
    /// [`InteropError::LengthMismatch`] if a row no longer matches the
    /// geometry, plus the errors of [`TimeSeriesGeometry::time_index`].
    pub fn window(&self, from: Option<Timestamp>, to: Option<Timestamp>) -> Result<Self> {
        self.validate()?;
        let from = from.map(|t| t.to_naive()).transpose()?;
        let to = to.map(|t| t.to_naive()).transpose()?;
        let index = self.geometry.time_index()?;
        let keep = |t: &chrono::NaiveDateTime| {
            from.map_or(true, |f| *t >= f) && to.map_or(true, |e| *t <= e)
        };
        let first = index.iter().position(|t| keep(t)).unwrap_or(index.len());
        let count = index[first..].iter().take_while(|t| keep(t)).count();

        let mut geometry = self.geometry;
        if count > 0 {
            geometry.start = Timestamp::from(index[first]);
        }
        geometry.length = count as i32;
        let data = self
            .data
            .iter()
            .map(|row| row[first..first + count].to_vec())
            .collect();
        Ok(Self { geometry, data })
    }
}

impl ToFlat for MultiTimeSeries {
    type Flat = MultiRegularTimeSeriesData;

    fn to_flat(&self) -> Result<Owned<MultiRegularTimeSeriesData>> {
        self.validate()?;
        let ensemble_size =
            i32::try_from(self.data.len()).map_err(|_| InteropError::LengthOverflow {
                what: "ensemble",
                len: self.data.len(),
            })?;
        let mtsd = MultiRegularTimeSeriesData {
            time_series_geometry: self.geometry,
            ensemble_size,
            numeric_data: to_raw_jagged_array(&self.data),
        };
        // SAFETY: rows freshly allocated above, each of `geometry.length`.
        Ok(unsafe { Owned::from_value(mtsd) })
    }
}

impl FromFlat<MultiRegularTimeSeriesData> for MultiTimeSeries {
    unsafe fn from_flat_ref(flat: &MultiRegularTimeSeriesData) -> Result<Self> {
        let n_rows = declared_len(flat.ensemble_size, "ensemble size");
        let row_len = if n_rows == 0 {
            0
        } else {
            flat.time_series_geometry.len()
        };
        Ok(Self {
            geometry: flat.time_series_geometry,
            data: read_jagged_array(flat.numeric_data, n_rows, row_len),
        })
    }
}

impl ToFlat for [(String, usize)] {
    type Flat = TimeSeriesDimensionsDescription;

    fn to_flat(&self) -> Result<Owned<TimeSeriesDimensionsDescription>> {
        let num_dimensions = i32::try_from(self.len()).map_err(|_| InteropError::LengthOverflow {
            what: "dimensions",
            len: self.len(),
        })?;
        let names = self
            .iter()
            .enumerate()
            .map(|(i, (name, _))| to_c_string(name, i))
            .collect::<Result<Vec<_>>>()?;
        let dimensions = names
            .into_iter()
            .zip(self)
            .map(|(name, (_, size))| TimeSeriesDimensionDescription {
                dimension_type: name.into_raw(),
                size: *size,
            })
            .collect();
        let d = TimeSeriesDimensionsDescription {
            dimensions: into_raw_array(dimensions),
            num_dimensions,
        };
        // SAFETY: members freshly allocated above.
        Ok(unsafe { Owned::from_value(d) })
    }
}

impl FromFlat<TimeSeriesDimensionsDescription> for Vec<(String, usize)> {
    unsafe fn from_flat_ref(flat: &TimeSeriesDimensionsDescription) -> Result<Self> {
        let n = declared_len(flat.num_dimensions, "dimensions");
        borrow_slice(flat.dimensions, n, "dimensions")
            .iter()
            .enumerate()
            .map(|(i, d)| Ok((read_string(d.dimension_type, i)?, d.size)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(length: i32) -> TimeSeriesGeometry {
        TimeSeriesGeometry::regular(Timestamp::new(2000, 1, 1, 0, 0, 0).unwrap(), 86400, length)
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = MultiTimeSeries::new(daily(3), vec![vec![1.0, 2.0, 3.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            InteropError::LengthMismatch {
                expected: 3,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_round_trip_through_flat() {
        let series = MultiTimeSeries::new(daily(4), vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0; 4]]).unwrap();
        let flat = series.to_flat().unwrap();
        assert_eq!(flat.ensemble_size, 2);
        let back: MultiTimeSeries = flat.into_native().unwrap();
        assert_eq!(back, series);
    }

    #[test]
    fn test_zero_members() {
        let series = MultiTimeSeries::new(daily(5), Vec::new()).unwrap();
        let flat = series.to_flat().unwrap();
        assert!(flat.numeric_data.is_null());
        assert_eq!(flat.into_native::<MultiTimeSeries>().unwrap(), series);
    }

    #[test]
    fn test_window() {
        let data: Vec<f64> = (0..31).map(f64::from).collect();
        let series = MultiTimeSeries::new(daily(31), vec![data]).unwrap();
        let mid = Timestamp::new(2000, 1, 13, 0, 0, 0).unwrap();

        let w = series.window(Some(mid), None).unwrap();
        assert_eq!(w.geometry.length, 31 - 13 + 1);
        assert_eq!(w.geometry.start, mid);
        assert_eq!(w.data[0][0], 12.0);

        let w = series.window(None, Some(mid)).unwrap();
        assert_eq!(w.geometry.length, 13);
        assert_eq!(w.geometry.end().unwrap(), mid);

        let w = series.window(None, None).unwrap();
        assert_eq!(w, series);
    }

    #[test]
    fn test_window_of_edited_ragged_series_is_an_error() {
        let mut series = MultiTimeSeries::new(daily(3), vec![vec![1.0, 2.0, 3.0]]).unwrap();
        series.data[0].truncate(1);
        assert!(matches!(
            series.window(None, None),
            Err(InteropError::LengthMismatch {
                expected: 3,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_deserialize_validates_rows() {
        let geometry = r#"{"start": {"year": 2000, "month": 1, "day": 1, "hour": 0, "minute": 0, "second": 0},
            "time_step_seconds": 86400, "length": 3, "time_step_code": 0}"#;

        let ok = format!(r#"{{"geometry": {geometry}, "data": [[1.0, 2.0, 3.0]]}}"#);
        let series: MultiTimeSeries = serde_json::from_str(&ok).unwrap();
        assert_eq!(series.window(None, None).unwrap(), series);

        let ragged = format!(r#"{{"geometry": {geometry}, "data": [[1.0]]}}"#);
        let err = serde_json::from_str::<MultiTimeSeries>(&ragged).unwrap_err();
        assert!(err.to_string().contains("expected 3, got 1"));

        let negative = ok.replace(r#""length": 3"#, r#""length": -3"#);
        let err = serde_json::from_str::<MultiTimeSeries>(&negative).unwrap_err();
        assert!(err.to_string().contains("Negative length -3"));
    }

    #[test]
    fn test_dimensions_round_trip() {
        let dims: Vec<(String, usize)> = vec![("ensemble".to_string(), 3), ("time".to_string(), 10)];
        let flat = dims.to_flat().unwrap();
        assert_eq!(flat.num_dimensions, 2);
        assert_eq!(flat.into_native::<Vec<(String, usize)>>().unwrap(), dims);
    }
}
