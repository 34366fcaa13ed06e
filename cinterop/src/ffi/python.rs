//! PyO3 bridge
//!
//! Python containers are converted with the marshaling layer and the
//! builders only: every conversion goes through a flat struct and back, the
//! way a C host would see it.

use std::collections::BTreeMap;

use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;

use crate::builders::MultiStatisticSpec;
use crate::core::time::Timestamp;
use crate::disposal::{dispose, Owned};
use crate::error::InteropError;
use crate::marshal::{MultiTimeSeries, ToFlat};
use crate::models::{MultiRegularTimeSeriesData, TimeSeriesGeometry};

impl From<InteropError> for PyErr {
    fn from(err: InteropError) -> Self {
        match err {
            InteropError::DuplicateKey { .. } => PyKeyError::new_err(err.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

/// Python wrapper for [`Timestamp`]
#[pyclass(name = "DateTimeToSecond")]
pub struct PyDateTimeToSecond {
    inner: Timestamp,
}

#[pymethods]
impl PyDateTimeToSecond {
    #[new]
    #[pyo3(signature = (year, month, day, hour=0, minute=0, second=0))]
    fn new(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> PyResult<Self> {
        let inner = Timestamp::new(year, month, day, hour, minute, second)?;
        Ok(Self { inner })
    }

    /// Parse `YYYY-MM-DD[ HH:MM:SS]`
    #[staticmethod]
    fn parse(text: &str) -> PyResult<Self> {
        Ok(Self {
            inner: text.parse()?,
        })
    }

    #[getter]
    fn year(&self) -> i32 {
        self.inner.year
    }

    #[getter]
    fn month(&self) -> i32 {
        self.inner.month
    }

    #[getter]
    fn day(&self) -> i32 {
        self.inner.day
    }

    #[getter]
    fn hour(&self) -> i32 {
        self.inner.hour
    }

    #[getter]
    fn minute(&self) -> i32 {
        self.inner.minute
    }

    #[getter]
    fn second(&self) -> i32 {
        self.inner.second
    }

    fn __repr__(&self) -> String {
        format!("DateTimeToSecond({})", self.inner)
    }
}

/// Python wrapper for [`TimeSeriesGeometry`]
#[pyclass(name = "RegularTimeSeriesGeometry")]
pub struct PyRegularTimeSeriesGeometry {
    inner: TimeSeriesGeometry,
}

#[pymethods]
impl PyRegularTimeSeriesGeometry {
    #[new]
    #[pyo3(signature = (start, time_step_seconds, length, monthly=false))]
    fn new(
        start: PyRef<'_, PyDateTimeToSecond>,
        time_step_seconds: i32,
        length: i32,
        monthly: bool,
    ) -> PyResult<Self> {
        if length < 0 {
            return Err(PyValueError::new_err("length must not be negative"));
        }
        let inner = if monthly {
            TimeSeriesGeometry::monthly(start.inner, length)
        } else {
            TimeSeriesGeometry::regular(start.inner, time_step_seconds, length)
        };
        Ok(Self { inner })
    }

    #[getter]
    fn length(&self) -> i32 {
        self.inner.length
    }

    #[getter]
    fn time_step_seconds(&self) -> i32 {
        self.inner.time_step_seconds
    }

    #[getter]
    fn time_step_code(&self) -> i32 {
        self.inner.time_step_code
    }

    /// Instants of the series as ISO 8601 strings
    fn time_index(&self) -> PyResult<Vec<String>> {
        Ok(self
            .inner
            .time_index()?
            .into_iter()
            .map(|t| Timestamp::from(t).to_string())
            .collect())
    }

    fn end(&self) -> PyResult<PyDateTimeToSecond> {
        Ok(PyDateTimeToSecond {
            inner: self.inner.end()?,
        })
    }
}

/// Python owner of a flat [`MultiRegularTimeSeriesData`]
///
/// The flat struct is disposed when the Python object is collected.
#[pyclass(name = "MultiRegularTimeSeries", unsendable)]
pub struct PyMultiRegularTimeSeries {
    inner: Owned<MultiRegularTimeSeriesData>,
}

#[pymethods]
impl PyMultiRegularTimeSeries {
    #[new]
    fn new(geometry: PyRef<'_, PyRegularTimeSeriesGeometry>) -> Self {
        // SAFETY: an empty series owns nothing.
        let inner = unsafe { Owned::from_value(MultiRegularTimeSeriesData::empty(geometry.inner)) };
        Self { inner }
    }

    #[getter]
    fn ensemble_size(&self) -> i32 {
        self.inner.ensemble_size
    }

    /// Replace the rows; each must have the geometry's length
    fn set_numeric_data(&mut self, rows: Vec<Vec<f64>>) -> PyResult<()> {
        let series = MultiTimeSeries::new(self.inner.time_series_geometry, rows)?;
        // the previous rows are released when the old guard drops
        self.inner = series.to_flat()?;
        Ok(())
    }

    fn clear_numeric_data(&mut self) {
        // SAFETY: the guard owns the members being released.
        unsafe { dispose(self.inner.get_mut()) }
    }

    fn numeric_data(&self) -> PyResult<Vec<Vec<f64>>> {
        Ok(self.inner.to_native::<MultiTimeSeries>()?.data)
    }
}

/// Pass a dict through a named value vector
#[pyfunction]
fn dict_to_named_values_roundtrip(values: BTreeMap<String, f64>) -> PyResult<BTreeMap<String, f64>> {
    Ok(values.to_flat()?.into_native()?)
}

/// Pass a dict through a string map
#[pyfunction]
fn dict_to_string_map_roundtrip(values: BTreeMap<String, String>) -> PyResult<BTreeMap<String, String>> {
    Ok(values.to_flat()?.into_native()?)
}

/// Pass a list of strings through a character vector
#[pyfunction]
fn list_to_character_vector_roundtrip(values: Vec<String>) -> PyResult<Vec<String>> {
    Ok(values.to_flat()?.into_native()?)
}

/// Pass a JSON statistics document through a multi-statistic definition
#[pyfunction]
fn statistics_json_roundtrip(json: &str) -> PyResult<String> {
    let spec = MultiStatisticSpec::from_json(json)?;
    let back: MultiStatisticSpec = spec.to_flat()?.into_native()?;
    serde_json::to_string(&back).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Register classes and functions on the extension module
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDateTimeToSecond>()?;
    m.add_class::<PyRegularTimeSeriesGeometry>()?;
    m.add_class::<PyMultiRegularTimeSeries>()?;
    m.add_function(wrap_pyfunction!(dict_to_named_values_roundtrip, m)?)?;
    m.add_function(wrap_pyfunction!(dict_to_string_map_roundtrip, m)?)?;
    m.add_function(wrap_pyfunction!(list_to_character_vector_roundtrip, m)?)?;
    m.add_function(wrap_pyfunction!(statistics_json_roundtrip, m)?)?;
    Ok(())
}
