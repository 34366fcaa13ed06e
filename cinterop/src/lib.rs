//! C Interop - flat structs and an ownership-transfer protocol
//!
//! Fixed-layout structs (numeric vectors, named vectors, string maps, time
//! series, statistic definitions) that cross a C call boundary, together with
//! the rules for building, converting and releasing them.
//!
//! # Architecture
//!
//! - **core**: Timestamps
//! - **models**: `#[repr(C)]` flat struct definitions
//! - **disposal**: Recursive teardown and the [`Owned`] guard
//! - **marshal**: Conversions between native collections and flat structs
//! - **builders**: Composite structs owning other flat structs
//! - **ffi**: `extern "C"` entry points, and the Python bridge (feature `pyo3`)
//!
//! # Critical Invariants
//!
//! 1. An empty array is a null pointer, and a null pointer with a positive
//!    declared length is a contract violation
//! 2. Every allocation handed out is released exactly once, through the
//!    disposal registry
//! 3. Converting to a flat struct always copies; nothing aliases its source

pub mod builders;
pub mod core;
pub mod disposal;
pub mod error;
pub mod ffi;
pub mod marshal;
pub mod models;

// Re-exports for convenience
pub use builders::{
    build_multi_statistic_definition, build_statistic_definition, MultiStatisticSpec,
    StatisticSpec,
};
pub use crate::core::time::Timestamp;
pub use disposal::{dispose, dispose_ptr, Disposable, Owned};
pub use error::{InteropError, Result};
pub use marshal::{
    from_flat, named_values_from_columns, string_map_from_columns, FromFlat, MultiTimeSeries,
    ToColumns, ToFlat,
};
pub use models::{
    CharacterVector, MultiRegularTimeSeriesData, MultiStatisticDefinition, NamedValueVector,
    StatisticDefinition, StringStringMap, TimeSeriesDimensionDescription,
    TimeSeriesDimensionsDescription, TimeSeriesGeometry, TimeStepCode, ValueVector,
};

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn cinterop(m: &Bound<'_, PyModule>) -> PyResult<()> {
    ffi::python::register(m)
}
