//! Exported `create_*`, `set_*`, `clear_*`, `dispose_*` and accessor functions
//!
//! Type abbreviations follow the C header: `vv` value vector, `nvv` named
//! value vector, `cvec` character vector, `ssm` string map, `tsg` geometry,
//! `mtsd` multi regular time series, `stat`/`msd` statistic definitions.
//!
//! `set_*` overwrites the target without releasing what it held before: a
//! caller reusing a populated struct calls `clear_*` first.
//!
//! Every function taking pointers is `unsafe`: non-null pointers must be
//! valid for the declared lengths, and strings NUL-terminated.

#![allow(clippy::missing_safety_doc)]

use std::os::raw::c_char;
use std::ptr;

use super::{guard, guard_status, last_error_ptr};
use crate::builders::{build_multi_statistic_definition, build_statistic_definition};
use crate::builders::{MultiStatisticSpec, StatisticSpec};
use crate::core::time::Timestamp;
use crate::disposal::raw::{
    free_array, free_jagged_array, free_string, free_string_array, into_raw_string,
    to_raw_array, to_raw_jagged_array, to_raw_string_array,
};
use crate::disposal::{dispose, dispose_ptr, Disposable, Owned};
use crate::error::Result;
use crate::marshal::read::{borrow_slice, read_jagged_array, read_optional_string, read_string, read_string_array};
use crate::marshal::{
    named_values_from_columns, string_map_from_columns, FromFlat, MultiTimeSeries, ToColumns,
    ToFlat,
};
use crate::models::{
    declared_len, CharacterVector, MultiRegularTimeSeriesData, MultiStatisticDefinition,
    NamedValueVector, StatisticDefinition, StringStringMap, TimeSeriesGeometry, TimeStepCode,
    ValueVector,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

unsafe fn read_values<'a>(values: *const f64, size: i32) -> &'a [f64] {
    borrow_slice(values, declared_len(size, "values"), "values")
}

unsafe fn read_strings(array: *const *const c_char, size: i32, what: &str) -> Result<Vec<String>> {
    read_string_array(array as *const *mut c_char, declared_len(size, what), what)
}

/// Write a freshly built struct into caller memory, taking over its members
unsafe fn overwrite<T: Disposable>(target: *mut T, what: &str, built: Owned<T>) {
    assert!(!target.is_null(), "null {} pointer", what);
    ptr::write(target, built.into_inner());
}

/// Dispose the members of a caller-resident struct
unsafe fn clear<T: Disposable>(target: *mut T, what: &str) {
    assert!(!target.is_null(), "null {} pointer", what);
    dispose(&mut *target);
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Heap timestamp; null if the fields are not a calendar instant
#[no_mangle]
pub extern "C" fn create_date(
    year: i32,
    month: i32,
    day: i32,
    hour: i32,
    minute: i32,
    second: i32,
) -> *mut Timestamp {
    guard("create_date", ptr::null_mut(), || {
        let t = Timestamp::new(year, month, day, hour, minute, second)?;
        Ok(Box::into_raw(Box::new(t)))
    })
}

#[no_mangle]
pub unsafe extern "C" fn set_date(
    date: *mut Timestamp,
    year: i32,
    month: i32,
    day: i32,
    hour: i32,
    minute: i32,
    second: i32,
) -> i32 {
    guard_status("set_date", || {
        assert!(!date.is_null(), "null Timestamp pointer");
        *date = Timestamp::new(year, month, day, hour, minute, second)?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn dispose_date(date: *mut Timestamp) {
    guard("dispose_date", (), || {
        dispose_ptr(date);
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn get_year(date: Timestamp) -> i32 {
    date.year
}

// ---------------------------------------------------------------------------
// ValueVector
// ---------------------------------------------------------------------------

/// Heap copy of `size` values
#[no_mangle]
pub unsafe extern "C" fn create_vv(values: *const f64, size: i32) -> *mut ValueVector {
    guard("create_vv", ptr::null_mut(), || {
        Ok(read_values(values, size).to_flat()?.into_raw())
    })
}

#[no_mangle]
pub unsafe extern "C" fn set_vv(vv: *mut ValueVector, values: *const f64, size: i32) -> i32 {
    guard_status("set_vv", || {
        overwrite(vv, "ValueVector", read_values(values, size).to_flat()?);
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn clear_vv(vv: *mut ValueVector) -> i32 {
    guard_status("clear_vv", || {
        clear(vv, "ValueVector");
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn dispose_vv(vv: *mut ValueVector) {
    guard("dispose_vv", (), || {
        dispose_ptr(vv);
        Ok(())
    })
}

/// First value, or NaN for an empty vector
#[no_mangle]
pub unsafe extern "C" fn first_in_vv(vv: ValueVector) -> f64 {
    guard("first_in_vv", f64::NAN, || Ok(vv.first().unwrap_or(f64::NAN)))
}

/// Copy of the values, to be released with [`delete_array`]
#[no_mangle]
pub unsafe extern "C" fn values_in_vv(vv: ValueVector) -> *mut f64 {
    guard("values_in_vv", ptr::null_mut(), || {
        Ok(to_raw_array(borrow_slice(vv.values, vv.size, "values")))
    })
}

// ---------------------------------------------------------------------------
// NamedValueVector
// ---------------------------------------------------------------------------

/// Heap named value vector from `size` names and values, in the given order
#[no_mangle]
pub unsafe extern "C" fn create_nvv(
    names: *const *const c_char,
    values: *const f64,
    size: i32,
) -> *mut NamedValueVector {
    guard("create_nvv", ptr::null_mut(), || {
        let names = read_strings(names, size, "names")?;
        Ok(named_values_from_columns(&names, read_values(values, size))?.into_raw())
    })
}

#[no_mangle]
pub unsafe extern "C" fn set_nvv(
    nvv: *mut NamedValueVector,
    names: *const *const c_char,
    values: *const f64,
    size: i32,
) -> i32 {
    guard_status("set_nvv", || {
        let names = read_strings(names, size, "names")?;
        let built = named_values_from_columns(&names, read_values(values, size))?;
        overwrite(nvv, "NamedValueVector", built);
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn clear_nvv(nvv: *mut NamedValueVector) -> i32 {
    guard_status("clear_nvv", || {
        clear(nvv, "NamedValueVector");
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn dispose_nvv(nvv: *mut NamedValueVector) {
    guard("dispose_nvv", (), || {
        dispose_ptr(nvv);
        Ok(())
    })
}

/// First value in stored order, or NaN for an empty vector
#[no_mangle]
pub unsafe extern "C" fn first_in_nvv(nvv: NamedValueVector) -> f64 {
    guard("first_in_nvv", f64::NAN, || Ok(nvv.first().unwrap_or(f64::NAN)))
}

/// Copy of the names, to be released with [`delete_ansi_string_array`]
#[no_mangle]
pub unsafe extern "C" fn names_in_nvv(nvv: NamedValueVector) -> *mut *mut c_char {
    guard("names_in_nvv", ptr::null_mut(), || {
        let (names, _) = nvv.to_columns()?;
        to_raw_string_array(&names)
    })
}

// ---------------------------------------------------------------------------
// CharacterVector
// ---------------------------------------------------------------------------

#[no_mangle]
pub unsafe extern "C" fn create_cvec(values: *const *const c_char, size: i32) -> *mut CharacterVector {
    guard("create_cvec", ptr::null_mut(), || {
        let values = read_strings(values, size, "character")?;
        Ok(values.to_flat()?.into_raw())
    })
}

#[no_mangle]
pub unsafe extern "C" fn set_cvec(
    cvec: *mut CharacterVector,
    values: *const *const c_char,
    size: i32,
) -> i32 {
    guard_status("set_cvec", || {
        let values = read_strings(values, size, "character")?;
        overwrite(cvec, "CharacterVector", values.to_flat()?);
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn clear_cvec(cvec: *mut CharacterVector) -> i32 {
    guard_status("clear_cvec", || {
        clear(cvec, "CharacterVector");
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn dispose_cvec(cvec: *mut CharacterVector) {
    guard("dispose_cvec", (), || {
        dispose_ptr(cvec);
        Ok(())
    })
}

/// Copy of the first string, or null when empty; release with [`delete_char_array`]
#[no_mangle]
pub unsafe extern "C" fn first_in_cvec(cvec: CharacterVector) -> *mut c_char {
    guard("first_in_cvec", ptr::null_mut(), || match cvec.first()? {
        Some(s) => into_raw_string(&s),
        None => Ok(ptr::null_mut()),
    })
}

// ---------------------------------------------------------------------------
// StringStringMap
// ---------------------------------------------------------------------------

#[no_mangle]
pub unsafe extern "C" fn create_ssm(
    keys: *const *const c_char,
    values: *const *const c_char,
    size: i32,
) -> *mut StringStringMap {
    guard("create_ssm", ptr::null_mut(), || {
        let keys = read_strings(keys, size, "keys")?;
        let values = read_strings(values, size, "string values")?;
        Ok(string_map_from_columns(&keys, &values)?.into_raw())
    })
}

#[no_mangle]
pub unsafe extern "C" fn set_ssm(
    ssm: *mut StringStringMap,
    keys: *const *const c_char,
    values: *const *const c_char,
    size: i32,
) -> i32 {
    guard_status("set_ssm", || {
        let keys = read_strings(keys, size, "keys")?;
        let values = read_strings(values, size, "string values")?;
        overwrite(ssm, "StringStringMap", string_map_from_columns(&keys, &values)?);
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn clear_ssm(ssm: *mut StringStringMap) -> i32 {
    guard_status("clear_ssm", || {
        clear(ssm, "StringStringMap");
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn dispose_ssm(ssm: *mut StringStringMap) {
    guard("dispose_ssm", (), || {
        dispose_ptr(ssm);
        Ok(())
    })
}

/// Copy of the value of the first entry with key `key`, or null if absent
///
/// The result is released with [`delete_char_array`].
#[no_mangle]
pub unsafe extern "C" fn value_for_key_ssm(key: *const c_char, ssm: StringStringMap) -> *mut c_char {
    guard("value_for_key_ssm", ptr::null_mut(), || {
        let key = read_string(key, 0)?;
        match ssm.value_for_key(&key)? {
            Some(v) => into_raw_string(&v),
            None => Ok(ptr::null_mut()),
        }
    })
}

// ---------------------------------------------------------------------------
// TimeSeriesGeometry
// ---------------------------------------------------------------------------

fn checked_geometry(
    start: Timestamp,
    time_step_seconds: i32,
    length: i32,
    time_step_code: i32,
) -> Result<TimeSeriesGeometry> {
    start.to_naive()?;
    declared_len(length, "time series geometry");
    Ok(match TimeStepCode::try_from(time_step_code)? {
        TimeStepCode::StrictlyRegular => TimeSeriesGeometry::regular(start, time_step_seconds, length),
        TimeStepCode::MonthlyStep => TimeSeriesGeometry::monthly(start, length),
    })
}

/// Heap geometry; a monthly `time_step_code` overrides `time_step_seconds`
#[no_mangle]
pub extern "C" fn create_tsg(
    start: Timestamp,
    time_step_seconds: i32,
    length: i32,
    time_step_code: i32,
) -> *mut TimeSeriesGeometry {
    guard("create_tsg", ptr::null_mut(), || {
        let g = checked_geometry(start, time_step_seconds, length, time_step_code)?;
        Ok(Box::into_raw(Box::new(g)))
    })
}

#[no_mangle]
pub unsafe extern "C" fn set_tsg(
    tsg: *mut TimeSeriesGeometry,
    start: Timestamp,
    time_step_seconds: i32,
    length: i32,
    time_step_code: i32,
) -> i32 {
    guard_status("set_tsg", || {
        assert!(!tsg.is_null(), "null TimeSeriesGeometry pointer");
        *tsg = checked_geometry(start, time_step_seconds, length, time_step_code)?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn dispose_tsg(tsg: *mut TimeSeriesGeometry) {
    guard("dispose_tsg", (), || {
        dispose_ptr(tsg);
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn tscode_tsg(tsg: TimeSeriesGeometry) -> i32 {
    tsg.time_step_code
}

// ---------------------------------------------------------------------------
// MultiRegularTimeSeriesData
// ---------------------------------------------------------------------------

unsafe fn read_series(
    geometry: TimeSeriesGeometry,
    numeric_data: *const *const f64,
    ensemble_size: i32,
) -> Result<MultiTimeSeries> {
    let n_rows = declared_len(ensemble_size, "ensemble size");
    let row_len = if n_rows == 0 { 0 } else { geometry.len() };
    let data = read_jagged_array(numeric_data as *const *mut f64, n_rows, row_len);
    MultiTimeSeries::new(geometry, data)
}

/// Heap copy of `ensemble_size` rows of `geometry.length` values
#[no_mangle]
pub unsafe extern "C" fn create_mtsd(
    geometry: TimeSeriesGeometry,
    numeric_data: *const *const f64,
    ensemble_size: i32,
) -> *mut MultiRegularTimeSeriesData {
    guard("create_mtsd", ptr::null_mut(), || {
        Ok(read_series(geometry, numeric_data, ensemble_size)?
            .to_flat()?
            .into_raw())
    })
}

#[no_mangle]
pub unsafe extern "C" fn set_mtsd(
    mtsd: *mut MultiRegularTimeSeriesData,
    geometry: TimeSeriesGeometry,
    numeric_data: *const *const f64,
    ensemble_size: i32,
) -> i32 {
    guard_status("set_mtsd", || {
        let built = read_series(geometry, numeric_data, ensemble_size)?.to_flat()?;
        overwrite(mtsd, "MultiRegularTimeSeriesData", built);
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn clear_mtsd(mtsd: *mut MultiRegularTimeSeriesData) -> i32 {
    guard_status("clear_mtsd", || {
        clear(mtsd, "MultiRegularTimeSeriesData");
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn dispose_mtsd(mtsd: *mut MultiRegularTimeSeriesData) {
    guard("dispose_mtsd", (), || {
        dispose_ptr(mtsd);
        Ok(())
    })
}

/// Copy of the rows, to be released with [`delete_double_ptr_array`]
#[no_mangle]
pub unsafe extern "C" fn numeric_data_in_mtsd(mtsd: MultiRegularTimeSeriesData) -> *mut *mut f64 {
    guard("numeric_data_in_mtsd", ptr::null_mut(), || {
        let series = MultiTimeSeries::from_flat_ref(&mtsd)?;
        Ok(to_raw_jagged_array(&series.data))
    })
}

// ---------------------------------------------------------------------------
// StatisticDefinition
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
unsafe fn read_statistic(
    model_variable_id: *const c_char,
    objective_identifier: *const c_char,
    objective_name: *const c_char,
    statistic_identifier: *const c_char,
    start: Timestamp,
    end: Timestamp,
    observations: *const MultiRegularTimeSeriesData,
) -> Result<Owned<StatisticDefinition>> {
    let observations = if observations.is_null() {
        None
    } else {
        Some(MultiTimeSeries::from_flat_ref(&*observations)?)
    };
    build_statistic_definition(
        &read_string(model_variable_id, 0)?,
        &read_string(objective_identifier, 1)?,
        &read_string(objective_name, 2)?,
        &read_string(statistic_identifier, 3)?,
        start,
        end,
        observations.as_ref(),
    )
}

/// Heap statistic definition; `observations` is borrowed and copied, may be null
#[no_mangle]
pub unsafe extern "C" fn create_stat(
    model_variable_id: *const c_char,
    objective_identifier: *const c_char,
    objective_name: *const c_char,
    statistic_identifier: *const c_char,
    start: Timestamp,
    end: Timestamp,
    observations: *const MultiRegularTimeSeriesData,
) -> *mut StatisticDefinition {
    guard("create_stat", ptr::null_mut(), || {
        let stat = read_statistic(
            model_variable_id,
            objective_identifier,
            objective_name,
            statistic_identifier,
            start,
            end,
            observations,
        )?;
        Ok(stat.into_raw())
    })
}

#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn set_stat(
    stat: *mut StatisticDefinition,
    model_variable_id: *const c_char,
    objective_identifier: *const c_char,
    objective_name: *const c_char,
    statistic_identifier: *const c_char,
    start: Timestamp,
    end: Timestamp,
    observations: *const MultiRegularTimeSeriesData,
) -> i32 {
    guard_status("set_stat", || {
        let built = read_statistic(
            model_variable_id,
            objective_identifier,
            objective_name,
            statistic_identifier,
            start,
            end,
            observations,
        )?;
        overwrite(stat, "StatisticDefinition", built);
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn clear_stat(stat: *mut StatisticDefinition) -> i32 {
    guard_status("clear_stat", || {
        clear(stat, "StatisticDefinition");
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn dispose_stat(stat: *mut StatisticDefinition) {
    guard("dispose_stat", (), || {
        dispose_ptr(stat);
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// MultiStatisticDefinition
// ---------------------------------------------------------------------------

unsafe fn read_multi_statistic(
    statistics: *const StatisticDefinition,
    size: i32,
    mix_statistics_id: *const c_char,
) -> Result<Owned<MultiStatisticDefinition>> {
    let specs = borrow_slice(statistics, declared_len(size, "statistics"), "statistics")
        .iter()
        .map(|s| StatisticSpec::from_flat_ref(s))
        .collect::<Result<Vec<_>>>()?;
    let label = read_optional_string(mix_statistics_id)?;
    build_multi_statistic_definition(&specs, label.as_deref())
}

/// Heap multi-statistic definition copying `size` borrowed definitions
#[no_mangle]
pub unsafe extern "C" fn create_msd(
    statistics: *const StatisticDefinition,
    size: i32,
    mix_statistics_id: *const c_char,
) -> *mut MultiStatisticDefinition {
    guard("create_msd", ptr::null_mut(), || {
        Ok(read_multi_statistic(statistics, size, mix_statistics_id)?.into_raw())
    })
}

/// Heap multi-statistic definition from a JSON document
#[no_mangle]
pub unsafe extern "C" fn create_msd_from_json(json: *const c_char) -> *mut MultiStatisticDefinition {
    guard("create_msd_from_json", ptr::null_mut(), || {
        let spec = MultiStatisticSpec::from_json(&read_string(json, 0)?)?;
        Ok(spec.to_flat()?.into_raw())
    })
}

#[no_mangle]
pub unsafe extern "C" fn set_msd(
    msd: *mut MultiStatisticDefinition,
    statistics: *const StatisticDefinition,
    size: i32,
    mix_statistics_id: *const c_char,
) -> i32 {
    guard_status("set_msd", || {
        let built = read_multi_statistic(statistics, size, mix_statistics_id)?;
        overwrite(msd, "MultiStatisticDefinition", built);
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn clear_msd(msd: *mut MultiStatisticDefinition) -> i32 {
    guard_status("clear_msd", || {
        clear(msd, "MultiStatisticDefinition");
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn dispose_msd(msd: *mut MultiStatisticDefinition) {
    guard("dispose_msd", (), || {
        dispose_ptr(msd);
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Deletion of strings and arrays handed out by accessors
// ---------------------------------------------------------------------------

/// Free a string returned by this library; null is a no-op
#[no_mangle]
pub unsafe extern "C" fn delete_char_array(s: *mut c_char) {
    guard("delete_char_array", (), || {
        let mut s = s;
        free_string(&mut s);
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn delete_ansi_string_array(values: *mut *mut c_char, size: i32) {
    guard("delete_ansi_string_array", (), || {
        let mut values = values;
        free_string_array(&mut values, declared_len(size, "string"), "string");
        Ok(())
    })
}

/// Free a numeric array returned by this library
///
/// `size` must be the length the array was returned with; the allocation is
/// released with that exact size.
#[no_mangle]
pub unsafe extern "C" fn delete_array(values: *mut f64, size: i32) {
    guard("delete_array", (), || {
        let mut values = values;
        free_array(&mut values, declared_len(size, "values"), "values");
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn delete_double_ptr_array(rows: *mut *mut f64, n_rows: i32, n_cols: i32) {
    guard("delete_double_ptr_array", (), || {
        let mut rows = rows;
        let n_rows = declared_len(n_rows, "row pointer");
        free_jagged_array(&mut rows, n_rows, declared_len(n_cols, "time series row"));
        Ok(())
    })
}

/// Message of the last failing call on this thread, or null
///
/// The pointer is borrowed and stays valid until the next call into this
/// library from the same thread.
#[no_mangle]
pub extern "C" fn cinterop_last_error() -> *const c_char {
    last_error_ptr()
}
