//! Copying data out of raw flat-struct members

use std::ffi::CStr;
use std::os::raw::c_char;
use std::slice;

use crate::disposal::raw::check_array;
use crate::error::{InteropError, Result};

/// Borrow a raw array as a slice
///
/// # Safety
/// A non-null `array` must point to `len` initialized elements that outlive `'a`.
///
/// # Panics
/// If `array` is null while `len` is positive.
pub unsafe fn borrow_slice<'a, T>(array: *const T, len: usize, what: &str) -> &'a [T] {
    check_array(array, len, what);
    if len == 0 {
        return &[];
    }
    slice::from_raw_parts(array, len)
}

/// Copy a C string into an owned `String`
///
/// # Safety
/// `s` must point to a NUL-terminated string.
///
/// # Panics
/// If `s` is null.
pub unsafe fn read_string(s: *const c_char, index: usize) -> Result<String> {
    assert!(!s.is_null(), "null string at index {}", index);
    CStr::from_ptr(s)
        .to_str()
        .map(str::to_owned)
        .map_err(|_| InteropError::InvalidUtf8 { index })
}

/// Copy a nullable C string
///
/// # Safety
/// A non-null `s` must point to a NUL-terminated string.
pub unsafe fn read_optional_string(s: *const c_char) -> Result<Option<String>> {
    if s.is_null() {
        return Ok(None);
    }
    read_string(s, 0).map(Some)
}

/// Copy an array of `len` C strings
///
/// # Safety
/// A non-null `array` must point to `len` NUL-terminated strings.
///
/// # Panics
/// If `array`, or any of its first `len` elements, is null.
pub unsafe fn read_string_array(
    array: *const *mut c_char,
    len: usize,
    what: &str,
) -> Result<Vec<String>> {
    borrow_slice(array, len, what)
        .iter()
        .enumerate()
        .map(|(i, s)| read_string(*s, i))
        .collect()
}

/// Copy `n_rows` rows of `row_len` values each out of a jagged array
///
/// # Safety
/// A non-null `rows` must hold `n_rows` rows of `row_len` values.
pub unsafe fn read_jagged_array(
    rows: *const *mut f64,
    n_rows: usize,
    row_len: usize,
) -> Vec<Vec<f64>> {
    borrow_slice(rows, n_rows, "row pointer")
        .iter()
        .map(|row| borrow_slice(*row, row_len, "time series row").to_vec())
        .collect()
}
