//! Allocation and release of the raw arrays and strings held by flat structs
//!
//! Arrays are boxed slices handed out with `Box::into_raw`, strings are
//! `CString::into_raw`. Releasing them needs the same element count that was
//! allocated, which is why every free function takes the declared length.
//! An empty array is always represented by a null pointer.

use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use crate::error::{InteropError, Result};

/// Move a vector onto the heap as a raw array; null when empty
pub fn into_raw_array<T>(values: Vec<T>) -> *mut T {
    if values.is_empty() {
        return ptr::null_mut();
    }
    Box::into_raw(values.into_boxed_slice()) as *mut T
}

/// Copy a slice into a freshly allocated raw array; null when empty
pub fn to_raw_array<T: Copy>(values: &[T]) -> *mut T {
    into_raw_array(values.to_vec())
}

/// Duplicate a string as an owned NUL-terminated C string
///
/// `index` only serves to locate the offending element in the error.
pub fn to_c_string(s: &str, index: usize) -> Result<CString> {
    CString::new(s).map_err(|_| InteropError::InteriorNul { index })
}

/// Duplicate a string into a raw C string
pub fn into_raw_string(s: &str) -> Result<*mut c_char> {
    Ok(to_c_string(s, 0)?.into_raw())
}

/// Duplicate an optional string; `None` becomes a null pointer
pub fn into_raw_optional_string(s: Option<&str>) -> Result<*mut c_char> {
    s.map_or(Ok(ptr::null_mut()), into_raw_string)
}

/// Duplicate every string into a raw array of raw C strings; null when empty
///
/// All strings are checked before anything is handed out, so an error
/// leaves nothing allocated.
pub fn to_raw_string_array<S: AsRef<str>>(items: &[S]) -> Result<*mut *mut c_char> {
    let owned = items
        .iter()
        .enumerate()
        .map(|(i, s)| to_c_string(s.as_ref(), i))
        .collect::<Result<Vec<_>>>()?;
    Ok(into_raw_array(owned.into_iter().map(CString::into_raw).collect()))
}

/// Copy rows into a jagged array of `rows.len()` independently owned rows
pub fn to_raw_jagged_array(rows: &[Vec<f64>]) -> *mut *mut f64 {
    into_raw_array(rows.iter().map(|row| to_raw_array(row)).collect())
}

/// Check the zero-length/null-pointer contract of an owned array
///
/// # Panics
/// If `array` is null while `len` is positive.
pub fn check_array<T>(array: *const T, len: usize, what: &str) {
    assert!(
        !array.is_null() || len == 0,
        "null {} array with declared length {}",
        what,
        len
    );
}

/// Free an array produced by [`into_raw_array`] and null the pointer
///
/// # Safety
/// A non-null `array` must come from [`into_raw_array`] with exactly `len`
/// elements and must not be freed elsewhere.
pub unsafe fn free_array<T>(array: &mut *mut T, len: usize, what: &str) {
    check_array(*array, len, what);
    if !array.is_null() && len > 0 {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(*array, len)));
    }
    *array = ptr::null_mut();
}

/// Free a C string produced by this crate and null the pointer; null is a no-op
///
/// # Safety
/// A non-null `s` must come from `CString::into_raw`.
pub unsafe fn free_string(s: &mut *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(*s));
        *s = ptr::null_mut();
    }
}

/// Free each string of an array, then the array itself, and null the pointer
///
/// A zero length never dereferences `array`.
///
/// # Safety
/// A non-null `array` must come from [`to_raw_string_array`] (or equivalent)
/// with exactly `len` elements.
pub unsafe fn free_string_array(array: &mut *mut *mut c_char, len: usize, what: &str) {
    check_array(*array, len, what);
    if !array.is_null() && len > 0 {
        let mut elements = Box::from_raw(ptr::slice_from_raw_parts_mut(*array, len));
        for s in elements.iter_mut() {
            free_string(s);
        }
    }
    *array = ptr::null_mut();
}

/// Free every row of a jagged array, then the row-pointer array
///
/// Rows are checked before anything is released, so a contract violation
/// leaves the structure untouched.
///
/// # Safety
/// A non-null `rows` must hold `n_rows` rows produced by [`to_raw_array`],
/// each of exactly `row_len` elements.
pub unsafe fn free_jagged_array(rows: &mut *mut *mut f64, n_rows: usize, row_len: usize) {
    check_array(*rows, n_rows, "row pointer");
    if rows.is_null() || n_rows == 0 {
        *rows = ptr::null_mut();
        return;
    }
    let mut row_ptrs = Box::from_raw(ptr::slice_from_raw_parts_mut(*rows, n_rows));
    for row in row_ptrs.iter() {
        check_array(*row, row_len, "time series row");
    }
    for row in row_ptrs.iter_mut() {
        free_array(row, row_len, "time series row");
    }
    drop(row_ptrs);
    *rows = ptr::null_mut();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_vec_is_null() {
        assert!(into_raw_array::<f64>(Vec::new()).is_null());
        assert!(to_raw_string_array::<&str>(&[]).unwrap().is_null());
    }

    #[test]
    fn test_interior_nul_is_located() {
        let err = to_raw_string_array(&["ok", "bad\0"]).unwrap_err();
        assert!(matches!(err, InteropError::InteriorNul { index: 1 }));
    }

    #[test]
    fn test_free_array_nulls_pointer() {
        let mut a = to_raw_array(&[1.0, 2.0, 3.0]);
        unsafe { free_array(&mut a, 3, "test") };
        assert!(a.is_null());
        // second call sees the null pointer and does nothing
        unsafe { free_array(&mut a, 0, "test") };
    }

    #[test]
    #[should_panic(expected = "null test array with declared length 2")]
    fn test_free_array_null_with_length_panics() {
        let mut a: *mut f64 = ptr::null_mut();
        unsafe { free_array(&mut a, 2, "test") };
    }

    #[test]
    fn test_free_jagged_array() {
        let mut rows = to_raw_jagged_array(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        unsafe { free_jagged_array(&mut rows, 2, 2) };
        assert!(rows.is_null());
    }

    #[test]
    fn test_free_string_tolerates_null() {
        let mut s: *mut c_char = ptr::null_mut();
        unsafe { free_string(&mut s) };
        assert!(s.is_null());
    }
}
