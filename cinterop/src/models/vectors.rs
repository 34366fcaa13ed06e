//! Flat vectors and string maps
//!
//! Invariant shared by all four types: every pointer field is null iff
//! `size == 0`, and every array has exactly `size` elements.

use std::os::raw::c_char;
use std::ptr;

/// Equivalent of a numeric sequence (R numeric vector, NumPy array)
#[repr(C)]
#[derive(Debug)]
pub struct ValueVector {
    /// Number of elements in `values`
    pub size: usize,
    /// Owned array of `size` values
    pub values: *mut f64,
}

/// Equivalent of a name to number mapping (R named numeric vector, Python dict)
///
/// Names are not required to be unique at this layer.
#[repr(C)]
#[derive(Debug)]
pub struct NamedValueVector {
    /// Number of entries
    pub size: usize,
    /// Owned array of `size` values
    pub values: *mut f64,
    /// Owned array of `size` owned, non-null, NUL-terminated names
    pub names: *mut *mut c_char,
}

/// Equivalent of a sequence of strings
#[repr(C)]
#[derive(Debug)]
pub struct CharacterVector {
    pub size: usize,
    pub values: *mut *mut c_char,
}

/// Equivalent of a string to string mapping, stored as two parallel columns
#[repr(C)]
#[derive(Debug)]
pub struct StringStringMap {
    pub size: usize,
    pub keys: *mut *mut c_char,
    pub values: *mut *mut c_char,
}

impl ValueVector {
    pub const fn empty() -> Self {
        Self {
            size: 0,
            values: ptr::null_mut(),
        }
    }
}

impl NamedValueVector {
    pub const fn empty() -> Self {
        Self {
            size: 0,
            values: ptr::null_mut(),
            names: ptr::null_mut(),
        }
    }
}

impl CharacterVector {
    pub const fn empty() -> Self {
        Self {
            size: 0,
            values: ptr::null_mut(),
        }
    }
}

impl StringStringMap {
    pub const fn empty() -> Self {
        Self {
            size: 0,
            keys: ptr::null_mut(),
            values: ptr::null_mut(),
        }
    }
}

impl Default for ValueVector {
    fn default() -> Self {
        Self::empty()
    }
}

impl Default for NamedValueVector {
    fn default() -> Self {
        Self::empty()
    }
}

impl Default for CharacterVector {
    fn default() -> Self {
        Self::empty()
    }
}

impl Default for StringStringMap {
    fn default() -> Self {
        Self::empty()
    }
}
