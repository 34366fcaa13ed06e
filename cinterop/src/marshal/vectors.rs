//! Sequences: numeric and character vectors

use std::os::raw::c_char;

use super::read::{borrow_slice, read_string, read_string_array};
use super::{FromFlat, ToFlat};
use crate::disposal::raw::{to_raw_array, to_raw_string_array};
use crate::disposal::Owned;
use crate::error::Result;
use crate::models::{CharacterVector, ValueVector};

impl ToFlat for [f64] {
    type Flat = ValueVector;

    fn to_flat(&self) -> Result<Owned<ValueVector>> {
        let vv = ValueVector {
            size: self.len(),
            values: to_raw_array(self),
        };
        // SAFETY: members freshly allocated above.
        Ok(unsafe { Owned::from_value(vv) })
    }
}

impl FromFlat<ValueVector> for Vec<f64> {
    unsafe fn from_flat_ref(flat: &ValueVector) -> Result<Self> {
        Ok(borrow_slice(flat.values, flat.size, "values").to_vec())
    }
}

fn character_vector<S: AsRef<str>>(items: &[S]) -> Result<Owned<CharacterVector>> {
    let cv = CharacterVector {
        size: items.len(),
        values: to_raw_string_array(items)?,
    };
    // SAFETY: members freshly allocated above.
    Ok(unsafe { Owned::from_value(cv) })
}

impl ToFlat for [String] {
    type Flat = CharacterVector;

    fn to_flat(&self) -> Result<Owned<CharacterVector>> {
        character_vector(self)
    }
}

impl ToFlat for [&str] {
    type Flat = CharacterVector;

    fn to_flat(&self) -> Result<Owned<CharacterVector>> {
        character_vector(self)
    }
}

impl FromFlat<CharacterVector> for Vec<String> {
    unsafe fn from_flat_ref(flat: &CharacterVector) -> Result<Self> {
        read_string_array(flat.values, flat.size, "character")
    }
}

impl ValueVector {
    /// First value, if any
    ///
    /// # Safety
    /// The struct must satisfy its invariants.
    pub unsafe fn first(&self) -> Option<f64> {
        borrow_slice(self.values, self.size, "values").first().copied()
    }
}

impl CharacterVector {
    /// Copy of the first string, if any
    ///
    /// # Safety
    /// The struct must satisfy its invariants.
    pub unsafe fn first(&self) -> Result<Option<String>> {
        borrow_slice(self.values, self.size, "character")
            .first()
            .map(|s| read_string(*s as *const c_char, 0))
            .transpose()
    }
}
