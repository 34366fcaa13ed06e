//! Marshaling adapters between native collections and flat structs
//!
//! Every conversion towards a flat struct allocates fresh memory: strings are
//! duplicated and arrays copied, so the result never aliases its source.
//! Conversions back copy values out; with `dispose == true` the flat struct
//! is released right after copying.
//!
//! | native                          | flat                          |
//! |---------------------------------|-------------------------------|
//! | `[f64]`                         | [`ValueVector`]               |
//! | `[String]`, `[&str]`            | [`CharacterVector`]           |
//! | `BTreeMap`/`HashMap<String, f64>`, `[(String, f64)]` | [`NamedValueVector`] |
//! | `BTreeMap`/`HashMap<String, String>`, `[(String, String)]` | [`StringStringMap`] |
//! | [`MultiTimeSeries`]             | [`MultiRegularTimeSeriesData`] |
//! | `[(String, usize)]`             | [`TimeSeriesDimensionsDescription`] |
//!
//! [`ValueVector`]: crate::models::ValueVector
//! [`CharacterVector`]: crate::models::CharacterVector
//! [`NamedValueVector`]: crate::models::NamedValueVector
//! [`StringStringMap`]: crate::models::StringStringMap
//! [`MultiRegularTimeSeriesData`]: crate::models::MultiRegularTimeSeriesData
//! [`TimeSeriesDimensionsDescription`]: crate::models::TimeSeriesDimensionsDescription

mod maps;
pub mod read;
mod timeseries;
mod vectors;

pub use maps::{named_values_from_columns, string_map_from_columns};
pub use timeseries::MultiTimeSeries;

use crate::disposal::{self, Disposable, Owned};
use crate::error::Result;

/// Conversion of a native collection into a freshly allocated flat struct
pub trait ToFlat {
    type Flat: Disposable;

    fn to_flat(&self) -> Result<Owned<Self::Flat>>;
}

/// Reconstruction of a native collection by copying out of a flat struct
pub trait FromFlat<F>: Sized {
    /// # Safety
    /// `flat` must satisfy its type's invariants: every pointer valid for the
    /// declared number of elements.
    unsafe fn from_flat_ref(flat: &F) -> Result<Self>;
}

/// Split a flat map into its key and value columns, in stored order
///
/// Stored order is not sorted and may contain duplicate keys; converting
/// back from the columns reproduces the flat struct exactly.
pub trait ToColumns {
    type Value;

    /// # Safety
    /// See [`FromFlat::from_flat_ref`].
    unsafe fn to_columns(&self) -> Result<(Vec<String>, Vec<Self::Value>)>;
}

/// Copy a flat struct into a native collection, optionally disposing of it
///
/// A `true` flag transfers ownership: the members of `flat` are released
/// once the copy is made, whether or not the copy succeeded.
///
/// # Safety
/// See [`FromFlat::from_flat_ref`]; with `dispose` also
/// [`Disposable::dispose`].
pub unsafe fn from_flat<C, F>(flat: &mut F, dispose: bool) -> Result<C>
where
    C: FromFlat<F>,
    F: Disposable,
{
    let result = C::from_flat_ref(flat);
    if dispose {
        disposal::dispose(flat);
    }
    result
}

impl<F: Disposable> Owned<F> {
    /// Copy into a native collection, keeping the flat struct
    pub fn to_native<C: FromFlat<F>>(&self) -> Result<C> {
        // SAFETY: an `Owned` only holds structs built to their invariants.
        unsafe { C::from_flat_ref(self) }
    }

    /// Copy into a native collection and release the flat struct
    pub fn into_native<C: FromFlat<F>>(self) -> Result<C> {
        self.to_native()
    }
}

impl<F: Disposable + ToColumns> Owned<F> {
    /// Key and value columns in stored order
    pub fn columns(&self) -> Result<(Vec<String>, Vec<F::Value>)> {
        // SAFETY: as for `to_native`.
        unsafe { self.to_columns() }
    }
}
