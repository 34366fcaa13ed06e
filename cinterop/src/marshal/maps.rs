//! Keyed collections: named value vectors and string maps
//!
//! Both flat types store parallel columns in an order that is significant
//! but not necessarily sorted. Key uniqueness is only enforced when building
//! a key-unique map, where the first repeated key is reported.

use std::collections::{BTreeMap, HashMap};
use std::os::raw::c_char;

use super::read::{borrow_slice, read_string, read_string_array};
use super::{FromFlat, ToColumns, ToFlat};
use crate::disposal::raw::{free_string_array, to_raw_array, to_raw_string_array};
use crate::disposal::Owned;
use crate::error::{InteropError, Result};
use crate::models::{NamedValueVector, StringStringMap};

/// Build a named value vector from parallel columns, in the given order
///
/// Names need not be unique.
///
/// # Errors
/// [`InteropError::LengthMismatch`] if the columns differ in length,
/// [`InteropError::InteriorNul`] if a name contains a NUL byte.
pub fn named_values_from_columns<S: AsRef<str>>(
    names: &[S],
    values: &[f64],
) -> Result<Owned<NamedValueVector>> {
    if names.len() != values.len() {
        return Err(InteropError::LengthMismatch {
            what: "named values columns",
            expected: names.len(),
            actual: values.len(),
        });
    }
    let names = to_raw_string_array(names)?;
    let nvv = NamedValueVector {
        size: values.len(),
        values: to_raw_array(values),
        names,
    };
    // SAFETY: members freshly allocated above.
    Ok(unsafe { Owned::from_value(nvv) })
}

/// Build a string map from parallel columns, in the given order
///
/// # Errors
/// As for [`named_values_from_columns`].
pub fn string_map_from_columns<K: AsRef<str>, V: AsRef<str>>(
    keys: &[K],
    values: &[V],
) -> Result<Owned<StringStringMap>> {
    if keys.len() != values.len() {
        return Err(InteropError::LengthMismatch {
            what: "string map columns",
            expected: keys.len(),
            actual: values.len(),
        });
    }
    let size = keys.len();
    let mut raw_keys = to_raw_string_array(keys)?;
    let raw_values = match to_raw_string_array(values) {
        Ok(raw_values) => raw_values,
        Err(e) => {
            // SAFETY: `raw_keys` was allocated above with `size` elements.
            unsafe { free_string_array(&mut raw_keys, size, "keys") };
            return Err(e);
        }
    };
    let ssm = StringStringMap {
        size,
        keys: raw_keys,
        values: raw_values,
    };
    // SAFETY: members freshly allocated above.
    Ok(unsafe { Owned::from_value(ssm) })
}

impl ToFlat for BTreeMap<String, f64> {
    type Flat = NamedValueVector;

    fn to_flat(&self) -> Result<Owned<NamedValueVector>> {
        let (names, values): (Vec<&str>, Vec<f64>) =
            self.iter().map(|(k, v)| (k.as_str(), *v)).unzip();
        named_values_from_columns(&names, &values)
    }
}

impl ToFlat for HashMap<String, f64> {
    type Flat = NamedValueVector;

    fn to_flat(&self) -> Result<Owned<NamedValueVector>> {
        let (names, values): (Vec<&str>, Vec<f64>) =
            self.iter().map(|(k, v)| (k.as_str(), *v)).unzip();
        named_values_from_columns(&names, &values)
    }
}

impl ToFlat for [(String, f64)] {
    type Flat = NamedValueVector;

    fn to_flat(&self) -> Result<Owned<NamedValueVector>> {
        let (names, values): (Vec<&str>, Vec<f64>) =
            self.iter().map(|(k, v)| (k.as_str(), *v)).unzip();
        named_values_from_columns(&names, &values)
    }
}

impl ToFlat for BTreeMap<String, String> {
    type Flat = StringStringMap;

    fn to_flat(&self) -> Result<Owned<StringStringMap>> {
        let (keys, values): (Vec<&str>, Vec<&str>) =
            self.iter().map(|(k, v)| (k.as_str(), v.as_str())).unzip();
        string_map_from_columns(&keys, &values)
    }
}

impl ToFlat for HashMap<String, String> {
    type Flat = StringStringMap;

    fn to_flat(&self) -> Result<Owned<StringStringMap>> {
        let (keys, values): (Vec<&str>, Vec<&str>) =
            self.iter().map(|(k, v)| (k.as_str(), v.as_str())).unzip();
        string_map_from_columns(&keys, &values)
    }
}

impl ToFlat for [(String, String)] {
    type Flat = StringStringMap;

    fn to_flat(&self) -> Result<Owned<StringStringMap>> {
        let (keys, values): (Vec<&str>, Vec<&str>) =
            self.iter().map(|(k, v)| (k.as_str(), v.as_str())).unzip();
        string_map_from_columns(&keys, &values)
    }
}

impl ToColumns for NamedValueVector {
    type Value = f64;

    unsafe fn to_columns(&self) -> Result<(Vec<String>, Vec<f64>)> {
        let names = read_string_array(self.names, self.size, "names")?;
        let values = borrow_slice(self.values, self.size, "values").to_vec();
        Ok((names, values))
    }
}

impl ToColumns for StringStringMap {
    type Value = String;

    unsafe fn to_columns(&self) -> Result<(Vec<String>, Vec<String>)> {
        let keys = read_string_array(self.keys, self.size, "keys")?;
        let values = read_string_array(self.values, self.size, "string values")?;
        Ok((keys, values))
    }
}

/// Insert entries in stored order, failing on the first repeated key
fn insert_unique<V>(
    keys: Vec<String>,
    values: Vec<V>,
    mut insert: impl FnMut(String, V) -> Option<String>,
) -> Result<()> {
    for (key, value) in keys.into_iter().zip(values) {
        if let Some(key) = insert(key, value) {
            return Err(InteropError::DuplicateKey { key });
        }
    }
    Ok(())
}

fn unique_btree<V>(keys: Vec<String>, values: Vec<V>) -> Result<BTreeMap<String, V>> {
    let mut map = BTreeMap::new();
    insert_unique(keys, values, |k, v| {
        if map.contains_key(&k) {
            Some(k)
        } else {
            map.insert(k, v);
            None
        }
    })?;
    Ok(map)
}

fn unique_hash<V>(keys: Vec<String>, values: Vec<V>) -> Result<HashMap<String, V>> {
    let mut map = HashMap::with_capacity(keys.len());
    insert_unique(keys, values, |k, v| {
        if map.contains_key(&k) {
            Some(k)
        } else {
            map.insert(k, v);
            None
        }
    })?;
    Ok(map)
}

impl FromFlat<NamedValueVector> for BTreeMap<String, f64> {
    unsafe fn from_flat_ref(flat: &NamedValueVector) -> Result<Self> {
        let (names, values) = flat.to_columns()?;
        unique_btree(names, values)
    }
}

impl FromFlat<NamedValueVector> for HashMap<String, f64> {
    unsafe fn from_flat_ref(flat: &NamedValueVector) -> Result<Self> {
        let (names, values) = flat.to_columns()?;
        unique_hash(names, values)
    }
}

impl FromFlat<NamedValueVector> for Vec<(String, f64)> {
    unsafe fn from_flat_ref(flat: &NamedValueVector) -> Result<Self> {
        let (names, values) = flat.to_columns()?;
        Ok(names.into_iter().zip(values).collect())
    }
}

impl FromFlat<StringStringMap> for BTreeMap<String, String> {
    unsafe fn from_flat_ref(flat: &StringStringMap) -> Result<Self> {
        let (keys, values) = flat.to_columns()?;
        unique_btree(keys, values)
    }
}

impl FromFlat<StringStringMap> for HashMap<String, String> {
    unsafe fn from_flat_ref(flat: &StringStringMap) -> Result<Self> {
        let (keys, values) = flat.to_columns()?;
        unique_hash(keys, values)
    }
}

impl FromFlat<StringStringMap> for Vec<(String, String)> {
    unsafe fn from_flat_ref(flat: &StringStringMap) -> Result<Self> {
        let (keys, values) = flat.to_columns()?;
        Ok(keys.into_iter().zip(values).collect())
    }
}

impl NamedValueVector {
    /// First value in stored order, if any
    ///
    /// # Safety
    /// The struct must satisfy its invariants.
    pub unsafe fn first(&self) -> Option<f64> {
        borrow_slice(self.values, self.size, "values").first().copied()
    }
}

impl StringStringMap {
    /// Copy of the value of the first entry whose key equals `key`
    ///
    /// Keys are compared byte for byte without decoding, so a map with
    /// non-UTF-8 keys can still be searched.
    ///
    /// # Safety
    /// The struct must satisfy its invariants.
    pub unsafe fn value_for_key(&self, key: &str) -> Result<Option<String>> {
        let keys = borrow_slice(self.keys, self.size, "keys");
        let values = borrow_slice(self.values, self.size, "string values");
        let position = keys.iter().position(|k| {
            assert!(!k.is_null(), "null key in string map");
            std::ffi::CStr::from_ptr(*k).to_bytes() == key.as_bytes()
        });
        position
            .map(|i| read_string(values[i] as *const c_char, i))
            .transpose()
    }
}
