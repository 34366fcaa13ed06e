//! Disposal registry: the ownership protocol of flat structs
//!
//! Each flat struct implements [`Disposable`], which frees its owned members
//! in place and nulls every freed pointer. Two entry points sit on top:
//!
//! - [`dispose`] releases the members of an instance that stays alive (it
//!   may live on the caller's stack or inside another struct);
//! - [`dispose_ptr`] does the same and then frees the heap instance itself.
//!
//! On the Rust side, [`Owned`] ties the protocol to scope: a flat struct held
//! in an `Owned` is disposed exactly once when the guard drops, unless its
//! ownership is explicitly handed over with [`Owned::into_raw`] or
//! [`Owned::into_inner`].
//!
//! Disposing twice is safe as long as the first call ran to completion: the
//! first call nulls the pointers and resets the counts, making the second a
//! no-op.

pub mod raw;
mod registry;

use std::any::type_name;
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::ptr;

use log::trace;

/// Recursive teardown of the heap members owned by a flat struct
pub trait Disposable {
    /// Free every owned member in place, nulling pointers and zeroing counts
    ///
    /// # Safety
    /// Every non-null owned pointer must have been allocated by this crate
    /// with the element count recorded in the struct, and must not be owned
    /// by anything else.
    ///
    /// # Panics
    /// If a pointer is null while its declared length is positive. Nothing is
    /// freed for the offending array in that case.
    unsafe fn dispose(&mut self);
}

/// Free the owned members of `instance`, leaving the instance itself alive
///
/// # Safety
/// See [`Disposable::dispose`].
pub unsafe fn dispose<T: Disposable>(instance: &mut T) {
    trace!("disposing members of {}", type_name::<T>());
    instance.dispose();
}

/// Free the owned members of a heap instance, then the instance
///
/// # Safety
/// `pointer` must come from `Box::into_raw` (e.g. a `create_*` entry point or
/// [`Owned::into_raw`]) and must not be used afterwards.
///
/// # Panics
/// If `pointer` is null.
pub unsafe fn dispose_ptr<T: Disposable>(pointer: *mut T) {
    assert!(
        !pointer.is_null(),
        "cannot dispose of a null {} pointer",
        type_name::<T>()
    );
    trace!("disposing heap instance of {}", type_name::<T>());
    let mut instance = Box::from_raw(pointer);
    instance.dispose();
}

/// Exclusive owner of a heap-allocated flat struct
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use cinterop::{NamedValueVector, Owned, ToFlat};
///
/// let mut m = BTreeMap::new();
/// m.insert("a".to_string(), 1.0);
/// let flat: Owned<NamedValueVector> = m.to_flat().unwrap();
/// assert_eq!(flat.size, 1);
/// // members and instance are released here
/// ```
#[derive(Debug)]
pub struct Owned<T: Disposable> {
    inner: Box<T>,
}

impl<T: Disposable> Owned<T> {
    /// Take ownership of a flat struct
    ///
    /// # Safety
    /// Same requirements as [`Disposable::dispose`]: the guard will dispose
    /// of every owned member of `value`.
    pub unsafe fn from_value(value: T) -> Self {
        Self {
            inner: Box::new(value),
        }
    }

    /// Take back ownership of a pointer previously handed out
    ///
    /// # Safety
    /// `pointer` must come from [`Owned::into_raw`] or a `create_*` entry
    /// point, and must not be disposed elsewhere.
    ///
    /// # Panics
    /// If `pointer` is null.
    pub unsafe fn from_raw(pointer: *mut T) -> Self {
        assert!(
            !pointer.is_null(),
            "cannot take ownership of a null {} pointer",
            type_name::<T>()
        );
        Self {
            inner: Box::from_raw(pointer),
        }
    }

    /// Hand the instance over; the receiver must call [`dispose_ptr`] once
    pub fn into_raw(self) -> *mut T {
        Box::into_raw(self.into_box())
    }

    /// Move the struct out by value; the receiver must call [`dispose`] once
    pub fn into_inner(self) -> T {
        *self.into_box()
    }

    pub fn as_ptr(&self) -> *const T {
        &*self.inner
    }

    /// Mutable access for builders filling the struct field by field
    pub(crate) fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    fn into_box(self) -> Box<T> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the box is moved out exactly once.
        unsafe { ptr::read(&this.inner) }
    }
}

impl<T: Disposable> Deref for Owned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Disposable> Drop for Owned<T> {
    fn drop(&mut self) {
        // SAFETY: `Owned` is only built from values whose members it owns.
        unsafe { dispose(&mut *self.inner) }
    }
}
