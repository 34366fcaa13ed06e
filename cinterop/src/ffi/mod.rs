//! C-callable entry points
//!
//! Every exported function is `extern "C"` with `#[no_mangle]`, named after
//! the flat struct it handles (`create_nvv`, `dispose_nvv`, ...). The
//! declarations for C callers live in `include/cinterop.h`.
//!
//! # Safety contract
//!
//! * Neither errors nor panics cross the boundary. A failing call returns a
//!   null pointer, [`CINTEROP_ERROR`] or a documented sentinel, and stores a
//!   message that [`exports::cinterop_last_error`] returns.
//! * Precondition violations (null instance pointers, null arrays with a
//!   positive length) are panics inside the library and surface the same way.
//! * Pointers returned by `create_*` are owned by the caller and must go
//!   through the matching `dispose_*` exactly once. Structs passed by value
//!   are borrowed.

pub mod exports;

#[cfg(feature = "pyo3")]
pub mod python;

use std::any::Any;
use std::cell::RefCell;
use std::ffi::CString;
use std::panic::{self, AssertUnwindSafe};

use log::debug;

use crate::error::Result;

/// Status returned by entry points without a value on success
pub const CINTEROP_OK: i32 = 0;
/// Status returned by entry points without a value on failure
pub const CINTEROP_ERROR: i32 = -1;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    let c = CString::new(msg.replace('\0', "\\0")).unwrap_or_default();
    LAST_ERROR.with(|cell| *cell.borrow_mut() = Some(c));
}

fn clear_last_error() {
    LAST_ERROR.with(|cell| *cell.borrow_mut() = None);
}

/// Pointer to the last error message of this thread, or null
pub(crate) fn last_error_ptr() -> *const std::os::raw::c_char {
    LAST_ERROR.with(|cell| {
        cell.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |c| c.as_ptr())
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f`, turning an error or a panic into `fallback` and a stored message
pub(crate) fn guard<T>(name: &str, fallback: T, f: impl FnOnce() -> Result<T>) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => {
            clear_last_error();
            value
        }
        Ok(Err(e)) => {
            debug!("{} failed: {}", name, e);
            set_last_error(&format!("{}: {}", name, e));
            fallback
        }
        Err(payload) => {
            let msg = panic_message(&*payload);
            debug!("{} violated a precondition: {}", name, msg);
            set_last_error(&format!("{}: {}", name, msg));
            fallback
        }
    }
}

/// [`guard`] for entry points reporting a status code
pub(crate) fn guard_status(name: &str, f: impl FnOnce() -> Result<()>) -> i32 {
    guard(name, CINTEROP_ERROR, || f().map(|()| CINTEROP_OK))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InteropError;
    use std::ffi::CStr;

    fn last_error() -> Option<String> {
        let p = last_error_ptr();
        (!p.is_null()).then(|| unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned())
    }

    #[test]
    fn test_guard_records_errors() {
        let v = guard("op", 0, || Err(InteropError::InvalidTimeStepCode(7)));
        assert_eq!(v, 0);
        let msg = last_error().unwrap();
        assert!(msg.starts_with("op: Invalid time step code 7"), "{}", msg);

        assert_eq!(guard("op", 0, || Ok(5)), 5);
        assert!(last_error().is_none());
    }

    #[test]
    fn test_guard_catches_panics() {
        let status = guard_status("op", || panic!("null values array with declared length 3"));
        assert_eq!(status, CINTEROP_ERROR);
        assert_eq!(
            last_error().as_deref(),
            Some("op: null values array with declared length 3")
        );
    }
}
