//! Tests for the extern "C" entry points, called the way a C host would

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use cinterop::ffi::exports::*;
use cinterop::ffi::{CINTEROP_ERROR, CINTEROP_OK};
use cinterop::{NamedValueVector, StatisticDefinition, TimeSeriesGeometry, Timestamp, ValueVector};

fn last_error() -> String {
    let p = cinterop_last_error();
    assert!(!p.is_null(), "no error recorded");
    unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned()
}

fn c_strings(items: &[&str]) -> (Vec<CString>, Vec<*const c_char>) {
    let owned: Vec<CString> = items.iter().map(|s| CString::new(*s).unwrap()).collect();
    let ptrs = owned.iter().map(|s| s.as_ptr()).collect();
    (owned, ptrs)
}

/// Take back a string handed out by the library
unsafe fn take_string(s: *mut c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    let copy = CStr::from_ptr(s).to_string_lossy().into_owned();
    delete_char_array(s);
    Some(copy)
}

#[test]
fn test_date_lifecycle() {
    let d = create_date(2001, 1, 2, 3, 4, 5);
    assert!(!d.is_null());
    unsafe {
        assert_eq!(get_year(*d), 2001);
        assert_eq!(set_date(d, 2010, 6, 30, 0, 0, 0), CINTEROP_OK);
        assert_eq!(get_year(*d), 2010);
        assert_eq!(set_date(d, 2010, 6, 31, 0, 0, 0), CINTEROP_ERROR);
        dispose_date(d);
    }
}

#[test]
fn test_malformed_date_reports_error() {
    assert!(create_date(2001, 2, 30, 0, 0, 0).is_null());
    assert!(last_error().contains("Malformed timestamp 2001-02-30T00:00:00"));
}

#[test]
fn test_named_values_example_scenario() {
    let (_names, name_ptrs) = c_strings(&["a", "b"]);
    let values = [1.0, 2.0];
    unsafe {
        let nvv = create_nvv(name_ptrs.as_ptr(), values.as_ptr(), 2);
        assert!(!nvv.is_null());
        assert_eq!(first_in_nvv(ptr::read(nvv)), 1.0);

        let names = names_in_nvv(ptr::read(nvv));
        assert_eq!(CStr::from_ptr(*names.add(1)).to_str().unwrap(), "b");
        delete_ansi_string_array(names, 2);

        assert_eq!(clear_nvv(nvv), CINTEROP_OK);
        assert!((*nvv).names.is_null());
        assert!((*nvv).values.is_null());
        dispose_nvv(nvv);
    }
}

#[test]
fn test_set_and_clear_caller_resident_struct() {
    let values = [3.0, 4.0, 5.0];
    let mut vv = ValueVector::empty();
    unsafe {
        assert_eq!(set_vv(&mut vv, values.as_ptr(), 3), CINTEROP_OK);
        assert_eq!(vv.size, 3);
        assert_eq!(first_in_vv(ptr::read(&vv)), 3.0);

        let copy = values_in_vv(ptr::read(&vv));
        assert_eq!(*copy.add(2), 5.0);
        delete_array(copy, 3);

        assert_eq!(clear_vv(&mut vv), CINTEROP_OK);
        assert!(vv.values.is_null());
        assert!(first_in_vv(ptr::read(&vv)).is_nan());
    }
}

#[test]
fn test_null_array_with_length_is_caught() {
    let vv = unsafe { create_vv(ptr::null(), 3) };
    assert!(vv.is_null());
    assert_eq!(
        last_error(),
        "create_vv: null values array with declared length 3"
    );
}

#[test]
fn test_empty_vector_from_null() {
    unsafe {
        let vv = create_vv(ptr::null(), 0);
        assert!(!vv.is_null());
        assert_eq!((*vv).size, 0);
        dispose_vv(vv);
    }
}

#[test]
fn test_dispose_null_pointer_is_reported() {
    unsafe { dispose_nvv(ptr::null_mut::<NamedValueVector>()) };
    assert!(last_error().contains("cannot dispose of a null"));
}

#[test]
fn test_character_vector() {
    let (_owned, ptrs) = c_strings(&["first", "second"]);
    unsafe {
        let cvec = create_cvec(ptrs.as_ptr(), 2);
        assert_eq!(take_string(first_in_cvec(ptr::read(cvec))).as_deref(), Some("first"));
        dispose_cvec(cvec);
    }
}

#[test]
fn test_string_map_lookup() {
    let (_k, keys) = c_strings(&["model", "unit"]);
    let (_v, values) = c_strings(&["gr4j", "mm"]);
    let key = CString::new("unit").unwrap();
    let missing = CString::new("none").unwrap();
    unsafe {
        let ssm = create_ssm(keys.as_ptr(), values.as_ptr(), 2);
        assert_eq!(
            take_string(value_for_key_ssm(key.as_ptr(), ptr::read(ssm))).as_deref(),
            Some("mm")
        );
        assert_eq!(take_string(value_for_key_ssm(missing.as_ptr(), ptr::read(ssm))), None);
        dispose_ssm(ssm);
    }
}

#[test]
fn test_geometry_codes() {
    let start = Timestamp::new(2000, 1, 15, 0, 0, 0).unwrap();
    let tsg = create_tsg(start, 3600, 12, 1);
    assert!(!tsg.is_null());
    unsafe {
        assert_eq!(tscode_tsg(*tsg), 1);
        assert_eq!((*tsg).time_step_seconds, -1);
        assert_eq!(set_tsg(tsg, start, 3600, 12, 5), CINTEROP_ERROR);
        assert!(last_error().contains("Invalid time step code 5"));
        dispose_tsg(tsg);
    }
}

#[test]
fn test_time_series_and_statistic() {
    let start = Timestamp::new(2001, 1, 2, 3, 4, 5).unwrap();
    let geometry = TimeSeriesGeometry::regular(start, 86400, 7);
    let row0 = [1.0; 7];
    let row1 = [2.0; 7];
    let rows = [row0.as_ptr(), row1.as_ptr()];
    let ids = ["var", "obj", "Objective", "nse"].map(|s| CString::new(s).unwrap());
    unsafe {
        let mtsd = create_mtsd(geometry, rows.as_ptr(), 2);
        assert_eq!((*mtsd).ensemble_size, 2);

        let copy = numeric_data_in_mtsd(ptr::read(mtsd));
        assert_eq!(*(*copy.add(1)).add(6), 2.0);
        delete_double_ptr_array(copy, 2, 7);

        let stat = create_stat(
            ids[0].as_ptr(),
            ids[1].as_ptr(),
            ids[2].as_ptr(),
            ids[3].as_ptr(),
            start,
            start,
            mtsd,
        );
        assert!(!stat.is_null());
        // the statistic owns a copy; the caller still owns its series
        assert_ne!((*stat).observations, mtsd);
        dispose_mtsd(mtsd);

        let msd = create_msd(stat as *const StatisticDefinition, 1, ptr::null());
        assert_eq!((*msd).size, 1);
        assert!((*msd).mix_statistics_id.is_null());
        dispose_stat(stat);
        assert_eq!(clear_msd(msd), CINTEROP_OK);
        assert!((*msd).statistics.is_null());
        dispose_msd(msd);
    }
}

#[test]
fn test_msd_from_json() {
    let json = CString::new(
        r#"{"statistics": [{
            "model_variable_id": "v", "statistic_identifier": "s",
            "objective_identifier": "o", "objective_name": "n",
            "start": {"year": 2000, "month": 1, "day": 1, "hour": 0, "minute": 0, "second": 0},
            "end": {"year": 2000, "month": 1, "day": 1, "hour": 0, "minute": 0, "second": 0}
        }], "mix_statistics_id": "mix"}"#,
    )
    .unwrap();
    unsafe {
        let msd = create_msd_from_json(json.as_ptr());
        assert!(!msd.is_null());
        assert_eq!((*msd).size, 1);
        assert_eq!(CStr::from_ptr((*msd).mix_statistics_id).to_str().unwrap(), "mix");
        dispose_msd(msd);

        let bad = CString::new("not json").unwrap();
        assert!(create_msd_from_json(bad.as_ptr()).is_null());
        assert!(last_error().starts_with("create_msd_from_json: Invalid statistic specification"));
    }
}

#[test]
fn test_delete_array_takes_the_returned_length() {
    let values = [3.0, 4.0];
    let mut vv = ValueVector::empty();
    unsafe {
        assert_eq!(set_vv(&mut vv, values.as_ptr(), 2), CINTEROP_OK);
        let copy = values_in_vv(ptr::read(&vv));
        delete_array(ptr::null_mut(), -1);
        assert_eq!(last_error(), "delete_array: negative length -1 declared for values");
        delete_array(copy, vv.size as i32);
        assert_eq!(clear_vv(&mut vv), CINTEROP_OK);
    }
}
