//! Per-type teardown rules
//!
//! Order matters for composites: owned strings first, then nested structs,
//! then the container arrays that referenced them.

use super::raw::{check_array, free_array, free_jagged_array, free_string, free_string_array};
use super::{dispose_ptr, Disposable};
use crate::core::time::Timestamp;
use crate::models::{
    declared_len, CharacterVector, MultiRegularTimeSeriesData, MultiStatisticDefinition,
    NamedValueVector, StatisticDefinition, StringStringMap, TimeSeriesDimensionsDescription,
    TimeSeriesGeometry, ValueVector,
};

use std::ptr;

impl Disposable for Timestamp {
    unsafe fn dispose(&mut self) {}
}

impl Disposable for TimeSeriesGeometry {
    unsafe fn dispose(&mut self) {}
}

impl Disposable for ValueVector {
    unsafe fn dispose(&mut self) {
        free_array(&mut self.values, self.size, "values");
        self.size = 0;
    }
}

impl Disposable for NamedValueVector {
    unsafe fn dispose(&mut self) {
        check_array(self.names, self.size, "names");
        check_array(self.values, self.size, "values");
        free_string_array(&mut self.names, self.size, "names");
        free_array(&mut self.values, self.size, "values");
        self.size = 0;
    }
}

impl Disposable for CharacterVector {
    unsafe fn dispose(&mut self) {
        free_string_array(&mut self.values, self.size, "character");
        self.size = 0;
    }
}

impl Disposable for StringStringMap {
    unsafe fn dispose(&mut self) {
        check_array(self.keys, self.size, "keys");
        check_array(self.values, self.size, "string values");
        free_string_array(&mut self.keys, self.size, "keys");
        free_string_array(&mut self.values, self.size, "string values");
        self.size = 0;
    }
}

impl Disposable for MultiRegularTimeSeriesData {
    unsafe fn dispose(&mut self) {
        let n_rows = declared_len(self.ensemble_size, "ensemble size");
        let row_len = if n_rows == 0 || self.numeric_data.is_null() {
            0
        } else {
            self.time_series_geometry.len()
        };
        free_jagged_array(&mut self.numeric_data, n_rows, row_len);
        self.ensemble_size = 0;
    }
}

impl Disposable for TimeSeriesDimensionsDescription {
    unsafe fn dispose(&mut self) {
        let n = declared_len(self.num_dimensions, "dimensions");
        check_array(self.dimensions, n, "dimensions");
        if !self.dimensions.is_null() && n > 0 {
            let mut dims = Box::from_raw(ptr::slice_from_raw_parts_mut(self.dimensions, n));
            for d in dims.iter_mut() {
                free_string(&mut d.dimension_type);
            }
        }
        self.dimensions = ptr::null_mut();
        self.num_dimensions = 0;
    }
}

impl Disposable for StatisticDefinition {
    unsafe fn dispose(&mut self) {
        free_string(&mut self.model_variable_id);
        free_string(&mut self.objective_identifier);
        free_string(&mut self.objective_name);
        free_string(&mut self.statistic_identifier);
        if !self.observations.is_null() {
            dispose_ptr(self.observations);
            self.observations = ptr::null_mut();
        }
    }
}

impl Disposable for MultiStatisticDefinition {
    unsafe fn dispose(&mut self) {
        let n = declared_len(self.size, "statistics");
        check_array(self.statistics, n, "statistics");
        free_string(&mut self.mix_statistics_id);
        if !self.statistics.is_null() && n > 0 {
            let stats = Box::from_raw(ptr::slice_from_raw_parts_mut(self.statistics, n));
            for stat in stats.iter().filter(|s| !s.is_null()) {
                dispose_ptr(*stat);
            }
        }
        self.statistics = ptr::null_mut();
        self.size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disposal::raw::{into_raw_array, to_raw_array, to_raw_string_array};

    #[test]
    fn test_named_value_vector_disposal_nulls_members() {
        let mut nvv = NamedValueVector {
            size: 2,
            values: to_raw_array(&[1.0, 2.0]),
            names: to_raw_string_array(&["a", "b"]).unwrap(),
        };
        unsafe { nvv.dispose() };
        assert_eq!(nvv.size, 0);
        assert!(nvv.values.is_null());
        assert!(nvv.names.is_null());
        unsafe { nvv.dispose() };
    }

    #[test]
    #[should_panic(expected = "null names array with declared length 2")]
    fn test_named_value_vector_null_names_panics() {
        let mut nvv = NamedValueVector {
            size: 2,
            values: ptr::null_mut(),
            names: ptr::null_mut(),
        };
        unsafe { nvv.dispose() };
    }

    #[test]
    fn test_zero_size_with_null_members() {
        let mut cv = CharacterVector::empty();
        unsafe { cv.dispose() };
        let mut ssm = StringStringMap::empty();
        unsafe { ssm.dispose() };
        let mut msd = MultiStatisticDefinition::empty();
        unsafe { msd.dispose() };
    }

    #[test]
    fn test_dimensions_disposal() {
        let dims = vec![
            crate::models::TimeSeriesDimensionDescription {
                dimension_type: std::ffi::CString::new("ensemble").unwrap().into_raw(),
                size: 3,
            },
            crate::models::TimeSeriesDimensionDescription {
                dimension_type: std::ffi::CString::new("time").unwrap().into_raw(),
                size: 10,
            },
        ];
        let mut d = TimeSeriesDimensionsDescription {
            dimensions: into_raw_array(dims),
            num_dimensions: 2,
        };
        unsafe { d.dispose() };
        assert!(d.dimensions.is_null());
        assert_eq!(d.num_dimensions, 0);
    }
}
