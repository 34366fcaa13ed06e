//! Statistic definitions used to describe calibration objectives

use std::os::raw::c_char;
use std::ptr;

use super::timeseries::MultiRegularTimeSeriesData;
use crate::core::time::Timestamp;

/// A (typically bivariate) statistic over a model variable and observations
///
/// Owns its four strings and, when non-null, its observations: disposing the
/// definition disposes the observations.
#[repr(C)]
#[derive(Debug)]
pub struct StatisticDefinition {
    /// Which model state variable the statistic is computed on
    pub model_variable_id: *mut c_char,
    /// Unique identifier of the objective, e.g. "NSE_flow_node_2"
    pub objective_identifier: *mut c_char,
    /// Human readable name of the objective
    pub objective_name: *mut c_char,
    /// Which statistic, e.g. "nse"
    pub statistic_identifier: *mut c_char,
    /// Start of the period the statistic is computed over
    pub start: Timestamp,
    /// End of the period the statistic is computed over
    pub end: Timestamp,
    /// Owned observations, may be null
    pub observations: *mut MultiRegularTimeSeriesData,
}

/// A list of statistic definitions with an optional label
#[repr(C)]
#[derive(Debug)]
pub struct MultiStatisticDefinition {
    /// Length of `statistics`
    pub size: i32,
    /// Owned array of `size` owned definitions
    pub statistics: *mut *mut StatisticDefinition,
    /// Owned label of the list, may be null
    pub mix_statistics_id: *mut c_char,
}

impl StatisticDefinition {
    pub const fn empty() -> Self {
        Self {
            model_variable_id: ptr::null_mut(),
            objective_identifier: ptr::null_mut(),
            objective_name: ptr::null_mut(),
            statistic_identifier: ptr::null_mut(),
            start: Timestamp::from_parts(0, 0, 0, 0, 0, 0),
            end: Timestamp::from_parts(0, 0, 0, 0, 0, 0),
            observations: ptr::null_mut(),
        }
    }
}

impl MultiStatisticDefinition {
    pub const fn empty() -> Self {
        Self {
            size: 0,
            statistics: ptr::null_mut(),
            mix_statistics_id: ptr::null_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_statistic_definition_layout() {
        let word = size_of::<usize>();
        assert_eq!(offset_of!(StatisticDefinition, statistic_identifier), 3 * word);
        assert_eq!(offset_of!(StatisticDefinition, start), 4 * word);
        assert_eq!(offset_of!(StatisticDefinition, end), 4 * word + 24);
    }

    #[test]
    fn test_multi_statistic_size_first() {
        assert_eq!(offset_of!(MultiStatisticDefinition, size), 0);
        assert_eq!(offset_of!(MultiStatisticDefinition, statistics), size_of::<usize>());
    }
}
