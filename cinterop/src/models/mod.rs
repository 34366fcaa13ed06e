//! Flat struct definitions
//!
//! Every type here is `#[repr(C)]` and matches the binary layout hosts
//! declare on their side: the size field first, then the pointer fields in
//! declared order. The structs carry raw pointers and no `Drop`; teardown is
//! the job of [`crate::disposal`].

pub mod statistics;
pub mod timeseries;
pub mod vectors;

pub use statistics::{MultiStatisticDefinition, StatisticDefinition};
pub use timeseries::{
    MultiRegularTimeSeriesData, TimeSeriesDimensionDescription, TimeSeriesDimensionsDescription,
    TimeSeriesGeometry, TimeStepCode,
};
pub use vectors::{CharacterVector, NamedValueVector, StringStringMap, ValueVector};

/// Convert a C `int` count into a length
///
/// A negative count can only come from a corrupted or hand-assembled struct,
/// so this is a contract violation rather than a recoverable error.
pub(crate) fn declared_len(n: i32, what: &str) -> usize {
    assert!(n >= 0, "negative length {} declared for {}", n, what);
    n as usize
}
