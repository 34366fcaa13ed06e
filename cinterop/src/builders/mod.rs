//! Composite builders
//!
//! Builders assemble flat structs that own other flat structs. Every partial
//! result is held in an [`Owned`](crate::Owned) guard while the rest is
//! built, so a failure part way through releases what was already allocated
//! before the error reaches the caller.

pub mod statistics;

pub use statistics::{
    build_multi_statistic_definition, build_statistic_definition, MultiStatisticSpec,
    StatisticSpec,
};
