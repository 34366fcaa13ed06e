//! Statistic definitions: four identifiers, a period and optional observations

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::time::Timestamp;
use crate::disposal::raw::{into_raw_array, into_raw_optional_string, into_raw_string};
use crate::disposal::Owned;
use crate::error::{InteropError, Result};
use crate::marshal::read::{borrow_slice, read_optional_string, read_string};
use crate::marshal::{FromFlat, MultiTimeSeries, ToFlat};
use crate::models::{declared_len, MultiStatisticDefinition, StatisticDefinition};

/// Native description of one statistic
///
/// # Example
/// ```
/// use cinterop::StatisticSpec;
///
/// let spec: StatisticSpec = serde_json::from_str(r#"{
///     "model_variable_id": "node.2.OutflowRate",
///     "statistic_identifier": "nse",
///     "objective_identifier": "nse_node2",
///     "objective_name": "NSE at node 2",
///     "start": {"year": 2000, "month": 1, "day": 1, "hour": 0, "minute": 0, "second": 0},
///     "end": {"year": 2000, "month": 12, "day": 31, "hour": 0, "minute": 0, "second": 0}
/// }"#).unwrap();
/// assert!(spec.observations.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticSpec {
    pub model_variable_id: String,
    pub statistic_identifier: String,
    pub objective_identifier: String,
    pub objective_name: String,
    pub start: Timestamp,
    pub end: Timestamp,
    #[serde(default)]
    pub observations: Option<MultiTimeSeries>,
}

/// Native description of a list of statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiStatisticSpec {
    pub statistics: Vec<StatisticSpec>,
    #[serde(default)]
    pub mix_statistics_id: Option<String>,
}

impl MultiStatisticSpec {
    /// Parse a JSON document
    ///
    /// # Errors
    /// [`InteropError::Spec`] if the document does not describe a list of
    /// statistics.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Build a heap statistic definition
///
/// The four identifiers are duplicated, the timestamps copied and the
/// observations, if any, converted into an owned
/// [`MultiRegularTimeSeriesData`](crate::MultiRegularTimeSeriesData).
///
/// # Errors
/// A malformed `start` or `end`, a string with an interior NUL byte, or
/// observations whose rows disagree with their geometry. Nothing is leaked.
pub fn build_statistic_definition(
    model_variable_id: &str,
    objective_identifier: &str,
    objective_name: &str,
    statistic_identifier: &str,
    start: Timestamp,
    end: Timestamp,
    observations: Option<&MultiTimeSeries>,
) -> Result<Owned<StatisticDefinition>> {
    start.to_naive()?;
    end.to_naive()?;

    // SAFETY: an empty definition owns nothing.
    let mut stat = unsafe { Owned::from_value(StatisticDefinition::empty()) };
    {
        let s = stat.get_mut();
        s.start = start;
        s.end = end;
        s.model_variable_id = into_raw_string(model_variable_id)?;
        s.objective_identifier = into_raw_string(objective_identifier)?;
        s.objective_name = into_raw_string(objective_name)?;
        s.statistic_identifier = into_raw_string(statistic_identifier)?;
        if let Some(obs) = observations {
            s.observations = obs.to_flat()?.into_raw();
        }
    }
    debug!(
        "built statistic definition '{}' over {}..{}",
        objective_identifier, start, end
    );
    Ok(stat)
}

/// Build a heap multi-statistic definition holding one definition per spec
///
/// # Errors
/// As for [`build_statistic_definition`], for any of the specs, plus
/// [`InteropError::LengthOverflow`] for more than `i32::MAX` specs.
pub fn build_multi_statistic_definition(
    specs: &[StatisticSpec],
    mix_statistics_id: Option<&str>,
) -> Result<Owned<MultiStatisticDefinition>> {
    let size = i32::try_from(specs.len()).map_err(|_| InteropError::LengthOverflow {
        what: "statistics",
        len: specs.len(),
    })?;
    let built = specs
        .iter()
        .map(StatisticSpec::to_flat)
        .collect::<Result<Vec<_>>>()?;
    let label = into_raw_optional_string(mix_statistics_id)?;

    let msd = MultiStatisticDefinition {
        size,
        statistics: into_raw_array(built.into_iter().map(Owned::into_raw).collect()),
        mix_statistics_id: label,
    };
    debug!(
        "built multi-statistic definition {:?} with {} statistics",
        mix_statistics_id, size
    );
    // SAFETY: members freshly allocated above.
    Ok(unsafe { Owned::from_value(msd) })
}

impl ToFlat for StatisticSpec {
    type Flat = StatisticDefinition;

    fn to_flat(&self) -> Result<Owned<StatisticDefinition>> {
        build_statistic_definition(
            &self.model_variable_id,
            &self.objective_identifier,
            &self.objective_name,
            &self.statistic_identifier,
            self.start,
            self.end,
            self.observations.as_ref(),
        )
    }
}

impl ToFlat for MultiStatisticSpec {
    type Flat = MultiStatisticDefinition;

    fn to_flat(&self) -> Result<Owned<MultiStatisticDefinition>> {
        build_multi_statistic_definition(&self.statistics, self.mix_statistics_id.as_deref())
    }
}

impl FromFlat<StatisticDefinition> for StatisticSpec {
    unsafe fn from_flat_ref(flat: &StatisticDefinition) -> Result<Self> {
        let observations = if flat.observations.is_null() {
            None
        } else {
            Some(MultiTimeSeries::from_flat_ref(&*flat.observations)?)
        };
        Ok(Self {
            model_variable_id: read_string(flat.model_variable_id, 0)?,
            statistic_identifier: read_string(flat.statistic_identifier, 0)?,
            objective_identifier: read_string(flat.objective_identifier, 0)?,
            objective_name: read_string(flat.objective_name, 0)?,
            start: flat.start,
            end: flat.end,
            observations,
        })
    }
}

impl FromFlat<MultiStatisticDefinition> for MultiStatisticSpec {
    unsafe fn from_flat_ref(flat: &MultiStatisticDefinition) -> Result<Self> {
        let n = declared_len(flat.size, "statistics");
        let statistics = borrow_slice(flat.statistics, n, "statistics")
            .iter()
            .enumerate()
            .map(|(i, stat)| {
                assert!(!stat.is_null(), "null statistic definition at index {}", i);
                StatisticSpec::from_flat_ref(&**stat)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            statistics,
            mix_statistics_id: read_optional_string(flat.mix_statistics_id)?,
        })
    }
}
