//! Tests for the statistic definition builders

use cinterop::{
    build_multi_statistic_definition, build_statistic_definition, from_flat, InteropError,
    MultiStatisticSpec, MultiTimeSeries, StatisticSpec, TimeSeriesGeometry, Timestamp, ToFlat,
};

fn day(d: i32) -> Timestamp {
    Timestamp::new(2001, 1, d, 0, 0, 0).unwrap()
}

fn observations(rows: usize) -> MultiTimeSeries {
    let geometry = TimeSeriesGeometry::regular(day(1), 86400, 10);
    let data = (0..rows).map(|r| vec![r as f64; 10]).collect();
    MultiTimeSeries::new(geometry, data).unwrap()
}

const CALIBRATION_JSON: &str = r#"{
    "mix_statistics_id": "weighted_nse",
    "statistics": [
        {
            "model_variable_id": "subarea.Subarea.runoff",
            "statistic_identifier": "nse",
            "objective_identifier": "nse_runoff",
            "objective_name": "NSE on runoff",
            "start": {"year": 2001, "month": 1, "day": 1, "hour": 0, "minute": 0, "second": 0},
            "end": {"year": 2001, "month": 1, "day": 10, "hour": 0, "minute": 0, "second": 0},
            "observations": {
                "geometry": {
                    "start": {"year": 2001, "month": 1, "day": 1, "hour": 0, "minute": 0, "second": 0},
                    "time_step_seconds": 86400,
                    "length": 3,
                    "time_step_code": 0
                },
                "data": [[0.5, 1.5, 2.5]]
            }
        },
        {
            "model_variable_id": "node.2.OutflowRate",
            "statistic_identifier": "bias",
            "objective_identifier": "bias_node2",
            "objective_name": "Bias at node 2",
            "start": {"year": 2001, "month": 1, "day": 1, "hour": 0, "minute": 0, "second": 0},
            "end": {"year": 2001, "month": 1, "day": 10, "hour": 0, "minute": 0, "second": 0}
        }
    ]
}"#;

#[test]
fn test_build_statistic_copies_every_field() {
    let obs = observations(2);
    let stat =
        build_statistic_definition("var", "obj_id", "Objective", "nse", day(1), day(10), Some(&obs))
            .unwrap();
    assert_eq!(stat.start, day(1));
    assert_eq!(stat.end, day(10));
    let nested = unsafe { &*stat.observations };
    assert_eq!(nested.ensemble_size, 2);
    assert_eq!(nested.time_series_geometry.length, 10);

    let spec: StatisticSpec = stat.into_native().unwrap();
    assert_eq!(spec.model_variable_id, "var");
    assert_eq!(spec.objective_identifier, "obj_id");
    assert_eq!(spec.objective_name, "Objective");
    assert_eq!(spec.statistic_identifier, "nse");
    assert_eq!(spec.observations, Some(obs));
}

#[test]
fn test_multi_statistic_from_json() {
    let spec = MultiStatisticSpec::from_json(CALIBRATION_JSON).unwrap();
    let msd = spec.to_flat().unwrap();
    assert_eq!(msd.size, 2);
    assert!(!msd.mix_statistics_id.is_null());

    let stats = unsafe { std::slice::from_raw_parts(msd.statistics, 2) };
    assert!(!unsafe { &*stats[0] }.observations.is_null());
    assert!(unsafe { &*stats[1] }.observations.is_null());

    let back: MultiStatisticSpec = msd.into_native().unwrap();
    assert_eq!(back, spec);
}

#[test]
fn test_json_with_ragged_observations_is_rejected() {
    let json = CALIBRATION_JSON.replace("[[0.5, 1.5, 2.5]]", "[[0.5, 1.5]]");
    let err = MultiStatisticSpec::from_json(&json).unwrap_err();
    assert!(matches!(err, InteropError::Spec(_)));
    assert!(err.to_string().contains("expected 3, got 2"));
}

#[test]
fn test_edited_ragged_observations_fail_at_build() {
    let mut spec = MultiStatisticSpec::from_json(CALIBRATION_JSON).unwrap();
    if let Some(obs) = spec.statistics[0].observations.as_mut() {
        obs.data[0].pop();
    }
    assert!(matches!(
        spec.to_flat().unwrap_err(),
        InteropError::LengthMismatch {
            expected: 3,
            actual: 2,
            ..
        }
    ));
}

#[test]
fn test_invalid_json() {
    let err = MultiStatisticSpec::from_json("{\"statistics\": 3}").unwrap_err();
    assert!(err.to_string().starts_with("Invalid statistic specification"));
}

#[test]
fn test_multi_statistic_without_label() {
    let specs = vec![StatisticSpec {
        model_variable_id: "v".into(),
        statistic_identifier: "s".into(),
        objective_identifier: "o".into(),
        objective_name: "n".into(),
        start: day(1),
        end: day(2),
        observations: None,
    }];
    let mut msd = build_multi_statistic_definition(&specs, None)
        .unwrap()
        .into_inner();
    assert!(msd.mix_statistics_id.is_null());
    let back: MultiStatisticSpec = unsafe { from_flat(&mut msd, true) }.unwrap();
    assert_eq!(back.statistics, specs);
    assert_eq!(back.mix_statistics_id, None);
    assert!(msd.statistics.is_null());
    assert_eq!(msd.size, 0);
}
