//! Build-level tests: model structure, determinism and the error taxonomy.
mod common;

use common::{free_unit, priced_unit, single_bus_case, two_bus_case};
use scuc::config::BuildConfig;
use scuc::cost_curve::CostCurve;
use scuc::error::BuildError;
use scuc::model::build_model;

#[test]
fn repeated_builds_are_structurally_identical() {
    let case = two_bus_case(
        vec![free_unit("gen1", "bus1", 100.0), free_unit("gen2", "bus2", 200.0)],
        vec![50.0, 50.0],
        vec![250.0, 250.0],
        0.0,
    );
    let config = BuildConfig::default();

    let first = build_model(&case, &config).unwrap();
    let second = build_model(&case, &config).unwrap();
    assert_eq!(first.num_variables(), second.num_variables());
    assert_eq!(first.num_constraints(), second.num_constraints());
    assert_eq!(first.variables(), second.variables());
}

#[test]
fn ptdf_formulation_swaps_angles_for_injections() {
    let case = two_bus_case(
        vec![priced_unit("gen1", "bus1", 100.0, 10.0)],
        vec![20.0, 20.0],
        vec![30.0, 30.0],
        0.0,
    );
    let periods = case.horizon.periods;

    let angle = build_model(&case, &BuildConfig::default()).unwrap();
    let ptdf = build_model(
        &case,
        &BuildConfig {
            use_ptdf: true,
            ..BuildConfig::default()
        },
    )
    .unwrap();

    // Same variable count (angles replaced one-for-one by injections); the
    // PTDF build adds one system-balance row per period
    assert_eq!(angle.num_variables(), ptdf.num_variables());
    assert_eq!(ptdf.num_constraints(), angle.num_constraints() + periods);
}

#[test]
fn unknown_generator_bus_is_a_topology_error() {
    let mut generator = free_unit("gen1", "bus1", 100.0);
    generator.bus = "nowhere".into();
    let case = single_bus_case(vec![generator], vec![50.0]);

    assert!(matches!(
        build_model(&case, &BuildConfig::default()),
        Err(BuildError::Topology(_))
    ));
}

#[test]
fn malformed_cost_curve_is_a_cost_curve_error() {
    let mut generator = free_unit("gen1", "bus1", 100.0);
    generator.cost_curve = CostCurve::Piecewise {
        points: vec![0.0, 50.0, 100.0],
        values: vec![100.0, 60.0, 140.0], // decreasing start
    };
    let case = single_bus_case(vec![generator], vec![50.0]);

    assert!(matches!(
        build_model(&case, &BuildConfig::default()),
        Err(BuildError::CostCurve(_))
    ));
}

#[test]
fn invalid_option_is_a_configuration_error() {
    let case = single_bus_case(vec![free_unit("gen1", "bus1", 100.0)], vec![50.0]);
    let config = BuildConfig {
        reserve_factor: -0.5,
        ..BuildConfig::default()
    };

    assert!(matches!(
        build_model(&case, &config),
        Err(BuildError::Configuration(_))
    ));
}

#[test]
fn invalid_case_data_is_a_validation_error() {
    let mut generator = free_unit("gen1", "bus1", 100.0);
    generator.pmin = 150.0; // > pmax
    let case = single_bus_case(vec![generator], vec![50.0]);

    assert!(matches!(
        build_model(&case, &BuildConfig::default()),
        Err(BuildError::Validation(_))
    ));
}

#[test]
fn more_segments_mean_more_production_cost_rows() {
    let case = single_bus_case(
        vec![priced_unit("gen1", "bus1", 100.0, 10.0)],
        vec![50.0, 50.0],
    );

    let coarse = build_model(
        &case,
        &BuildConfig {
            segments: 1,
            ..BuildConfig::default()
        },
    )
    .unwrap();
    let fine = build_model(
        &case,
        &BuildConfig {
            segments: 5,
            ..BuildConfig::default()
        },
    )
    .unwrap();

    // One extra cut per extra segment, per generator and period
    assert_eq!(
        fine.num_constraints() - coarse.num_constraints(),
        4 * case.horizon.periods
    );
}
