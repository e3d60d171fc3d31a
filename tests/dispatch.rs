//! Solver-backed scenario tests: build a case, solve the MILP and check the
//! resulting schedules, flows and prices.
mod common;

use common::{free_unit, priced_unit, single_bus_case, two_bus_case};
use float_cmp::assert_approx_eq;
use scuc::config::{BuildConfig, SolverOptions};
use scuc::model::build_model;
use scuc::results::UcResults;
use scuc::solver::{SolutionStatus, solve};
use scuc::zone::{Requirement, ReserveZone};

fn solve_case(case: &scuc::case::Case, config: &BuildConfig) -> UcResults {
    let model = build_model(case, config).unwrap();
    let solution = solve(&model, &SolverOptions::default()).unwrap();
    UcResults::extract(&model, &solution)
}

#[test]
fn two_generators_fully_committed() {
    // 100 + 200 MW of free capacity against 50 + 250 MW of demand: both units
    // run flat out with no mismatch and no cost
    let case = two_bus_case(
        vec![free_unit("gen1", "bus1", 100.0), free_unit("gen2", "bus2", 200.0)],
        vec![50.0, 50.0],
        vec![250.0, 250.0],
        0.0,
    );
    let results = solve_case(&case, &BuildConfig::default());

    assert_eq!(results.status, SolutionStatus::Optimal);
    assert_approx_eq!(f64, results.objective, 0.0, epsilon = 1e-4);
    for t in 0..2 {
        assert!(results.generators["gen1"].commitment[t]);
        assert!(results.generators["gen2"].commitment[t]);
        assert_approx_eq!(
            f64,
            results.generators["gen1"].dispatch[t],
            100.0,
            epsilon = 1e-4
        );
        assert_approx_eq!(
            f64,
            results.generators["gen2"].dispatch[t],
            200.0,
            epsilon = 1e-4
        );
        for bus in results.buses.values() {
            assert_approx_eq!(f64, bus.mismatch[t], 0.0, epsilon = 1e-4);
        }
    }
}

#[test]
fn lmp_equals_marginal_cost_when_uncongested() {
    // The cheap unit is exhausted, so the 12 $/MWh unit is marginal and sets
    // the price at every bus (the line is unconstrained)
    let case = two_bus_case(
        vec![
            priced_unit("gen1", "bus1", 150.0, 10.0),
            priced_unit("gen2", "bus2", 200.0, 12.0),
        ],
        vec![50.0],
        vec![150.0],
        0.0,
    );
    let results = solve_case(&case, &BuildConfig::default());

    assert_approx_eq!(f64, results.generators["gen1"].dispatch[0], 150.0, epsilon = 1e-4);
    assert_approx_eq!(f64, results.generators["gen2"].dispatch[0], 50.0, epsilon = 1e-4);
    for bus in results.buses.values() {
        let lmp = bus.lmp.as_ref().expect("duals computed by default");
        assert_approx_eq!(f64, lmp[0], 12.0, epsilon = 1e-6);
    }
}

#[test]
fn congestion_splits_prices() {
    // The cheap unit can cover everything, but the line only carries 100 MW
    // to the load bus, so the expensive local unit sets the price there
    let case = two_bus_case(
        vec![
            priced_unit("gen1", "bus1", 300.0, 10.0),
            priced_unit("gen2", "bus2", 200.0, 30.0),
        ],
        vec![0.0],
        vec![250.0],
        100.0,
    );
    let results = solve_case(&case, &BuildConfig::default());

    assert_approx_eq!(f64, results.branches["line1"].flow[0], 100.0, epsilon = 1e-4);
    assert_approx_eq!(f64, results.generators["gen1"].dispatch[0], 100.0, epsilon = 1e-4);
    assert_approx_eq!(f64, results.generators["gen2"].dispatch[0], 150.0, epsilon = 1e-4);

    let lmp_bus1 = results.buses["bus1"].lmp.as_ref().unwrap()[0];
    let lmp_bus2 = results.buses["bus2"].lmp.as_ref().unwrap()[0];
    assert_approx_eq!(f64, lmp_bus1, 10.0, epsilon = 1e-6);
    assert_approx_eq!(f64, lmp_bus2, 30.0, epsilon = 1e-6);
}

#[test]
fn capacity_shortfall_relieved_by_mismatch() {
    // Demand exceeds every MW of capacity; the problem stays feasible and the
    // deficit lands in the positive mismatch variable
    let case = single_bus_case(vec![free_unit("gen1", "bus1", 100.0)], vec![150.0]);
    let results = solve_case(&case, &BuildConfig::default());

    assert_eq!(results.status, SolutionStatus::Optimal);
    assert_approx_eq!(f64, results.generators["gen1"].dispatch[0], 100.0, epsilon = 1e-4);
    assert_approx_eq!(f64, results.buses["bus1"].mismatch[0], 50.0, epsilon = 1e-4);
    // The penalty dominates the objective
    assert!(results.objective > 1e6);
}

#[test]
fn short_outage_is_a_hot_start() {
    // Off for one period with a three-period cold-start threshold: the
    // restart is classified hot and charged the hot-start cost
    let mut unit = free_unit("gen1", "bus1", 100.0);
    unit.hot_start_cost = 10.0;
    unit.cold_start_cost = 40.0;
    unit.cold_start_hours = 3;
    unit.min_down_time = 1;

    let mut case = single_bus_case(vec![unit], vec![50.0, 50.0]);
    case.commitment_history
        .insert("gen1".into(), vec![1, 1, 0]);

    let results = solve_case(&case, &BuildConfig::default());
    assert!(results.generators["gen1"].commitment[0]);
    assert_approx_eq!(
        f64,
        results.generators["gen1"].startup_cost[0],
        10.0,
        epsilon = 1e-4
    );
}

#[test]
fn long_outage_is_a_cold_start() {
    let mut unit = free_unit("gen1", "bus1", 100.0);
    unit.hot_start_cost = 10.0;
    unit.cold_start_cost = 40.0;
    unit.cold_start_hours = 3;
    unit.min_down_time = 1;

    let mut case = single_bus_case(vec![unit], vec![50.0, 50.0]);
    // Off for four periods, beyond the cold-start threshold
    case.commitment_history
        .insert("gen1".into(), vec![1, 0, 0, 0, 0]);

    let results = solve_case(&case, &BuildConfig::default());
    assert_approx_eq!(
        f64,
        results.generators["gen1"].startup_cost[0],
        40.0,
        epsilon = 1e-4
    );
}

#[test]
fn ramp_limit_caps_dispatch_growth() {
    // The small marginal cost keeps the unit from pre-ramping above demand at
    // t=0, so the optimum is unique
    let mut unit = priced_unit("gen1", "bus1", 200.0, 1.0);
    unit.ramp_up = 30.0;
    unit.initial_status = true;
    unit.initial_generation = 50.0;

    let mut case = single_bus_case(vec![unit], vec![50.0, 100.0]);
    case.commitment_history.insert("gen1".into(), vec![1, 1]);

    let results = solve_case(&case, &BuildConfig::default());
    let schedule = &results.generators["gen1"];

    assert_approx_eq!(f64, schedule.dispatch[0], 50.0, epsilon = 1e-4);
    // 50 + 30 MW/h of ramp: the last 20 MW of demand go unserved
    assert_approx_eq!(f64, schedule.dispatch[1], 80.0, epsilon = 1e-4);
    assert_approx_eq!(f64, results.buses["bus1"].mismatch[1], 20.0, epsilon = 1e-4);
}

#[test]
fn minimum_up_time_holds_unit_on() {
    let base = priced_unit("base", "bus1", 100.0, 5.0);
    let mut peaker = priced_unit("peaker", "bus1", 50.0, 50.0);
    peaker.pmin = 10.0;
    peaker.min_up_time = 3;

    // The peaker is only needed for the 130 MW spike at t=1, but once
    // started it must run through the end of the horizon
    let case = single_bus_case(vec![base, peaker], vec![100.0, 130.0, 100.0, 100.0]);
    let results = solve_case(&case, &BuildConfig::default());

    assert_eq!(
        results.generators["peaker"].commitment,
        vec![false, true, true, true]
    );
    // While held on, the peaker sits at its minimum output
    assert_approx_eq!(
        f64,
        results.generators["peaker"].dispatch[2],
        10.0,
        epsilon = 1e-4
    );
}

#[test]
fn zonal_reserve_forces_headroom() {
    let mut case = single_bus_case(vec![free_unit("gen1", "bus1", 100.0)], vec![50.0, 50.0]);
    case.zones.push(ReserveZone {
        id: "zone1".into(),
        generators: vec!["gen1".into()],
        requirement: Requirement::Fixed(vec![20.0, 20.0]),
    });

    let results = solve_case(&case, &BuildConfig::default());
    for t in 0..2 {
        assert!(results.generators["gen1"].commitment[t]);
        assert!(results.generators["gen1"].reserve_up[t] >= 20.0 - 1e-6);
    }
}

#[test]
fn pinned_commitment_is_respected() {
    let mut case = two_bus_case(
        vec![free_unit("gen1", "bus1", 100.0), free_unit("gen2", "bus2", 200.0)],
        vec![50.0],
        vec![40.0],
        0.0,
    );
    case.fixed_commitment.insert(("gen2".into(), 0), false);

    let results = solve_case(&case, &BuildConfig::default());
    assert!(!results.generators["gen2"].commitment[0]);
    assert_approx_eq!(f64, results.generators["gen2"].dispatch[0], 0.0, epsilon = 1e-6);
    assert_approx_eq!(f64, results.generators["gen1"].dispatch[0], 90.0, epsilon = 1e-4);
}

#[test]
fn storage_discharges_to_cover_the_peak() {
    let mut case = single_bus_case(
        vec![priced_unit("gen1", "bus1", 100.0, 10.0)],
        vec![80.0, 120.0],
    );
    case.storage.push(scuc::storage::StorageUnit {
        id: "battery1".into(),
        bus: "bus1".into(),
        max_input: 20.0,
        max_output: 20.0,
        min_input: 0.0,
        min_output: 0.0,
        input_ramp_up: 20.0,
        input_ramp_down: 20.0,
        output_ramp_up: 20.0,
        output_ramp_down: 20.0,
        efficiency: 1.0,
        max_energy: 40.0,
        initial_soc: 0.5,
        initial_input: 0.0,
        initial_output: 0.0,
    });

    let results = solve_case(&case, &BuildConfig::default());

    // The generator alone cannot cover the 120 MW peak; the battery makes up
    // the difference and no mismatch is needed
    assert_approx_eq!(f64, results.storage["battery1"].output[1], 20.0, epsilon = 1e-4);
    assert_approx_eq!(f64, results.storage["battery1"].soc[1], 0.0, epsilon = 1e-4);
    assert_approx_eq!(f64, results.buses["bus1"].mismatch[1], 0.0, epsilon = 1e-4);
}

#[test]
fn ptdf_flows_match_angle_flows() {
    let generators = vec![
        priced_unit("gen1", "bus1", 100.0, 10.0),
        priced_unit("gen2", "bus2", 200.0, 30.0),
    ];
    let case = two_bus_case(generators, vec![50.0], vec![250.0], 0.0);

    let angle_results = solve_case(&case, &BuildConfig::default());
    let ptdf_results = solve_case(
        &case,
        &BuildConfig {
            use_ptdf: true,
            ..BuildConfig::default()
        },
    );

    // The two network formulations must agree on dispatch and flows
    for id in ["gen1", "gen2"] {
        assert_approx_eq!(
            f64,
            angle_results.generators[id].dispatch[0],
            ptdf_results.generators[id].dispatch[0],
            epsilon = 1e-6
        );
    }
    assert_approx_eq!(
        f64,
        angle_results.branches["line1"].flow[0],
        ptdf_results.branches["line1"].flow[0],
        epsilon = 1e-6
    );
    // PTDF builds carry no angle variables
    assert!(ptdf_results.buses["bus1"].angle.is_none());
    assert!(angle_results.buses["bus1"].angle.is_some());
}
