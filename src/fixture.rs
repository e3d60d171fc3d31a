//! Fixtures for tests
use crate::branch::Branch;
use crate::bus::{Bus, BusType};
use crate::case::Case;
use crate::cost_curve::CostCurve;
use crate::generator::Generator;
use crate::horizon::Horizon;
use crate::storage::StorageUnit;
use indexmap::IndexMap;
use rstest::fixture;

/// A dispatchable generator with typical mid-size thermal parameters
#[fixture]
pub fn generator() -> Generator {
    Generator {
        id: "gen1".into(),
        bus: "bus1".into(),
        pmin: 20.0,
        pmax: 100.0,
        ramp_up: 50.0,
        ramp_down: 50.0,
        startup_ramp: 50.0,
        shutdown_ramp: 50.0,
        min_up_time: 2,
        min_down_time: 2,
        startup_time: 0,
        shutdown_time: 0,
        initial_status: false,
        initial_generation: 0.0,
        cost_curve: CostCurve::Quadratic {
            a0: 5.0,
            a1: 2.0,
            a2: 0.01,
        },
        hot_start_cost: 10.0,
        cold_start_cost: 40.0,
        shutdown_cost: 5.0,
        cold_start_hours: 3,
        forced_outage_rate: 0.0,
    }
}

#[fixture]
pub fn storage_unit() -> StorageUnit {
    StorageUnit {
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
        efficiency: 0.9,
        max_energy: 80.0,
        initial_soc: 0.5,
        initial_input: 0.0,
        initial_output: 0.0,
    }
}

/// A single-bus case with one generator over three periods
#[fixture]
pub fn small_case(generator: Generator) -> Case {
    let buses = vec![Bus::new("bus1", BusType::Swing)];
    let demand: IndexMap<_, _> = [("bus1".into(), vec![30.0, 30.0, 30.0])]
        .into_iter()
        .collect();

    Case::new(Horizon::hourly(3), buses, vec![generator], Vec::new(), demand)
}

/// Two buses joined by one unconstrained line, with a 100 MW unit at the
/// swing bus and a 200 MW unit at the load bus; demand totals 300 MW in both
/// periods
#[fixture]
pub fn two_bus_case() -> Case {
    let free_unit = |id: &str, bus: &str, pmax: f64| Generator {
        id: id.into(),
        bus: bus.into(),
        pmin: 0.0,
        pmax,
        ramp_up: pmax,
        ramp_down: pmax,
        startup_ramp: pmax,
        shutdown_ramp: pmax,
        min_up_time: 0,
        min_down_time: 0,
        startup_time: 0,
        shutdown_time: 0,
        initial_status: false,
        initial_generation: 0.0,
        cost_curve: CostCurve::Quadratic {
            a0: 0.0,
            a1: 0.0,
            a2: 0.0,
        },
        hot_start_cost: 0.0,
        cold_start_cost: 0.0,
        shutdown_cost: 0.0,
        cold_start_hours: 0,
        forced_outage_rate: 0.0,
    };

    let buses = vec![Bus::new("bus1", BusType::Swing), Bus::new("bus2", BusType::PQ)];
    let generators = vec![free_unit("gen1", "bus1", 100.0), free_unit("gen2", "bus2", 200.0)];
    let branches = vec![Branch {
        id: "line1".into(),
        from_bus: "bus1".into(),
        to_bus: "bus2".into(),
        reactance: 0.1,
        rating: 0.0,
        in_service: true,
    }];
    let demand: IndexMap<_, _> = [
        ("bus1".into(), vec![50.0, 50.0]),
        ("bus2".into(), vec![250.0, 250.0]),
    ]
    .into_iter()
    .collect();

    Case::new(Horizon::hourly(2), buses, generators, branches, demand)
}

/// Three buses in a ring of equal reactances, one generator, single period
#[fixture]
pub fn three_bus_case(generator: Generator) -> Case {
    let buses = vec![
        Bus::new("bus1", BusType::Swing),
        Bus::new("bus2", BusType::PQ),
        Bus::new("bus3", BusType::PQ),
    ];
    let line = |id: &str, from: &str, to: &str| Branch {
        id: id.into(),
        from_bus: from.into(),
        to_bus: to.into(),
        reactance: 0.1,
        rating: 0.0,
        in_service: true,
    };
    let branches = vec![
        line("line12", "bus1", "bus2"),
        line("line23", "bus2", "bus3"),
        line("line13", "bus1", "bus3"),
    ];
    let demand: IndexMap<_, _> = [
        ("bus2".into(), vec![20.0]),
        ("bus3".into(), vec![20.0]),
    ]
    .into_iter()
    .collect();

    Case::new(Horizon::hourly(1), buses, vec![generator], branches, demand)
}
