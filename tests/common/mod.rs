//! Shared case-building helpers for the integration tests.
use indexmap::IndexMap;
use scuc::branch::Branch;
use scuc::bus::{Bus, BusType};
use scuc::case::Case;
use scuc::cost_curve::CostCurve;
use scuc::generator::Generator;
use scuc::horizon::Horizon;
use scuc::id::BusId;

/// A generator with no commitment frictions: zero costs, full-range ramps
pub fn free_unit(id: &str, bus: &str, pmax: f64) -> Generator {
    Generator {
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
    }
}

/// A free unit with a linear marginal cost
pub fn priced_unit(id: &str, bus: &str, pmax: f64, marginal_cost: f64) -> Generator {
    Generator {
        cost_curve: CostCurve::Quadratic {
            a0: 0.0,
            a1: marginal_cost,
            a2: 0.0,
        },
        ..free_unit(id, bus, pmax)
    }
}

/// A single swing bus named "bus1" with the given demand series
pub fn single_bus_case(generators: Vec<Generator>, demand: Vec<f64>) -> Case {
    let periods = demand.len();
    let buses = vec![Bus::new("bus1", BusType::Swing)];
    let demand: IndexMap<BusId, Vec<f64>> = [("bus1".into(), demand)].into_iter().collect();

    Case::new(Horizon::hourly(periods), buses, generators, Vec::new(), demand)
}

/// Two buses joined by one line of the given rating (0 = unconstrained)
pub fn two_bus_case(
    generators: Vec<Generator>,
    demand_bus1: Vec<f64>,
    demand_bus2: Vec<f64>,
    rating: f64,
) -> Case {
    let periods = demand_bus1.len();
    assert_eq!(periods, demand_bus2.len());

    let buses = vec![Bus::new("bus1", BusType::Swing), Bus::new("bus2", BusType::PQ)];
    let branches = vec![Branch {
        id: "line1".into(),
        from_bus: "bus1".into(),
        to_bus: "bus2".into(),
        reactance: 0.1,
        rating,
        in_service: true,
    }];
    let demand: IndexMap<BusId, Vec<f64>> = [
        ("bus1".into(), demand_bus1),
        ("bus2".into(), demand_bus2),
    ]
    .into_iter()
    .collect();

    Case::new(Horizon::hourly(periods), buses, generators, branches, demand)
}
