//! Reshaping of raw solver output into schedules, flows, angles and prices.
//!
//! A [`UcResults`] is a value object keyed by the model it was extracted
//! from; it borrows nothing, so the model and solution can be dropped after
//! extraction.
use crate::id::{BranchId, BusId, GeneratorId, StorageId};
use crate::model::UcModel;
use crate::solver::{Solution, SolutionStatus};
use indexmap::IndexMap;

/// Per-generator, per-period schedule and costs
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSchedule {
    /// Commitment (on/off) per period
    pub commitment: Vec<bool>,
    /// Dispatch per period (MW)
    pub dispatch: Vec<f64>,
    /// Available headroom ceiling per period (MW)
    pub power_available: Vec<f64>,
    /// Total production cost per period ($)
    pub production_cost: Vec<f64>,
    /// Startup cost per period ($)
    pub startup_cost: Vec<f64>,
    /// Shutdown cost per period ($)
    pub shutdown_cost: Vec<f64>,
    /// Up-reserve provided per period (MW)
    pub reserve_up: Vec<f64>,
}

/// Per-bus, per-period results
#[derive(Debug, Clone, PartialEq)]
pub struct BusResult {
    /// Voltage angle per period (radians); absent in the PTDF formulation
    pub angle: Option<Vec<f64>>,
    /// Locational marginal price per period ($/MWh); absent when no duals
    /// were computed
    pub lmp: Option<Vec<f64>>,
    /// Load-generation mismatch per period (MW); nonzero only when the
    /// problem needed the relief valve
    pub mismatch: Vec<f64>,
}

/// Per-branch, per-period results
#[derive(Debug, Clone, PartialEq)]
pub struct BranchResult {
    /// Power flow per period (MW)
    pub flow: Vec<f64>,
}

/// Per-storage, per-period results
#[derive(Debug, Clone, PartialEq)]
pub struct StorageResult {
    /// Charging power per period (MW)
    pub input: Vec<f64>,
    /// Discharging power per period (MW)
    pub output: Vec<f64>,
    /// State of charge per period (fraction)
    pub soc: Vec<f64>,
}

/// The complete reshaped solution of a unit-commitment model
#[derive(Debug, Clone, PartialEq)]
pub struct UcResults {
    /// How the solver terminated
    pub status: SolutionStatus,
    /// Total objective value ($)
    pub objective: f64,
    /// Schedules keyed by generator
    pub generators: IndexMap<GeneratorId, GeneratorSchedule>,
    /// Results keyed by bus
    pub buses: IndexMap<BusId, BusResult>,
    /// Results keyed by branch
    pub branches: IndexMap<BranchId, BranchResult>,
    /// Results keyed by storage unit
    pub storage: IndexMap<StorageId, StorageResult>,
}

impl UcResults {
    /// Reshape a solution into per-entity time series.
    pub fn extract(model: &UcModel, solution: &Solution) -> UcResults {
        let periods = model.horizon.periods;
        let dt = model.horizon.period_length;
        let vars = &model.variable_map;

        let generators = model
            .generator_ids
            .iter()
            .enumerate()
            .map(|(g, id)| {
                let commitment: Vec<bool> = (0..periods)
                    .map(|t| solution.value(vars.unit_on(g, t)) > 0.5)
                    .collect();
                let minimum_cost = model.minimum_production_costs[g];
                let production_cost = (0..periods)
                    .map(|t| {
                        let committed = if commitment[t] { 1.0 } else { 0.0 };
                        solution.value(vars.production_cost(g, t)) + minimum_cost * dt * committed
                    })
                    .collect();

                let schedule = GeneratorSchedule {
                    dispatch: collect_series(solution, periods, |t| vars.power_generated(g, t)),
                    power_available: collect_series(solution, periods, |t| {
                        vars.maximum_power_available(g, t)
                    }),
                    production_cost,
                    startup_cost: collect_series(solution, periods, |t| vars.startup_cost(g, t)),
                    shutdown_cost: collect_series(solution, periods, |t| vars.shutdown_cost(g, t)),
                    reserve_up: collect_series(solution, periods, |t| {
                        vars.regulating_reserve_up(g, t)
                    }),
                    commitment,
                };
                (id.clone(), schedule)
            })
            .collect();

        // Locational marginal prices come from the duals of the
        // power-balance rows
        let lmps: Option<IndexMap<BusId, Vec<f64>>> = solution.dual_rows().map(|duals| {
            let mut lmps: IndexMap<BusId, Vec<f64>> = model
                .bus_ids
                .iter()
                .map(|id| (id.clone(), vec![0.0; periods]))
                .collect();
            for ((bus_id, t), price) in model.balance_keys.zip_duals(duals) {
                lmps.get_mut(bus_id).expect("balance key for unknown bus")[*t] = price;
            }
            lmps
        });

        let buses = model
            .bus_ids
            .iter()
            .enumerate()
            .map(|(b, id)| {
                let angle = vars
                    .angle(b, 0)
                    .map(|_| collect_series(solution, periods, |t| vars.angle(b, t).unwrap()));
                let result = BusResult {
                    angle,
                    lmp: lmps.as_ref().map(|lmps| lmps[id].clone()),
                    mismatch: collect_series(solution, periods, |t| vars.load_mismatch(b, t)),
                };
                (id.clone(), result)
            })
            .collect();

        let branches = model
            .branch_ids
            .iter()
            .enumerate()
            .map(|(l, id)| {
                let result = BranchResult {
                    flow: collect_series(solution, periods, |t| vars.line_power(l, t)),
                };
                (id.clone(), result)
            })
            .collect();

        let storage = model
            .storage_ids
            .iter()
            .enumerate()
            .map(|(s, id)| {
                let result = StorageResult {
                    input: collect_series(solution, periods, |t| vars.storage_input(s, t)),
                    output: collect_series(solution, periods, |t| vars.storage_output(s, t)),
                    soc: collect_series(solution, periods, |t| vars.storage_soc(s, t)),
                };
                (id.clone(), result)
            })
            .collect();

        UcResults {
            status: solution.status,
            objective: solution.objective,
            generators,
            buses,
            branches,
            storage,
        }
    }
}

/// Collect a per-period series of column values
fn collect_series(
    solution: &Solution,
    periods: usize,
    mut column: impl FnMut(usize) -> usize,
) -> Vec<f64> {
    (0..periods).map(|t| solution.value(column(t))).collect()
}
