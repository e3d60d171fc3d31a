//! Assembly of the unit-commitment MILP from a case.
//!
//! [`build_model`] runs the whole pipeline — validation, topology, cost-curve
//! linearisation, initial conditions, variables, constraints, objective — and
//! produces an immutable [`UcModel`] snapshot for the solver adapter. The
//! intermediate state lives in a [`BuildContext`] threaded through each step;
//! nothing is recomputed reactively and nothing global is mutated.
use crate::case::Case;
use crate::config::BuildConfig;
use crate::cost_curve::{LinearisedCost, linearise};
use crate::error::BuildError;
use crate::horizon::Horizon;
use crate::id::{BranchId, BusId, GeneratorId, StorageId};
use crate::ptdf::PtdfMatrix;
use crate::solver::{Constraint, VariableDefinition};
use crate::topology::Topology;
use crate::zone::Requirement;
use log::info;

pub mod constraints;
pub mod objective;
pub mod variables;

use constraints::{BalanceKeys, add_constraints};
use variables::{VariableMap, add_variables};

/// A generator's pre-horizon state, derived from the commitment history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialCondition {
    /// Signed periods in the current state (+on / -off)
    pub state: i64,
    /// Whether the unit was on just before the horizon
    pub on: bool,
    /// Output just before the horizon (MW); 0 when off
    pub power: f64,
}

/// Everything the variable and constraint assemblers read during one build
pub struct BuildContext<'a> {
    /// The case being built
    pub case: &'a Case,
    /// The build configuration
    pub config: &'a BuildConfig,
    /// Derived network adjacency
    pub topology: &'a Topology,
    /// Linearised cost curve per generator, in generator order
    pub cost_curves: &'a [LinearisedCost],
    /// Pre-horizon state per generator, in generator order
    pub initial: &'a [InitialCondition],
    /// The PTDF matrix when the PTDF formulation was requested
    pub ptdf: Option<&'a PtdfMatrix>,
}

impl BuildContext<'_> {
    /// Pre-horizon commitment of generator `g` as a 0/1 coefficient
    pub fn unit_on_t0(&self, g: usize) -> f64 {
        if self.initial[g].on { 1.0 } else { 0.0 }
    }

    /// Pre-horizon output of generator `g` (MW)
    pub fn power_t0(&self, g: usize) -> f64 {
        self.initial[g].power
    }

    /// Ramp-up limit of generator `g` over one period (MW)
    pub fn scaled_ramp_up(&self, g: usize) -> f64 {
        self.case.generators[g].ramp_up * self.case.horizon.period_length
    }

    /// Ramp-down limit of generator `g` over one period (MW)
    pub fn scaled_ramp_down(&self, g: usize) -> f64 {
        self.case.generators[g].ramp_down * self.case.horizon.period_length
    }

    /// Periods at the start of the horizon for which generator `g` must stay
    /// on to satisfy the minimum up-time it entered the horizon with
    pub fn initial_periods_online(&self, g: usize) -> usize {
        let initial = &self.initial[g];
        if !initial.on {
            return 0;
        }
        let owed = self.case.generators[g].min_up_time as i64 - initial.state;
        (owed.max(0) as usize).min(self.case.horizon.periods)
    }

    /// Periods at the start of the horizon for which generator `g` must stay
    /// off to satisfy the minimum down-time it entered the horizon with
    pub fn initial_periods_offline(&self, g: usize) -> usize {
        let initial = &self.initial[g];
        if initial.on {
            return 0;
        }
        let owed = self.case.generators[g].min_down_time as i64 + initial.state;
        (owed.max(0) as usize).min(self.case.horizon.periods)
    }

    /// Whether a start of generator `g` at period `t` is necessarily hot.
    ///
    /// True when the cold-start window reaching back from `t` extends into a
    /// pre-horizon off-period shorter than the cold-start threshold; the
    /// hot-start indicator is then fixed at 1 rather than constrained.
    pub fn hot_start_fixed(&self, g: usize, t: usize) -> bool {
        let cold_hours = self.case.generators[g].cold_start_hours;
        t < cold_hours && (t as i64 + 1 - cold_hours as i64) <= self.initial[g].state
    }

    /// The system up-reserve requirement for period `t` (MW)
    pub fn system_reserve_requirement(&self, t: usize) -> f64 {
        let demand = self.case.total_demand(t);
        match &self.case.system_reserve {
            Some(requirement) => requirement.for_period(t, demand),
            None => Requirement::FractionOfDemand(self.config.reserve_factor).for_period(t, demand),
        }
    }
}

/// An assembled unit-commitment MILP.
///
/// The snapshot is immutable: solving reads it but never changes it, so one
/// model can be solved repeatedly and independent models can be built
/// concurrently.
pub struct UcModel {
    variables: Vec<VariableDefinition>,
    constraints: Vec<Constraint>,
    /// Column offsets for every variable family
    pub variable_map: VariableMap,
    /// Row keys of the power-balance constraints, for LMP lookup
    pub balance_keys: BalanceKeys,
    /// The horizon the model was built over
    pub horizon: Horizon,
    /// Bus IDs in bus-index order
    pub bus_ids: Vec<BusId>,
    /// Generator IDs in generator-index order
    pub generator_ids: Vec<GeneratorId>,
    /// Branch IDs in branch-index order
    pub branch_ids: Vec<BranchId>,
    /// Storage IDs in storage-index order
    pub storage_ids: Vec<StorageId>,
    /// Minimum production cost per generator ($/h), for reporting total
    /// production costs
    pub minimum_production_costs: Vec<f64>,
}

impl UcModel {
    /// The variable definitions, in column order
    pub fn variables(&self) -> &[VariableDefinition] {
        &self.variables
    }

    /// The constraint rows, in row order
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Number of decision variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraint rows
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}

/// Build the unit-commitment MILP for a case.
///
/// Fails fast on invalid configuration, case data that violates its
/// invariants, topology inconsistencies and malformed cost curves; no
/// partially built model is ever returned.
pub fn build_model(case: &Case, config: &BuildConfig) -> Result<UcModel, BuildError> {
    config.validate()?;
    case.validate()?;

    let topology = Topology::build(case)?;

    let cost_curves: Vec<LinearisedCost> = case
        .generators
        .iter()
        .map(|g| linearise(g, config.segments, config.linearized_cost_curve))
        .collect::<Result<_, _>>()?;

    let initial: Vec<InitialCondition> = case
        .initial_states(config.initial_state_policy)
        .into_iter()
        .zip(&case.generators)
        .map(|(state, generator)| {
            let on = state > 0;
            InitialCondition {
                state,
                on,
                power: if on { generator.initial_generation } else { 0.0 },
            }
        })
        .collect();

    let ptdf = if config.use_ptdf {
        Some(PtdfMatrix::calculate(
            case,
            &topology,
            config.ptdf_precision,
            config.ptdf_tolerance,
        )?)
    } else {
        None
    };

    let ctx = BuildContext {
        case,
        config,
        topology: &topology,
        cost_curves: &cost_curves,
        initial: &initial,
        ptdf: ptdf.as_ref(),
    };

    let mut variables = Vec::new();
    let variable_map = add_variables(&mut variables, &ctx);

    let mut constraints = Vec::new();
    let balance_keys = add_constraints(&mut constraints, &variable_map, &ctx);
    objective::add_stage_cost_constraints(&mut constraints, &variable_map, &ctx);

    info!(
        "assembled model: {} variables, {} constraints over {} periods",
        variables.len(),
        constraints.len(),
        case.horizon.periods
    );

    Ok(UcModel {
        variables,
        constraints,
        variable_map,
        balance_keys,
        horizon: case.horizon.clone(),
        bus_ids: case.buses.iter().map(|b| b.id.clone()).collect(),
        generator_ids: case.generators.iter().map(|g| g.id.clone()).collect(),
        branch_ids: case.branches.iter().map(|b| b.id.clone()).collect(),
        storage_ids: case.storage.iter().map(|s| s.id.clone()).collect(),
        minimum_production_costs: cost_curves.iter().map(|c| c.minimum_cost).collect(),
    })
}
