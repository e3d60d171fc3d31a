//! The decision-variable registry for the unit-commitment problem.
//!
//! Every variable family is declared over the full Cartesian product of its
//! entity set and the time periods, in a fixed declaration order, so a
//! variable's column index is `offset + entity * T + t`. The map records the
//! offsets and hands out column indices to the constraint assembler and the
//! results extractor.
use super::BuildContext;
use crate::solver::VariableDefinition;
use std::f64::consts::PI;

/// Column offsets for every variable family in the problem
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMap {
    periods: usize,
    unit_on: usize,
    power_generated: usize,
    maximum_power_available: usize,
    regulating_reserve_up: usize,
    production_cost: usize,
    startup_cost: usize,
    shutdown_cost: usize,
    hot_start: usize,
    line_power: usize,
    angle: Option<usize>,
    net_injection: Option<usize>,
    load_mismatch: usize,
    pos_load_mismatch: usize,
    neg_load_mismatch: usize,
    global_mismatch: usize,
    pos_global_mismatch: usize,
    neg_global_mismatch: usize,
    total_demand: usize,
    nd_power: usize,
    storage_input: usize,
    storage_output: usize,
    storage_input_on: usize,
    storage_output_on: usize,
    storage_soc: usize,
    commitment_stage_cost: usize,
    generation_stage_cost: usize,
    stage_cost: usize,
}

macro_rules! indexed_accessor {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub fn $name(&self, entity: usize, t: usize) -> usize {
            self.$name + entity * self.periods + t
        }
    };
}

macro_rules! period_accessor {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub fn $name(&self, t: usize) -> usize {
            self.$name + t
        }
    };
}

impl VariableMap {
    indexed_accessor! {
        /// Binary commitment of generator `entity` in period `t`
        unit_on
    }
    indexed_accessor! {
        /// Power output of generator `entity` in period `t` (MW)
        power_generated
    }
    indexed_accessor! {
        /// Dynamic output ceiling of generator `entity` in period `t` (MW)
        maximum_power_available
    }
    indexed_accessor! {
        /// Up-reserve headroom of generator `entity` in period `t` (MW)
        regulating_reserve_up
    }
    indexed_accessor! {
        /// Production cost of generator `entity` in period `t`, above minimum ($)
        production_cost
    }
    indexed_accessor! {
        /// Startup cost charged to generator `entity` in period `t` ($)
        startup_cost
    }
    indexed_accessor! {
        /// Shutdown cost charged to generator `entity` in period `t` ($)
        shutdown_cost
    }
    indexed_accessor! {
        /// Hot-start indicator of generator `entity` in period `t`
        hot_start
    }
    indexed_accessor! {
        /// Power flow on branch `entity` in period `t` (MW)
        line_power
    }
    indexed_accessor! {
        /// Mismatch between load and generation at bus `entity` in period `t` (MW)
        load_mismatch
    }
    indexed_accessor! {
        /// Positive part of the bus mismatch
        pos_load_mismatch
    }
    indexed_accessor! {
        /// Negative part of the bus mismatch
        neg_load_mismatch
    }
    indexed_accessor! {
        /// Output of non-dispatchable unit `entity` in period `t` (MW)
        nd_power
    }
    indexed_accessor! {
        /// Charging power of storage unit `entity` in period `t` (MW)
        storage_input
    }
    indexed_accessor! {
        /// Discharging power of storage unit `entity` in period `t` (MW)
        storage_output
    }
    indexed_accessor! {
        /// Binary charging indicator of storage unit `entity` in period `t`
        storage_input_on
    }
    indexed_accessor! {
        /// Binary discharging indicator of storage unit `entity` in period `t`
        storage_output_on
    }
    indexed_accessor! {
        /// State of charge of storage unit `entity` in period `t` (fraction)
        storage_soc
    }

    period_accessor! {
        /// System-wide mismatch in period `t` (MW)
        global_mismatch
    }
    period_accessor! {
        /// Positive part of the system-wide mismatch
        pos_global_mismatch
    }
    period_accessor! {
        /// Negative part of the system-wide mismatch
        neg_global_mismatch
    }
    period_accessor! {
        /// Total system demand in period `t` (MW)
        total_demand
    }

    /// Voltage angle at bus `entity` in period `t` (radians); only present in
    /// the angle formulation
    pub fn angle(&self, entity: usize, t: usize) -> Option<usize> {
        self.angle.map(|offset| offset + entity * self.periods + t)
    }

    /// Net power injection at bus `entity` in period `t` (MW); only present
    /// in the PTDF formulation
    pub fn net_injection(&self, entity: usize, t: usize) -> Option<usize> {
        self.net_injection
            .map(|offset| offset + entity * self.periods + t)
    }

    /// Commitment-stage cost of stage `stage` ($)
    pub fn commitment_stage_cost(&self, stage: usize) -> usize {
        self.commitment_stage_cost + stage
    }

    /// Generation-stage cost of stage `stage` ($)
    pub fn generation_stage_cost(&self, stage: usize) -> usize {
        self.generation_stage_cost + stage
    }

    /// Total cost of stage `stage` ($); carries the objective coefficient
    pub fn stage_cost(&self, stage: usize) -> usize {
        self.stage_cost + stage
    }
}

/// Declare every decision variable for the build, in registry order.
///
/// Fixed values (pinned commitment, forced hot starts, the swing-bus angle,
/// out-of-service line flows) are expressed as fixed variable bounds rather
/// than extra constraint rows.
pub fn add_variables(
    definitions: &mut Vec<VariableDefinition>,
    ctx: &BuildContext,
) -> VariableMap {
    let case = ctx.case;
    let periods = case.horizon.periods;
    let num_buses = case.buses.len();

    let mut add_block = |make: &mut dyn FnMut(usize, usize) -> VariableDefinition,
                         entities: usize| {
        let offset = definitions.len();
        for entity in 0..entities {
            for t in 0..periods {
                definitions.push(make(entity, t));
            }
        }
        offset
    };

    let unit_on = add_block(
        &mut |g, t| match case.fixed_commitment.get(&(case.generators[g].id.clone(), t)) {
            Some(&on) => VariableDefinition {
                integer: true,
                ..VariableDefinition::fixed(if on { 1.0 } else { 0.0 })
            },
            None => VariableDefinition::binary(),
        },
        case.generators.len(),
    );

    let power_generated = add_block(
        &mut |g, _| VariableDefinition::continuous(0.0, case.generators[g].pmax),
        case.generators.len(),
    );

    let maximum_power_available = add_block(
        &mut |_, _| VariableDefinition::continuous(0.0, f64::INFINITY),
        case.generators.len(),
    );

    let regulating_reserve_up = add_block(
        &mut |_, _| VariableDefinition::continuous(0.0, f64::INFINITY),
        case.generators.len(),
    );

    let production_cost = add_block(
        &mut |_, _| VariableDefinition::continuous(0.0, f64::INFINITY),
        case.generators.len(),
    );
    let startup_cost = add_block(
        &mut |_, _| VariableDefinition::continuous(0.0, f64::INFINITY),
        case.generators.len(),
    );
    let shutdown_cost = add_block(
        &mut |_, _| VariableDefinition::continuous(0.0, f64::INFINITY),
        case.generators.len(),
    );

    let hot_start = add_block(
        &mut |g, t| {
            if ctx.hot_start_fixed(g, t) {
                VariableDefinition::fixed(1.0)
            } else {
                VariableDefinition::continuous(0.0, 1.0)
            }
        },
        case.generators.len(),
    );

    let line_power = add_block(
        &mut |l, _| {
            let branch = &case.branches[l];
            if !branch.in_service {
                VariableDefinition::fixed(0.0)
            } else if branch.is_rated() {
                VariableDefinition::continuous(-branch.rating, branch.rating)
            } else {
                VariableDefinition::continuous(f64::NEG_INFINITY, f64::INFINITY)
            }
        },
        case.branches.len(),
    );

    let (angle, net_injection) = if ctx.ptdf.is_some() {
        let offset = add_block(
            &mut |_, _| VariableDefinition::continuous(f64::NEG_INFINITY, f64::INFINITY),
            num_buses,
        );
        (None, Some(offset))
    } else {
        let swing = ctx.topology.swing_bus;
        let offset = add_block(
            &mut |b, _| {
                if b == swing {
                    VariableDefinition::fixed(0.0)
                } else {
                    VariableDefinition::continuous(-PI, PI)
                }
            },
            num_buses,
        );
        (Some(offset), None)
    };

    let load_mismatch = add_block(
        &mut |_, _| VariableDefinition::continuous(f64::NEG_INFINITY, f64::INFINITY),
        num_buses,
    );
    let pos_load_mismatch = add_block(
        &mut |_, _| VariableDefinition::continuous(0.0, f64::INFINITY),
        num_buses,
    );
    let neg_load_mismatch = add_block(
        &mut |_, _| VariableDefinition::continuous(0.0, f64::INFINITY),
        num_buses,
    );

    let global_mismatch = add_block(
        &mut |_, _| VariableDefinition::continuous(f64::NEG_INFINITY, f64::INFINITY),
        1,
    );
    let pos_global_mismatch =
        add_block(&mut |_, _| VariableDefinition::continuous(0.0, f64::INFINITY), 1);
    let neg_global_mismatch =
        add_block(&mut |_, _| VariableDefinition::continuous(0.0, f64::INFINITY), 1);
    let total_demand =
        add_block(&mut |_, _| VariableDefinition::continuous(0.0, f64::INFINITY), 1);

    let nd_power = add_block(
        &mut |n, t| {
            let nd = &case.nondispatchables[n];
            VariableDefinition::continuous(nd.min_power[t], nd.max_power[t])
        },
        case.nondispatchables.len(),
    );

    let storage_input = add_block(
        &mut |s, _| VariableDefinition::continuous(0.0, case.storage[s].max_input),
        case.storage.len(),
    );
    let storage_output = add_block(
        &mut |s, _| VariableDefinition::continuous(0.0, case.storage[s].max_output),
        case.storage.len(),
    );
    let storage_input_on =
        add_block(&mut |_, _| VariableDefinition::binary(), case.storage.len());
    let storage_output_on =
        add_block(&mut |_, _| VariableDefinition::binary(), case.storage.len());
    let storage_soc = add_block(
        &mut |_, _| VariableDefinition::continuous(0.0, 1.0),
        case.storage.len(),
    );

    // Stage cost variables are period-free. The per-stage total carries the
    // whole objective: minimising the stage costs is minimising total cost.
    let num_stages = super::objective::NUM_STAGES;
    let commitment_stage_cost = definitions.len();
    for _ in 0..num_stages {
        definitions.push(VariableDefinition::continuous(0.0, f64::INFINITY));
    }
    let generation_stage_cost = definitions.len();
    for _ in 0..num_stages {
        definitions.push(VariableDefinition::continuous(0.0, f64::INFINITY));
    }
    let stage_cost = definitions.len();
    for _ in 0..num_stages {
        definitions.push(VariableDefinition {
            coefficient: 1.0,
            ..VariableDefinition::continuous(0.0, f64::INFINITY)
        });
    }

    VariableMap {
        periods,
        unit_on,
        power_generated,
        maximum_power_available,
        regulating_reserve_up,
        production_cost,
        startup_cost,
        shutdown_cost,
        hot_start,
        line_power,
        angle,
        net_injection,
        load_mismatch,
        pos_load_mismatch,
        neg_load_mismatch,
        global_mismatch,
        pos_global_mismatch,
        neg_global_mismatch,
        total_demand,
        nd_power,
        storage_input,
        storage_output,
        storage_input_on,
        storage_output_on,
        storage_soc,
        commitment_stage_cost,
        generation_stage_cost,
        stage_cost,
    }
}
