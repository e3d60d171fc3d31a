//! The constraint assembler: every row of the unit-commitment MILP.
//!
//! Each family below generates rows for the full Cartesian product of its
//! entity set and the time periods. Period 0 rows substitute the pre-horizon
//! parameters (`unit_on_t0`, `power_t0`) for the `t-1` variables. The
//! commitment/ramping forms follow Carrión & Arroyo.
use super::BuildContext;
use super::variables::VariableMap;
use crate::id::BusId;
use crate::solver::Constraint;
use indexmap::IndexMap;

/// Keys describing a run of constraint rows, with the offset of the first row
pub struct KeysWithOffset<T> {
    offset: usize,
    keys: Vec<T>,
}

impl<T> KeysWithOffset<T> {
    /// Zip the keys with the corresponding dual values in the solution, accounting for the offset
    pub fn zip_duals<'a>(&'a self, duals: &'a [f64]) -> impl Iterator<Item = (&'a T, f64)> {
        assert!(
            self.offset + self.keys.len() <= duals.len(),
            "Bad constraint keys: dual rows out of range"
        );

        self.keys.iter().zip(duals[self.offset..].iter().copied())
    }
}

/// Indicates the bus and period covered by each power-balance constraint.
///
/// The dual of a power-balance row is the locational marginal price.
pub type BalanceKeys = KeysWithOffset<(BusId, usize)>;

/// Accumulates sparse row terms, merging duplicate columns.
///
/// Several families (the minimum up/down-time windows in particular) touch
/// the same column more than once; the solver wants each column at most once
/// per row.
#[derive(Default)]
pub(crate) struct Terms(IndexMap<usize, f64>);

impl Terms {
    pub(crate) fn add(&mut self, column: usize, coefficient: f64) -> &mut Self {
        *self.0.entry(column).or_insert(0.0) += coefficient;
        self
    }

    pub(crate) fn build(self) -> Vec<(usize, f64)> {
        self.0.into_iter().collect()
    }
}

/// Generate every constraint row for the build.
///
/// Returns the keys of the power-balance rows for later dual (LMP) lookup.
pub fn add_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) -> BalanceKeys {
    add_total_demand_definitions(constraints, vars, ctx);
    let balance_keys = add_power_balance_constraints(constraints, vars, ctx);
    add_line_flow_definitions(constraints, vars, ctx);
    add_interface_constraints(constraints, vars, ctx);
    add_mismatch_definitions(constraints, vars, ctx);
    add_system_reserve_constraints(constraints, vars, ctx);
    add_regulating_reserve_constraints(constraints, vars, ctx);
    add_generator_output_constraints(constraints, vars, ctx);
    add_ramp_up_availability_constraints(constraints, vars, ctx);
    add_ramp_down_availability_constraints(constraints, vars, ctx);
    add_ramp_down_constraints(constraints, vars, ctx);
    add_min_up_time_constraints(constraints, vars, ctx);
    add_min_down_time_constraints(constraints, vars, ctx);
    add_hot_start_constraints(constraints, vars, ctx);
    add_startup_cost_constraints(constraints, vars, ctx);
    add_shutdown_cost_constraints(constraints, vars, ctx);
    add_production_cost_constraints(constraints, vars, ctx);
    add_storage_constraints(constraints, vars, ctx);

    balance_keys
}

/// `TotalDemand[t]` equals the summed bus demand for the period
fn add_total_demand_definitions(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    for t in ctx.case.horizon.iter() {
        let demand = ctx.case.total_demand(t);
        constraints.push(Constraint::equality(
            demand,
            vec![(vars.total_demand(t), 1.0)],
        ));
    }
}

/// Power balance at every bus and period.
///
/// Angle formulation: generation (de-rated and split by contribution factor)
/// plus storage and non-dispatchable output plus net inbound line flow plus
/// the mismatch relief variable equals demand.
///
/// PTDF formulation: the same balance defines the net injection variable and
/// the per-period sum of injections is forced to zero; line flows are tied to
/// injections in [`add_line_flow_definitions`].
fn add_power_balance_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) -> BalanceKeys {
    let offset = constraints.len();
    let mut keys = Vec::new();

    let case = ctx.case;
    let topology = ctx.topology;
    for (b, bus) in case.buses.iter().enumerate() {
        for t in case.horizon.iter() {
            let mut terms = Terms::default();
            for &g in &topology.generators_at_bus[b] {
                let generator = &case.generators[g];
                let factor =
                    (1.0 - generator.forced_outage_rate) * topology.contribution(g, b);
                terms.add(vars.power_generated(g, t), factor);
            }
            for &s in &topology.storage_at_bus[b] {
                terms.add(vars.storage_output(s, t), 1.0);
                terms.add(vars.storage_input(s, t), -1.0);
            }
            for &n in &topology.nondispatchables_at_bus[b] {
                terms.add(vars.nd_power(n, t), 1.0);
            }
            terms.add(vars.load_mismatch(b, t), 1.0);

            if let Some(injection) = vars.net_injection(b, t) {
                // PTDF: generation - demand defines the net injection
                terms.add(injection, -1.0);
            } else {
                for &l in &topology.lines_to[b] {
                    terms.add(vars.line_power(l, t), 1.0);
                }
                for &l in &topology.lines_from[b] {
                    terms.add(vars.line_power(l, t), -1.0);
                }
            }

            constraints.push(Constraint::equality(
                case.demand_at(&bus.id, t),
                terms.build(),
            ));
            keys.push((bus.id.clone(), t));
        }
    }

    // PTDF: injections must balance system-wide each period
    if ctx.ptdf.is_some() {
        for t in case.horizon.iter() {
            let mut terms = Terms::default();
            for b in 0..case.buses.len() {
                terms.add(vars.net_injection(b, t).unwrap(), 1.0);
            }
            constraints.push(Constraint::equality(0.0, terms.build()));
        }
    }

    BalanceKeys { offset, keys }
}

/// Tie each line's flow to the network state.
///
/// Angle formulation: `flow = (angle_from - angle_to) / reactance`.
/// PTDF formulation: `flow = sum_b ptdf[l,b] * injection[b]`.
/// Out-of-service lines are skipped; their flow columns are fixed at zero.
fn add_line_flow_definitions(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for (l, branch) in case.branches.iter().enumerate() {
        if !branch.in_service {
            continue;
        }

        for t in case.horizon.iter() {
            let mut terms = Terms::default();
            terms.add(vars.line_power(l, t), 1.0);

            if let Some(ptdf) = &ctx.ptdf {
                for (b, factor) in ptdf.row(l) {
                    terms.add(vars.net_injection(b, t).unwrap(), -factor);
                }
            } else {
                // Per-unit reactance against the MVA base gives the MW flow
                // per radian of angle difference
                let susceptance = case.base_mva / branch.reactance;
                let from = ctx.topology.bus_index[&branch.from_bus];
                let to = ctx.topology.bus_index[&branch.to_bus];
                terms.add(vars.angle(from, t).unwrap(), -susceptance);
                terms.add(vars.angle(to, t).unwrap(), susceptance);
            }

            constraints.push(Constraint::equality(0.0, terms.build()));
        }
    }
}

/// Weighted member-line flows within each interface limit
fn add_interface_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    for interface in &ctx.case.interfaces {
        for t in ctx.case.horizon.iter() {
            let terms = interface
                .branches
                .iter()
                .map(|(id, coefficient)| {
                    (vars.line_power(ctx.topology.branch_index[id], t), *coefficient)
                })
                .collect();
            constraints.push(Constraint::at_most(interface.limit, terms));
        }
    }
}

/// Give meaning to the positive and negative parts of the mismatch variables
fn add_mismatch_definitions(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for b in 0..case.buses.len() {
        for t in case.horizon.iter() {
            constraints.push(Constraint::equality(
                0.0,
                vec![
                    (vars.pos_load_mismatch(b, t), 1.0),
                    (vars.neg_load_mismatch(b, t), -1.0),
                    (vars.load_mismatch(b, t), -1.0),
                ],
            ));
        }
    }
    for t in case.horizon.iter() {
        constraints.push(Constraint::equality(
            0.0,
            vec![
                (vars.pos_global_mismatch(t), 1.0),
                (vars.neg_global_mismatch(t), -1.0),
                (vars.global_mismatch(t), -1.0),
            ],
        ));
    }
}

/// Ensure there is sufficient maximal power output available to meet both the
/// demand and the reserve requirement in each time period
fn add_system_reserve_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for t in case.horizon.iter() {
        let requirement = ctx.system_reserve_requirement(t);

        let mut terms = Terms::default();
        for g in 0..case.generators.len() {
            terms.add(vars.maximum_power_available(g, t), 1.0);
        }
        for n in 0..case.nondispatchables.len() {
            terms.add(vars.nd_power(n, t), 1.0);
        }
        for s in 0..case.storage.len() {
            terms.add(vars.storage_output(s, t), 1.0);
        }
        terms.add(vars.total_demand(t), -1.0);
        terms.add(vars.global_mismatch(t), -1.0);

        constraints.push(Constraint::at_least(requirement, terms.build()));
    }
}

/// Define per-generator up-reserve headroom and enforce each zone's requirement
fn add_regulating_reserve_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for g in 0..case.generators.len() {
        for t in case.horizon.iter() {
            constraints.push(Constraint::equality(
                0.0,
                vec![
                    (vars.regulating_reserve_up(g, t), 1.0),
                    (vars.maximum_power_available(g, t), -1.0),
                    (vars.power_generated(g, t), 1.0),
                ],
            ));
        }
    }

    for zone in &case.zones {
        for t in case.horizon.iter() {
            let requirement = zone.requirement.for_period(t, case.total_demand(t));
            let terms = zone
                .generators
                .iter()
                .map(|id| {
                    let g = case
                        .generators
                        .iter()
                        .position(|gen| gen.id == *id)
                        .expect("zone membership validated with the case");
                    (vars.regulating_reserve_up(g, t), 1.0)
                })
                .collect();
            constraints.push(Constraint::at_least(requirement, terms));
        }
    }
}

/// The three-part output bounds:
/// `pmin*on <= power <= available <= pmax*on`
fn add_generator_output_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for (g, generator) in case.generators.iter().enumerate() {
        for t in case.horizon.iter() {
            constraints.push(Constraint::at_least(
                0.0,
                vec![
                    (vars.power_generated(g, t), 1.0),
                    (vars.unit_on(g, t), -generator.pmin),
                ],
            ));
            constraints.push(Constraint::at_least(
                0.0,
                vec![
                    (vars.maximum_power_available(g, t), 1.0),
                    (vars.power_generated(g, t), -1.0),
                ],
            ));
            constraints.push(Constraint::at_least(
                0.0,
                vec![
                    (vars.unit_on(g, t), generator.pmax),
                    (vars.maximum_power_available(g, t), -1.0),
                ],
            ));
        }
    }
}

/// Bound available power by the previous period's output plus ramp-up (or
/// startup ramp) headroom
fn add_ramp_up_availability_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for (g, generator) in case.generators.iter().enumerate() {
        let ramp_up = ctx.scaled_ramp_up(g);
        let startup = generator.startup_ramp;
        let pmax = generator.pmax;

        for t in case.horizon.iter() {
            let mut terms = Terms::default();
            terms
                .add(vars.maximum_power_available(g, t), 1.0)
                .add(vars.unit_on(g, t), pmax - startup);

            if t == 0 {
                let on_t0 = ctx.unit_on_t0(g);
                let max = pmax + ctx.power_t0(g) + (ramp_up - startup) * on_t0;
                constraints.push(Constraint::at_most(max, terms.build()));
            } else {
                terms
                    .add(vars.power_generated(g, t - 1), -1.0)
                    .add(vars.unit_on(g, t - 1), startup - ramp_up);
                constraints.push(Constraint::at_most(pmax, terms.build()));
            }
        }
    }
}

/// Bound the previous period's available power by this period's commitment
/// and the shutdown ramp limit
fn add_ramp_down_availability_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for (g, generator) in case.generators.iter().enumerate() {
        let shutdown = generator.shutdown_ramp;
        let pmax = generator.pmax;

        for t in case.horizon.iter() {
            if t == 0 {
                // No pre-horizon available-power variable exists; the initial
                // output itself is bounded, which constrains unit_on[g,0]
                constraints.push(Constraint::at_most(
                    shutdown * ctx.unit_on_t0(g) - ctx.power_t0(g),
                    vec![(vars.unit_on(g, t), shutdown - pmax)],
                ));
            } else {
                constraints.push(Constraint::at_most(
                    0.0,
                    vec![
                        (vars.maximum_power_available(g, t - 1), 1.0),
                        (vars.unit_on(g, t), shutdown - pmax),
                        (vars.unit_on(g, t - 1), -shutdown),
                    ],
                ));
            }
        }
    }
}

/// Bound each period's drop in output by the ramp-down (or shutdown ramp)
/// limit
fn add_ramp_down_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for (g, generator) in case.generators.iter().enumerate() {
        let ramp_down = ctx.scaled_ramp_down(g);
        let shutdown = generator.shutdown_ramp;
        let pmax = generator.pmax;

        for t in case.horizon.iter() {
            let mut terms = Terms::default();
            terms
                .add(vars.power_generated(g, t), -1.0)
                .add(vars.unit_on(g, t), shutdown - ramp_down);

            if t == 0 {
                let on_t0 = ctx.unit_on_t0(g);
                let max = -ctx.power_t0(g) + shutdown * on_t0 + pmax * (1.0 - on_t0);
                constraints.push(Constraint::at_most(max, terms.build()));
            } else {
                terms
                    .add(vars.power_generated(g, t - 1), 1.0)
                    .add(vars.unit_on(g, t - 1), pmax - shutdown);
                constraints.push(Constraint::at_most(pmax, terms.build()));
            }
        }
    }
}

/// Hold units on through their initial periods and through every
/// minimum-up-time window after a start
fn add_min_up_time_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    let periods = case.horizon.periods;
    for (g, generator) in case.generators.iter().enumerate() {
        let up_time = generator.min_up_time;
        if up_time == 0 {
            continue;
        }

        // Initial condition: units that came in on and still owe up-time
        let initial = ctx.initial_periods_online(g);
        if initial > 0 {
            let mut terms = Terms::default();
            for t in 0..initial {
                terms.add(vars.unit_on(g, t), 1.0);
            }
            constraints.push(Constraint::equality(initial as f64, terms.build()));
        }

        for t in initial..periods {
            let mut terms = Terms::default();

            if t + up_time <= periods {
                // A start at t forces the unit on for the whole window
                for n in t..t + up_time {
                    terms.add(vars.unit_on(g, n), 1.0);
                }
                terms.add(vars.unit_on(g, t), -(up_time as f64));
                let min = if t == 0 {
                    -(up_time as f64) * ctx.unit_on_t0(g)
                } else {
                    terms.add(vars.unit_on(g, t - 1), up_time as f64);
                    0.0
                };
                constraints.push(Constraint::at_least(min, terms.build()));
            } else {
                // Tail: a start in the final window holds the unit on to the
                // end of the horizon
                let window = (periods - t) as f64;
                for n in t..periods {
                    terms.add(vars.unit_on(g, n), 1.0);
                }
                terms.add(vars.unit_on(g, t), -window);
                let min = if t == 0 {
                    -window * ctx.unit_on_t0(g)
                } else {
                    terms.add(vars.unit_on(g, t - 1), window);
                    0.0
                };
                constraints.push(Constraint::at_least(min, terms.build()));
            }
        }
    }
}

/// Hold units off through their initial periods and through every
/// minimum-down-time window after a stop
fn add_min_down_time_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    let periods = case.horizon.periods;
    for (g, generator) in case.generators.iter().enumerate() {
        let down_time = generator.min_down_time;
        if down_time == 0 {
            continue;
        }

        let initial = ctx.initial_periods_offline(g);
        if initial > 0 {
            let mut terms = Terms::default();
            for t in 0..initial {
                terms.add(vars.unit_on(g, t), 1.0);
            }
            constraints.push(Constraint::equality(0.0, terms.build()));
        }

        for t in initial..periods {
            let mut terms = Terms::default();

            if t + down_time <= periods {
                for n in t..t + down_time {
                    terms.add(vars.unit_on(g, n), -1.0);
                }
                terms.add(vars.unit_on(g, t), down_time as f64);
                let min = if t == 0 {
                    down_time as f64 * (ctx.unit_on_t0(g) - 1.0)
                } else {
                    terms.add(vars.unit_on(g, t - 1), -(down_time as f64));
                    -(down_time as f64)
                };
                constraints.push(Constraint::at_least(min, terms.build()));
            } else {
                let window = (periods - t) as f64;
                for n in t..periods {
                    terms.add(vars.unit_on(g, n), -1.0);
                }
                terms.add(vars.unit_on(g, t), window);
                let min = if t == 0 {
                    window * (ctx.unit_on_t0(g) - 1.0)
                } else {
                    terms.add(vars.unit_on(g, t - 1), -window);
                    -window
                };
                constraints.push(Constraint::at_least(min, terms.build()));
            }
        }
    }
}

/// A start can only be hot if the unit was on within the cold-start window.
///
/// Starts whose window reaches back into a pre-horizon off-period shorter
/// than the cold-start threshold have their indicator fixed at 1 instead
/// (see [`BuildContext::hot_start_fixed`]).
fn add_hot_start_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for (g, generator) in case.generators.iter().enumerate() {
        let cold_hours = generator.cold_start_hours;
        for t in case.horizon.iter() {
            if ctx.hot_start_fixed(g, t) {
                continue;
            }

            let window = if t < cold_hours { 0..t } else { t - cold_hours..t };
            let mut terms = Terms::default();
            terms.add(vars.hot_start(g, t), 1.0);
            for i in window {
                terms.add(vars.unit_on(g, i), -1.0);
            }
            constraints.push(Constraint::at_most(0.0, terms.build()));
        }
    }
}

/// Charge at least the hot/cold startup cost whenever a unit starts.
///
/// The row is a linear relaxation that binds only when a startup occurs
/// (`on[t] - on[t-1] = 1`); otherwise the non-negative cost variable is free
/// to fall to zero under minimisation.
fn add_startup_cost_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for (g, generator) in case.generators.iter().enumerate() {
        let cold = generator.cold_start_cost;
        let hot = generator.hot_start_cost;

        for t in case.horizon.iter() {
            let mut terms = Terms::default();
            terms
                .add(vars.startup_cost(g, t), 1.0)
                .add(vars.hot_start(g, t), cold - hot)
                .add(vars.unit_on(g, t), -cold);

            let min = if t == 0 {
                -cold * ctx.unit_on_t0(g)
            } else {
                terms.add(vars.unit_on(g, t - 1), cold);
                0.0
            };
            constraints.push(Constraint::at_least(min, terms.build()));
        }
    }
}

/// Charge the shutdown cost coefficient whenever a unit stops
fn add_shutdown_cost_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for (g, generator) in case.generators.iter().enumerate() {
        let cost = generator.shutdown_cost;
        for t in case.horizon.iter() {
            let mut terms = Terms::default();
            terms
                .add(vars.shutdown_cost(g, t), 1.0)
                .add(vars.unit_on(g, t), cost);

            let min = if t == 0 {
                cost * ctx.unit_on_t0(g)
            } else {
                terms.add(vars.unit_on(g, t - 1), -cost);
                0.0
            };
            constraints.push(Constraint::at_least(min, terms.build()));
        }
    }
}

/// Lower-bound the production-cost variable by every linear cut of the
/// generator's cost curve
fn add_production_cost_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    let dt = case.horizon.period_length;
    for (g, linearised) in ctx.cost_curves.iter().enumerate() {
        for t in case.horizon.iter() {
            for cut in &linearised.cuts {
                constraints.push(Constraint::at_least(
                    dt * (cut.value - cut.slope * cut.power),
                    vec![
                        (vars.production_cost(g, t), 1.0),
                        (vars.power_generated(g, t), -dt * cut.slope),
                    ],
                ));
            }
        }
    }
}

/// Storage semicontinuous power limits, ramp limits and state-of-charge
/// conservation
fn add_storage_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    for (s, unit) in case.storage.iter().enumerate() {
        for t in case.horizon.iter() {
            // Semicontinuous limits against the binary indicators
            constraints.push(Constraint::at_least(
                0.0,
                vec![
                    (vars.storage_input(s, t), 1.0),
                    (vars.storage_input_on(s, t), -unit.min_input),
                ],
            ));
            constraints.push(Constraint::at_most(
                0.0,
                vec![
                    (vars.storage_input(s, t), 1.0),
                    (vars.storage_input_on(s, t), -unit.max_input),
                ],
            ));
            constraints.push(Constraint::at_least(
                0.0,
                vec![
                    (vars.storage_output(s, t), 1.0),
                    (vars.storage_output_on(s, t), -unit.min_output),
                ],
            ));
            constraints.push(Constraint::at_most(
                0.0,
                vec![
                    (vars.storage_output(s, t), 1.0),
                    (vars.storage_output_on(s, t), -unit.max_output),
                ],
            ));

            // Ramp limits on both charge and discharge power
            if t == 0 {
                constraints.push(Constraint::at_most(
                    unit.initial_output + unit.output_ramp_up,
                    vec![(vars.storage_output(s, t), 1.0)],
                ));
                constraints.push(Constraint::at_least(
                    unit.initial_output - unit.output_ramp_down,
                    vec![(vars.storage_output(s, t), 1.0)],
                ));
                constraints.push(Constraint::at_most(
                    unit.initial_input + unit.input_ramp_up,
                    vec![(vars.storage_input(s, t), 1.0)],
                ));
                constraints.push(Constraint::at_least(
                    unit.initial_input - unit.input_ramp_down,
                    vec![(vars.storage_input(s, t), 1.0)],
                ));
            } else {
                constraints.push(Constraint::at_most(
                    unit.output_ramp_up,
                    vec![
                        (vars.storage_output(s, t), 1.0),
                        (vars.storage_output(s, t - 1), -1.0),
                    ],
                ));
                constraints.push(Constraint::at_least(
                    -unit.output_ramp_down,
                    vec![
                        (vars.storage_output(s, t), 1.0),
                        (vars.storage_output(s, t - 1), -1.0),
                    ],
                ));
                constraints.push(Constraint::at_most(
                    unit.input_ramp_up,
                    vec![
                        (vars.storage_input(s, t), 1.0),
                        (vars.storage_input(s, t - 1), -1.0),
                    ],
                ));
                constraints.push(Constraint::at_least(
                    -unit.input_ramp_down,
                    vec![
                        (vars.storage_input(s, t), 1.0),
                        (vars.storage_input(s, t - 1), -1.0),
                    ],
                ));
            }

            // Energy conservation with charge efficiency
            let mut terms = Terms::default();
            terms
                .add(vars.storage_soc(s, t), 1.0)
                .add(vars.storage_output(s, t), 1.0 / unit.max_energy)
                .add(vars.storage_input(s, t), -unit.efficiency / unit.max_energy);
            let value = if t == 0 {
                unit.initial_soc
            } else {
                terms.add(vars.storage_soc(s, t - 1), -1.0);
                0.0
            };
            constraints.push(Constraint::equality(value, terms.build()));
        }
    }
}
