//! The objective assembler: per-stage cost variables and their defining rows.
//!
//! Costs are split into a commitment stage (startup/shutdown costs plus the
//! minimum production cost of every committed period) and a generation stage
//! (incremental production costs plus the mismatch penalty). The split keeps
//! the formulation ready for stochastic/rolling-horizon decomposition; the
//! default assignment gives the first stage all commitment periods and the
//! second stage all generation periods. The objective itself is simply the
//! sum of the per-stage totals, carried as coefficients on the stage-cost
//! columns.
use super::BuildContext;
use super::constraints::Terms;
use super::variables::VariableMap;
use crate::solver::Constraint;
use std::ops::Range;

/// Number of cost stages
pub const NUM_STAGES: usize = 2;

/// The periods whose commitment costs are charged to `stage`
fn commitment_periods(stage: usize, periods: usize) -> Range<usize> {
    if stage == 0 { 0..periods } else { 0..0 }
}

/// The periods whose generation costs are charged to `stage`
fn generation_periods(stage: usize, periods: usize) -> Range<usize> {
    if stage == 1 { 0..periods } else { 0..0 }
}

/// Add the rows defining the commitment, generation and total cost of each
/// stage
pub fn add_stage_cost_constraints(
    constraints: &mut Vec<Constraint>,
    vars: &VariableMap,
    ctx: &BuildContext,
) {
    let case = ctx.case;
    let dt = case.horizon.period_length;
    let penalty = ctx.config.penalty;

    for stage in 0..NUM_STAGES {
        // Commitment stage cost: startup + shutdown costs plus the minimum
        // production cost of every committed period
        let mut terms = Terms::default();
        terms.add(vars.commitment_stage_cost(stage), 1.0);
        for t in commitment_periods(stage, case.horizon.periods) {
            for g in 0..case.generators.len() {
                terms
                    .add(vars.startup_cost(g, t), -1.0)
                    .add(vars.shutdown_cost(g, t), -1.0)
                    .add(vars.unit_on(g, t), -ctx.cost_curves[g].minimum_cost * dt);
            }
        }
        constraints.push(Constraint::equality(0.0, terms.build()));

        // Generation stage cost: incremental production costs plus the
        // penalty on bus-level and system-level mismatch magnitudes
        let mut terms = Terms::default();
        terms.add(vars.generation_stage_cost(stage), 1.0);
        for t in generation_periods(stage, case.horizon.periods) {
            for g in 0..case.generators.len() {
                terms.add(vars.production_cost(g, t), -1.0);
            }
            for b in 0..case.buses.len() {
                terms
                    .add(vars.pos_load_mismatch(b, t), -penalty)
                    .add(vars.neg_load_mismatch(b, t), -penalty);
            }
            terms
                .add(vars.pos_global_mismatch(t), -penalty)
                .add(vars.neg_global_mismatch(t), -penalty);
        }
        constraints.push(Constraint::equality(0.0, terms.build()));

        // Stage total
        constraints.push(Constraint::equality(
            0.0,
            vec![
                (vars.stage_cost(stage), 1.0),
                (vars.commitment_stage_cost(stage), -1.0),
                (vars.generation_stage_cost(stage), -1.0),
            ],
        ));
    }
}
