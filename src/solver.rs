//! The solver adapter: materialises a model snapshot into a HiGHS problem,
//! runs it and maps the outcome back.
//!
//! The snapshot itself is solver-agnostic — plain variable definitions and
//! constraints — so a model can be solved repeatedly with different options
//! without being rebuilt or mutated. Duals are only defined for linear
//! programs, so when the model contains integer variables the adapter runs a
//! second, continuous solve with every integer column fixed at its incumbent
//! value ("pricing run") to recover them.
use crate::config::SolverOptions;
use crate::error::SolveError;
use crate::model::UcModel;
use highs::{HighsModelStatus, RowProblem, Sense};
use log::{debug, warn};
use strum::Display;

/// The definition of a variable to be optimised.
///
/// The coefficient is the variable's multiplying factor in the objective
/// function to minimise, i.e. the Cs in:
///
/// f = c1*x1 + c2*x2 + ...
///
/// with x1, x2... taking values between min and max.
#[derive(PartialEq, Clone, Debug)]
pub struct VariableDefinition {
    /// The variable's minimum value
    pub min: f64,
    /// The variable's maximum value
    pub max: f64,
    /// The coefficient of the variable in the objective
    pub coefficient: f64,
    /// Whether the variable must take an integer value
    pub integer: bool,
}

impl VariableDefinition {
    /// A continuous variable with the given bounds and no objective cost
    pub fn continuous(min: f64, max: f64) -> Self {
        VariableDefinition {
            min,
            max,
            coefficient: 0.0,
            integer: false,
        }
    }

    /// A binary variable with no objective cost
    pub fn binary() -> Self {
        VariableDefinition {
            min: 0.0,
            max: 1.0,
            coefficient: 0.0,
            integer: true,
        }
    }

    /// A variable fixed at the given value
    pub fn fixed(value: f64) -> Self {
        VariableDefinition {
            min: value,
            max: value,
            coefficient: 0.0,
            integer: false,
        }
    }
}

/// A constraint for an optimisation.
///
/// Each constraint adds an inequality equation to the problem to solve of the
/// form:
///
/// min <= a1*x1 + a2*x2 + ... <= max
///
/// Often, constraints will impose only a min or a max value, with the other
/// set to infinity or minus infinity.
#[derive(PartialEq, Clone, Debug)]
pub struct Constraint {
    /// The minimum value for the constraint
    pub min: f64,
    /// The maximum value for the constraint
    pub max: f64,
    /// Sparse (column index, coefficient) terms
    pub terms: Vec<(usize, f64)>,
}

impl Constraint {
    /// A constraint `expr >= min`
    pub fn at_least(min: f64, terms: Vec<(usize, f64)>) -> Self {
        Constraint {
            min,
            max: f64::INFINITY,
            terms,
        }
    }

    /// A constraint `expr <= max`
    pub fn at_most(max: f64, terms: Vec<(usize, f64)>) -> Self {
        Constraint {
            min: f64::NEG_INFINITY,
            max,
            terms,
        }
    }

    /// A constraint `expr == value`
    pub fn equality(value: f64, terms: Vec<(usize, f64)>) -> Self {
        Constraint {
            min: value,
            max: value,
            terms,
        }
    }
}

/// How the solver terminated for a returned solution
#[derive(PartialEq, Eq, Clone, Copy, Debug, Display)]
pub enum SolutionStatus {
    /// Proven optimal within the configured gap
    Optimal,
    /// A feasible incumbent accepted at the time limit
    Feasible,
}

/// The primal (and optionally dual) values of a solved model
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// How the solver terminated
    pub status: SolutionStatus,
    /// The objective value of the returned solution
    pub objective: f64,
    values: Vec<f64>,
    dual_rows: Option<Vec<f64>>,
}

impl Solution {
    /// The value of the variable in the given column
    pub fn value(&self, column: usize) -> f64 {
        self.values[column]
    }

    /// All column values, in declaration order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The dual value of the given row, if duals were computed
    pub fn dual(&self, row: usize) -> Option<f64> {
        self.dual_rows.as_ref().map(|duals| duals[row])
    }

    /// All dual row values, if computed
    pub fn dual_rows(&self) -> Option<&[f64]> {
        self.dual_rows.as_deref()
    }
}

/// Solve the model with HiGHS.
///
/// On success the solution carries every column value and, when
/// `options.compute_duals` is set, the row duals from the pricing run. The
/// model itself is read-only throughout and can be solved again with
/// different options afterwards.
pub fn solve(model: &UcModel, options: &SolverOptions) -> Result<Solution, SolveError> {
    let solved = run_highs(model, options, None);

    let status = match solved.status() {
        HighsModelStatus::Optimal => SolutionStatus::Optimal,
        HighsModelStatus::Infeasible => {
            return Err(SolveError::Infeasible(
                "solver terminated with status Infeasible".to_string(),
            ));
        }
        HighsModelStatus::ReachedTimeLimit => {
            // HiGHS hands back the incumbent when the MIP search found one
            if solved.get_solution().columns().len() == model.variables().len() {
                SolutionStatus::Feasible
            } else {
                return Err(SolveError::Timeout);
            }
        }
        status => return Err(SolveError::Solver(format!("{status:?}"))),
    };

    let values = solved.get_solution().columns().to_vec();
    let objective = objective_value(model, &values);

    let dual_rows = if options.compute_duals {
        pricing_run(model, options, &values)
    } else {
        None
    };

    Ok(Solution {
        status,
        objective,
        values,
        dual_rows,
    })
}

/// Re-solve as a pure LP with integer columns fixed at their incumbent
/// values, returning the row duals.
fn pricing_run(model: &UcModel, options: &SolverOptions, incumbent: &[f64]) -> Option<Vec<f64>> {
    debug!("running pricing LP for dual values");
    let solved = run_highs(model, options, Some(incumbent));
    if solved.status() != HighsModelStatus::Optimal {
        warn!(
            "pricing run terminated with status {:?}; no dual values available",
            solved.status()
        );
        return None;
    }

    Some(solved.get_solution().dual_rows().to_vec())
}

/// Materialise and run a HiGHS problem.
///
/// With `fix_integers` set, every integer column's bounds are pinned to its
/// (rounded) value in the given incumbent and the problem is solved as an LP.
fn run_highs(
    model: &UcModel,
    options: &SolverOptions,
    fix_integers: Option<&[f64]>,
) -> highs::SolvedModel {
    let mut problem = RowProblem::default();

    let mut columns = Vec::with_capacity(model.variables().len());
    for (i, def) in model.variables().iter().enumerate() {
        let column = match fix_integers {
            Some(incumbent) if def.integer => {
                let value = incumbent[i].round();
                problem.add_column(def.coefficient, value..=value)
            }
            None if def.integer => problem.add_integer_column(def.coefficient, def.min..=def.max),
            _ => problem.add_column(def.coefficient, def.min..=def.max),
        };
        columns.push(column);
    }

    for constraint in model.constraints() {
        problem.add_row(
            constraint.min..=constraint.max,
            constraint.terms.iter().map(|&(i, c)| (columns[i], c)),
        );
    }

    let mut highs_model = problem.optimise(Sense::Minimise);
    highs_model.set_option("output_flag", false);
    highs_model.set_option("mip_rel_gap", options.mip_gap);
    if let Some(time_limit) = options.time_limit {
        highs_model.set_option("time_limit", time_limit);
    }

    highs_model.solve()
}

/// The objective value of a column-value vector under the model's costs
fn objective_value(model: &UcModel, values: &[f64]) -> f64 {
    model
        .variables()
        .iter()
        .zip(values)
        .map(|(def, value)| def.coefficient * value)
        .sum()
}
