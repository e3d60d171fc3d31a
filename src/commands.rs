//! The commands that can be executed by the CLI.
use crate::config::{BuildConfig, SolverOptions};
use crate::input::read_case;
use crate::model::build_model;
use crate::output::write_results;
use crate::results::UcResults;
use crate::solver::solve;
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Handle the `run` command: read a case directory, build and solve the
/// model, and write the results.
pub fn handle_run_command(
    case_dir: &Path,
    output_dir: &Path,
    time_limit: Option<f64>,
    mip_gap: Option<f64>,
) -> Result<()> {
    let config = BuildConfig::load_from_dir(case_dir)?;
    let case = read_case(case_dir)
        .with_context(|| format!("Could not read case from {}", case_dir.display()))?;

    let model = build_model(&case, &config)?;
    info!(
        "model built: {} variables, {} constraints",
        model.num_variables(),
        model.num_constraints()
    );

    let mut options = SolverOptions {
        time_limit,
        ..SolverOptions::default()
    };
    if let Some(mip_gap) = mip_gap {
        options.mip_gap = mip_gap;
    }

    let solution = solve(&model, &options)?;
    info!(
        "solve finished: {} with objective {:.2}",
        solution.status, solution.objective
    );

    let results = UcResults::extract(&model, &solution);
    write_results(&results, output_dir)
        .with_context(|| format!("Could not write results to {}", output_dir.display()))?;

    Ok(())
}
