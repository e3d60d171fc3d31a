//! Writing solved results to CSV tables.
use crate::results::UcResults;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

const SCHEDULE_FILE_NAME: &str = "schedule.csv";
const BUSES_FILE_NAME: &str = "bus_results.csv";
const FLOWS_FILE_NAME: &str = "line_flows.csv";

/// One row of `schedule.csv`
#[derive(Serialize)]
struct ScheduleRow<'a> {
    generator: &'a str,
    period: usize,
    committed: u8,
    dispatch_mw: f64,
    production_cost: f64,
    startup_cost: f64,
    shutdown_cost: f64,
    reserve_up_mw: f64,
}

/// One row of `bus_results.csv`
#[derive(Serialize)]
struct BusRow<'a> {
    bus: &'a str,
    period: usize,
    angle_rad: Option<f64>,
    lmp: Option<f64>,
    mismatch_mw: f64,
}

/// One row of `line_flows.csv`
#[derive(Serialize)]
struct FlowRow<'a> {
    branch: &'a str,
    period: usize,
    flow_mw: f64,
}

/// Write the generator schedule, bus results and line flows to CSV files in
/// the given directory, creating it if needed.
pub fn write_results<P: AsRef<Path>>(results: &UcResults, output_dir: P) -> Result<()> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Could not create {}", output_dir.display()))?;

    let mut writer = csv::Writer::from_path(output_dir.join(SCHEDULE_FILE_NAME))?;
    for (id, schedule) in &results.generators {
        for (t, &committed) in schedule.commitment.iter().enumerate() {
            writer.serialize(ScheduleRow {
                generator: &id.0,
                period: t,
                committed: committed.into(),
                dispatch_mw: schedule.dispatch[t],
                production_cost: schedule.production_cost[t],
                startup_cost: schedule.startup_cost[t],
                shutdown_cost: schedule.shutdown_cost[t],
                reserve_up_mw: schedule.reserve_up[t],
            })?;
        }
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(output_dir.join(BUSES_FILE_NAME))?;
    for (id, bus) in &results.buses {
        for (t, &mismatch) in bus.mismatch.iter().enumerate() {
            writer.serialize(BusRow {
                bus: &id.0,
                period: t,
                angle_rad: bus.angle.as_ref().map(|series| series[t]),
                lmp: bus.lmp.as_ref().map(|series| series[t]),
                mismatch_mw: mismatch,
            })?;
        }
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(output_dir.join(FLOWS_FILE_NAME))?;
    for (id, branch) in &results.branches {
        for (t, &flow) in branch.flow.iter().enumerate() {
            writer.serialize(FlowRow {
                branch: &id.0,
                period: t,
                flow_mw: flow,
            })?;
        }
    }
    writer.flush()?;

    Ok(())
}
