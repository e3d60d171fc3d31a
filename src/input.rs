//! Reading a case from a directory of CSV tables.
//!
//! This is the crate's native tabular format, not a MATPOWER parser: each
//! entity gets one file of typed rows. Only the quadratic cost representation
//! is expressible in `generators.csv`; piecewise curves come in through the
//! API.
use crate::branch::Branch;
use crate::bus::Bus;
use crate::case::Case;
use crate::cost_curve::CostCurve;
use crate::generator::Generator;
use crate::horizon::Horizon;
use crate::id::{BusId, GeneratorId};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;

const BUSES_FILE_NAME: &str = "buses.csv";
const GENERATORS_FILE_NAME: &str = "generators.csv";
const BRANCHES_FILE_NAME: &str = "branches.csv";
const LOADS_FILE_NAME: &str = "loads.csv";
const HISTORY_FILE_NAME: &str = "commitment_history.csv";

/// Read a series of type Ts from a CSV file into a `Vec<T>`.
///
/// # Arguments
///
/// * `csv_file_path`: Path to the CSV file
pub fn read_vec_from_csv<T: DeserializeOwned>(csv_file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(csv_file_path)
        .with_context(|| format!("Error reading {}", csv_file_path.display()))?;

    let mut vec = Vec::new();
    for result in reader.deserialize() {
        let d: T =
            result.with_context(|| format!("Error reading {}", csv_file_path.display()))?;
        vec.push(d);
    }

    ensure!(
        !vec.is_empty(),
        "CSV file {} cannot be empty",
        csv_file_path.display()
    );

    Ok(vec)
}

/// One row of `generators.csv`
#[derive(Debug, Deserialize)]
struct GeneratorRow {
    id: GeneratorId,
    bus: BusId,
    pmin: f64,
    pmax: f64,
    ramp_up: f64,
    ramp_down: f64,
    startup_ramp: f64,
    shutdown_ramp: f64,
    min_up_time: usize,
    min_down_time: usize,
    #[serde(default)]
    startup_time: usize,
    #[serde(default)]
    shutdown_time: usize,
    #[serde(default)]
    initial_status: bool,
    #[serde(default)]
    initial_generation: f64,
    /// Quadratic cost coefficients
    #[serde(default)]
    a0: f64,
    #[serde(default)]
    a1: f64,
    #[serde(default)]
    a2: f64,
    #[serde(default)]
    hot_start_cost: f64,
    #[serde(default)]
    cold_start_cost: f64,
    #[serde(default)]
    shutdown_cost: f64,
    #[serde(default)]
    cold_start_hours: usize,
    #[serde(default)]
    forced_outage_rate: f64,
}

impl From<GeneratorRow> for Generator {
    fn from(row: GeneratorRow) -> Generator {
        Generator {
            id: row.id,
            bus: row.bus,
            pmin: row.pmin,
            pmax: row.pmax,
            ramp_up: row.ramp_up,
            ramp_down: row.ramp_down,
            startup_ramp: row.startup_ramp,
            shutdown_ramp: row.shutdown_ramp,
            min_up_time: row.min_up_time,
            min_down_time: row.min_down_time,
            startup_time: row.startup_time,
            shutdown_time: row.shutdown_time,
            initial_status: row.initial_status,
            initial_generation: row.initial_generation,
            cost_curve: CostCurve::Quadratic {
                a0: row.a0,
                a1: row.a1,
                a2: row.a2,
            },
            hot_start_cost: row.hot_start_cost,
            cold_start_cost: row.cold_start_cost,
            shutdown_cost: row.shutdown_cost,
            cold_start_hours: row.cold_start_hours,
            forced_outage_rate: row.forced_outage_rate,
        }
    }
}

/// One row of `loads.csv`
#[derive(Debug, Deserialize)]
struct LoadRow {
    period: usize,
    bus: BusId,
    demand: f64,
}

/// One row of `commitment_history.csv`
#[derive(Debug, Deserialize)]
struct HistoryRow {
    period: usize,
    generator: GeneratorId,
    status: u8,
}

/// Read the per-bus demand table, returning the series map and the number of
/// periods it covers
fn read_loads(file_path: &Path) -> Result<(IndexMap<BusId, Vec<f64>>, usize)> {
    let rows: Vec<LoadRow> = read_vec_from_csv(file_path)?;
    let periods = rows.iter().map(|r| r.period).max().unwrap() + 1;

    let mut demand: IndexMap<BusId, Vec<f64>> = IndexMap::new();
    for row in rows {
        let series = demand
            .entry(row.bus)
            .or_insert_with(|| vec![0.0; periods]);
        series[row.period] = row.demand;
    }

    Ok((demand, periods))
}

/// Read the optional prior-horizon commitment table
fn read_history(file_path: &Path) -> Result<IndexMap<GeneratorId, Vec<u8>>> {
    if !file_path.is_file() {
        return Ok(IndexMap::new());
    }

    let rows: Vec<HistoryRow> = read_vec_from_csv(file_path)?;
    let periods = rows.iter().map(|r| r.period).max().unwrap() + 1;

    let mut history: IndexMap<GeneratorId, Vec<u8>> = IndexMap::new();
    for row in rows {
        ensure!(
            row.status <= 1,
            "commitment history status must be 0 or 1, got {}",
            row.status
        );
        let series = history
            .entry(row.generator)
            .or_insert_with(|| vec![0; periods]);
        series[row.period] = row.status;
    }

    Ok(history)
}

/// Read a case from the CSV tables in the given directory.
///
/// Expects `buses.csv`, `generators.csv`, `branches.csv` and `loads.csv`;
/// `commitment_history.csv` is optional. The returned case is not yet
/// validated; [`crate::model::build_model`] runs the invariant checks.
pub fn read_case<P: AsRef<Path>>(case_dir: P) -> Result<Case> {
    let case_dir = case_dir.as_ref();

    let buses: Vec<Bus> = read_vec_from_csv(&case_dir.join(BUSES_FILE_NAME))?;
    let generators: Vec<Generator> =
        read_vec_from_csv::<GeneratorRow>(&case_dir.join(GENERATORS_FILE_NAME))?
            .into_iter()
            .map(Generator::from)
            .collect();
    let branches: Vec<Branch> = read_vec_from_csv(&case_dir.join(BRANCHES_FILE_NAME))?;
    let (demand, periods) = read_loads(&case_dir.join(LOADS_FILE_NAME))?;

    let mut case = Case::new(
        Horizon::hourly(periods),
        buses,
        generators,
        branches,
        demand,
    );
    case.commitment_history = read_history(&case_dir.join(HISTORY_FILE_NAME))?;

    Ok(case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = File::create(dir.join(name)).unwrap();
        write!(file, "{contents}").unwrap();
    }

    #[test]
    fn test_read_case() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            BUSES_FILE_NAME,
            "id,type\nbus1,swing\nbus2,pq\n",
        );
        write_file(
            dir.path(),
            GENERATORS_FILE_NAME,
            "id,bus,pmin,pmax,ramp_up,ramp_down,startup_ramp,shutdown_ramp,\
             min_up_time,min_down_time,a1\n\
             gen1,bus1,10,100,50,50,50,50,2,2,12.5\n",
        );
        write_file(
            dir.path(),
            BRANCHES_FILE_NAME,
            "id,from_bus,to_bus,reactance,rating\nline1,bus1,bus2,0.1,0\n",
        );
        write_file(
            dir.path(),
            LOADS_FILE_NAME,
            "period,bus,demand\n0,bus2,40\n1,bus2,60\n",
        );

        let case = read_case(dir.path()).unwrap();
        assert_eq!(case.horizon.periods, 2);
        assert_eq!(case.buses.len(), 2);
        assert_eq!(case.generators.len(), 1);
        assert_eq!(
            case.generators[0].cost_curve,
            CostCurve::Quadratic {
                a0: 0.0,
                a1: 12.5,
                a2: 0.0
            }
        );
        assert_eq!(case.demand_at(&"bus2".into(), 1), 60.0);
        // No demand row for bus1
        assert_eq!(case.demand_at(&"bus1".into(), 0), 0.0);
        assert!(case.validate().is_ok());
    }

    #[test]
    fn test_read_history() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            HISTORY_FILE_NAME,
            "period,generator,status\n0,gen1,1\n1,gen1,0\n",
        );

        let history = read_history(&dir.path().join(HISTORY_FILE_NAME)).unwrap();
        assert_eq!(history[&GeneratorId::new("gen1")], vec![1, 0]);

        // Absent file is not an error
        let missing = read_history(&dir.path().join("nope.csv")).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_read_vec_from_csv_empty_file() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), LOADS_FILE_NAME, "period,bus,demand\n");
        assert!(read_loads(&dir.path().join(LOADS_FILE_NAME)).is_err());
    }
}
