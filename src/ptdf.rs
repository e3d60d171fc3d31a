//! Power Transfer Distribution Factors.
//!
//! The PTDF matrix maps bus injections to branch flows under the DC
//! approximation, letting the network constraints be written without angle
//! variables. Row `l`, column `b` is the MW flow induced on branch `l` by a
//! 1 MW injection at bus `b` (withdrawn at the swing bus, whose column is
//! identically zero).
use crate::case::Case;
use crate::error::TopologyError;
use crate::topology::Topology;
use nalgebra::DMatrix;

/// The PTDF matrix for a case, branches × buses
#[derive(Debug, Clone, PartialEq)]
pub struct PtdfMatrix {
    factors: DMatrix<f64>,
}

impl PtdfMatrix {
    /// Compute the PTDF matrix for the case's network.
    ///
    /// `precision` rounds each entry to that many decimal places;
    /// `tolerance` zeroes entries with smaller magnitude. Both default to
    /// keeping the raw factors.
    pub fn calculate(
        case: &Case,
        topology: &Topology,
        precision: Option<u32>,
        tolerance: Option<f64>,
    ) -> Result<PtdfMatrix, TopologyError> {
        let num_buses = case.buses.len();
        let num_branches = case.branches.len();
        let swing = topology.swing_bus;

        // Branch susceptance matrix Bf and nodal susceptance matrix Bbus
        let mut bf = DMatrix::zeros(num_branches, num_buses);
        let mut bbus = DMatrix::zeros(num_buses, num_buses);
        for (l, branch) in case.branches.iter().enumerate() {
            if !branch.in_service {
                continue;
            }
            let from = topology.bus_index[&branch.from_bus];
            let to = topology.bus_index[&branch.to_bus];
            let susceptance = case.base_mva / branch.reactance;

            bf[(l, from)] = susceptance;
            bf[(l, to)] = -susceptance;
            bbus[(from, from)] += susceptance;
            bbus[(to, to)] += susceptance;
            bbus[(from, to)] -= susceptance;
            bbus[(to, from)] -= susceptance;
        }

        // Reduce out the swing bus row/column and solve
        // Bbus_r^T * X = Bf_r^T (Bbus is symmetric)
        let keep: Vec<usize> = (0..num_buses).filter(|&b| b != swing).collect();
        let bbus_reduced = bbus.select_columns(&keep).select_rows(&keep);
        let bf_reduced = bf.select_columns(&keep);

        let solved = bbus_reduced
            .lu()
            .solve(&bf_reduced.transpose())
            .ok_or(TopologyError::SingularNetwork)?;

        let mut factors = DMatrix::zeros(num_branches, num_buses);
        for (k, &b) in keep.iter().enumerate() {
            for l in 0..num_branches {
                factors[(l, b)] = solved[(k, l)];
            }
        }

        if let Some(precision) = precision {
            let scale = 10f64.powi(precision as i32);
            factors.apply(|x| *x = (*x * scale).round() / scale);
        }
        if let Some(tolerance) = tolerance {
            factors.apply(|x| {
                if x.abs() < tolerance {
                    *x = 0.0;
                }
            });
        }

        Ok(PtdfMatrix { factors })
    }

    /// The flow factor of bus `b` on branch `l`
    pub fn factor(&self, l: usize, b: usize) -> f64 {
        self.factors[(l, b)]
    }

    /// Iterate over the nonzero factors of branch `l` as (bus, factor)
    pub fn row(&self, l: usize) -> impl Iterator<Item = (usize, f64)> {
        self.factors
            .row(l)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, f)| f != 0.0)
            .collect::<Vec<_>>()
            .into_iter()
    }
}
