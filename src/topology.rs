//! Derivation of network adjacency from the case tables.
//!
//! Everything downstream of the case works with dense indices rather than
//! IDs; this module fixes the index spaces and the incidence lists in one
//! place.
use crate::case::Case;
use crate::error::TopologyError;
use crate::id::{BranchId, BusId};
use indexmap::IndexMap;

/// Tolerance on the sum of a generator's bus contribution factors
const CONTRIBUTION_SUM_TOLERANCE: f64 = 1e-6;

/// Network adjacency derived from a case
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    /// Bus ID to dense bus index
    pub bus_index: IndexMap<BusId, usize>,
    /// Branch ID to dense branch index
    pub branch_index: IndexMap<BranchId, usize>,
    /// Index of the swing (angle reference) bus
    pub swing_bus: usize,
    /// Per bus: indices of branches leaving it
    pub lines_from: Vec<Vec<usize>>,
    /// Per bus: indices of branches entering it
    pub lines_to: Vec<Vec<usize>>,
    /// Per bus: indices of generators whose contribution touches it
    pub generators_at_bus: Vec<Vec<usize>>,
    /// Per bus: indices of storage units connected to it
    pub storage_at_bus: Vec<Vec<usize>>,
    /// Per bus: indices of non-dispatchable units connected to it
    pub nondispatchables_at_bus: Vec<Vec<usize>>,
    /// Per generator: (bus index, contribution factor); factors sum to 1
    pub contributions: Vec<Vec<(usize, f64)>>,
}

impl Topology {
    /// Derive the topology, failing on any generator/bus inconsistency
    pub fn build(case: &Case) -> Result<Topology, TopologyError> {
        let bus_index: IndexMap<BusId, usize> = case
            .buses
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.clone(), i))
            .collect();
        let num_buses = bus_index.len();

        // The case validator guarantees exactly one swing bus
        let swing_bus = case
            .buses
            .iter()
            .position(|b| b.kind == crate::bus::BusType::Swing)
            .expect("no swing bus in validated case");

        let branch_index: IndexMap<BranchId, usize> = case
            .branches
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.clone(), i))
            .collect();

        let mut lines_from = vec![Vec::new(); num_buses];
        let mut lines_to = vec![Vec::new(); num_buses];
        for (l, branch) in case.branches.iter().enumerate() {
            let from = *bus_index.get(&branch.from_bus).ok_or_else(|| {
                TopologyError::UnknownBranchBus {
                    bus: branch.from_bus.to_string(),
                }
            })?;
            let to = *bus_index
                .get(&branch.to_bus)
                .ok_or_else(|| TopologyError::UnknownBranchBus {
                    bus: branch.to_bus.to_string(),
                })?;
            lines_from[from].push(l);
            lines_to[to].push(l);
        }

        let mut generators_at_bus = vec![Vec::new(); num_buses];
        let mut contributions = Vec::with_capacity(case.generators.len());
        for (g, generator) in case.generators.iter().enumerate() {
            let factors = match case.bus_contributions.get(&generator.id) {
                Some(split) => {
                    let mut factors = Vec::with_capacity(split.len());
                    for (bus, factor) in split {
                        let b = *bus_index.get(bus).ok_or_else(|| {
                            TopologyError::UnknownGeneratorBus {
                                generator: generator.id.to_string(),
                                bus: bus.to_string(),
                            }
                        })?;
                        factors.push((b, *factor));
                    }
                    factors
                }
                None => {
                    let b = *bus_index.get(&generator.bus).ok_or_else(|| {
                        TopologyError::UnknownGeneratorBus {
                            generator: generator.id.to_string(),
                            bus: generator.bus.to_string(),
                        }
                    })?;
                    vec![(b, 1.0)]
                }
            };

            let total: f64 = factors.iter().map(|(_, f)| f).sum();
            if (total - 1.0).abs() > CONTRIBUTION_SUM_TOLERANCE {
                return Err(TopologyError::ContributionFactorSum {
                    generator: generator.id.to_string(),
                    total,
                });
            }

            for &(b, _) in &factors {
                generators_at_bus[b].push(g);
            }
            contributions.push(factors);
        }

        let mut storage_at_bus = vec![Vec::new(); num_buses];
        for (s, unit) in case.storage.iter().enumerate() {
            let b = *bus_index
                .get(&unit.bus)
                .ok_or_else(|| TopologyError::UnknownUnitBus {
                    unit: unit.id.to_string(),
                    bus: unit.bus.to_string(),
                })?;
            storage_at_bus[b].push(s);
        }

        let mut nondispatchables_at_bus = vec![Vec::new(); num_buses];
        for (n, nd) in case.nondispatchables.iter().enumerate() {
            let b = *bus_index.get(&nd.bus).ok_or_else(|| {
                TopologyError::UnknownGeneratorBus {
                    generator: nd.id.to_string(),
                    bus: nd.bus.to_string(),
                }
            })?;
            nondispatchables_at_bus[b].push(n);
        }

        Ok(Topology {
            bus_index,
            branch_index,
            swing_bus,
            lines_from,
            lines_to,
            generators_at_bus,
            storage_at_bus,
            nondispatchables_at_bus,
            contributions,
        })
    }

    /// The contribution factor of generator `g` at bus `b` (0 if none)
    pub fn contribution(&self, g: usize, b: usize) -> f64 {
        self.contributions[g]
            .iter()
            .find(|&&(bus, _)| bus == b)
            .map_or(0.0, |&(_, factor)| factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::two_bus_case;
    use rstest::rstest;

    #[rstest]
    fn test_build(two_bus_case: Case) {
        let topology = Topology::build(&two_bus_case).unwrap();

        assert_eq!(topology.swing_bus, 0);
        assert_eq!(topology.lines_from[0], vec![0]);
        assert_eq!(topology.lines_to[1], vec![0]);
        assert!(topology.lines_to[0].is_empty());
        // One generator at each bus, contributing fully
        assert_eq!(topology.generators_at_bus[0], vec![0]);
        assert_eq!(topology.generators_at_bus[1], vec![1]);
        assert_eq!(topology.contribution(0, 0), 1.0);
        assert_eq!(topology.contribution(0, 1), 0.0);
    }

    #[rstest]
    fn test_unknown_generator_bus(mut two_bus_case: Case) {
        two_bus_case.generators[0].bus = "nowhere".into();
        assert!(matches!(
            Topology::build(&two_bus_case),
            Err(TopologyError::UnknownGeneratorBus { .. })
        ));
    }

    #[rstest]
    fn test_unknown_branch_bus(mut two_bus_case: Case) {
        two_bus_case.branches[0].to_bus = "nowhere".into();
        assert!(matches!(
            Topology::build(&two_bus_case),
            Err(TopologyError::UnknownBranchBus { .. })
        ));
    }

    #[rstest]
    fn test_contribution_sum_check(mut two_bus_case: Case) {
        let id = two_bus_case.generators[0].id.clone();
        let buses = (
            two_bus_case.buses[0].id.clone(),
            two_bus_case.buses[1].id.clone(),
        );
        two_bus_case
            .bus_contributions
            .insert(id.clone(), vec![(buses.0.clone(), 0.6), (buses.1.clone(), 0.5)]);
        assert!(matches!(
            Topology::build(&two_bus_case),
            Err(TopologyError::ContributionFactorSum { .. })
        ));

        // A valid split lands the generator on both buses
        two_bus_case
            .bus_contributions
            .insert(id, vec![(buses.0, 0.6), (buses.1, 0.4)]);
        let topology = Topology::build(&two_bus_case).unwrap();
        assert_eq!(topology.generators_at_bus[0], vec![0]);
        assert!(topology.generators_at_bus[1].contains(&0));
    }
}
