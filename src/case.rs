//! The in-memory case: the validated input to every model build.
use crate::branch::{Branch, Interface};
use crate::bus::{Bus, BusType};
use crate::config::InitialStatePolicy;
use crate::error::ValidationError;
use crate::generator::{Generator, NondispatchableGenerator};
use crate::horizon::Horizon;
use crate::id::{BusId, GeneratorId};
use crate::storage::StorageUnit;
use crate::zone::{Requirement, ReserveZone};
use indexmap::IndexMap;
use std::collections::HashSet;

/// A complete power-system case over a scheduling horizon.
///
/// The case is read once per build; builds never mutate it, so concurrent
/// builds against the same case are safe.
/// Default system MVA base
const DEFAULT_BASE_MVA: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// The scheduling horizon
    pub horizon: Horizon,
    /// System MVA base; converts per-unit reactances to MW flow
    /// sensitivities
    pub base_mva: f64,
    /// Network buses; exactly one must be of type [`BusType::Swing`]
    pub buses: Vec<Bus>,
    /// Dispatchable generators
    pub generators: Vec<Generator>,
    /// Transmission branches
    pub branches: Vec<Branch>,
    /// Storage units
    pub storage: Vec<StorageUnit>,
    /// Non-dispatchable (curtailable) generators
    pub nondispatchables: Vec<NondispatchableGenerator>,
    /// Reserve zones
    pub zones: Vec<ReserveZone>,
    /// Interface (flowgate) limits
    pub interfaces: Vec<Interface>,
    /// Real-power demand per bus per period (MW)
    pub demand: IndexMap<BusId, Vec<f64>>,
    /// System-wide up-reserve requirement; when `None`, the configured
    /// reserve factor applies
    pub system_reserve: Option<Requirement>,
    /// Commitment (0/1) over the periods preceding the horizon, per generator
    pub commitment_history: IndexMap<GeneratorId, Vec<u8>>,
    /// Commitment values pinned by the operator for specific periods
    pub fixed_commitment: IndexMap<(GeneratorId, usize), bool>,
    /// Optional multi-bus contribution factors per generator; each list must
    /// sum to 1 within tolerance (default: all output to the owning bus)
    pub bus_contributions: IndexMap<GeneratorId, Vec<(BusId, f64)>>,
}

impl Case {
    /// Create a case with no storage, zones, interfaces, history or overrides
    pub fn new(
        horizon: Horizon,
        buses: Vec<Bus>,
        generators: Vec<Generator>,
        branches: Vec<Branch>,
        demand: IndexMap<BusId, Vec<f64>>,
    ) -> Self {
        Case {
            horizon,
            base_mva: DEFAULT_BASE_MVA,
            buses,
            generators,
            branches,
            storage: Vec::new(),
            nondispatchables: Vec::new(),
            zones: Vec::new(),
            interfaces: Vec::new(),
            demand,
            system_reserve: None,
            commitment_history: IndexMap::new(),
            fixed_commitment: IndexMap::new(),
            bus_contributions: IndexMap::new(),
        }
    }

    /// Check every constructor-time invariant of the case.
    ///
    /// Run by [`crate::model::build_model`] before anything else touches the
    /// data.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let periods = self.horizon.periods;

        if self.base_mva <= 0.0 {
            return Err(ValidationError(format!(
                "base_mva must be positive (got {})",
                self.base_mva
            )));
        }

        let swing_count = self
            .buses
            .iter()
            .filter(|b| b.kind == BusType::Swing)
            .count();
        if swing_count != 1 {
            return Err(ValidationError(format!(
                "exactly one swing bus required, found {swing_count}"
            )));
        }

        let mut seen_buses = HashSet::new();
        for bus in &self.buses {
            if !seen_buses.insert(bus.id.clone()) {
                return Err(ValidationError(format!("duplicate bus id {}", bus.id)));
            }
        }

        for generator in &self.generators {
            generator.validate()?;
        }
        for branch in &self.branches {
            branch.validate()?;
        }
        for unit in &self.storage {
            unit.validate()?;
        }

        for (bus_id, series) in &self.demand {
            if series.len() != periods {
                return Err(ValidationError(format!(
                    "demand series for bus {bus_id} has {} entries, horizon has {periods}",
                    series.len()
                )));
            }
        }

        for nd in &self.nondispatchables {
            if nd.min_power.len() != periods || nd.max_power.len() != periods {
                return Err(ValidationError(format!(
                    "availability series for non-dispatchable {} does not cover the horizon",
                    nd.id
                )));
            }
        }

        if let Some(Requirement::Fixed(values)) = &self.system_reserve
            && values.len() != periods
        {
            return Err(ValidationError(format!(
                "fixed system reserve schedule has {} entries, horizon has {periods}",
                values.len()
            )));
        }

        let generator_ids: HashSet<&GeneratorId> =
            self.generators.iter().map(|g| &g.id).collect();
        for zone in &self.zones {
            for id in &zone.generators {
                if !generator_ids.contains(id) {
                    return Err(ValidationError(format!(
                        "reserve zone {} references unknown generator {id}",
                        zone.id
                    )));
                }
            }
            if let Requirement::Fixed(values) = &zone.requirement
                && values.len() != periods
            {
                return Err(ValidationError(format!(
                    "fixed reserve schedule for zone {} does not cover the horizon",
                    zone.id
                )));
            }
        }

        let branch_ids: HashSet<&crate::id::BranchId> =
            self.branches.iter().map(|b| &b.id).collect();
        for interface in &self.interfaces {
            for (id, _) in &interface.branches {
                if !branch_ids.contains(id) {
                    return Err(ValidationError(format!(
                        "interface {} references unknown branch {id}",
                        interface.id
                    )));
                }
            }
        }

        for ((id, t), _) in &self.fixed_commitment {
            if !generator_ids.contains(id) {
                return Err(ValidationError(format!(
                    "fixed commitment references unknown generator {id}"
                )));
            }
            if *t >= periods {
                return Err(ValidationError(format!(
                    "fixed commitment for generator {id} references period {t} outside horizon"
                )));
            }
        }

        Ok(())
    }

    /// Demand at a bus in period `t` (0 for buses with no demand entry)
    pub fn demand_at(&self, bus: &BusId, t: usize) -> f64 {
        self.demand.get(bus).map_or(0.0, |series| series[t])
    }

    /// Total system demand in period `t`
    pub fn total_demand(&self, t: usize) -> f64 {
        self.buses.iter().map(|b| self.demand_at(&b.id, t)).sum()
    }

    /// Derive the signed initial state (periods on if positive, periods off
    /// if negative) for every generator, in generator order.
    pub fn initial_states(&self, policy: InitialStatePolicy) -> Vec<i64> {
        self.generators
            .iter()
            .map(|g| {
                self.commitment_history
                    .get(&g.id)
                    .and_then(|series| initial_state_from_series(series))
                    .unwrap_or_else(|| match policy {
                        InitialStatePolicy::JustSwitched => {
                            if g.initial_status { 1 } else { -1 }
                        }
                        InitialStatePolicy::FullHistoryOff => -(self.horizon.periods as i64),
                    })
            })
            .collect()
    }
}

/// Signed periods-in-current-state from a prior commitment series.
///
/// Takes the first difference of the series; with no transitions the unit has
/// held its single observed state for the whole recorded history, otherwise
/// the state runs from the most recent transition to the end of the record.
/// Returns `None` for an empty series.
fn initial_state_from_series(series: &[u8]) -> Option<i64> {
    if series.is_empty() {
        return None;
    }

    let mut last_transition: Option<(usize, bool)> = None;
    for (i, pair) in series.windows(2).enumerate() {
        if pair[0] != pair[1] {
            last_transition = Some((i + 1, pair[1] > pair[0]));
        }
    }

    let state = match last_transition {
        Some((start, switched_on)) => {
            let run = (series.len() - start) as i64;
            if switched_on { run } else { -run }
        }
        None => {
            let run = series.len() as i64;
            if series[0] == 0 { -run } else { run }
        }
    };

    Some(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{small_case, two_bus_case};
    use rstest::rstest;

    #[test]
    fn test_initial_state_from_series() {
        // No history
        assert_eq!(initial_state_from_series(&[]), None);

        // Constant history: full length, sign by state
        assert_eq!(initial_state_from_series(&[1, 1, 1, 1]), Some(4));
        assert_eq!(initial_state_from_series(&[0, 0, 0]), Some(-3));

        // Most recent transition wins
        assert_eq!(initial_state_from_series(&[0, 1, 1, 1]), Some(3));
        assert_eq!(initial_state_from_series(&[1, 1, 0, 0]), Some(-2));
        assert_eq!(initial_state_from_series(&[0, 1, 0, 1]), Some(1));
    }

    #[rstest]
    fn test_initial_states_policy(mut small_case: Case) {
        small_case.generators[0].initial_status = true;

        let states = small_case.initial_states(InitialStatePolicy::JustSwitched);
        assert_eq!(states[0], 1);

        let states = small_case.initial_states(InitialStatePolicy::FullHistoryOff);
        assert_eq!(states[0], -(small_case.horizon.periods as i64));
    }

    #[rstest]
    fn test_initial_states_history_overrides_policy(mut small_case: Case) {
        let id = small_case.generators[0].id.clone();
        small_case.commitment_history.insert(id, vec![1, 1, 0]);

        let states = small_case.initial_states(InitialStatePolicy::JustSwitched);
        assert_eq!(states[0], -1);
    }

    #[rstest]
    fn test_validate_ok(two_bus_case: Case) {
        assert!(two_bus_case.validate().is_ok());
    }

    #[rstest]
    fn test_validate_requires_one_swing(mut two_bus_case: Case) {
        two_bus_case.buses[0].kind = BusType::PQ;
        assert!(two_bus_case.validate().is_err());

        two_bus_case.buses[0].kind = BusType::Swing;
        two_bus_case.buses[1].kind = BusType::Swing;
        assert!(two_bus_case.validate().is_err());
    }

    #[rstest]
    fn test_validate_demand_length(mut two_bus_case: Case) {
        let bus = two_bus_case.buses[0].id.clone();
        two_bus_case.demand.insert(bus, vec![1.0]);
        assert!(two_bus_case.validate().is_err());
    }

    #[rstest]
    fn test_total_demand(two_bus_case: Case) {
        assert_eq!(two_bus_case.total_demand(0), 300.0);
    }
}
