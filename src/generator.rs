//! A dispatchable thermal generator and its commitment parameters.
use crate::cost_curve::CostCurve;
use crate::error::ValidationError;
use crate::id::{BusId, GeneratorId};
use serde::Deserialize;

/// A dispatchable generator
///
/// All power quantities are in MW, costs in $ and times in periods. Invariants
/// (checked by [`Generator::validate`], which [`crate::case::Case::new`] runs
/// for every generator): `0 <= pmin <= pmax`, ramp rates within `pmax`,
/// `initial_generation <= pmax`.
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct Generator {
    /// Unique identifier for the generator (e.g. "GenCo0")
    pub id: GeneratorId,
    /// The bus the generator is connected to
    pub bus: BusId,
    /// Minimum power output when committed (MW)
    pub pmin: f64,
    /// Maximum power output (MW)
    pub pmax: f64,
    /// Maximum increase in output per hour (MW/h)
    pub ramp_up: f64,
    /// Maximum decrease in output per hour (MW/h)
    pub ramp_down: f64,
    /// Maximum output in the period the unit starts up (MW)
    pub startup_ramp: f64,
    /// Maximum output in the period before the unit shuts down (MW)
    pub shutdown_ramp: f64,
    /// Minimum number of periods the unit must stay on once started
    pub min_up_time: usize,
    /// Minimum number of periods the unit must stay off once stopped
    pub min_down_time: usize,
    /// Periods needed to bring the unit online (data only; generates no constraints)
    #[serde(default)]
    pub startup_time: usize,
    /// Periods needed to take the unit offline (data only; generates no constraints)
    #[serde(default)]
    pub shutdown_time: usize,
    /// Whether the unit was on at the start of the horizon
    #[serde(default)]
    pub initial_status: bool,
    /// Power output at the start of the horizon (MW)
    #[serde(default)]
    pub initial_generation: f64,
    /// Production cost representation
    #[serde(flatten)]
    pub cost_curve: CostCurve,
    /// Cost of starting after a short outage ($)
    #[serde(default)]
    pub hot_start_cost: f64,
    /// Cost of starting after a long outage ($)
    #[serde(default)]
    pub cold_start_cost: f64,
    /// Cost coefficient applied to each shutdown ($)
    #[serde(default)]
    pub shutdown_cost: f64,
    /// Off-time (periods) beyond which a restart is a cold start
    #[serde(default)]
    pub cold_start_hours: usize,
    /// Fraction of output lost to forced outages, in [0, 1]
    #[serde(default)]
    pub forced_outage_rate: f64,
}

impl Generator {
    /// Check the generator's data invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        let id = &self.id;
        if self.pmin < 0.0 || self.pmax < self.pmin {
            return Err(ValidationError(format!(
                "generator {id}: power bounds must satisfy 0 <= pmin <= pmax \
                 (pmin={}, pmax={})",
                self.pmin, self.pmax
            )));
        }
        for (name, value) in [
            ("ramp_up", self.ramp_up),
            ("ramp_down", self.ramp_down),
            ("startup_ramp", self.startup_ramp),
            ("shutdown_ramp", self.shutdown_ramp),
        ] {
            if value < 0.0 || value > self.pmax {
                return Err(ValidationError(format!(
                    "generator {id}: {name} must be in [0, pmax] (got {value})"
                )));
            }
        }
        if self.initial_generation < 0.0 || self.initial_generation > self.pmax {
            return Err(ValidationError(format!(
                "generator {id}: initial_generation must be in [0, pmax] (got {})",
                self.initial_generation
            )));
        }
        if !(0.0..=1.0).contains(&self.forced_outage_rate) {
            return Err(ValidationError(format!(
                "generator {id}: forced_outage_rate must be in [0, 1] (got {})",
                self.forced_outage_rate
            )));
        }
        for (name, value) in [
            ("hot_start_cost", self.hot_start_cost),
            ("cold_start_cost", self.cold_start_cost),
            ("shutdown_cost", self.shutdown_cost),
        ] {
            if value < 0.0 {
                return Err(ValidationError(format!(
                    "generator {id}: {name} must be non-negative (got {value})"
                )));
            }
        }

        Ok(())
    }
}

/// A non-dispatchable (curtailable) generator such as a wind farm.
///
/// Its output is a decision variable bounded per period by the forecast
/// availability.
#[derive(PartialEq, Clone, Debug)]
pub struct NondispatchableGenerator {
    /// Unique identifier
    pub id: GeneratorId,
    /// The bus the unit is connected to
    pub bus: BusId,
    /// Per-period minimum power that must be taken (MW)
    pub min_power: Vec<f64>,
    /// Per-period maximum available power (MW)
    pub max_power: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::generator;
    use rstest::rstest;

    #[rstest]
    fn test_validate_ok(generator: Generator) {
        assert!(generator.validate().is_ok());
    }

    #[rstest]
    fn test_validate_bad_power_bounds(mut generator: Generator) {
        generator.pmin = 150.0; // > pmax
        assert!(generator.validate().is_err());
    }

    #[rstest]
    fn test_validate_ramp_exceeds_pmax(mut generator: Generator) {
        generator.ramp_up = generator.pmax + 1.0;
        assert!(generator.validate().is_err());
    }

    #[rstest]
    fn test_validate_bad_outage_rate(mut generator: Generator) {
        generator.forced_outage_rate = 1.5;
        assert!(generator.validate().is_err());
    }
}
