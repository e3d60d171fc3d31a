//! Grid-scale storage units.
use crate::error::ValidationError;
use crate::id::{BusId, StorageId};
use serde::Deserialize;

/// A storage unit (e.g. a battery) attached to a bus.
///
/// Charging and discharging are semicontinuous: each is gated by its own
/// binary indicator and bounded by the corresponding power limits. State of
/// charge is tracked as a fraction of `max_energy`.
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct StorageUnit {
    /// Unique identifier for the unit
    pub id: StorageId,
    /// The bus the unit is connected to
    pub bus: BusId,
    /// Maximum charging power (MW)
    pub max_input: f64,
    /// Maximum discharging power (MW)
    pub max_output: f64,
    /// Minimum charging power when charging (MW)
    #[serde(default)]
    pub min_input: f64,
    /// Minimum discharging power when discharging (MW)
    #[serde(default)]
    pub min_output: f64,
    /// Maximum increase in charging power per period (MW)
    pub input_ramp_up: f64,
    /// Maximum decrease in charging power per period (MW)
    pub input_ramp_down: f64,
    /// Maximum increase in discharging power per period (MW)
    pub output_ramp_up: f64,
    /// Maximum decrease in discharging power per period (MW)
    pub output_ramp_down: f64,
    /// Fraction of charged energy retained, in (0, 1]
    pub efficiency: f64,
    /// Energy capacity (MWh)
    pub max_energy: f64,
    /// State of charge at the start of the horizon, in [0, 1]
    #[serde(default)]
    pub initial_soc: f64,
    /// Charging power at the start of the horizon (MW)
    #[serde(default)]
    pub initial_input: f64,
    /// Discharging power at the start of the horizon (MW)
    #[serde(default)]
    pub initial_output: f64,
}

impl StorageUnit {
    /// Check the unit's data invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        let id = &self.id;
        if self.max_energy <= 0.0 {
            return Err(ValidationError(format!(
                "storage {id}: max_energy must be positive (got {})",
                self.max_energy
            )));
        }
        if !(0.0 < self.efficiency && self.efficiency <= 1.0) {
            return Err(ValidationError(format!(
                "storage {id}: efficiency must be in (0, 1] (got {})",
                self.efficiency
            )));
        }
        if !(0.0..=1.0).contains(&self.initial_soc) {
            return Err(ValidationError(format!(
                "storage {id}: initial_soc must be in [0, 1] (got {})",
                self.initial_soc
            )));
        }
        if self.min_input < 0.0 || self.max_input < self.min_input {
            return Err(ValidationError(format!(
                "storage {id}: input power bounds must satisfy 0 <= min <= max"
            )));
        }
        if self.min_output < 0.0 || self.max_output < self.min_output {
            return Err(ValidationError(format!(
                "storage {id}: output power bounds must satisfy 0 <= min <= max"
            )));
        }

        Ok(())
    }
}
