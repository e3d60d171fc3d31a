//! Transmission branches and interface (flowgate) groupings.
use crate::error::ValidationError;
use crate::id::{BranchId, BusId, InterfaceId};
use serde::Deserialize;

/// A transmission line between two buses
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct Branch {
    /// Unique identifier for the branch (e.g. "Line1-2")
    pub id: BranchId,
    /// The bus power flows out of
    pub from_bus: BusId,
    /// The bus power flows into
    pub to_bus: BusId,
    /// Series reactance (per unit); determines DC flow for a given angle difference
    pub reactance: f64,
    /// Thermal rating in MW; 0 means the flow is unconstrained
    #[serde(default)]
    pub rating: f64,
    /// Whether the branch is in service
    #[serde(default = "default_in_service")]
    pub in_service: bool,
}

/// Branches default to in service
fn default_in_service() -> bool {
    true
}

impl Branch {
    /// Check the branch's data invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reactance <= 0.0 || !self.reactance.is_finite() {
            return Err(ValidationError(format!(
                "branch {}: reactance must be positive (got {})",
                self.id, self.reactance
            )));
        }
        if self.rating < 0.0 {
            return Err(ValidationError(format!(
                "branch {}: rating must be non-negative (got {})",
                self.id, self.rating
            )));
        }

        Ok(())
    }

    /// Whether the thermal rating should be enforced
    pub fn is_rated(&self) -> bool {
        self.rating > 0.0
    }
}

/// A named group of branches whose combined directed flow is limited
#[derive(PartialEq, Clone, Debug)]
pub struct Interface {
    /// Unique identifier for the interface
    pub id: InterfaceId,
    /// Member branches with their signed flow-direction coefficients
    pub branches: Vec<(BranchId, f64)>,
    /// Aggregate flow limit (MW)
    pub limit: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(reactance: f64, rating: f64) -> Branch {
        Branch {
            id: "line1".into(),
            from_bus: "bus1".into(),
            to_bus: "bus2".into(),
            reactance,
            rating,
            in_service: true,
        }
    }

    #[test]
    fn test_validate() {
        assert!(branch(0.1, 100.0).validate().is_ok());
        assert!(branch(0.0, 100.0).validate().is_err());
        assert!(branch(-0.1, 100.0).validate().is_err());
        assert!(branch(0.1, -1.0).validate().is_err());
    }

    #[test]
    fn test_is_rated() {
        assert!(branch(0.1, 100.0).is_rated());
        assert!(!branch(0.1, 0.0).is_rated());
    }
}
