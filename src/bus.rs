//! A bus is a node of the transmission network.
use crate::id::BusId;
use serde::Deserialize;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// The role of a bus in the network
#[derive(PartialEq, Clone, Copy, Debug, SerializeLabeledStringEnum, DeserializeLabeledStringEnum)]
pub enum BusType {
    /// Load bus
    #[string = "pq"]
    PQ,
    /// Generator bus
    #[string = "pv"]
    PV,
    /// Angle reference bus; exactly one per system, angle fixed at 0
    #[string = "swing"]
    Swing,
}

/// A node of the transmission network
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct Bus {
    /// Unique identifier for the bus (e.g. "Bus1")
    pub id: BusId,
    /// The role of the bus in the network
    #[serde(rename = "type")] // NB: we can't name a field type as it's a reserved keyword
    pub kind: BusType,
    /// Lower voltage bound (per unit)
    #[serde(default = "default_voltage_min")]
    pub voltage_min: f64,
    /// Upper voltage bound (per unit)
    #[serde(default = "default_voltage_max")]
    pub voltage_max: f64,
}

/// Default lower voltage bound
fn default_voltage_min() -> f64 {
    0.9
}

/// Default upper voltage bound
fn default_voltage_max() -> f64 {
    1.1
}

impl Bus {
    /// Create a bus with default voltage bounds
    pub fn new(id: &str, kind: BusType) -> Self {
        Bus {
            id: id.into(),
            kind,
            voltage_min: default_voltage_min(),
            voltage_max: default_voltage_max(),
        }
    }
}
