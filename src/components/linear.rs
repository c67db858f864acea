//! Linear passive components: Resistor, Capacitor, Inductor.
//!
//! Only the resistor contributes to the DC system. Capacitors and inductors
//! are kept in the circuit so the netlist round-trips and reports list them,
//! but both are treated as open circuits at DC.

use crate::circuit::{DeviceId, NodeId};
use crate::error::{DcError, Result};

/// A resistor component.
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    pub id: DeviceId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor. Zero or non-finite resistance is rejected.
    pub fn new(id: DeviceId, name: String, nodes: [NodeId; 2], resistance: f64) -> Result<Self> {
        if resistance == 0.0 || !resistance.is_finite() {
            return Err(DcError::invalid_parameter(
                name,
                "resistance",
                format!("must be finite and non-zero, got {}", resistance),
            ));
        }
        Ok(Self {
            id,
            name,
            nodes,
            resistance,
        })
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }

    /// Current flowing from node 1 to node 2 through the resistor.
    pub fn current(&self, v1: f64, v2: f64) -> f64 {
        (v1 - v2) / self.resistance
    }
}

/// A capacitor component. Open circuit at DC.
#[derive(Debug, Clone, PartialEq)]
pub struct Capacitor {
    pub id: DeviceId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub capacitance: f64,
}

impl Capacitor {
    /// Create a new capacitor.
    pub fn new(id: DeviceId, name: String, nodes: [NodeId; 2], capacitance: f64) -> Self {
        Self {
            id,
            name,
            nodes,
            capacitance,
        }
    }
}

/// An inductor component.
///
/// A physical inductor is a short at DC; this solver leaves it open instead,
/// so a circuit whose only DC path runs through an inductor will report the
/// downstream node as floating.
#[derive(Debug, Clone, PartialEq)]
pub struct Inductor {
    pub id: DeviceId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub inductance: f64,
}

impl Inductor {
    /// Create a new inductor.
    pub fn new(id: DeviceId, name: String, nodes: [NodeId; 2], inductance: f64) -> Self {
        Self {
            id,
            name,
            nodes,
            inductance,
        }
    }
}
