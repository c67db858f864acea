//! Independent voltage and current sources.

use crate::circuit::{BranchId, DeviceId, NodeId};

/// Independent DC voltage source, `V(n+) - V(n-) = voltage`.
///
/// Owns one auxiliary branch whose current is an MNA unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageSource {
    pub id: DeviceId,
    pub name: String,
    pub nodes: [NodeId; 2], // [positive, negative]
    pub voltage: f64,
    pub branch: BranchId,
}

impl VoltageSource {
    pub fn new(
        id: DeviceId,
        name: String,
        nodes: [NodeId; 2],
        voltage: f64,
        branch: BranchId,
    ) -> Self {
        Self {
            id,
            name,
            nodes,
            voltage,
            branch,
        }
    }

    /// Power delivered into the circuit for a given delivered branch current.
    pub fn power(&self, current: f64) -> f64 {
        self.voltage * current
    }
}

/// Independent DC current source. Contributes only to the right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSource {
    pub id: DeviceId,
    pub name: String,
    pub nodes: [NodeId; 2],
    pub current: f64,
}

impl CurrentSource {
    pub fn new(id: DeviceId, name: String, nodes: [NodeId; 2], current: f64) -> Self {
        Self {
            id,
            name,
            nodes,
            current,
        }
    }

    /// Power delivered into the circuit given the terminal voltages.
    /// Current flows from n1 through the source to n2.
    pub fn power(&self, v1: f64, v2: f64) -> f64 {
        self.current * (v2 - v1)
    }
}
