//! Solved operating point.

use nalgebra::DVector;

use crate::circuit::{BranchId, Circuit, NodeId};

/// Node voltages indexed by [`NodeId`]; ground is entry 0 and always 0 V.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVoltages(Vec<f64>);

impl NodeVoltages {
    /// All-zero estimate for `num_nodes` nodes.
    pub fn zeros(num_nodes: usize) -> Self {
        Self(vec![0.0; num_nodes])
    }

    /// Wrap raw voltages. Entry 0 is forced to 0 V.
    pub fn new(mut values: Vec<f64>) -> Self {
        if let Some(ground) = values.first_mut() {
            *ground = 0.0;
        }
        Self(values)
    }

    /// Take the node rows of an MNA solution vector.
    pub(crate) fn from_solution(x: &DVector<f64>, num_nodes: usize) -> Self {
        Self::new(x.iter().take(num_nodes).copied().collect())
    }

    /// Voltage at a node. Unknown nodes read as 0 V.
    pub fn get(&self, node: NodeId) -> f64 {
        self.0.get(node.0).copied().unwrap_or(0.0)
    }

    /// Voltage at a node by name.
    pub fn by_name(&self, circuit: &Circuit, name: &str) -> Option<f64> {
        circuit.find_node(name).map(|n| self.get(n))
    }

    /// Number of entries, ground included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw voltages in index order.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Largest absolute per-node change against another estimate.
    pub fn max_delta(&self, other: &NodeVoltages) -> f64 {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

/// Auxiliary branch currents of voltage-defined devices.
///
/// The MNA unknown of a branch is the current entering the positive
/// terminal from the circuit. [`delivered`](Self::delivered) reports the
/// opposite sign: current pushed out of the positive terminal into the
/// circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchCurrents(Vec<f64>);

impl BranchCurrents {
    /// Take the branch rows of an MNA solution vector.
    pub(crate) fn from_solution(x: &DVector<f64>, num_nodes: usize) -> Self {
        Self(x.iter().skip(num_nodes).copied().collect())
    }

    /// Wrap raw MNA branch unknowns.
    pub fn from_raw(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Raw MNA unknown for a branch.
    pub fn raw(&self, branch: BranchId) -> f64 {
        self.0.get(branch.0).copied().unwrap_or(0.0)
    }

    /// Current delivered by the branch out of its positive terminal.
    pub fn delivered(&self, branch: BranchId) -> f64 {
        -self.raw(branch)
    }

    /// Number of branches.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether there are no branches.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of a DC operating-point analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct DcSolution {
    pub voltages: NodeVoltages,
    pub currents: BranchCurrents,
    /// Assemble/solve passes performed
    pub iterations: usize,
    /// False only for a single pass over a nonlinear circuit
    pub converged: bool,
}

impl DcSolution {
    /// Voltage at a node.
    pub fn voltage(&self, node: NodeId) -> f64 {
        self.voltages.get(node)
    }

    /// Current delivered by a voltage-defined branch.
    pub fn branch_current(&self, branch: BranchId) -> f64 {
        self.currents.delivered(branch)
    }
}
