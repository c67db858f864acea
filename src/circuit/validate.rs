//! Circuit validation.

use crate::components::Component;
use crate::error::{DcError, Result};

use super::{BranchId, Circuit, NodeId};

/// Validate a circuit for analysis.
///
/// Checks:
/// - Every device terminal and control node is a registered node
/// - Every auxiliary and controlling branch is within the branch count
/// - No non-ground node has fewer than two terminal connections
///
/// A node with a single connection has no return path, so it is reported as
/// [`DcError::SingularMatrix`] at its own row even when the assembled matrix
/// would happen to be invertible. Voltage-source loops and nodes cut off
/// behind open devices surface from the factorization instead.
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    let num_nodes = circuit.num_nodes();
    let num_branches = circuit.num_branches();

    let branch_in_range = |branch: BranchId| branch.0 < num_branches;
    let mut incidence = vec![0usize; num_nodes];

    for device in circuit.devices() {
        if let Some(node) = device.nodes().into_iter().find(|n| n.0 >= num_nodes) {
            return Err(DcError::InvalidTopology {
                message: format!(
                    "device '{}' references node {} but the circuit has {} nodes",
                    device.name(),
                    node.0,
                    num_nodes
                ),
            });
        }

        let control = match device {
            Component::Cccs(f) => Some(f.control_branch),
            Component::Ccvs(h) => Some(h.control_branch),
            _ => None,
        };
        for branch in device.branch().into_iter().chain(control) {
            if !branch_in_range(branch) {
                return Err(DcError::InvalidTopology {
                    message: format!(
                        "device '{}' references branch {} but the circuit has {} branches",
                        device.name(),
                        branch.0,
                        num_branches
                    ),
                });
            }
        }

        for node in device.nodes() {
            incidence[node.0] += 1;
        }
    }

    if let Some(node) = (1..num_nodes).find(|&n| incidence[n] < 2) {
        log::warn!(
            "node '{}' has {} terminal connection(s) and no return path",
            circuit.node_name(NodeId(node)),
            incidence[node]
        );
        return Err(DcError::SingularMatrix { pivot: node });
    }

    Ok(())
}
