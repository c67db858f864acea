//! Fixed-point iteration for MOSFET operating points.
//!
//! Each pass linearizes every MOSFET at the previous pass's node voltages,
//! assembles, and solves. The loop stops once no node voltage moves by
//! `tolerance` or more between passes.

use crate::circuit::Circuit;
use crate::error::{DcError, Result};

use super::assemble::assemble;
use super::mna::CurrentStampPolarity;
use super::solution::{BranchCurrents, DcSolution, NodeVoltages};

/// Fixed-point solver for nonlinear circuits.
pub struct FixedPoint {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Convergence tolerance (volts)
    pub tolerance: f64,
    /// Relative pivot tolerance for each linear solve
    pub pivot_tolerance: f64,
    /// Current-source convention used during assembly
    pub polarity: CurrentStampPolarity,
}

impl FixedPoint {
    /// One assemble/solve pass from `estimate`.
    pub fn pass(&self, circuit: &Circuit, estimate: &NodeVoltages) -> Result<(NodeVoltages, BranchCurrents)> {
        let matrix = assemble(circuit, estimate, self.polarity);
        let x = matrix.solve(self.pivot_tolerance)?;
        let num_nodes = circuit.num_nodes();
        Ok((
            NodeVoltages::from_solution(&x, num_nodes),
            BranchCurrents::from_solution(&x, num_nodes),
        ))
    }

    /// Iterate from `initial` until the node voltages settle.
    pub fn solve(&self, circuit: &Circuit, initial: NodeVoltages) -> Result<DcSolution> {
        let mut estimate = initial;
        let mut max_diff = f64::INFINITY;

        for iter in 0..self.max_iterations {
            let (voltages, currents) = self.pass(circuit, &estimate)?;
            max_diff = voltages.max_delta(&estimate);
            log::debug!("iteration {}: max |dV| = {:.3e} V", iter + 1, max_diff);

            if max_diff < self.tolerance {
                return Ok(DcSolution {
                    voltages,
                    currents,
                    iterations: iter + 1,
                    converged: true,
                });
            }

            estimate = voltages;
        }

        Err(DcError::convergence_failure(self.max_iterations, max_diff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::parse;
    use approx::assert_relative_eq;

    fn solver(max_iterations: usize) -> FixedPoint {
        FixedPoint {
            max_iterations,
            tolerance: 1e-6,
            pivot_tolerance: 1e-12,
            polarity: CurrentStampPolarity::Additive,
        }
    }

    const COMMON_SOURCE: &str = ".MODEL NCH NMOS VT 1 MU 1 COX 1e-3\n\
        VDD vdd GND 5\n\
        RD vdd d 1k\n\
        VG g GND 2\n\
        M1 d g GND NCH 1u 1u";

    #[test]
    fn test_converges_to_saturation_point() {
        let circuit = parse(COMMON_SOURCE).unwrap();
        let zeros = NodeVoltages::zeros(circuit.num_nodes());
        let sol = solver(100).solve(&circuit, zeros).unwrap();

        assert!(sol.converged);
        assert_eq!(sol.iterations, 3);
        let d = circuit.find_node("d").unwrap();
        assert_relative_eq!(sol.voltage(d), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_iteration_cap() {
        let circuit = parse(COMMON_SOURCE).unwrap();
        let zeros = NodeVoltages::zeros(circuit.num_nodes());
        let err = solver(1).solve(&circuit, zeros).unwrap_err();
        match err {
            DcError::ConvergenceFailure {
                iterations,
                residual,
            } => {
                assert_eq!(iterations, 1);
                assert_relative_eq!(residual, 5.0, epsilon = 1e-9);
            }
            other => panic!("expected convergence failure, got {:?}", other),
        }
    }
}
