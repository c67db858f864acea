//! MNA (Modified Nodal Analysis) solver.
//!
//! This module provides the numerical engine for the DC operating point.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = z where:
//! - x contains node voltages and branch currents
//! - A is the conductance/coefficient matrix
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ i ]
//! [ C   D ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (node equations, ground row included)
//! - B, C connect voltage-defined branches to nodes
//! - D holds controlled-source couplings between branches
//! - v is the vector of node voltages
//! - j is the vector of branch currents
//! - i is the sum of current sources into each node
//! - e is the vector of branch voltage values
//!
//! Ground is stamped like any other node, then its row and column are
//! replaced by `V(ground) = 0`.
//!
//! MOSFETs are handled by fixed-point iteration: each pass linearizes them
//! at the previous pass's voltages.

mod analysis;
mod assemble;
mod fixed_point;
mod mna;
mod solution;

pub use analysis::{solve_dc, DcAnalysis, DcConfig, SolveMode};
pub use assemble::{assemble, linearize_mosfet, stamp_linear_components, stamp_nonlinear_components};
pub use fixed_point::FixedPoint;
pub use mna::{CurrentStampPolarity, MnaMatrix};
pub use solution::{BranchCurrents, DcSolution, NodeVoltages};

/// Default maximum fixed-point iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Default convergence tolerance on node voltages (volts).
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default pivot tolerance, relative to the matrix infinity norm.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-12;
