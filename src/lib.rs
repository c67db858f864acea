//! # dcpoint Core
//!
//! A DC operating-point solver for SPICE-style netlists.
//!
//! This library provides:
//! - A line-oriented netlist parser with best-effort diagnostics
//! - Modified Nodal Analysis (MNA) assembly with the ground node pinned
//! - Linear devices (R, C, L), independent and controlled sources, and a
//!   square-law MOSFET model
//! - Fixed-point iteration for MOSFET operating points
//! - Per-device current and power reports
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`netlist`] - Parser for the netlist format
//! - [`circuit`] - Circuit registry, node naming and validation
//! - [`components`] - Device models (resistors, sources, MOSFETs, etc.)
//! - [`solver`] - MNA matrix assembly and numerical solving
//! - [`report`] - Currents, powers and text output
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! RUST_LOG=info dcpoint amplifier.cir
//! ```
//!
//! ### Library
//!
//! ```
//! use dcpoint_core::{netlist, report, solver};
//!
//! let circuit = netlist::parse("V1 a GND 5\nR1 a GND 1k").unwrap();
//! let solution = solver::solve_dc(&circuit).unwrap();
//! let devices = report::compute_currents_and_powers(&circuit, &solution.voltages, &solution.currents);
//! assert!((devices.get("V1").unwrap().current - 5e-3).abs() < 1e-12);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmDcAnalysis } from 'dcpoint_core';
//!
//! const analysis = new WasmDcAnalysis(netlistText);
//! console.log(analysis.solve());
//! ```
//!
//! ## Solution Method
//!
//! 1. Assemble the system matrix A and source vector z, ground included
//! 2. Pin ground: replace its row and column with `V(GND) = 0`
//! 3. Solve Ax = z by LU factorization
//! 4. If the circuit has MOSFETs, re-linearize them at the new voltages and
//!    repeat until the node voltages settle

pub mod circuit;
pub mod components;
pub mod error;
pub mod netlist;
pub mod report;
pub mod solver;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use error::{DcError, Result};
pub use solver::{solve_dc, DcAnalysis, DcConfig, DcSolution};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmDcAnalysis;
