//! WASM bindings for dcpoint Core.
//!
//! This module provides JavaScript-friendly bindings for running the DC
//! analysis in a web browser.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmDcAnalysis } from 'dcpoint_core';
//!
//! await init();
//!
//! const netlist = `
//!   V1 in GND 10
//!   R1 in out 10k
//!   R2 out GND 10k
//!   .PLOTNV out
//! `;
//!
//! const analysis = new WasmDcAnalysis(netlist);
//! console.log(analysis.solve());
//! console.log(analysis.node_voltage("out"));
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::Circuit;
use crate::netlist;
use crate::report;
use crate::solver::{DcAnalysis, DcConfig, DcSolution, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(err: crate::error::DcError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-compatible DC operating-point analysis.
///
/// Owns the parsed circuit and the most recent solution.
#[wasm_bindgen]
pub struct WasmDcAnalysis {
    circuit: Circuit,
    config: DcConfig,
    solution: Option<DcSolution>,
}

#[wasm_bindgen]
impl WasmDcAnalysis {
    /// Parse a netlist with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(netlist: &str) -> Result<WasmDcAnalysis, JsValue> {
        Self::with_config(netlist, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE)
    }

    /// Parse a netlist with a custom iteration configuration.
    ///
    /// # Arguments
    /// * `netlist` - The netlist text
    /// * `max_iterations` - Maximum fixed-point iterations (default: 100)
    /// * `tolerance` - Convergence tolerance in volts (default: 1e-6)
    #[wasm_bindgen]
    pub fn with_config(
        netlist: &str,
        max_iterations: usize,
        tolerance: f64,
    ) -> Result<WasmDcAnalysis, JsValue> {
        let config = DcConfig::new()
            .with_max_iterations(max_iterations)
            .with_tolerance(tolerance);
        config.validate().map_err(to_js)?;

        let circuit = netlist::parse(netlist).map_err(to_js)?;

        Ok(WasmDcAnalysis {
            circuit,
            config,
            solution: None,
        })
    }

    /// Solve the operating point and return the text report.
    #[wasm_bindgen]
    pub fn solve(&mut self) -> Result<String, JsValue> {
        let solution = DcAnalysis::with_config(&self.circuit, self.config.clone())
            .solve()
            .map_err(to_js)?;

        let devices = report::compute_currents_and_powers(
            &self.circuit,
            &solution.voltages,
            &solution.currents,
        );
        let text = format!(
            "{}\n{}",
            report::format_node_voltages(&self.circuit, &solution.voltages),
            report::format_device_report(&devices)
        );

        self.solution = Some(solution);
        Ok(text)
    }

    /// Get the solved voltage at a named node.
    ///
    /// # Returns
    /// The voltage, or `undefined` before `solve()` or for an unknown node.
    #[wasm_bindgen]
    pub fn node_voltage(&self, node_name: &str) -> Option<f64> {
        let solution = self.solution.as_ref()?;
        solution.voltages.by_name(&self.circuit, node_name)
    }

    /// Diagnostics collected while parsing, one message per entry.
    #[wasm_bindgen]
    pub fn diagnostics(&self) -> Vec<String> {
        self.circuit
            .diagnostics()
            .iter()
            .map(|d| d.to_string())
            .collect()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
