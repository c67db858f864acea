//! DC operating-point analysis interface.

use crate::circuit::{validate_circuit, Circuit};
use crate::error::{DcError, Result};

use super::assemble::assemble;
use super::fixed_point::FixedPoint;
use super::mna::{CurrentStampPolarity, MnaMatrix};
use super::solution::{DcSolution, NodeVoltages};
use super::{DEFAULT_MAX_ITERATIONS, DEFAULT_PIVOT_TOLERANCE, DEFAULT_TOLERANCE};

/// How nonlinear circuits are driven to an operating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveMode {
    /// One assemble/solve from the initial estimate.
    SinglePass,
    /// Repeat until node voltages settle.
    #[default]
    Iterate,
}

/// Configuration for the DC analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct DcConfig {
    /// Single pass or fixed-point iteration.
    pub mode: SolveMode,
    /// Maximum passes in [`SolveMode::Iterate`].
    pub max_iterations: usize,
    /// Convergence tolerance on node voltages (volts).
    pub tolerance: f64,
    /// Pivot threshold relative to the infinity norm of the row-scaled
    /// matrix. Rows are scaled independently, so a network mixing milliohm
    /// and gigaohm branches is not rejected; a genuinely near-dependent set
    /// of equations still is.
    pub pivot_tolerance: f64,
    /// Current-source convention.
    pub current_polarity: CurrentStampPolarity,
}

impl Default for DcConfig {
    fn default() -> Self {
        Self {
            mode: SolveMode::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            current_polarity: CurrentStampPolarity::default(),
        }
    }
}

impl DcConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the solve mode.
    pub fn with_mode(mut self, mode: SolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the maximum fixed-point iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance (in volts).
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the relative pivot tolerance.
    pub fn with_pivot_tolerance(mut self, pivot_tolerance: f64) -> Self {
        self.pivot_tolerance = pivot_tolerance;
        self
    }

    /// Set the current-source convention.
    pub fn with_current_polarity(mut self, polarity: CurrentStampPolarity) -> Self {
        self.current_polarity = polarity;
        self
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(DcError::InvalidAnalysisParam {
                message: "max_iterations must be at least 1".to_string(),
            });
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(DcError::InvalidAnalysisParam {
                message: format!("tolerance must be positive, got {}", self.tolerance),
            });
        }
        if !(self.pivot_tolerance >= 0.0 && self.pivot_tolerance.is_finite()) {
            return Err(DcError::InvalidAnalysisParam {
                message: format!(
                    "pivot_tolerance must be non-negative, got {}",
                    self.pivot_tolerance
                ),
            });
        }
        Ok(())
    }
}

/// DC operating-point analysis of one circuit.
pub struct DcAnalysis<'a> {
    circuit: &'a Circuit,
    config: DcConfig,
}

impl<'a> DcAnalysis<'a> {
    /// Create an analysis with the default configuration.
    pub fn new(circuit: &'a Circuit) -> Self {
        Self::with_config(circuit, DcConfig::default())
    }

    /// Create an analysis with a custom configuration.
    pub fn with_config(circuit: &'a Circuit, config: DcConfig) -> Self {
        Self { circuit, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &DcConfig {
        &self.config
    }

    /// Solve from an all-zero initial estimate.
    pub fn solve(&self) -> Result<DcSolution> {
        self.solve_from(NodeVoltages::zeros(self.circuit.num_nodes()))
    }

    /// Solve from a caller-supplied initial estimate.
    pub fn solve_from(&self, initial: NodeVoltages) -> Result<DcSolution> {
        self.config.validate()?;
        validate_circuit(self.circuit)?;

        if initial.len() != self.circuit.num_nodes() {
            return Err(DcError::InvalidAnalysisParam {
                message: format!(
                    "initial estimate has {} entries, circuit has {} nodes",
                    initial.len(),
                    self.circuit.num_nodes()
                ),
            });
        }

        let fixed_point = FixedPoint {
            max_iterations: self.config.max_iterations,
            tolerance: self.config.tolerance,
            pivot_tolerance: self.config.pivot_tolerance,
            polarity: self.config.current_polarity,
        };

        let nonlinear = self.circuit.is_nonlinear();
        if !nonlinear || self.config.mode == SolveMode::SinglePass {
            let (voltages, currents) = fixed_point.pass(self.circuit, &initial)?;
            return Ok(DcSolution {
                voltages,
                currents,
                iterations: 1,
                converged: !nonlinear,
            });
        }

        let solution = fixed_point.solve(self.circuit, initial)?;
        log::info!("operating point converged in {} iterations", solution.iterations);
        Ok(solution)
    }

    /// Assemble the pinned system at an estimate without solving it.
    pub fn assemble(&self, estimate: &NodeVoltages) -> MnaMatrix {
        assemble(self.circuit, estimate, self.config.current_polarity)
    }
}

/// Solve a circuit's DC operating point with the default configuration.
pub fn solve_dc(circuit: &Circuit) -> Result<DcSolution> {
    DcAnalysis::new(circuit).solve()
}
