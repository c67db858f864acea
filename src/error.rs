//! Error types for the dcpoint operating-point solver.
//!
//! This module provides a unified error type [`DcError`] that covers
//! all error conditions that can occur during netlist parsing, circuit
//! construction, matrix assembly and solving.
//!
//! Netlist problems scoped to a single line or device are non-fatal: the
//! parser records them in [`Circuit::diagnostics`](crate::circuit::Circuit::diagnostics)
//! and keeps going. Structural and numerical problems abort the run.

use thiserror::Error;

/// Result type alias using [`DcError`].
pub type Result<T> = std::result::Result<T, DcError>;

/// Unified error type for all dcpoint operations.
#[derive(Error, Debug)]
pub enum DcError {
    // ============ Netlist Errors ============
    /// The netlist file could not be opened or read
    #[error("Failed to open netlist '{path}': {source}")]
    FileNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed line (missing field, bad number)
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Leading token matches no element kind or directive
    #[error("Unknown element '{token}' at line {line}")]
    UnknownElement { token: String, line: usize },

    /// A MOSFET references a model ID that was never defined
    #[error("Undefined model '{model}' referenced by device '{device}'")]
    UnknownModel { model: String, device: String },

    /// Two `.MODEL` directives with the same ID
    #[error("Duplicate model '{name}'")]
    DuplicateModel { name: String },

    /// Two devices with the same name
    #[error("Duplicate device name '{name}'")]
    DuplicateDevice { name: String },

    /// A current-controlled source names a controller that is not a voltage source
    #[error("Device '{device}' references unknown controlling source '{controller}'")]
    UnknownController { controller: String, device: String },

    /// Invalid parameter value
    #[error("Invalid parameter '{param}' for device '{device}': {message}")]
    InvalidParameter {
        device: String,
        param: String,
        message: String,
    },

    // ============ Circuit Errors ============
    /// Node referenced but never registered
    #[error("Node '{node}' is not registered in the circuit")]
    UnknownNode { node: String },

    /// Invalid circuit topology
    #[error("Invalid circuit topology: {message}")]
    InvalidTopology { message: String },

    // ============ Analysis Errors ============
    /// Matrix is singular and cannot be solved
    #[error("Singular matrix at pivot {pivot} - check for floating nodes, an unpinned ground or voltage-source loops")]
    SingularMatrix { pivot: usize },

    /// The fixed-point iteration did not settle
    #[error("Operating point did not converge after {iterations} iterations (max change: {residual:.2e} V)")]
    ConvergenceFailure { iterations: usize, residual: f64 },

    /// Invalid analysis parameter
    #[error("Invalid analysis parameter: {message}")]
    InvalidAnalysisParam { message: String },
}

impl DcError {
    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an unknown element error
    pub fn unknown_element(token: impl Into<String>, line: usize) -> Self {
        Self::UnknownElement {
            token: token.into(),
            line,
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        device: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            device: device.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a convergence failure error
    pub fn convergence_failure(iterations: usize, residual: f64) -> Self {
        Self::ConvergenceFailure {
            iterations,
            residual,
        }
    }

    /// Netlist line the error is scoped to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::ParseError { line, .. }
            | Self::UnknownElement { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Whether this error aborts a run rather than being collected as a
    /// diagnostic.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::UnknownNode { .. }
                | Self::InvalidTopology { .. }
                | Self::SingularMatrix { .. }
                | Self::ConvergenceFailure { .. }
                | Self::InvalidAnalysisParam { .. }
        )
    }
}
