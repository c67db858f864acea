//! Parsed netlist representation.
//!
//! Every non-empty line becomes exactly one [`Statement`], decided once by
//! the parser. Node names are still raw spellings here; they are
//! canonicalized when the [`Circuit`](crate::circuit::Circuit) is built.

use crate::components::MosfetModel;
use crate::error::DcError;

/// A complete parsed netlist.
#[derive(Debug, Default)]
pub struct NetlistAst {
    /// Successfully classified lines, in file order
    pub statements: Vec<ParsedLine>,
    /// Terminal node names of every device line, in encounter order
    pub node_occurrences: Vec<String>,
    /// Per-line problems found while parsing
    pub diagnostics: Vec<DcError>,
}

impl NetlistAst {
    /// Create a new empty netlist.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A statement together with its source line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub line: usize,
    pub statement: Statement,
}

/// Two-terminal element: `X<name> <n1> <n2> <value>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoTerminalDef {
    pub name: String,
    pub nodes: [String; 2],
    pub value: f64,
}

/// MOSFET element: `M<name> <drain> <gate> <source> <model> <width> <length>`.
#[derive(Debug, Clone, PartialEq)]
pub struct MosfetDef {
    pub name: String,
    pub drain: String,
    pub gate: String,
    pub source: String,
    pub model: String,
    pub width: f64,
    pub length: f64,
}

/// Voltage-controlled source: `E|G<name> <n+> <n-> <nc+> <nc-> <gain>`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageControlledDef {
    pub name: String,
    pub nodes: [String; 2],
    pub control: [String; 2],
    pub gain: f64,
}

/// Current-controlled source: `F|H<name> <n+> <n-> <Vcontrol> <gain>`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentControlledDef {
    pub name: String,
    pub nodes: [String; 2],
    pub controller: String,
    pub gain: f64,
}

/// Closed set of line kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    VoltageSource(TwoTerminalDef),
    CurrentSource(TwoTerminalDef),
    Resistor(TwoTerminalDef),
    Capacitor(TwoTerminalDef),
    Inductor(TwoTerminalDef),
    Mosfet(MosfetDef),
    Vcvs(VoltageControlledDef),
    Vccs(VoltageControlledDef),
    Cccs(CurrentControlledDef),
    Ccvs(CurrentControlledDef),
    /// `.MODEL`
    Model(MosfetModel),
    /// `.PLOTNV <node>`
    Plot { node: String },
    /// `.ALIAS <a> <b>`
    Alias { a: String, b: String },
    /// `.hb <frequency> <duration>`, recorded only
    HarmonicBalance { frequency: f64, duration: f64 },
    /// Leading token matched nothing
    Unknown { token: String },
}

impl Statement {
    /// Node names this statement contributes to the occurrence sequence.
    pub fn node_names(&self) -> Vec<&str> {
        match self {
            Statement::VoltageSource(d)
            | Statement::CurrentSource(d)
            | Statement::Resistor(d)
            | Statement::Capacitor(d)
            | Statement::Inductor(d) => d.nodes.iter().map(String::as_str).collect(),
            Statement::Mosfet(m) => vec![m.drain.as_str(), m.gate.as_str(), m.source.as_str()],
            Statement::Vcvs(d) | Statement::Vccs(d) => d
                .nodes
                .iter()
                .chain(&d.control)
                .map(String::as_str)
                .collect(),
            Statement::Cccs(d) | Statement::Ccvs(d) => d.nodes.iter().map(String::as_str).collect(),
            Statement::Model(_)
            | Statement::Plot { .. }
            | Statement::Alias { .. }
            | Statement::HarmonicBalance { .. }
            | Statement::Unknown { .. } => Vec::new(),
        }
    }

    /// Whether this statement defines a device.
    pub fn is_device(&self) -> bool {
        !matches!(
            self,
            Statement::Model(_)
                | Statement::Plot { .. }
                | Statement::Alias { .. }
                | Statement::HarmonicBalance { .. }
                | Statement::Unknown { .. }
        )
    }
}
