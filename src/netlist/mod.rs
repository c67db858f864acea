//! SPICE-style netlist parser.
//!
//! Netlists are line-oriented. Each line is either a device, a directive or
//! a comment; the leading token decides which.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist     = { line }
//! line        = comment | directive | element | empty
//! comment     = '*' { any_char } | { token } ('#' | ';') { any_char }
//! directive   = '.' directive_name { argument }
//! element     = type name_rest node+ [controller] value+
//!
//! directive_name = "MODEL" | "PLOTNV" | "ALIAS" | "HB"   (any case)
//! type        = 'V' | 'I' | 'R' | 'C' | 'L' | 'M' | 'E' | 'G' | 'F' | 'H'   (any case)
//! node        = identifier | "0" | "GND"
//! value       = number [scale_suffix]
//!
//! number       = ['-'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! scale_suffix = 'f' | 'p' | 'n' | 'u' | 'm' | 'k' | "meg" | 'g' | 't'   (any case)
//! ```
//!
//! # Element Types
//!
//! | Type | Description | Syntax |
//! |------|-------------|--------|
//! | V | Voltage Source | `V<name> <n+> <n-> <volts>` |
//! | I | Current Source | `I<name> <n1> <n2> <amps>` |
//! | R | Resistor | `R<name> <n1> <n2> <ohms>` |
//! | C | Capacitor | `C<name> <n1> <n2> <farads>` |
//! | L | Inductor | `L<name> <n1> <n2> <henries>` |
//! | M | MOSFET | `M<name> <drain> <gate> <source> <model> <W> <L>` |
//! | E | VCVS | `E<name> <n+> <n-> <nc+> <nc-> <gain>` |
//! | G | VCCS | `G<name> <n+> <n-> <nc+> <nc-> <gm>` |
//! | F | CCCS | `F<name> <n+> <n-> <Vcontrol> <gain>` |
//! | H | CCVS | `H<name> <n+> <n-> <Vcontrol> <ohms>` |
//!
//! # Directives
//!
//! | Directive | Description | Syntax |
//! |-----------|-------------|--------|
//! | .MODEL | MOSFET model card | `.MODEL <id> [NMOS\|PMOS] [VT v] [MU v] [COX v] [LAMBDA v] [CJ0 v]` |
//! | .PLOTNV | Select a node for output | `.PLOTNV <node>` |
//! | .ALIAS | Merge two node names | `.ALIAS <node> <node>` |
//! | .hb | Harmonic-balance request (recorded only) | `.hb <freq> <duration>` |
//!
//! # Example
//!
//! ```text
//! * Common-source stage
//! .MODEL NCH NMOS VT 1 MU 1 COX 1e-3
//! VDD vdd GND 5
//! VG  g   GND 2
//! RD  vdd d   1k
//! M1  d   g   GND NCH 1u 1u
//! .PLOTNV d
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Line};
pub use parser::Parser;

use std::path::Path;

use crate::circuit::Circuit;
use crate::error::{DcError, Result};

/// Parse netlist text into a circuit.
///
/// Per-line problems do not fail the parse; they are available from
/// [`Circuit::diagnostics`].
pub fn parse(input: &str) -> Result<Circuit> {
    let ast = Parser::new(Lexer::new(input)).parse();
    Circuit::from_ast(ast)
}

/// Parse a netlist file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Circuit> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| DcError::FileNotFound {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
