//! Parser for netlists.

use super::ast::*;
use super::lexer::{parse_value, Lexer, Line};
use crate::components::{MosfetModel, Polarity};
use crate::error::{DcError, Result};

/// Parser for netlist text.
///
/// Parsing is best-effort: a malformed or unrecognized line is recorded as
/// a diagnostic and skipped, and the rest of the netlist is still read.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    diagnostics: Vec<DcError>,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            diagnostics: Vec::new(),
        }
    }

    /// Parse the entire netlist.
    pub fn parse(mut self) -> NetlistAst {
        let mut ast = NetlistAst::new();

        while let Some(line) = self.lexer.next() {
            let statement = match self.parse_line(&line) {
                Ok(statement) => statement,
                Err(err) => {
                    self.report(err);
                    if let Some(token) = unknown_token(&line) {
                        ast.statements.push(ParsedLine {
                            line: line.number,
                            statement: Statement::Unknown { token },
                        });
                    }
                    continue;
                }
            };

            ast.node_occurrences
                .extend(statement.node_names().into_iter().map(str::to_string));
            ast.statements.push(ParsedLine {
                line: line.number,
                statement,
            });
        }

        ast.diagnostics = self.diagnostics;
        ast
    }

    fn report(&mut self, err: DcError) {
        log::warn!("{}", err);
        self.diagnostics.push(err);
    }

    fn parse_line(&mut self, line: &Line<'_>) -> Result<Statement> {
        let head = line.head();
        if head.starts_with('.') {
            return self.parse_directive(line);
        }

        let kind = head.chars().next().map(|c| c.to_ascii_uppercase());
        let statement = match kind {
            Some('V') => Statement::VoltageSource(two_terminal(line, "voltage")?),
            Some('I') => Statement::CurrentSource(two_terminal(line, "current")?),
            Some('R') => Statement::Resistor(two_terminal(line, "resistance")?),
            Some('C') => Statement::Capacitor(two_terminal(line, "capacitance")?),
            Some('L') => Statement::Inductor(two_terminal(line, "inductance")?),
            Some('M') => Statement::Mosfet(MosfetDef {
                name: head.to_string(),
                drain: field(line, 1, "drain node")?.to_string(),
                gate: field(line, 2, "gate node")?.to_string(),
                source: field(line, 3, "source node")?.to_string(),
                model: field(line, 4, "model ID")?.to_string(),
                width: number(line, 5, "width")?,
                length: number(line, 6, "length")?,
            }),
            Some('E') => Statement::Vcvs(voltage_controlled(line, "gain")?),
            Some('G') => Statement::Vccs(voltage_controlled(line, "transconductance")?),
            Some('F') => Statement::Cccs(current_controlled(line, "gain")?),
            Some('H') => Statement::Ccvs(current_controlled(line, "transresistance")?),
            _ => return Err(DcError::unknown_element(head, line.number)),
        };
        Ok(statement)
    }

    fn parse_directive(&mut self, line: &Line<'_>) -> Result<Statement> {
        let directive = line.head();

        match directive.to_ascii_uppercase().as_str() {
            ".MODEL" => self.parse_model(line).map(Statement::Model),
            ".PLOTNV" => Ok(Statement::Plot {
                node: field(line, 1, "node")?.to_string(),
            }),
            ".ALIAS" => Ok(Statement::Alias {
                a: field(line, 1, "node")?.to_string(),
                b: field(line, 2, "node")?.to_string(),
            }),
            ".HB" => {
                let frequency = number(line, 1, "frequency")?;
                let duration = number(line, 2, "duration")?;
                log::info!(
                    "line {}: harmonic-balance request (frequency {} Hz, duration {} s) recorded, not simulated",
                    line.number,
                    frequency,
                    duration
                );
                Ok(Statement::HarmonicBalance {
                    frequency,
                    duration,
                })
            }
            _ => Err(DcError::unknown_element(directive, line.number)),
        }
    }

    /// `.MODEL <id> [NMOS|PMOS] [KEY VALUE]...`
    ///
    /// `KEY=VALUE` pairs and a parenthesized parameter list are accepted too.
    fn parse_model(&mut self, line: &Line<'_>) -> Result<MosfetModel> {
        let name = field(line, 1, "model ID")?;

        let mut rest: Vec<&str> = line.tokens[2..]
            .iter()
            .flat_map(|t| t.trim_matches(|c| c == '(' || c == ')').split('='))
            .filter(|t| !t.is_empty())
            .collect();

        let polarity = match rest.first().and_then(|t| Polarity::from_keyword(t)) {
            Some(polarity) => {
                rest.remove(0);
                polarity
            }
            None => Polarity::Nmos,
        };

        if rest.len() % 2 != 0 {
            return Err(DcError::parse(
                line.number,
                format!("model parameter '{}' has no value", rest[rest.len() - 1]),
            ));
        }

        let mut model = MosfetModel::new(name, polarity);
        let mut unknown = Vec::new();
        for pair in rest.chunks(2) {
            let value = parse_value(pair[1]).ok_or_else(|| {
                DcError::parse(
                    line.number,
                    format!("invalid value '{}' for model parameter {}", pair[1], pair[0]),
                )
            })?;
            if !model.set_param(pair[0], value) {
                unknown.push(pair[0]);
            }
        }

        for key in unknown {
            self.report(DcError::parse(
                line.number,
                format!(
                    "unknown parameter '{}' in model {} ignored (expected one of {})",
                    key,
                    name,
                    MosfetModel::PARAM_KEYS.join(", ")
                ),
            ));
        }

        Ok(model)
    }
}

/// Token for the `Unknown` statement when the line failed classification.
fn unknown_token(line: &Line<'_>) -> Option<String> {
    let head = line.head();
    let known = head.starts_with('.')
        && matches!(
            head.to_ascii_uppercase().as_str(),
            ".MODEL" | ".PLOTNV" | ".ALIAS" | ".HB"
        );
    let known = known
        || (!head.starts_with('.')
            && head
                .chars()
                .next()
                .map(|c| "VIRCLMEGFH".contains(c.to_ascii_uppercase()))
                .unwrap_or(false));
    (!known).then(|| head.to_string())
}

fn field<'a>(line: &Line<'a>, index: usize, what: &str) -> Result<&'a str> {
    line.tokens.get(index).copied().ok_or_else(|| {
        DcError::parse(
            line.number,
            format!("{}: missing {} (field {})", line.head(), what, index + 1),
        )
    })
}

fn number(line: &Line<'_>, index: usize, what: &str) -> Result<f64> {
    let text = field(line, index, what)?;
    parse_value(text).ok_or_else(|| {
        DcError::parse(
            line.number,
            format!("{}: invalid {} '{}'", line.head(), what, text),
        )
    })
}

fn two_terminal(line: &Line<'_>, what: &str) -> Result<TwoTerminalDef> {
    Ok(TwoTerminalDef {
        name: line.head().to_string(),
        nodes: [
            field(line, 1, "node")?.to_string(),
            field(line, 2, "node")?.to_string(),
        ],
        value: number(line, 3, what)?,
    })
}

fn voltage_controlled(line: &Line<'_>, what: &str) -> Result<VoltageControlledDef> {
    Ok(VoltageControlledDef {
        name: line.head().to_string(),
        nodes: [
            field(line, 1, "node")?.to_string(),
            field(line, 2, "node")?.to_string(),
        ],
        control: [
            field(line, 3, "control node")?.to_string(),
            field(line, 4, "control node")?.to_string(),
        ],
        gain: number(line, 5, what)?,
    })
}

fn current_controlled(line: &Line<'_>, what: &str) -> Result<CurrentControlledDef> {
    Ok(CurrentControlledDef {
        name: line.head().to_string(),
        nodes: [
            field(line, 1, "node")?.to_string(),
            field(line, 2, "node")?.to_string(),
        ],
        controller: field(line, 3, "controlling source")?.to_string(),
        gain: number(line, 4, what)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> NetlistAst {
        Parser::new(Lexer::new(input)).parse()
    }

    #[test]
    fn test_parse_resistor() {
        let ast = parse("R1 in out 10k");
        assert_eq!(ast.statements.len(), 1);
        match &ast.statements[0].statement {
            Statement::Resistor(r) => {
                assert_eq!(r.name, "R1");
                assert_eq!(r.nodes, ["in".to_string(), "out".to_string()]);
                assert_eq!(r.value, 10_000.0);
            }
            other => panic!("expected resistor, got {:?}", other),
        }
        assert_eq!(ast.node_occurrences, vec!["in", "out"]);
    }

    #[test]
    fn test_parse_mosfet_occurrence_order() {
        let ast = parse("M1 d g s NCH 10u 1u");
        assert_eq!(ast.node_occurrences, vec!["d", "g", "s"]);
        match &ast.statements[0].statement {
            Statement::Mosfet(m) => {
                assert_eq!(m.model, "NCH");
                assert!((m.width - 10e-6).abs() < 1e-18);
                assert!((m.length - 1e-6).abs() < 1e-18);
            }
            other => panic!("expected mosfet, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_model_defaults() {
        let ast = parse(".MODEL NCH VT 0.7 MU 0.05");
        match &ast.statements[0].statement {
            Statement::Model(m) => {
                assert_eq!(m.name, "NCH");
                assert_eq!(m.polarity, Polarity::Nmos);
                assert_eq!(m.vt, 0.7);
                assert_eq!(m.mu, 0.05);
                assert_eq!(m.cox, 0.0);
                assert_eq!(m.lambda, 0.0);
                assert_eq!(m.cj0, 0.0);
            }
            other => panic!("expected model, got {:?}", other),
        }
        assert!(ast.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_model_polarity_and_spice_syntax() {
        let ast = parse(".model PCH PMOS (VT=-0.8 LAMBDA=0.02)");
        match &ast.statements[0].statement {
            Statement::Model(m) => {
                assert_eq!(m.polarity, Polarity::Pmos);
                assert_eq!(m.vt, -0.8);
                assert_eq!(m.lambda, 0.02);
            }
            other => panic!("expected model, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_model_unknown_key_is_diagnostic() {
        let ast = parse(".MODEL NCH VT 1 KP 2e-5");
        assert_eq!(ast.statements.len(), 1);
        assert_eq!(ast.diagnostics.len(), 1);
        assert!(matches!(ast.diagnostics[0], DcError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_parse_model_missing_value() {
        let ast = parse(".MODEL NCH VT");
        assert!(ast.statements.is_empty());
        assert!(matches!(ast.diagnostics[0], DcError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_malformed_number_skips_line_only() {
        let ast = parse("R1 a b 1x2\nR2 a GND 1k");
        assert_eq!(ast.statements.len(), 1);
        assert_eq!(ast.diagnostics.len(), 1);
        assert!(matches!(ast.diagnostics[0], DcError::ParseError { line: 1, .. }));
        // Skipped line contributes no node occurrences
        assert_eq!(ast.node_occurrences, vec!["a", "GND"]);
    }

    #[test]
    fn test_unknown_element_continues() {
        let ast = parse("Q1 c b e NPN\n.tran 1n 1u\nR1 a GND 1k");
        assert_eq!(ast.diagnostics.len(), 2);
        assert!(matches!(
            ast.diagnostics[0],
            DcError::UnknownElement { ref token, line: 1 } if token == "Q1"
        ));
        assert!(matches!(
            ast.diagnostics[1],
            DcError::UnknownElement { ref token, line: 2 } if token == ".tran"
        ));
        let unknown = ast
            .statements
            .iter()
            .filter(|s| matches!(s.statement, Statement::Unknown { .. }))
            .count();
        assert_eq!(unknown, 2);
        assert_eq!(ast.statements.len(), 3);
    }

    #[test]
    fn test_directives() {
        let ast = parse(".PLOTNV out\n.hb 1e3 0.01\n.ALIAS vss GND");
        assert_eq!(
            ast.statements[0].statement,
            Statement::Plot {
                node: "out".to_string()
            }
        );
        assert_eq!(
            ast.statements[1].statement,
            Statement::HarmonicBalance {
                frequency: 1e3,
                duration: 0.01
            }
        );
        assert_eq!(
            ast.statements[2].statement,
            Statement::Alias {
                a: "vss".to_string(),
                b: "GND".to_string()
            }
        );
        assert!(ast.node_occurrences.is_empty());
    }

    #[test]
    fn test_controlled_sources() {
        let ast = parse("E1 out GND in GND 10\nF1 out GND VSENSE 2");
        assert_eq!(ast.node_occurrences, vec!["out", "GND", "in", "GND", "out", "GND"]);
        match &ast.statements[1].statement {
            Statement::Cccs(f) => {
                assert_eq!(f.controller, "VSENSE");
                assert_eq!(f.gain, 2.0);
            }
            other => panic!("expected cccs, got {:?}", other),
        }
    }

    #[test]
    fn test_lowercase_element_letters() {
        let ast = parse("v1 a 0 5\nr1 a 0 1k");
        assert!(ast.diagnostics.is_empty());
        assert!(matches!(ast.statements[0].statement, Statement::VoltageSource(_)));
        assert!(matches!(ast.statements[1].statement, Statement::Resistor(_)));
    }
}
