//! Circuit registry.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::naming::NodeNamer;
use super::types::{is_ground_name, BranchId, DeviceId, Node, NodeId, GROUND_NAME};
use crate::components::{
    Capacitor, Cccs, Ccvs, Component, CurrentSource, Inductor, Mosfet, MosfetModel, Polarity,
    Resistor, Vccs, Vcvs, VoltageSource,
};
use crate::error::{DcError, Result};
use crate::netlist::{NetlistAst, Statement};

/// An analysis requested by the netlist but not performed by the DC solver.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    /// `.hb <frequency> <duration>`
    HarmonicBalance { frequency: f64, duration: f64 },
}

/// A complete circuit ready for analysis.
///
/// The circuit is append-only while it is built and read-only afterward:
/// analysis borrows it immutably.
#[derive(Debug)]
pub struct Circuit {
    /// Canonical nodes in index order; ground is node 0
    nodes: Vec<Node>,

    /// Every known spelling (aliases included) to its node
    node_map: HashMap<String, NodeId>,

    /// All devices in registration order
    devices: Vec<Component>,

    /// Device name to device ID
    device_map: HashMap<String, DeviceId>,

    /// MOSFET models in definition order
    models: IndexMap<String, MosfetModel>,

    /// Nodes selected by `.PLOTNV`
    plot_nodes: Vec<NodeId>,

    /// Recorded, not simulated
    analyses: Vec<AnalysisRequest>,

    /// Number of auxiliary branch-current unknowns
    num_branches: usize,

    /// Non-fatal problems found while building
    diagnostics: Vec<DcError>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl Circuit {
    /// Create an empty circuit containing only the ground node.
    pub fn new() -> Self {
        let mut node_map = HashMap::new();
        node_map.insert(GROUND_NAME.to_string(), NodeId::GROUND);
        node_map.insert("0".to_string(), NodeId::GROUND);

        Self {
            nodes: vec![Node {
                index: NodeId::GROUND,
                name: GROUND_NAME.to_string(),
            }],
            node_map,
            devices: Vec::new(),
            device_map: HashMap::new(),
            models: IndexMap::new(),
            plot_nodes: Vec::new(),
            analyses: Vec::new(),
            num_branches: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Build a circuit from a parsed netlist.
    ///
    /// Node names are canonicalized first, then models, then devices.
    /// Current-controlled sources are registered after every other device
    /// so their controlling voltage source may appear anywhere in the text.
    /// Per-line and per-device problems are collected in
    /// [`diagnostics`](Self::diagnostics); structural errors are returned.
    pub fn from_ast(ast: NetlistAst) -> Result<Self> {
        let mut circuit = Circuit::new();
        circuit.diagnostics = ast.diagnostics;

        // Canonicalize node names; aliases are merged before any is judged
        let mut namer = NodeNamer::new();
        namer.observe_all(ast.node_occurrences.iter().map(String::as_str));
        let aliases: Vec<(usize, &str, &str)> = ast
            .statements
            .iter()
            .filter_map(|parsed| match &parsed.statement {
                Statement::Alias { a, b } => Some((parsed.line, a.as_str(), b.as_str())),
                _ => None,
            })
            .collect();
        for &(_, a, b) in &aliases {
            namer.alias(a, b);
        }

        let mapping = namer.canonicalize();
        for &(line, a, b) in &aliases {
            if mapping.get(a).is_none() {
                circuit.report(DcError::parse(
                    line,
                    format!("alias {} = {} names no node used by any device", a, b),
                ));
            }
        }

        for node in mapping.nodes().iter().skip(1) {
            circuit.add_node(&node.name);
        }
        for (spelling, id) in mapping.spellings() {
            circuit.node_map.entry(spelling.to_string()).or_insert(id);
        }

        // Models before devices so MOSFETs resolve their polarity
        for parsed in &ast.statements {
            if let Statement::Model(model) = &parsed.statement {
                let result = circuit.add_model(model.clone());
                circuit.absorb(result)?;
            }
        }

        let (deferred, immediate): (Vec<_>, Vec<_>) = ast
            .statements
            .iter()
            .filter(|p| p.statement.is_device())
            .partition(|p| matches!(p.statement, Statement::Cccs(_) | Statement::Ccvs(_)));

        for parsed in immediate.into_iter().chain(deferred) {
            let result = circuit.add_statement(&parsed.statement);
            circuit.absorb(result)?;
        }

        for parsed in &ast.statements {
            match &parsed.statement {
                Statement::Plot { node } => {
                    if let Err(err) = circuit.add_plot_node(node) {
                        log::debug!("{}", err);
                        circuit.report(DcError::parse(
                            parsed.line,
                            format!(".PLOTNV node '{}' is not used by any device", node),
                        ));
                    }
                }
                Statement::HarmonicBalance {
                    frequency,
                    duration,
                } => circuit.add_analysis(AnalysisRequest::HarmonicBalance {
                    frequency: *frequency,
                    duration: *duration,
                }),
                _ => {}
            }
        }

        log::debug!(
            "circuit built: {} nodes, {} devices, {} branches, {} models, {} diagnostics",
            circuit.num_nodes(),
            circuit.devices.len(),
            circuit.num_branches,
            circuit.models.len(),
            circuit.diagnostics.len()
        );

        Ok(circuit)
    }

    fn add_statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::VoltageSource(d) => {
                self.add_voltage_source(&d.name, pair(&d.nodes), d.value)?;
            }
            Statement::CurrentSource(d) => {
                self.add_current_source(&d.name, pair(&d.nodes), d.value)?;
            }
            Statement::Resistor(d) => {
                self.add_resistor(&d.name, pair(&d.nodes), d.value)?;
            }
            Statement::Capacitor(d) => {
                self.add_capacitor(&d.name, pair(&d.nodes), d.value)?;
            }
            Statement::Inductor(d) => {
                self.add_inductor(&d.name, pair(&d.nodes), d.value)?;
            }
            Statement::Mosfet(m) => {
                self.add_mosfet(
                    &m.name,
                    [m.drain.as_str(), m.gate.as_str(), m.source.as_str()],
                    &m.model,
                    m.width,
                    m.length,
                )?;
            }
            Statement::Vcvs(d) => {
                self.add_vcvs(
                    &d.name,
                    pair(&d.nodes),
                    pair(&d.control),
                    d.gain,
                )?;
            }
            Statement::Vccs(d) => {
                self.add_vccs(
                    &d.name,
                    pair(&d.nodes),
                    pair(&d.control),
                    d.gain,
                )?;
            }
            Statement::Cccs(d) => {
                self.add_cccs(&d.name, pair(&d.nodes), &d.controller, d.gain)?;
            }
            Statement::Ccvs(d) => {
                self.add_ccvs(&d.name, pair(&d.nodes), &d.controller, d.gain)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Keep a non-fatal error as a diagnostic, propagate a fatal one.
    fn absorb(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                self.report(err);
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    fn report(&mut self, err: DcError) {
        log::warn!("{}", err);
        self.diagnostics.push(err);
    }

    // ============ Registration ============

    /// Register a node under the given name, returning its index.
    ///
    /// A name that is already known returns its existing index; ground
    /// spellings always return [`NodeId::GROUND`].
    pub fn add_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.node_map.get(name) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            index: id,
            name: name.to_string(),
        });
        self.node_map.insert(name.to_string(), id);
        id
    }

    /// Register a MOSFET model. Model IDs are unique.
    pub fn add_model(&mut self, model: MosfetModel) -> Result<()> {
        if self.models.contains_key(&model.name) {
            return Err(DcError::DuplicateModel { name: model.name });
        }
        self.models.insert(model.name.clone(), model);
        Ok(())
    }

    /// Select a node for output.
    pub fn add_plot_node(&mut self, name: &str) -> Result<NodeId> {
        let id = self.resolve(name)?;
        if !self.plot_nodes.contains(&id) {
            self.plot_nodes.push(id);
        }
        Ok(id)
    }

    /// Record an analysis request.
    pub fn add_analysis(&mut self, request: AnalysisRequest) {
        self.analyses.push(request);
    }

    /// Add a resistor between two nodes.
    pub fn add_resistor(&mut self, name: &str, nodes: [&str; 2], resistance: f64) -> Result<DeviceId> {
        let nodes = self.resolve_all(nodes)?;
        self.check_unique(name)?;
        let r = Resistor::new(self.next_id(), name.to_string(), nodes, resistance)?;
        Ok(self.push(Component::Resistor(r)))
    }

    /// Add a capacitor (open at DC).
    pub fn add_capacitor(&mut self, name: &str, nodes: [&str; 2], capacitance: f64) -> Result<DeviceId> {
        let nodes = self.resolve_all(nodes)?;
        self.check_unique(name)?;
        let c = Capacitor::new(self.next_id(), name.to_string(), nodes, capacitance);
        Ok(self.push(Component::Capacitor(c)))
    }

    /// Add an inductor (open at DC).
    pub fn add_inductor(&mut self, name: &str, nodes: [&str; 2], inductance: f64) -> Result<DeviceId> {
        let nodes = self.resolve_all(nodes)?;
        self.check_unique(name)?;
        let l = Inductor::new(self.next_id(), name.to_string(), nodes, inductance);
        Ok(self.push(Component::Inductor(l)))
    }

    /// Add an independent voltage source. Allocates one branch.
    pub fn add_voltage_source(&mut self, name: &str, nodes: [&str; 2], voltage: f64) -> Result<DeviceId> {
        let nodes = self.resolve_all(nodes)?;
        self.check_unique(name)?;
        let branch = self.allocate_branch();
        let v = VoltageSource::new(self.next_id(), name.to_string(), nodes, voltage, branch);
        Ok(self.push(Component::VoltageSource(v)))
    }

    /// Add an independent current source.
    pub fn add_current_source(&mut self, name: &str, nodes: [&str; 2], current: f64) -> Result<DeviceId> {
        let nodes = self.resolve_all(nodes)?;
        self.check_unique(name)?;
        let i = CurrentSource::new(self.next_id(), name.to_string(), nodes, current);
        Ok(self.push(Component::CurrentSource(i)))
    }

    /// Add a MOSFET. Terminals are `[drain, gate, source]`.
    ///
    /// Polarity comes from the referenced model. A missing model is
    /// recorded as a diagnostic and the device is kept; it stamps nothing.
    pub fn add_mosfet(
        &mut self,
        name: &str,
        nodes: [&str; 3],
        model: &str,
        width: f64,
        length: f64,
    ) -> Result<DeviceId> {
        let nodes = self.resolve_all(nodes)?;
        self.check_unique(name)?;

        let polarity = match self.models.get(model) {
            Some(m) => m.polarity,
            None => Polarity::Nmos,
        };
        let m = Mosfet::new(
            self.next_id(),
            name.to_string(),
            nodes,
            model.to_string(),
            width,
            length,
            polarity,
        )?;

        if !self.models.contains_key(model) {
            self.report(DcError::UnknownModel {
                model: model.to_string(),
                device: name.to_string(),
            });
        }
        Ok(self.push(Component::Mosfet(m)))
    }

    /// Add a voltage-controlled voltage source. Allocates one branch.
    pub fn add_vcvs(
        &mut self,
        name: &str,
        nodes: [&str; 2],
        control: [&str; 2],
        gain: f64,
    ) -> Result<DeviceId> {
        let nodes = self.resolve_all(nodes)?;
        let control = self.resolve_all(control)?;
        self.check_unique(name)?;
        let branch = self.allocate_branch();
        let e = Vcvs {
            id: self.next_id(),
            name: name.to_string(),
            nodes,
            control,
            gain,
            branch,
        };
        Ok(self.push(Component::Vcvs(e)))
    }

    /// Add a voltage-controlled current source.
    pub fn add_vccs(
        &mut self,
        name: &str,
        nodes: [&str; 2],
        control: [&str; 2],
        transconductance: f64,
    ) -> Result<DeviceId> {
        let nodes = self.resolve_all(nodes)?;
        let control = self.resolve_all(control)?;
        self.check_unique(name)?;
        let g = Vccs {
            id: self.next_id(),
            name: name.to_string(),
            nodes,
            control,
            transconductance,
        };
        Ok(self.push(Component::Vccs(g)))
    }

    /// Add a current-controlled current source sensing the named voltage
    /// source.
    pub fn add_cccs(&mut self, name: &str, nodes: [&str; 2], controller: &str, gain: f64) -> Result<DeviceId> {
        let nodes = self.resolve_all(nodes)?;
        self.check_unique(name)?;
        let control_branch = self.controller_branch(name, controller)?;
        let f = Cccs {
            id: self.next_id(),
            name: name.to_string(),
            nodes,
            controller: controller.to_string(),
            control_branch,
            gain,
        };
        Ok(self.push(Component::Cccs(f)))
    }

    /// Add a current-controlled voltage source sensing the named voltage
    /// source. Allocates one branch.
    pub fn add_ccvs(
        &mut self,
        name: &str,
        nodes: [&str; 2],
        controller: &str,
        transresistance: f64,
    ) -> Result<DeviceId> {
        let nodes = self.resolve_all(nodes)?;
        self.check_unique(name)?;
        let control_branch = self.controller_branch(name, controller)?;
        let branch = self.allocate_branch();
        let h = Ccvs {
            id: self.next_id(),
            name: name.to_string(),
            nodes,
            controller: controller.to_string(),
            control_branch,
            transresistance,
            branch,
        };
        Ok(self.push(Component::Ccvs(h)))
    }

    fn resolve(&self, name: &str) -> Result<NodeId> {
        self.find_node(name).ok_or_else(|| DcError::UnknownNode {
            node: name.to_string(),
        })
    }

    fn resolve_all<const K: usize>(&self, names: [&str; K]) -> Result<[NodeId; K]> {
        let mut ids = [NodeId::GROUND; K];
        for (slot, name) in ids.iter_mut().zip(names) {
            *slot = self.resolve(name)?;
        }
        Ok(ids)
    }

    fn check_unique(&self, name: &str) -> Result<()> {
        if self.device_map.contains_key(name) {
            return Err(DcError::DuplicateDevice {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn controller_branch(&self, device: &str, controller: &str) -> Result<BranchId> {
        match self.device(controller) {
            Some(Component::VoltageSource(v)) => Ok(v.branch),
            _ => Err(DcError::UnknownController {
                controller: controller.to_string(),
                device: device.to_string(),
            }),
        }
    }

    fn next_id(&self) -> DeviceId {
        DeviceId(self.devices.len())
    }

    fn allocate_branch(&mut self) -> BranchId {
        let branch = BranchId(self.num_branches);
        self.num_branches += 1;
        branch
    }

    fn push(&mut self, device: Component) -> DeviceId {
        let id = device.id();
        self.device_map.insert(device.name().to_string(), id);
        self.devices.push(device);
        id
    }

    // ============ Queries ============

    /// Canonical nodes in index order (ground first).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Find a node ID by any of its spellings.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        if is_ground_name(name) {
            return Some(NodeId::GROUND);
        }
        self.node_map.get(name).copied()
    }

    /// Get the canonical name of a node.
    pub fn node_name(&self, node: NodeId) -> &str {
        self.nodes
            .get(node.0)
            .map(|n| n.name.as_str())
            .unwrap_or("?")
    }

    /// All devices in registration order.
    pub fn devices(&self) -> &[Component] {
        &self.devices
    }

    /// Find a device by name.
    pub fn device(&self, name: &str) -> Option<&Component> {
        self.device_map.get(name).map(|id| &self.devices[id.0])
    }

    /// MOSFET models in definition order.
    pub fn models(&self) -> impl Iterator<Item = &MosfetModel> {
        self.models.values()
    }

    /// Find a MOSFET model by ID.
    pub fn model(&self, name: &str) -> Option<&MosfetModel> {
        self.models.get(name)
    }

    /// Nodes selected for output, in directive order.
    pub fn plot_nodes(&self) -> &[NodeId] {
        &self.plot_nodes
    }

    /// Recorded analysis requests.
    pub fn analyses(&self) -> &[AnalysisRequest] {
        &self.analyses
    }

    /// Non-fatal problems found while building the circuit.
    pub fn diagnostics(&self) -> &[DcError] {
        &self.diagnostics
    }

    /// Number of nodes, ground included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of auxiliary branch-current unknowns.
    pub fn num_branches(&self) -> usize {
        self.num_branches
    }

    /// Check whether any device stamps depend on the voltage estimate.
    pub fn is_nonlinear(&self) -> bool {
        self.devices.iter().any(Component::is_nonlinear)
    }

    /// Get the total size of the MNA system: every node (ground included,
    /// then pinned) plus branch currents.
    pub fn matrix_size(&self) -> usize {
        self.num_nodes() + self.num_branches
    }

    /// Get the matrix index for a branch current.
    pub fn branch_index(&self, branch: BranchId) -> usize {
        self.num_nodes() + branch.0
    }
}

fn pair(names: &[String; 2]) -> [&str; 2] {
    [names[0].as_str(), names[1].as_str()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::{Lexer, Parser};

    fn build(text: &str) -> Result<Circuit> {
        Circuit::from_ast(Parser::new(Lexer::new(text)).parse())
    }

    #[test]
    fn test_ground_and_first_seen_order() {
        let circuit = build("R1 a b 1k\nV1 b GND 5\nR2 c 0 2k").unwrap();
        let names: Vec<_> = circuit.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["GND", "a", "b", "c"]);
        assert_eq!(circuit.find_node("0"), Some(NodeId::GROUND));
        assert_eq!(circuit.matrix_size(), 5);
        assert_eq!(circuit.branch_index(BranchId(0)), 4);
    }

    #[test]
    fn test_branches_in_registration_order() {
        let circuit = build("V1 a GND 1\nR1 a b 1k\nE1 b GND a GND 2\nV2 c GND 3\nR2 c GND 1").unwrap();
        assert_eq!(circuit.device("V1").and_then(Component::branch), Some(BranchId(0)));
        assert_eq!(circuit.device("E1").and_then(Component::branch), Some(BranchId(1)));
        assert_eq!(circuit.device("V2").and_then(Component::branch), Some(BranchId(2)));
        assert_eq!(circuit.num_branches(), 3);
    }

    #[test]
    fn test_unknown_model_is_diagnostic() {
        let circuit = build("V1 d GND 1\nM1 d d GND NOPE 1u 1u").unwrap();
        assert_eq!(circuit.devices().len(), 2);
        assert!(circuit
            .diagnostics()
            .iter()
            .any(|d| matches!(d, DcError::UnknownModel { model, .. } if model == "NOPE")));
    }

    #[test]
    fn test_model_polarity_reaches_device() {
        let circuit = build(".MODEL PCH PMOS VT -1\nM1 d g s PCH 2u 1u\nV1 s GND 5").unwrap();
        match circuit.device("M1") {
            Some(Component::Mosfet(m)) => assert_eq!(m.polarity, Polarity::Pmos),
            other => panic!("expected mosfet, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicates_keep_first() {
        let circuit = build(".MODEL N VT 1\n.MODEL N VT 2\nR1 a GND 1k\nR1 a GND 2k").unwrap();
        assert_eq!(circuit.devices().len(), 1);
        assert_eq!(circuit.model("N").map(|m| m.vt), Some(1.0));
        assert_eq!(circuit.diagnostics().len(), 2);
    }

    #[test]
    fn test_invalid_parameter_skips_device() {
        let circuit = build("R1 a GND 0\nR2 a GND 1k\nM1 a a GND X 0 1u").unwrap();
        let names: Vec<_> = circuit.devices().iter().map(Component::name).collect();
        assert_eq!(names, vec!["R2"]);
        assert!(circuit
            .diagnostics()
            .iter()
            .all(|d| matches!(d, DcError::InvalidParameter { .. })));
    }

    #[test]
    fn test_current_controlled_resolves_later_source() {
        let circuit = build("F1 out GND VS 2\nR1 out GND 1k\nVS a GND 1\nR2 a GND 1k").unwrap();
        assert!(circuit.diagnostics().is_empty());
        match circuit.device("F1") {
            Some(Component::Cccs(f)) => assert_eq!(f.control_branch, BranchId(0)),
            other => panic!("expected cccs, got {:?}", other),
        }
        // Deferred past every other device
        assert_eq!(circuit.devices().last().map(Component::name), Some("F1"));
    }

    #[test]
    fn test_unknown_controller() {
        let circuit = build("R1 a GND 1k\nH1 a GND R1 10").unwrap();
        assert_eq!(circuit.devices().len(), 1);
        assert!(matches!(
            circuit.diagnostics()[0],
            DcError::UnknownController { ref controller, .. } if controller == "R1"
        ));
    }

    #[test]
    fn test_alias_merges_nodes() {
        let circuit = build("V1 top GND 5\nR1 top_alias GND 1k\n.ALIAS top_alias top").unwrap();
        assert_eq!(circuit.num_nodes(), 2);
        assert_eq!(circuit.find_node("top_alias"), circuit.find_node("top"));
    }

    #[test]
    fn test_alias_chain_resolves_in_any_order() {
        let circuit = build("V1 a GND 1\nR1 a GND 1k\n.ALIAS x y\n.ALIAS y a\n.PLOTNV x").unwrap();
        assert!(circuit.diagnostics().is_empty());
        let a = circuit.find_node("a");
        assert_eq!(circuit.find_node("x"), a);
        assert_eq!(circuit.find_node("y"), a);
        assert_eq!(circuit.plot_nodes(), &[NodeId(1)]);
    }

    #[test]
    fn test_dangling_alias_is_diagnostic() {
        let circuit = build("V1 a GND 1\nR1 a GND 1k\n.ALIAS p q").unwrap();
        assert_eq!(circuit.num_nodes(), 2);
        assert_eq!(circuit.find_node("p"), None);
        assert!(matches!(circuit.diagnostics()[0], DcError::ParseError { line: 3, .. }));
    }

    #[test]
    fn test_plot_and_analysis_directives() {
        let circuit = build("V1 a GND 1\nR1 a GND 1\n.PLOTNV a\n.PLOTNV missing\n.hb 1k 1m").unwrap();
        assert_eq!(circuit.plot_nodes(), &[NodeId(1)]);
        assert_eq!(circuit.analyses().len(), 1);
        assert!(matches!(circuit.diagnostics()[0], DcError::ParseError { line: 4, .. }));
    }

    #[test]
    fn test_direct_api_unknown_node_is_error() {
        let mut circuit = Circuit::new();
        let a = circuit.add_node("a");
        assert_eq!(a, NodeId(1));
        assert_eq!(circuit.add_node("a"), a);
        let err = circuit.add_resistor("R1", ["a", "b"], 1.0).unwrap_err();
        assert!(matches!(err, DcError::UnknownNode { .. }));
        assert!(err.is_fatal());
        assert!(circuit.devices().is_empty());
    }

    #[test]
    fn test_rejected_source_allocates_no_branch() {
        let mut circuit = Circuit::new();
        circuit.add_node("a");
        circuit.add_voltage_source("V1", ["a", "GND"], 1.0).unwrap();
        assert!(circuit.add_voltage_source("V1", ["a", "GND"], 2.0).is_err());
        assert_eq!(circuit.num_branches(), 1);
    }
}
