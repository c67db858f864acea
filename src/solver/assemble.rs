//! Matrix assembly.
//!
//! Assembly is a pure function of the circuit, the node-voltage estimate and
//! the current-source convention. Every call builds a fresh [`MnaMatrix`].

use crate::circuit::Circuit;
use crate::components::{Component, SmallSignal};

use super::mna::{CurrentStampPolarity, MnaMatrix};
use super::solution::NodeVoltages;

/// Build the pinned MNA system for one pass.
pub fn assemble(
    circuit: &Circuit,
    estimate: &NodeVoltages,
    polarity: CurrentStampPolarity,
) -> MnaMatrix {
    let mut matrix = MnaMatrix::new(circuit.num_nodes(), circuit.num_branches());
    stamp_linear_components(circuit, &mut matrix, polarity);
    stamp_nonlinear_components(circuit, &mut matrix, estimate);
    matrix.pin_ground();
    matrix
}

/// Stamp all linear components into the MNA matrix.
pub fn stamp_linear_components(
    circuit: &Circuit,
    matrix: &mut MnaMatrix,
    polarity: CurrentStampPolarity,
) {
    for component in circuit.devices() {
        match component {
            Component::Resistor(r) => {
                matrix.stamp_conductance(r.nodes[0], r.nodes[1], r.conductance());
            }

            Component::Capacitor(_) | Component::Inductor(_) => {
                log::trace!("{}: open at DC, not stamped", component.name());
            }

            Component::VoltageSource(v) => {
                let br = circuit.branch_index(v.branch);
                matrix.stamp_voltage_source(v.nodes[0], v.nodes[1], br, v.voltage);
            }

            Component::CurrentSource(i) => {
                matrix.stamp_current_source(i.nodes[0], i.nodes[1], i.current, polarity);
            }

            Component::Vcvs(e) => {
                let br = circuit.branch_index(e.branch);
                matrix.stamp_vcvs(e.nodes, e.control, br, e.gain);
            }

            Component::Vccs(g) => {
                matrix.stamp_vccs(g.nodes, g.control, g.transconductance);
            }

            Component::Cccs(f) => {
                let ctrl = circuit.branch_index(f.control_branch);
                matrix.stamp_cccs(f.nodes, ctrl, f.gain);
            }

            Component::Ccvs(h) => {
                let ctrl = circuit.branch_index(h.control_branch);
                let br = circuit.branch_index(h.branch);
                matrix.stamp_ccvs(h.nodes, ctrl, br, h.transresistance);
            }

            // Nonlinear components handled separately
            Component::Mosfet(_) => {}
        }
    }
}

/// Stamp every MOSFET linearized at the given estimate.
pub fn stamp_nonlinear_components(circuit: &Circuit, matrix: &mut MnaMatrix, estimate: &NodeVoltages) {
    for component in circuit.devices() {
        if let Component::Mosfet(m) = component {
            let ss = linearize_mosfet(circuit, component, estimate);
            if let Some(ss) = ss {
                matrix.stamp_conductance(m.drain(), m.source(), ss.gds);
                matrix.stamp_transconductance(m.drain(), m.source(), m.gate(), ss.stamp_gm());
            }
        }
    }
}

/// Linearize a MOSFET at the given voltages.
///
/// Returns `None` for other devices. A MOSFET whose model is missing is
/// reported as OFF.
pub fn linearize_mosfet(
    circuit: &Circuit,
    component: &Component,
    voltages: &NodeVoltages,
) -> Option<SmallSignal> {
    let Component::Mosfet(m) = component else {
        return None;
    };
    let ss = match circuit.model(&m.model) {
        Some(model) => m.evaluate(
            model,
            voltages.get(m.drain()),
            voltages.get(m.gate()),
            voltages.get(m.source()),
        ),
        None => SmallSignal::off(m.polarity),
    };
    Some(ss)
}
