//! Plain-text rendering of results.

use std::fmt::Write;

use crate::circuit::{Circuit, NodeId};
use crate::solver::NodeVoltages;

use super::DeviceReport;

/// Render node voltages, one per line.
///
/// Only `.PLOTNV` nodes are listed when the netlist selected any; otherwise
/// every non-ground node is, in index order.
pub fn format_node_voltages(circuit: &Circuit, voltages: &NodeVoltages) -> String {
    let selected: Vec<NodeId> = if circuit.plot_nodes().is_empty() {
        circuit
            .nodes()
            .iter()
            .map(|n| n.index)
            .filter(|n| !n.is_ground())
            .collect()
    } else {
        circuit.plot_nodes().to_vec()
    };

    let mut out = String::new();
    for node in selected {
        let _ = writeln!(
            out,
            "V({}) = {:.6} V",
            circuit.node_name(node),
            voltages.get(node)
        );
    }
    out
}

/// Render the device report as an aligned table.
pub fn format_device_report(report: &DeviceReport) -> String {
    let width = report
        .iter()
        .map(|e| e.name.len())
        .max()
        .unwrap_or(0)
        .max("Device".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:<14}  {:>14}  {:>14}",
        "Device",
        "Kind",
        "Current (A)",
        "Power (W)",
        width = width
    );

    for entry in report.iter() {
        let _ = write!(
            out,
            "{:<width$}  {:<14}  {:>14.6e}  {:>14.6e}",
            entry.name,
            entry.kind.to_string(),
            entry.current,
            entry.power,
            width = width
        );
        if let Some(op) = &entry.mosfet {
            let _ = write!(
                out,
                "  [{}] VGS={:.4} VDS={:.4} gm={:.4e} gds={:.4e}",
                op.region, op.vgs, op.vds, op.gm, op.gds
            );
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "Total delivered: {:.6e} W, total absorbed: {:.6e} W",
        report.total_delivered(),
        report.total_absorbed()
    );
    out
}
