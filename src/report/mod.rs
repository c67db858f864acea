//! Per-device currents and powers at a solved operating point.
//!
//! Sources report the power they deliver to the circuit; resistors and
//! MOSFETs report the power they absorb. For a consistent solution the two
//! totals match.

mod print;

pub use print::{format_device_report, format_node_voltages};

use crate::circuit::Circuit;
use crate::components::{Component, DeviceKind, Region};
use crate::solver::{linearize_mosfet, BranchCurrents, NodeVoltages};

/// MOSFET bias details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MosfetOperatingPoint {
    pub region: Region,
    /// Polarity-adjusted gate-source voltage
    pub vgs: f64,
    /// Polarity-adjusted drain-source voltage
    pub vds: f64,
    pub gm: f64,
    pub gds: f64,
    /// Current into the drain terminal
    pub drain_current: f64,
    /// Current into the source terminal
    pub source_current: f64,
    /// Current into the gate terminal
    pub gate_current: f64,
}

/// One device's row in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEntry {
    pub name: String,
    pub kind: DeviceKind,
    /// Terminal current (see [`compute_currents_and_powers`] for directions)
    pub current: f64,
    /// Delivered power for sources, absorbed power otherwise
    pub power: f64,
    /// Present for MOSFETs only
    pub mosfet: Option<MosfetOperatingPoint>,
}

impl DeviceEntry {
    /// Check whether this device is a source (its power is delivered).
    pub fn is_source(&self) -> bool {
        matches!(
            self.kind,
            DeviceKind::VoltageSource
                | DeviceKind::CurrentSource
                | DeviceKind::Vcvs
                | DeviceKind::Vccs
                | DeviceKind::Cccs
                | DeviceKind::Ccvs
        )
    }
}

/// Report for every device, in registration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceReport {
    pub entries: Vec<DeviceEntry>,
}

impl DeviceReport {
    /// Find an entry by device name.
    pub fn get(&self, name: &str) -> Option<&DeviceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceEntry> {
        self.entries.iter()
    }

    /// Total power delivered by sources.
    pub fn total_delivered(&self) -> f64 {
        self.entries.iter().filter(|e| e.is_source()).map(|e| e.power).sum()
    }

    /// Total power absorbed by passive devices and MOSFETs.
    pub fn total_absorbed(&self) -> f64 {
        self.entries.iter().filter(|e| !e.is_source()).map(|e| e.power).sum()
    }
}

/// Compute each device's current and power from solved voltages and branch
/// currents.
///
/// Current directions:
/// - resistor: from its first node to its second, `(V1 - V2) / R`;
/// - capacitor and inductor: 0 (open at DC);
/// - voltage source, VCVS, CCVS: delivered out of the positive terminal;
/// - current source: its value;
/// - VCCS, CCCS: the controlled current, flowing from `n+` through the
///   source to `n-`;
/// - MOSFET: into the drain.
pub fn compute_currents_and_powers(
    circuit: &Circuit,
    voltages: &NodeVoltages,
    currents: &BranchCurrents,
) -> DeviceReport {
    let v = |n| voltages.get(n);

    let entries = circuit
        .devices()
        .iter()
        .map(|device| {
            let mut mosfet = None;
            let (current, power) = match device {
                Component::Resistor(r) => {
                    let i = r.current(v(r.nodes[0]), v(r.nodes[1]));
                    (i, i * i * r.resistance)
                }
                Component::Capacitor(_) | Component::Inductor(_) => (0.0, 0.0),
                Component::VoltageSource(s) => {
                    let i = currents.delivered(s.branch);
                    (i, s.power(i))
                }
                Component::CurrentSource(s) => (s.current, s.power(v(s.nodes[0]), v(s.nodes[1]))),
                Component::Vcvs(e) => {
                    let i = currents.delivered(e.branch);
                    (i, (v(e.nodes[0]) - v(e.nodes[1])) * i)
                }
                Component::Ccvs(h) => {
                    let i = currents.delivered(h.branch);
                    (i, (v(h.nodes[0]) - v(h.nodes[1])) * i)
                }
                Component::Vccs(g) => {
                    let i = g.current(v(g.control[0]), v(g.control[1]));
                    (i, i * (v(g.nodes[1]) - v(g.nodes[0])))
                }
                Component::Cccs(f) => {
                    let i = f.gain * currents.raw(f.control_branch);
                    (i, i * (v(f.nodes[1]) - v(f.nodes[0])))
                }
                Component::Mosfet(m) => {
                    let (vd, vg, vs) = (v(m.drain()), v(m.gate()), v(m.source()));
                    let (ss, drain_current) = match linearize_mosfet(circuit, device, voltages) {
                        Some(ss) => (Some(ss), ss.drain_current(vd, vg, vs)),
                        None => (None, 0.0),
                    };
                    mosfet = ss.map(|ss| MosfetOperatingPoint {
                        region: ss.region,
                        vgs: ss.vgs,
                        vds: ss.vds,
                        gm: ss.gm,
                        gds: ss.gds,
                        drain_current,
                        source_current: -drain_current,
                        gate_current: 0.0,
                    });
                    (drain_current, drain_current * (vd - vs))
                }
            };

            DeviceEntry {
                name: device.name().to_string(),
                kind: device.kind(),
                current,
                power,
                mosfet,
            }
        })
        .collect();

    DeviceReport { entries }
}
