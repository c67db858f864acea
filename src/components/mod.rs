//! Device models for DC analysis.
//!
//! This module provides models for all supported circuit devices:
//! - Linear: Resistor, Capacitor, Inductor
//! - Sources: Voltage Source, Current Source
//! - Controlled: VCVS, VCCS, CCCS, CCVS
//! - Nonlinear: MOSFET
//!
//! Stamping into the MNA matrix lives in [`crate::solver`].

mod controlled;
mod linear;
mod mosfet;
mod sources;

pub use controlled::{Cccs, Ccvs, Vccs, Vcvs};
pub use linear::{Capacitor, Inductor, Resistor};
pub use mosfet::{Mosfet, MosfetModel, Polarity, Region, SmallSignal};
pub use sources::{CurrentSource, VoltageSource};

use std::fmt;

use crate::circuit::{BranchId, DeviceId, NodeId};

/// Kind of device, independent of its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Resistor,
    Capacitor,
    Inductor,
    VoltageSource,
    CurrentSource,
    Mosfet,
    Vcvs,
    Vccs,
    Cccs,
    Ccvs,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeviceKind::Resistor => "resistor",
            DeviceKind::Capacitor => "capacitor",
            DeviceKind::Inductor => "inductor",
            DeviceKind::VoltageSource => "voltage source",
            DeviceKind::CurrentSource => "current source",
            DeviceKind::Mosfet => "mosfet",
            DeviceKind::Vcvs => "vcvs",
            DeviceKind::Vccs => "vccs",
            DeviceKind::Cccs => "cccs",
            DeviceKind::Ccvs => "ccvs",
        };
        f.write_str(label)
    }
}

/// A circuit device.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Resistor(Resistor),
    Capacitor(Capacitor),
    Inductor(Inductor),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
    Mosfet(Mosfet),
    Vcvs(Vcvs),
    Vccs(Vccs),
    Cccs(Cccs),
    Ccvs(Ccvs),
}

impl Component {
    /// Get the device ID.
    pub fn id(&self) -> DeviceId {
        match self {
            Component::Resistor(r) => r.id,
            Component::Capacitor(c) => c.id,
            Component::Inductor(l) => l.id,
            Component::VoltageSource(v) => v.id,
            Component::CurrentSource(i) => i.id,
            Component::Mosfet(m) => m.id,
            Component::Vcvs(e) => e.id,
            Component::Vccs(g) => g.id,
            Component::Cccs(f) => f.id,
            Component::Ccvs(h) => h.id,
        }
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        match self {
            Component::Resistor(r) => &r.name,
            Component::Capacitor(c) => &c.name,
            Component::Inductor(l) => &l.name,
            Component::VoltageSource(v) => &v.name,
            Component::CurrentSource(i) => &i.name,
            Component::Mosfet(m) => &m.name,
            Component::Vcvs(e) => &e.name,
            Component::Vccs(g) => &g.name,
            Component::Cccs(f) => &f.name,
            Component::Ccvs(h) => &h.name,
        }
    }

    /// Get the device kind.
    pub fn kind(&self) -> DeviceKind {
        match self {
            Component::Resistor(_) => DeviceKind::Resistor,
            Component::Capacitor(_) => DeviceKind::Capacitor,
            Component::Inductor(_) => DeviceKind::Inductor,
            Component::VoltageSource(_) => DeviceKind::VoltageSource,
            Component::CurrentSource(_) => DeviceKind::CurrentSource,
            Component::Mosfet(_) => DeviceKind::Mosfet,
            Component::Vcvs(_) => DeviceKind::Vcvs,
            Component::Vccs(_) => DeviceKind::Vccs,
            Component::Cccs(_) => DeviceKind::Cccs,
            Component::Ccvs(_) => DeviceKind::Ccvs,
        }
    }

    /// Every node the device touches, terminals first, then control nodes.
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            Component::Resistor(r) => r.nodes.to_vec(),
            Component::Capacitor(c) => c.nodes.to_vec(),
            Component::Inductor(l) => l.nodes.to_vec(),
            Component::VoltageSource(v) => v.nodes.to_vec(),
            Component::CurrentSource(i) => i.nodes.to_vec(),
            Component::Mosfet(m) => m.nodes.to_vec(),
            Component::Vcvs(e) => e.nodes.iter().chain(&e.control).copied().collect(),
            Component::Vccs(g) => g.nodes.iter().chain(&g.control).copied().collect(),
            Component::Cccs(f) => f.nodes.to_vec(),
            Component::Ccvs(h) => h.nodes.to_vec(),
        }
    }

    /// Auxiliary branch owned by this device, if it is voltage-defined.
    pub fn branch(&self) -> Option<BranchId> {
        match self {
            Component::VoltageSource(v) => Some(v.branch),
            Component::Vcvs(e) => Some(e.branch),
            Component::Ccvs(h) => Some(h.branch),
            _ => None,
        }
    }

    /// Check if this device is nonlinear (its stamp depends on the estimate).
    pub fn is_nonlinear(&self) -> bool {
        matches!(self, Component::Mosfet(_))
    }
}
